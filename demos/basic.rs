use bevy::prelude::*;
use rook::SceneExplorerPlugin;

fn main() -> AppExit {
    App::new()
        .add_plugins((DefaultPlugins, SceneExplorerPlugin))
        .add_systems(Startup, spawn_scene)
        .run()
}

fn spawn_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Name::new("Camera"),
        Camera3d::default(),
        // Render the scene beneath the UI camera the shell spawns.
        Camera {
            order: -1,
            ..default()
        },
        Transform::from_xyz(6.0, 6.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 10000.0,
            ..default()
        },
        Transform::from_xyz(10.0, 20.0, 10.0)
            .with_rotation(Quat::from_euler(EulerRot::XYZ, -0.8, 0.4, 0.0)),
    ));

    let cube = meshes.add(Cuboid::new(1.0, 1.0, 1.0));
    let gray = materials.add(StandardMaterial::default());

    commands
        .spawn((
            Name::new("Props"),
            Transform::default(),
            Visibility::default(),
        ))
        .with_children(|props| {
            props.spawn((
                Name::new("Crate A"),
                Mesh3d(cube.clone()),
                MeshMaterial3d(gray.clone()),
                Transform::from_xyz(-1.5, 0.5, 0.0),
            ));
            props.spawn((
                Name::new("Crate B"),
                Mesh3d(cube.clone()),
                MeshMaterial3d(gray.clone()),
                Transform::from_xyz(1.5, 0.5, 0.0),
            ));
        });

    commands.spawn((
        Name::new("Ground"),
        Mesh3d(meshes.add(Plane3d::default().mesh().size(20.0, 20.0))),
        MeshMaterial3d(gray),
        Transform::default(),
    ));
}
