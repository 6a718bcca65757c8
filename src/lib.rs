pub mod commands;
pub mod explorer;
pub mod reorder;
pub mod selection;
pub mod settings;
pub mod shell;

use bevy::{
    feathers::{dark_theme::create_dark_theme, theme::UiTheme, FeathersPlugins},
    input::mouse::{MouseScrollUnit, MouseWheel},
    picking::hover::HoverMap,
    prelude::*,
};
use rook_feathers::RookFeathersPlugin;

/// Tag component for the editor's own UI and helper entities, so they never
/// appear in the scene tree.
#[derive(Component, Default)]
pub struct EditorEntity;

/// Tag component that hides an entity from the scene tree.
/// Auto-applied to unnamed child entities (likely engine internals like
/// shadow cascades). Users can remove it to make hidden entities visible,
/// or add it to hide their own.
#[derive(Component, Default)]
pub struct EditorHidden;

pub struct SceneExplorerPlugin;

impl Plugin for SceneExplorerPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            FeathersPlugins,
            RookFeathersPlugin,
            shell::ShellPlugin,
            settings::SettingsPlugin,
            selection::SelectionPlugin,
            commands::CommandHistoryPlugin,
            explorer::ExplorerPlugin,
        ))
        .insert_resource(UiTheme(create_dark_theme()))
        .add_systems(Update, (send_scroll_events, auto_hide_internal_entities))
        .add_observer(on_scroll);
    }
}

/// Auto-hide unnamed child entities (likely engine internals like shadow
/// cascades) so the tree shows only authored content.
fn auto_hide_internal_entities(
    mut commands: Commands,
    new_entities: Query<
        (Entity, Option<&Name>, Option<&ChildOf>),
        (Added<Transform>, Without<EditorEntity>, Without<EditorHidden>),
    >,
) {
    for (entity, name, parent) in &new_entities {
        if name.is_none() && parent.is_some() {
            if let Ok(mut ec) = commands.get_entity(entity) {
                ec.insert(EditorHidden);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Scroll plumbing for the panel bodies
// ---------------------------------------------------------------------------

const SCROLL_LINE_HEIGHT: f32 = 21.0;

#[derive(EntityEvent, Debug)]
#[entity_event(propagate, auto_propagate)]
struct Scroll {
    entity: Entity,
    delta: Vec2,
}

fn send_scroll_events(
    mut mouse_wheel: MessageReader<MouseWheel>,
    hover_map: Res<HoverMap>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut commands: Commands,
) {
    for event in mouse_wheel.read() {
        let mut delta = -Vec2::new(event.x, event.y);
        if event.unit == MouseScrollUnit::Line {
            delta *= SCROLL_LINE_HEIGHT;
        }
        if keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]) {
            std::mem::swap(&mut delta.x, &mut delta.y);
        }
        for pointer_map in hover_map.values() {
            for entity in pointer_map.keys().copied() {
                commands.trigger(Scroll { entity, delta });
            }
        }
    }
}

fn on_scroll(
    mut scroll: On<Scroll>,
    mut query: Query<(&mut ScrollPosition, &Node, &ComputedNode)>,
) {
    let Ok((mut scroll_position, node, computed)) = query.get_mut(scroll.entity) else {
        return;
    };
    let max_offset = (computed.content_size() - computed.size()) * computed.inverse_scale_factor();
    let delta = &mut scroll.delta;

    if node.overflow.x == OverflowAxis::Scroll && delta.x != 0. {
        let at_limit = if delta.x > 0. {
            scroll_position.x >= max_offset.x
        } else {
            scroll_position.x <= 0.
        };
        if !at_limit {
            scroll_position.x += delta.x;
            delta.x = 0.;
        }
    }

    if node.overflow.y == OverflowAxis::Scroll && delta.y != 0. {
        let at_limit = if delta.y > 0. {
            scroll_position.y >= max_offset.y
        } else {
            scroll_position.y <= 0.
        };
        if !at_limit {
            scroll_position.y += delta.y;
            delta.y = 0.;
        }
    }

    if *delta == Vec2::ZERO {
        scroll.propagate(false);
    }
}
