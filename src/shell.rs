use bevy::prelude::*;
use rook_feathers::icons::{Icon, IconFont};
use rook_feathers::panel::{panel, PanelBody, PanelHeaderSlot};
use rook_feathers::tokens;

use crate::EditorEntity;

/// Which dock column a panel attaches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DockSide {
    Left,
    Right,
}

/// Entities a panel builder receives to fill in its content.
#[derive(Clone, Copy)]
pub struct PanelSlots {
    /// Scrollable body below the header.
    pub body: Entity,
    /// Right-aligned row in the header for panel controls.
    pub header_slot: Entity,
}

/// Everything the shell needs to host a panel.
pub struct PanelDescriptor {
    pub title: String,
    pub icon: Icon,
    pub dock: DockSide,
    /// Invoked once after the chrome exists to populate the panel.
    pub build: Box<dyn Fn(&mut World, PanelSlots) + Send + Sync>,
}

/// Disposable registration handle; pass it back to
/// [`PanelRegistry::unregister`] to tear the panel down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PanelHandle(u64);

struct PanelEntry {
    handle: PanelHandle,
    descriptor: PanelDescriptor,
    root: Option<Entity>,
}

/// Registration point for dockable side panels. Chrome is spawned and torn
/// down by [`sync_panels`] as entries come and go.
#[derive(Resource, Default)]
pub struct PanelRegistry {
    next_id: u64,
    entries: Vec<PanelEntry>,
    retired: Vec<Entity>,
}

impl PanelRegistry {
    pub fn register(&mut self, descriptor: PanelDescriptor) -> PanelHandle {
        let handle = PanelHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(PanelEntry {
            handle,
            descriptor,
            root: None,
        });
        handle
    }

    pub fn unregister(&mut self, handle: PanelHandle) {
        if let Some(pos) = self.entries.iter().position(|e| e.handle == handle) {
            let entry = self.entries.remove(pos);
            if let Some(root) = entry.root {
                self.retired.push(root);
            }
        }
    }

    fn dirty(&self) -> bool {
        !self.retired.is_empty() || self.entries.iter().any(|e| e.root.is_none())
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

const DOCK_WIDTH: f32 = 320.0;

/// Marker for the left dock column.
#[derive(Component)]
pub struct DockLeft;

/// Marker for the right dock column.
#[derive(Component)]
pub struct DockRight;

/// Marker for the central viewport area between the docks.
#[derive(Component)]
pub struct ViewportArea;

fn spawn_shell_layout(mut commands: Commands) {
    commands.spawn((Camera2d, EditorEntity));
    commands.spawn((
        EditorEntity,
        Node {
            width: percent(100),
            height: percent(100),
            flex_direction: FlexDirection::Row,
            ..default()
        },
        BackgroundColor(tokens::WINDOW_BG),
        children![
            (
                DockLeft,
                Node {
                    width: px(DOCK_WIDTH),
                    height: percent(100),
                    flex_direction: FlexDirection::Column,
                    display: Display::None,
                    ..default()
                },
            ),
            (
                ViewportArea,
                Node {
                    flex_grow: 1.0,
                    height: percent(100),
                    ..default()
                },
            ),
            (
                DockRight,
                Node {
                    width: px(DOCK_WIDTH),
                    height: percent(100),
                    flex_direction: FlexDirection::Column,
                    display: Display::None,
                    ..default()
                },
            )
        ],
    ));
}

// ---------------------------------------------------------------------------
// Registry processing
// ---------------------------------------------------------------------------

fn sync_panels(world: &mut World) {
    if !world.resource::<PanelRegistry>().dirty() {
        return;
    }

    let retired: Vec<Entity> = {
        let mut registry = world.resource_mut::<PanelRegistry>();
        registry.retired.drain(..).collect()
    };
    for root in retired {
        if let Ok(entity) = world.get_entity_mut(root) {
            entity.despawn();
        }
    }

    let Some(icon_font) = world.get_resource::<IconFont>().map(|f| f.0.clone()) else {
        return;
    };

    world.resource_scope(|world, mut registry: Mut<PanelRegistry>| {
        for entry in registry.entries.iter_mut().filter(|e| e.root.is_none()) {
            let dock = match entry.descriptor.dock {
                DockSide::Left => world
                    .query_filtered::<Entity, With<DockLeft>>()
                    .iter(world)
                    .next(),
                DockSide::Right => world
                    .query_filtered::<Entity, With<DockRight>>()
                    .iter(world)
                    .next(),
            };
            let Some(dock) = dock else {
                continue;
            };

            let root = world
                .spawn((
                    EditorEntity,
                    panel(
                        &entry.descriptor.title,
                        entry.descriptor.icon,
                        icon_font.clone(),
                    ),
                    ChildOf(dock),
                ))
                .id();

            let body = find_descendant::<PanelBody>(world, root);
            let header_slot = find_descendant::<PanelHeaderSlot>(world, root);
            let (Some(body), Some(header_slot)) = (body, header_slot) else {
                warn!("Panel chrome for '{}' is missing slots", entry.descriptor.title);
                continue;
            };

            (entry.descriptor.build)(world, PanelSlots { body, header_slot });
            entry.root = Some(root);
        }
    });

    update_dock_visibility(world);
}

fn find_descendant<T: Component>(world: &World, root: Entity) -> Option<Entity> {
    let mut stack = vec![root];
    while let Some(entity) = stack.pop() {
        if world.get::<T>(entity).is_some() {
            return Some(entity);
        }
        if let Some(children) = world.get::<Children>(entity) {
            stack.extend(children.iter());
        }
    }
    None
}

/// Collapse docks with no panels so the viewport can use the space.
fn update_dock_visibility(world: &mut World) {
    let docks: Vec<Entity> = world
        .query_filtered::<Entity, Or<(With<DockLeft>, With<DockRight>)>>()
        .iter(world)
        .collect();
    for dock in docks {
        let occupied = world
            .get::<Children>(dock)
            .map(|c| !c.is_empty())
            .unwrap_or(false);
        if let Some(mut node) = world.get_mut::<Node>(dock) {
            node.display = if occupied { Display::Flex } else { Display::None };
        }
    }
}

pub struct ShellPlugin;

impl Plugin for ShellPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PanelRegistry>()
            .add_systems(Startup, spawn_shell_layout)
            .add_systems(Update, sync_panels);
    }
}
