use bevy::prelude::*;
use bevy_notify::prelude::{Mutation, NotifyChanged};
use rook_feathers::checkbox::{checkbox, CheckboxToggled};
use rook_feathers::icons::{Icon, IconFont};
use rook_feathers::panel::PanelBody;
use rook_feathers::tokens;
use rook_feathers::tree_view::{
    tree_container_drop_observers, tree_row, TreeRowStyle, TreeStyleSet,
};
use rook_widgets::drag_drop::{LastDropResult, TreeSection};
use rook_widgets::tree_view::{
    EntityCategory, TreeChildrenPopulated, TreeIndex, TreeNode, TreeNodeExpanded,
    TreeRowChildren, TreeRowClicked, TreeRowContent, TreeRowDroppedOnRoot, TreeRowLabel,
    TreeRowSelected, TreeView,
};

use crate::commands::{CommandHistory, ReparentEntity};
use crate::reorder::{self, RootIndex, SceneReorderProvider};
use crate::selection::{Selected, Selection};
use crate::settings::ExplorerSettings;
use crate::shell::{DockSide, PanelDescriptor, PanelHandle, PanelRegistry, PanelSlots};
use crate::{EditorEntity, EditorHidden};

/// Marker for the container that holds the scene tree rows.
#[derive(Component)]
#[require(EditorEntity)]
pub struct ExplorerTreeContainer;

/// Shell handle for the registered explorer panel; dropping the panel means
/// passing this back to [`PanelRegistry::unregister`].
#[derive(Resource)]
pub struct ExplorerPanelHandle(pub PanelHandle);

/// Header checkbox controlling alphabetical sort.
#[derive(Component)]
struct SortToggle;

/// Header checkbox controlling drag-to-reparent.
#[derive(Component)]
struct DragToggle;

/// Short-lived highlight on a row that was just moved by a drop.
#[derive(Component)]
struct DropFlash {
    timer: Timer,
}

const DROP_FLASH_SECONDS: f32 = 0.8;

pub struct ExplorerPlugin;

impl Plugin for ExplorerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (register_explorer_panel, setup_name_watcher))
            .add_systems(Update, (populate_expanded_rows, tick_drop_flashes))
            .add_systems(
                Update,
                resort_rows.run_if(
                    resource_changed::<ExplorerSettings>
                        .or(resource_changed::<LastDropResult>),
                ),
            )
            .add_systems(
                Update,
                (flash_dropped_row, scroll_dropped_row_into_view)
                    .run_if(resource_changed::<LastDropResult>)
                    .after(TreeStyleSet),
            )
            .add_observer(on_root_entity_added)
            .add_observer(on_name_changed)
            .add_observer(on_entity_reparented)
            .add_observer(on_entity_removed)
            .add_observer(on_tree_row_clicked)
            .add_observer(on_entity_selected)
            .add_observer(on_entity_deselected)
            .add_observer(on_tree_row_dropped_on_root)
            .add_observer(on_setting_toggled);
    }
}

// ---------------------------------------------------------------------------
// Panel registration
// ---------------------------------------------------------------------------

fn register_explorer_panel(mut registry: ResMut<PanelRegistry>, mut commands: Commands) {
    let handle = registry.register(PanelDescriptor {
        title: "Scene Explorer".to_string(),
        icon: Icon::ListTree,
        dock: DockSide::Left,
        build: Box::new(build_explorer_panel),
    });
    commands.insert_resource(ExplorerPanelHandle(handle));
}

fn build_explorer_panel(world: &mut World, slots: PanelSlots) {
    let settings = world.resource::<ExplorerSettings>();
    let sorted = settings.sort_alphabetical;
    let draggable = settings.drag_to_reparent;
    let icon_font = world.resource::<IconFont>().0.clone();

    world.spawn((
        SortToggle,
        EditorEntity,
        checkbox("Sort A-Z", sorted, icon_font.clone()),
        ChildOf(slots.header_slot),
    ));
    world.spawn((
        DragToggle,
        EditorEntity,
        checkbox("Drag", draggable, icon_font),
        ChildOf(slots.header_slot),
    ));

    let mut section = TreeSection::new(SceneReorderProvider);
    section.drag_enabled = draggable;
    let container = world
        .spawn((
            ExplorerTreeContainer,
            TreeView,
            section,
            Node {
                flex_direction: FlexDirection::Column,
                width: percent(100),
                flex_grow: 1.0,
                padding: UiRect::all(px(2.0)),
                ..default()
            },
            BackgroundColor(Color::NONE),
            tree_container_drop_observers(),
            ChildOf(slots.body),
        ))
        .id();

    rebuild_tree(world, container);
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Classify a scene entity by its primary component for tree display.
fn classify_entity(world: &World, entity: Entity) -> EntityCategory {
    if world.get::<Camera>(entity).is_some() {
        return EntityCategory::Camera;
    }
    if world.get::<PointLight>(entity).is_some()
        || world.get::<DirectionalLight>(entity).is_some()
        || world.get::<SpotLight>(entity).is_some()
    {
        return EntityCategory::Light;
    }
    if world.get::<Mesh3d>(entity).is_some() {
        return EntityCategory::Mesh;
    }
    if world.get::<SceneRoot>(entity).is_some() {
        return EntityCategory::Scene;
    }
    EntityCategory::Entity
}

fn display_name(world: &World, entity: Entity) -> String {
    world
        .get::<Name>(entity)
        .map(|n| n.as_str().to_string())
        .unwrap_or_else(|| format!("Entity {entity}"))
}

/// Check if an entity has any non-editor children.
fn has_visible_children(world: &World, entity: Entity) -> bool {
    let Some(children) = world.get::<Children>(entity) else {
        return false;
    };
    children.iter().any(|child| {
        world.get::<EditorEntity>(child).is_none() && world.get::<EditorHidden>(child).is_none()
    })
}

/// Spawn a single (non-recursive) tree row for a source entity.
/// Updates TreeIndex immediately.
fn spawn_row(world: &mut World, source: Entity, parent_container: Entity) -> Entity {
    let label = display_name(world, source);
    let has_children = has_visible_children(world, source);
    let category = classify_entity(world, source);
    let icon_font = world.resource::<IconFont>().0.clone();
    let style = TreeRowStyle { icon_font };

    let tree_row_entity = world
        .spawn((
            tree_row(&label, has_children, false, source, category, &style),
            ChildOf(parent_container),
        ))
        .id();

    world
        .resource_mut::<TreeIndex>()
        .insert(source, tree_row_entity);
    tree_row_entity
}

/// The source entities that should appear under `parent` (root level for
/// `None`), in display order: authored order normally, (category, name) when
/// alphabetical sort is on.
fn display_order(world: &mut World, parent: Option<Entity>) -> Vec<Entity> {
    let mut sources: Vec<Entity> = match parent {
        None => reorder::ordered_roots(world),
        Some(p) => world
            .get::<Children>(p)
            .map(|c| c.iter().collect())
            .unwrap_or_default(),
    };
    sources.retain(|&e| {
        world.get::<EditorEntity>(e).is_none() && world.get::<EditorHidden>(e).is_none()
    });

    if world.resource::<ExplorerSettings>().sort_alphabetical {
        let mut keyed: Vec<(EntityCategory, String, Entity)> = sources
            .into_iter()
            .map(|e| (classify_entity(world, e), display_name(world, e), e))
            .collect();
        keyed.sort_by(|(cat_a, name_a, _), (cat_b, name_b, _)| {
            cat_a.cmp(cat_b).then_with(|| name_a.cmp(name_b))
        });
        keyed.into_iter().map(|(_, _, e)| e).collect()
    } else {
        sources
    }
}

// ---------------------------------------------------------------------------
// Initial build
// ---------------------------------------------------------------------------

/// Populate the tree with root-level entities only (non-recursive).
/// Children are spawned lazily when parents are expanded.
fn rebuild_tree(world: &mut World, container: Entity) {
    // Materialize root indices so later reorders have a stable baseline.
    let order = reorder::ordered_roots(world);
    reorder::sync_root_indices(world, &order);

    for source in display_order(world, None) {
        if world.resource::<TreeIndex>().contains(source) {
            continue;
        }
        spawn_row(world, source, container);
    }
}

// ---------------------------------------------------------------------------
// Observers: entity lifecycle
// ---------------------------------------------------------------------------

/// When a new entity gets Transform and has no parent, create a root tree row.
fn on_root_entity_added(
    trigger: On<Add, Transform>,
    mut commands: Commands,
    tree_index: Res<TreeIndex>,
    container: Option<Single<Entity, With<ExplorerTreeContainer>>>,
    editor_check: Query<(), Or<(With<EditorEntity>, With<EditorHidden>)>>,
    child_of_check: Query<(), With<ChildOf>>,
) {
    let entity = trigger.event_target();
    let Some(container) = container else {
        return;
    };

    if editor_check.contains(entity)
        || child_of_check.contains(entity)
        || tree_index.contains(entity)
    {
        return;
    }

    let container = *container;
    commands.queue(move |world: &mut World| {
        if world.resource::<TreeIndex>().contains(entity) {
            return;
        }
        // Re-check: ChildOf may have been added between observer and command flush
        if world.get::<ChildOf>(entity).is_some() {
            return;
        }
        if world.get::<EditorEntity>(entity).is_some()
            || world.get::<EditorHidden>(entity).is_some()
        {
            return;
        }
        spawn_row(world, entity, container);
        if world.get::<RootIndex>(entity).is_none() {
            let next = next_root_index(world);
            world.entity_mut(entity).insert(RootIndex(next));
        }
    });
}

fn next_root_index(world: &mut World) -> usize {
    world
        .query_filtered::<&RootIndex, Without<ChildOf>>()
        .iter(world)
        .map(|RootIndex(n)| n + 1)
        .max()
        .unwrap_or(0)
}

/// When an entity's Name is added/changed, update its tree row label.
/// Also creates a tree row if the entity is a root without one.
fn on_name_changed(
    trigger: On<Add, Name>,
    mut commands: Commands,
    name_query: Query<&Name>,
    tree_index: Res<TreeIndex>,
    tree_nodes: Query<&Children, With<TreeNode>>,
    content_query: Query<&Children, With<TreeRowContent>>,
    mut label_query: Query<&mut Text, With<TreeRowLabel>>,
    container: Option<Single<Entity, With<ExplorerTreeContainer>>>,
    editor_check: Query<(), Or<(With<EditorEntity>, With<EditorHidden>)>>,
    child_of_check: Query<(), With<ChildOf>>,
) {
    let entity = trigger.event_target();
    let Ok(name) = name_query.get(entity) else {
        return;
    };

    if let Some(tree_entity) = tree_index.get(entity) {
        // Update existing label: TreeNode → Children → TreeRowContent → Children → TreeRowLabel
        let Ok(children) = tree_nodes.get(tree_entity) else {
            return;
        };
        for child in children.iter() {
            if let Ok(content_children) = content_query.get(child) {
                for grandchild in content_children.iter() {
                    if let Ok(mut text) = label_query.get_mut(grandchild) {
                        text.0 = name.as_str().to_string();
                        return;
                    }
                }
            }
        }
    } else {
        // Entity has no tree row — create one if it's a visible root
        let Some(container) = container else {
            return;
        };
        if editor_check.contains(entity) || child_of_check.contains(entity) {
            return;
        }

        let container = *container;
        commands.queue(move |world: &mut World| {
            if world.resource::<TreeIndex>().contains(entity) {
                return;
            }
            if world.get::<ChildOf>(entity).is_some() {
                return;
            }
            if world.get::<EditorEntity>(entity).is_some()
                || world.get::<EditorHidden>(entity).is_some()
            {
                return;
            }
            spawn_row(world, entity, container);
        });
    }
}

/// Spawn a watcher entity that notifies us when Name is mutated in-place.
fn setup_name_watcher(mut commands: Commands) {
    commands
        .spawn((EditorEntity, NotifyChanged::<Name>::default()))
        .observe(on_name_mutated);
}

/// When an entity's Name is mutated in-place (e.g. via an inspector), update
/// the tree row label.
fn on_name_mutated(
    trigger: On<Mutation<Name>>,
    name_query: Query<&Name>,
    tree_index: Res<TreeIndex>,
    tree_nodes: Query<&Children, With<TreeNode>>,
    content_query: Query<&Children, With<TreeRowContent>>,
    mut label_query: Query<&mut Text, With<TreeRowLabel>>,
) {
    let entity = trigger.mutated;
    let Ok(name) = name_query.get(entity) else {
        return;
    };
    let Some(tree_entity) = tree_index.get(entity) else {
        return;
    };
    let Ok(children) = tree_nodes.get(tree_entity) else {
        return;
    };
    for child in children.iter() {
        let Ok(content_children) = content_query.get(child) else {
            continue;
        };
        for grandchild in content_children.iter() {
            if let Ok(mut text) = label_query.get_mut(grandchild) {
                text.0 = name.as_str().to_string();
                return;
            }
        }
    }
}

/// When an entity's parent changes, move or create its tree row.
fn on_entity_reparented(
    trigger: On<Insert, ChildOf>,
    mut commands: Commands,
    tree_index: Res<TreeIndex>,
    editor_check: Query<(), Or<(With<EditorEntity>, With<EditorHidden>)>>,
    tree_node_check: Query<(), With<TreeNode>>,
    child_of_query: Query<&ChildOf>,
    children_query: Query<&Children>,
    tree_row_children: Query<Entity, With<TreeRowChildren>>,
    populated_query: Query<&TreeChildrenPopulated>,
) {
    let entity = trigger.event_target();

    // Skip editor/hidden entities and tree row UI entities
    if editor_check.contains(entity) || tree_node_check.contains(entity) {
        return;
    }

    let Ok(&ChildOf(new_parent)) = child_of_query.get(entity) else {
        return;
    };

    // Find the new parent's TreeRowChildren container via TreeIndex + child walk
    let parent_tree = tree_index.get(new_parent);
    let parent_container = parent_tree.and_then(|parent_tree| {
        children_query.get(parent_tree).ok().and_then(|children| {
            children.iter().find(|c| tree_row_children.contains(*c))
        })
    });

    // If tree row already exists for this entity → reparent it
    if let Some(tree_entity) = tree_index.get(entity) {
        if let Some(container) = parent_container {
            commands.entity(tree_entity).insert(ChildOf(container));
        } else {
            // Parent has no tree row yet — remove this incorrectly-rooted tree
            // row. Lazy loading will re-create it when the parent is expanded.
            let source = entity;
            commands.queue(move |world: &mut World| {
                world.resource_mut::<TreeIndex>().remove(source);
                if let Ok(ec) = world.get_entity_mut(tree_entity) {
                    ec.despawn();
                }
            });
        }
        return;
    }

    // No tree row exists — only spawn if the parent's children are already populated
    let (Some(parent_tree), Some(parent_container)) = (parent_tree, parent_container) else {
        return;
    };
    let populated = populated_query
        .get(parent_tree)
        .map(|p| p.0)
        .unwrap_or(false);
    if !populated {
        return; // Lazy loading will handle it when parent is expanded
    }

    let container = parent_container;
    commands.queue(move |world: &mut World| {
        if world.resource::<TreeIndex>().contains(entity) {
            return;
        }
        spawn_row(world, entity, container);
    });
}

/// When a scene entity despawns, drop its tree row.
fn on_entity_removed(
    trigger: On<Despawn, Transform>,
    mut commands: Commands,
    tree_index: Res<TreeIndex>,
) {
    let entity = trigger.event_target();

    if let Some(tree_entity) = tree_index.get(entity) {
        if let Ok(mut ec) = commands.get_entity(tree_entity) {
            ec.despawn();
        }
    }
}

// ---------------------------------------------------------------------------
// Lazy child population
// ---------------------------------------------------------------------------

/// When a tree node is expanded for the first time, spawn rows for its children.
fn populate_expanded_rows(
    mut commands: Commands,
    rows: Query<
        (
            Entity,
            &TreeNode,
            &TreeNodeExpanded,
            &TreeChildrenPopulated,
            &Children,
        ),
        Changed<TreeNodeExpanded>,
    >,
    containers: Query<(), With<TreeRowChildren>>,
) {
    for (tree_row_entity, tree_node, expanded, populated, children) in &rows {
        // Only populate on first expansion
        if !expanded.0 || populated.0 {
            continue;
        }

        let source = tree_node.0;
        let Some(container) = children.iter().find(|c| containers.contains(*c)) else {
            continue;
        };

        commands.queue(move |world: &mut World| {
            // Double-check populated flag (guard against duplicate events)
            if let Some(pop) = world.get::<TreeChildrenPopulated>(tree_row_entity) {
                if pop.0 {
                    return;
                }
            }
            if let Some(mut pop) = world.get_mut::<TreeChildrenPopulated>(tree_row_entity) {
                pop.0 = true;
            }

            for child in display_order(world, Some(source)) {
                if world.resource::<TreeIndex>().contains(child) {
                    continue;
                }
                spawn_row(world, child, container);
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Row ordering
// ---------------------------------------------------------------------------

/// Bring every row container back in line with the display order. Runs after
/// drops and when the sort toggle flips.
fn resort_rows(world: &mut World) {
    let Some(root_container) = world
        .query_filtered::<Entity, With<ExplorerTreeContainer>>()
        .iter(world)
        .next()
    else {
        return;
    };

    let mut jobs: Vec<(Option<Entity>, Entity)> = vec![(None, root_container)];

    let populated: Vec<(Entity, Vec<Entity>)> = world
        .query::<(&TreeNode, &TreeChildrenPopulated, &Children)>()
        .iter(world)
        .filter(|(_, populated, _)| populated.0)
        .map(|(node, _, children)| (node.0, children.iter().collect()))
        .collect();
    for (source, children) in populated {
        if let Some(container) = children
            .into_iter()
            .find(|&c| world.get::<TreeRowChildren>(c).is_some())
        {
            jobs.push((Some(source), container));
        }
    }

    for (source, container) in jobs {
        let order = display_order(world, source);
        let mut row_order: Vec<Entity> = {
            let index = world.resource::<TreeIndex>();
            order.iter().filter_map(|&s| index.get(s)).collect()
        };
        // Keep any rows the order pass missed rather than orphaning them.
        let current: Vec<Entity> = world
            .get::<Children>(container)
            .map(|c| c.iter().collect())
            .unwrap_or_default();
        for row in current {
            if !row_order.contains(&row) {
                row_order.push(row);
            }
        }
        if let Ok(mut container_mut) = world.get_entity_mut(container) {
            container_mut.replace_children(&row_order);
        }
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Handle tree row click → select the source entity.
/// Plain click on selected entity → deselect. Ctrl+Click → toggle.
fn on_tree_row_clicked(
    event: On<TreeRowClicked>,
    mut commands: Commands,
    mut selection: ResMut<Selection>,
    keyboard: Res<ButtonInput<KeyCode>>,
) {
    let ctrl = keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]);

    if ctrl {
        selection.toggle(&mut commands, event.source_entity);
    } else if selection.is_selected(event.source_entity) {
        selection.clear(&mut commands);
    } else {
        selection.select_single(&mut commands, event.source_entity);
    }
}

/// When Selected is added, highlight the corresponding tree row.
fn on_entity_selected(
    trigger: On<Add, Selected>,
    mut commands: Commands,
    tree_index: Res<TreeIndex>,
    tree_nodes: Query<&Children, With<TreeNode>>,
    tree_row_contents: Query<Entity, With<TreeRowContent>>,
    mut bg_query: Query<&mut BackgroundColor>,
) {
    let entity = trigger.event_target();

    let Some(tree_entity) = tree_index.get(entity) else {
        return;
    };
    let Ok(children) = tree_nodes.get(tree_entity) else {
        return;
    };

    for child in children.iter() {
        if tree_row_contents.contains(child) {
            if let Ok(mut ec) = commands.get_entity(child) {
                ec.insert(TreeRowSelected);
            }
            if let Ok(mut bg) = bg_query.get_mut(child) {
                bg.0 = tokens::SELECTED_BG;
            }
            return;
        }
    }
}

/// When Selected is removed, unhighlight the corresponding tree row.
fn on_entity_deselected(
    trigger: On<Remove, Selected>,
    mut commands: Commands,
    tree_index: Res<TreeIndex>,
    tree_nodes: Query<&Children, With<TreeNode>>,
    tree_row_contents: Query<Entity, With<TreeRowContent>>,
    mut bg_query: Query<&mut BackgroundColor>,
) {
    let entity = trigger.event_target();

    let Some(tree_entity) = tree_index.get(entity) else {
        return;
    };
    let Ok(children) = tree_nodes.get(tree_entity) else {
        return;
    };

    for child in children.iter() {
        if tree_row_contents.contains(child) {
            if let Ok(mut ec) = commands.get_entity(child) {
                ec.remove::<TreeRowSelected>();
            }
            if let Ok(mut bg) = bg_query.get_mut(child) {
                bg.0 = tokens::ROW_BG;
            }
            return;
        }
    }
}

// ---------------------------------------------------------------------------
// Drop handling outside the zone machinery
// ---------------------------------------------------------------------------

/// Handle tree row dropped on empty container space → deparent to root level.
fn on_tree_row_dropped_on_root(
    event: On<TreeRowDroppedOnRoot>,
    mut commands: Commands,
    parent_query: Query<&ChildOf, Without<EditorEntity>>,
    tree_index: Res<TreeIndex>,
    container: Single<Entity, With<ExplorerTreeContainer>>,
) {
    let dragged = event.dragged_source;

    let old_parent = match parent_query.get(dragged) {
        Ok(child_of) => Some(child_of.0),
        Err(_) => return,
    };

    let container_entity = *container;

    let cmd = ReparentEntity {
        entity: dragged,
        old_parent,
        new_parent: None,
    };

    commands.queue(move |world: &mut World| {
        world.resource_scope(|world, mut history: Mut<CommandHistory>| {
            history.execute(Box::new(cmd), world);
        });
        // Append at the end of the root order: drop any stale cached index
        // first, then re-synchronize.
        if let Ok(mut entity_mut) = world.get_entity_mut(dragged) {
            entity_mut.remove::<RootIndex>();
        }
        let order = reorder::ordered_roots(world);
        reorder::sync_root_indices(world, &order);
    });

    // Move the tree row to the root container
    if let Some(tree_entity) = tree_index.get(dragged) {
        commands
            .entity(tree_entity)
            .insert(ChildOf(container_entity));
    }
}

// ---------------------------------------------------------------------------
// Drop feedback
// ---------------------------------------------------------------------------

/// Flash the moved row after a committed drop.
fn flash_dropped_row(
    result: Res<LastDropResult>,
    tree_index: Res<TreeIndex>,
    tree_nodes: Query<&Children, With<TreeNode>>,
    tree_row_contents: Query<Entity, With<TreeRowContent>>,
    mut bg_query: Query<&mut BackgroundColor>,
    mut commands: Commands,
) {
    let Some(outcome) = result.0 else {
        return;
    };
    let Some(tree_entity) = tree_index.get(outcome.dragged) else {
        return;
    };
    let Ok(children) = tree_nodes.get(tree_entity) else {
        return;
    };
    for child in children.iter() {
        if tree_row_contents.contains(child) {
            if let Ok(mut bg) = bg_query.get_mut(child) {
                bg.0 = tokens::DROP_FLASH_BG;
            }
            commands.entity(child).insert(DropFlash {
                timer: Timer::from_seconds(DROP_FLASH_SECONDS, TimerMode::Once),
            });
            return;
        }
    }
}

fn tick_drop_flashes(
    time: Res<Time>,
    mut commands: Commands,
    mut flashes: Query<(
        Entity,
        &mut DropFlash,
        &mut BackgroundColor,
        Has<TreeRowSelected>,
    )>,
) {
    for (entity, mut flash, mut bg, selected) in &mut flashes {
        if flash.timer.tick(time.delta()).is_finished() {
            bg.0 = if selected {
                tokens::SELECTED_BG
            } else {
                tokens::ROW_BG
            };
            commands.entity(entity).remove::<DropFlash>();
        }
    }
}

/// Scroll the panel body so the moved row is visible.
fn scroll_dropped_row_into_view(
    result: Res<LastDropResult>,
    tree_index: Res<TreeIndex>,
    tree_nodes: Query<&Children, With<TreeNode>>,
    contents: Query<(&ComputedNode, &UiGlobalTransform), With<TreeRowContent>>,
    parent_query: Query<&ChildOf>,
    mut bodies: Query<
        (&mut ScrollPosition, &ComputedNode, &UiGlobalTransform),
        With<PanelBody>,
    >,
) {
    let Some(outcome) = result.0 else {
        return;
    };
    let Some(tree_entity) = tree_index.get(outcome.dragged) else {
        return;
    };
    let Ok(children) = tree_nodes.get(tree_entity) else {
        return;
    };
    let Some((row_computed, row_transform)) =
        children.iter().find_map(|child| contents.get(child).ok())
    else {
        return;
    };

    // Walk up to the scrollable panel body.
    let mut current = tree_entity;
    let body = loop {
        let Ok(&ChildOf(parent)) = parent_query.get(current) else {
            return;
        };
        if bodies.contains(parent) {
            break parent;
        }
        current = parent;
    };
    let Ok((mut scroll, body_computed, body_transform)) = bodies.get_mut(body) else {
        return;
    };

    let row_scale = row_computed.inverse_scale_factor();
    let row_center = row_transform.to_scale_angle_translation().2.y * row_scale;
    let body_scale = body_computed.inverse_scale_factor();
    let body_center = body_transform.to_scale_angle_translation().2.y * body_scale;
    let body_height = body_computed.size().y * body_scale;

    let above = row_center - (body_center - body_height / 2.0);
    let below = row_center - (body_center + body_height / 2.0);
    if above < 0.0 {
        scroll.y += above;
    } else if below > 0.0 {
        scroll.y += below;
    }
}

// ---------------------------------------------------------------------------
// Settings toggles
// ---------------------------------------------------------------------------

fn on_setting_toggled(
    event: On<CheckboxToggled>,
    sort_toggles: Query<(), With<SortToggle>>,
    drag_toggles: Query<(), With<DragToggle>>,
    mut settings: ResMut<ExplorerSettings>,
) {
    if sort_toggles.contains(event.entity) {
        settings.sort_alphabetical = event.checked;
    } else if drag_toggles.contains(event.entity) {
        settings.drag_to_reparent = event.checked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_world() -> World {
        let mut world = World::new();
        world.init_resource::<TreeIndex>();
        world.init_resource::<ExplorerSettings>();
        world.insert_resource(IconFont(Handle::default()));
        world
    }

    #[test]
    fn classify_by_primary_component() {
        let mut world = test_world();
        let camera = world.spawn(Camera::default()).id();
        let light = world.spawn(PointLight::default()).id();
        let plain = world.spawn(Transform::default()).id();

        assert_eq!(classify_entity(&world, camera), EntityCategory::Camera);
        assert_eq!(classify_entity(&world, light), EntityCategory::Light);
        assert_eq!(classify_entity(&world, plain), EntityCategory::Entity);
    }

    #[test]
    fn editor_children_are_not_visible() {
        let mut world = test_world();
        let parent = world.spawn(Transform::default()).id();
        assert!(!has_visible_children(&world, parent));

        let gizmo = world.spawn((EditorEntity, ChildOf(parent))).id();
        assert!(!has_visible_children(&world, parent));

        world.spawn((Transform::default(), ChildOf(parent)));
        assert!(has_visible_children(&world, parent));
        let _ = gizmo;
    }

    #[test]
    fn display_order_follows_authored_order_by_default() {
        let mut world = test_world();
        let parent = world.spawn(Transform::default()).id();
        let b = world
            .spawn((Name::new("b"), Transform::default(), ChildOf(parent)))
            .id();
        let a = world
            .spawn((Name::new("a"), Transform::default(), ChildOf(parent)))
            .id();

        assert_eq!(display_order(&mut world, Some(parent)), vec![b, a]);

        world.resource_mut::<ExplorerSettings>().sort_alphabetical = true;
        assert_eq!(display_order(&mut world, Some(parent)), vec![a, b]);
    }

    #[test]
    fn rebuild_spawns_one_row_per_root_and_indexes_it() {
        let mut world = test_world();
        let container = world.spawn_empty().id();
        let r1 = world.spawn((Name::new("one"), Transform::default())).id();
        let r2 = world.spawn((Name::new("two"), Transform::default())).id();

        rebuild_tree(&mut world, container);

        let index = world.resource::<TreeIndex>();
        let row1 = index.get(r1).expect("row for r1");
        let row2 = index.get(r2).expect("row for r2");
        let rows: Vec<Entity> = world
            .get::<Children>(container)
            .map(|c| c.iter().collect())
            .unwrap_or_default();
        assert_eq!(rows, vec![row1, row2]);
        assert_eq!(world.get::<RootIndex>(r1), Some(&RootIndex(0)));
        assert_eq!(world.get::<RootIndex>(r2), Some(&RootIndex(1)));
    }
}
