use bevy::{feathers::theme::ThemedText, prelude::*, ui_widgets::observe};
use rook_widgets::drag_drop::{
    begin_drag, cancel_drag, commit_drop, leave_hover, update_hover, DragSession, DropZone,
    HoverInput, TreeSection,
};
use rook_widgets::tree_view::{
    EntityCategory, TreeChildrenPopulated, TreeIndex, TreeNode, TreeNodeExpandToggle,
    TreeNodeExpanded, TreeRowChildren, TreeRowClicked, TreeRowContent, TreeRowDot,
    TreeRowDroppedOnRoot, TreeRowLabel, TreeRowSelected,
};

use crate::icons::Icon;
use crate::tokens;

const INDENT_WIDTH: f32 = 16.0;
const TOGGLE_WIDTH: f32 = 16.0;
const DOT_SIZE: f32 = 7.0;
/// Bound on UI-hierarchy walks from a picked descendant up to its tree row.
const MAX_WALK: usize = 8;

/// Fonts and metrics shared by every row of a tree.
#[derive(Clone)]
pub struct TreeRowStyle {
    pub icon_font: Handle<Font>,
}

/// Set containing the drag-session-driven restyling; host feedback that
/// paints rows (drop flashes etc.) should order after it.
#[derive(SystemSet, Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct TreeStyleSet;

/// Walk up the ChildOf chain from any UI entity until we find a TreeNode,
/// then return (row, source). Handles pointer events that land on label text,
/// toggle glyphs, or any nested child of the tree row.
fn find_tree_row(
    entity: Entity,
    parents: &Query<&ChildOf>,
    tree_nodes: &Query<&TreeNode>,
) -> Option<(Entity, Entity)> {
    let mut current = entity;
    for _ in 0..MAX_WALK {
        if let Ok(node) = tree_nodes.get(current) {
            return Some((current, node.0));
        }
        let Ok(&ChildOf(parent)) = parents.get(current) else {
            break;
        };
        current = parent;
    }
    None
}

/// Walk up from a tree row to the section container carrying the policy.
fn find_section(
    entity: Entity,
    parents: &Query<&ChildOf>,
    sections: &Query<(), With<TreeSection>>,
) -> Option<Entity> {
    let mut current = entity;
    for _ in 0..MAX_WALK {
        if sections.contains(current) {
            return Some(current);
        }
        let Ok(&ChildOf(parent)) = parents.get(current) else {
            break;
        };
        current = parent;
    }
    None
}

/// Creates a tree row bundle for displaying an entity in the scene tree.
pub fn tree_row(
    label: &str,
    has_children: bool,
    selected: bool,
    source: Entity,
    category: EntityCategory,
    style: &TreeRowStyle,
) -> impl Bundle {
    (
        TreeNode(source),
        TreeNodeExpanded(false),
        TreeChildrenPopulated(false),
        Node {
            flex_direction: FlexDirection::Column,
            width: percent(100),
            ..default()
        },
        children![
            tree_row_content(label, has_children, selected, source, category, style),
            // Container for child rows; populated lazily on first expansion.
            (
                TreeRowChildren,
                Node {
                    flex_direction: FlexDirection::Column,
                    padding: UiRect::left(px(INDENT_WIDTH)),
                    width: percent(100),
                    display: Display::None,
                    ..default()
                }
            )
        ],
    )
}

fn tree_row_content(
    label: &str,
    has_children: bool,
    selected: bool,
    source: Entity,
    category: EntityCategory,
    style: &TreeRowStyle,
) -> impl Bundle {
    let bg = if selected {
        tokens::SELECTED_BG
    } else {
        tokens::ROW_BG
    };

    (
        TreeRowContent,
        Node {
            flex_direction: FlexDirection::Row,
            align_items: AlignItems::Center,
            column_gap: px(4.0),
            padding: UiRect::axes(px(4.0), px(2.0)),
            width: percent(100),
            ..default()
        },
        BackgroundColor(bg),
        BorderColor::all(tokens::DROP_TARGET_BORDER),
        children![
            expand_toggle(has_children, style),
            category_dot(category),
            (
                TreeRowLabel,
                Text::new(label),
                TextFont {
                    font_size: tokens::TEXT_SIZE,
                    ..default()
                },
                ThemedText,
            )
        ],
        // Click handler for selection
        observe(move |click: On<Pointer<Click>>, mut commands: Commands| {
            commands.trigger(TreeRowClicked {
                entity: click.event_target(),
                source_entity: source,
            });
        }),
        // Hover effects; suspended while a drag session owns the styling
        observe(
            |hover: On<Pointer<Over>>,
             session: Res<DragSession>,
             mut bg_query: Query<
                &mut BackgroundColor,
                (With<TreeRowContent>, Without<TreeRowSelected>),
            >| {
                if !session.is_idle() {
                    return;
                }
                if let Ok(mut bg) = bg_query.get_mut(hover.event_target()) {
                    bg.0 = tokens::HOVER_BG;
                }
            },
        ),
        observe(
            |out: On<Pointer<Out>>,
             session: Res<DragSession>,
             mut bg_query: Query<
                &mut BackgroundColor,
                (With<TreeRowContent>, Without<TreeRowSelected>),
            >| {
                if !session.is_idle() {
                    return;
                }
                if let Ok(mut bg) = bg_query.get_mut(out.event_target()) {
                    bg.0 = tokens::ROW_BG;
                }
            },
        ),
        // Drag lifecycle: start
        observe(
            |mut start: On<Pointer<DragStart>>,
             mut commands: Commands,
             parents: Query<&ChildOf>,
             tree_nodes: Query<&TreeNode>,
             sections: Query<(), With<TreeSection>>| {
                start.propagate(false);
                let Some((row, dragged)) =
                    find_tree_row(start.event_target(), &parents, &tree_nodes)
                else {
                    return;
                };
                let Some(section) = find_section(row, &parents, &sections) else {
                    return;
                };
                commands.queue(move |world: &mut World| {
                    begin_drag(world, dragged, section);
                });
            },
        ),
        // Drag lifecycle: continuous hover classification
        observe(
            |mut drag_over: On<Pointer<DragOver>>,
             mut commands: Commands,
             parents: Query<&ChildOf>,
             tree_nodes: Query<&TreeNode>,
             sections: Query<(), With<TreeSection>>,
             row_state: Query<
                (&TreeNodeExpanded, &TreeChildrenPopulated, &Children),
                With<TreeNode>,
             >,
             contents: Query<(&ComputedNode, &UiGlobalTransform), With<TreeRowContent>>,
             child_containers: Query<&Children, With<TreeRowChildren>>| {
                drag_over.propagate(false);
                let pointer_y = drag_over.pointer_location.position.y;

                let Some((row, target)) =
                    find_tree_row(drag_over.event_target(), &parents, &tree_nodes)
                else {
                    return;
                };
                let Some(section) = find_section(row, &parents, &sections) else {
                    // A row outside any section carries no drop policy.
                    commands.queue(|world: &mut World| {
                        if world.resource::<DragSession>().hover().is_some() {
                            world.resource_mut::<DragSession>().clear_hover();
                        }
                    });
                    return;
                };
                let Ok((expanded, populated, row_children)) = row_state.get(row) else {
                    return;
                };

                // Row geometry comes from the content strip, not the full row
                // (which grows with its expanded children).
                let Some((computed, transform)) = row_children
                    .iter()
                    .find_map(|child| contents.get(child).ok())
                else {
                    // No resolvable geometry for this update; skip it and keep
                    // the previous hover state until the next valid event.
                    return;
                };
                let scale = computed.inverse_scale_factor();
                let size = computed.size() * scale;
                let (_, _, translation) = transform.to_scale_angle_translation();
                let row_top = translation.y * scale - size.y / 2.0;

                let first_visible_child = (expanded.0 && populated.0)
                    .then(|| {
                        row_children
                            .iter()
                            .find_map(|child| child_containers.get(child).ok())
                            .and_then(|container_children| {
                                container_children
                                    .iter()
                                    .find_map(|row| tree_nodes.get(row).ok().map(|n| n.0))
                            })
                    })
                    .flatten();

                let input = HoverInput {
                    target,
                    section,
                    row_top,
                    row_height: size.y,
                    pointer_y,
                    first_visible_child,
                };
                commands.queue(move |world: &mut World| {
                    update_hover(world, input);
                });
            },
        ),
        // Drag lifecycle: pointer left this row
        observe(
            move |mut leave: On<Pointer<DragLeave>>, mut commands: Commands| {
                leave.propagate(false);
                commands.queue(move |world: &mut World| {
                    leave_hover(world, source);
                });
            },
        ),
        // Drag lifecycle: commit. The session carries the validated target,
        // zone and payload; the event target is deliberately ignored.
        observe(
            |mut drop: On<Pointer<DragDrop>>, mut commands: Commands| {
                drop.propagate(false);
                commands.queue(commit_drop);
            },
        ),
        // Drag lifecycle: gesture ended without a commit (or after one).
        observe(|mut end: On<Pointer<DragEnd>>, mut commands: Commands| {
            end.propagate(false);
            commands.queue(cancel_drag);
        }),
    )
}

fn expand_toggle(has_children: bool, style: &TreeRowStyle) -> impl Bundle {
    let glyph = if has_children {
        String::from(Icon::ChevronRight.unicode())
    } else {
        String::new()
    };

    (
        TreeNodeExpandToggle,
        Node {
            width: px(TOGGLE_WIDTH),
            justify_content: JustifyContent::Center,
            ..default()
        },
        children![(
            Text::new(glyph),
            TextFont {
                font: style.icon_font.clone(),
                font_size: 11.,
                ..default()
            },
            TextColor(tokens::TEXT_MUTED),
        )],
    )
}

fn category_dot(category: EntityCategory) -> impl Bundle {
    let color = match category {
        EntityCategory::Camera => tokens::CATEGORY_CAMERA,
        EntityCategory::Light => tokens::CATEGORY_LIGHT,
        EntityCategory::Mesh => tokens::CATEGORY_MESH,
        EntityCategory::Scene => tokens::CATEGORY_SCENE,
        EntityCategory::Entity => tokens::CATEGORY_ENTITY,
    };

    (
        TreeRowDot,
        Node {
            width: px(DOT_SIZE),
            height: px(DOT_SIZE),
            flex_shrink: 0.0,
            ..default()
        },
        BorderRadius::all(percent(50)),
        BackgroundColor(color),
    )
}

/// Returns observers for the tree background container: releasing a dragged
/// row over empty space moves the entity back to the root level.
pub fn tree_container_drop_observers() -> impl Bundle {
    (
        observe(
            |mut drag_enter: On<Pointer<DragEnter>>,
             session: Res<DragSession>,
             mut bg_query: Query<&mut BackgroundColor>| {
                drag_enter.propagate(false);
                if session.dragged().is_none() {
                    return;
                }
                if let Ok(mut bg) = bg_query.get_mut(drag_enter.event_target()) {
                    bg.0 = tokens::CONTAINER_DROP_TARGET_BG;
                }
            },
        ),
        observe(
            |mut drag_leave: On<Pointer<DragLeave>>,
             mut bg_query: Query<&mut BackgroundColor>| {
                drag_leave.propagate(false);
                if let Ok(mut bg) = bg_query.get_mut(drag_leave.event_target()) {
                    bg.0 = Color::NONE;
                }
            },
        ),
        observe(
            |mut drag_drop: On<Pointer<DragDrop>>,
             mut commands: Commands,
             session: Res<DragSession>,
             mut bg_query: Query<&mut BackgroundColor>| {
                drag_drop.propagate(false);
                let container = drag_drop.event_target();

                if let Ok(mut bg) = bg_query.get_mut(container) {
                    bg.0 = Color::NONE;
                }

                // A populated hover means a row handler owns this release.
                if session.hover().is_some() {
                    return;
                }
                let Some(dragged_source) = session.dragged() else {
                    return;
                };

                commands.trigger(TreeRowDroppedOnRoot {
                    entity: container,
                    dragged_source,
                });
                commands.queue(cancel_drag);
            },
        ),
    )
}

// ---------------------------------------------------------------------------
// Styling systems
// ---------------------------------------------------------------------------

/// Re-style row contents from the drag session: clear every indicator, then
/// paint the resolved hover target (insert line above/below, or reparent
/// highlight).
fn update_drop_indicators(
    session: Res<DragSession>,
    tree_index: Res<TreeIndex>,
    rows: Query<&Children, With<TreeNode>>,
    mut contents: Query<
        (Entity, &mut BackgroundColor, &mut Node, Has<TreeRowSelected>),
        With<TreeRowContent>,
    >,
) {
    for (_, mut bg, mut node, is_selected) in &mut contents {
        bg.0 = if is_selected {
            tokens::SELECTED_BG
        } else {
            tokens::ROW_BG
        };
        node.border = UiRect::ZERO;
    }

    let Some(hover) = session.hover() else {
        return;
    };
    let Some(row) = tree_index.get(hover.target) else {
        return;
    };
    let Ok(children) = rows.get(row) else {
        return;
    };
    for child in children.iter() {
        let Ok((_, mut bg, mut node, _)) = contents.get_mut(child) else {
            continue;
        };
        match hover.zone {
            DropZone::Inside => {
                bg.0 = tokens::DROP_TARGET_BG;
                node.border = UiRect::left(px(3.0));
            }
            DropZone::Before => {
                node.border = UiRect::top(px(2.0));
            }
            DropZone::After => {
                node.border = UiRect::bottom(px(2.0));
            }
        }
        return;
    }
}

/// Swap the toggle glyph between chevron-right and chevron-down.
fn sync_expand_chevrons(
    rows: Query<(&TreeNodeExpanded, &Children), (Changed<TreeNodeExpanded>, With<TreeNode>)>,
    contents: Query<&Children, With<TreeRowContent>>,
    toggles: Query<&Children, With<TreeNodeExpandToggle>>,
    mut glyphs: Query<&mut Text>,
) {
    for (expanded, children) in &rows {
        for child in children.iter() {
            let Ok(content_children) = contents.get(child) else {
                continue;
            };
            for content_child in content_children.iter() {
                let Ok(toggle_children) = toggles.get(content_child) else {
                    continue;
                };
                for glyph_entity in toggle_children.iter() {
                    let Ok(mut text) = glyphs.get_mut(glyph_entity) else {
                        continue;
                    };
                    // Leaf rows keep their blank toggle.
                    if text.0.is_empty() {
                        continue;
                    }
                    let chevron = if expanded.0 {
                        Icon::ChevronDown
                    } else {
                        Icon::ChevronRight
                    };
                    text.0 = String::from(chevron.unicode());
                }
            }
        }
    }
}

/// Show or hide the indented child container as the row expands/collapses.
fn sync_children_visibility(
    rows: Query<(&TreeNodeExpanded, &Children), (Changed<TreeNodeExpanded>, With<TreeNode>)>,
    mut containers: Query<&mut Node, With<TreeRowChildren>>,
) {
    for (expanded, children) in &rows {
        for child in children.iter() {
            if let Ok(mut node) = containers.get_mut(child) {
                node.display = if expanded.0 {
                    Display::Flex
                } else {
                    Display::None
                };
            }
        }
    }
}

pub struct TreeChromePlugin;

impl Plugin for TreeChromePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                sync_expand_chevrons,
                sync_children_visibility,
                update_drop_indicators
                    .run_if(resource_changed::<DragSession>)
                    .in_set(TreeStyleSet),
            ),
        );
    }
}
