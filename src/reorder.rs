use bevy::prelude::*;
use rook_widgets::drag_drop::{
    DragDropProvider, DropData, DropPlan, DropRequest, DropZone, ZoneBands,
};

use crate::commands::{CommandHistory, ReorderChild, ReparentEntity};
use crate::settings::ExplorerSettings;
use crate::{EditorEntity, EditorHidden};

/// Cached position of a root-level entity. Bevy keeps sibling order inside
/// `Children`, but root entities have no collection holding them, so manual
/// ordering at the root level is stored per-entity and re-synchronized after
/// every root splice.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RootIndex(pub usize);

/// The decision carried from hover evaluation to commit. Computed once while
/// hovering and never re-derived at release time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReorderAction {
    Reparent {
        parent: Entity,
    },
    Insert {
        parent: Option<Entity>,
        reference: Entity,
        after: bool,
    },
}

/// Drag-and-drop policy for the scene tree: the middle of a row reparents,
/// thin bands at the top and bottom insert as a sibling before/after it.
pub struct SceneReorderProvider;

impl DragDropProvider for SceneReorderProvider {
    fn zone_bands(&self) -> ZoneBands {
        ZoneBands::REORDER
    }

    fn evaluate_drop(&self, world: &World, request: &DropRequest) -> Option<DropPlan> {
        // With alphabetical sort on, sibling order is derived, not authored;
        // every zone collapses to reparenting under the target.
        if world.resource::<ExplorerSettings>().sort_alphabetical {
            return Some(DropPlan {
                visual: DropZone::Inside,
                data: Box::new(ReorderAction::Reparent {
                    parent: request.target,
                }),
            });
        }

        let action = match request.zone {
            DropZone::Inside => ReorderAction::Reparent {
                parent: request.target,
            },
            DropZone::Before | DropZone::After => ReorderAction::Insert {
                parent: world.get::<ChildOf>(request.target).map(|c| c.0),
                reference: request.target,
                after: request.zone == DropZone::After,
            },
        };

        Some(DropPlan {
            visual: request.zone,
            data: Box::new(action),
        })
    }

    fn perform_drop(&self, world: &mut World, request: &DropRequest, data: DropData) {
        let Ok(action) = data.downcast::<ReorderAction>() else {
            warn!("Reorder drop carried a foreign payload; ignoring");
            return;
        };

        match *action {
            ReorderAction::Reparent { parent } => {
                let old_parent = world.get::<ChildOf>(request.dragged).map(|c| c.0);
                if old_parent == Some(parent) {
                    return;
                }
                let cmd = ReparentEntity {
                    entity: request.dragged,
                    old_parent,
                    new_parent: Some(parent),
                };
                world.resource_scope(|world, mut history: Mut<CommandHistory>| {
                    history.execute(Box::new(cmd), world);
                });
            }
            ReorderAction::Insert {
                parent,
                reference,
                after,
            } => {
                let siblings = match parent {
                    Some(p) => world
                        .get::<Children>(p)
                        .map(|c| c.iter().collect())
                        .unwrap_or_default(),
                    None => ordered_roots(world),
                };
                let Some(new_index) =
                    sibling_insert_index(&siblings, request.dragged, reference, after)
                else {
                    // The reference sibling vanished between hover and release.
                    return;
                };

                let old_parent = world.get::<ChildOf>(request.dragged).map(|c| c.0);
                let old_index = match old_parent {
                    Some(p) => world
                        .get::<Children>(p)
                        .and_then(|c| c.iter().position(|e| e == request.dragged))
                        .unwrap_or_default(),
                    None => ordered_roots(world)
                        .iter()
                        .position(|&e| e == request.dragged)
                        .unwrap_or_default(),
                };

                let cmd = ReorderChild {
                    entity: request.dragged,
                    old_parent,
                    old_index,
                    new_parent: parent,
                    new_index,
                };
                world.resource_scope(|world, mut history: Mut<CommandHistory>| {
                    history.execute(Box::new(cmd), world);
                });
            }
        }
    }
}

/// Where to insert `dragged` in `siblings`, relative to `reference`, counting
/// positions in the list *without* `dragged`. If `dragged` currently precedes
/// the reference, the reference shifts down by one after removal.
pub fn sibling_insert_index(
    siblings: &[Entity],
    dragged: Entity,
    reference: Entity,
    after: bool,
) -> Option<usize> {
    let mut reference_index = siblings.iter().position(|&e| e == reference)?;
    if let Some(dragged_index) = siblings.iter().position(|&e| e == dragged) {
        if dragged_index < reference_index {
            reference_index -= 1;
        }
    }
    Some(if after {
        reference_index + 1
    } else {
        reference_index
    })
}

/// Root-level scene entities in display order: indexed roots first by their
/// `RootIndex`, never-ordered roots after them in spawn order.
pub fn ordered_roots(world: &mut World) -> Vec<Entity> {
    let mut roots: Vec<(Entity, Option<RootIndex>)> = world
        .query_filtered::<(Entity, Option<&RootIndex>), (
            With<Transform>,
            Without<ChildOf>,
            Without<EditorEntity>,
            Without<EditorHidden>,
        )>()
        .iter(world)
        .map(|(entity, index)| (entity, index.copied()))
        .collect();

    roots.sort_by_key(|(entity, index)| {
        (index.map(|RootIndex(n)| n).unwrap_or(usize::MAX), entity.index())
    });
    roots.into_iter().map(|(entity, _)| entity).collect()
}

/// Rewrite every root's cached positional index to match `order`.
pub fn sync_root_indices(world: &mut World, order: &[Entity]) {
    for (position, &entity) in order.iter().enumerate() {
        if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
            entity_mut.insert(RootIndex(position));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rook_widgets::drag_drop::{
        begin_drag, commit_drop, update_hover, DragDropOverrides, DragSession, HoverInput,
        LastDropResult, TreeSection,
    };

    fn test_world() -> World {
        let mut world = World::new();
        world.init_resource::<ExplorerSettings>();
        world.init_resource::<CommandHistory>();
        world.init_resource::<DragSession>();
        world.init_resource::<LastDropResult>();
        world.init_resource::<DragDropOverrides>();
        world
    }

    fn children_of(world: &World, parent: Entity) -> Vec<Entity> {
        world
            .get::<Children>(parent)
            .map(|c| c.iter().collect())
            .unwrap_or_default()
    }

    // === Splice arithmetic ===

    #[test]
    fn insert_index_before_reference() {
        let mut world = World::new();
        let ids: Vec<Entity> = (0..4).map(|_| world.spawn_empty().id()).collect();
        // dragged at 3, reference at 1: no shift, insert before => 1
        assert_eq!(
            sibling_insert_index(&ids, ids[3], ids[1], false),
            Some(1)
        );
    }

    #[test]
    fn insert_index_accounts_for_removal_shift() {
        let mut world = World::new();
        let ids: Vec<Entity> = (0..4).map(|_| world.spawn_empty().id()).collect();
        // dragged at 0 precedes reference at 2: reference shifts to 1
        assert_eq!(sibling_insert_index(&ids, ids[0], ids[2], false), Some(1));
        assert_eq!(sibling_insert_index(&ids, ids[0], ids[2], true), Some(2));
    }

    #[test]
    fn insert_index_foreign_dragged_needs_no_shift() {
        let mut world = World::new();
        let ids: Vec<Entity> = (0..3).map(|_| world.spawn_empty().id()).collect();
        let foreign = world.spawn_empty().id();
        assert_eq!(sibling_insert_index(&ids, foreign, ids[1], true), Some(2));
    }

    #[test]
    fn insert_index_missing_reference_is_none() {
        let mut world = World::new();
        let ids: Vec<Entity> = (0..2).map(|_| world.spawn_empty().id()).collect();
        let gone = world.spawn_empty().id();
        assert_eq!(sibling_insert_index(&ids, ids[0], gone, false), None);
    }

    // === Evaluation ===

    #[test]
    fn middle_zone_plans_reparent() {
        let mut world = test_world();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let plan = SceneReorderProvider
            .evaluate_drop(
                &world,
                &DropRequest {
                    dragged: a,
                    target: b,
                    zone: DropZone::Inside,
                },
            )
            .expect("reparent plan");
        assert_eq!(plan.visual, DropZone::Inside);
        let action = plan.data.downcast::<ReorderAction>().unwrap();
        assert_eq!(*action, ReorderAction::Reparent { parent: b });
    }

    #[test]
    fn edge_zones_plan_insert_relative_to_target() {
        let mut world = test_world();
        let parent = world.spawn_empty().id();
        let a = world.spawn(ChildOf(parent)).id();
        let b = world.spawn(ChildOf(parent)).id();

        let plan = SceneReorderProvider
            .evaluate_drop(
                &world,
                &DropRequest {
                    dragged: a,
                    target: b,
                    zone: DropZone::After,
                },
            )
            .expect("insert plan");
        assert_eq!(plan.visual, DropZone::After);
        let action = plan.data.downcast::<ReorderAction>().unwrap();
        assert_eq!(
            *action,
            ReorderAction::Insert {
                parent: Some(parent),
                reference: b,
                after: true,
            }
        );
    }

    #[test]
    fn sort_locked_trees_always_plan_reparent() {
        let mut world = test_world();
        world.resource_mut::<ExplorerSettings>().sort_alphabetical = true;
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();

        for zone in [DropZone::Before, DropZone::Inside, DropZone::After] {
            let plan = SceneReorderProvider
                .evaluate_drop(
                    &world,
                    &DropRequest {
                        dragged: a,
                        target: b,
                        zone,
                    },
                )
                .expect("sorted trees still accept drops");
            assert_eq!(plan.visual, DropZone::Inside, "zone {zone:?}");
            let action = plan.data.downcast::<ReorderAction>().unwrap();
            assert_eq!(*action, ReorderAction::Reparent { parent: b });
        }
    }

    // === Commit ===

    #[test]
    fn perform_reparent_moves_entity_under_target() {
        let mut world = test_world();
        let a = world.spawn(Transform::default()).id();
        let b = world.spawn(Transform::default()).id();

        let request = DropRequest {
            dragged: a,
            target: b,
            zone: DropZone::Inside,
        };
        let plan = SceneReorderProvider.evaluate_drop(&world, &request).unwrap();
        SceneReorderProvider.perform_drop(&mut world, &request, plan.data);

        assert_eq!(world.get::<ChildOf>(a).map(|c| c.0), Some(b));
        assert_eq!(children_of(&world, b), vec![a]);
        assert_eq!(world.resource::<CommandHistory>().undo_stack.len(), 1);
    }

    #[test]
    fn perform_insert_splices_sibling_order_with_undo() {
        let mut world = test_world();
        let parent = world.spawn_empty().id();
        let a = world.spawn(ChildOf(parent)).id();
        let b = world.spawn(ChildOf(parent)).id();
        let c = world.spawn(ChildOf(parent)).id();

        let request = DropRequest {
            dragged: a,
            target: c,
            zone: DropZone::After,
        };
        let plan = SceneReorderProvider.evaluate_drop(&world, &request).unwrap();
        SceneReorderProvider.perform_drop(&mut world, &request, plan.data);
        assert_eq!(children_of(&world, parent), vec![b, c, a]);

        world.resource_scope(|world, mut history: Mut<CommandHistory>| {
            history.undo(world);
        });
        assert_eq!(children_of(&world, parent), vec![a, b, c]);
    }

    #[test]
    fn perform_insert_at_root_level_resyncs_cached_indices() {
        let mut world = test_world();
        let r1 = world.spawn((Transform::default(), RootIndex(0))).id();
        let r2 = world.spawn((Transform::default(), RootIndex(1))).id();
        let r3 = world.spawn((Transform::default(), RootIndex(2))).id();

        let request = DropRequest {
            dragged: r1,
            target: r2,
            zone: DropZone::After,
        };
        let plan = SceneReorderProvider.evaluate_drop(&world, &request).unwrap();
        SceneReorderProvider.perform_drop(&mut world, &request, plan.data);

        assert_eq!(ordered_roots(&mut world), vec![r2, r1, r3]);
        assert_eq!(world.get::<RootIndex>(r2), Some(&RootIndex(0)));
        assert_eq!(world.get::<RootIndex>(r1), Some(&RootIndex(1)));
        assert_eq!(world.get::<RootIndex>(r3), Some(&RootIndex(2)));
    }

    #[test]
    fn reparent_onto_current_parent_is_a_no_op() {
        let mut world = test_world();
        let parent = world.spawn_empty().id();
        let a = world.spawn(ChildOf(parent)).id();
        let _b = world.spawn(ChildOf(parent)).id();

        let request = DropRequest {
            dragged: a,
            target: parent,
            zone: DropZone::Inside,
        };
        let plan = SceneReorderProvider.evaluate_drop(&world, &request).unwrap();
        SceneReorderProvider.perform_drop(&mut world, &request, plan.data);

        assert!(world.resource::<CommandHistory>().undo_stack.is_empty());
    }

    // === End to end through the coordinator ===

    #[test]
    fn drag_over_row_middle_reparents_on_release() {
        let mut world = test_world();
        let section = world.spawn(TreeSection::new(SceneReorderProvider)).id();
        let a = world.spawn(Transform::default()).id();
        let b = world.spawn(Transform::default()).id();

        assert!(begin_drag(&mut world, a, section));
        update_hover(
            &mut world,
            HoverInput {
                target: b,
                section,
                row_top: 0.0,
                row_height: 20.0,
                pointer_y: 10.0,
                first_visible_child: None,
            },
        );
        assert_eq!(
            world.resource::<DragSession>().hover().map(|h| h.zone),
            Some(DropZone::Inside)
        );

        commit_drop(&mut world);
        assert_eq!(world.get::<ChildOf>(a).map(|c| c.0), Some(b));
        assert!(world.resource::<DragSession>().is_idle());
        assert!(world.resource::<LastDropResult>().0.is_some());
    }

    #[test]
    fn drag_below_expanded_row_inserts_before_first_child() {
        let mut world = test_world();
        let section = world.spawn(TreeSection::new(SceneReorderProvider)).id();
        let parent = world.spawn(Transform::default()).id();
        let child1 = world.spawn((Transform::default(), ChildOf(parent))).id();
        let child2 = world.spawn((Transform::default(), ChildOf(parent))).id();
        let a = world.spawn(Transform::default()).id();

        assert!(begin_drag(&mut world, a, section));
        update_hover(
            &mut world,
            HoverInput {
                target: parent,
                section,
                row_top: 0.0,
                row_height: 20.0,
                pointer_y: 18.0, // bottom band
                first_visible_child: Some(child1),
            },
        );
        let hover = world.resource::<DragSession>().hover().unwrap();
        assert_eq!(hover.target, child1);
        assert_eq!(hover.zone, DropZone::Before);

        commit_drop(&mut world);
        assert_eq!(children_of(&world, parent), vec![a, child1, child2]);
    }
}
