use bevy::prelude::*;

use crate::reorder;

pub struct CommandHistoryPlugin;

impl Plugin for CommandHistoryPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(CommandHistory::default())
            .add_systems(Update, handle_undo_redo_keys);
    }
}

// ---------------------------------------------------------------------------
// EditorCommand trait
// ---------------------------------------------------------------------------

pub trait EditorCommand: Send + Sync + 'static {
    fn execute(&self, world: &mut World);
    fn undo(&self, world: &mut World);
    fn description(&self) -> &str;
}

// ---------------------------------------------------------------------------
// CommandHistory resource
// ---------------------------------------------------------------------------

#[derive(Resource, Default)]
pub struct CommandHistory {
    pub undo_stack: Vec<Box<dyn EditorCommand>>,
    pub redo_stack: Vec<Box<dyn EditorCommand>>,
}

impl CommandHistory {
    pub fn execute(&mut self, command: Box<dyn EditorCommand>, world: &mut World) {
        command.execute(world);
        self.undo_stack.push(command);
        self.redo_stack.clear();
    }

    pub fn undo(&mut self, world: &mut World) {
        if let Some(command) = self.undo_stack.pop() {
            command.undo(world);
            self.redo_stack.push(command);
        }
    }

    pub fn redo(&mut self, world: &mut World) {
        if let Some(command) = self.redo_stack.pop() {
            command.execute(world);
            self.undo_stack.push(command);
        }
    }
}

// ---------------------------------------------------------------------------
// ReparentEntity
// ---------------------------------------------------------------------------

/// Attach an entity to a new parent (or to the root level for `None`),
/// appending at the end of the destination's children.
pub struct ReparentEntity {
    pub entity: Entity,
    pub old_parent: Option<Entity>,
    pub new_parent: Option<Entity>,
}

impl EditorCommand for ReparentEntity {
    fn execute(&self, world: &mut World) {
        set_parent(world, self.entity, self.new_parent);
    }

    fn undo(&self, world: &mut World) {
        set_parent(world, self.entity, self.old_parent);
    }

    fn description(&self) -> &str {
        "Reparent entity"
    }
}

fn set_parent(world: &mut World, entity: Entity, parent: Option<Entity>) {
    match parent {
        Some(p) => {
            world.entity_mut(entity).insert(ChildOf(p));
        }
        None => {
            world.entity_mut(entity).remove::<ChildOf>();
        }
    }
}

// ---------------------------------------------------------------------------
// ReorderChild
// ---------------------------------------------------------------------------

/// Move an entity to a specific position among a parent's children (or among
/// the root entities for `None`). Indices are positions in the sibling list
/// *without* the moved entity, so executing and undoing are symmetric.
pub struct ReorderChild {
    pub entity: Entity,
    pub old_parent: Option<Entity>,
    pub old_index: usize,
    pub new_parent: Option<Entity>,
    pub new_index: usize,
}

impl EditorCommand for ReorderChild {
    fn execute(&self, world: &mut World) {
        move_to(world, self.entity, self.new_parent, self.new_index);
    }

    fn undo(&self, world: &mut World) {
        move_to(world, self.entity, self.old_parent, self.old_index);
    }

    fn description(&self) -> &str {
        "Reorder entity"
    }
}

fn move_to(world: &mut World, entity: Entity, parent: Option<Entity>, index: usize) {
    world.entity_mut(entity).remove::<ChildOf>();
    match parent {
        Some(p) => {
            let len = world
                .get::<Children>(p)
                .map(|c| c.len())
                .unwrap_or_default();
            world
                .entity_mut(p)
                .insert_children(index.min(len), &[entity]);
        }
        None => {
            // Root ordering has no Children collection; it lives in the
            // per-entity RootIndex components.
            let mut roots = reorder::ordered_roots(world);
            roots.retain(|&e| e != entity);
            let index = index.min(roots.len());
            roots.insert(index, entity);
            reorder::sync_root_indices(world, &roots);
        }
    }
}

// ---------------------------------------------------------------------------
// Keyboard shortcuts
// ---------------------------------------------------------------------------

fn handle_undo_redo_keys(world: &mut World) {
    let keyboard = world.resource::<ButtonInput<KeyCode>>();
    let ctrl = keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]);
    let shift = keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
    let z_pressed = keyboard.just_pressed(KeyCode::KeyZ);

    if !ctrl || !z_pressed {
        return;
    }

    // Take ownership to avoid borrow conflict with world
    let mut history = world.resource_mut::<CommandHistory>();
    let command = if shift {
        history.redo_stack.pop()
    } else {
        history.undo_stack.pop()
    };

    if let Some(command) = command {
        if shift {
            command.execute(world);
            world
                .resource_mut::<CommandHistory>()
                .undo_stack
                .push(command);
        } else {
            command.undo(world);
            world
                .resource_mut::<CommandHistory>()
                .redo_stack
                .push(command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn children_of(world: &World, parent: Entity) -> Vec<Entity> {
        world
            .get::<Children>(parent)
            .map(|c| c.iter().collect())
            .unwrap_or_default()
    }

    #[test]
    fn reparent_round_trips_through_undo() {
        let mut world = World::new();
        let old_parent = world.spawn_empty().id();
        let new_parent = world.spawn_empty().id();
        let entity = world.spawn(ChildOf(old_parent)).id();

        let cmd = ReparentEntity {
            entity,
            old_parent: Some(old_parent),
            new_parent: Some(new_parent),
        };

        cmd.execute(&mut world);
        assert_eq!(world.get::<ChildOf>(entity).map(|c| c.0), Some(new_parent));
        assert_eq!(children_of(&world, new_parent), vec![entity]);
        assert!(children_of(&world, old_parent).is_empty());

        cmd.undo(&mut world);
        assert_eq!(world.get::<ChildOf>(entity).map(|c| c.0), Some(old_parent));
    }

    #[test]
    fn reparent_to_none_moves_entity_to_root() {
        let mut world = World::new();
        let parent = world.spawn_empty().id();
        let entity = world.spawn(ChildOf(parent)).id();

        let cmd = ReparentEntity {
            entity,
            old_parent: Some(parent),
            new_parent: None,
        };

        cmd.execute(&mut world);
        assert!(world.get::<ChildOf>(entity).is_none());

        cmd.undo(&mut world);
        assert_eq!(world.get::<ChildOf>(entity).map(|c| c.0), Some(parent));
    }

    #[test]
    fn reorder_within_parent_round_trips() {
        let mut world = World::new();
        let parent = world.spawn_empty().id();
        let a = world.spawn(ChildOf(parent)).id();
        let b = world.spawn(ChildOf(parent)).id();
        let c = world.spawn(ChildOf(parent)).id();
        assert_eq!(children_of(&world, parent), vec![a, b, c]);

        // Move a after b: in the list without a, b sits at 0, insert at 1.
        let cmd = ReorderChild {
            entity: a,
            old_parent: Some(parent),
            old_index: 0,
            new_parent: Some(parent),
            new_index: 1,
        };

        cmd.execute(&mut world);
        assert_eq!(children_of(&world, parent), vec![b, a, c]);

        cmd.undo(&mut world);
        assert_eq!(children_of(&world, parent), vec![a, b, c]);
    }

    #[test]
    fn reorder_across_parents_round_trips() {
        let mut world = World::new();
        let p1 = world.spawn_empty().id();
        let p2 = world.spawn_empty().id();
        let a = world.spawn(ChildOf(p1)).id();
        let x = world.spawn(ChildOf(p2)).id();
        let y = world.spawn(ChildOf(p2)).id();

        let cmd = ReorderChild {
            entity: a,
            old_parent: Some(p1),
            old_index: 0,
            new_parent: Some(p2),
            new_index: 1,
        };

        cmd.execute(&mut world);
        assert!(children_of(&world, p1).is_empty());
        assert_eq!(children_of(&world, p2), vec![x, a, y]);

        cmd.undo(&mut world);
        assert_eq!(children_of(&world, p1), vec![a]);
        assert_eq!(children_of(&world, p2), vec![x, y]);
    }

    #[test]
    fn history_undo_redo_cycles() {
        let mut world = World::new();
        let parent = world.spawn_empty().id();
        let entity = world.spawn_empty().id();
        let mut history = CommandHistory::default();

        history.execute(
            Box::new(ReparentEntity {
                entity,
                old_parent: None,
                new_parent: Some(parent),
            }),
            &mut world,
        );
        assert_eq!(world.get::<ChildOf>(entity).map(|c| c.0), Some(parent));
        assert_eq!(history.undo_stack.len(), 1);

        history.undo(&mut world);
        assert!(world.get::<ChildOf>(entity).is_none());
        assert_eq!(history.redo_stack.len(), 1);

        history.redo(&mut world);
        assert_eq!(world.get::<ChildOf>(entity).map(|c| c.0), Some(parent));
        assert!(history.redo_stack.is_empty());
    }
}
