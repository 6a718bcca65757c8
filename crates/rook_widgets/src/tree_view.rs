use std::collections::HashMap;

use bevy::prelude::*;

/// Marker for a tree view container.
#[derive(Component)]
pub struct TreeView;

/// Links a tree row UI entity to the source (scene) entity it represents.
#[derive(Component)]
pub struct TreeNode(pub Entity);

/// Marker for the expand/collapse toggle button of a row.
#[derive(Component)]
pub struct TreeNodeExpandToggle;

/// Tracks whether a tree node is expanded.
#[derive(Component, Default)]
pub struct TreeNodeExpanded(pub bool);

/// Tracks whether a tree node's children have been lazily populated.
/// Set to `true` after first expansion spawns children; prevents re-population
/// on re-expand.
#[derive(Component, Default)]
pub struct TreeChildrenPopulated(pub bool);

/// The hoverable/clickable content area of a tree row (toggle + dot + label).
#[derive(Component)]
pub struct TreeRowContent;

/// Marker on TreeRowContent when its source entity is selected.
#[derive(Component)]
pub struct TreeRowSelected;

/// Container for displaying the row label.
#[derive(Component)]
#[require(Text)]
pub struct TreeRowLabel;

/// Marker for the colored category dot in a tree row.
#[derive(Component)]
pub struct TreeRowDot;

/// Container for child rows (indented).
#[derive(Component)]
pub struct TreeRowChildren;

/// Classifies a scene entity by type for sorting and colored dot display.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntityCategory {
    Camera,
    Light,
    Mesh,
    Scene,
    #[default]
    Entity,
}

// ---------------------------------------------------------------------------
// Index resource: source entity → tree row entity (O(1) lookups)
// ---------------------------------------------------------------------------

/// Maps source (scene) entities to their corresponding tree row UI entities.
/// Maintained automatically from `TreeNode` additions and removals.
#[derive(Resource, Default)]
pub struct TreeIndex {
    /// source entity → tree row entity
    map: HashMap<Entity, Entity>,
}

impl TreeIndex {
    /// Get the tree row entity for a given source entity.
    pub fn get(&self, source: Entity) -> Option<Entity> {
        self.map.get(&source).copied()
    }

    /// Insert a mapping from source entity to tree row entity.
    pub fn insert(&mut self, source: Entity, tree_row: Entity) {
        self.map.insert(source, tree_row);
    }

    /// Remove the mapping for a source entity.
    pub fn remove(&mut self, source: Entity) {
        self.map.remove(&source);
    }

    /// Check if a source entity has a tree row.
    pub fn contains(&self, source: Entity) -> bool {
        self.map.contains_key(&source)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Event fired when a tree row is clicked.
#[derive(EntityEvent)]
pub struct TreeRowClicked {
    #[event_target]
    pub entity: Entity,
    /// The source entity this tree row represents
    pub source_entity: Entity,
}

/// Event fired when a tree row is dropped onto the tree background (deparent).
#[derive(EntityEvent)]
pub struct TreeRowDroppedOnRoot {
    #[event_target]
    pub entity: Entity,
    /// The scene entity being moved back to root
    pub dragged_source: Entity,
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct TreeViewPlugin;

impl Plugin for TreeViewPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TreeIndex>()
            .add_systems(PostUpdate, maintain_tree_index)
            .add_observer(toggle_tree_node_expanded);
    }
}

/// Keep TreeIndex in sync with TreeNode additions and removals.
fn maintain_tree_index(
    mut index: ResMut<TreeIndex>,
    added: Query<(Entity, &TreeNode), Added<TreeNode>>,
    mut removed: RemovedComponents<TreeNode>,
) {
    for (tree_row, tree_node) in &added {
        index.insert(tree_node.0, tree_row);
    }

    for removed_entity in removed.read() {
        // Scan the map to find which source entity maps to this removed tree
        // row. O(n), but only on removal frames.
        let source = index
            .map
            .iter()
            .find(|(_, tree_row)| **tree_row == removed_entity)
            .map(|(source, _)| *source);
        if let Some(source) = source {
            index.remove(source);
        }
    }
}

/// Flip TreeNodeExpanded when an expand toggle is clicked.
fn toggle_tree_node_expanded(
    click: On<Pointer<Click>>,
    mut commands: Commands,
    toggle_query: Query<&ChildOf, With<TreeNodeExpandToggle>>,
    parent_query: Query<&ChildOf>,
    tree_node_query: Query<&TreeNodeExpanded, With<TreeNode>>,
) {
    let Ok(&ChildOf(content)) = toggle_query.get(click.event_target()) else {
        return;
    };
    // The toggle sits inside TreeRowContent, whose parent is the tree row.
    let Ok(&ChildOf(tree_row)) = parent_query.get(content) else {
        return;
    };
    if let Ok(expanded) = tree_node_query.get(tree_row) {
        commands
            .entity(tree_row)
            .insert(TreeNodeExpanded(!expanded.0));
    }
}
