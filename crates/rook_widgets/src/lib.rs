pub mod drag_drop;
pub mod tree_view;

use bevy::app::{PluginGroup, PluginGroupBuilder};

pub struct RookWidgetsPlugins;

impl PluginGroup for RookWidgetsPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(tree_view::TreeViewPlugin)
            .add(drag_drop::DragDropPlugin)
    }
}
