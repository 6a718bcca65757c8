pub mod checkbox;
pub mod icons;
pub mod panel;
pub mod tokens;
pub mod tree_view;

use bevy::app::Plugin;

pub struct RookFeathersPlugin;

impl Plugin for RookFeathersPlugin {
    fn build(&self, app: &mut bevy::app::App) {
        app.add_plugins((
            rook_widgets::RookWidgetsPlugins,
            icons::IconFontPlugin,
            checkbox::CheckboxPlugin,
            tree_view::TreeChromePlugin,
        ));
    }
}
