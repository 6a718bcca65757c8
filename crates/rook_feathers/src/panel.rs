use bevy::{feathers::theme::ThemedText, prelude::*};

use crate::icons::{self, Icon};
use crate::tokens;

/// Marker for a docked panel root.
#[derive(Component)]
pub struct PanelRoot;

/// Marker for a panel header bar.
#[derive(Component)]
pub struct PanelHeader;

/// Marker for the slot row in a panel header where callers add controls.
#[derive(Component)]
pub struct PanelHeaderSlot;

/// Marker for a panel's scrollable body.
#[derive(Component)]
pub struct PanelBody;

/// A docked panel shell: header bar (icon + title + control slot) above a
/// scrollable body. Content is spawned into the body by the registrar.
pub fn panel(title: &str, icon: Icon, icon_font: Handle<Font>) -> impl Bundle {
    (
        PanelRoot,
        Node {
            flex_direction: FlexDirection::Column,
            width: percent(100),
            height: percent(100),
            ..default()
        },
        BackgroundColor(tokens::PANEL_BG),
        children![
            (
                PanelHeader,
                Node {
                    flex_direction: FlexDirection::Row,
                    align_items: AlignItems::Center,
                    column_gap: px(6.0),
                    padding: UiRect::axes(px(8.0), px(4.0)),
                    border: UiRect::bottom(px(1.0)),
                    width: percent(100),
                    ..default()
                },
                BackgroundColor(tokens::PANEL_HEADER_BG),
                BorderColor::all(tokens::BORDER_SUBTLE),
                children![
                    icons::icon_colored(icon, 12.0, icon_font, tokens::TEXT_MUTED),
                    (
                        Text::new(title),
                        TextFont {
                            font_size: tokens::TEXT_SIZE,
                            ..default()
                        },
                        ThemedText,
                    ),
                    (
                        PanelHeaderSlot,
                        Node {
                            flex_direction: FlexDirection::Row,
                            align_items: AlignItems::Center,
                            column_gap: px(8.0),
                            margin: UiRect::left(Val::Auto),
                            ..default()
                        },
                    )
                ],
            ),
            (
                PanelBody,
                Node {
                    flex_direction: FlexDirection::Column,
                    flex_grow: 1.0,
                    width: percent(100),
                    overflow: Overflow::scroll_y(),
                    ..default()
                },
            )
        ],
    )
}
