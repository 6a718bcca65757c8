use bevy::{feathers::theme::ThemedText, prelude::*, ui_widgets::observe};

use crate::icons::Icon;
use crate::tokens;

const BOX_SIZE: f32 = 13.0;

/// Marker for the clickable checkbox root.
#[derive(Component)]
pub struct Checkbox;

/// Current checkbox value.
#[derive(Component, Default)]
pub struct CheckboxState {
    pub checked: bool,
}

/// Marker for the check glyph inside the box.
#[derive(Component)]
struct CheckboxGlyph;

/// Event fired when a checkbox is toggled by the user.
#[derive(EntityEvent)]
pub struct CheckboxToggled {
    #[event_target]
    pub entity: Entity,
    pub checked: bool,
}

/// A labelled checkbox row. Toggling triggers [`CheckboxToggled`] on the root.
pub fn checkbox(label: &str, checked: bool, icon_font: Handle<Font>) -> impl Bundle {
    let glyph_display = if checked { Display::Flex } else { Display::None };

    (
        Checkbox,
        CheckboxState { checked },
        Node {
            flex_direction: FlexDirection::Row,
            align_items: AlignItems::Center,
            column_gap: px(5.0),
            ..default()
        },
        children![
            (
                Node {
                    width: px(BOX_SIZE),
                    height: px(BOX_SIZE),
                    border: UiRect::all(px(1.0)),
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                BorderColor::all(tokens::BORDER_COLOR),
                BorderRadius::all(tokens::CORNER_RADIUS),
                children![(
                    CheckboxGlyph,
                    Node {
                        display: glyph_display,
                        ..default()
                    },
                    Text::new(String::from(Icon::Check.unicode())),
                    TextFont {
                        font: icon_font,
                        font_size: 10.,
                        ..default()
                    },
                )],
            ),
            (
                Text::new(label),
                TextFont {
                    font_size: tokens::TEXT_SIZE - 1.0,
                    ..default()
                },
                ThemedText,
            )
        ],
        observe(
            |click: On<Pointer<Click>>,
             mut commands: Commands,
             parents: Query<&ChildOf>,
             mut boxes: Query<&mut CheckboxState, With<Checkbox>>| {
                // The click may land on the label or glyph; walk up to the root.
                let mut current = click.event_target();
                for _ in 0..4 {
                    if let Ok(mut state) = boxes.get_mut(current) {
                        state.checked = !state.checked;
                        commands.trigger(CheckboxToggled {
                            entity: current,
                            checked: state.checked,
                        });
                        return;
                    }
                    let Ok(&ChildOf(parent)) = parents.get(current) else {
                        return;
                    };
                    current = parent;
                }
            },
        ),
    )
}

/// Show or hide the check glyph when the state changes.
fn sync_checkbox_glyphs(
    boxes: Query<(&CheckboxState, &Children), (Changed<CheckboxState>, With<Checkbox>)>,
    box_children: Query<&Children>,
    mut glyphs: Query<&mut Node, With<CheckboxGlyph>>,
) {
    for (state, children) in &boxes {
        for child in children.iter() {
            let Ok(grandchildren) = box_children.get(child) else {
                continue;
            };
            for grandchild in grandchildren.iter() {
                if let Ok(mut node) = glyphs.get_mut(grandchild) {
                    node.display = if state.checked {
                        Display::Flex
                    } else {
                        Display::None
                    };
                }
            }
        }
    }
}

pub struct CheckboxPlugin;

impl Plugin for CheckboxPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, sync_checkbox_glyphs);
    }
}
