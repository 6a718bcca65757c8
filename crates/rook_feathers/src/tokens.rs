use bevy::color::palettes::tailwind;
use bevy::prelude::*;

// ---------------------------------------------------------------------------
// Corner radius
// ---------------------------------------------------------------------------

pub const CORNER_RADIUS: Val = Val::Px(2.0);

// ---------------------------------------------------------------------------
// Background colors (Tailwind Zinc dark palette)
// ---------------------------------------------------------------------------

/// Root window background
pub const WINDOW_BG: Color = Color::Srgba(tailwind::ZINC_900);
/// Panel body background
pub const PANEL_BG: Color = Color::Srgba(tailwind::ZINC_800);
/// Panel header bar background
pub const PANEL_HEADER_BG: Color = Color::Srgba(tailwind::ZINC_700);

// ---------------------------------------------------------------------------
// Borders & separators
// ---------------------------------------------------------------------------

/// Subtle border / separator
pub const BORDER_SUBTLE: Color = Color::Srgba(tailwind::ZINC_700);
/// Standard widget border
pub const BORDER_COLOR: Color = Color::Srgba(tailwind::ZINC_600);

// ---------------------------------------------------------------------------
// Interactive states
// ---------------------------------------------------------------------------

/// Default tree row background
pub const ROW_BG: Color = Color::NONE;
/// Hovered row / item background
pub const HOVER_BG: Color = Color::srgba(1.0, 1.0, 1.0, 0.1);
/// Selected item background
pub const SELECTED_BG: Color = Color::srgba(0.0, 0.204, 0.431, 1.0);

// ---------------------------------------------------------------------------
// Drag-and-drop indicators
// ---------------------------------------------------------------------------

/// Row background while it is the reparent target
pub const DROP_TARGET_BG: Color = Color::srgba(0.3, 0.5, 0.2, 1.0);
/// Accent for drop indicator borders (reparent edge, insert lines)
pub const DROP_TARGET_BORDER: Color = Color::srgba(0.3, 0.7, 0.4, 1.0);
/// Tree background tint while dragging over empty container space
pub const CONTAINER_DROP_TARGET_BG: Color = Color::srgba(0.2, 0.3, 0.2, 0.3);
/// Short-lived highlight on a row that was just moved by a drop
pub const DROP_FLASH_BG: Color = Color::srgba(0.3, 0.7, 0.4, 0.35);

// ---------------------------------------------------------------------------
// Category dots
// ---------------------------------------------------------------------------

pub const CATEGORY_CAMERA: Color = Color::Srgba(tailwind::AMBER_400);
pub const CATEGORY_LIGHT: Color = Color::Srgba(tailwind::YELLOW_300);
pub const CATEGORY_MESH: Color = Color::Srgba(tailwind::SKY_400);
pub const CATEGORY_SCENE: Color = Color::Srgba(tailwind::VIOLET_400);
pub const CATEGORY_ENTITY: Color = Color::Srgba(tailwind::ZINC_400);

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

pub const TEXT_SIZE: f32 = 13.0;
pub const TEXT_MUTED: Color = Color::Srgba(tailwind::ZINC_400);
