//! Theme constants for the valley GUI

use egui::Color32;

// Board colors - warm wood tones
pub const CELL_LIGHT: Color32 = Color32::from_rgb(222, 184, 135); // Burlywood
pub const CELL_DARK: Color32 = Color32::from_rgb(188, 146, 98);
pub const VALLEY_TINT: Color32 = Color32::from_rgb(150, 118, 180);
pub const GRID_LINE: Color32 = Color32::from_rgb(60, 40, 20);

// Piece colors with better contrast
pub const BLACK_PIECE: Color32 = Color32::from_rgb(25, 25, 30);
pub const BLACK_PIECE_HIGHLIGHT: Color32 = Color32::from_rgb(70, 70, 80);
pub const WHITE_PIECE: Color32 = Color32::from_rgb(250, 250, 252);
pub const WHITE_PIECE_SHADOW: Color32 = Color32::from_rgb(190, 190, 195);
pub const KING_RING: Color32 = Color32::from_rgb(212, 175, 55);

// Markers
pub const SELECTED_OUTLINE: Color32 = Color32::from_rgb(80, 160, 255);
pub const TARGET_MARKER: Color32 = Color32::from_rgba_premultiplied(40, 120, 40, 160);
pub const MOVE_ARROW: Color32 = Color32::from_rgb(40, 160, 60);
pub const FROM_CELL_TINT: Color32 = Color32::from_rgba_premultiplied(60, 120, 60, 60);
pub const TO_CELL_TINT: Color32 = Color32::from_rgba_premultiplied(60, 120, 60, 100);
pub const WIN_HIGHLIGHT: Color32 = Color32::from_rgb(50, 220, 50);

// Panel colors - dark modern theme
pub const PANEL_BG: Color32 = Color32::from_rgb(25, 27, 31);
pub const CARD_BG: Color32 = Color32::from_rgb(35, 38, 43);
pub const BOARD_AREA_BG: Color32 = Color32::from_rgb(40, 42, 46);
pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(240, 240, 245);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(160, 165, 175);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(120, 125, 135);

// Status colors
pub const THINKING: Color32 = Color32::from_rgb(255, 180, 50);
pub const READY: Color32 = Color32::from_rgb(80, 200, 120);

// Functions for colors that can't be const
pub fn hover_selectable() -> Color32 {
    Color32::from_rgba_unmultiplied(255, 255, 255, 40)
}

// Sizes
pub const BOARD_MARGIN: f32 = 16.0;
pub const PIECE_RADIUS_RATIO: f32 = 0.36;
pub const GRID_LINE_WIDTH: f32 = 1.0;
pub const ARROW_WIDTH: f32 = 3.0;
