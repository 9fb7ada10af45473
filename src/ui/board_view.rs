//! Board rendering for the valley GUI

use egui::{Color32, CornerRadius, Painter, Pos2, Rect, Sense, Stroke, Vec2};

use crate::board::{cell_at, cell_col, cell_row, Board, Cell, Move, BOARD_SIZE, CELL_COUNT, VALLEY};
use crate::rules;

use super::theme::*;

/// Board view handles rendering and input for the 5x5 game board
pub struct BoardView {
    /// Cached cell size for coordinate calculations
    cell_size: f32,
    /// Board drawing area
    board_rect: Rect,
}

impl Default for BoardView {
    fn default() -> Self {
        Self {
            cell_size: 60.0,
            board_rect: Rect::NOTHING,
        }
    }
}

impl BoardView {
    /// Render the board and return the clicked cell, if any.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        board: &Board,
        selected: Option<u8>,
        targets: &[u8],
        last_move: Option<Move>,
        game_over: bool,
    ) -> Option<u8> {
        let available_size = ui.available_size();
        let board_size = available_size.x.min(available_size.y) - 20.0;
        self.cell_size = (board_size - 2.0 * BOARD_MARGIN) / BOARD_SIZE as f32;

        let (response, painter) =
            ui.allocate_painter(Vec2::new(board_size, board_size), Sense::click());
        self.board_rect = response.rect;

        let flat = board.decode();

        // Cell backgrounds
        for cell in 0..CELL_COUNT as u8 {
            let rect = self.cell_rect(cell);
            let fill = if cell == VALLEY {
                VALLEY_TINT
            } else if (cell_row(cell) + cell_col(cell)) % 2 == 0 {
                CELL_LIGHT
            } else {
                CELL_DARK
            };
            painter.rect_filled(rect, CornerRadius::ZERO, fill);
        }

        // Last move tint under everything else
        if let Some(m) = last_move {
            painter.rect_filled(self.cell_rect(m.from), CornerRadius::ZERO, FROM_CELL_TINT);
            painter.rect_filled(self.cell_rect(m.to), CornerRadius::ZERO, TO_CELL_TINT);
        }

        self.draw_grid(&painter);

        // Pieces
        for (i, cell) in flat.iter().enumerate() {
            if !cell.is_empty() {
                self.draw_piece(&painter, i as u8, *cell);
            }
        }

        // Selection and candidate destinations
        if let Some(sel) = selected {
            painter.rect_stroke(
                self.cell_rect(sel).shrink(2.0),
                CornerRadius::same(3),
                Stroke::new(3.0, SELECTED_OUTLINE),
                egui::StrokeKind::Inside,
            );
            for &t in targets {
                let center = self.cell_center(t);
                painter.circle_filled(center, self.cell_size * 0.12, TARGET_MARKER);
            }
        }

        if let Some(m) = last_move {
            self.draw_move_arrow(&painter, m);
        }

        // Hover and click handling
        let mut clicked_cell = None;
        if !game_over {
            if let Some(pointer_pos) = response.hover_pos() {
                if let Some(cell) = self.screen_to_cell(pointer_pos) {
                    let interesting = rules::is_selectable(board, cell)
                        || (selected.is_some() && targets.contains(&cell));
                    if interesting {
                        painter.rect_filled(
                            self.cell_rect(cell),
                            CornerRadius::ZERO,
                            hover_selectable(),
                        );
                    }
                    if response.clicked() {
                        clicked_cell = Some(cell);
                    }
                }
            }
        }

        clicked_cell
    }

    fn draw_grid(&self, painter: &Painter) {
        let stroke = Stroke::new(GRID_LINE_WIDTH, GRID_LINE);
        for i in 0..=BOARD_SIZE {
            let offset = BOARD_MARGIN + i as f32 * self.cell_size;
            let span = BOARD_SIZE as f32 * self.cell_size;

            let start = self.board_rect.min + Vec2::new(offset, BOARD_MARGIN);
            let end = self.board_rect.min + Vec2::new(offset, BOARD_MARGIN + span);
            painter.line_segment([start, end], stroke);

            let start = self.board_rect.min + Vec2::new(BOARD_MARGIN, offset);
            let end = self.board_rect.min + Vec2::new(BOARD_MARGIN + span, offset);
            painter.line_segment([start, end], stroke);
        }
    }

    /// Draw a single piece with visual polish
    fn draw_piece(&self, painter: &Painter, cell: u8, piece: Cell) {
        let center = self.cell_center(cell);
        let radius = self.cell_size * PIECE_RADIUS_RATIO;
        let is_white = matches!(piece, Cell::WhitePawn | Cell::WhiteKing);

        // Shadow
        let shadow_offset = Vec2::new(2.0, 2.0);
        painter.circle_filled(
            center + shadow_offset,
            radius,
            Color32::from_rgba_unmultiplied(0, 0, 0, if is_white { 40 } else { 60 }),
        );

        if is_white {
            painter.circle_filled(center, radius, WHITE_PIECE);
            painter.circle_stroke(
                center,
                radius * 0.85,
                Stroke::new(radius * 0.1, WHITE_PIECE_SHADOW),
            );
        } else {
            painter.circle_filled(center, radius, BLACK_PIECE);
            let highlight_offset = Vec2::new(-radius * 0.3, -radius * 0.3);
            painter.circle_filled(
                center + highlight_offset,
                radius * 0.2,
                BLACK_PIECE_HIGHLIGHT,
            );
        }

        // Kings carry a golden ring
        if piece.is_king() {
            painter.circle_stroke(center, radius * 0.55, Stroke::new(3.0, KING_RING));
        }
    }

    /// Arrow from the last move's origin to its destination
    fn draw_move_arrow(&self, painter: &Painter, m: Move) {
        let from = self.cell_center(m.from);
        let to = self.cell_center(m.to);
        let stroke = Stroke::new(ARROW_WIDTH, MOVE_ARROW);
        painter.line_segment([from, to], stroke);

        // Arrowhead
        let dir = (to - from).normalized();
        let side = Vec2::new(-dir.y, dir.x);
        let tip_len = self.cell_size * 0.18;
        painter.line_segment([to, to - dir * tip_len + side * tip_len * 0.6], stroke);
        painter.line_segment([to, to - dir * tip_len - side * tip_len * 0.6], stroke);
    }

    fn cell_rect(&self, cell: u8) -> Rect {
        let min = self.board_rect.min
            + Vec2::new(
                BOARD_MARGIN + cell_col(cell) as f32 * self.cell_size,
                BOARD_MARGIN + cell_row(cell) as f32 * self.cell_size,
            );
        Rect::from_min_size(min, Vec2::splat(self.cell_size))
    }

    fn cell_center(&self, cell: u8) -> Pos2 {
        self.cell_rect(cell).center()
    }

    /// Convert screen coordinates to a cell index
    pub fn screen_to_cell(&self, screen_pos: Pos2) -> Option<u8> {
        let relative = screen_pos - self.board_rect.min;
        let col = ((relative.x - BOARD_MARGIN) / self.cell_size).floor() as i32;
        let row = ((relative.y - BOARD_MARGIN) / self.cell_size).floor() as i32;

        if col >= 0 && col < BOARD_SIZE as i32 && row >= 0 && row < BOARD_SIZE as i32 {
            Some(cell_at(row as u8, col as u8))
        } else {
            None
        }
    }
}
