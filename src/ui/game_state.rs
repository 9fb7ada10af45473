//! Game state management for the valley GUI
//!
//! Owns the history, the piece selection, and the single search session,
//! and keeps the session bound to the active board: whenever the current
//! board or the collect-scores option changes, the running session is
//! superseded and a new one started for the new position.

use crate::board::{Board, Move, Side};
use crate::history::History;
use crate::rules;
use crate::search::{SearchSession, SessionState};

/// Main game state
pub struct GameState {
    pub history: History,
    pub session: SearchSession,
    pub collect_first_move_scores: bool,
    pub selected: Option<u8>,
    pub message: Option<String>,
    /// Board + option the live session was started for.
    bound: Option<(Board, bool)>,
}

impl GameState {
    pub fn new(session: SearchSession, collect_first_move_scores: bool) -> Self {
        Self {
            history: History::new(),
            session,
            collect_first_move_scores,
            selected: None,
            message: None,
            bound: None,
        }
    }

    /// Board at the history cursor, if a game has started.
    pub fn current_board(&self) -> Option<Board> {
        self.history.current().map(|ply| ply.board)
    }

    /// Move that produced the current ply.
    pub fn last_move(&self) -> Option<Move> {
        self.history.current().and_then(|ply| ply.produced_by)
    }

    pub fn winner(&self) -> Option<Side> {
        self.current_board().and_then(|b| b.winner())
    }

    pub fn start_new_game(&mut self) {
        self.history.new_game(Board::start());
        self.selected = None;
        self.message = None;
    }

    /// Destinations of the currently selected piece.
    pub fn selection_targets(&self) -> Vec<u8> {
        match (self.current_board(), self.selected) {
            (Some(board), Some(from)) => rules::targets(&board, from),
            _ => Vec::new(),
        }
    }

    /// Handle a click on `cell`: confirm a pending move, (re)select an own
    /// piece, or clear the selection.
    pub fn click_cell(&mut self, cell: u8) {
        let Some(board) = self.current_board() else {
            return;
        };
        if board.is_over() {
            self.selected = None;
            return;
        }

        if let Some(from) = self.selected {
            if rules::targets(&board, from).contains(&cell) {
                self.play_move(Move::new(from, cell));
                return;
            }
        }

        if self.selected != Some(cell) && rules::is_selectable(&board, cell) {
            self.selected = Some(cell);
        } else {
            self.selected = None;
        }
    }

    /// Record a pre-validated move at the cursor.
    pub fn play_move(&mut self, m: Move) {
        debug_assert!(
            self.current_board()
                .map_or(false, |b| rules::targets(&b, m.from).contains(&m.to)),
            "move was not validated against the rules"
        );
        self.history.record_move(m);
        self.selected = None;
        self.message = None;
    }

    /// Jump the history cursor to `index`.
    pub fn select_ply(&mut self, index: usize) {
        self.history.select(index);
        self.selected = None;
    }

    /// The engine's current recommendation for the active board.
    pub fn suggested_move(&self) -> Option<Move> {
        if self.winner().is_some() {
            return None;
        }
        self.session.best_move()
    }

    pub fn stop_thinking(&mut self) {
        self.session.stop();
    }

    pub fn is_thinking(&self) -> bool {
        self.session.is_thinking()
    }

    /// Per-frame pump: drain engine messages, then (re)bind the session to
    /// the active board if it changed.
    pub fn pump(&mut self) {
        self.session.poll();

        if matches!(self.session.state(), SessionState::Idle) && self.bound.is_some() {
            // The worker died; allow a later board change to rebind.
            self.message = Some("engine unavailable".to_string());
            self.bound = None;
        }

        let desired = self
            .current_board()
            .map(|board| (board, self.collect_first_move_scores));
        if desired == self.bound {
            return;
        }
        match desired {
            Some((board, collect)) => {
                self.session
                    .start(board, self.history.boards_to_cursor(), collect);
            }
            None => self.session.teardown(),
        }
        self.bound = desired;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{CancelToken, Engine, ProgressRecord};
    use std::time::{Duration, Instant};

    /// Minimal engine: immediately returns the first legal move.
    struct FirstMoveEngine;

    impl Engine for FirstMoveEngine {
        fn find_best_move(
            &mut self,
            board: Board,
            _collect_first_move_scores: bool,
            _history_states: &[Board],
            _stop: &CancelToken,
            progress: &mut dyn FnMut(ProgressRecord),
        ) -> Option<Move> {
            let best = rules::all_moves(&board).first().copied();
            progress(ProgressRecord {
                depth: 1,
                nodes_searched: 1,
                transposition_table_size: 0,
                score: 0,
                best_path: best.into_iter().collect(),
                first_move_scores: Vec::new(),
            });
            best
        }
    }

    fn pumped_state() -> GameState {
        GameState::new(SearchSession::with_engine(FirstMoveEngine), false)
    }

    fn pump_until_done(state: &mut GameState) {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            state.pump();
            if !state.is_thinking() {
                break;
            }
            assert!(Instant::now() < deadline, "session never finished");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_no_game_no_selection() {
        let mut state = pumped_state();
        assert!(state.current_board().is_none());
        state.click_cell(0);
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_click_selects_own_piece_only() {
        let mut state = pumped_state();
        state.start_new_game();

        state.click_cell(20); // black pawn, black is not to move
        assert_eq!(state.selected, None);
        state.click_cell(0); // white pawn
        assert_eq!(state.selected, Some(0));
        state.click_cell(0); // clicking again clears
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_click_target_records_move() {
        let mut state = pumped_state();
        state.start_new_game();

        state.click_cell(0);
        state.click_cell(15); // sliding terminal of the pawn on 0
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.last_move(), Some(Move::new(0, 15)));
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_pump_starts_session_for_new_board() {
        let mut state = pumped_state();
        state.start_new_game();
        pump_until_done(&mut state);
        assert!(state.suggested_move().is_some());
    }

    #[test]
    fn test_board_change_supersedes_session() {
        let mut state = pumped_state();
        state.start_new_game();
        pump_until_done(&mut state);

        state.click_cell(0);
        state.click_cell(15);
        // The next pump rebinds to the new board and discards old thoughts.
        state.pump();
        pump_until_done(&mut state);
        let board = state.current_board().unwrap();
        let suggestion = state.suggested_move().unwrap();
        assert!(rules::all_moves(&board).contains(&suggestion));
    }

    #[test]
    fn test_option_toggle_supersedes_session() {
        let mut state = pumped_state();
        state.start_new_game();
        pump_until_done(&mut state);

        state.collect_first_move_scores = true;
        state.pump();
        // A fresh episode was started for the same board.
        pump_until_done(&mut state);
        assert!(state.suggested_move().is_some());
    }

    #[test]
    fn test_cursor_jump_rebinds_session() {
        let mut state = pumped_state();
        state.start_new_game();
        state.click_cell(0);
        state.click_cell(15);
        pump_until_done(&mut state);

        state.select_ply(0);
        state.pump();
        pump_until_done(&mut state);
        // Suggestion is for the initial board again.
        let suggestion = state.suggested_move().unwrap();
        assert!(rules::all_moves(&Board::start()).contains(&suggestion));
    }
}
