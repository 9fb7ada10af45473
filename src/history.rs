//! Branching move history
//!
//! The game log is a sequence of plies plus a cursor marking the active
//! one. Selecting an earlier ply never mutates the sequence; recording a
//! move from an interior cursor truncates everything after it first, so a
//! redo branch is abandoned rather than retained.

use crate::board::{Board, Move};

/// One half-move state: a board plus the move that produced it (absent for
/// the initial ply of a game).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ply {
    pub board: Board,
    pub produced_by: Option<Move>,
}

/// Append/cursor log of board states.
///
/// Starts empty; [`History::new_game`] seeds the first ply. The invariant
/// maintained throughout: replaying the recorded moves from index 0 through
/// the cursor via [`Board::apply`] reproduces the board at the cursor.
#[derive(Debug, Clone, Default)]
pub struct History {
    plies: Vec<Ply>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to a single-ply log holding `initial`, cursor on it.
    pub fn new_game(&mut self, initial: Board) {
        self.plies = vec![Ply {
            board: initial,
            produced_by: None,
        }];
        self.cursor = 0;
    }

    /// Apply `m` to the board at the cursor, discard any plies after the
    /// cursor, append the result and advance onto it.
    ///
    /// Precondition: a game has started and `m` has been validated against
    /// [`crate::rules::targets`] for the current board.
    pub fn record_move(&mut self, m: Move) {
        debug_assert!(!self.plies.is_empty(), "record_move before new_game");
        let next = self.plies[self.cursor].board.apply(m);
        self.plies.truncate(self.cursor + 1);
        self.plies.push(Ply {
            board: next,
            produced_by: Some(m),
        });
        self.cursor += 1;
    }

    /// Move the cursor without touching the sequence.
    pub fn select(&mut self, index: usize) {
        assert!(index < self.plies.len(), "ply index out of range");
        self.cursor = index;
    }

    /// The active ply, if a game has started.
    pub fn current(&self) -> Option<&Ply> {
        self.plies.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.plies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plies.is_empty()
    }

    pub fn plies(&self) -> &[Ply] {
        &self.plies
    }

    /// Boards along the played path, from the initial ply up to and
    /// including the cursor. This is the `history_states` payload of a
    /// search request.
    pub fn boards_to_cursor(&self) -> Vec<Board> {
        if self.plies.is_empty() {
            return Vec::new();
        }
        self.plies[..=self.cursor].iter().map(|ply| ply.board).collect()
    }
}
