//! Canonical board encoding and the move transition function

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Cell, Side, CELL_COUNT, VALLEY};

// Layout of the 11-byte encoding.
const WHITE_PAWNS: std::ops::Range<usize> = 0..4;
const BLACK_PAWNS: std::ops::Range<usize> = 4..8;
const WHITE_KING: usize = 8;
const BLACK_KING: usize = 9;
const TURN: usize = 10;

/// Starting position: pawns on the near ranks, each king on the far rank
/// behind the opposing pawns, white to move.
const START: [u8; 11] = [0, 1, 3, 4, 20, 21, 23, 24, 22, 2, 1];

/// A move of one piece between two cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: u8,
    pub to: u8,
}

impl Move {
    #[inline]
    pub fn new(from: u8, to: u8) -> Self {
        debug_assert!(from != to);
        debug_assert!((from as usize) < CELL_COUNT && (to as usize) < CELL_COUNT);
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \u{2192} {}", self.from, self.to)
    }
}

/// Canonical board state.
///
/// Encoded as a fixed-order vector of 11 integers:
/// `[wp0..wp3, bp0..bp3, whiteKing, blackKing, turn]`, where each entry in
/// 0..10 is a cell index (0-24, row-major) and `turn` is 1 when white is to
/// move. Pawn entries are kept in ascending cell order per side; pawns are
/// fungible, so [`Board::apply`] rebuilds both lists by rescanning all 25
/// cells after every transition. Two boards with the same pieces on the
/// same cells therefore always compare equal, which also makes `Board`
/// usable as a transposition-table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [u8; 11],
}

impl Board {
    /// Wrap a raw 11-byte encoding.
    #[inline]
    pub fn new(cells: [u8; 11]) -> Self {
        debug_assert!(cells[..TURN].iter().all(|&c| (c as usize) < CELL_COUNT));
        debug_assert!(cells[TURN] <= 1);
        Self { cells }
    }

    /// The standard starting position.
    #[inline]
    pub fn start() -> Self {
        Self::new(START)
    }

    /// Raw encoding.
    #[inline]
    pub fn cells(&self) -> &[u8; 11] {
        &self.cells
    }

    #[inline]
    pub fn white_king(&self) -> u8 {
        self.cells[WHITE_KING]
    }

    #[inline]
    pub fn black_king(&self) -> u8 {
        self.cells[BLACK_KING]
    }

    #[inline]
    pub fn white_pawns(&self) -> &[u8] {
        &self.cells[WHITE_PAWNS]
    }

    #[inline]
    pub fn black_pawns(&self) -> &[u8] {
        &self.cells[BLACK_PAWNS]
    }

    /// Side to move, derived from the turn byte (1 = white).
    #[inline]
    pub fn whose_turn(&self) -> Side {
        if self.cells[TURN] == 1 {
            Side::White
        } else {
            Side::Black
        }
    }

    /// Expand the encoding into a cell-indexed occupancy map.
    pub fn decode(&self) -> [Cell; CELL_COUNT] {
        let mut flat = [Cell::Empty; CELL_COUNT];
        for &c in &self.cells[WHITE_PAWNS] {
            flat[c as usize] = Cell::WhitePawn;
        }
        for &c in &self.cells[BLACK_PAWNS] {
            flat[c as usize] = Cell::BlackPawn;
        }
        flat[self.cells[WHITE_KING] as usize] = Cell::WhiteKing;
        flat[self.cells[BLACK_KING] as usize] = Cell::BlackKing;
        flat
    }

    /// Piece at a single cell.
    #[inline]
    pub fn get(&self, cell: u8) -> Cell {
        self.decode()[cell as usize]
    }

    /// Apply a move and return the resulting board.
    ///
    /// Pure relocation: the piece at `m.from` ends up at `m.to`, nothing is
    /// ever removed, and the turn byte flips. The result is re-canonicalized
    /// by rescanning all 25 cells in ascending order, so which same-color
    /// pawn "actually" moved is unobservable.
    ///
    /// Precondition (not re-validated here): `m.from` is occupied and `m.to`
    /// is a legal destination per [`crate::rules::targets`]. Callers must
    /// pre-validate user-constructed moves.
    pub fn apply(&self, m: Move) -> Board {
        let mut flat = self.decode();
        debug_assert!(!flat[m.from as usize].is_empty(), "apply from an empty cell");
        debug_assert!(flat[m.to as usize].is_empty(), "apply onto an occupied cell");
        flat[m.to as usize] = flat[m.from as usize];
        flat[m.from as usize] = Cell::Empty;

        let mut next = [0u8; 11];
        let mut wp = WHITE_PAWNS.start;
        let mut bp = BLACK_PAWNS.start;
        for (i, cell) in flat.iter().enumerate() {
            match cell {
                Cell::WhitePawn => {
                    next[wp] = i as u8;
                    wp += 1;
                }
                Cell::BlackPawn => {
                    next[bp] = i as u8;
                    bp += 1;
                }
                Cell::WhiteKing => next[WHITE_KING] = i as u8,
                Cell::BlackKing => next[BLACK_KING] = i as u8,
                Cell::Empty => {}
            }
        }
        debug_assert!(wp == WHITE_PAWNS.end && bp == BLACK_PAWNS.end);
        next[TURN] = 1 - self.cells[TURN];
        Board { cells: next }
    }

    /// The side whose king stands on the valley cell, if any.
    #[inline]
    pub fn winner(&self) -> Option<Side> {
        if self.cells[WHITE_KING] == VALLEY {
            Some(Side::White)
        } else if self.cells[BLACK_KING] == VALLEY {
            Some(Side::Black)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.winner().is_some()
    }
}
