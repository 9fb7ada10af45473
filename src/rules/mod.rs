//! Movement rules for the valley game
//!
//! Every piece slides: it moves in one of the 8 compass directions until it
//! hits the board edge or another piece, and must come to rest on the last
//! empty cell of the walk. Only kings may come to rest on the central
//! valley cell.
//!
//! This module is the single source of legality. The interactive board
//! highlights [`targets`] and the engine generates moves with
//! [`all_moves`], so the two can never disagree.

pub mod moves;

// Re-exports for convenient access
pub use moves::{all_moves, is_selectable, targets};
