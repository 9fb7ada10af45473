//! Desktop client for the valley game
//!
//! A two-player abstract game on a 5x5 board: each side moves four pawns
//! and a king, every piece slides to the last empty cell in one of the 8
//! compass directions, only kings may come to rest on the central valley
//! cell, and a king that reaches it wins.
//!
//! Move search is delegated to a decision engine running on its own worker
//! thread. The UI owns all board and history state; the engine receives
//! immutable snapshots and streams progressively deeper results back, with
//! a single shared byte serving as a cooperative stop signal.
//!
//! # Architecture
//!
//! - [`board`]: canonical 11-byte board encoding and the transition function
//! - [`rules`]: sliding-move legality, shared by the UI and the engine
//! - [`history`]: branching undo/redo log of board states
//! - [`search`]: cancellation token, session state machine, engine worker host
//! - [`engine`]: default iterative-deepening alpha-beta engine
//! - [`ui`]: egui/eframe presentation
//!
//! # Quick Start
//!
//! ```
//! use valley::{AlphaBetaEngine, Board, CancelToken, Engine};
//!
//! let mut engine = AlphaBetaEngine::with_config(Some(2), 1 << 16);
//! let token = CancelToken::new();
//! let best = engine.find_best_move(Board::start(), false, &[], &token, &mut |_| {});
//! assert!(best.is_some());
//! ```

pub mod board;
pub mod engine;
pub mod history;
pub mod rules;
pub mod search;
pub mod ui;

// Re-export commonly used types for convenience
pub use board::{Board, Cell, Move, Side, BOARD_SIZE, CELL_COUNT, VALLEY};
pub use engine::AlphaBetaEngine;
pub use history::{History, Ply};
pub use search::{CancelToken, Engine, ProgressRecord, SearchSession, SessionState};
