//! Search coordination layer
//!
//! Contains:
//! - Cooperative cancellation token (one shared byte, polled, never preemptive)
//! - The engine capability trait and its progress record
//! - The engine worker host and the per-episode search session state machine
//!
//! The engine runs on its own worker thread with private state. The only
//! memory shared across that boundary is the cancellation byte; everything
//! else crosses by message, copied or moved.

pub mod cancel;
pub mod session;

pub use cancel::CancelToken;
pub use session::{EngineHost, EngineReply, SearchRequest, SearchSession, SessionId, SessionState};

use serde::{Deserialize, Serialize};

use crate::board::{Board, Move};

/// One intermediate result of an iterative-deepening search.
///
/// `best_path` is ordered leaf-to-root: the LAST element is the next move
/// to play from the searched board, earlier elements lie deeper in the
/// future. `depth` strictly increases across the records of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub depth: u32,
    pub nodes_searched: u64,
    pub transposition_table_size: usize,
    pub score: i32,
    pub best_path: Vec<Move>,
    /// Per-root-move scores, populated only when the session asked for them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub first_move_scores: Vec<(Move, i32)>,
}

impl ProgressRecord {
    /// The immediate next move this record recommends, if any.
    #[inline]
    pub fn next_move(&self) -> Option<Move> {
        self.best_path.last().copied()
    }
}

/// The decision-engine capability the session coordinates with.
///
/// `find_best_move` may run for an unbounded, caller-uncontrolled duration;
/// the only lever the caller holds is `stop`, which the engine is expected
/// to poll at its own checkpoints. Implementations invoke `progress` zero
/// or more times with strictly increasing depths, then return the chosen
/// move, or `None` when stopped before any candidate was found.
///
/// One engine value may be reused across many searches, but each search
/// receives its own never-reused token.
pub trait Engine: Send + 'static {
    fn find_best_move(
        &mut self,
        board: Board,
        collect_first_move_scores: bool,
        history_states: &[Board],
        stop: &CancelToken,
        progress: &mut dyn FnMut(ProgressRecord),
    ) -> Option<Move>;
}
