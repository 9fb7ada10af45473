//! Default decision engine
//!
//! Unbounded iterative-deepening alpha-beta over the shared move
//! enumerator, with a two-generation transposition table (the previous
//! depth's best move seeds move ordering for the next) and repetition
//! pruning against the played path. The stop token is polled at every
//! node, so a stop request aborts the current depth and the last fully
//! searched depth's result stands.

use std::collections::{HashMap, HashSet};

use crate::board::{Board, Move, Side, VALLEY};
use crate::rules;
use crate::search::{CancelToken, Engine, ProgressRecord};

/// Score of a decided position (a king on the valley).
const WIN_SCORE: i32 = 100_000;

/// A score this large means a forced win was found and deepening further
/// is pointless.
const DECISIVE_SCORE: i32 = 10_000;

/// Move-ordering key that pins the previous best move to the front.
const ORDER_FIRST: i32 = i32::MIN;

/// Deepest ply whose positions are worth caching for ordering.
const TT_DEPTH_CAP: u32 = 20;

/// Positional value of a pawn per cell: the ring around the valley is
/// where pawns do their blocking work.
const PAWN_WEIGHTS: [i32; 25] = [
    0, 3, 0, 3, 0, 3, 25, 25, 25, 3, 0, 25, 0, 25, 0, 3, 25, 25, 25, 3, 0, 3, 0, 3, 0,
];

/// Positional value of a king per cell.
const KING_WEIGHTS: [i32; 25] = [
    10, 0, 10, 0, 10, 0, 50, 50, 50, 0, 10, 50, WIN_SCORE, 50, 10, 0, 50, 50, 50, 0, 10, 0, 10, 0,
    10,
];

/// Static evaluation from white's point of view.
fn evaluate(board: &Board) -> i32 {
    let white_king = board.white_king() as usize;
    let black_king = board.black_king() as usize;
    if white_king == VALLEY as usize {
        return WIN_SCORE;
    }
    if black_king == VALLEY as usize {
        return -WIN_SCORE;
    }
    let mut score = KING_WEIGHTS[white_king] - KING_WEIGHTS[black_king];
    for &p in board.white_pawns() {
        score += PAWN_WEIGHTS[p as usize];
    }
    for &p in board.black_pawns() {
        score -= PAWN_WEIGHTS[p as usize];
    }
    score
}

/// Search was stopped via the token.
struct Interrupted;

/// Result of searching one subtree.
struct Line {
    score: i32,
    /// Leaf-to-root: the last element is the move to play first.
    best_path: Vec<Move>,
    first_move_scores: Vec<(Move, i32)>,
}

impl Line {
    fn leaf(score: i32) -> Line {
        Line {
            score,
            best_path: Vec::new(),
            first_move_scores: Vec::new(),
        }
    }
}

/// Per-search state, rebuilt for every request.
struct SearchState<'a> {
    /// Completed-depth table: position -> (score, best move), used only to
    /// order moves at the next depth.
    transposition_table: HashMap<Board, (i32, Move)>,
    /// Table being filled by the depth in progress.
    next_transposition_table: HashMap<Board, (i32, Move)>,
    /// Positions on the path from the root, plus every board already played
    /// this game: moves back into any of them are pruned.
    visiting: HashSet<Board>,
    nodes_searched: u64,
    max_depth: u32,
    tt_entry_cap: usize,
    collect_first_move_scores: bool,
    stop: &'a CancelToken,
}

impl<'a> SearchState<'a> {
    fn new(
        stop: &'a CancelToken,
        collect_first_move_scores: bool,
        history_states: &[Board],
        tt_entry_cap: usize,
    ) -> SearchState<'a> {
        SearchState {
            transposition_table: HashMap::new(),
            next_transposition_table: HashMap::new(),
            visiting: history_states.iter().copied().collect(),
            nodes_searched: 0,
            max_depth: 0,
            tt_entry_cap,
            collect_first_move_scores,
            stop,
        }
    }

    fn alpha_beta(
        &mut self,
        board: Board,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
    ) -> Result<Line, Interrupted> {
        if self.stop.is_cancelled() {
            return Err(Interrupted);
        }
        if depth >= self.max_depth || board.is_over() {
            return Ok(Line::leaf(evaluate(&board)));
        }

        self.nodes_searched += 1;
        let maximizing = board.whose_turn() == Side::White;

        let mut candidates: Vec<(Move, Board)> = rules::all_moves(&board)
            .into_iter()
            .map(|m| (m, board.apply(m)))
            .collect();
        candidates.retain(|(_, next)| !self.visiting.contains(next));
        if candidates.is_empty() {
            // Every move repeats a visited position (or none exist): treat
            // as lost for the side to move, matching the game's stalling rule.
            return Ok(Line::leaf(if maximizing { -WIN_SCORE } else { WIN_SCORE }));
        }

        let prev_best = self.transposition_table.get(&board).map(|&(_, m)| m);
        candidates.sort_by_key(|(m, next)| {
            if prev_best == Some(*m) {
                return ORDER_FIRST;
            }
            if maximizing {
                -evaluate(next)
            } else {
                evaluate(next)
            }
        });

        self.visiting.insert(board);
        let mut best_score = if maximizing { i32::MIN } else { i32::MAX };
        let mut best_path = Vec::new();
        let mut first_move_scores = Vec::new();
        for (one_move, next) in candidates {
            let Line {
                score,
                best_path: subpath,
                ..
            } = self.alpha_beta(next, depth + 1, alpha, beta)?;
            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_path = subpath;
                    best_path.push(one_move);
                }
                // When collecting root scores, the root window stays open so
                // every first move gets an exact score.
                if score > alpha && (!self.collect_first_move_scores || depth > 0) {
                    alpha = score;
                }
            } else {
                if score < best_score {
                    best_score = score;
                    best_path = subpath;
                    best_path.push(one_move);
                }
                if score < beta && (!self.collect_first_move_scores || depth > 0) {
                    beta = score;
                }
            }
            if depth == 0 && self.collect_first_move_scores {
                first_move_scores.push((one_move, score));
            }
            if alpha >= beta {
                break;
            }
        }
        self.visiting.remove(&board);

        if depth < TT_DEPTH_CAP && self.next_transposition_table.len() < self.tt_entry_cap {
            if let Some(&m) = best_path.last() {
                self.next_transposition_table.insert(board, (best_score, m));
            }
        }

        Ok(Line {
            score: best_score,
            best_path,
            first_move_scores,
        })
    }

    /// Promote the finished depth's table and reset per-depth counters.
    fn next_depth(&mut self) {
        std::mem::swap(
            &mut self.transposition_table,
            &mut self.next_transposition_table,
        );
        self.next_transposition_table.clear();
        self.max_depth += 1;
        self.nodes_searched = 0;
    }
}

/// Iterative-deepening alpha-beta engine.
///
/// Deepens without bound until stopped or a decisive line is found, unless
/// a depth limit is configured. One value can serve many searches; all
/// search state is per-request.
pub struct AlphaBetaEngine {
    depth_limit: Option<u32>,
    tt_entry_cap: usize,
}

impl AlphaBetaEngine {
    pub fn new() -> Self {
        Self::with_config(None, 30_000_000)
    }

    /// `depth_limit` of `None` deepens until stopped; `tt_entry_cap` bounds
    /// the per-depth ordering table.
    pub fn with_config(depth_limit: Option<u32>, tt_entry_cap: usize) -> Self {
        Self {
            depth_limit,
            tt_entry_cap,
        }
    }
}

impl Default for AlphaBetaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for AlphaBetaEngine {
    fn find_best_move(
        &mut self,
        board: Board,
        collect_first_move_scores: bool,
        history_states: &[Board],
        stop: &CancelToken,
        progress: &mut dyn FnMut(ProgressRecord),
    ) -> Option<Move> {
        let mut search = SearchState::new(
            stop,
            collect_first_move_scores,
            history_states,
            self.tt_entry_cap,
        );
        let mut result: Option<Line> = None;
        loop {
            if self
                .depth_limit
                .is_some_and(|limit| search.max_depth >= limit)
            {
                break;
            }
            search.next_depth();
            let depth = search.max_depth;
            match search.alpha_beta(board, 0, i32::MIN, i32::MAX) {
                Err(Interrupted) => break,
                Ok(line) => {
                    progress(ProgressRecord {
                        depth,
                        nodes_searched: search.nodes_searched,
                        transposition_table_size: search.next_transposition_table.len(),
                        score: line.score,
                        best_path: line.best_path.clone(),
                        first_move_scores: line.first_move_scores.clone(),
                    });
                    let decisive = line.score.abs() > DECISIVE_SCORE;
                    result = Some(line);
                    if decisive {
                        break;
                    }
                }
            }
        }
        result.and_then(|line| line.best_path.last().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(
        engine: &mut AlphaBetaEngine,
        board: Board,
        collect: bool,
        history: &[Board],
    ) -> (Option<Move>, Vec<ProgressRecord>) {
        let token = CancelToken::new();
        let mut records = Vec::new();
        let best = engine.find_best_move(board, collect, history, &token, &mut |r| records.push(r));
        (best, records)
    }

    // White king at 10 with the rightward slide blocked on 13, so the king
    // can come to rest exactly on the valley: a win in one.
    fn win_in_one_board() -> Board {
        Board::new([0, 1, 2, 3, 13, 20, 21, 22, 10, 24, 1])
    }

    #[test]
    fn test_evaluate_decided_positions() {
        let white_win = Board::new([0, 1, 3, 4, 20, 21, 23, 24, VALLEY, 2, 0]);
        assert_eq!(evaluate(&white_win), WIN_SCORE);
        let black_win = Board::new([0, 1, 3, 4, 20, 21, 23, 24, 22, VALLEY, 1]);
        assert_eq!(evaluate(&black_win), -WIN_SCORE);
    }

    #[test]
    fn test_evaluate_is_antisymmetric_at_start() {
        // The starting position is mirror-symmetric, so neither side is ahead.
        assert_eq!(evaluate(&Board::start()), 0);
    }

    #[test]
    fn test_finds_win_in_one() {
        let mut engine = AlphaBetaEngine::new();
        let (best, records) = run(&mut engine, win_in_one_board(), false, &[]);
        assert_eq!(best, Some(Move::new(10, VALLEY)));
        // The decisive score terminates deepening on its own.
        assert!(!records.is_empty());
        assert!(records.last().unwrap().score > DECISIVE_SCORE);
    }

    #[test]
    fn test_progress_depths_strictly_increase() {
        let mut engine = AlphaBetaEngine::with_config(Some(3), 1 << 16);
        let (_, records) = run(&mut engine, Board::start(), false, &[]);
        assert_eq!(records.len(), 3);
        for pair in records.windows(2) {
            assert!(pair[1].depth > pair[0].depth);
        }
    }

    #[test]
    fn test_depth_limit_bounds_the_search() {
        let mut engine = AlphaBetaEngine::with_config(Some(2), 1 << 16);
        let (best, records) = run(&mut engine, Board::start(), false, &[]);
        assert!(best.is_some());
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_best_path_ends_with_playable_move() {
        let mut engine = AlphaBetaEngine::with_config(Some(3), 1 << 16);
        let board = Board::start();
        let (best, records) = run(&mut engine, board, false, &[]);
        let head = records.last().unwrap().next_move().unwrap();
        assert_eq!(best, Some(head));
        assert!(rules::all_moves(&board).contains(&head));
    }

    #[test]
    fn test_pre_cancelled_token_yields_no_move() {
        let mut engine = AlphaBetaEngine::new();
        let token = CancelToken::new();
        token.cancel();
        let mut records = Vec::new();
        let best =
            engine.find_best_move(Board::start(), false, &[], &token, &mut |r| records.push(r));
        assert_eq!(best, None);
        assert!(records.is_empty());
    }

    #[test]
    fn test_collect_first_move_scores_covers_all_root_moves() {
        let mut engine = AlphaBetaEngine::with_config(Some(1), 1 << 16);
        let board = Board::start();
        let (_, records) = run(&mut engine, board, true, &[]);
        let scores = &records.last().unwrap().first_move_scores;
        assert_eq!(scores.len(), rules::all_moves(&board).len());
    }

    #[test]
    fn test_history_positions_are_pruned() {
        let board = win_in_one_board();
        // Declare the winning position as already visited: the engine must
        // not walk back into it.
        let winning = board.apply(Move::new(10, VALLEY));
        let mut engine = AlphaBetaEngine::with_config(Some(2), 1 << 16);
        let (best, _) = run(&mut engine, board, false, &[winning]);
        assert_ne!(best, Some(Move::new(10, VALLEY)));
    }

    #[test]
    fn test_engine_value_is_reusable() {
        let mut engine = AlphaBetaEngine::with_config(Some(2), 1 << 16);
        let (first, _) = run(&mut engine, Board::start(), false, &[]);
        let (second, _) = run(&mut engine, Board::start(), false, &[]);
        assert_eq!(first, second);
    }
}
