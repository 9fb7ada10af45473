//! Engine worker host and the search session state machine
//!
//! Exactly one session is active per game instance. Starting a session for
//! a new board supersedes the old one: the outgoing session is stopped and
//! its listener detached strictly before the new session attaches, so a
//! late message from a superseded search can never reach live state.

use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::{CancelToken, Engine, ProgressRecord};
use crate::board::{Board, Move};

/// Identifies one search episode. Replies carry the id of the episode that
/// produced them; the session discards replies tagged with any other id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(u64);

/// One search request crossing the isolation boundary.
///
/// Everything here is moved to the worker; the token's byte is the only
/// memory the two sides share afterwards. The request carries its own
/// reply sender, so each episode gets a private channel back.
pub struct SearchRequest {
    pub session: SessionId,
    pub board: Board,
    pub stop: CancelToken,
    pub collect_first_move_scores: bool,
    pub history_states: Vec<Board>,
    pub reply: Sender<EngineReply>,
}

/// Messages flowing back from the worker: zero or more `Info`, then
/// exactly one terminal `Move`.
pub enum EngineReply {
    Info {
        session: SessionId,
        record: ProgressRecord,
    },
    Move {
        session: SessionId,
        best: Option<Move>,
    },
}

/// Owns the long-lived engine worker thread.
///
/// The thread is created once and reused for every search; it holds the
/// engine value privately and exits when the host (and with it the request
/// sender) is dropped and any in-flight search finishes.
pub struct EngineHost {
    requests: Sender<SearchRequest>,
}

impl EngineHost {
    /// Spawn the worker around `engine`.
    pub fn spawn<E: Engine>(mut engine: E) -> EngineHost {
        let (tx, rx) = channel::<SearchRequest>();

        thread::spawn(move || {
            while let Ok(request) = rx.recv() {
                let SearchRequest {
                    session,
                    board,
                    stop,
                    collect_first_move_scores,
                    history_states,
                    reply,
                } = request;

                info!(?session, "search started");
                let info_out = reply.clone();
                let mut on_progress = |record: ProgressRecord| {
                    if let Ok(json) = serde_json::to_string(&record) {
                        debug!(?session, info = %json, "progress");
                    }
                    // Send failures mean the session was superseded; the
                    // search will notice the stop byte at its next checkpoint.
                    let _ = info_out.send(EngineReply::Info { session, record });
                };

                let best = engine.find_best_move(
                    board,
                    collect_first_move_scores,
                    &history_states,
                    &stop,
                    &mut on_progress,
                );

                info!(?session, ?best, "search finished");
                let _ = reply.send(EngineReply::Move { session, best });
            }
            debug!("engine worker shut down");
        });

        EngineHost { requests: tx }
    }

    fn submit(&self, request: SearchRequest) -> bool {
        self.requests.send(request).is_ok()
    }
}

/// Lifecycle of one search episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No episode bound (no game yet, or torn down).
    Idle,
    /// Request sent, terminal message not yet received.
    Searching,
    /// Terminal received with no stop requested. `best` is `None` when the
    /// engine found no candidate (e.g. the position was already decided).
    Completed { best: Option<Move> },
    /// Terminal received after a stop request. The engine may still have
    /// reported the best move it had found so far.
    Cancelled { best: Option<Move> },
}

/// Manages the single active coordination episode with the engine.
///
/// State machine: `Idle -> Searching -> {Completed, Cancelled} -> Idle`,
/// driven by `start` (board changed), `stop` (stop requested), and `poll`
/// (progress / terminal received). The owning thread never blocks on the
/// worker; `poll` drains whatever has arrived and returns.
pub struct SearchSession {
    host: EngineHost,
    last_id: u64,
    session: SessionId,
    state: SessionState,
    token: Option<CancelToken>,
    replies: Option<Receiver<EngineReply>>,
    stop_requested: bool,
    thoughts: Vec<ProgressRecord>,
    started_at: Option<Instant>,
}

impl SearchSession {
    pub fn new(host: EngineHost) -> Self {
        Self {
            host,
            last_id: 0,
            session: SessionId(0),
            state: SessionState::Idle,
            token: None,
            replies: None,
            stop_requested: false,
            thoughts: Vec::new(),
            started_at: None,
        }
    }

    /// Convenience constructor spawning a host around `engine`.
    pub fn with_engine<E: Engine>(engine: E) -> Self {
        Self::new(EngineHost::spawn(engine))
    }

    /// Begin a new episode for `board`, superseding any running one.
    ///
    /// The outgoing episode is stopped and detached strictly before the new
    /// reply channel exists, then a single request is sent carrying a fresh
    /// token and the boards along the played path up to the current cursor.
    pub fn start(&mut self, board: Board, history_states: Vec<Board>, collect_first_move_scores: bool) {
        self.teardown();

        self.last_id += 1;
        let session = SessionId(self.last_id);
        let stop = CancelToken::new();
        let (reply_tx, reply_rx) = channel();

        let accepted = self.host.submit(SearchRequest {
            session,
            board,
            stop: stop.clone(),
            collect_first_move_scores,
            history_states,
            reply: reply_tx,
        });
        if !accepted {
            warn!("engine worker is gone; search request dropped");
            return;
        }

        debug!(?session, "session attached");
        self.session = session;
        self.state = SessionState::Searching;
        self.token = Some(stop);
        self.replies = Some(reply_rx);
        self.started_at = Some(Instant::now());
    }

    /// Request a stop of the running episode. Advisory: the engine observes
    /// the byte at its own pace, and progress already in flight may still be
    /// delivered (and is still accepted).
    pub fn stop(&mut self) {
        if !matches!(self.state, SessionState::Searching) {
            return;
        }
        if let Some(token) = &self.token {
            token.cancel();
            self.stop_requested = true;
            debug!(session = ?self.session, "stop requested");
        }
    }

    /// Tear the current episode down: stop it, detach its listener, discard
    /// accumulated progress. Invoked by `start` on supersession and by the
    /// owner on shutdown.
    pub fn teardown(&mut self) {
        self.stop();
        if self.replies.take().is_some() {
            debug!(session = ?self.session, "session detached");
        }
        self.token = None;
        self.stop_requested = false;
        self.thoughts.clear();
        self.state = SessionState::Idle;
        self.started_at = None;
    }

    /// Drain everything the worker has delivered so far, without blocking.
    pub fn poll(&mut self) {
        let Some(replies) = self.replies.take() else {
            return;
        };

        let mut disconnected = false;
        loop {
            match replies.try_recv() {
                Ok(EngineReply::Info { session, record }) => {
                    if session != self.session {
                        debug!(?session, "discarding stale progress");
                        continue;
                    }
                    debug_assert!(
                        self.thoughts.last().map_or(true, |last| record.depth > last.depth),
                        "progress depth must strictly increase within a session"
                    );
                    self.thoughts.push(record);
                }
                Ok(EngineReply::Move { session, best }) => {
                    if session != self.session {
                        debug!(?session, "discarding stale terminal");
                        continue;
                    }
                    self.state = if self.stop_requested {
                        SessionState::Cancelled { best }
                    } else {
                        SessionState::Completed { best }
                    };
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        if disconnected {
            // The worker died mid-search (engine panic). Surface as Idle
            // rather than poisoning the owning thread.
            if matches!(self.state, SessionState::Searching) {
                warn!(session = ?self.session, "engine worker disconnected mid-search");
                self.state = SessionState::Idle;
            }
            self.token = None;
        } else {
            self.replies = Some(replies);
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_thinking(&self) -> bool {
        matches!(self.state, SessionState::Searching)
    }

    /// Progress accumulated by the current episode, oldest first.
    pub fn thoughts(&self) -> &[ProgressRecord] {
        &self.thoughts
    }

    pub fn latest_thought(&self) -> Option<&ProgressRecord> {
        self.thoughts.last()
    }

    /// The move the engine currently recommends: the terminal move once the
    /// episode finished, otherwise the head of the deepest best path so far.
    pub fn best_move(&self) -> Option<Move> {
        match self.state {
            SessionState::Completed { best } | SessionState::Cancelled { best } => best,
            SessionState::Searching => self.thoughts.last().and_then(ProgressRecord::next_move),
            SessionState::Idle => None,
        }
    }

    /// Time since the current episode started.
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|t| t.elapsed())
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        // Let an in-flight search wind down instead of churning for a
        // listener that no longer exists.
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted engine: emits one record per depth up to `depths`, tagging
    /// each with the request board's first byte as the score, then returns
    /// `best`. Bails out at the next checkpoint once stopped.
    struct ScriptedEngine {
        depths: u32,
        best: Option<Move>,
        delay: Duration,
    }

    impl Engine for ScriptedEngine {
        fn find_best_move(
            &mut self,
            board: Board,
            _collect_first_move_scores: bool,
            _history_states: &[Board],
            stop: &CancelToken,
            progress: &mut dyn FnMut(ProgressRecord),
        ) -> Option<Move> {
            for depth in 1..=self.depths {
                if stop.is_cancelled() {
                    return self.best;
                }
                thread::sleep(self.delay);
                progress(ProgressRecord {
                    depth,
                    nodes_searched: u64::from(depth) * 10,
                    transposition_table_size: 0,
                    score: i32::from(board.cells()[0]),
                    best_path: self.best.into_iter().collect(),
                    first_move_scores: Vec::new(),
                });
            }
            self.best
        }
    }

    /// Engine that keeps deepening until the stop byte flips.
    struct StubbornEngine;

    impl Engine for StubbornEngine {
        fn find_best_move(
            &mut self,
            _board: Board,
            _collect_first_move_scores: bool,
            _history_states: &[Board],
            stop: &CancelToken,
            progress: &mut dyn FnMut(ProgressRecord),
        ) -> Option<Move> {
            let mut depth = 0;
            while !stop.is_cancelled() {
                depth += 1;
                progress(ProgressRecord {
                    depth,
                    nodes_searched: 1,
                    transposition_table_size: 0,
                    score: 0,
                    best_path: vec![Move::new(0, 15)],
                    first_move_scores: Vec::new(),
                });
                thread::sleep(Duration::from_millis(2));
            }
            Some(Move::new(0, 15))
        }
    }

    fn poll_until_done(session: &mut SearchSession) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while session.is_thinking() {
            assert!(Instant::now() < deadline, "session never finished");
            session.poll();
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn board_with_marker(marker: u8) -> Board {
        let mut cells = *Board::start().cells();
        cells[0] = marker;
        Board::new(cells)
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = SearchSession::with_engine(ScriptedEngine {
            depths: 1,
            best: None,
            delay: Duration::ZERO,
        });
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.best_move().is_none());
        assert!(session.thoughts().is_empty());
    }

    #[test]
    fn test_completes_and_accumulates_progress() {
        let best = Move::new(22, 7);
        let mut session = SearchSession::with_engine(ScriptedEngine {
            depths: 3,
            best: Some(best),
            delay: Duration::ZERO,
        });

        session.start(Board::start(), vec![Board::start()], false);
        assert!(session.is_thinking());
        poll_until_done(&mut session);

        assert_eq!(session.state(), SessionState::Completed { best: Some(best) });
        assert_eq!(session.best_move(), Some(best));
        let depths: Vec<u32> = session.thoughts().iter().map(|t| t.depth).collect();
        assert_eq!(depths, vec![1, 2, 3]);
    }

    #[test]
    fn test_stop_lands_in_cancelled() {
        let mut session = SearchSession::with_engine(StubbornEngine);
        session.start(Board::start(), vec![Board::start()], false);

        // Wait for at least one progress record, then request a stop.
        let deadline = Instant::now() + Duration::from_secs(10);
        while session.thoughts().is_empty() {
            assert!(Instant::now() < deadline, "no progress arrived");
            session.poll();
            thread::sleep(Duration::from_millis(1));
        }
        session.stop();
        poll_until_done(&mut session);

        assert!(matches!(session.state(), SessionState::Cancelled { .. }));
        // Progress that was in flight when the stop was requested is kept.
        assert!(!session.thoughts().is_empty());
    }

    #[test]
    fn test_supersession_discards_stale_messages() {
        let mut session = SearchSession::with_engine(ScriptedEngine {
            depths: 40,
            best: Some(Move::new(0, 15)),
            delay: Duration::from_millis(2),
        });

        // First episode on a board tagged 7; let some progress get in flight.
        session.start(board_with_marker(7), Vec::new(), false);
        thread::sleep(Duration::from_millis(10));

        // Supersede with a board tagged 9 before the first search finishes.
        session.start(board_with_marker(9), Vec::new(), false);
        assert!(session.thoughts().is_empty());
        poll_until_done(&mut session);

        // Only second-episode records may have accumulated.
        assert!(!session.thoughts().is_empty());
        for thought in session.thoughts() {
            assert_eq!(thought.score, 9);
        }
    }

    #[test]
    fn test_teardown_returns_to_idle() {
        let mut session = SearchSession::with_engine(StubbornEngine);
        session.start(Board::start(), vec![Board::start()], false);
        session.poll();
        session.teardown();

        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.thoughts().is_empty());
        assert!(session.best_move().is_none());
        assert!(session.elapsed().is_none());
    }

    #[test]
    fn test_searching_best_move_tracks_latest_thought() {
        let best = Move::new(4, 16);
        let mut session = SearchSession::with_engine(ScriptedEngine {
            depths: 1,
            best: Some(best),
            delay: Duration::ZERO,
        });
        session.start(Board::start(), Vec::new(), false);

        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            assert!(Instant::now() < deadline, "no progress arrived");
            session.poll();
            if !session.thoughts().is_empty() || !session.is_thinking() {
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(session.best_move(), Some(best));
    }
}
