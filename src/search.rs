use std::time::Duration;

use crate::board::ChessMove;
use crate::book::PolyglotBook;
use crate::budget::BudgetSupervisor;
use crate::evaluation::evaluate;
use crate::history::HistoryTable;
use crate::ordering::{order_captures, order_moves};
use crate::position::Position;
use crate::syzygy::SyzygyProber;
use crate::tt::{TTFlag, TranspositionTable};
use crate::types::{Score, SearchResult, DEFAULT_DEPTH, MAX_PLY, SCORE_INFINITY, SCORE_MATE};

/// Null-move reduction.
const NULL_MOVE_R: u8 = 2;

/// Process-lifetime search state: the transposition table, history table, and loaded
/// oracles, owned by the outer command loop and passed by reference into each
/// `choose_best_move` call rather than kept as a global mutable singleton.
pub struct SearchState {
    pub tt: TranspositionTable,
    pub history: HistoryTable,
    pub book: Option<PolyglotBook>,
    pub syzygy: Option<SyzygyProber>,
    pub budget: BudgetSupervisor,
    /// Suppresses the per-iteration `info` line; set by benchmarks.
    pub silent: bool,
}

impl SearchState {
    pub fn new(hash_mb: usize) -> Self {
        Self {
            tt: TranspositionTable::new(hash_mb),
            history: HistoryTable::new(),
            book: None,
            syzygy: None,
            budget: BudgetSupervisor::new(0, 0),
            silent: false,
        }
    }

    pub fn resize_tt(&mut self, mb: usize) {
        self.tt = TranspositionTable::new(mb);
    }

    pub fn load_book(&mut self, path: &str) {
        match PolyglotBook::load(path) {
            Ok(book) => self.book = Some(book),
            Err(err) => {
                log::warn!("could not load opening book from {path}: {err}");
                self.book = None;
            }
        }
    }

    pub fn load_syzygy(&mut self, path: &str) {
        self.syzygy = SyzygyProber::new(path);
        if self.syzygy.is_none() {
            log::warn!("could not load syzygy tablebases from {path}");
        }
    }

    /// Reset per-game state. Caches are cleared here since a new game makes stale
    /// history/TT entries pure noise.
    pub fn new_game(&mut self) {
        self.tt.clear();
        self.history.clear();
    }
}

/// `choose_best_move(position, depth?, nodes?, time_limit) -> move?`.
///
/// Consults the book and tablebase oracles first; on a double miss, runs iterative
/// deepening up to `depth` (or 30), returning the best move found by the last
/// fully-or-partially completed iteration.
pub fn choose_best_move(
    pos: &mut Position,
    state: &mut SearchState,
    depth: Option<u8>,
    nodes: Option<u64>,
    time_limit_ms: u64,
) -> SearchResult {
    state.budget = BudgetSupervisor::new(time_limit_ms, nodes.unwrap_or(0));
    state.tt.new_search();

    if let Some(book) = &state.book {
        if let Some(mv) = book.find(pos) {
            return SearchResult { best_move: Some(mv), score: 0, depth: 0, nodes: 0 };
        }
    }

    if let Some(syzygy) = &state.syzygy {
        if pos.board().combined().popcnt() <= 6 {
            if let Some(mv) = syzygy.probe_root(pos) {
                return SearchResult { best_move: Some(mv), score: 0, depth: 0, nodes: 0 };
            }
        }
    }

    let max_depth = depth.unwrap_or(DEFAULT_DEPTH);
    let mut best_move: Option<ChessMove> = None;
    let mut best_score: Score = -SCORE_INFINITY;

    'iddfs: for d in 1..=max_depth {
        let moves = pos.legal_moves();
        if moves.is_empty() {
            break;
        }
        let ordered = order_moves(pos, &moves, &state.history);

        let mut iter_best_move: Option<ChessMove> = None;
        let mut iter_best_score: Score = -SCORE_INFINITY;

        for mv in ordered {
            pos.push(mv);
            state.budget.record_node();
            let result = negamax(pos, state, d.saturating_sub(1), 1, -SCORE_INFINITY, SCORE_INFINITY);
            pos.pop();

            let score = match result {
                Some(s) => -s,
                None => break 'iddfs,
            };

            if score > iter_best_score {
                iter_best_score = score;
                iter_best_move = Some(mv);
            }
        }

        if let Some(mv) = iter_best_move {
            best_move = Some(mv);
            best_score = iter_best_score;
            if !state.silent {
                pos.push(mv);
                let rest = extract_pv(pos, state, d as usize);
                pos.pop();
                let pv: String = std::iter::once(mv.to_string())
                    .chain(rest.iter().map(ChessMove::to_string))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!(
                    "info depth {} score {} nodes {} time {} pv {}",
                    d,
                    format_score(best_score),
                    state.budget.node_count(),
                    state.budget.elapsed().as_millis(),
                    pv,
                );
            }
        }

        if time_limit_ms > 0 && state.budget.elapsed() > Duration::from_millis(time_limit_ms) {
            break;
        }
    }

    SearchResult {
        best_move,
        score: best_score,
        depth: max_depth,
        nodes: state.budget.node_count(),
    }
}

/// `alpha_beta(position, depth, alpha, beta, …) -> int`, fail-hard. Returns `None` on a
/// budget abort; callers propagate that `None` straight through (`?`), which still
/// unwinds through a matching `pos.pop()` at every frame above since the `?` only fires
/// after that frame's own pop has already run.
pub fn negamax(
    pos: &mut Position,
    state: &mut SearchState,
    depth: u8,
    ply: usize,
    alpha: Score,
    beta: Score,
) -> Option<Score> {
    if state.budget.should_abort() {
        return None;
    }

    if ply > 0 && pos.is_repetition() {
        return Some(0);
    }

    let key = pos.key();
    if let Some(entry) = state.tt.probe(key, ply) {
        if entry.depth >= depth {
            if let Some(score) = TranspositionTable::retrieve_score(entry, ply, alpha, beta) {
                return Some(score);
            }
        }
    }

    if depth == 0 {
        return quiescence(pos, state, alpha, beta);
    }

    let moves = pos.legal_moves();
    if moves.is_empty() {
        return Some(evaluate(pos));
    }

    let in_check = !pos.board().checkers().is_empty();

    if !in_check && ply > 0 && depth >= 3 && pos.has_non_pawn_material() {
        if pos.push_null() {
            let reduced = depth.saturating_sub(1 + NULL_MOVE_R);
            let null_score = negamax(pos, state, reduced, ply + 1, -beta, -beta + 1);
            pos.pop();
            match null_score {
                Some(score) if -score >= beta => return Some(beta),
                Some(_) => {}
                None => return None,
            }
        }
    }

    let alpha_orig = alpha;
    let mut alpha = alpha;
    let mut value = -SCORE_INFINITY;
    let mut best_move: Option<ChessMove> = None;

    let side_before = pos.side_to_move();
    let ordered = order_moves(pos, &moves, &state.history);

    for (i, mv) in ordered.into_iter().enumerate() {
        let is_capture = pos.is_capture(mv);
        let gives_check = pos.gives_check(mv);
        let quiet = !is_capture && !gives_check;

        let new_depth = if i >= 3 && depth >= 3 && quiet && !in_check {
            depth - 2
        } else {
            depth - 1
        };

        pos.push(mv);
        state.budget.record_node();
        let result = negamax(pos, state, new_depth, ply + 1, -beta, -alpha);
        pos.pop();

        let score = -result?;

        if score > value {
            value = score;
            best_move = Some(mv);
            if value > alpha {
                alpha = value;
                state.history.reinforce(side_before, mv, depth);
            }
        }

        if alpha >= beta {
            break;
        }
    }

    let flag = if value <= alpha_orig {
        TTFlag::UpperBound
    } else if value >= beta {
        TTFlag::LowerBound
    } else {
        TTFlag::Exact
    };
    state.tt.store(key, depth, value, flag, best_move, ply);

    Some(value)
}

/// `quiescence(position, alpha, beta) -> int`, fail-hard, captures only.
pub fn quiescence(pos: &mut Position, state: &mut SearchState, alpha: Score, beta: Score) -> Option<Score> {
    state.budget.record_node();
    if state.budget.should_abort() {
        return None;
    }

    let stand_pat = evaluate(pos);
    if stand_pat >= beta {
        return Some(beta);
    }
    let mut alpha = alpha;
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let moves = pos.legal_moves();
    let captures: Vec<ChessMove> = moves.into_iter().filter(|&mv| pos.is_capture(mv)).collect();
    let ordered = order_captures(pos, &captures);

    for mv in ordered {
        pos.push(mv);
        let result = quiescence(pos, state, -beta, -alpha);
        pos.pop();

        let score = -result?;
        if score >= beta {
            return Some(beta);
        }
        if score > alpha {
            alpha = score;
        }
    }

    Some(alpha)
}

/// Format a score as a UCI `info` token: `mate N` near the mate bound, `cp N` otherwise.
pub fn format_score(score: Score) -> String {
    let mate_threshold = SCORE_MATE - MAX_PLY as Score;
    if score > mate_threshold {
        let plies = SCORE_MATE - score;
        format!("mate {}", (plies + 1) / 2)
    } else if score < -mate_threshold {
        let plies = SCORE_MATE + score;
        format!("mate -{}", (plies + 1) / 2)
    } else {
        format!("cp {score}")
    }
}

/// Reconstruct the principal variation by repeatedly probing the TT for the stored
/// best move, pushing it, and continuing — bounded by `MAX_PLY`, and ended early by a
/// miss, a non-exact entry, or the move no longer being legal.
pub fn extract_pv(pos: &mut Position, state: &SearchState, max_len: usize) -> Vec<ChessMove> {
    let mut pv = Vec::new();
    let mut pushed = 0;

    for _ in 0..max_len.min(MAX_PLY) {
        let key = pos.key();
        let entry = match state.tt.probe(key, 0) {
            Some(e) if e.flag == TTFlag::Exact => e,
            _ => break,
        };
        let mv = match entry.best_move {
            Some(mv) => mv,
            None => break,
        };
        if !pos.legal_moves().contains(&mv) {
            break;
        }
        pos.push(mv);
        pushed += 1;
        pv.push(mv);
    }

    for _ in 0..pushed {
        pos.pop();
    }

    pv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board;

    fn init() {
        board::init();
    }

    #[test]
    fn finds_mate_in_one() {
        init();
        let mut pos = Position::new();
        pos.set_from_fen("7k/5Q2/6K1/8/8/8/8/8 w - - 0 1").unwrap();
        let mut state = SearchState::new(1);
        state.silent = true;
        let result = choose_best_move(&mut pos, &mut state, Some(2), None, 0);
        assert!(result.best_move.is_some());
        assert!(result.score > SCORE_MATE - MAX_PLY as Score);
    }

    #[test]
    fn returns_legal_move_from_startpos() {
        init();
        let mut pos = Position::new();
        let mut state = SearchState::new(1);
        state.silent = true;
        let result = choose_best_move(&mut pos, &mut state, Some(3), None, 0);
        assert!(result.best_move.is_some());
        assert!(pos.legal_moves().contains(&result.best_move.unwrap()));
    }

    #[test]
    fn node_budget_is_respected() {
        init();
        let mut pos = Position::new();
        let mut state = SearchState::new(1);
        state.silent = true;
        let result = choose_best_move(&mut pos, &mut state, None, Some(1_000), 0);
        assert!(result.best_move.is_some());
        assert!(state.budget.node_count() <= 1_000 + MAX_PLY as u64 * 64);
    }

    #[test]
    fn quiescence_result_stays_within_bounds() {
        init();
        let mut pos = Position::new();
        let mut state = SearchState::new(1);
        let score = quiescence(&mut pos, &mut state, -SCORE_INFINITY, SCORE_INFINITY).unwrap();
        assert!(score >= -SCORE_INFINITY && score <= SCORE_INFINITY);
    }

    #[test]
    fn tt_reduces_node_count_on_repeat_search() {
        init();
        let mut pos = Position::new();
        let mut state = SearchState::new(1);
        state.silent = true;
        let _ = choose_best_move(&mut pos, &mut state, Some(4), None, 0);
        let nodes_cold = state.budget.node_count();

        let mut pos2 = Position::new();
        let _ = choose_best_move(&mut pos2, &mut state, Some(4), None, 0);
        let nodes_warm = state.budget.node_count();

        assert!(nodes_warm <= nodes_cold);
    }

    #[test]
    fn push_pop_preserves_position_after_abort() {
        init();
        let mut pos = Position::new();
        let fen_before = pos.fen();
        let mut state = SearchState::new(1);
        state.silent = true;
        state.budget = BudgetSupervisor::new(1, 0);
        std::thread::sleep(Duration::from_millis(5));
        let _ = negamax(&mut pos, &mut state, 6, 0, -SCORE_INFINITY, SCORE_INFINITY);
        assert_eq!(pos.fen(), fen_before);
    }

    #[test]
    fn format_score_reports_mate_distance() {
        let s = format_score(SCORE_MATE - 1);
        assert_eq!(s, "mate 1");
    }

    #[test]
    fn format_score_reports_centipawns_otherwise() {
        let s = format_score(37);
        assert_eq!(s, "cp 37");
    }
}
