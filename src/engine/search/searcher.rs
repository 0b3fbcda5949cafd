//! Iterative-deepening negamax with alpha-beta, transposition table,
//! null-move pruning, late-move reductions, futility pruning,
//! quiescence and killer/history move ordering.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::engine::evaluate::{evaluate, has_non_pawn_material};
use crate::engine::history::HistoryTable;
use crate::engine::killer::KillerMoves;
use crate::engine::table::{Bound, TranspositionTable};
use crate::game::movegen;
use crate::game::moves::{Move, MoveFlag, MoveList, MAX_MOVES};
use crate::game::pieces::{Color, Piece};
use crate::game::position::Position;

use super::limits::SearchLimits;
use super::params::{
    lmr_reduction, CASTLE_BONUS, FUTILITY_MARGIN, INF_SCORE, KILLER_PRIMARY_BONUS,
    KILLER_SECONDARY_BONUS, LMR_MIN_DEPTH, LMR_MIN_MOVE_INDEX, MATE_SCORE, MAX_PLY, MVV_VALUES,
    NULL_MOVE_BASE_REDUCTION, NULL_MOVE_MIN_DEPTH, QUIESCENCE_MAX_DEPTH, REVERSE_FUTILITY_MARGIN,
    TIME_CHECK_INTERVAL,
};
use super::results::SearchResult;

/// Scores at the 16-bit clamp limit of a TT entry are treated as
/// mate-band values and never used for cutoffs.
const TT_SCORE_LIMIT: i32 = i16::MAX as i32;

/// Light squares; used by the same-colored-bishops draw rule.
const LIGHT_SQUARES: u64 = 0x55AA_55AA_55AA_55AA;

/// One search over one position. Borrows the position and the engine's
/// transposition table; killers and history are per-search state.
pub struct Search<'a> {
    pos: &'a mut Position,
    tt: &'a mut TranspositionTable,
    limits: SearchLimits,
    stop_flag: Arc<AtomicBool>,
    killers: KillerMoves,
    history: HistoryTable,
    deadline: Option<Instant>,
    nodes: u64,
}

impl<'a> Search<'a> {
    pub fn new(
        pos: &'a mut Position,
        tt: &'a mut TranspositionTable,
        limits: SearchLimits,
        stop_flag: Arc<AtomicBool>,
    ) -> Self {
        Self {
            pos,
            tt,
            limits,
            stop_flag,
            killers: KillerMoves::new(MAX_PLY as usize),
            history: HistoryTable::new(),
            deadline: None,
            nodes: 0,
        }
    }

    /// Iterative deepening from depth 1. Returns the best move of the
    /// last fully completed iteration; cancellation mid-iteration never
    /// leaks a partially explored result.
    pub fn run(&mut self) -> SearchResult {
        self.stop_flag.store(false, Ordering::Relaxed);
        self.nodes = 0;
        self.killers.clear();
        self.history.clear();
        self.tt.new_search();
        self.deadline = self
            .limits
            .max_time_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));

        let mut root_moves = movegen::legal(self.pos);
        if root_moves.is_empty() {
            // Mate or stalemate at the root.
            let score = if self.pos.in_check() { -MATE_SCORE } else { 0 };
            return SearchResult::terminal(score);
        }

        self.order_moves(&mut root_moves, Move::default(), 0);

        let mut best_move = root_moves[0];
        let mut best_score = -INF_SCORE;
        let mut completed_depth = 0u32;

        for depth in 1..=self.limits.max_depth as i32 {
            if self.should_stop() {
                break;
            }

            let mut iter_best = Move::default();
            let mut iter_score = -INF_SCORE;
            let mut alpha = -INF_SCORE;
            let beta = INF_SCORE;

            for i in 0..root_moves.len() {
                if self.should_stop() {
                    break;
                }
                let m = root_moves[i];
                self.pos.make_move(m);
                let score = -self.negamax(depth - 1, -beta, -alpha, 1, true);
                self.pos.unmake_move(m);

                if score > iter_score {
                    iter_score = score;
                    iter_best = m;
                }
                if score > alpha {
                    alpha = score;
                }
            }

            if self.should_stop() || iter_best.is_null() {
                break;
            }

            best_move = iter_best;
            best_score = iter_score;
            completed_depth = depth as u32;
            log::debug!(
                "info depth {} score cp {} nodes {} pv {}",
                depth,
                best_score,
                self.nodes,
                best_move
            );

            // Front-load the proven best move for the next iteration.
            if let Some(idx) = root_moves.iter().position(|&m| m == best_move) {
                root_moves.as_mut_slice()[..=idx].rotate_right(1);
            }
        }

        SearchResult {
            best_move: Some(best_move),
            score_cp: best_score,
            depth: completed_depth,
            nodes: self.nodes,
        }
    }

    // ── Negamax ─────────────────────────────────────────────────────────

    fn negamax(&mut self, mut depth: i32, mut alpha: i32, mut beta: i32, ply: i32, allow_null: bool) -> i32 {
        if self.should_stop() {
            // The result is discarded once the stop is noticed upstream.
            return evaluate(self.pos);
        }

        self.nodes += 1;

        if self.is_draw() {
            return 0;
        }

        let alpha_orig = alpha;
        let probe = self.tt.probe(self.pos.key());
        let tt_move = probe.map_or(Move::default(), |e| e.best_move);

        if let Some(entry) = probe {
            if i32::from(entry.depth) >= depth {
                let tt_score = i32::from(entry.score);
                // Mate-band scores are not ply-adjusted in the table, so
                // they never drive cutoffs.
                let mate_band =
                    tt_score.abs() >= MATE_SCORE - MAX_PLY || tt_score.abs() >= TT_SCORE_LIMIT;
                if !mate_band {
                    match entry.bound {
                        Bound::Exact => return tt_score,
                        Bound::Lower => alpha = alpha.max(tt_score),
                        Bound::Upper => beta = beta.min(tt_score),
                        Bound::None => {}
                    }
                    if alpha >= beta {
                        return tt_score;
                    }
                }
            }
        }

        if depth <= 0 {
            return self.quiescence(alpha, beta, ply, 0);
        }

        let in_check = self.pos.in_check();
        if in_check {
            depth += 1;
        }

        let static_eval = evaluate(self.pos);

        // Reverse futility: a position far enough above beta at shallow
        // depth fails high without a move loop.
        if !in_check && depth <= 3 && ply > 0 && static_eval - REVERSE_FUTILITY_MARGIN * depth >= beta
        {
            return static_eval;
        }

        // Null move: hand over the turn; if the opponent still cannot
        // reach beta, the real position is good enough to cut.
        if allow_null
            && !in_check
            && depth >= NULL_MOVE_MIN_DEPTH
            && ply > 0
            && has_non_pawn_material(self.pos, self.pos.side_to_move())
        {
            let reduction = NULL_MOVE_BASE_REDUCTION + depth / 4;
            let null_depth = (depth - 1 - reduction).max(0);

            self.pos.make_null_move();
            let null_score = -self.negamax(null_depth, -beta, -beta + 1, ply + 1, false);
            self.pos.unmake_null_move();

            if self.should_stop() {
                return static_eval;
            }
            if null_score >= beta {
                return beta;
            }
        }

        let mut moves = movegen::legal(self.pos);
        if moves.is_empty() {
            return if in_check { -MATE_SCORE + ply } else { 0 };
        }

        self.order_moves(&mut moves, tt_move, ply);

        // Futility: at frontier depths where even an optimistic margin
        // cannot lift the score to alpha, quiet non-first moves are
        // skipped wholesale.
        let can_futility = !in_check
            && depth <= 2
            && ply > 0
            && static_eval + FUTILITY_MARGIN * depth <= alpha;

        let side_to_move = self.pos.side_to_move();
        let mut best_score = -INF_SCORE;
        let mut best_move = Move::default();

        for i in 0..moves.len() {
            let m = moves[i];

            let is_capture = self.pos.board().piece_at(m.to).is_some();
            let is_ep = m.flag == MoveFlag::EnPassant;
            let is_promo = m.flag == MoveFlag::Promotion;
            let is_quiet = !is_capture && !is_ep && !is_promo;

            if can_futility && is_quiet && i > 0 && best_score > -MATE_SCORE + MAX_PLY {
                continue;
            }

            let can_lmr = is_quiet
                && !in_check
                && depth >= LMR_MIN_DEPTH
                && i >= LMR_MIN_MOVE_INDEX
                && (tt_move.is_null() || m != tt_move);

            self.pos.make_move(m);

            let score = if can_lmr && !self.pos.in_check() {
                let reduced = (depth - 1 - lmr_reduction(depth, i)).max(0);
                let reduced_score = -self.negamax(reduced, -alpha - 1, -alpha, ply + 1, true);
                if reduced_score > alpha {
                    // The reduction was too optimistic; search for real.
                    -self.negamax(depth - 1, -beta, -alpha, ply + 1, true)
                } else {
                    reduced_score
                }
            } else {
                -self.negamax(depth - 1, -beta, -alpha, ply + 1, true)
            };

            self.pos.unmake_move(m);

            if score > best_score {
                best_score = score;
                best_move = m;
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                if is_quiet {
                    self.killers.record(ply as usize, m);
                    self.history.update(side_to_move, m, depth);
                }
                break;
            }
            if self.should_stop() {
                break;
            }
        }

        if best_score == -INF_SCORE {
            // Stopped before the first move finished.
            return static_eval;
        }

        let bound = if best_score <= alpha_orig {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.store(
            self.pos.key(),
            depth as u8,
            clamp_tt(best_score),
            bound,
            best_move,
            clamp_tt(static_eval),
        );

        best_score
    }

    // ── Quiescence ──────────────────────────────────────────────────────

    fn quiescence(&mut self, mut alpha: i32, beta: i32, ply: i32, q_depth: i32) -> i32 {
        if self.should_stop() {
            return evaluate(self.pos);
        }

        self.nodes += 1;

        if self.is_draw() {
            return 0;
        }

        if self.pos.in_check() {
            // Evasion node: every legal move, no stand-pat.
            let mut moves = movegen::legal(self.pos);
            if moves.is_empty() {
                return -MATE_SCORE + ply;
            }
            if q_depth >= QUIESCENCE_MAX_DEPTH {
                return evaluate(self.pos);
            }

            self.order_moves(&mut moves, Move::default(), ply);

            let mut best_score = -INF_SCORE;
            for i in 0..moves.len() {
                let m = moves[i];
                self.pos.make_move(m);
                let score = -self.quiescence(-beta, -alpha, ply + 1, q_depth + 1);
                self.pos.unmake_move(m);

                if score > best_score {
                    best_score = score;
                }
                if score > alpha {
                    alpha = score;
                }
                if alpha >= beta {
                    break;
                }
                if self.should_stop() {
                    break;
                }
            }
            return best_score;
        }

        let stand_pat = evaluate(self.pos);
        if q_depth >= QUIESCENCE_MAX_DEPTH {
            return stand_pat;
        }
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        // Tactical moves only, filtered down to the legal ones.
        let us = self.pos.side_to_move();
        let noisy = movegen::captures(self.pos);
        let mut legal_noisy = MoveList::new();
        for &m in noisy.iter() {
            self.pos.make_move(m);
            if !self.pos.is_in_check(us) {
                legal_noisy.push(m);
            }
            self.pos.unmake_move(m);
        }

        if legal_noisy.is_empty() {
            return alpha;
        }

        self.order_moves(&mut legal_noisy, Move::default(), ply);

        for i in 0..legal_noisy.len() {
            let m = legal_noisy[i];
            self.pos.make_move(m);
            let score = -self.quiescence(-beta, -alpha, ply + 1, q_depth + 1);
            self.pos.unmake_move(m);

            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
            if self.should_stop() {
                break;
            }
        }

        alpha
    }

    // ── Move ordering ───────────────────────────────────────────────────

    fn order_moves(&self, moves: &mut MoveList, tt_move: Move, ply: i32) {
        let mut scores = [0i32; MAX_MOVES];
        for (i, &m) in moves.iter().enumerate() {
            scores[i] = self.move_score(m, tt_move, ply);
        }

        // Selection sort; move lists are short and mostly consumed from
        // the front anyway.
        let slice = moves.as_mut_slice();
        for i in 0..slice.len() {
            let mut best = i;
            for j in i + 1..slice.len() {
                if scores[j] > scores[best] {
                    best = j;
                }
            }
            if best != i {
                slice.swap(i, best);
                scores.swap(i, best);
            }
        }
    }

    fn move_score(&self, m: Move, tt_move: Move, ply: i32) -> i32 {
        if !tt_move.is_null() && m == tt_move {
            return 100_000;
        }

        let board = self.pos.board();
        let moving = board.piece_at(m.from);
        let target = board.piece_at(m.to);
        let mut score = 0;

        if m.flag == MoveFlag::Promotion {
            if let Some(promo) = m.promotion {
                score += 20_000 + MVV_VALUES[promo as usize];
            }
        }

        if let Some((victim, _)) = target {
            score += 10_000 + 10 * MVV_VALUES[victim as usize];
            if let Some((attacker, _)) = moving {
                score -= MVV_VALUES[attacker as usize];
            }
        } else if m.flag == MoveFlag::EnPassant {
            score += 10_000 + 10 * MVV_VALUES[Piece::Pawn as usize]
                - MVV_VALUES[Piece::Pawn as usize];
        } else {
            let killers = self.killers.get(ply as usize);
            if killers[0] == m {
                score += KILLER_PRIMARY_BONUS;
            } else if killers[1] == m {
                score += KILLER_SECONDARY_BONUS;
            }
            score += self.history.get(self.pos.side_to_move(), m);
        }

        if matches!(m.flag, MoveFlag::CastleKingside | MoveFlag::CastleQueenside) {
            score += CASTLE_BONUS;
        }

        score
    }

    // ── Stop and draw checks ────────────────────────────────────────────

    fn should_stop(&self) -> bool {
        if self.stop_flag.load(Ordering::Relaxed) {
            return true;
        }
        if let Some(deadline) = self.deadline {
            if self.nodes & (TIME_CHECK_INTERVAL - 1) == 0 {
                return Instant::now() >= deadline;
            }
        }
        false
    }

    fn is_draw(&self) -> bool {
        if self.pos.halfmove_clock() >= 100 {
            return true;
        }
        if self.pos.repetition_count() >= 2 {
            return true;
        }

        // Insufficient material.
        let board = self.pos.board();
        let total = board.occupied_all().count_ones();

        if total == 2 {
            return true; // bare kings
        }

        if total == 3 {
            // King and one minor piece cannot force mate.
            for color in [Color::White, Color::Black] {
                if board.pieces(color, Piece::Knight) != 0 || board.pieces(color, Piece::Bishop) != 0
                {
                    return true;
                }
            }
        }

        if total == 4 {
            let white_bishop = board.pieces(Color::White, Piece::Bishop);
            let black_bishop = board.pieces(Color::Black, Piece::Bishop);
            if white_bishop != 0 && black_bishop != 0 {
                let same_color_squares =
                    (white_bishop & LIGHT_SQUARES != 0) == (black_bishop & LIGHT_SQUARES != 0);
                if same_color_squares {
                    return true;
                }
            }
        }

        false
    }
}

#[inline]
fn clamp_tt(score: i32) -> i16 {
    score.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}
