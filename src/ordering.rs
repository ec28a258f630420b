use crate::board::ChessMove;
use crate::history::HistoryTable;
use crate::position::Position;
use crate::pst::PIECE_VALUE;
use crate::types::Score;

const CAPTURE_BASE: Score = 10_000;
const CHECK_BONUS: Score = 500;

/// `order(position, moves) -> sequence<move>`, descending by capture value, then a
/// check bonus, then history. Ties keep the move generator's native (stable) order.
pub fn order_moves(pos: &Position, moves: &[ChessMove], history: &HistoryTable) -> Vec<ChessMove> {
    let side = pos.side_to_move();
    let mut scored: Vec<(Score, ChessMove)> = moves
        .iter()
        .map(|&mv| (score_move(pos, mv, side, history), mv))
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, mv)| mv).collect()
}

/// Order a capture-only move list by captured-piece value (MVV). Quiescence search
/// only ever considers captures, so the check bonus and history term don't apply.
pub fn order_captures(pos: &Position, captures: &[ChessMove]) -> Vec<ChessMove> {
    let mut scored: Vec<(Score, ChessMove)> = captures
        .iter()
        .map(|&mv| {
            let value = match pos.piece_at(mv.get_dest()) {
                Some((piece, _)) => PIECE_VALUE[piece.to_index()],
                None => PIECE_VALUE[crate::board::Piece::Pawn.to_index()],
            };
            (value, mv)
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, mv)| mv).collect()
}

fn score_move(pos: &Position, mv: ChessMove, side: crate::board::Color, history: &HistoryTable) -> Score {
    let mut score: Score = 0;

    if pos.is_capture(mv) {
        let captured_value = match pos.piece_at(mv.get_dest()) {
            Some((piece, _)) => PIECE_VALUE[piece.to_index()],
            // En passant: destination square is empty, the captured pawn sits beside it.
            None => PIECE_VALUE[crate::board::Piece::Pawn.to_index()],
        };
        score += CAPTURE_BASE + captured_value;
    }

    if pos.gives_check(mv) {
        score += CHECK_BONUS;
    }

    score += history.value(side, mv);
    score
}
