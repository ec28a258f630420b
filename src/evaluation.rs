use crate::board::{Color, Piece, Square};
use crate::position::Position;
use crate::pst::{mirror, PAWN_TABLE, PIECE_VALUE};
use crate::types::{Score, SCORE_MATE};

/// d4, e4, d5, e5.
const CENTER_SQUARES: [u8; 4] = [27, 31, 35, 39];
const CENTER_BONUS: Score = 10;

/// `evaluate(position) -> int`, centipawns, positive favouring side-to-move.
///
/// Pure function: terminal detection, then material (+ optional pawn PST), then a
/// trivial center-occupancy bonus, then a side-to-move sign flip.
pub fn evaluate(pos: &Position) -> Score {
    if pos.is_checkmate() {
        // Checkmate status only arises on side-to-move's own turn, so the mated side
        // is always the one to move here.
        return -SCORE_MATE;
    }
    if pos.is_stalemate() || pos.is_insufficient_material() {
        return 0;
    }

    let mut score: Score = 0;

    for piece in Piece::ALL {
        let white = pos.pieces_of(piece, Color::White);
        let black = pos.pieces_of(piece, Color::Black);
        let value = PIECE_VALUE[piece.to_index()];
        score += white.popcnt() as Score * value;
        score -= black.popcnt() as Score * value;

        if piece == Piece::Pawn {
            for sq in white.iter() {
                score += PAWN_TABLE[sq.to_index()];
            }
            for sq in black.iter() {
                score -= PAWN_TABLE[mirror(sq.to_index())];
            }
        }
    }

    for &sq_idx in &CENTER_SQUARES {
        if let Some((_, color)) = pos.piece_at(Square::new(sq_idx)) {
            score += if color == Color::White { CENTER_BONUS } else { -CENTER_BONUS };
        }
    }

    if pos.side_to_move() == Color::White { score } else { -score }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board;

    fn init() {
        board::init();
    }

    #[test]
    fn startpos_is_balanced() {
        init();
        let pos = Position::new();
        assert_eq!(evaluate(&pos), 0);
    }

    #[test]
    fn material_advantage_favors_side_up_material() {
        init();
        let mut pos = Position::new();
        pos.set_from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        assert!(evaluate(&pos) > 0);
    }

    #[test]
    fn checkmate_returns_mate_score() {
        init();
        let mut pos = Position::new();
        pos.set_from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        assert_eq!(evaluate(&pos), -SCORE_MATE);
    }

    #[test]
    fn stalemate_is_drawn() {
        init();
        let mut pos = Position::new();
        pos.set_from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(evaluate(&pos), 0);
    }

    #[test]
    fn insufficient_material_is_drawn() {
        init();
        let mut pos = Position::new();
        pos.set_from_fen("8/8/8/4k3/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(evaluate(&pos), 0);
    }

    #[test]
    fn black_to_move_score_is_negated() {
        init();
        let mut pos = Position::new();
        pos.set_from_fen("4k3/8/8/8/8/8/8/R3K3 b - - 0 1").unwrap();
        assert!(evaluate(&pos) < 0);
    }
}
