use std::str::FromStr;

use crate::board::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Square};
use crate::error::EngineError;

/// Mutable chess position with explicit `push`/`pop`.
///
/// The underlying `Board` is an immutable, `Copy` value (`make_move_new` returns a new
/// board rather than mutating in place). `Position` layers a history stack on top of it
/// so callers get the push/pop interface the search core is written against, while the
/// move-generation and hashing logic underneath stays untouched.
#[derive(Clone)]
pub struct Position {
    board: Board,
    history: Vec<Board>,
}

impl Position {
    pub fn new() -> Self {
        Self {
            board: Board::default(),
            history: Vec::new(),
        }
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn legal_moves(&self) -> Vec<ChessMove> {
        MoveGen::new_legal(&self.board).collect()
    }

    pub fn is_capture(&self, mv: ChessMove) -> bool {
        if self.board.piece_on(mv.get_dest()).is_some() {
            return true;
        }
        // En passant: a pawn moving diagonally onto the (empty) en-passant square.
        self.board.piece_on(mv.get_source()) == Some(Piece::Pawn)
            && self.board.en_passant() == Some(mv.get_dest())
            && mv.get_source().file().to_index() != mv.get_dest().file().to_index()
    }

    pub fn gives_check(&self, mv: ChessMove) -> bool {
        !self.board.make_move_new(mv).checkers().is_empty()
    }

    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        let piece = self.board.piece_on(sq)?;
        let color = self.board.color_on(sq)?;
        Some((piece, color))
    }

    pub fn pieces_of(&self, piece: Piece, color: Color) -> crate::board::BitBoard {
        self.board.pieces(piece) & self.board.color_combined(color)
    }

    pub fn is_checkmate(&self) -> bool {
        self.board.status() == BoardStatus::Checkmate
    }

    pub fn is_stalemate(&self) -> bool {
        self.board.status() == BoardStatus::Stalemate
    }

    /// Classic draw-by-insufficient-material cases: K-vs-K, K+minor-vs-K, and
    /// same-colored-bishops-only. Not named by the board library, so computed directly
    /// against the bitboard representation.
    pub fn is_insufficient_material(&self) -> bool {
        let combined = self.board.combined();
        if combined.popcnt() > 4 {
            return false;
        }

        let pawns = self.board.pieces(Piece::Pawn);
        let rooks = self.board.pieces(Piece::Rook);
        let queens = self.board.pieces(Piece::Queen);
        if !pawns.is_empty() || !rooks.is_empty() || !queens.is_empty() {
            return false;
        }

        let knights = self.board.pieces(Piece::Knight);
        let bishops = self.board.pieces(Piece::Bishop);
        let minors = knights.popcnt() + bishops.popcnt();

        match minors {
            0 => true,                 // K vs K
            1 => true,                 // K+minor vs K
            2 => {
                // Two bishops total, no knights, each side exactly one: draw iff same color square.
                if knights.popcnt() != 0 || bishops.popcnt() != 2 {
                    return false;
                }
                let white_bishops = bishops & self.board.color_combined(Color::White);
                let black_bishops = bishops & self.board.color_combined(Color::Black);
                if white_bishops.popcnt() != 1 || black_bishops.popcnt() != 1 {
                    return false;
                }
                let w_sq = white_bishops.0.trailing_zeros();
                let b_sq = black_bishops.0.trailing_zeros();
                square_color(w_sq) == square_color(b_sq)
            }
            _ => false,
        }
    }

    pub fn fen(&self) -> String {
        self.board.to_string()
    }

    pub fn castling_rights(&self) -> u8 {
        self.board.castling_rights()
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.board.en_passant()
    }

    pub fn key(&self) -> u64 {
        self.board.get_hash()
    }

    pub fn push(&mut self, mv: ChessMove) {
        self.history.push(self.board);
        self.board = self.board.make_move_new(mv);
    }

    pub fn pop(&mut self) {
        if let Some(prev) = self.history.pop() {
            self.board = prev;
        }
    }

    pub fn set_from_fen(&mut self, fen: &str) -> Result<(), EngineError> {
        let board = Board::from_str(fen).map_err(EngineError::InvalidFen)?;
        self.board = board;
        self.history.clear();
        Ok(())
    }

    pub fn reset(&mut self) {
        self.board = Board::default();
        self.history.clear();
    }

    /// Keys of every position visited since the last `reset`/`set_from_fen`, current
    /// position last. Used for repetition detection.
    pub fn history_keys(&self) -> Vec<u64> {
        let mut keys: Vec<u64> = self.history.iter().map(|b| b.get_hash()).collect();
        keys.push(self.board.get_hash());
        keys
    }

    /// True if the current position's key already occurred earlier in this game.
    pub fn is_repetition(&self) -> bool {
        let key = self.board.get_hash();
        self.history.iter().any(|b| b.get_hash() == key)
    }

    /// Make a null move (pass), returning false (and leaving state unchanged) if the
    /// side to move is in check. Paired with `pop` exactly like `push`.
    pub fn push_null(&mut self) -> bool {
        match self.board.null_move() {
            Some(next) => {
                self.history.push(self.board);
                self.board = next;
                true
            }
            None => false,
        }
    }

    /// Whether the side to move holds any piece beyond pawns and king — guards null-move
    /// pruning against zugzwang-prone king-and-pawn endings.
    pub fn has_non_pawn_material(&self) -> bool {
        let side = self.board.side_to_move();
        let ours = self.board.color_combined(side);
        let pawns_and_king = self.board.pieces(Piece::Pawn) | self.board.pieces(Piece::King);
        !(ours & !pawns_and_king).is_empty()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

fn square_color(sq_index: u32) -> bool {
    let rank = sq_index / 8;
    let file = sq_index % 8;
    (rank + file) % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board;

    fn init() {
        board::init();
    }

    #[test]
    fn push_pop_round_trip() {
        init();
        let mut pos = Position::new();
        let before = pos.fen();
        let mv = pos.legal_moves()[0];
        pos.push(mv);
        assert_ne!(pos.fen(), before);
        pos.pop();
        assert_eq!(pos.fen(), before);
    }

    #[test]
    fn k_vs_k_is_insufficient_material() {
        init();
        let mut pos = Position::new();
        pos.set_from_fen("8/8/8/4k3/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(pos.is_insufficient_material());
    }

    #[test]
    fn king_and_rook_is_not_insufficient_material() {
        init();
        let mut pos = Position::new();
        pos.set_from_fen("8/8/8/4k3/8/8/8/3RK3 w - - 0 1").unwrap();
        assert!(!pos.is_insufficient_material());
    }

    #[test]
    fn opposite_colored_bishops_are_not_insufficient_material() {
        init();
        let mut pos = Position::new();
        // White bishop on c1 (dark), Black bishop on c8 (light) -> opposite colors.
        pos.set_from_fen("2b1k3/8/8/8/8/8/8/2B1K3 w - - 0 1").unwrap();
        assert!(!pos.is_insufficient_material());
    }

    #[test]
    fn same_colored_bishops_are_insufficient_material() {
        init();
        let mut pos = Position::new();
        // Both bishops on light squares.
        pos.set_from_fen("3bk3/8/8/8/8/8/8/3BK3 w - - 0 1").unwrap();
        assert!(pos.is_insufficient_material());
    }

    #[test]
    fn repetition_history_tracks_keys() {
        init();
        let mut pos = Position::new();
        let start_key = pos.key();
        let moves = pos.legal_moves();
        pos.push(moves[0]);
        assert_eq!(pos.history_keys().len(), 2);
        pos.pop();
        assert_eq!(pos.key(), start_key);
    }
}
