use std::path::Path;

use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Role};
use shakmaty_syzygy::Tablebase;

use crate::board::{ChessMove, Piece, Square};
use crate::position::Position;

const MAX_PROBE_PIECES: u32 = 6;

/// Syzygy endgame-tablebase root oracle.
///
/// Bridges `Position` to `shakmaty::Chess` via a FEN round-trip (negligible cost at
/// probe time since probing only ever happens with a handful of pieces on the board),
/// then asks the tablebase for the DTZ-best root move. This replaces an earlier design
/// that probed WDL at every search node; a root-only oracle is both simpler and much
/// cheaper to keep correct.
pub struct SyzygyProber {
    tablebase: Tablebase<Chess>,
}

impl SyzygyProber {
    /// Load tablebases from `path`. Returns `None` if the directory is absent or
    /// contains no usable tables — an oracle-load failure the caller is expected to
    /// swallow, not propagate.
    pub fn new(path: &str) -> Option<Self> {
        if !Path::new(path).is_dir() {
            return None;
        }

        let mut tablebase = Tablebase::new();
        if tablebase.add_directory(path).is_err() {
            return None;
        }

        Some(Self { tablebase })
    }

    /// `probe_root(position) -> move`, gated on total piece count <= 6. Any probe
    /// failure (missing table, illegal probe position, …) is swallowed into `None`.
    pub fn probe_root(&self, pos: &Position) -> Option<ChessMove> {
        if pos.board().combined().popcnt() > MAX_PROBE_PIECES {
            return None;
        }

        let fen_str = pos.fen();
        let fen: Fen = fen_str.parse().ok()?;
        let chess: Chess = fen.into_position(CastlingMode::Standard).ok()?;

        let (mv, _dtz) = self.tablebase.best_move(&chess).ok().flatten()?;
        to_chess_move(&mv, pos)
    }
}

fn to_chess_move(mv: &shakmaty::Move, pos: &Position) -> Option<ChessMove> {
    let from = mv.from()?;
    let to = mv.to();
    let from_sq = Square::new(from as u8);
    let to_sq = Square::new(to as u8);
    let promotion = mv.promotion().map(role_to_piece);

    let candidate = ChessMove::new(from_sq, to_sq, promotion);
    pos.legal_moves().into_iter().find(|&m| m == candidate)
}

fn role_to_piece(role: Role) -> Piece {
    match role {
        Role::Pawn => Piece::Pawn,
        Role::Knight => Piece::Knight,
        Role::Bishop => Piece::Bishop,
        Role::Rook => Piece::Rook,
        Role::Queen => Piece::Queen,
        Role::King => Piece::King,
    }
}
