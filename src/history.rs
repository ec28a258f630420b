use crate::board::{ChessMove, Color};
use crate::types::{Score, HISTORY_MAX};

/// Per-(side-to-move, move) reinforcement table, keyed by `from*64 + dst` rather than by
/// a hashmap: the key space is small and fixed, so a dense array keeps lookups branch-free.
/// Never cleared within a game; only `ucinewgame` resets it.
pub struct HistoryTable {
    table: [[Score; 4096]; 2],
}

impl HistoryTable {
    pub fn new() -> Self {
        Self {
            table: [[0; 4096]; 2],
        }
    }

    #[inline]
    fn index(mv: ChessMove) -> usize {
        mv.get_source().to_index() * 64 + mv.get_dest().to_index()
    }

    pub fn value(&self, side: Color, mv: ChessMove) -> Score {
        self.table[side.to_index()][Self::index(mv)]
    }

    /// Reinforce a move that raised alpha at `depth`. Clamped so a single search can't
    /// overflow an entry, keeping values monotonically non-decreasing within a game.
    pub fn reinforce(&mut self, side: Color, mv: ChessMove, depth: u8) {
        let idx = Self::index(mv);
        let bonus = (depth as Score) * (depth as Score);
        let entry = &mut self.table[side.to_index()][idx];
        *entry = (*entry + bonus).min(HISTORY_MAX);
    }

    pub fn clear(&mut self) {
        self.table = [[0; 4096]; 2];
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;

    #[test]
    fn reinforcement_is_monotone_non_decreasing() {
        let mut hist = HistoryTable::new();
        let mv = ChessMove::new(Square::new(12), Square::new(28), None);
        let before = hist.value(Color::White, mv);
        hist.reinforce(Color::White, mv, 4);
        let after = hist.value(Color::White, mv);
        assert!(after >= before);
    }

    #[test]
    fn sides_are_independent() {
        let mut hist = HistoryTable::new();
        let mv = ChessMove::new(Square::new(12), Square::new(28), None);
        hist.reinforce(Color::White, mv, 5);
        assert_eq!(hist.value(Color::Black, mv), 0);
    }

    #[test]
    fn clear_resets_all_entries() {
        let mut hist = HistoryTable::new();
        let mv = ChessMove::new(Square::new(8), Square::new(16), None);
        hist.reinforce(Color::White, mv, 6);
        hist.clear();
        assert_eq!(hist.value(Color::White, mv), 0);
    }
}
