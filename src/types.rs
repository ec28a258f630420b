use crate::board::ChessMove;

pub type Score = i32;

/// Sentinel wider than any attainable evaluation; used as the initial alpha/beta window.
pub const SCORE_INFINITY: Score = 1_000_000;
/// Checkmate score, per the evaluator's terminal-position convention.
pub const SCORE_MATE: Score = 999_999;
pub const MAX_PLY: usize = 128;
pub const DEFAULT_DEPTH: u8 = 30;
pub const DEFAULT_MOVETIME_MS: u64 = 3_000;

pub const DEFAULT_THREADS: u32 = 1;
pub const MIN_THREADS: u32 = 1;
pub const MAX_THREADS: u32 = 16;

pub const DEFAULT_HASH_MB: usize = 128;
pub const MIN_HASH_MB: usize = 1;
pub const MAX_HASH_MB: usize = 4096;

pub const DEFAULT_MOVE_OVERHEAD_MS: u64 = 100;
pub const MIN_MOVE_OVERHEAD_MS: u64 = 0;
pub const MAX_MOVE_OVERHEAD_MS: u64 = 10_000;

pub const DEFAULT_MAX_NODES: u64 = 0;
pub const MAX_MAX_NODES: u64 = 100_000_000;

pub const DEFAULT_BOOK_PATH: &str = "book.bin";
pub const DEFAULT_SYZYGY_PATH: &str = "syzygy";

pub const HISTORY_MAX: Score = 16384;

/// Typed record of the UCI options table (names, types, defaults, ranges).
/// Kept as a closed struct rather than an open name->value map: the option set is fixed.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub threads: u32,
    pub hash_mb: usize,
    pub move_overhead_ms: u64,
    pub max_nodes: u64,
    pub book_path: String,
    pub syzygy_path: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            hash_mb: DEFAULT_HASH_MB,
            move_overhead_ms: DEFAULT_MOVE_OVERHEAD_MS,
            max_nodes: DEFAULT_MAX_NODES,
            book_path: DEFAULT_BOOK_PATH.to_string(),
            syzygy_path: DEFAULT_SYZYGY_PATH.to_string(),
        }
    }
}

pub struct SearchResult {
    pub best_move: Option<ChessMove>,
    pub score: Score,
    pub depth: u8,
    pub nodes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.threads, 1);
        assert_eq!(cfg.hash_mb, 128);
        assert_eq!(cfg.move_overhead_ms, 100);
        assert_eq!(cfg.max_nodes, 0);
        assert_eq!(cfg.book_path, "book.bin");
        assert_eq!(cfg.syzygy_path, "syzygy");
    }
}
