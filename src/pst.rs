use crate::types::Score;

/// Material values in centipawns, indexed by `Piece::to_index()` (Pawn..King).
pub const PIECE_VALUE: [Score; 6] = [100, 320, 330, 500, 900, 20_000];

/// Pawn piece-square table, White's perspective, A1..H8 row-major (rank 1 first).
/// Black lookups mirror the square vertically (`sq ^ 56`).
#[rustfmt::skip]
pub const PAWN_TABLE: [Score; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
      5,  10,  10, -20, -20,  10,  10,   5,
      5,  -5, -10,   0,   0, -10,  -5,   5,
      0,   0,   0,  20,  20,   0,   0,   0,
      5,   5,  10,  25,  25,  10,   5,   5,
     10,  10,  20,  30,  30,  20,  10,  10,
     50,  50,  50,  50,  50,  50,  50,  50,
      0,   0,   0,   0,   0,   0,   0,   0,
];

/// Mirror a square index vertically (rank flip), for Black's PST lookup.
#[inline]
pub fn mirror(sq: usize) -> usize {
    sq ^ 56
}
