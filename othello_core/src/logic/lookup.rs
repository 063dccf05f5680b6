use crate::logic::board::{MAX_SIZE, MIN_SIZE};
use std::sync::OnceLock;

/// One quadrant of the static weights, as `((x, y), weight)`. Mirrored into
/// the other three quadrants and across the diagonal.
const QUADRANT: [((usize, usize), i32); 10] = [
    ((0, 0), 99),
    ((1, 0), -8),
    ((2, 0), 8),
    ((3, 0), 6),
    ((1, 1), -24),
    ((2, 1), -4),
    ((3, 1), -3),
    ((2, 2), 7),
    ((3, 2), 4),
    ((3, 3), 0),
];

const TABLE_COUNT: usize = (MAX_SIZE - MIN_SIZE) / 2 + 1;

/// Static positional weight of every cell for one board size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileWeights {
    size: usize,
    weights: Vec<i32>,
}

impl TileWeights {
    fn new(size: usize) -> Self {
        let half = size / 2;
        let max = size - 1;
        let mut weights = vec![0; size * size];
        for &((qx, qy), w) in &QUADRANT {
            for (x, y) in [(qx, qy), (qy, qx)] {
                if x >= half || y >= half {
                    continue;
                }
                for (fx, fy) in [(x, y), (max - x, y), (x, max - y), (max - x, max - y)] {
                    weights[fy * size + fx] = w;
                }
            }
        }
        Self { size, weights }
    }

    /// Shared table for `size`, built on first use. `None` for sizes the
    /// board does not support.
    pub fn get(size: usize) -> Option<&'static Self> {
        static TABLES: [OnceLock<TileWeights>; TABLE_COUNT] =
            [const { OnceLock::new() }; TABLE_COUNT];
        if size < MIN_SIZE || size > MAX_SIZE || size % 2 != 0 {
            return None;
        }
        let slot = &TABLES[(size - MIN_SIZE) / 2];
        Some(slot.get_or_init(|| Self::new(size)))
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    pub fn weight(&self, index: usize) -> i32 {
        self.weights.get(index).copied().unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::board::Permutation;

    #[test]
    fn test_corner_and_x_squares() {
        let w = TileWeights::get(8).unwrap();
        for corner in [0, 7, 56, 63] {
            assert_eq!(w.weight(corner), 99);
        }
        assert_eq!(w.weight(9), -24);
        assert_eq!(w.weight(1), -8);
        assert_eq!(w.weight(8), -8);
        assert_eq!(w.weight(27), 0);
    }

    #[test]
    fn test_tables_are_symmetric() {
        for size in [4, 6, 8] {
            let w = TileWeights::get(size).unwrap();
            for perm in Permutation::ALL {
                for i in 0..size * size {
                    assert_eq!(w.weight(i), w.weight(perm.apply(i, size)));
                }
            }
        }
    }

    #[test]
    fn test_small_board_uses_quadrant_prefix() {
        let w = TileWeights::get(4).unwrap();
        assert_eq!(w.as_slice(), &[99, -8, -8, 99, -8, -24, -24, -8, -8, -24, -24, -8, 99, -8, -8, 99]);
    }

    #[test]
    fn test_unsupported_size() {
        assert!(TileWeights::get(5).is_none());
        assert!(TileWeights::get(10).is_none());
        assert!(std::ptr::eq(TileWeights::get(6).unwrap(), TileWeights::get(6).unwrap()));
    }
}
