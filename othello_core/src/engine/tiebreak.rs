use crate::logic::lookup::TileWeights;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Picks one move out of a group of equally weighted moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tiebreak {
    FirstIndex,
    Random,
    #[default]
    TileWeight,
}

impl Tiebreak {
    pub const fn name(self) -> &'static str {
        match self {
            Self::FirstIndex => "FirstIndex",
            Self::Random => "Random",
            Self::TileWeight => "TileWeight",
        }
    }

    /// `None` only when `moves` is empty.
    pub fn pick<R: Rng + ?Sized>(
        self,
        moves: &[usize],
        weights: &TileWeights,
        rng: &mut R,
    ) -> Option<usize> {
        match self {
            Self::FirstIndex => moves.iter().copied().min(),
            Self::Random => moves.choose(rng).copied(),
            Self::TileWeight => {
                let best = moves.iter().map(|&m| weights.weight(m)).max()?;
                let top: Vec<usize> = moves
                    .iter()
                    .copied()
                    .filter(|&m| weights.weight(m) == best)
                    .collect();
                top.choose(rng).copied()
            }
        }
    }
}

impl fmt::Display for Tiebreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_empty_group() {
        let weights = TileWeights::get(8).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for tb in [Tiebreak::FirstIndex, Tiebreak::Random, Tiebreak::TileWeight] {
            assert_eq!(tb.pick(&[], weights, &mut rng), None);
        }
    }

    #[test]
    fn test_first_index() {
        let weights = TileWeights::get(8).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(Tiebreak::FirstIndex.pick(&[44, 19, 37], weights, &mut rng), Some(19));
    }

    #[test]
    fn test_tile_weight_prefers_corner() {
        let weights = TileWeights::get(8).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        // 9 is an X-square, 63 a corner, 2 a plain edge.
        assert_eq!(Tiebreak::TileWeight.pick(&[9, 2, 63], weights, &mut rng), Some(63));
    }

    #[test]
    fn test_tile_weight_random_among_equal() {
        let weights = TileWeights::get(8).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let pick = Tiebreak::TileWeight.pick(&[0, 7, 9], weights, &mut rng);
            assert!(matches!(pick, Some(0 | 7)));
        }
    }

    #[test]
    fn test_random_stays_in_group() {
        let weights = TileWeights::get(8).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let pick = Tiebreak::Random.pick(&[19, 26, 37, 44], weights, &mut rng);
            assert!(matches!(pick, Some(19 | 26 | 37 | 44)));
        }
    }
}
