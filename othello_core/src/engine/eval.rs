use crate::engine::Evaluator;
use crate::logic::board::{Counts, Side};
use crate::logic::eval_constants::{
    ADAPTIVE_CEILING, ADAPTIVE_FLOOR, COMPRESSED_FRONTIER, COMPRESSED_STABLE,
    COMPRESSED_UNSTABLE, EDGE_PENALTY, EDGE_PENALTY_MOVES, FRONTIER_RATIO, TIER_FRONTIER,
    TIER_STABLE, TIER_UNSTABLE,
};
use crate::logic::game::Game;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Heuristic for non-terminal positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Weighting {
    DiskDifference,
    FrontierDiskRatio,
    StableDiskRatio,
    Tiered,
    #[default]
    TieredCompressed,
    TieredCompressedEdges,
    InvertedTiered,
    /// Compressed tiers, but a winning position scores higher the smaller
    /// its lead is.
    AdaptiveCompressed,
}

impl Weighting {
    pub const ALL: [Self; 8] = [
        Self::DiskDifference,
        Self::FrontierDiskRatio,
        Self::StableDiskRatio,
        Self::Tiered,
        Self::TieredCompressed,
        Self::TieredCompressedEdges,
        Self::InvertedTiered,
        Self::AdaptiveCompressed,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::DiskDifference => "DiskDifference",
            Self::FrontierDiskRatio => "FrontierDiskRatio",
            Self::StableDiskRatio => "StableDiskRatio",
            Self::Tiered => "Tiered",
            Self::TieredCompressed => "TieredCompressed",
            Self::TieredCompressedEdges => "TieredCompressedEdges",
            Self::InvertedTiered => "InvertedTiered",
            Self::AdaptiveCompressed => "AdaptiveCompressed",
        }
    }
}

impl fmt::Display for Weighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stable, frontier and unstable differentials, each oriented so that
/// positive is good for `us`.
struct Tiers {
    stable: i32,
    frontier: i32,
    unstable: i32,
}

impl Tiers {
    fn of(game: &Game, us: Side) -> Self {
        let them = us.opposite();
        let stable = game.board.stable_counts();
        let frontier = game.board.frontier_counts();
        let counts = game.board.counts();
        let unstable = Counts {
            empty: 0,
            black: counts.black - stable.black,
            white: counts.white - stable.white,
        };
        Self {
            stable: stable.diff(us, them),
            frontier: frontier.diff(them, us),
            unstable: unstable.diff(them, us),
        }
    }

    const fn weigh(&self, stable: i32, frontier: i32, unstable: i32) -> i32 {
        self.stable * stable + self.frontier * frontier + self.unstable * unstable
    }
}

impl Evaluator for Weighting {
    fn evaluate(&self, game: &Game, side: Side) -> i32 {
        let us = side;
        let them = side.opposite();
        match self {
            Self::DiskDifference => game.board.counts().diff(us, them),
            Self::FrontierDiskRatio => game.board.frontier_counts().diff(them, us) * FRONTIER_RATIO,
            Self::StableDiskRatio => game.board.stable_counts().diff(us, them),
            Self::Tiered => Tiers::of(game, us).weigh(TIER_STABLE, TIER_FRONTIER, TIER_UNSTABLE),
            Self::TieredCompressed => Tiers::of(game, us).weigh(
                COMPRESSED_STABLE,
                COMPRESSED_FRONTIER,
                COMPRESSED_UNSTABLE,
            ),
            Self::TieredCompressedEdges => {
                let mut weight = Tiers::of(game, us).weigh(
                    COMPRESSED_STABLE,
                    COMPRESSED_FRONTIER,
                    COMPRESSED_UNSTABLE,
                );
                if game.moves_played() < EDGE_PENALTY_MOVES {
                    weight += game.board.edge_counts().diff(them, us) * EDGE_PENALTY;
                }
                weight
            }
            Self::InvertedTiered => {
                -Tiers::of(game, us).weigh(TIER_STABLE, TIER_FRONTIER, TIER_UNSTABLE)
            }
            Self::AdaptiveCompressed => {
                let weight = Tiers::of(game, us).weigh(
                    COMPRESSED_STABLE,
                    COMPRESSED_FRONTIER,
                    COMPRESSED_UNSTABLE,
                );
                if weight <= 0 {
                    weight
                } else {
                    ADAPTIVE_CEILING - (weight - ADAPTIVE_FLOOR)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::board::{Board, Cell};

    fn opening() -> Game {
        let mut game = Game::new(8).unwrap();
        game.start();
        game
    }

    #[test]
    fn test_opening_is_balanced() {
        let game = opening();
        for weighting in Weighting::ALL {
            assert_eq!(weighting.evaluate(&game, Side::Black), 0, "{weighting}");
        }
    }

    #[test]
    fn test_disk_difference_is_antisymmetric() {
        let mut game = opening();
        game.make_move(19).unwrap();
        assert_eq!(Weighting::DiskDifference.evaluate(&game, Side::Black), 3);
        assert_eq!(Weighting::DiskDifference.evaluate(&game, Side::White), -3);
    }

    #[test]
    fn test_tiered_prefers_stable_corner() {
        let mut board = Board::standard(8);
        board.set(0, Cell::Disk(Side::Black));
        let game = Game::from_board(board, Side::White);
        let tiered = Weighting::Tiered.evaluate(&game, Side::Black);
        // One stable disk outweighs the extra unstable and frontier terms.
        assert!(tiered > TIER_STABLE / 2, "{tiered}");
        assert_eq!(Weighting::InvertedTiered.evaluate(&game, Side::Black), -tiered);
    }

    #[test]
    fn test_adaptive_compressed_flattens_leads() {
        let game = opening();
        assert_eq!(Weighting::AdaptiveCompressed.evaluate(&game, Side::Black), 0);

        let mut board = Board::standard(8);
        board.set(0, Cell::Disk(Side::Black));
        let game = Game::from_board(board, Side::White);
        let ahead = Weighting::TieredCompressed.evaluate(&game, Side::Black);
        let behind = Weighting::TieredCompressed.evaluate(&game, Side::White);
        assert!(ahead > 0 && behind < 0);
        assert_eq!(
            Weighting::AdaptiveCompressed.evaluate(&game, Side::Black),
            ADAPTIVE_CEILING - (ahead - ADAPTIVE_FLOOR)
        );
        assert_eq!(Weighting::AdaptiveCompressed.evaluate(&game, Side::White), behind);
    }

    #[test]
    fn test_edge_penalty_only_early() {
        let mut board = Board::standard(8);
        board.set(1, Cell::Disk(Side::Black));
        let game = Game::from_board(board, Side::White);
        let plain = Weighting::TieredCompressed.evaluate(&game, Side::Black);
        let edges = Weighting::TieredCompressedEdges.evaluate(&game, Side::Black);
        assert_eq!(edges - plain, -EDGE_PENALTY);
    }
}
