// Search bounds
pub const MAX: i32 = 999_000_000;
pub const MIN: i32 = -999_000_000;

// Terminal outcomes
pub const WIN: i32 = 88_000_000;
pub const TIE: i32 = 77_000_000;
pub const LOSS: i32 = -88_000_000;

// Tier multipliers for the layered evaluators
pub const TIER_STABLE: i32 = 10_000;
pub const TIER_FRONTIER: i32 = 100;
pub const TIER_UNSTABLE: i32 = 1;

pub const COMPRESSED_STABLE: i32 = 50;
pub const COMPRESSED_FRONTIER: i32 = 10;
pub const COMPRESSED_UNSTABLE: i32 = 1;

pub const FRONTIER_RATIO: i32 = 100;

// Early-game edge penalty
pub const EDGE_PENALTY: i32 = -15;
pub const EDGE_PENALTY_MOVES: usize = 21;

// Inverted compressed tiers for a positive position
pub const ADAPTIVE_CEILING: i32 = 200_000;
pub const ADAPTIVE_FLOOR: i32 = 25;
