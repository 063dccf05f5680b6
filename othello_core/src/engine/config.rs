use crate::engine::endgame::EndgameWeighting;
use crate::engine::error::ConfigError;
use crate::engine::eval::Weighting;
use crate::engine::select::MoveSelector;
use crate::engine::tiebreak::Tiebreak;
use crate::logic::board::{Board, Side, MAX_SIZE};
use serde::{Deserialize, Serialize};

pub const CONTROLLER_NAME: &str = "AIMinimax";
pub const CONTROLLER_VERSION: &str = "0.30";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    // Search
    pub depth: i32,
    pub full_solve_point: usize, // Empty cells at which the game is solved outright
    pub move_trimming: bool,
    pub trim_to: usize,
    pub worker_floor: usize,
    pub pruning: bool,

    // Strategy
    pub weighting: Weighting,
    pub endgame: EndgameWeighting,
    pub tiebreak: Tiebreak,
    pub selector: MoveSelector,

    // Second search with another weighting, for an adaptive opponent
    pub shadow_weighting: Option<Weighting>,
    pub shadow_depth: Option<i32>,

    /// Fixed RNG seed for reproducible tie-breaks and random selectors.
    pub seed: Option<u64>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            depth: 6,
            full_solve_point: 8,
            move_trimming: false,
            trim_to: 6,
            worker_floor: 4,
            pruning: true,

            weighting: Weighting::TieredCompressed,
            endgame: EndgameWeighting::DiskMaximizing,
            tiebreak: Tiebreak::TileWeight,
            selector: MoveSelector::Best,

            shadow_weighting: None,
            shadow_depth: None,

            seed: None,
        }
    }
}

impl AiConfig {
    pub fn load_from_json(json_str: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Checks the settings against a board of `cells` cells.
    pub fn validate(&self, cells: usize) -> Result<(), ConfigError> {
        if self.depth < 0 {
            return Err(ConfigError::InvalidDepth(self.depth));
        }
        if let Some(depth) = self.shadow_depth.filter(|d| *d < 0) {
            return Err(ConfigError::InvalidDepth(depth));
        }
        if self.move_trimming && self.trim_to == 0 {
            return Err(ConfigError::InvalidTrim);
        }
        if self.full_solve_point > cells {
            return Err(ConfigError::InvalidFullSolvePoint {
                point: self.full_solve_point,
                cells,
            });
        }
        if self.worker_floor == 0 {
            return Err(ConfigError::InvalidWorkerFloor);
        }
        Ok(())
    }

    pub fn shadow_depth(&self) -> i32 {
        self.shadow_depth.unwrap_or(self.depth)
    }

    /// Whether results of this AI can be scored in `weighting`.
    pub fn searches_with(&self, weighting: Weighting) -> bool {
        self.weighting == weighting || self.shadow_weighting == Some(weighting)
    }

    /// Stable description of the settings, recorded with every match.
    pub fn fingerprint(&self) -> String {
        let shadow = self.shadow_weighting.map_or("", Weighting::name);
        format!(
            "{CONTROLLER_NAME}|{CONTROLLER_VERSION}|Rust||\
             MoveTrimming:{};MoveTrimTo:{};Depth:{};FullSolvePoint:{};UseThreading:true;\
             Tiebreak:{};Weighting:{};AlterWeighting:{};EndgameWeighting:{};MoveSelector:{};",
            self.move_trimming,
            self.trim_to,
            self.depth,
            self.full_solve_point,
            self.tiebreak,
            self.weighting,
            shadow,
            self.endgame,
            self.selector,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PlayerConfig {
    Ai(AiConfig),
    Human,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::Ai(AiConfig::default())
    }
}

impl PlayerConfig {
    pub const fn ai(&self) -> Option<&AiConfig> {
        match self {
            Self::Ai(config) => Some(config),
            Self::Human => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub board_size: usize,
    pub black: PlayerConfig,
    pub white: PlayerConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            board_size: MAX_SIZE,
            black: PlayerConfig::default(),
            white: PlayerConfig::default(),
        }
    }
}

impl MatchConfig {
    pub fn load_from_json(json_str: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json_str)?)
    }

    pub const fn player(&self, side: Side) -> &PlayerConfig {
        match side {
            Side::Black => &self.black,
            Side::White => &self.white,
        }
    }

    pub fn player_mut(&mut self, side: Side) -> &mut PlayerConfig {
        match side {
            Side::Black => &mut self.black,
            Side::White => &mut self.white,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !Board::is_supported_size(self.board_size) {
            return Err(ConfigError::InvalidBoardSize(self.board_size));
        }
        let cells = self.board_size * self.board_size;
        for side in Side::BOTH {
            if let Some(ai) = self.player(side).ai() {
                ai.validate(cells)?;
            }
            validate_pairing(side, self.player(side), self.player(side.opposite()))?;
        }
        Ok(())
    }
}

/// An adaptive AI reads the opponent's search results, so the opponent must
/// search with the adaptive side's weighting, directly or as its shadow.
pub fn validate_pairing(
    side: Side,
    player: &PlayerConfig,
    opponent: &PlayerConfig,
) -> Result<(), ConfigError> {
    let Some(ai) = player.ai().filter(|ai| ai.selector.is_adaptive()) else {
        return Ok(());
    };
    match opponent.ai() {
        None => Err(ConfigError::AdaptiveNeedsAiOpponent(side)),
        Some(other) if other.searches_with(ai.weighting) => Ok(()),
        Some(_) => Err(ConfigError::MismatchedWeighting {
            side,
            weighting: ai.weighting.to_string(),
        }),
    }
}
