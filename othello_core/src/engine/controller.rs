use crate::engine::config::AiConfig;
use crate::engine::error::{ConfigError, EngineResult};
use crate::engine::eval::Weighting;
use crate::engine::events::SearchSnapshot;
use crate::engine::search::{Minimax, SearchResult};
use crate::engine::select::{handicap, MoveEvalData, MoveSelector, SelectionContext};
use crate::engine::tt::ReferenceTable;
use crate::engine::{elapsed_ms, SearchStats};
use crate::logic::board::{Side, MAX_CELLS};
use crate::logic::game::Game;
use crate::logic::lookup::TileWeights;
use crate::logic::rules::LogicError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Instant;

/// The move an AI settled on.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub index: usize,
    pub weight: i32,
    pub snapshot: SearchSnapshot,
}

/// What an AI saw when it chose its last move; handed to the other seat so
/// an adaptive AI can rate the move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub weighting: Weighting,
    pub result: SearchResult,
    pub shadow: Option<(Weighting, SearchResult)>,
}

impl SearchReport {
    /// The result scored with `weighting`, main search first.
    pub fn result_for(&self, weighting: Weighting) -> Option<&SearchResult> {
        if self.weighting == weighting {
            return Some(&self.result);
        }
        self.shadow
            .as_ref()
            .filter(|(w, _)| *w == weighting)
            .map(|(_, r)| r)
    }
}

pub struct AiController {
    side: Side,
    config: AiConfig,
    reference: Arc<ReferenceTable>,
    shadow_reference: Arc<ReferenceTable>,
    last_result: Option<SearchResult>,
    shadow_result: Option<SearchResult>,
    opponent_moves: Vec<MoveEvalData>,
    own_moves: Vec<MoveEvalData>,
    last_decision: Option<usize>,
    last_stats: SearchStats,
    rng: StdRng,
}

impl AiController {
    pub fn new(side: Side, config: AiConfig) -> Result<Self, ConfigError> {
        config.validate(MAX_CELLS)?;
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Ok(Self {
            side,
            config,
            reference: Arc::default(),
            shadow_reference: Arc::default(),
            last_result: None,
            shadow_result: None,
            opponent_moves: Vec::new(),
            own_moves: Vec::new(),
            last_decision: None,
            last_stats: SearchStats::default(),
            rng,
        })
    }

    pub const fn side(&self) -> Side {
        self.side
    }

    pub const fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn fingerprint(&self) -> String {
        self.config.fingerprint()
    }

    pub const fn last_stats(&self) -> SearchStats {
        self.last_stats
    }

    pub const fn last_decision(&self) -> Option<usize> {
        self.last_decision
    }

    pub const fn last_result(&self) -> Option<&SearchResult> {
        self.last_result.as_ref()
    }

    pub fn opponent_moves(&self) -> &[MoveEvalData] {
        &self.opponent_moves
    }

    pub fn own_moves(&self) -> &[MoveEvalData] {
        &self.own_moves
    }

    /// Forgets caches, results and move statistics for a new game.
    pub fn reset(&mut self) {
        self.reference = Arc::default();
        self.shadow_reference = Arc::default();
        self.last_result = None;
        self.shadow_result = None;
        self.opponent_moves.clear();
        self.own_moves.clear();
        self.last_decision = None;
        self.last_stats = SearchStats::default();
        if let Some(seed) = self.config.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
    }

    /// Searches `game` and picks a move for the active side.
    pub fn compute_move(&mut self, game: &Game) -> EngineResult<Decision> {
        if game.active() != self.side {
            return Err(LogicError::WrongSide {
                expected: self.side,
                actual: game.active(),
            }
            .into());
        }
        let start = Instant::now();

        if let Some(shadow) = self.config.shadow_weighting {
            let minimax = Minimax::new(
                self.side,
                &self.config,
                shadow,
                Arc::clone(&self.shadow_reference),
            );
            let root = minimax.search_root(game, self.config.shadow_depth())?;
            self.shadow_reference = Arc::new(root.table);
            self.shadow_result = Some(root.result);
        }

        let minimax = Minimax::new(
            self.side,
            &self.config,
            self.config.weighting,
            Arc::clone(&self.reference),
        );
        let root = minimax.search_root(game, self.config.depth)?;
        self.reference = Arc::new(root.table);

        let buckets = root.result.buckets();
        let ctx = SelectionContext {
            opponent_moves: &self.opponent_moves,
            own_moves: &self.own_moves,
            moves_played: game.moves_played(),
        };
        let weight = self
            .config
            .selector
            .select(&buckets, &ctx, &mut self.rng)
            .ok_or(LogicError::EmptyMoveSet)?;
        let current_handicap = match self.config.selector {
            MoveSelector::Adaptive { own_lookback }
            | MoveSelector::AdaptiveMaxDisks { own_lookback } => {
                handicap(&ctx, own_lookback)
            }
            _ => None,
        };

        let size = game.board.size();
        let tiles = TileWeights::get(size).ok_or(ConfigError::InvalidBoardSize(size))?;
        let candidates = buckets.get(&weight).ok_or(LogicError::EmptyMoveSet)?;
        let index = self
            .config
            .tiebreak
            .pick(candidates, tiles, &mut self.rng)
            .ok_or(LogicError::EmptyMoveSet)?;
        if !game.legal_moves().contains(&index) {
            return Err(LogicError::IllegalPlacement {
                side: self.side,
                index,
            }
            .into());
        }

        let stats = SearchStats {
            time_ms: elapsed_ms(start),
            ..root.stats
        };
        let snapshot = SearchSnapshot {
            side: self.side,
            weighting: self.config.weighting,
            stats,
            move_weights: root.result.move_weights.clone(),
            chosen: index,
            chosen_weight: weight,
            untrimmed: root.untrimmed,
            handicap: current_handicap,
        };

        self.last_stats = stats;
        self.last_decision = Some(index);
        self.last_result = Some(root.result);

        Ok(Decision {
            index,
            weight,
            snapshot,
        })
    }

    /// Results of the last search, for the other seat to rate the move with.
    pub fn report(&self) -> Option<SearchReport> {
        let result = self.last_result.clone()?;
        let shadow = self
            .config
            .shadow_weighting
            .zip(self.shadow_result.clone());
        Some(SearchReport {
            weighting: self.config.weighting,
            result,
            shadow,
        })
    }

    /// Rates a move that was just played, by either side, against the
    /// mover's own search results.
    pub fn on_move_made(&mut self, side: Side, index: usize, report: Option<&SearchReport>) {
        let Some(report) = report else {
            return;
        };
        let Some(result) = report.result_for(self.config.weighting) else {
            if self.config.selector.is_adaptive() {
                log::warn!(
                    "no {} search data for {side}'s move; adaptive handicap skips it",
                    self.config.weighting
                );
            }
            return;
        };
        let Some(data) = MoveEvalData::from_result(result, index) else {
            return;
        };
        if side == self.side {
            self.own_moves.push(data);
        } else {
            self.opponent_moves.push(data);
        }
    }
}
