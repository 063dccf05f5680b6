use crate::engine::config::AiConfig;
use crate::engine::endgame::EndgameWeighting;
use crate::engine::error::{ConfigError, EngineError, EngineResult};
use crate::engine::eval::Weighting;
use crate::engine::tt::{probe_reference, CacheHit, ReferenceTable, TTFlag, TranspositionTable};
use crate::engine::{elapsed_ms, Evaluator, SearchStats, TerminalEvaluator};
use crate::logic::board::Side;
use crate::logic::eval_constants::{MAX, MIN};
use crate::logic::game::{Game, GameStatus};
use crate::logic::lookup::TileWeights;
use crate::logic::rules::LogicError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// Outcome of searching one node. Weights are from the searching side's
/// point of view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchResult {
    pub weight: i32,
    pub move_weights: BTreeMap<usize, i32>,
    pub depth: i32,
    pub flag: TTFlag,
    pub nodes: u64,
    pub endpoints: u64,
    pub found: u64,
}

impl SearchResult {
    fn leaf(weight: i32, depth: i32) -> Self {
        Self {
            weight,
            depth,
            nodes: 1,
            endpoints: 1,
            ..Self::default()
        }
    }

    /// Moves grouped by weight, lowest weight first.
    pub fn buckets(&self) -> BTreeMap<i32, Vec<usize>> {
        let mut buckets: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        for (&index, &weight) in &self.move_weights {
            buckets.entry(weight).or_default().push(index);
        }
        buckets
    }

    /// Best weight among the evaluated moves.
    pub fn best_weight(&self) -> Option<i32> {
        self.move_weights.values().copied().max()
    }
}

/// Root search output: the merged result plus the frozen cache for the
/// next ply.
#[derive(Debug)]
pub struct RootSearch {
    pub result: SearchResult,
    pub table: ReferenceTable,
    pub stats: SearchStats,
    /// Root moves in the order they were considered before trimming.
    pub untrimmed: Vec<usize>,
}

/// Alpha-beta minimax for one side, one evaluator pair and one reference
/// cache.
#[derive(Debug, Clone)]
pub struct Minimax {
    side: Side,
    weighting: Weighting,
    endgame: EndgameWeighting,
    pruning: bool,
    full_solve_point: usize,
    trim_to: Option<usize>,
    worker_floor: usize,
    reference: Arc<ReferenceTable>,
}

impl Minimax {
    pub fn new(
        side: Side,
        config: &AiConfig,
        weighting: Weighting,
        reference: Arc<ReferenceTable>,
    ) -> Self {
        Self {
            side,
            weighting,
            endgame: config.endgame,
            pruning: config.pruning,
            full_solve_point: config.full_solve_point,
            trim_to: config.move_trimming.then_some(config.trim_to),
            worker_floor: config.worker_floor.max(1),
            reference,
        }
    }

    pub const fn side(&self) -> Side {
        self.side
    }

    pub const fn weighting(&self) -> Weighting {
        self.weighting
    }

    /// Depth actually searched from `game`: near the end the whole remaining
    /// game is solved.
    pub fn root_depth(&self, game: &Game, depth: i32) -> i32 {
        if game.board.empty_count() <= self.full_solve_point {
            i32::try_from(self.full_solve_point + 1).unwrap_or(i32::MAX)
        } else {
            depth
        }
    }

    /// Searches every (possibly trimmed) root move in parallel, one task per
    /// move, and merges the results.
    pub fn search_root(&self, game: &Game, depth: i32) -> EngineResult<RootSearch> {
        if depth < 0 {
            return Err(ConfigError::InvalidDepth(depth).into());
        }
        if game.status() != GameStatus::Running || game.legal_moves().is_empty() {
            return Err(EngineError::NoLegalMoves);
        }

        let start = Instant::now();
        let depth = self.root_depth(game, depth);

        let mut moves = game.legal_moves().to_vec();
        if let Some(trim_to) = self.trim_to {
            if let Some(hit) = probe_reference(&self.reference, game) {
                moves = order_moves(game, &hit, true);
            }
            if moves.len() > trim_to {
                log::trace!("trimming root moves {} -> {}", moves.len(), trim_to);
            }
        }
        let untrimmed = moves.clone();
        if let Some(trim_to) = self.trim_to {
            moves.truncate(trim_to);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.worker_floor.max(moves.len()))
            .build()?;
        let working = TranspositionTable::new();

        let children: Vec<(usize, SearchResult)> = pool.install(|| {
            moves
                .par_iter()
                .map(|&index| self.search_root_move(game, index, depth, &working))
                .collect::<EngineResult<Vec<_>>>()
        })?;

        let mut result = SearchResult {
            weight: MIN,
            depth,
            flag: TTFlag::Exact,
            nodes: 1,
            ..SearchResult::default()
        };
        for (index, child) in children {
            result.weight = result.weight.max(child.weight);
            result.move_weights.insert(index, child.weight);
            result.nodes += child.nodes;
            result.endpoints += child.endpoints;
            result.found += child.found;
        }

        working.set(game, result.clone());
        let table = working.freeze();

        let stats = SearchStats {
            depth,
            nodes: result.nodes,
            endpoints: result.endpoints,
            found: result.found,
            time_ms: elapsed_ms(start),
            evaluated_moves: result.move_weights.len(),
        };
        log::debug!(
            "{} searched {} moves at depth {}: {} nodes, {} cache hits, {} ms",
            self.side,
            stats.evaluated_moves,
            depth,
            stats.nodes,
            stats.found,
            stats.time_ms
        );

        Ok(RootSearch {
            result,
            table,
            stats,
            untrimmed,
        })
    }

    fn search_root_move(
        &self,
        game: &Game,
        index: usize,
        depth: i32,
        working: &TranspositionTable,
    ) -> EngineResult<(usize, SearchResult)> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let child = expand(game, index);
            let maximizing = child.active() == self.side;
            self.evaluate(&child, depth - 1, maximizing, MIN, MAX, working)
        }));
        match outcome {
            Ok(result) => result.map(|r| (index, r)),
            Err(payload) => Err(EngineError::WorkerFault {
                index,
                message: panic_message(payload.as_ref()),
            }),
        }
    }

    /// Fail-soft alpha-beta over `game`, which must already have passes
    /// resolved.
    pub fn evaluate(
        &self,
        game: &Game,
        depth: i32,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
        working: &TranspositionTable,
    ) -> EngineResult<SearchResult> {
        if game.status() == GameStatus::Deadlock {
            let weight = self.endgame.evaluate_terminal(game, self.side)?;
            return Ok(SearchResult::leaf(weight, depth));
        }
        if depth < 1 {
            let weight = self.weighting.evaluate(game, self.side);
            return Ok(SearchResult::leaf(weight, depth));
        }

        let moves = match working.get(game, &self.reference) {
            Some(hit) => {
                if hit.entry.depth >= depth && hit.entry.flag.usable(hit.entry.weight, alpha, beta) {
                    return Ok(found(&hit, game.board.size()));
                }
                order_moves(game, &hit, maximizing)
            }
            None => game.legal_moves().to_vec(),
        };

        let (alpha0, beta0) = (alpha, beta);
        let mut result = SearchResult {
            weight: if maximizing { MIN } else { MAX },
            depth,
            nodes: 1,
            ..SearchResult::default()
        };

        for index in moves {
            let child = expand(game, index);
            let child_maximizing = child.active() == self.side;
            let child_result =
                self.evaluate(&child, depth - 1, child_maximizing, alpha, beta, working)?;

            result.move_weights.insert(index, child_result.weight);
            result.nodes += child_result.nodes;
            result.endpoints += child_result.endpoints;
            result.found += child_result.found;

            if maximizing {
                result.weight = result.weight.max(child_result.weight);
                alpha = alpha.max(result.weight);
            } else {
                result.weight = result.weight.min(child_result.weight);
                beta = beta.min(result.weight);
            }

            if self.pruning && alpha >= beta {
                break;
            }
        }

        if result.move_weights.is_empty() {
            return Err(LogicError::EmptyMoveSet.into());
        }

        result.flag = if self.pruning {
            TTFlag::classify(result.weight, alpha0, beta0)
        } else {
            TTFlag::Exact
        };
        working.set(game, result.clone());
        Ok(result)
    }
}

/// Plays `index`, hands over the turn and resolves a forced pass.
pub fn expand(game: &Game, index: usize) -> Game {
    let mut child = game.clone();
    child.place_and_flip(index);
    child.advance();
    if !child.is_terminal() && child.legal_moves().is_empty() {
        child.advance();
    }
    child
}

/// Legal moves of `game` ordered by a cached result: the best weight group
/// for the side to move first, then by static tile weight, then by index.
/// Moves the cache does not know come last.
pub fn order_moves(game: &Game, hit: &CacheHit, maximizing: bool) -> Vec<usize> {
    let size = game.board.size();
    let tiles = TileWeights::get(size);
    let tile = |i: usize| tiles.map_or(0, |t| t.weight(i));
    let legal = game.legal_moves();

    let mut cached: Vec<(usize, i32)> = hit
        .unrotated_moves(size)
        .filter(|(m, _)| legal.contains(m))
        .collect();
    cached.sort_by(|a, b| {
        let by_weight = if maximizing {
            b.1.cmp(&a.1)
        } else {
            a.1.cmp(&b.1)
        };
        by_weight
            .then_with(|| tile(b.0).cmp(&tile(a.0)))
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut ordered: Vec<usize> = cached.into_iter().map(|(m, _)| m).collect();
    let uncached: Vec<usize> = legal
        .iter()
        .copied()
        .filter(|m| !ordered.contains(m))
        .collect();
    ordered.extend(uncached);
    ordered
}

/// A usable cache hit, counted as a single found endpoint.
fn found(hit: &CacheHit, size: usize) -> SearchResult {
    SearchResult {
        weight: hit.entry.weight,
        move_weights: hit.unrotated_moves(size).collect(),
        depth: hit.entry.depth,
        flag: hit.entry.flag,
        nodes: 0,
        endpoints: 1,
        found: 1,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
