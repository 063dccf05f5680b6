use crate::logic::board::Side;
use crate::logic::game::Game;
use crate::logic::rules::LogicError;
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub mod arena;
pub mod config;
pub mod controller;
pub mod endgame;
pub mod error;
pub mod eval;
pub mod events;
pub mod search;
pub mod select;
pub mod telemetry;
pub mod tiebreak;
pub mod tt;

#[cfg(test)]
mod search_test;

/// Static evaluation of a running position, from `side`'s point of view.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, game: &Game, side: Side) -> i32;
}

/// Scoring of a finished game. Only defined once the game has ended.
pub trait TerminalEvaluator: Send + Sync {
    fn evaluate_terminal(&self, game: &Game, side: Side) -> Result<i32, LogicError>;
}

/// Read-only diagnostics of the last completed search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub depth: i32,
    pub nodes: u64,
    pub endpoints: u64,
    pub found: u64,
    pub time_ms: u64,
    pub evaluated_moves: usize,
}

pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
