use crate::engine::eval::Weighting;
use crate::engine::select::Handicap;
use crate::engine::SearchStats;
use crate::logic::board::Side;
use crate::logic::game::{GameStatus, Outcome};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Diagnostics of one AI decision, published after the search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSnapshot {
    pub side: Side,
    pub weighting: Weighting,
    pub stats: SearchStats,
    pub move_weights: BTreeMap<usize, i32>,
    pub chosen: usize,
    pub chosen_weight: i32,
    pub untrimmed: Vec<usize>,
    pub handicap: Option<Handicap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    TileChanged {
        index: usize,
        x: usize,
        y: usize,
        owner: Option<Side>,
    },
    MoveMade {
        side: Side,
        index: usize,
    },
    StateChanged {
        from: GameStatus,
        to: GameStatus,
        winner: Option<Outcome>,
    },
    SearchCompleted(SearchSnapshot),
}

pub trait GameObserver: Send {
    fn on_event(&mut self, event: &GameEvent);
}

/// Records every event; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<GameEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<GameEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl GameObserver for EventLog {
    fn on_event(&mut self, event: &GameEvent) {
        self.events.lock().push(event.clone());
    }
}
