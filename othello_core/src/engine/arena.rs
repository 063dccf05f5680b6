use crate::engine::config::{MatchConfig, PlayerConfig};
use crate::engine::controller::{AiController, SearchReport};
use crate::engine::elapsed_ms;
use crate::engine::error::{ConfigError, EngineError, EngineResult};
use crate::engine::events::{GameEvent, GameObserver};
use crate::engine::telemetry::{MatchRecord, MovePerformance};
use crate::logic::board::{Cell, Side};
use crate::logic::game::{Game, GameStatus, MoveOutcome};
use std::time::Instant;
use uuid::Uuid;

pub enum Seat {
    Ai(Box<AiController>),
    Human,
}

impl Seat {
    fn from_config(side: Side, config: &PlayerConfig) -> Result<Self, ConfigError> {
        Ok(match config {
            PlayerConfig::Ai(ai) => Self::Ai(Box::new(AiController::new(side, ai.clone())?)),
            PlayerConfig::Human => Self::Human,
        })
    }

    pub fn fingerprint(&self) -> String {
        match self {
            Self::Ai(ai) => ai.fingerprint(),
            Self::Human => "Human".to_string(),
        }
    }
}

/// Runs one game between two seats and publishes what happens to the
/// subscribed observers.
pub struct Arena {
    game: Game,
    black: Seat,
    white: Seat,
    observers: Vec<Box<dyn GameObserver>>,
    performance: Vec<MovePerformance>,
    match_id: Uuid,
}

impl Arena {
    pub fn new(config: &MatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            game: Game::new(config.board_size)?,
            black: Seat::from_config(Side::Black, &config.black)?,
            white: Seat::from_config(Side::White, &config.white)?,
            observers: Vec::new(),
            performance: Vec::new(),
            match_id: Uuid::new_v4(),
        })
    }

    pub fn subscribe(&mut self, observer: Box<dyn GameObserver>) {
        self.observers.push(observer);
    }

    pub const fn game(&self) -> &Game {
        &self.game
    }

    pub const fn seat(&self, side: Side) -> &Seat {
        match side {
            Side::Black => &self.black,
            Side::White => &self.white,
        }
    }

    fn seat_mut(&mut self, side: Side) -> &mut Seat {
        match side {
            Side::Black => &mut self.black,
            Side::White => &mut self.white,
        }
    }

    fn publish(&mut self, event: &GameEvent) {
        for observer in &mut self.observers {
            observer.on_event(event);
        }
    }

    fn publish_tile(&mut self, index: usize) {
        let (x, y) = self.game.board.coords(index);
        let owner = match self.game.board.cell(index) {
            Cell::Empty => None,
            Cell::Disk(side) => Some(side),
        };
        self.publish(&GameEvent::TileChanged { index, x, y, owner });
    }

    /// Starts the game if it is still in setup and announces the opening.
    pub fn start(&mut self) {
        if self.game.status() != GameStatus::Setup {
            return;
        }
        self.game.start();
        for index in 0..self.game.board.len() {
            if self.game.board.cell(index) != Cell::Empty {
                self.publish_tile(index);
            }
        }
        self.publish(&GameEvent::StateChanged {
            from: GameStatus::Setup,
            to: GameStatus::Running,
            winner: None,
        });
    }

    /// Back to the opening with fresh controllers state and a new match id.
    pub fn restart(&mut self) {
        self.game.reset();
        for side in Side::BOTH {
            if let Seat::Ai(ai) = self.seat_mut(side) {
                ai.reset();
            }
        }
        self.performance.clear();
        self.match_id = Uuid::new_v4();
        self.start();
    }

    pub fn is_human_turn(&self) -> bool {
        self.game.status() == GameStatus::Running
            && matches!(self.seat(self.game.active()), Seat::Human)
    }

    /// Lets the AI on the active seat search and play.
    pub fn play_ai_turn(&mut self) -> EngineResult<MoveOutcome> {
        let side = self.game.active();
        let start = Instant::now();

        let seat = match side {
            Side::Black => &mut self.black,
            Side::White => &mut self.white,
        };
        let (decision, report) = match seat {
            Seat::Ai(ai) => {
                let decision = ai.compute_move(&self.game)?;
                (decision, ai.report())
            }
            Seat::Human => return Err(EngineError::HumanSeat(side)),
        };
        let evaluated = decision.snapshot.stats.evaluated_moves;
        self.publish(&GameEvent::SearchCompleted(decision.snapshot));

        self.apply(decision.index, report.as_ref(), elapsed_ms(start), evaluated)
    }

    /// Plays a move chosen by the human on the active seat.
    pub fn play_human_move(&mut self, index: usize) -> EngineResult<MoveOutcome> {
        let side = self.game.active();
        if let Seat::Ai(_) = self.seat(side) {
            return Err(EngineError::AiSeat(side));
        }
        let valid_moves = self.game.legal_moves().len();
        self.apply(index, None, 0, valid_moves)
    }

    fn apply(
        &mut self,
        index: usize,
        report: Option<&SearchReport>,
        time_ms: u64,
        evaluated_moves: usize,
    ) -> EngineResult<MoveOutcome> {
        let outcome = self.game.make_move(index)?;
        let move_number = self.performance.len();

        self.publish(&GameEvent::MoveMade {
            side: outcome.side,
            index,
        });
        self.publish_tile(index);
        for flipped in outcome.flipped_indices() {
            self.publish_tile(flipped);
        }

        for side in Side::BOTH {
            if let Seat::Ai(ai) = self.seat_mut(side) {
                ai.on_move_made(outcome.side, index, report);
            }
        }

        self.performance.push(MovePerformance {
            move_index: move_number,
            side: outcome.side,
            time_ms,
            valid_moves: evaluated_moves,
        });

        if outcome.status_changed() {
            self.publish(&GameEvent::StateChanged {
                from: outcome.status_before,
                to: outcome.status_after,
                winner: outcome.winner,
            });
        }
        if let Some(winner) = outcome.winner {
            let counts = self.game.board.counts();
            log::info!(
                "game over: {winner} ({} black, {} white) after {} moves",
                counts.black,
                counts.white,
                self.game.moves_played()
            );
        }
        Ok(outcome)
    }

    /// Plays AI against AI until the game ends.
    pub fn play_game(&mut self) -> EngineResult<MatchRecord> {
        self.start();
        while self.game.status() == GameStatus::Running {
            if self.is_human_turn() {
                return Err(EngineError::HumanSeat(self.game.active()));
            }
            self.play_ai_turn()?;
        }
        self.record()
    }

    /// Per-move timing so far, in play order.
    pub fn performance(&self) -> &[MovePerformance] {
        &self.performance
    }

    /// Record of the finished game.
    pub fn record(&self) -> EngineResult<MatchRecord> {
        let winner = self.game.compute_winner()?;
        let counts = self.game.board.counts();
        Ok(MatchRecord {
            match_id: self.match_id,
            black_controller: self.black.fingerprint(),
            white_controller: self.white.fingerprint(),
            black_disks: counts.black,
            white_disks: counts.white,
            winner,
            final_board_state: self.game.board.to_board_string(),
            board_size: self.game.board.size(),
            performance: self.performance.clone(),
        })
    }
}
