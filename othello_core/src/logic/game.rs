use crate::engine::error::ConfigError;
use crate::logic::board::{Board, Cell, Side};
use crate::logic::rules::{LogicError, MoveError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    Setup,
    Running,
    Deadlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Won(Side),
    Tie,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Won(side) => write!(f, "{side} wins"),
            Self::Tie => write!(f, "tie"),
        }
    }
}

/// What a validated [`Game::make_move`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub side: Side,
    pub index: usize,
    pub flipped: u64,
    pub status_before: GameStatus,
    pub status_after: GameStatus,
    pub winner: Option<Outcome>,
}

impl MoveOutcome {
    pub fn flipped_indices(&self) -> impl Iterator<Item = usize> {
        let mut rest = self.flipped;
        std::iter::from_fn(move || {
            if rest == 0 {
                return None;
            }
            let i = rest.trailing_zeros() as usize;
            rest &= rest - 1;
            Some(i)
        })
    }

    pub fn status_changed(&self) -> bool {
        self.status_before != self.status_after
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub board: Board,
    history: Vec<usize>,
    active: Side,
    legal_moves: Vec<usize>,
    status: GameStatus,
    winner: Option<Outcome>,
}

impl Default for Game {
    fn default() -> Self {
        Self::from_setup(Board::default())
    }
}

impl Game {
    /// Fresh game in `Setup` with the standard opening.
    pub fn new(size: usize) -> Result<Self, ConfigError> {
        if !Board::is_supported_size(size) {
            return Err(ConfigError::InvalidBoardSize(size));
        }
        Ok(Self::from_setup(Board::standard(size)))
    }

    fn from_setup(board: Board) -> Self {
        let legal_moves = board.legal_moves_for(Side::Black);
        Self {
            board,
            history: Vec::with_capacity(64),
            active: Side::Black,
            legal_moves,
            status: GameStatus::Setup,
            winner: None,
        }
    }

    /// A running game at an arbitrary position. If `active` has no move the
    /// turn passes, and a position where neither side can move is terminal.
    #[must_use]
    pub fn from_board(board: Board, active: Side) -> Self {
        let legal_moves = board.legal_moves_for(active);
        let mut game = Self {
            board,
            history: Vec::new(),
            active,
            legal_moves,
            status: GameStatus::Running,
            winner: None,
        };
        if !game.is_terminal() && game.legal_moves.is_empty() {
            game.advance();
        }
        game
    }

    pub fn start(&mut self) -> &mut Self {
        if self.status == GameStatus::Setup {
            self.status = GameStatus::Running;
            self.legal_moves = self.board.legal_moves_for(self.active);
        }
        self
    }

    pub fn reset(&mut self) -> &mut Self {
        *self = Self::from_setup(Board::standard(self.board.size()));
        self
    }

    pub fn restart(&mut self) -> &mut Self {
        self.reset().start()
    }

    pub const fn active(&self) -> Side {
        self.active
    }

    pub const fn status(&self) -> GameStatus {
        self.status
    }

    pub const fn winner(&self) -> Option<Outcome> {
        self.winner
    }

    pub fn legal_moves(&self) -> &[usize] {
        &self.legal_moves
    }

    pub fn history(&self) -> &[usize] {
        &self.history
    }

    pub fn moves_played(&self) -> usize {
        self.history.len()
    }

    pub fn last_move(&self) -> Option<usize> {
        self.history.last().copied()
    }

    /// Places a disk for the active side. The caller guarantees legality.
    pub fn place_and_flip(&mut self, index: usize) -> u64 {
        self.board.place_and_flip(self.active, index)
    }

    /// Hands the turn to the other side and recomputes its legal moves.
    pub fn advance(&mut self) {
        self.active = self.active.opposite();
        self.legal_moves = self.board.legal_moves_for(self.active);
    }

    /// `true` once neither side can move. Leaves the turn with the side to
    /// move when the game goes on, even if that side currently has to pass.
    pub fn is_terminal(&mut self) -> bool {
        if self.status == GameStatus::Deadlock {
            return true;
        }
        if !self.legal_moves.is_empty() {
            return false;
        }

        self.advance();
        if !self.legal_moves.is_empty() {
            self.advance();
            return false;
        }

        self.status = GameStatus::Deadlock;
        self.winner = Some(self.outcome_by_count());
        true
    }

    /// Advance, stop at a terminal position, and skip a side with no move.
    pub fn next_turn(&mut self) {
        self.advance();
        if self.is_terminal() {
            return;
        }
        if self.legal_moves.is_empty() {
            self.advance();
        }
    }

    /// Plays `index` for the active side after validating it.
    pub fn make_move(&mut self, index: usize) -> Result<MoveOutcome, MoveError> {
        if self.status != GameStatus::Running {
            return Err(MoveError::GameNotRunning(self.status));
        }
        if index >= self.board.len() {
            return Err(MoveError::OutOfBounds(index));
        }
        if self.board.cell(index) != Cell::Empty {
            return Err(MoveError::Occupied(index));
        }
        if !self.legal_moves.contains(&index) {
            return Err(MoveError::NoFlips(index));
        }

        let side = self.active;
        let status_before = self.status;
        self.history.push(index);
        let flipped = self.place_and_flip(index);
        self.next_turn();

        Ok(MoveOutcome {
            side,
            index,
            flipped,
            status_before,
            status_after: self.status,
            winner: self.winner,
        })
    }

    /// Winner of a finished game.
    pub fn compute_winner(&self) -> Result<Outcome, LogicError> {
        if self.status != GameStatus::Deadlock {
            return Err(LogicError::WinnerOnRunningGame);
        }
        Ok(self.outcome_by_count())
    }

    fn outcome_by_count(&self) -> Outcome {
        let counts = self.board.counts();
        match counts.black.cmp(&counts.white) {
            Ordering::Greater => Outcome::Won(Side::Black),
            Ordering::Less => Outcome::Won(Side::White),
            Ordering::Equal => Outcome::Tie,
        }
    }
}
