use crate::logic::board::Side;
use crate::logic::game::GameStatus;
use thiserror::Error;

/// A rejected placement request. Always recoverable: the game is unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("game is not running (status {0:?})")]
    GameNotRunning(GameStatus),

    #[error("cell {0} is outside the board")]
    OutOfBounds(usize),

    #[error("cell {0} is already occupied")]
    Occupied(usize),

    #[error("placing at {0} flips nothing")]
    NoFlips(usize),
}

/// Broken internal invariant.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicError {
    #[error("winner requested while the game is still running")]
    WinnerOnRunningGame,

    #[error("illegal placement at {index} for {side}")]
    IllegalPlacement { side: Side, index: usize },

    #[error("a non-terminal node produced no child weights")]
    EmptyMoveSet,

    #[error("controller for {expected} asked to move while {actual} is active")]
    WrongSide { expected: Side, actual: Side },
}
