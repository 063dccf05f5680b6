use crate::logic::board::Side;
use crate::logic::rules::{LogicError, MoveError};
use thiserror::Error;

/// Rejected AI or match configuration. Reported at setup, before any search.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("search depth must be non-negative, got {0}")]
    InvalidDepth(i32),

    #[error("move trimming is enabled but trim_to is 0")]
    InvalidTrim,

    #[error("full_solve_point {point} exceeds the {cells} cells of the board")]
    InvalidFullSolvePoint { point: usize, cells: usize },

    #[error("worker_floor must be at least 1")]
    InvalidWorkerFloor,

    #[error("unsupported board size {0}; expected an even size from 4 to 8")]
    InvalidBoardSize(usize),

    #[error("{side} uses an adaptive selector but its opponent never searches with {weighting}")]
    MismatchedWeighting { side: Side, weighting: String },

    #[error("{0} uses an adaptive selector against a human seat")]
    AdaptiveNeedsAiOpponent(Side),

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("logic error: {0}")]
    Logic(#[from] LogicError),

    #[error("move rejected: {0}")]
    Move(#[from] MoveError),

    #[error("search worker for top-level move {index} panicked: {message}")]
    WorkerFault { index: usize, message: String },

    #[error("failed to build search thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("active side has no legal moves")]
    NoLegalMoves,

    #[error("{0} is played by a human; no AI controller is seated")]
    HumanSeat(Side),

    #[error("{0} is played by the AI; human input is not accepted")]
    AiSeat(Side),
}

pub type EngineResult<T> = Result<T, EngineError>;
