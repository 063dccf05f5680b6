use crate::engine::TerminalEvaluator;
use crate::logic::board::Side;
use crate::logic::eval_constants::{LOSS, TIE, WIN};
use crate::logic::game::{Game, Outcome};
use crate::logic::rules::LogicError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scoring of finished games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EndgameWeighting {
    WinLossTie,
    /// Win/loss/tie plus the disk margin, so bigger wins rank higher.
    #[default]
    DiskMaximizing,
}

impl EndgameWeighting {
    pub const fn name(self) -> &'static str {
        match self {
            Self::WinLossTie => "WinLossTie",
            Self::DiskMaximizing => "DiskMaximizing",
        }
    }
}

impl fmt::Display for EndgameWeighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn win_loss_tie(outcome: Outcome, side: Side) -> i32 {
    match outcome {
        Outcome::Tie => TIE,
        Outcome::Won(winner) if winner == side => WIN,
        Outcome::Won(_) => LOSS,
    }
}

impl TerminalEvaluator for EndgameWeighting {
    #[allow(clippy::cast_possible_wrap)]
    fn evaluate_terminal(&self, game: &Game, side: Side) -> Result<i32, LogicError> {
        let outcome = game.compute_winner()?;
        let base = win_loss_tie(outcome, side);
        if *self == Self::WinLossTie {
            return Ok(base);
        }

        let counts = game.board.counts();
        let own = counts.of(side) as i32;
        Ok(match outcome {
            Outcome::Tie => base,
            Outcome::Won(winner) if winner == side => base + counts.empty as i32 + own,
            Outcome::Won(_) => base + own - game.board.len() as i32 * 2,
        })
    }
}
