use crate::engine::search::SearchResult;
use crate::logic::eval_constants::{LOSS, WIN};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opponent records needed before any handicap is applied.
pub const ADAPTIVE_MIN_HISTORY: usize = 3;
/// How many of the opponent's most recent moves feed the handicap.
pub const OPPONENT_LOOKBACK: usize = 20;

/// Part of the game a [`MoveSelector::RandomErrors`] selector is active in,
/// by move number (1-based, both sides counted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameRegion {
    #[default]
    Any,
    Early,
    Mid,
    Late,
}

impl GameRegion {
    pub const fn contains(self, move_number: usize) -> bool {
        match self {
            Self::Any => true,
            Self::Early => move_number <= 20,
            Self::Mid => move_number > 20 && move_number <= 40,
            Self::Late => move_number > 40,
        }
    }

    /// Number of this side's moves the region spans.
    const fn span(self) -> u32 {
        match self {
            Self::Any => 30,
            _ => 10,
        }
    }
}

/// Chooses a weight bucket from a root search's per-move weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MoveSelector {
    #[default]
    Best,
    Worst,
    Random,
    /// Gives up roughly as much advantage as the opponent has been giving
    /// up, and takes the narrowest win once the game is solved.
    Adaptive { own_lookback: Option<usize> },
    /// Like `Adaptive`, but takes the biggest win once the game is solved.
    AdaptiveMaxDisks { own_lookback: Option<usize> },
    /// Best move, except for about `times` random non-best picks in `region`.
    RandomErrors { region: GameRegion, times: u32 },
}

impl MoveSelector {
    pub const fn is_adaptive(self) -> bool {
        matches!(self, Self::Adaptive { .. } | Self::AdaptiveMaxDisks { .. })
    }

    /// Weight of the chosen bucket; `None` only when `buckets` is empty.
    pub fn select<R: Rng + ?Sized>(
        self,
        buckets: &BTreeMap<i32, Vec<usize>>,
        ctx: &SelectionContext<'_>,
        rng: &mut R,
    ) -> Option<i32> {
        match self {
            Self::Best => buckets.keys().next_back().copied(),
            Self::Worst => buckets.keys().next().copied(),
            Self::Random => random_key(buckets.keys(), rng),
            Self::Adaptive { own_lookback } => adaptive(buckets, ctx, own_lookback, true),
            Self::AdaptiveMaxDisks { own_lookback } => adaptive(buckets, ctx, own_lookback, false),
            Self::RandomErrors { region, times } => {
                let roll = rng.gen_range(0..region.span());
                if region.contains(ctx.moves_played + 1) && times > roll {
                    if buckets.len() == 1 {
                        buckets.keys().next().copied()
                    } else {
                        random_key(buckets.keys().take(buckets.len() - 1), rng)
                    }
                } else {
                    buckets.keys().next_back().copied()
                }
            }
        }
    }
}

impl fmt::Display for MoveSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Best => write!(f, "Best"),
            Self::Worst => write!(f, "Worst"),
            Self::Random => write!(f, "Random"),
            Self::Adaptive { own_lookback } => {
                write!(f, "Adaptive(own_lookback={})", lookback_label(*own_lookback))
            }
            Self::AdaptiveMaxDisks { own_lookback } => write!(
                f,
                "AdaptiveMaxDisks(own_lookback={})",
                lookback_label(*own_lookback)
            ),
            Self::RandomErrors { region, times } => {
                write!(f, "RandomErrors({region:?}x{times})")
            }
        }
    }
}

fn lookback_label(lookback: Option<usize>) -> String {
    lookback.map_or_else(|| "all".to_string(), |n| n.to_string())
}

fn random_key<'a, R: Rng + ?Sized>(
    keys: impl Iterator<Item = &'a i32>,
    rng: &mut R,
) -> Option<i32> {
    let keys: Vec<i32> = keys.copied().collect();
    if keys.is_empty() {
        return None;
    }
    Some(keys[rng.gen_range(0..keys.len())])
}

/// How one move compared with the alternatives its player had.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveEvalData {
    pub best_weight: i32,
    pub chosen_weight: i32,
    pub deviation: i64,
    pub p_picked: f64,
    pub p_worse: f64,
    pub p_better: f64,
}

impl MoveEvalData {
    /// `None` when `result` never weighed `chosen`.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_result(result: &SearchResult, chosen: usize) -> Option<Self> {
        let chosen_weight = *result.move_weights.get(&chosen)?;
        let best_weight = result.weight;
        let total = result.move_weights.len() as f64;
        let picked = result
            .move_weights
            .values()
            .filter(|&&w| w == chosen_weight)
            .count() as f64;
        let worse = result
            .move_weights
            .values()
            .filter(|&&w| w < chosen_weight)
            .count() as f64;
        Some(Self {
            best_weight,
            chosen_weight,
            deviation: (i64::from(best_weight) - i64::from(chosen_weight)).abs(),
            p_picked: picked / total,
            p_worse: worse / total,
            p_better: (total - picked - worse) / total,
        })
    }

    /// Deviation scaled up when the move was both rare and beatable.
    #[allow(clippy::cast_precision_loss)]
    pub fn score(&self) -> f64 {
        let dev = self.deviation as f64;
        dev + dev * (1.0 - self.p_picked) * self.p_better
    }
}

/// Move history the adaptive selectors look at.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionContext<'a> {
    pub opponent_moves: &'a [MoveEvalData],
    pub own_moves: &'a [MoveEvalData],
    pub moves_played: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Handicap {
    /// Largest weight that may be given up relative to the best move.
    pub weight: f64,
    /// Largest acceptable share of moves better than the chosen one.
    pub probability: f64,
}

fn tail(records: &[MoveEvalData], lookback: Option<usize>) -> &[MoveEvalData] {
    let n = lookback.map_or(records.len(), |l| l.min(records.len()));
    &records[records.len() - n..]
}

#[allow(clippy::cast_precision_loss)]
fn mean(records: &[MoveEvalData], f: impl Fn(&MoveEvalData) -> f64) -> f64 {
    if records.is_empty() {
        0.0
    } else {
        records.iter().map(f).sum::<f64>() / records.len() as f64
    }
}

/// `None` until the opponent has made enough recorded moves.
pub fn handicap(ctx: &SelectionContext<'_>, own_lookback: Option<usize>) -> Option<Handicap> {
    if ctx.opponent_moves.len() < ADAPTIVE_MIN_HISTORY {
        return None;
    }
    let theirs = tail(ctx.opponent_moves, Some(OPPONENT_LOOKBACK));
    let ours = tail(ctx.own_moves, own_lookback);
    let weight = (mean(theirs, MoveEvalData::score) - mean(ours, MoveEvalData::score)).max(0.0);
    let probability = mean(theirs, |d| d.p_better);
    Some(Handicap {
        weight,
        probability,
    })
}

fn adaptive(
    buckets: &BTreeMap<i32, Vec<usize>>,
    ctx: &SelectionContext<'_>,
    own_lookback: Option<usize>,
    least_margin_win: bool,
) -> Option<i32> {
    let best = *buckets.keys().next_back()?;

    if best >= WIN {
        if !least_margin_win {
            return Some(best);
        }
        return buckets.keys().copied().filter(|&w| w >= WIN).min();
    }

    let Some(handicap) = handicap(ctx, own_lookback) else {
        return Some(best);
    };
    log::debug!(
        "adaptive handicap {:.1}, probability {:.3}",
        handicap.weight,
        handicap.probability
    );

    #[allow(clippy::cast_precision_loss)]
    let total = buckets.values().map(Vec::len).sum::<usize>() as f64;
    let mut chosen = best;
    let mut better = 0usize;
    for (&weight, moves) in buckets.iter().rev() {
        if weight != best {
            if weight <= LOSS {
                break;
            }
            #[allow(clippy::cast_precision_loss)]
            let p_better = better as f64 / total;
            if f64::from(weight) + handicap.weight > f64::from(best)
                && p_better < handicap.probability
            {
                chosen = weight;
            }
        }
        better += moves.len();
    }
    Some(chosen)
}
