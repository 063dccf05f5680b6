use crate::engine::search::SearchResult;
use crate::logic::board::{BoardKey, Permutation};
use crate::logic::game::Game;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TTFlag {
    #[default]
    Exact,
    LowerBound, // Fail-high
    UpperBound, // Fail-low
}

impl TTFlag {
    /// Bound kind of a fail-soft value searched with window `(alpha, beta)`.
    pub const fn classify(weight: i32, alpha: i32, beta: i32) -> Self {
        if weight <= alpha {
            Self::UpperBound
        } else if weight >= beta {
            Self::LowerBound
        } else {
            Self::Exact
        }
    }

    /// Whether a stored value with this flag answers a search in `(alpha, beta)`.
    pub const fn usable(self, weight: i32, alpha: i32, beta: i32) -> bool {
        match self {
            Self::Exact => true,
            Self::LowerBound => weight >= beta,
            Self::UpperBound => weight <= alpha,
        }
    }
}

/// Last ply's cache, read-only while the next search runs.
pub type ReferenceTable = HashMap<BoardKey, Arc<SearchResult>>;

#[derive(Debug, Clone)]
pub struct CacheHit {
    pub entry: Arc<SearchResult>,
    /// Symmetry that maps the probed board onto the stored one. Stored move
    /// indices go back through the same permutation.
    pub permutation: Permutation,
    pub from_working: bool,
}

impl CacheHit {
    /// Stored per-move weights in the probed board's coordinates.
    pub fn unrotated_moves(&self, size: usize) -> impl Iterator<Item = (usize, i32)> + '_ {
        let perm = self.permutation;
        self.entry
            .move_weights
            .iter()
            .map(move |(&m, &w)| (perm.apply(m, size), w))
    }
}

/// Working cache shared by every search worker of one ply.
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: DashMap<BoardKey, Arc<SearchResult>>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks `game` up under all four symmetries, working cache first.
    pub fn get(&self, game: &Game, reference: &ReferenceTable) -> Option<CacheHit> {
        for perm in Permutation::ALL {
            let key = game.board.permuted_key(perm, game.active());
            if let Some(entry) = self.entries.get(&key) {
                return Some(CacheHit {
                    entry: Arc::clone(entry.value()),
                    permutation: perm,
                    from_working: true,
                });
            }
        }
        probe_reference(reference, game)
    }

    /// Stores under the identity key. An existing entry is only replaced by
    /// a strictly deeper one. Returns whether `result` was kept.
    pub fn set(&self, game: &Game, result: SearchResult) -> bool {
        let key = game.board.key(game.active());
        match self.entries.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(result));
                true
            }
            Entry::Occupied(mut slot) => {
                if result.depth > slot.get().depth {
                    slot.insert(Arc::new(result));
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Turns the working cache into the next ply's reference cache.
    pub fn freeze(self) -> ReferenceTable {
        let table: ReferenceTable = self.entries.into_iter().collect();
        log::trace!("froze {} transposition entries", table.len());
        table
    }
}

pub fn probe_reference(reference: &ReferenceTable, game: &Game) -> Option<CacheHit> {
    if reference.is_empty() {
        return None;
    }
    Permutation::ALL.into_iter().find_map(|perm| {
        let key = game.board.permuted_key(perm, game.active());
        reference.get(&key).map(|entry| CacheHit {
            entry: Arc::clone(entry),
            permutation: perm,
            from_working: false,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::board::Side;
    use std::collections::BTreeMap;

    fn result(depth: i32, weight: i32, moves: &[(usize, i32)]) -> SearchResult {
        SearchResult {
            weight,
            move_weights: moves.iter().copied().collect::<BTreeMap<_, _>>(),
            depth,
            flag: TTFlag::Exact,
            nodes: 1,
            endpoints: 0,
            found: 0,
        }
    }

    fn after_d3() -> Game {
        let mut game = Game::new(8).unwrap();
        game.start();
        game.make_move(19).unwrap();
        game
    }

    #[test]
    fn test_get_through_every_symmetry() {
        let game = after_d3();
        let table = TranspositionTable::new();
        let moves: Vec<(usize, i32)> = game.legal_moves().iter().map(|&m| (m, 10)).collect();
        assert!(table.set(&game, result(3, 42, &moves)));

        let reference = ReferenceTable::new();
        for perm in Permutation::ALL {
            let mirrored = Game::from_board(game.board.permuted(perm), game.active());
            let hit = table.get(&mirrored, &reference).unwrap();
            assert_eq!(hit.entry.weight, 42);
            assert!(hit.from_working);

            // Un-rotated moves are exactly the mirrored board's legal moves.
            let mut unrotated: Vec<usize> = hit.unrotated_moves(8).map(|(m, _)| m).collect();
            unrotated.sort_unstable();
            assert_eq!(unrotated, mirrored.legal_moves());
        }
    }

    #[test]
    fn test_side_to_move_is_part_of_key() {
        let game = after_d3();
        let table = TranspositionTable::new();
        table.set(&game, result(3, 1, &[]));
        let other_side = Game::from_board(game.board.clone(), Side::Black);
        assert!(table.get(&other_side, &ReferenceTable::new()).is_none());
    }

    #[test]
    fn test_only_deeper_results_replace() {
        let game = after_d3();
        let table = TranspositionTable::new();
        assert!(table.set(&game, result(4, 1, &[])));
        assert!(!table.set(&game, result(2, 2, &[])));
        assert!(!table.set(&game, result(4, 3, &[])));
        let reference = ReferenceTable::new();
        assert_eq!(table.get(&game, &reference).unwrap().entry.weight, 1);

        assert!(table.set(&game, result(5, 4, &[])));
        assert_eq!(table.get(&game, &reference).unwrap().entry.weight, 4);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_reference_is_probed_after_working() {
        let game = after_d3();
        let old = TranspositionTable::new();
        old.set(&game, result(2, 7, &[]));
        let reference = old.freeze();

        let working = TranspositionTable::new();
        let hit = working.get(&game, &reference).unwrap();
        assert!(!hit.from_working);
        assert_eq!(hit.entry.weight, 7);

        working.set(&game, result(1, 9, &[]));
        let hit = working.get(&game, &reference).unwrap();
        assert!(hit.from_working);
        assert_eq!(hit.entry.weight, 9);
    }

    #[test]
    fn test_flag_usability() {
        assert_eq!(TTFlag::classify(5, 0, 10), TTFlag::Exact);
        assert_eq!(TTFlag::classify(0, 0, 10), TTFlag::UpperBound);
        assert_eq!(TTFlag::classify(12, 0, 10), TTFlag::LowerBound);

        assert!(TTFlag::Exact.usable(5, 100, 200));
        assert!(TTFlag::LowerBound.usable(12, 0, 10));
        assert!(!TTFlag::LowerBound.usable(12, 0, 20));
        assert!(TTFlag::UpperBound.usable(-3, 0, 10));
        assert!(!TTFlag::UpperBound.usable(3, 0, 10));
    }
}
