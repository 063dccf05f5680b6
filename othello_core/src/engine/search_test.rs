use crate::engine::config::AiConfig;
use crate::engine::error::{ConfigError, EngineError};
use crate::engine::eval::Weighting;
use crate::engine::search::{expand, Minimax, RootSearch};
use crate::engine::tt::ReferenceTable;
use crate::engine::Evaluator;
use crate::logic::board::{Permutation, Side};
use crate::logic::eval_constants::{LOSS, TIE};
use crate::logic::game::{Game, GameStatus};
use std::sync::Arc;

fn config(depth: i32, pruning: bool) -> AiConfig {
    AiConfig {
        depth,
        pruning,
        worker_floor: 1,
        ..AiConfig::default()
    }
}

fn search(game: &Game, cfg: &AiConfig, reference: Arc<ReferenceTable>) -> RootSearch {
    Minimax::new(game.active(), cfg, cfg.weighting, reference)
        .search_root(game, cfg.depth)
        .unwrap()
}

/// Plays `plies` moves with a fixed, varied choice pattern.
fn midgame(size: usize, plies: usize, salt: usize) -> Game {
    let mut game = Game::new(size).unwrap();
    game.start();
    for ply in 0..plies {
        if game.status() != GameStatus::Running {
            break;
        }
        let moves = game.legal_moves();
        let pick = moves[(ply * 7 + salt) % moves.len()];
        game.make_move(pick).unwrap();
    }
    game
}

#[test]
fn test_pruning_does_not_change_results() {
    for (size, plies, salt) in [(8, 10, 1), (8, 17, 4), (6, 8, 2), (6, 14, 5)] {
        let game = midgame(size, plies, salt);
        if game.status() != GameStatus::Running {
            continue;
        }

        let pruned = search(&game, &config(3, true), Arc::default());
        let full = search(&game, &config(3, false), Arc::default());
        assert_eq!(
            pruned.result.move_weights, full.result.move_weights,
            "size {size} after {plies} plies"
        );
        assert_eq!(pruned.result.weight, full.result.weight);
    }
}

#[test]
fn test_full_solve_small_board() {
    // 12 empty cells on 4x4: the whole game is searched.
    let mut game = Game::new(4).unwrap();
    game.start();
    let cfg = AiConfig {
        full_solve_point: 12,
        ..config(1, true)
    };
    let minimax = Minimax::new(game.active(), &cfg, cfg.weighting, Arc::default());
    assert_eq!(minimax.root_depth(&game, 1), 13);

    let pruned = search(&game, &cfg, Arc::default());
    let full = search(&game, &AiConfig { pruning: false, ..cfg.clone() }, Arc::default());
    assert_eq!(pruned.result.move_weights, full.result.move_weights);
    for weight in pruned.result.move_weights.values() {
        // Every value is a game result, not a heuristic.
        assert!(*weight >= TIE || *weight <= LOSS, "{weight}");
    }

    game.make_move(game.legal_moves()[0]).unwrap();
    assert_eq!(search(&game, &cfg, Arc::default()).result.depth, 13);
}

#[test]
fn test_depth_zero_is_static_evaluation() {
    let game = midgame(8, 6, 3);
    let cfg = config(0, true);
    let root = search(&game, &cfg, Arc::default());
    assert_eq!(root.result.move_weights.len(), game.legal_moves().len());
    for (&index, &weight) in &root.result.move_weights {
        let child = expand(&game, index);
        assert_eq!(weight, cfg.weighting.evaluate(&child, game.active()));
    }
    assert_eq!(root.result.weight, root.result.best_weight().unwrap());
}

#[test]
fn test_warm_reference_gives_same_weights() {
    let game = midgame(8, 12, 2);
    let cfg = config(3, true);
    let cold = search(&game, &cfg, Arc::default());

    let warm = search(&game, &cfg, Arc::new(cold.table));
    assert_eq!(warm.result.move_weights, cold.result.move_weights);
    assert!(warm.stats.found > 0);
    assert!(warm.stats.nodes < cold.stats.nodes);
}

#[test]
fn test_unrotation_through_reference() {
    let game = midgame(8, 9, 6);
    let cfg = config(2, true);
    let original = search(&game, &cfg, Arc::default());

    for perm in Permutation::ALL {
        let mirrored = Game::from_board(game.board.permuted(perm), game.active());
        // Cold search of the mirrored board, then one that reuses the
        // original board's cache through the symmetry.
        let cold = search(&mirrored, &cfg, Arc::default());
        let reused = search(&mirrored, &cfg, Arc::new(original.table.clone()));
        for (&index, &weight) in &original.result.move_weights {
            let mapped = perm.apply(index, 8);
            assert_eq!(cold.result.move_weights.get(&mapped), Some(&weight), "{perm:?}");
            assert_eq!(reused.result.move_weights.get(&mapped), Some(&weight), "{perm:?}");
        }
        assert!(reused.stats.found > 0);
    }
}

#[test]
fn test_trimming_keeps_best_reference_moves() {
    let game = midgame(8, 12, 1);
    let cfg = config(2, true);
    let first = search(&game, &cfg, Arc::default());
    let mut ranked: Vec<(usize, i32)> = first
        .result
        .move_weights
        .iter()
        .map(|(&m, &w)| (m, w))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    assert!(ranked.len() > 2);

    let trimmed_cfg = AiConfig {
        move_trimming: true,
        trim_to: 2,
        ..cfg
    };
    let trimmed = search(&game, &trimmed_cfg, Arc::new(first.table));
    assert_eq!(trimmed.stats.evaluated_moves, 2);
    assert_eq!(trimmed.untrimmed.len(), game.legal_moves().len());
    let best = ranked[0].1;
    assert_eq!(trimmed.result.weight, best);
    for (index, weight) in &trimmed.result.move_weights {
        assert!(ranked.iter().take_while(|(_, w)| *w >= ranked[1].1).any(|(m, _)| m == index));
        assert_eq!(first.result.move_weights.get(index), Some(weight));
    }
}

#[test]
fn test_trimming_without_reference_takes_board_order() {
    let game = midgame(8, 12, 1);
    let cfg = AiConfig {
        move_trimming: true,
        trim_to: 1,
        ..config(1, true)
    };
    let root = search(&game, &cfg, Arc::default());
    let keys: Vec<usize> = root.result.move_weights.keys().copied().collect();
    assert_eq!(keys, vec![game.legal_moves()[0]]);
}

#[test]
fn test_invalid_requests() {
    let mut game = Game::new(8).unwrap();
    let cfg = config(2, true);
    let minimax = Minimax::new(game.active(), &cfg, Weighting::DiskDifference, Arc::default());

    // Still in setup.
    assert!(matches!(minimax.search_root(&game, 2), Err(EngineError::NoLegalMoves)));

    game.start();
    assert!(matches!(
        minimax.search_root(&game, -1),
        Err(EngineError::Config(ConfigError::InvalidDepth(-1)))
    ));
}

#[test]
fn test_worker_panic_surfaces_as_fault() {
    let mut game = Game::new(8).unwrap();
    game.start();
    // A corrupted legal-move cache: cell 0 flips nothing on the opening.
    let mut value = serde_json::to_value(&game).unwrap();
    value["legal_moves"] = serde_json::json!([0, 19]);
    let corrupted: Game = serde_json::from_value(value).unwrap();
    assert_eq!(corrupted.legal_moves(), &[0, 19]);

    let cfg = config(2, true);
    let minimax = Minimax::new(Side::Black, &cfg, cfg.weighting, Arc::default());
    match minimax.search_root(&corrupted, 2) {
        Err(EngineError::WorkerFault { index, message }) => {
            assert_eq!(index, 0);
            assert!(message.contains("illegal placement at 0"), "{message}");
        }
        other => panic!("expected a worker fault, got {other:?}"),
    }

    // The same searcher still works on a sound position.
    let root = minimax.search_root(&game, 2).unwrap();
    assert_eq!(root.result.move_weights.len(), 4);
}
