use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use othello_core::engine::arena::Arena;
use othello_core::engine::config::{MatchConfig, PlayerConfig};
use othello_core::engine::events::{GameEvent, GameObserver};
use othello_core::logic::board::Side;
use othello_core::logic::game::{Game, GameStatus, Outcome};
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HumanSide {
    Black,
    White,
}

impl From<HumanSide> for Side {
    fn from(side: HumanSide) -> Self {
        match side {
            HumanSide::Black => Self::Black,
            HumanSide::White => Self::White,
        }
    }
}

#[derive(Parser)]
#[clap(author, version, about = "Othello with a parallel minimax AI", long_about = None)]
struct Args {
    /// Match configuration as JSON; flags below override it.
    #[clap(short, long)]
    config: Option<PathBuf>,

    #[clap(short, long, default_value_t = 1)]
    games: usize,

    /// Board size: 4, 6 or 8.
    #[clap(short, long)]
    size: Option<usize>,

    #[clap(long)]
    black_depth: Option<i32>,

    #[clap(long)]
    white_depth: Option<i32>,

    /// Play this side from the keyboard.
    #[clap(long, value_enum)]
    human: Option<HumanSide>,

    /// Append one JSON match record per game to this file.
    #[clap(short, long)]
    record: Option<PathBuf>,

    /// Print the effective match configuration as JSON and exit.
    #[clap(long, action = clap::ArgAction::SetTrue)]
    print_config: bool,

    /// Don't print the board after every move.
    #[clap(short, long, action = clap::ArgAction::SetTrue)]
    quiet: bool,
}

/// Prints AI decisions as they are made.
struct ConsoleObserver {
    quiet: bool,
}

impl GameObserver for ConsoleObserver {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::SearchCompleted(snapshot) => {
                tracing::debug!(
                    side = %snapshot.side,
                    depth = snapshot.stats.depth,
                    nodes = snapshot.stats.nodes,
                    found = snapshot.stats.found,
                    time_ms = snapshot.stats.time_ms,
                    weight = snapshot.chosen_weight,
                    "search completed"
                );
                if let Some(handicap) = snapshot.handicap {
                    tracing::debug!(
                        weight = handicap.weight,
                        probability = handicap.probability,
                        "adaptive handicap"
                    );
                }
            }
            GameEvent::StateChanged { to, winner, .. } if !self.quiet => {
                if let Some(winner) = winner {
                    println!("{to:?}: {winner}");
                }
            }
            _ => {}
        }
    }
}

fn load_config(args: &Args) -> anyhow::Result<MatchConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            MatchConfig::load_from_json(&json)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => MatchConfig::default(),
    };

    if let Some(size) = args.size {
        config.board_size = size;
    }
    for (side, depth) in [(Side::Black, args.black_depth), (Side::White, args.white_depth)] {
        if let (Some(depth), PlayerConfig::Ai(ai)) = (depth, config.player_mut(side)) {
            ai.depth = depth;
        }
    }
    if let Some(human) = args.human {
        *config.player_mut(human.into()) = PlayerConfig::Human;
    }
    config.validate()?;
    Ok(config)
}

fn read_human_move(game: &Game, input: &mut impl BufRead) -> anyhow::Result<usize> {
    let board = &game.board;
    loop {
        let options: Vec<String> = game
            .legal_moves()
            .iter()
            .map(|&i| board.square_name(i))
            .collect();
        print!("{} to move [{}]: ", game.active(), options.join(" "));
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("input closed");
        }
        match board.parse_square(&line) {
            Some(index) if game.legal_moves().contains(&index) => return Ok(index),
            Some(_) => println!("not a legal move"),
            None => println!("expected a square such as d3"),
        }
    }
}

fn play(arena: &mut Arena, quiet: bool) -> anyhow::Result<()> {
    while arena.game().status() == GameStatus::Running {
        let outcome = if arena.is_human_turn() {
            println!("{}", arena.game().board);
            let index = read_human_move(arena.game(), &mut io::stdin().lock())?;
            arena.play_human_move(index)?
        } else {
            arena.play_ai_turn()?
        };
        if !quiet {
            println!(
                "{} plays {}",
                outcome.side,
                arena.game().board.square_name(outcome.index)
            );
            println!("{}", arena.game().board);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = load_config(&args)?;
    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }
    let mut arena = Arena::new(&config)?;
    arena.subscribe(Box::new(ConsoleObserver { quiet: args.quiet }));

    let mut record_file = args
        .record
        .as_ref()
        .map(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening {}", path.display()))
        })
        .transpose()?;

    let (mut black_wins, mut white_wins) = (0usize, 0usize);
    for game_number in 0..args.games {
        if game_number > 0 {
            arena.restart();
        } else {
            arena.start();
        }
        play(&mut arena, args.quiet)?;

        let record = arena.record()?;
        tracing::info!(
            game = game_number + 1,
            black = record.black_disks,
            white = record.white_disks,
            winner = %record.winner,
            "game finished"
        );
        match record.winner {
            Outcome::Won(Side::Black) => black_wins += 1,
            Outcome::Won(Side::White) => white_wins += 1,
            Outcome::Tie => {}
        }
        if let Some(file) = record_file.as_mut() {
            writeln!(file, "{}", record.to_json()?)?;
        }
    }

    if args.games > 1 {
        println!(
            "black {black_wins} / white {white_wins} / ties {}",
            args.games - black_wins - white_wins
        );
    }
    Ok(())
}
