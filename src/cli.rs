//! Command-line surface for the search engines
//!
//! Three commands: `duel` plays two alpha-beta agents against each other on
//! a connect-N board, `escape` runs one expectimax episode in the grid
//! world, and `train` loops the TD learning agent over fresh episodes.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;

use crate::{
    connect::{AlphaBetaAgent, Board, Outcome, Seat},
    grid::{
        EpisodeOutcome, ExpectimaxAgent, GridWorld, MonsterPolicy, TdAgent, Tile, WeightVector,
        run_episode,
    },
};

#[derive(Parser, Debug)]
#[command(about = "Play two alpha-beta agents against each other")]
pub struct DuelArgs {
    /// Board width in columns
    #[arg(long, default_value_t = 7)]
    pub width: usize,

    /// Board height in rows
    #[arg(long, default_value_t = 6)]
    pub height: usize,

    /// Run length needed to win
    #[arg(long, default_value_t = 4)]
    pub win_length: usize,

    /// Search depth in plies
    #[arg(long, short = 'd', default_value_t = 4)]
    pub depth: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Export the finished game to a JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Grid scenario shared by the `escape` and `train` commands.
#[derive(Parser, Debug)]
pub struct ArenaArgs {
    /// Grid width in cells
    #[arg(long, default_value_t = 8)]
    pub width: usize,

    /// Grid height in cells
    #[arg(long, default_value_t = 8)]
    pub height: usize,

    /// Time budget in ticks
    #[arg(long, default_value_t = 200)]
    pub time_budget: i32,

    /// Monster behavior (`wander`, `pursuit`, or `none`)
    #[arg(long, short = 'm', default_value = "pursuit")]
    pub monster: String,

    /// Add a wall line the agent must blast or detour through
    #[arg(long)]
    pub walled: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Run one expectimax escape episode")]
pub struct EscapeArgs {
    #[command(flatten)]
    pub arena: ArenaArgs,

    /// Search depth in plies
    #[arg(long, short = 'd', default_value_t = 2)]
    pub depth: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Export the episode report to a JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(about = "Train the TD learning agent over repeated episodes")]
pub struct TrainArgs {
    #[command(flatten)]
    pub arena: ArenaArgs,

    /// Number of training episodes
    #[arg(long, short = 'e', default_value_t = 200)]
    pub episodes: usize,

    /// Exploration rate for epsilon-greedy move selection
    #[arg(long, default_value_t = 0.1)]
    pub epsilon: f64,

    /// Weight snapshot to load before and persist during training
    #[arg(long, short = 'w')]
    pub weights: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Export the training summary to a JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub fn duel(args: DuelArgs) -> Result<()> {
    let mut board = Board::new(args.width, args.height, args.win_length)?;
    let mut first = AlphaBetaAgent::new(args.depth)?;
    let mut second = AlphaBetaAgent::new(args.depth)?;
    if let Some(seed) = args.seed {
        first = first.with_seed(seed);
        second = second.with_seed(seed.wrapping_add(1));
    }

    println!("=== Duel Configuration ===");
    println!(
        "Board: {}x{} (win length {})",
        args.width, args.height, args.win_length
    );
    println!("Depth: {}", args.depth);

    let mut moves = Vec::new();
    let mut nodes_expanded = 0u64;
    while !board.is_terminal() {
        let agent = match board.to_move() {
            Seat::First => &mut first,
            Seat::Second => &mut second,
        };
        let column = agent.choose_column(&board)?;
        nodes_expanded += agent.nodes_expanded();
        moves.push(column);
        board = board.drop_token(column)?;
    }

    println!("\n{board}");
    let winner = match board.outcome() {
        Outcome::Won(Seat::First) => Some("first"),
        Outcome::Won(Seat::Second) => Some("second"),
        Outcome::Undecided => None,
    };
    match winner {
        Some(seat) => println!("Winner: {seat} after {} moves", moves.len()),
        None => println!("Draw after {} moves", moves.len()),
    }
    println!("Nodes expanded: {nodes_expanded}");

    if let Some(path) = &args.export {
        #[derive(Serialize)]
        struct DuelExport<'a> {
            width: usize,
            height: usize,
            win_length: usize,
            depth: usize,
            moves: &'a [usize],
            winner: Option<&'a str>,
            nodes_expanded: u64,
        }

        export_json(
            path,
            &DuelExport {
                width: args.width,
                height: args.height,
                win_length: args.win_length,
                depth: args.depth,
                moves: &moves,
                winner,
                nodes_expanded,
            },
        )?;
        println!("\n✓ Game exported to: {}", path.display());
    }

    Ok(())
}

pub fn escape(args: EscapeArgs) -> Result<()> {
    let world = build_arena(&args.arena)?;
    let mut agent = ExpectimaxAgent::new(args.depth)?;
    let mut rng = build_rng(args.seed);

    println!("=== Escape Configuration ===");
    println!("Grid: {}x{}", args.arena.width, args.arena.height);
    println!("Monster: {}", args.arena.monster);
    println!("Depth: {}", args.depth);

    let report = run_episode(world, &mut agent, &mut rng)?;

    println!("\n=== Escape Results ===");
    println!("Outcome: {:?}", report.outcome);
    println!("Steps: {}", report.steps);
    println!("Time left: {}", report.time_left);
    println!("Walls destroyed: {}", report.walls_destroyed);

    if let Some(path) = &args.export {
        export_json(path, &report)?;
        println!("\n✓ Report exported to: {}", path.display());
    }

    Ok(())
}

pub fn train(args: TrainArgs) -> Result<()> {
    let weights = match &args.weights {
        Some(path) if path.exists() => WeightVector::load(path)
            .with_context(|| format!("failed to load weights from {}", path.display()))?,
        _ => WeightVector::defaults(),
    };

    let mut agent = TdAgent::new(weights, args.epsilon);
    if let Some(seed) = args.seed {
        agent = agent.with_seed(seed);
    }
    if let Some(path) = &args.weights {
        agent = agent.with_snapshot(path);
    }
    let mut rng = build_rng(args.seed.map(|s| s.wrapping_add(1)));

    println!("=== Training Configuration ===");
    println!("Episodes: {}", args.episodes);
    println!("Epsilon: {}", args.epsilon);
    println!("Monster: {}", args.arena.monster);
    if let Some(seed) = args.seed {
        println!("Seed: {seed}");
    }

    let progress = ProgressBar::new(args.episodes as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
            .expect("Invalid progress bar template")
            .progress_chars("=>-"),
    );

    let mut escapes = 0usize;
    let mut deaths = 0usize;
    let mut timeouts = 0usize;
    let mut total_steps = 0usize;
    for _ in 0..args.episodes {
        let world = build_arena(&args.arena)?;
        let report = run_episode(world, &mut agent, &mut rng)?;
        total_steps += report.steps;
        match report.outcome {
            EpisodeOutcome::ReachedExit => escapes += 1,
            EpisodeOutcome::Died => deaths += 1,
            EpisodeOutcome::TimedOut => timeouts += 1,
        }
        progress.inc(1);
        progress.set_message(format!("{escapes} escapes"));
    }
    progress.finish();

    let mean_steps = total_steps as f64 / args.episodes.max(1) as f64;

    println!("\n=== Training Results ===");
    println!(
        "Escapes: {escapes} ({:.1}%)",
        100.0 * escapes as f64 / args.episodes.max(1) as f64
    );
    println!("Deaths: {deaths}");
    println!("Timeouts: {timeouts}");
    println!("Mean steps: {mean_steps:.1}");
    println!("Weights: {:?}", agent.weights().values());

    if let Some(path) = &args.weights {
        agent.weights().save(path)?;
        println!("✓ Weights saved to: {}", path.display());
    }

    if let Some(path) = &args.export {
        #[derive(Serialize)]
        struct TrainExport<'a> {
            episodes: usize,
            epsilon: f64,
            escapes: usize,
            deaths: usize,
            timeouts: usize,
            mean_steps: f64,
            weights: &'a [f64],
        }

        export_json(
            path,
            &TrainExport {
                episodes: args.episodes,
                epsilon: args.epsilon,
                escapes,
                deaths,
                timeouts,
                mean_steps,
                weights: agent.weights().values(),
            },
        )?;
        println!("✓ Summary exported to: {}", path.display());
    }

    Ok(())
}

fn parse_monster(value: &str) -> Result<Option<MonsterPolicy>> {
    match value.to_lowercase().as_str() {
        "wander" => Ok(Some(MonsterPolicy::Wander)),
        "pursuit" => Ok(Some(MonsterPolicy::Pursuit)),
        "none" => Ok(None),
        other => Err(anyhow::anyhow!(
            "Unknown monster policy: '{other}'. Supported: wander, pursuit, none"
        )),
    }
}

/// Standard scenario: character in the top-left corner, exit in the
/// bottom-right, optionally a monster in the middle and a wall line with a
/// gap under the exit column.
fn build_arena(args: &ArenaArgs) -> Result<GridWorld> {
    let policy = parse_monster(&args.monster)?;
    let (width, height) = (args.width as i32, args.height as i32);
    let mut world = GridWorld::new(args.width, args.height, args.time_budget);
    world.set_tile(width - 1, height - 1, Tile::Exit)?;
    if args.walled {
        let row = height / 2;
        for x in 0..width - 1 {
            world.set_tile(x, row, Tile::Wall)?;
        }
    }
    world.place_character(0, 0)?;
    if let Some(policy) = policy {
        let (mx, mut my) = (width / 2, height / 2);
        if world.wall_at(mx, my) {
            my += 1;
        }
        world.place_monster(mx, my, policy)?;
    }
    Ok(world)
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

fn export_json<T: Serialize>(path: &PathBuf, value: &T) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, value)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
