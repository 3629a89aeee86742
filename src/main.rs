//! Yonmoque-Hex engine command line.
//!
//! ## Usage
//!
//! - `yonmoque-hex` - Show a demo
//! - `yonmoque-hex protocol` - Start the text protocol on stdin/stdout
//! - `yonmoque-hex selfplay --black minimax --white mcts` - Let two AIs play
//! - `yonmoque-hex demo` - Run the demo

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use flexi_logger::Logger;
use log::info;

use yonmoque_hex::board::Cell;
use yonmoque_hex::config::{EngineConfig, Strategy};
use yonmoque_hex::constants::{
    DEFAULT_DEPTH, DEFAULT_SEED, MAX_GAME_LEN, N_ITERATIONS, ROLLOUT_DEPTH,
};
use yonmoque_hex::mcts::{Mcts, mcts_search};
use yonmoque_hex::minimax::minimax_search;
use yonmoque_hex::protocol::ProtocolEngine;
use yonmoque_hex::state::{GameState, Play};

/// Yonmoque-Hex: rules engine with minimax and MCTS players
#[derive(Parser)]
#[command(name = "yonmoque-hex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the text protocol server for use with a front end
    Protocol(SearchArgs),
    /// Play a full game between two engines
    Selfplay {
        /// Engine for Black
        #[arg(long, value_enum, default_value_t = Ai::Minimax)]
        black: Ai,
        /// Engine for White
        #[arg(long, value_enum, default_value_t = Ai::Mcts)]
        white: Ai,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Run a simple demo of the engine
    Demo,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Ai {
    Minimax,
    Mcts,
}

impl From<Ai> for Strategy {
    fn from(ai: Ai) -> Self {
        match ai {
            Ai::Minimax => Strategy::Minimax,
            Ai::Mcts => Strategy::Mcts,
        }
    }
}

#[derive(Args)]
struct SearchArgs {
    /// Default engine for `genmove`
    #[arg(long, value_enum, default_value_t = Ai::Minimax)]
    ai: Ai,
    /// Minimax depth in plies
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    depth: u32,
    /// MCTS iterations per play
    #[arg(long, default_value_t = N_ITERATIONS)]
    iterations: usize,
    /// MCTS rollout length
    #[arg(long, default_value_t = ROLLOUT_DEPTH)]
    rollout_depth: usize,
    /// Seed for the MCTS random number generator
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Rebuild the MCTS tree from scratch on every play
    #[arg(long)]
    fresh_tree: bool,
}

impl SearchArgs {
    fn config(&self) -> EngineConfig {
        EngineConfig {
            strategy: self.ai.into(),
            depth: self.depth,
            iterations: self.iterations,
            rollout_depth: self.rollout_depth,
            seed: self.seed,
            reuse_tree: !self.fresh_tree,
            ..EngineConfig::default()
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    Logger::try_with_env_or_str(&cli.log_level)
        .context("invalid log specification")?
        .log_to_stderr()
        .start()
        .context("failed to start logger")?;

    match cli.command {
        Some(Commands::Protocol(search)) => {
            let mut engine = ProtocolEngine::with_config(search.config());
            engine.run().context("protocol I/O failed")?;
        }
        Some(Commands::Selfplay { black, white, search }) => {
            run_selfplay(black.into(), white.into(), &search.config())?;
        }
        Some(Commands::Demo) | None => run_demo()?,
    }
    Ok(())
}

/// One AI seat in self-play.
struct Seat {
    strategy: Strategy,
    mcts: Mcts,
}

fn run_selfplay(black: Strategy, white: Strategy, config: &EngineConfig) -> Result<()> {
    let seat = |strategy, seed| Seat {
        strategy,
        mcts: Mcts::new(config.mcts_params(), seed, config.reuse_tree),
    };
    let mut seats = [seat(black, config.seed), seat(white, config.seed.wrapping_add(1))];

    let mut state = GameState::new();
    let mut last_play: Option<Play> = None;

    for ply in 0..MAX_GAME_LEN {
        if let Some(outcome) = state.outcome(last_play) {
            println!("{state}");
            println!("{} wins after {ply} plies ({:?})", outcome.winner, outcome.reason);
            return Ok(());
        }

        let ai = state.current_player();
        let seat = &mut seats[ai.index()];
        let play = match seat.strategy {
            Strategy::Minimax => minimax_search(&state, config.depth, ai),
            Strategy::Mcts => seat.mcts.search(&state, last_play, ai),
        }
        .with_context(|| format!("{ai} has no play at ply {ply}"))?;

        info!("ply {ply}: {ai} ({}) plays {play}", seat.strategy);
        state = state
            .play(play)
            .with_context(|| format!("engine produced an illegal play {play}"))?;
        last_play = Some(play);
        for seat in &mut seats {
            seat.mcts.advance(play);
        }
    }

    println!("{state}");
    println!("no result after {MAX_GAME_LEN} plies");
    Ok(())
}

fn run_demo() -> Result<()> {
    println!("Yonmoque-Hex: rules engine and search demo\n");

    let cell = |s: &str| s.parse::<Cell>().context("bad demo coordinate");

    // Placement
    println!("=== Placement ===");
    let state = GameState::new().play(Play::Place(cell("C3")?))?;
    let state = state.play(Play::Place(cell("C4")?))?;
    println!("{state}");

    // Sliding: Black travels over dark cells, White over light ones
    println!("=== Sliding ===");
    for from in ["C3", "C4"] {
        let from = cell(from)?;
        let owner = state.piece_at(from).context("demo piece missing")?;
        let places: Vec<String> =
            state.movable_places(from, owner).iter().map(|c| c.to_string()).collect();
        println!("{owner} on {from} can reach: {}", places.join(" "));
    }

    // Capture: Black brackets White C4 between C3 and C5
    println!("\n=== Capture ===");
    let state = state.play(Play::Place(cell("A5")?))?;
    let state = state.play(Play::Place(cell("E1")?))?;
    let capture = Play::Move { from: cell("A5")?, to: cell("C5")? };
    let state = state.play(capture)?;
    println!("Black plays {capture}");
    println!("{state}");

    // Search
    println!("=== Search ===");
    let ai = state.current_player();
    let mm = minimax_search(&state, 2, ai)?;
    println!("minimax (depth 2) suggests {mm} for {ai}");
    let mc = mcts_search(&state, 200, 8, ai, DEFAULT_SEED)?;
    println!("mcts (200 iterations) suggests {mc} for {ai}");
    println!("evaluation for {ai}: {}", state.evaluate(None, ai));
    Ok(())
}
