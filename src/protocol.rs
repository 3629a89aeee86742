//! Line-oriented text protocol for driving the engine from another program.
//!
//! The format follows the Go Text Protocol: each line is an optional
//! numeric id, a command, and arguments. Responses start with `=` on
//! success or `?` on failure, echo the id, and end with a blank line.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `clear_board` - Start a new game
//! - `showboard` - Print the board
//! - `play <C3 | C3-D4>` - Play for the side to move
//! - `genmove [minimax|mcts]` - Let the engine play for the side to move
//! - `valid_plays` - List legal plays for the side to move
//! - `movable <cell>` - List destinations of the piece on a cell
//! - `reserve` - Reserve counts for both sides
//! - `evaluate [black|white]` - Static evaluation (default: side to move)
//! - `result` - Winner and reason, or `none`
//!
//! ## Example
//!
//! ```ignore
//! use yonmoque_hex::protocol::ProtocolEngine;
//! let mut engine = ProtocolEngine::new();
//! engine.run()?;
//! ```

use std::io::{self, BufRead, Write};

use log::{info, warn};

use crate::board::{Cell, Color};
use crate::config::{EngineConfig, Strategy};
use crate::eval::evaluate_board;
use crate::mcts::Mcts;
use crate::error::SearchError;
use crate::state::{EndReason, GameState, Play};

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "clear_board",
    "evaluate",
    "genmove",
    "known_command",
    "list_commands",
    "movable",
    "name",
    "play",
    "protocol_version",
    "quit",
    "reserve",
    "result",
    "showboard",
    "valid_plays",
    "version",
];

/// Protocol engine state.
pub struct ProtocolEngine {
    /// Current game state
    state: GameState,
    /// The play that produced `state`
    last_play: Option<Play>,
    config: EngineConfig,
    /// MCTS player (keeps its tree between plays when configured)
    mcts: Mcts,
}

impl Default for ProtocolEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolEngine {
    /// Create a new engine with default settings.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let mcts = Mcts::new(config.mcts_params(), config.seed, config.reuse_tree);
        Self {
            state: GameState::new(),
            last_play: None,
            config,
            mcts,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Run the command loop on stdin and stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run_with<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            if !success {
                warn!("{command}: {message}");
            }
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command id from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, "yonmoque-hex".to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "1".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(name) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&name.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "clear_board" => {
                self.state = GameState::new();
                self.last_play = None;
                self.mcts.reset();
                (true, String::new())
            }

            "showboard" => (true, format!("\n{}", self.state)),

            "play" => {
                if args.is_empty() {
                    return (false, "missing arguments".to_string());
                }
                if self.state.is_game_over(self.last_play) {
                    return (false, "game is over".to_string());
                }
                let play: Play = match args.join(" ").parse() {
                    Ok(play) => play,
                    Err(e) => return (false, e.to_string()),
                };
                match self.apply(play) {
                    Ok(()) => (true, String::new()),
                    Err(message) => (false, message),
                }
            }

            "genmove" => {
                let strategy = match args.first() {
                    Some(name) => match name.parse::<Strategy>() {
                        Ok(s) => s,
                        Err(e) => return (false, e),
                    },
                    None => self.config.strategy,
                };
                if self.state.is_game_over(self.last_play) {
                    return (false, "game is over".to_string());
                }
                let play = match self.generate(strategy) {
                    Ok(play) => play,
                    Err(e) => return (false, e.to_string()),
                };
                match self.apply(play) {
                    Ok(()) => (true, play.to_string()),
                    Err(message) => (false, message),
                }
            }

            "valid_plays" => {
                let plays: Vec<String> =
                    self.state.valid_plays().iter().map(|p| p.to_string()).collect();
                (true, plays.join(" "))
            }

            "movable" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let cell: Cell = match arg.parse() {
                    Ok(cell) => cell,
                    Err(e) => return (false, e.to_string()),
                };
                let Some(owner) = self.state.piece_at(cell) else {
                    return (false, format!("no piece at {cell}"));
                };
                let places: Vec<String> = self
                    .state
                    .movable_places(cell, owner)
                    .iter()
                    .map(|c| c.to_string())
                    .collect();
                (true, places.join(" "))
            }

            "reserve" => (
                true,
                format!(
                    "black {} white {}",
                    self.state.reserve(Color::Black),
                    self.state.reserve(Color::White)
                ),
            ),

            "evaluate" => {
                let perspective = match args.first() {
                    Some(name) => match name.parse::<Color>() {
                        Ok(c) => c,
                        Err(e) => return (false, e.to_string()),
                    },
                    None => self.state.current_player(),
                };
                let score = evaluate_board(&self.state, self.last_play, perspective);
                (true, score.to_string())
            }

            "result" => match self.state.outcome(self.last_play) {
                Some(outcome) => {
                    let reason = match outcome.reason {
                        EndReason::FiveInARow => "five in a row",
                        EndReason::FourInARow => "four in a row",
                    };
                    (true, format!("{} wins ({reason})", outcome.winner))
                }
                None => (true, "none".to_string()),
            },

            _ => (false, format!("unknown command: {command}")),
        }
    }

    /// Ask the configured search for a play for the side to move.
    fn generate(&mut self, strategy: Strategy) -> Result<Play, SearchError> {
        let ai = self.state.current_player();
        let play = match strategy {
            Strategy::Minimax => search_minimax(&self.state, self.config.depth, ai)?,
            Strategy::Mcts => self.mcts.search(&self.state, self.last_play, ai)?,
        };
        info!("{ai} ({strategy}) plays {play}");
        Ok(play)
    }

    fn apply(&mut self, play: Play) -> Result<(), String> {
        let next = self.state.play(play).map_err(|e| e.to_string())?;
        self.state = next;
        self.last_play = Some(play);
        self.mcts.advance(play);
        Ok(())
    }
}

#[cfg(not(feature = "parallel"))]
fn search_minimax(state: &GameState, depth: u32, ai: Color) -> Result<Play, SearchError> {
    crate::minimax::minimax_search(state, depth, ai)
}

#[cfg(feature = "parallel")]
fn search_minimax(state: &GameState, depth: u32, ai: Color) -> Result<Play, SearchError> {
    crate::minimax::minimax_search_par(state, depth, ai)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_engine() -> ProtocolEngine {
        ProtocolEngine::with_config(EngineConfig {
            depth: 1,
            iterations: 30,
            rollout_depth: 4,
            ..EngineConfig::default()
        })
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = ProtocolEngine::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = ProtocolEngine::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_name_command() {
        let mut engine = ProtocolEngine::new();
        let (success, response) = engine.execute("name", &[]);
        assert!(success);
        assert_eq!(response, "yonmoque-hex");
    }

    #[test]
    fn test_known_command() {
        let mut engine = ProtocolEngine::new();

        let (success, response) = engine.execute("known_command", &["genmove"]);
        assert!(success);
        assert_eq!(response, "true");

        let (success, response) = engine.execute("known_command", &["komi"]);
        assert!(success);
        assert_eq!(response, "false");
    }

    #[test]
    fn test_play_and_clear() {
        let mut engine = ProtocolEngine::new();

        let (success, _) = engine.execute("play", &["C3"]);
        assert!(success);
        assert_eq!(engine.state.reserve(Color::Black), 5);
        assert_eq!(engine.state.current_player(), Color::White);

        // occupied
        let (success, response) = engine.execute("play", &["C3"]);
        assert!(!success);
        assert!(response.contains("occupied"), "{response}");

        let (success, _) = engine.execute("clear_board", &[]);
        assert!(success);
        assert_eq!(engine.state, GameState::new());
    }

    #[test]
    fn test_play_rejects_opponent_piece() {
        let mut engine = ProtocolEngine::new();
        assert!(engine.execute("play", &["C3"]).0);
        // White tries to move Black's piece.
        let (success, _) = engine.execute("play", &["C3-C4"]);
        assert!(!success);
    }

    #[test]
    fn test_genmove_both_strategies() {
        let mut engine = quick_engine();
        let (success, response) = engine.execute("genmove", &["minimax"]);
        assert!(success, "{response}");
        assert!(response.parse::<Play>().is_ok());
        assert_eq!(engine.state.current_player(), Color::White);

        let (success, response) = engine.execute("genmove", &["mcts"]);
        assert!(success, "{response}");
        assert_eq!(engine.state.current_player(), Color::Black);
        assert_eq!(engine.state.pieces().len(), 2);
    }

    #[test]
    fn test_run_with_script() {
        let mut engine = quick_engine();
        let script = "1 name\nplay C3\n# comment\n2 reserve\nresult\nquit\nname\n";
        let mut out = Vec::new();
        engine.run_with(script.as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("=1 yonmoque-hex"));
        assert!(text.contains("=2 black 5 white 6"));
        assert!(text.contains("= none"));
        // nothing after quit
        assert_eq!(text.matches("yonmoque-hex").count(), 1);
    }
}
