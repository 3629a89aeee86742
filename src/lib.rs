//! Yonmoque-Hex: rules engine and game-tree search.
//!
//! Two players place reserve pieces on a 25-cell board of colored hexes or
//! slide their pieces along runs of matching color, flipping bracketed
//! opponent pieces. Four in a row made by a move wins; five in a row of
//! your own color loses, at any time.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, evaluation weights, and search defaults
//! - [`board`] - Cells, color categories, and owners
//! - [`state`] - Game state, move generation, captures, and game end
//! - [`eval`] - Heuristic position evaluation
//! - [`minimax`] - Alpha-beta minimax search
//! - [`mcts`] - Monte Carlo Tree Search with UCT
//! - [`playout`] - Biased rollouts for MCTS
//! - [`config`] - Runtime engine configuration
//! - [`error`] - Search errors
//! - [`protocol`] - Text protocol driver
//!
//! ## Example
//!
//! ```
//! use yonmoque_hex::board::{Cell, Color};
//! use yonmoque_hex::minimax::minimax_search;
//! use yonmoque_hex::state::{GameState, Play};
//!
//! // Black opens in the centre
//! let center: Cell = "C3".parse().unwrap();
//! let state = GameState::new().play(Play::Place(center)).unwrap();
//!
//! // White answers with a shallow search
//! let reply = minimax_search(&state, 2, Color::White).unwrap();
//! let state = state.play(reply).unwrap();
//! assert_eq!(state.pieces().len(), 2);
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod error;
pub mod eval;
pub mod mcts;
pub mod minimax;
pub mod playout;
pub mod protocol;
pub mod state;

pub use error::SearchError;
