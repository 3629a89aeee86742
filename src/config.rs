//! Runtime engine configuration.
//!
//! Defaults come from [`crate::constants`]; drivers override fields from
//! their own options.

use std::fmt;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_DEPTH, DEFAULT_SEED, N_ITERATIONS, ROLLOUT_DEPTH, ROLLOUT_EPSILON, UCT_C,
};
use crate::mcts::MctsParams;

/// Which search picks the AI's plays.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    Minimax,
    Mcts,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Minimax => write!(f, "minimax"),
            Strategy::Mcts => write!(f, "mcts"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimax" | "alphabeta" => Ok(Strategy::Minimax),
            "mcts" | "montecarlo" => Ok(Strategy::Mcts),
            other => Err(format!("unknown strategy: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub strategy: Strategy,
    /// Minimax depth in plies.
    pub depth: u32,
    /// MCTS iterations per play.
    pub iterations: usize,
    /// MCTS rollout length cap.
    pub rollout_depth: usize,
    /// UCT exploration constant.
    pub exploration: f64,
    /// Greedy probability in rollouts.
    pub epsilon: f64,
    pub seed: u64,
    /// Keep the MCTS tree between plays.
    pub reuse_tree: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Minimax,
            depth: DEFAULT_DEPTH,
            iterations: N_ITERATIONS,
            rollout_depth: ROLLOUT_DEPTH,
            exploration: UCT_C,
            epsilon: ROLLOUT_EPSILON,
            seed: DEFAULT_SEED,
            reuse_tree: true,
        }
    }
}

impl EngineConfig {
    pub fn mcts_params(&self) -> MctsParams {
        MctsParams {
            iterations: self.iterations,
            rollout_depth: self.rollout_depth,
            exploration: self.exploration,
            epsilon: self.epsilon,
        }
    }
}
