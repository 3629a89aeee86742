//! Constants for board geometry, evaluation weights, and search parameters.
//!
//! The board is a fixed 5x5 rhombus of hexagonal cells addressed by
//! `(col, row)` with both coordinates in `1..=5`. Cells are stored in a flat
//! array in row-major order, see [`crate::board::Cell::index`].

// =============================================================================
// Board Geometry
// =============================================================================

/// Board side length.
pub const N: u8 = 5;

/// Number of addressable cells.
pub const CELL_COUNT: usize = (N as usize) * (N as usize);

/// Pieces each player starts with in reserve.
pub const RESERVE_SIZE: u8 = 6;

/// Total pieces in the game (both reserves plus everything on the board).
pub const TOTAL_PIECES: usize = 2 * RESERVE_SIZE as usize;

/// Ply cap for drivers. The rules have no draw, so self-play needs a stop.
pub const MAX_GAME_LEN: usize = 200;

// =============================================================================
// Directions
// =============================================================================

/// The six neighbour offsets `(dcol, drow)` on the hex grid.
/// Order: up, down, right, left, and the two ends of the diagonal axis.
pub const DIRECTIONS: [(i8, i8); 6] = [(0, 1), (0, -1), (1, 0), (-1, 0), (1, -1), (-1, 1)];

/// One direction per line axis; the opposite end is walked by negation.
pub const AXES: [(i8, i8); 3] = [(0, 1), (1, 0), (1, -1)];

/// Line length that wins, but only when made by a move.
pub const WIN_LENGTH: usize = 4;

/// Line length that loses for its owner, whenever it appears.
pub const LOSE_LENGTH: usize = 5;

// =============================================================================
// Evaluation
// =============================================================================

/// Score for a position where the perspective player has five in a row.
pub const LOSE_SCORE: i32 = 10_000;

/// Score for a move-made four in a row. Smaller than [`LOSE_SCORE`] so
/// forced losses always weigh more than a missed win.
pub const WIN_SCORE: i32 = 9_000;

/// Per-piece bonus for lying on a run of exactly three.
pub const ALIGN_THREE: i32 = 5;

/// Per-piece bonus for lying on a run of exactly two.
pub const ALIGN_TWO: i32 = 2;

/// Multiplier applied to own alignment.
pub const OWN_ALIGN_WEIGHT: i32 = 10;

/// Multiplier applied to opponent alignment (heavier than own).
pub const OPP_ALIGN_WEIGHT: i32 = 15;

/// Flat penalty per opponent piece sitting on a run of three or more.
pub const THREAT_PENALTY: i32 = 1_000;

/// Multiplier for the difference in legal play counts.
pub const MOBILITY_WEIGHT: i32 = 5;

// =============================================================================
// Minimax Parameters
// =============================================================================

/// Default search depth in plies.
pub const DEFAULT_DEPTH: u32 = 4;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Default number of MCTS iterations per move.
pub const N_ITERATIONS: usize = 1000;

/// Default maximum rollout length in plies.
pub const ROLLOUT_DEPTH: usize = 20;

/// UCT exploration constant.
pub const UCT_C: f64 = 1.414;

/// Probability that a rollout step takes the best-evaluated play instead
/// of a uniformly random one.
pub const ROLLOUT_EPSILON: f64 = 0.2;

/// Evaluation scores are squashed with `tanh(score / REWARD_SCALE)` before
/// they are accumulated in the tree.
pub const REWARD_SCALE: f64 = 1_000.0;

/// Default seed for the search RNG.
pub const DEFAULT_SEED: u64 = 0x5eed_1e55;
