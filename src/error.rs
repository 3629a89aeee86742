//! Errors shared by the search entry points.

use thiserror::Error;

/// Why a search could not produce a play.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The position already has a result; there is nothing to search.
    #[error("game is over")]
    GameOver,
    /// The side to move has nothing to play.
    #[error("no legal moves")]
    NoLegalMoves,
}
