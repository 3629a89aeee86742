//! Static position evaluation shared by minimax and MCTS rollouts.
//!
//! Terminal positions score with fixed sentinels. Everything else is a
//! weighted sum of line building, blocking pressure, and mobility:
//!
//! - each piece earns [`ALIGN_THREE`] per axis where it sits on a run of
//!   exactly three and [`ALIGN_TWO`] per axis on a run of exactly two;
//!   own pieces count with [`OWN_ALIGN_WEIGHT`], opponent pieces subtract
//!   with the heavier [`OPP_ALIGN_WEIGHT`]
//! - each opponent piece on a run of three or more costs [`THREAT_PENALTY`],
//!   which steers the search towards blocking
//! - the difference in legal play counts is weighted by [`MOBILITY_WEIGHT`]

use crate::board::{Cell, Color};
use crate::constants::{
    ALIGN_THREE, ALIGN_TWO, AXES, LOSE_SCORE, MOBILITY_WEIGHT, OPP_ALIGN_WEIGHT,
    OWN_ALIGN_WEIGHT, THREAT_PENALTY, WIN_SCORE,
};
use crate::state::{GameState, Play};

/// Score `state` from the point of view of `perspective`.
///
/// A five-in-a-row is scored by whose line it is: `-LOSE_SCORE` when it
/// belongs to `perspective`, `LOSE_SCORE` when it belongs to the
/// opponent. A four made by `last_play` scores `±WIN_SCORE`.
pub fn evaluate_board(state: &GameState, last_play: Option<Play>, perspective: Color) -> i32 {
    let opponent = perspective.opponent();

    if let Some(loser) = state.check_lose() {
        return if loser == perspective { -LOSE_SCORE } else { LOSE_SCORE };
    }
    if let Some(winner) = state.check_win(last_play) {
        return if winner == perspective { WIN_SCORE } else { -WIN_SCORE };
    }

    let mut score = 0;
    for piece in state.pieces() {
        let align = alignment(state, piece.cell);
        if piece.owner == perspective {
            score += align * OWN_ALIGN_WEIGHT;
        } else {
            score -= align * OPP_ALIGN_WEIGHT;
            if longest_line(state, piece.cell) >= 3 {
                score -= THREAT_PENALTY;
            }
        }
    }

    let own_plays = state.count_plays(perspective) as i32;
    let opp_plays = state.count_plays(opponent) as i32;
    score + (own_plays - opp_plays) * MOBILITY_WEIGHT
}

/// Alignment bonus for the piece on `cell`, summed over the three axes.
pub fn alignment(state: &GameState, cell: Cell) -> i32 {
    AXES.iter()
        .map(|&axis| match state.line_length(cell, axis) {
            3 => ALIGN_THREE,
            2 => ALIGN_TWO,
            _ => 0,
        })
        .sum()
}

fn longest_line(state: &GameState, cell: Cell) -> usize {
    AXES.iter()
        .map(|&axis| state.line_length(cell, axis))
        .max()
        .unwrap_or(0)
}

impl GameState {
    /// Shorthand for [`evaluate_board`].
    pub fn evaluate(&self, last_play: Option<Play>, perspective: Color) -> i32 {
        evaluate_board(self, last_play, perspective)
    }
}
