//! Monte Carlo rollouts (biased game simulation).
//!
//! A rollout plays forward from a position for a bounded number of plies
//! and scores the final position with [`evaluate_board`]. Plays are chosen
//! by [`rollout_policy`], which is mostly random but never misses an
//! immediate win and avoids handing the opponent one:
//!
//! 1. If some play wins on the spot, take it.
//! 2. Otherwise rank the plays: best-evaluated first with probability
//!    `epsilon`, in random order otherwise.
//! 3. Take the first ranked play that neither makes a five for the mover
//!    nor leaves the opponent a winning move. If every play fails that
//!    test, take the first ranked play anyway.
//!
//! The safety test scans the opponent's replies, so it runs lazily in
//! rank order and usually only for the first play.

use std::cmp::Reverse;

use fastrand::Rng;

use crate::board::Color;
use crate::eval::evaluate_board;
use crate::state::{GameState, Play};

/// Choose the next play for the side to move, or `None` if it has none.
pub fn rollout_policy(state: &GameState, epsilon: f64, rng: &mut Rng) -> Option<Play> {
    let me = state.current_player();

    let mut children: Vec<(Play, GameState)> = Vec::new();
    for play in state.valid_plays() {
        let Ok(child) = state.play(play) else {
            continue;
        };
        if child.outcome(Some(play)).is_some_and(|o| o.winner == me) {
            return Some(play);
        }
        children.push((play, child));
    }
    if children.is_empty() {
        return None;
    }

    let mut ranked: Vec<usize> = (0..children.len()).collect();
    if rng.f64() < epsilon {
        let scores: Vec<i32> = children
            .iter()
            .map(|(play, child)| evaluate_board(child, Some(*play), me))
            .collect();
        // stable, so equal scores keep canonical order
        ranked.sort_by_key(|&i| Reverse(scores[i]));
    } else {
        rng.shuffle(&mut ranked);
    }

    let is_safe = |&&i: &&usize| {
        let (play, child) = &children[i];
        // any outcome left here is a self-inflicted five
        child.outcome(Some(*play)).is_none() && !has_winning_move(child)
    };
    let pick = ranked.iter().find(is_safe).or(ranked.first())?;
    Some(children[*pick].0)
}

/// Whether the side to move in `state` has a move that wins immediately.
///
/// Placements never win, so only moves are tried.
pub fn has_winning_move(state: &GameState) -> bool {
    let me = state.current_player();
    state
        .pieces()
        .iter()
        .filter(|p| p.owner == me)
        .any(|p| {
            state.movable_places(p.cell, me).into_iter().any(|to| {
                let play = Play::Move { from: p.cell, to };
                state
                    .play(play)
                    .ok()
                    .and_then(|next| next.outcome(Some(play)))
                    .is_some_and(|outcome| outcome.winner == me)
            })
        })
}

/// Play a rollout of at most `max_depth` plies from `state` and score the
/// final position for `ai_color`.
///
/// `last_play` is the play that produced `state`, needed to detect a win
/// that is already on the board.
pub fn rollout(
    state: &GameState,
    last_play: Option<Play>,
    max_depth: usize,
    ai_color: Color,
    epsilon: f64,
    rng: &mut Rng,
) -> i32 {
    let mut pos = state.clone();
    let mut last = last_play;

    for _ in 0..max_depth {
        if pos.is_game_over(last) {
            break;
        }
        let Some(play) = rollout_policy(&pos, epsilon, rng) else {
            break;
        };
        match pos.play(play) {
            Ok(next) => {
                pos = next;
                last = Some(play);
            }
            Err(_) => break,
        }
    }

    evaluate_board(&pos, last, ai_color)
}
