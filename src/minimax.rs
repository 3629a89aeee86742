//! Depth-bounded minimax search with alpha-beta pruning.
//!
//! The search never mutates the state it is given: each child is produced
//! with [`GameState::play`], which returns a new value. Leaves are scored
//! with [`evaluate_board`] from the AI's point of view, so the AI's plies
//! maximise and the opponent's plies minimise.
//!
//! Children are visited in [`GameState::valid_plays`] order and only a
//! strictly better value replaces the incumbent, so the chosen play is
//! fully deterministic.

use log::{debug, trace};

use crate::board::Color;
use crate::error::SearchError;
use crate::eval::evaluate_board;
use crate::state::{GameState, Play};

/// Window bound used for an open search.
pub const INF: i32 = i32::MAX;

/// Node and cutoff counters for one search.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub cutoffs: u64,
}

/// Alpha-beta minimax.
///
/// Returns the best value and the play achieving it. The play is `None`
/// when `state` is a leaf: `depth` is zero, the game is over given
/// `last_play`, or the side to move has no plays.
#[allow(clippy::too_many_arguments)]
pub fn alpha_beta(
    state: &GameState,
    depth: u32,
    alpha: i32,
    beta: i32,
    maximizing: bool,
    last_play: Option<Play>,
    ai_color: Color,
    stats: &mut SearchStats,
) -> (i32, Option<Play>) {
    search(state, depth, alpha, beta, maximizing, last_play, ai_color, true, stats)
}

/// Plain minimax over the full tree, without pruning.
///
/// Always returns the same value as [`alpha_beta`] with an open window.
pub fn minimax_exhaustive(
    state: &GameState,
    depth: u32,
    maximizing: bool,
    last_play: Option<Play>,
    ai_color: Color,
    stats: &mut SearchStats,
) -> (i32, Option<Play>) {
    search(state, depth, -INF, INF, maximizing, last_play, ai_color, false, stats)
}

#[allow(clippy::too_many_arguments)]
fn search(
    state: &GameState,
    depth: u32,
    mut alpha: i32,
    mut beta: i32,
    maximizing: bool,
    last_play: Option<Play>,
    ai_color: Color,
    prune: bool,
    stats: &mut SearchStats,
) -> (i32, Option<Play>) {
    stats.nodes += 1;

    if depth == 0 || state.is_game_over(last_play) {
        return (evaluate_board(state, last_play, ai_color), None);
    }

    let plays = state.valid_plays();
    if plays.is_empty() {
        return (evaluate_board(state, last_play, ai_color), None);
    }

    let mut best_move = None;
    let mut best_value = if maximizing { -INF } else { INF };

    for play in plays {
        let Ok(child) = state.play(play) else {
            continue;
        };
        let (value, _) = search(
            &child,
            depth - 1,
            alpha,
            beta,
            !maximizing,
            Some(play),
            ai_color,
            prune,
            stats,
        );

        if maximizing {
            if value > best_value || best_move.is_none() {
                best_value = value;
                best_move = Some(play);
            }
            alpha = alpha.max(best_value);
        } else {
            if value < best_value || best_move.is_none() {
                best_value = value;
                best_move = Some(play);
            }
            beta = beta.min(best_value);
        }

        if prune && beta <= alpha {
            stats.cutoffs += 1;
            break;
        }
    }

    (best_value, best_move)
}

/// Pick a play for `ai_color` with a `depth`-ply search.
///
/// `state` must have `ai_color` to move. A depth of zero is treated as one.
/// A position with a five on the board has no play to search.
pub fn minimax_search(state: &GameState, depth: u32, ai_color: Color) -> Result<Play, SearchError> {
    if state.check_lose().is_some() {
        return Err(SearchError::GameOver);
    }
    let depth = depth.max(1);
    let maximizing = state.current_player() == ai_color;
    let mut stats = SearchStats::default();

    let plays = state.valid_plays();
    if plays.is_empty() {
        return Err(SearchError::NoLegalMoves);
    }

    let (value, best) = root_search(state, &plays, depth, maximizing, ai_color, &mut stats);
    debug!(
        "minimax depth {depth}: best {} value {value} ({} nodes, {} cutoffs)",
        best.map(|p| p.to_string()).unwrap_or_default(),
        stats.nodes,
        stats.cutoffs
    );
    best.ok_or(SearchError::NoLegalMoves)
}

/// Root layer of [`minimax_search`]. The caller has already ruled out a
/// finished position, so every root play is searched.
fn root_search(
    state: &GameState,
    plays: &[Play],
    depth: u32,
    maximizing: bool,
    ai_color: Color,
    stats: &mut SearchStats,
) -> (i32, Option<Play>) {
    let mut alpha = -INF;
    let mut beta = INF;
    let mut best_move = None;
    let mut best_value = if maximizing { -INF } else { INF };

    for &play in plays {
        let Ok(child) = state.play(play) else {
            continue;
        };
        let (value, _) = alpha_beta(
            &child,
            depth - 1,
            alpha,
            beta,
            !maximizing,
            Some(play),
            ai_color,
            stats,
        );
        trace!("root {play}: {value}");

        let better = if maximizing { value > best_value } else { value < best_value };
        if better || best_move.is_none() {
            best_value = value;
            best_move = Some(play);
        }
        if maximizing {
            alpha = alpha.max(best_value);
        } else {
            beta = beta.min(best_value);
        }
    }

    (best_value, best_move)
}

/// [`minimax_search`] with the root plays searched in parallel.
///
/// Each root child gets its own open window, so there is less pruning than
/// in the sequential search, but the value and the chosen play are the same.
#[cfg(feature = "parallel")]
pub fn minimax_search_par(
    state: &GameState,
    depth: u32,
    ai_color: Color,
) -> Result<Play, SearchError> {
    use rayon::prelude::*;

    if state.check_lose().is_some() {
        return Err(SearchError::GameOver);
    }
    let depth = depth.max(1);
    let maximizing = state.current_player() == ai_color;

    let plays = state.valid_plays();
    let scored: Vec<(i32, Play, SearchStats)> = plays
        .par_iter()
        .filter_map(|&play| {
            let child = state.play(play).ok()?;
            let mut stats = SearchStats::default();
            let (value, _) = alpha_beta(
                &child,
                depth - 1,
                -INF,
                INF,
                !maximizing,
                Some(play),
                ai_color,
                &mut stats,
            );
            Some((value, play, stats))
        })
        .collect();

    let mut best: Option<(i32, Play)> = None;
    let mut nodes = 0;
    for &(value, play, stats) in &scored {
        nodes += stats.nodes;
        let better = match best {
            None => true,
            Some((v, _)) if maximizing => value > v,
            Some((v, _)) => value < v,
        };
        if better {
            best = Some((value, play));
        }
    }
    debug!("parallel minimax depth {depth}: {} root plays, {nodes} nodes", scored.len());
    best.map(|(_, play)| play).ok_or(SearchError::NoLegalMoves)
}
