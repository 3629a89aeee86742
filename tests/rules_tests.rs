//! Integration tests for the Yonmoque-Hex rules engine.
//!
//! Positions are built either by playing from the empty board or with
//! `GameState::from_parts`, which plays the role of a "set position"
//! command.

use std::collections::HashSet;

use yonmoque_hex::board::{Category, Cell, Color};
use yonmoque_hex::constants::TOTAL_PIECES;
use yonmoque_hex::state::{EndReason, GameState, Play, PlayError, SetupError};

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

fn c(s: &str) -> Cell {
    s.parse().unwrap()
}

fn cells(names: &[&str]) -> Vec<Cell> {
    names.iter().map(|s| c(s)).collect()
}

/// Set up a position from lists of Black and White cells.
fn setpos(black: &[&str], white: &[&str], reserve: (u8, u8), to_move: Color) -> GameState {
    let mut pieces: Vec<(Cell, Color)> = black.iter().map(|s| (c(s), Color::Black)).collect();
    pieces.extend(white.iter().map(|s| (c(s), Color::White)));
    GameState::from_parts(&pieces, reserve.0, reserve.1, to_move).unwrap()
}

fn mv(from: &str, to: &str) -> Play {
    Play::Move {
        from: c(from),
        to: c(to),
    }
}

/// Pieces plus reserves always add up, and no two pieces share a cell.
fn assert_consistent(state: &GameState) {
    let reserves = state.reserve(Color::Black) as usize + state.reserve(Color::White) as usize;
    assert_eq!(state.pieces().len() + reserves, TOTAL_PIECES);

    let occupied: HashSet<Cell> = state.pieces().iter().map(|p| p.cell).collect();
    assert_eq!(occupied.len(), state.pieces().len());
    for p in state.pieces() {
        assert_eq!(state.piece_at(p.cell), Some(p.owner));
    }
    let grid_count = Cell::all().filter(|&cell| state.is_occupied(cell)).count();
    assert_eq!(grid_count, state.pieces().len());
}

// =============================================================================
// Board
// =============================================================================

#[test]
fn test_board_categories() {
    assert_eq!(c("A1").category(), Category::Neutral);
    assert_eq!(c("E5").category(), Category::Neutral);
    assert_eq!(c("C3").category(), Category::Neutral);
    assert_eq!(c("B1").category(), Category::Dark);
    assert_eq!(c("A3").category(), Category::Dark);
    assert_eq!(c("B2").category(), Category::Light);
    assert_eq!(c("D4").category(), Category::Light);
}

#[test]
fn test_cell_coordinates_are_one_based() {
    let a2 = c("A2");
    assert_eq!((a2.col(), a2.row()), (1, 2));
    assert!(Cell::new(0, 1).is_none());
    assert!(Cell::new(6, 1).is_none());
    assert!("F1".parse::<Cell>().is_err());
}

// =============================================================================
// Placement
// =============================================================================

#[test]
fn test_place_at_centre() {
    let state = GameState::new().play(Play::Place(c("C3"))).unwrap();
    assert_eq!(state.piece_at(c("C3")), Some(Color::Black));
    assert_eq!(state.reserve(Color::Black), 5);
    assert_eq!(state.reserve(Color::White), 6);
    assert_eq!(state.current_player(), Color::White);
    assert_eq!(state.pieces().len(), 1);
    assert!(!state.is_game_over(Some(Play::Place(c("C3")))));
}

#[test]
fn test_place_never_captures() {
    // White drops onto C1 with Black C2 bracketed against White C3.
    let state = setpos(&["C2"], &["C3"], (5, 5), Color::White);
    let next = state.play(Play::Place(c("C1"))).unwrap();
    assert_eq!(next.piece_at(c("C2")), Some(Color::Black));
}

#[test]
fn test_place_errors() {
    let state = GameState::new().play(Play::Place(c("C3"))).unwrap();
    assert_eq!(
        state.play(Play::Place(c("C3"))),
        Err(PlayError::CellOccupied(c("C3")))
    );

    let empty_reserve = setpos(&["B1", "C1", "D1", "B5", "C5", "D5"], &[], (0, 6), Color::Black);
    assert_eq!(
        empty_reserve.play(Play::Place(c("C3"))),
        Err(PlayError::NoReserveRemaining(Color::Black))
    );
    // Without reserves only moves remain.
    assert!(empty_reserve.valid_plays().iter().all(|p| p.is_move()));
}

// =============================================================================
// Movement
// =============================================================================

#[test]
fn test_movable_places_white_from_centre() {
    let state = setpos(&[], &["C3"], (6, 5), Color::White);
    let places = state.movable_places(c("C3"), Color::White);
    assert_eq!(
        places,
        cells(&["C4", "C5", "C2", "C1", "D3", "E3", "B3", "A3", "D2", "E1", "B4", "A5"])
    );
}

#[test]
fn test_movable_places_black_from_centre() {
    let state = setpos(&["C3"], &[], (5, 6), Color::Black);
    let places = state.movable_places(c("C3"), Color::Black);
    assert_eq!(places, cells(&["C4", "C2", "D3", "B3", "D2", "B4"]));
}

#[test]
fn test_movable_places_black_along_edge() {
    let state = setpos(&["A2"], &[], (5, 6), Color::Black);
    let places = state.movable_places(c("A2"), Color::Black);
    assert_eq!(places, cells(&["A3", "A4", "A5", "A1", "B2", "B1"]));
}

#[test]
fn test_movable_places_blocked_by_pieces() {
    // White C4 and C2 block the column; Black's own D3 blocks the row.
    let state = setpos(&["C3", "D3"], &["C4", "C2"], (4, 4), Color::Black);
    let places = state.movable_places(c("C3"), Color::Black);
    assert_eq!(places, cells(&["B3", "D2", "B4"]));
}

#[test]
fn test_valid_plays_order() {
    let state = setpos(&["C3"], &["A1"], (5, 5), Color::Black);
    let plays = state.valid_plays();
    let moves = plays.iter().take_while(|p| p.is_move()).count();
    assert_eq!(moves, 6);
    assert_eq!(plays.len(), 6 + 23);
    assert_eq!(plays[0], mv("C3", "C4"));
    // placements follow in row-major order, skipping occupied cells
    assert_eq!(plays[6], Play::Place(c("B1")));
    assert_eq!(state.count_plays(Color::Black), plays.len());
}

#[test]
fn test_move_errors() {
    let state = GameState::new().play(Play::Place(c("C3"))).unwrap();

    // White may not move Black's piece.
    assert_eq!(state.play(mv("C3", "C4")), Err(PlayError::NotYourPiece(c("C3"))));
    assert_eq!(state.play(mv("A1", "A2")), Err(PlayError::NoPieceAtSource(c("A1"))));

    // C4 stops Black's slide, so C5 is out of reach.
    let black = state.pass_turn();
    assert_eq!(
        black.play(mv("C3", "C5")),
        Err(PlayError::IllegalDestination {
            from: c("C3"),
            to: c("C5"),
        })
    );
    assert!(black.play(mv("C3", "C4")).is_ok());
}

#[test]
fn test_move_keeps_reserves_and_turn_order() {
    let state = setpos(&["C3"], &["A1"], (5, 5), Color::Black);
    let next = state.play(mv("C3", "D3")).unwrap();
    assert_eq!(next.piece_at(c("C3")), None);
    assert_eq!(next.piece_at(c("D3")), Some(Color::Black));
    assert_eq!(next.reserve(Color::Black), 5);
    assert_eq!(next.current_player(), Color::White);
}

// =============================================================================
// Captures
// =============================================================================

#[test]
fn test_capture_flips_bracketed_run_and_wins() {
    let state = setpos(&["C1", "D4"], &["C2", "C3"], (4, 4), Color::Black);
    let play = mv("D4", "C4");
    let next = state.play(play).unwrap();

    for name in ["C1", "C2", "C3", "C4"] {
        assert_eq!(next.piece_at(c(name)), Some(Color::Black), "{name}");
    }
    assert_consistent(&next);

    // The flips complete a column of four made by a move.
    assert_eq!(next.check_win(Some(play)), Some(Color::Black));
    let outcome = next.outcome(Some(play)).unwrap();
    assert_eq!(outcome.winner, Color::Black);
    assert_eq!(outcome.reason, EndReason::FourInARow);
}

#[test]
fn test_capture_in_two_directions() {
    // From C4, White C3 is bracketed by C2 and White B4 by A4.
    let state = setpos(&["D4", "C2", "A4"], &["C3", "B4"], (3, 4), Color::Black);
    let next = state.play(mv("D4", "C4")).unwrap();
    assert_eq!(next.piece_at(c("C3")), Some(Color::Black));
    assert_eq!(next.piece_at(c("B4")), Some(Color::Black));
    assert!(next.pieces().iter().all(|p| p.owner == Color::Black));
    assert_consistent(&next);
}

#[test]
fn test_no_flip_when_run_ends_on_empty() {
    let state = setpos(&["D4"], &["C2", "C3"], (5, 4), Color::Black);
    let next = state.play(mv("D4", "C4")).unwrap();
    assert_eq!(next.piece_at(c("C3")), Some(Color::White));
    assert_eq!(next.piece_at(c("C2")), Some(Color::White));
}

#[test]
fn test_no_flip_at_board_edge() {
    // The White run C2-C1 runs off the board without a Black anchor.
    let state = setpos(&["D4"], &["C1", "C2", "C3"], (5, 3), Color::Black);
    let next = state.play(mv("D4", "C4")).unwrap();
    assert!(["C1", "C2", "C3"]
        .iter()
        .all(|s| next.piece_at(c(s)) == Some(Color::White)));
}

// =============================================================================
// Game end
// =============================================================================

#[test]
fn test_standing_four_does_not_win_after_placement() {
    let state = setpos(&["B1", "C1", "D1", "E1"], &[], (2, 6), Color::White);
    assert_eq!(state.check_win(Some(Play::Place(c("E1")))), None);
    assert_eq!(state.check_win(None), None);
    assert!(!state.is_game_over(Some(Play::Place(c("E1")))));
}

#[test]
fn test_four_made_by_move_wins() {
    let state = setpos(&["B1", "C1", "D1", "E2"], &[], (2, 6), Color::Black);
    let play = mv("E2", "E1");
    let next = state.play(play).unwrap();
    assert_eq!(next.check_win(Some(play)), Some(Color::Black));
    // Only lines through the destination count.
    assert_eq!(next.check_win(Some(Play::Place(c("E1")))), None);
    assert_eq!(next.check_win(Some(mv("B2", "A3"))), None);
}

#[test]
fn test_five_loses_even_on_placement() {
    let state = setpos(&["A3", "B3", "D3", "E3"], &[], (2, 6), Color::Black);
    let play = Play::Place(c("C3"));
    let next = state.play(play).unwrap();
    assert_eq!(next.check_lose(), Some(Color::Black));
    let outcome = next.outcome(Some(play)).unwrap();
    assert_eq!(outcome.winner, Color::White);
    assert_eq!(outcome.reason, EndReason::FiveInARow);
}

#[test]
fn test_lose_overrides_win() {
    let state = setpos(
        &["A3", "B3", "D3", "E3", "C1", "C2", "C4", "D2"],
        &[],
        (0, 4),
        Color::Black,
    );
    let play = mv("D2", "C3");
    let next = state.play(play).unwrap();

    // Row 3 is a five and column C is a four, both Black.
    assert_eq!(next.check_win(Some(play)), Some(Color::Black));
    assert_eq!(next.check_lose(), Some(Color::Black));
    let outcome = next.outcome(Some(play)).unwrap();
    assert_eq!(outcome.winner, Color::White);
    assert_eq!(outcome.reason, EndReason::FiveInARow);
}

// =============================================================================
// Setup
// =============================================================================

#[test]
fn test_from_parts_errors() {
    let dup = [(c("C3"), Color::Black), (c("C3"), Color::White)];
    assert_eq!(
        GameState::from_parts(&dup, 5, 5, Color::Black),
        Err(SetupError::DuplicateCell(c("C3")))
    );
    assert_eq!(
        GameState::from_parts(&[], 6, 5, Color::Black),
        Err(SetupError::PieceCountMismatch {
            on_board: 0,
            reserves: 11,
        })
    );
    assert_eq!(
        GameState::from_parts(&[], 7, 5, Color::Black),
        Err(SetupError::ReserveOverflow(Color::Black))
    );
}

// =============================================================================
// Random games
// =============================================================================

#[test]
fn test_random_games_keep_invariants() {
    for seed in 0..20 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut state = GameState::new();
        let mut last = None;
        for _ in 0..80 {
            assert_consistent(&state);
            if state.is_game_over(last) {
                break;
            }
            let plays = state.valid_plays();
            if plays.is_empty() {
                break;
            }
            let play = plays[rng.usize(..plays.len())];
            let mover = state.current_player();
            state = state.play(play).unwrap();
            assert_eq!(state.current_player(), mover.opponent());
            assert_eq!(state.piece_at(play.destination()), Some(mover));
            last = Some(play);
        }
    }
}

#[test]
fn test_play_does_not_mutate_input() {
    let state = setpos(&["C1", "D4"], &["C2", "C3"], (4, 4), Color::Black);
    let before = state.clone();
    let _ = state.play(mv("D4", "C4")).unwrap();
    assert_eq!(state, before);
}
