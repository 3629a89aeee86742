//! Game state, move generation, capture resolution, and terminal detection.
//!
//! A [`GameState`] is a small value: the placed pieces in insertion order,
//! a per-cell occupancy index, the two reserve counts, and the side to move.
//! Every mutator takes `&self` and returns a fresh state, which is what lets
//! the searches explore sibling branches without undo logic. Cloning copies
//! at most twelve pieces and a 25-slot array; the cell topology is a static
//! table and is never copied.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::board::{Cell, Color, ParseError};
use crate::constants::{
    AXES, CELL_COUNT, DIRECTIONS, LOSE_LENGTH, N, RESERVE_SIZE, TOTAL_PIECES, WIN_LENGTH,
};

/// A piece on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub cell: Cell,
    pub owner: Color,
}

/// One turn: drop a reserve piece, or slide a piece already on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Play {
    Place(Cell),
    Move { from: Cell, to: Cell },
}

impl Play {
    /// The cell the acting piece ends up on.
    pub fn destination(self) -> Cell {
        match self {
            Play::Place(cell) => cell,
            Play::Move { to, .. } => to,
        }
    }

    pub fn is_move(self) -> bool {
        matches!(self, Play::Move { .. })
    }
}

impl fmt::Display for Play {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Play::Place(cell) => write!(f, "{cell}"),
            Play::Move { from, to } => write!(f, "{from}-{to}"),
        }
    }
}

impl FromStr for Play {
    type Err = ParseError;

    /// Parse `"C3"` as a placement and `"C3-D4"` (or `"C3 D4"`) as a move.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(|c: char| c == '-' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        let bad = || ParseError::Play(s.to_string());
        match parts.as_slice() {
            [cell] => Ok(Play::Place(cell.parse().map_err(|_| bad())?)),
            [from, to] => Ok(Play::Move {
                from: from.parse().map_err(|_| bad())?,
                to: to.parse().map_err(|_| bad())?,
            }),
            _ => Err(bad()),
        }
    }
}

/// Reasons a play is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error("illegal play: {0} is occupied")]
    CellOccupied(Cell),
    #[error("illegal play: {0} has no pieces left in reserve")]
    NoReserveRemaining(Color),
    #[error("illegal play: no piece at {0}")]
    NoPieceAtSource(Cell),
    #[error("illegal play: piece at {from} cannot reach {to}")]
    IllegalDestination { from: Cell, to: Cell },
    #[error("illegal play: piece at {0} belongs to the other side")]
    NotYourPiece(Cell),
}

/// Reasons [`GameState::from_parts`] rejects a position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("two pieces on {0}")]
    DuplicateCell(Cell),
    #[error("{on_board} pieces on board plus {reserves} in reserve, expected {total}", total = TOTAL_PIECES)]
    PieceCountMismatch { on_board: usize, reserves: usize },
    #[error("{0} reserve exceeds {max}", max = RESERVE_SIZE)]
    ReserveOverflow(Color),
}

/// Why a game ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EndReason {
    /// The loser owns five or more in a row.
    FiveInARow,
    /// The winner made four in a row with a move.
    FourInARow,
}

/// Final result of a game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub winner: Color,
    pub reason: EndReason,
}

/// The aggregate game state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    /// Placed pieces in insertion order.
    pieces: Vec<Piece>,
    /// Occupancy index: owner of the piece on each cell.
    grid: [Option<Color>; CELL_COUNT],
    /// Reserve counts indexed by [`Color::index`].
    reserve: [u8; 2],
    current: Color,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Empty board, full reserves, Black to move.
    pub fn new() -> Self {
        GameState {
            pieces: Vec::with_capacity(TOTAL_PIECES),
            grid: [None; CELL_COUNT],
            reserve: [RESERVE_SIZE; 2],
            current: Color::Black,
        }
    }

    /// Build an arbitrary position.
    ///
    /// Piece order is kept as given. Fails if a cell is listed twice, a
    /// reserve is larger than the starting reserve, or pieces and reserves
    /// do not add up to the full piece count.
    pub fn from_parts(
        pieces: &[(Cell, Color)],
        reserve_black: u8,
        reserve_white: u8,
        current: Color,
    ) -> Result<Self, SetupError> {
        if reserve_black > RESERVE_SIZE {
            return Err(SetupError::ReserveOverflow(Color::Black));
        }
        if reserve_white > RESERVE_SIZE {
            return Err(SetupError::ReserveOverflow(Color::White));
        }
        let reserves = reserve_black as usize + reserve_white as usize;
        if pieces.len() + reserves != TOTAL_PIECES {
            return Err(SetupError::PieceCountMismatch {
                on_board: pieces.len(),
                reserves,
            });
        }

        let mut state = GameState {
            pieces: Vec::with_capacity(TOTAL_PIECES),
            grid: [None; CELL_COUNT],
            reserve: [reserve_black, reserve_white],
            current,
        };
        for &(cell, owner) in pieces {
            if state.grid[cell.index()].is_some() {
                return Err(SetupError::DuplicateCell(cell));
            }
            state.grid[cell.index()] = Some(owner);
            state.pieces.push(Piece { cell, owner });
        }
        Ok(state)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    #[inline]
    pub fn current_player(&self) -> Color {
        self.current
    }

    #[inline]
    pub fn reserve(&self, color: Color) -> u8 {
        self.reserve[color.index()]
    }

    /// Placed pieces in insertion order.
    #[inline]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    #[inline]
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.grid[cell.index()].is_some()
    }

    #[inline]
    pub fn piece_at(&self, cell: Cell) -> Option<Color> {
        self.grid[cell.index()]
    }

    /// All cells a piece of `owner` standing on `from` may slide to.
    ///
    /// In each of the six directions the piece slides over empty cells of
    /// its travel category and may stop on the first empty cell of any
    /// other category. Occupied cells and the board edge block the ray.
    /// Cells come back grouped by direction, nearest first.
    pub fn movable_places(&self, from: Cell, owner: Color) -> Vec<Cell> {
        let travel = owner.travel_category();
        let mut places = Vec::new();
        for dir in DIRECTIONS {
            let mut cur = from;
            while let Some(next) = cur.offset(dir) {
                if self.is_occupied(next) {
                    break;
                }
                places.push(next);
                if next.category() != travel {
                    break;
                }
                cur = next;
            }
        }
        places
    }

    /// Every legal play for the side to move.
    ///
    /// Moves come first, by source cell in canonical order; placements
    /// follow in canonical order when the mover still has reserve pieces.
    pub fn valid_plays(&self) -> Vec<Play> {
        let me = self.current;
        let mut plays = Vec::new();
        for from in Cell::all() {
            if self.piece_at(from) != Some(me) {
                continue;
            }
            for to in self.movable_places(from, me) {
                plays.push(Play::Move { from, to });
            }
        }
        if self.reserve(me) > 0 {
            for cell in Cell::all() {
                if !self.is_occupied(cell) {
                    plays.push(Play::Place(cell));
                }
            }
        }
        plays
    }

    /// Number of plays [`GameState::valid_plays`] would return for `color`.
    pub fn count_plays(&self, color: Color) -> usize {
        let moves: usize = self
            .pieces
            .iter()
            .filter(|p| p.owner == color)
            .map(|p| self.movable_places(p.cell, color).len())
            .sum();
        let places = if self.reserve(color) > 0 {
            CELL_COUNT - self.pieces.len()
        } else {
            0
        };
        moves + places
    }

    /// Length of the same-owner run through `cell` along `axis`,
    /// counting the piece on `cell` itself. Zero for an empty cell.
    pub fn line_length(&self, cell: Cell, axis: (i8, i8)) -> usize {
        let Some(owner) = self.piece_at(cell) else {
            return 0;
        };
        let mut count = 1;
        for dir in [axis, (-axis.0, -axis.1)] {
            let mut cur = cell;
            while let Some(next) = cur.offset(dir) {
                if self.piece_at(next) != Some(owner) {
                    break;
                }
                count += 1;
                cur = next;
            }
        }
        count
    }

    /// Owner of any five-or-longer line, who has lost.
    ///
    /// Evaluated over the whole board regardless of what was just played.
    /// If both sides somehow qualify, the owner of the earliest placed
    /// piece on such a line is reported.
    pub fn check_lose(&self) -> Option<Color> {
        self.pieces.iter().find_map(|p| {
            AXES.iter()
                .any(|&axis| self.line_length(p.cell, axis) >= LOSE_LENGTH)
                .then_some(p.owner)
        })
    }

    /// Owner of a four-in-a-row made by `last_play`.
    ///
    /// Only a move can win, and only lines through its destination count;
    /// a four that already stood on the board does not.
    pub fn check_win(&self, last_play: Option<Play>) -> Option<Color> {
        let Some(Play::Move { to, .. }) = last_play else {
            return None;
        };
        let owner = self.piece_at(to)?;
        AXES.iter()
            .any(|&axis| self.line_length(to, axis) == WIN_LENGTH)
            .then_some(owner)
    }

    pub fn is_game_over(&self, last_play: Option<Play>) -> bool {
        self.check_lose().is_some() || self.check_win(last_play).is_some()
    }

    /// Result of the game, if it has ended. A five-in-a-row loss is
    /// checked before any win.
    pub fn outcome(&self, last_play: Option<Play>) -> Option<Outcome> {
        if let Some(loser) = self.check_lose() {
            return Some(Outcome {
                winner: loser.opponent(),
                reason: EndReason::FiveInARow,
            });
        }
        self.check_win(last_play).map(|winner| Outcome {
            winner,
            reason: EndReason::FourInARow,
        })
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    /// Place a reserve piece of `owner` on `cell`. Never captures.
    pub fn place(&self, cell: Cell, owner: Color) -> Result<GameState, PlayError> {
        if self.is_occupied(cell) {
            return Err(PlayError::CellOccupied(cell));
        }
        if self.reserve(owner) == 0 {
            return Err(PlayError::NoReserveRemaining(owner));
        }
        let mut next = self.clone();
        next.pieces.push(Piece { cell, owner });
        next.grid[cell.index()] = Some(owner);
        next.reserve[owner.index()] -= 1;
        Ok(next)
    }

    /// Slide the piece on `from` to `to`, then resolve captures around `to`.
    ///
    /// The piece keeps its slot in the piece list. `to` must be one of
    /// [`GameState::movable_places`] for that piece.
    pub fn move_piece(&self, from: Cell, to: Cell) -> Result<GameState, PlayError> {
        let owner = self.piece_at(from).ok_or(PlayError::NoPieceAtSource(from))?;
        if !self.movable_places(from, owner).contains(&to) {
            return Err(PlayError::IllegalDestination { from, to });
        }
        let mut next = self.clone();
        if let Some(p) = next.pieces.iter_mut().find(|p| p.cell == from) {
            p.cell = to;
        }
        next.grid[from.index()] = None;
        next.grid[to.index()] = Some(owner);
        next.flip_pieces(to, owner);
        Ok(next)
    }

    /// Apply `play` for the side to move and pass the turn.
    pub fn play(&self, play: Play) -> Result<GameState, PlayError> {
        let mut next = match play {
            Play::Place(cell) => self.place(cell, self.current)?,
            Play::Move { from, to } => {
                match self.piece_at(from) {
                    None => return Err(PlayError::NoPieceAtSource(from)),
                    Some(owner) if owner != self.current => {
                        return Err(PlayError::NotYourPiece(from));
                    }
                    Some(_) => {}
                }
                self.move_piece(from, to)?
            }
        };
        next.current = self.current.opponent();
        Ok(next)
    }

    /// Same position with `color` to move.
    pub fn with_current_player(&self, color: Color) -> GameState {
        let mut next = self.clone();
        next.current = color;
        next
    }

    /// Same position with the other side to move.
    pub fn pass_turn(&self) -> GameState {
        self.with_current_player(self.current.opponent())
    }

    /// Convert every run of opponent pieces bracketed between `at` and
    /// another piece of `mover`, independently in each direction.
    fn flip_pieces(&mut self, at: Cell, mover: Color) {
        let mut to_flip: Vec<Cell> = Vec::new();
        for dir in DIRECTIONS {
            let mut run: Vec<Cell> = Vec::new();
            let mut cur = at;
            while let Some(next) = cur.offset(dir) {
                match self.piece_at(next) {
                    Some(c) if c != mover => run.push(next),
                    Some(_) => {
                        to_flip.append(&mut run);
                        break;
                    }
                    None => break,
                }
                cur = next;
            }
        }
        if to_flip.is_empty() {
            return;
        }
        for cell in &to_flip {
            self.grid[cell.index()] = Some(mover);
        }
        for p in &mut self.pieces {
            if to_flip.contains(&p.cell) {
                p.owner = mover;
            }
        }
    }
}

impl fmt::Display for GameState {
    /// Rows from 5 down to 1, columns A to E. Pieces print as `X` (black)
    /// and `O` (white); empty cells show their category symbol.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (1..=N).rev() {
            write!(f, "{row} ")?;
            for col in 1..=N {
                let Some(cell) = Cell::new(col, row) else {
                    continue;
                };
                let ch = match self.piece_at(cell) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => cell.category().symbol(),
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "  ")?;
        for col in 1..=N {
            write!(f, "{} ", (b'A' + col - 1) as char)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "reserve X={} O={}  to move: {}",
            self.reserve(Color::Black),
            self.reserve(Color::White),
            self.current
        )
    }
}
