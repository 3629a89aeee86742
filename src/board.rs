//! Board topology: the 25 cells, their fixed color categories, and owners.
//!
//! Everything here is static lookup data. Every [`GameState`] shares the
//! same [`CATEGORIES`] table, so cloning a state never copies topology.
//!
//! [`GameState`]: crate::state::GameState

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::{CELL_COUNT, N};

/// Piece owner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Index into per-player arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }

    /// The cell category this color slides along.
    ///
    /// Black pieces slide over dark cells; white pieces slide over light
    /// cells. Neither treats neutral cells as its own.
    #[inline]
    pub fn travel_category(self) -> Category {
        match self {
            Color::Black => Category::Dark,
            Color::White => Category::Light,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

impl FromStr for Color {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "black" => Ok(Color::Black),
            "w" | "white" => Ok(Color::White),
            _ => Err(ParseError::Color(s.to_string())),
        }
    }
}

/// Fixed color class of a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Neutral,
    Dark,
    Light,
}

impl Category {
    /// Single-letter tag used when printing empty cells.
    pub fn symbol(self) -> char {
        match self {
            Category::Neutral => '-',
            Category::Dark => ':',
            Category::Light => '.',
        }
    }
}

use Category::{Dark as D, Light as L, Neutral as G};

/// Category of every cell, indexed `[col - 1][row - 1]`.
///
/// Corners and the centre are neutral, the outer ring is dark, and the
/// inner ring is light.
pub const CATEGORIES: [[Category; N as usize]; N as usize] = [
    [G, D, D, D, G],
    [D, L, L, L, D],
    [D, L, G, L, D],
    [D, L, L, L, D],
    [G, D, D, D, G],
];

/// Errors from parsing board text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid cell: {0:?}")]
    Cell(String),
    #[error("invalid play: {0:?}")]
    Play(String),
    #[error("invalid color: {0:?}")]
    Color(String),
}

/// A board cell, `1 <= col, row <= 5`.
///
/// Cells can only be built through [`Cell::new`] and [`Cell::offset`], so a
/// `Cell` value is always on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    // row first so the derived ordering is row-major
    row: u8,
    col: u8,
}

impl Cell {
    pub fn new(col: u8, row: u8) -> Option<Self> {
        if (1..=N).contains(&col) && (1..=N).contains(&row) {
            Some(Cell { row, col })
        } else {
            None
        }
    }

    #[inline]
    pub fn col(self) -> u8 {
        self.col
    }

    #[inline]
    pub fn row(self) -> u8 {
        self.row
    }

    /// Flat row-major index in `0..CELL_COUNT`.
    #[inline]
    pub fn index(self) -> usize {
        (self.row as usize - 1) * N as usize + (self.col as usize - 1)
    }

    /// Inverse of [`Cell::index`].
    pub fn from_index(idx: usize) -> Option<Self> {
        if idx >= CELL_COUNT {
            return None;
        }
        let n = N as usize;
        Cell::new((idx % n) as u8 + 1, (idx / n) as u8 + 1)
    }

    #[inline]
    pub fn category(self) -> Category {
        CATEGORIES[self.col as usize - 1][self.row as usize - 1]
    }

    /// The neighbouring cell in direction `(dcol, drow)`, if on the board.
    #[inline]
    pub fn offset(self, (dc, dr): (i8, i8)) -> Option<Self> {
        let col = self.col as i8 + dc;
        let row = self.row as i8 + dr;
        if col < 1 || row < 1 {
            return None;
        }
        Cell::new(col as u8, row as u8)
    }

    /// Iterator over every cell in canonical (row-major) order.
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..CELL_COUNT).filter_map(Cell::from_index)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = (b'A' + self.col - 1) as char;
        write!(f, "{letter}{}", self.row)
    }
}

impl FromStr for Cell {
    type Err = ParseError;

    /// Parse a coordinate like `"C3"` (column letter, row digit).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.trim().as_bytes();
        if bytes.len() != 2 {
            return Err(ParseError::Cell(s.to_string()));
        }
        let col = bytes[0].to_ascii_uppercase().wrapping_sub(b'A').wrapping_add(1);
        let row = bytes[1].wrapping_sub(b'0');
        Cell::new(col, row).ok_or_else(|| ParseError::Cell(s.to_string()))
    }
}
