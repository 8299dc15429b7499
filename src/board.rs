use crate::shape::Kind;
use log::{debug, trace};
use std::fmt;

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

pub const EMPTY: u8 = 0;
/// Marker written by a plain lock. Any non-zero value counts as occupied.
pub const OCCUPIED: u8 = 1;

pub type Row = [u8; BOARD_WIDTH];

const EMPTY_ROW: Row = [EMPTY; BOARD_WIDTH];

/// The playfield, row 0 at the top. Always exactly `BOARD_HEIGHT` rows of `BOARD_WIDTH` cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Board {
    rows: [Row; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Board {
        Board {
            rows: [EMPTY_ROW; BOARD_HEIGHT],
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for &v in row {
                write!(f, "{}", if v == EMPTY { '.' } else { '#' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Board {
    pub fn new() -> Board {
        Board::default()
    }

    /// Cell at column `x`, row `y`. Out-of-range coordinates panic.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.rows[y][x]
    }

    pub fn set(&mut self, x: usize, y: usize, v: u8) {
        self.rows[y][x] = v
    }

    pub fn row(&self, y: usize) -> &Row {
        &self.rows[y]
    }

    pub fn rows(&self) -> &[Row; BOARD_HEIGHT] {
        &self.rows
    }

    pub fn is_filled(&self, y: usize) -> bool {
        is_full(&self.rows[y])
    }

    /// Write `marker` into every occupied cell of `kind` at `rotation`, top-left corner at (x, y).
    ///
    /// No validation happens here: the placement must already be known to be collision free.
    /// A cell outside the board panics rather than wrapping.
    pub fn lock(&mut self, kind: Kind, rotation: i32, x: i32, y: i32, marker: u8) {
        for (c, r) in kind.cells(rotation) {
            self.set((x + c) as usize, (y + r) as usize, marker);
        }
        debug!("locked {kind} rotation {rotation} at ({x}, {y})");
        trace!("board after lock:\n{self}");
    }

    /// Drop every full row, keeping the others in order, and refill from the top with empty rows.
    ///
    /// Returns the compacted board and the number of rows removed; `self` is left untouched.
    pub fn clear_lines(&self) -> (Board, usize) {
        let mut rows = [EMPTY_ROW; BOARD_HEIGHT];
        let mut write = BOARD_HEIGHT;
        for row in self.rows.iter().rev().filter(|row| !is_full(row)) {
            write -= 1;
            rows[write] = *row;
        }
        let cleared = write;
        if cleared > 0 {
            debug!("cleared {cleared} line(s)");
        }
        (Board { rows }, cleared)
    }
}

fn is_full(row: &Row) -> bool {
    row.iter().all(|&v| v != EMPTY)
}
