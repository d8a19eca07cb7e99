use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::{BoardParseError, core::piece::Piece};

use super::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Single row in the bit board representation.
///
/// Bit `x` is set when column `x` is occupied. Bits at or beyond the board
/// width are never set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitRow {
    bits: u32,
}

impl BitRow {
    pub const EMPTY: Self = Self { bits: 0 };

    const fn full_mask(width: usize) -> u32 {
        if width >= BitBoard::MAX_WIDTH {
            u32::MAX
        } else {
            (1 << width) - 1
        }
    }

    /// Checks if every cell of a `width`-wide row is occupied.
    #[inline]
    #[must_use]
    pub fn is_filled(self, width: usize) -> bool {
        self.bits == Self::full_mask(width)
    }

    #[inline]
    #[must_use]
    pub fn is_cell_occupied(self, x: usize) -> bool {
        (self.bits >> x) & 1 != 0
    }

    #[inline]
    fn occupy_cell(&mut self, x: usize) {
        self.bits |= 1 << x;
    }

    /// Number of occupied cells in the row.
    #[inline]
    #[must_use]
    pub fn count_occupied(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Iterates over the first `width` cells, returning their occupied status.
    pub fn iter_cells(self, width: usize) -> impl Iterator<Item = bool> {
        (0..width).map(move |x| self.is_cell_occupied(x))
    }
}

/// Grid of settled cells with fast collision detection and line clearing.
///
/// Each row is stored as a `u32` bitmask, so boards are at most
/// [`BitBoard::MAX_WIDTH`] columns wide. Row 0 is the top of the board and row
/// `height - 1` rests on the floor. Cells above row 0 are open space: pieces
/// may poke above the board while rotating, but never below the floor or
/// beyond the side walls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBoard {
    width: usize,
    height: usize,
    rows: Vec<BitRow>,
}

impl Default for BitBoard {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            rows: vec![BitRow::EMPTY; DEFAULT_HEIGHT],
        }
    }
}

impl Serialize for BitBoard {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "10:000,000,...,3ff" (width, then one hex value per row from the top)
        let digits = self.width.div_ceil(4);
        let mut s = String::with_capacity(4 + self.height * (digits + 1));
        write!(&mut s, "{}:", self.width).unwrap();
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                s.push(',');
            }
            write!(&mut s, "{:0digits$x}", row.bits).unwrap();
        }
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for BitBoard {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let (width_str, rows_str) = s.split_once(':').ok_or_else(|| {
            serde::de::Error::custom(format!("expected format 'width:row,row,...', got '{s}'"))
        })?;
        let width = width_str
            .parse::<usize>()
            .map_err(|e| serde::de::Error::custom(format!("invalid width: {width_str} ({e})")))?;
        let hex_rows: Vec<&str> = rows_str.split(',').collect();
        let mut board = BitBoard::new(width, hex_rows.len()).map_err(serde::de::Error::custom)?;

        let full = BitRow::full_mask(width);
        for (y, hex_str) in hex_rows.iter().enumerate() {
            let bits = u32::from_str_radix(hex_str, 16).map_err(|e| {
                serde::de::Error::custom(format!("invalid hex at row {y}: {hex_str} ({e})"))
            })?;
            if bits & !full != 0 {
                return Err(serde::de::Error::custom(format!(
                    "row {y} has cells beyond width {width}: {hex_str}"
                )));
            }
            board.rows[y] = BitRow { bits };
        }

        Ok(board)
    }
}

impl BitBoard {
    pub const MAX_WIDTH: usize = 32;
    pub const MAX_HEIGHT: usize = 64;

    /// Creates an empty board.
    pub fn new(width: usize, height: usize) -> Result<Self, BoardParseError> {
        if !(1..=Self::MAX_WIDTH).contains(&width) {
            return Err(BoardParseError::InvalidWidth {
                width,
                max: Self::MAX_WIDTH,
            });
        }
        if !(1..=Self::MAX_HEIGHT).contains(&height) {
            return Err(BoardParseError::InvalidHeight {
                height,
                max: Self::MAX_HEIGHT,
            });
        }
        Ok(Self {
            width,
            height,
            rows: vec![BitRow::EMPTY; height],
        })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn row(&self, y: usize) -> BitRow {
        self.rows[y]
    }

    pub fn rows(&self) -> impl Iterator<Item = BitRow> + '_ {
        self.rows.iter().copied()
    }

    #[must_use]
    pub fn is_cell_occupied(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.rows[y].is_cell_occupied(x)
    }

    /// Marks a single cell as occupied.
    ///
    /// # Panics
    ///
    /// Panics if the cell lies outside the board.
    pub fn occupy_cell(&mut self, x: usize, y: usize) {
        assert!(
            x < self.width && y < self.height,
            "cell ({x}, {y}) outside {}x{} board",
            self.width,
            self.height
        );
        self.rows[y].occupy_cell(x);
    }

    /// Iterates over occupied cells as `(column, row)` pairs, top row first.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.rows.iter().enumerate().flat_map(move |(y, row)| {
            row.iter_cells(width)
                .enumerate()
                .filter_map(move |(x, occupied)| occupied.then_some((x, y)))
        })
    }

    /// Checks if the piece overlaps a wall, the floor, or an occupied cell.
    #[must_use]
    pub fn is_colliding(&self, piece: &Piece) -> bool {
        piece.occupied_positions().any(|(x, y)| {
            let Ok(x) = usize::try_from(x) else {
                return true;
            };
            if x >= self.width {
                return true;
            }
            // Above the top row is open space.
            let Ok(y) = usize::try_from(y) else {
                return false;
            };
            y >= self.height || self.rows[y].is_cell_occupied(x)
        })
    }

    /// Locks a piece onto the board by setting its occupied cells.
    ///
    /// Cells above the top row are discarded.
    pub fn fill_piece(&mut self, piece: &Piece) {
        for (x, y) in piece.occupied_positions() {
            let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
                continue;
            };
            if x < self.width && y < self.height {
                self.rows[y].occupy_cell(x);
            }
        }
    }

    /// Clears filled lines and returns the number of lines cleared.
    ///
    /// Rows above a cleared line shift down; new empty rows enter at the top.
    pub fn clear_lines(&mut self) -> usize {
        let mut count = 0;

        for y in (0..self.height).rev() {
            if self.rows[y].is_filled(self.width) {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y + count] = self.rows[y];
            }
        }

        self.rows[..count].fill(BitRow::EMPTY);
        count
    }

    /// Creates a `BitBoard` from ASCII art, for fixtures and tests.
    ///
    /// `#` is an occupied cell and `.` an empty one. The width is taken from
    /// the art; the rows are aligned to the floor, so the last line of `art`
    /// becomes row `height - 1` and missing rows above are empty.
    #[must_use]
    pub fn from_ascii(height: usize, art: &str) -> Self {
        let lines: Vec<Vec<bool>> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.chars()
                    .filter(|c| *c == '#' || *c == '.')
                    .map(|c| c == '#')
                    .collect()
            })
            .collect();
        let width = lines.first().map_or(0, Vec::len);
        assert!(
            lines.len() <= height,
            "art has {} rows, board height is {height}",
            lines.len()
        );

        let mut board = Self::new(width, height).unwrap();
        let top = height - lines.len();
        for (i, cells) in lines.iter().enumerate() {
            assert_eq!(
                cells.len(),
                width,
                "Each row must have exactly {width} cells, got {} at row {i}",
                cells.len(),
            );
            for (x, &occupied) in cells.iter().enumerate() {
                if occupied {
                    board.rows[top + i].occupy_cell(x);
                }
            }
        }
        board
    }
}
