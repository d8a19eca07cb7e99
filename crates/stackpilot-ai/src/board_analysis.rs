//! Board metrics used to rank placements.
//!
//! [`BoardAnalysis`] groups the settled cells by column once and computes
//! each metric on first access. [`BoardFeatures`] is the flat snapshot the
//! selectors compare.

use std::cell::OnceCell;

use serde::{Deserialize, Serialize};

use crate::board_contract::Board;

/// Score points worth one unit of `score_delta` (a single-line clear).
pub const SCORE_DIVISOR: f32 = 100.0;

/// Scalar metrics of a settled board. All but `score_delta` are lower-is-better.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct BoardFeatures {
    pub holes: u32,
    pub bottom_row_holes: u32,
    pub mean_height: f32,
    pub height_variance: u64,
    pub height_range: u32,
    pub score_delta: f32,
}

#[derive(Debug)]
pub struct BoardAnalysis {
    height: usize,
    /// Occupied rows of each column, top to bottom.
    columns: Vec<Vec<usize>>,
    column_heights: OnceCell<Vec<u32>>,
    holes: OnceCell<u32>,
    bottom_row_holes: OnceCell<u32>,
    height_variance: OnceCell<u64>,
}

impl BoardAnalysis {
    #[must_use]
    pub fn from_board<B>(board: &B) -> Self
    where
        B: Board,
    {
        Self::from_cells(board.width(), board.height(), board.occupied_cells())
    }

    /// Cells outside `width × height` are ignored.
    #[must_use]
    pub fn from_cells<I>(width: usize, height: usize, cells: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut columns = vec![vec![]; width];
        for (x, y) in cells {
            if x < width && y < height {
                columns[x].push(y);
            }
        }
        for rows in &mut columns {
            rows.sort_unstable();
            rows.dedup();
        }
        Self {
            height,
            columns,
            column_heights: OnceCell::new(),
            holes: OnceCell::new(),
            bottom_row_holes: OnceCell::new(),
            height_variance: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Stack height per column, measured from the floor; empty columns are 0.
    #[must_use]
    pub fn column_heights(&self) -> &[u32] {
        self.column_heights.get_or_init(|| {
            self.columns
                .iter()
                .map(|rows| {
                    rows.first()
                        .map_or(0, |&top| u32::try_from(self.height - top).unwrap_or(u32::MAX))
                })
                .collect()
        })
    }

    /// Empty cells trapped in each column.
    ///
    /// Walking a column from the floor up, every gap between two occupied
    /// cells counts its row distance, and an empty stretch between the lowest
    /// occupied cell and the floor counts its length.
    #[must_use]
    pub fn holes(&self) -> u32 {
        *self.holes.get_or_init(|| {
            let floor = self.height.saturating_sub(1);
            let total: usize = self
                .columns
                .iter()
                .map(|rows| {
                    let Some(&lowest) = rows.last() else {
                        return 0;
                    };
                    let gaps: usize = rows
                        .windows(2)
                        .map(|pair| pair[1] - pair[0])
                        .filter(|&distance| distance > 1)
                        .sum();
                    gaps + (floor - lowest)
                })
                .sum();
            u32::try_from(total).unwrap_or(u32::MAX)
        })
    }

    /// Empty cells in the floor row.
    #[must_use]
    pub fn bottom_row_holes(&self) -> u32 {
        *self.bottom_row_holes.get_or_init(|| {
            let floor = self.height.saturating_sub(1);
            let filled = self
                .columns
                .iter()
                .filter(|rows| rows.last() == Some(&floor))
                .count();
            u32::try_from(self.width() - filled).unwrap_or(u32::MAX)
        })
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn mean_height(&self) -> f32 {
        if self.columns.is_empty() {
            return 0.0;
        }
        let total: u32 = self.column_heights().iter().sum();
        total as f32 / self.width() as f32
    }

    /// `n·Σh² − (Σh)²`: `n²` times the population variance of the heights.
    #[must_use]
    pub fn height_variance(&self) -> u64 {
        *self.height_variance.get_or_init(|| {
            let heights = self.column_heights();
            let n = heights.len() as u64;
            let sum: u64 = heights.iter().map(|&h| u64::from(h)).sum();
            let sum_sq: u64 = heights.iter().map(|&h| u64::from(h) * u64::from(h)).sum();
            (n * sum_sq).saturating_sub(sum * sum)
        })
    }

    #[must_use]
    pub fn height_range(&self) -> u32 {
        let heights = self.column_heights();
        let max = heights.iter().copied().max().unwrap_or(0);
        let min = heights.iter().copied().min().unwrap_or(0);
        max - min
    }

    /// Snapshot of every metric, with the score change that produced this board.
    #[must_use]
    pub fn features(&self, score_delta: f32) -> BoardFeatures {
        BoardFeatures {
            holes: self.holes(),
            bottom_row_holes: self.bottom_row_holes(),
            mean_height: self.mean_height(),
            height_variance: self.height_variance(),
            height_range: self.height_range(),
            score_delta,
        }
    }
}

/// Converts a raw score difference into `score_delta` units.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub fn score_delta(initial: usize, settled: usize) -> f32 {
    settled.saturating_sub(initial) as f32 / SCORE_DIVISOR
}

#[cfg(test)]
mod tests {
    use stackpilot_engine::{BitBoard, GameField};

    use super::*;

    fn analyze(height: usize, art: &str) -> BoardAnalysis {
        let board = BitBoard::from_ascii(height, art);
        BoardAnalysis::from_cells(board.width(), board.height(), board.occupied_cells())
    }

    #[test]
    fn test_empty_board() {
        let analysis = BoardAnalysis::from_cells(10, 24, []);
        assert_eq!(analysis.features(0.0), BoardFeatures {
            bottom_row_holes: 10,
            ..BoardFeatures::default()
        });
    }

    #[test]
    fn test_holes_gap_and_floor_gap() {
        // Column 0 has rows 20 and 22 occupied; 21 and 23 are empty.
        let analysis = analyze(
            24,
            r"
            #.........
            ..........
            #.........
            ..........
            ",
        );
        assert_eq!(analysis.holes(), 3);
        assert_eq!(analysis.column_heights()[0], 4);
        assert_eq!(analysis.bottom_row_holes(), 10);
    }

    #[test]
    fn test_holes_zero_for_floor_contiguous_columns() {
        let analysis = analyze(
            24,
            r"
            ...#......
            .#.#....#.
            ##.###..##
            ##########
            ",
        );
        assert_eq!(analysis.holes(), 0);
        assert_eq!(analysis.bottom_row_holes(), 0);
    }

    #[test]
    fn test_holes_under_overhang() {
        let analysis = analyze(
            24,
            r"
            ###.......
            #.#.......
            ###.......
            ",
        );
        assert_eq!(analysis.holes(), 2);
    }

    #[test]
    fn test_height_statistics() {
        let analysis = analyze(
            24,
            r"
            #.........
            #.....#...
            ##....#..#
            ",
        );
        assert_eq!(analysis.column_heights(), &[3, 1, 0, 0, 0, 0, 2, 0, 0, 1]);
        assert!((analysis.mean_height() - 0.7).abs() < 1e-6);
        // n·Σh² − (Σh)² = 10·15 − 49
        assert_eq!(analysis.height_variance(), 101);
        assert_eq!(analysis.height_range(), 3);
    }

    #[test]
    fn test_variance_zero_iff_flat() {
        let flat = analyze(
            24,
            r"
            ##########
            ##########
            ",
        );
        assert_eq!(flat.height_variance(), 0);
        assert_eq!(flat.height_range(), 0);

        let bumpy = analyze(
            24,
            r"
            .........#
            ##########
            ",
        );
        assert!(bumpy.height_variance() > 0);
        assert_eq!(bumpy.height_range(), 1);
    }

    #[test]
    fn test_from_board_ignores_falling_piece() {
        let field = GameField::scripted(BitBoard::default(), Some(stackpilot_engine::PieceKind::T), []);
        let analysis = BoardAnalysis::from_board(&field);
        assert_eq!(analysis.column_heights().iter().sum::<u32>(), 0);
    }

    #[test]
    fn test_score_delta_units() {
        assert!((score_delta(200, 500) - 3.0).abs() < f32::EPSILON);
        assert!(score_delta(100, 100).abs() < f32::EPSILON);
    }
}
