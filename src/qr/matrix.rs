//! Boolean module grid produced by the encoder

use crate::error::{Error, Result};

/// Side length of a finder pattern in modules.
pub const FINDER_SIZE: usize = 7;

/// An immutable square grid of QR modules (`true` = dark).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMatrix {
    size: usize,
    cells: Vec<bool>,
}

impl ModuleMatrix {
    /// Build a matrix from row-major cells.
    ///
    /// The side length must be odd and large enough to hold the three finder
    /// patterns, which is true of every QR version.
    pub fn from_cells(size: usize, cells: Vec<bool>) -> Result<Self> {
        if size % 2 == 0 || size < 2 * FINDER_SIZE + 1 {
            return Err(Error::QrEncode(format!(
                "invalid module matrix size {size}"
            )));
        }
        if cells.len() != size * size {
            return Err(Error::QrEncode(format!(
                "expected {} cells for a {size}x{size} matrix, got {}",
                size * size,
                cells.len()
            )));
        }
        Ok(Self { size, cells })
    }

    /// Number of modules per side (N).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the module at `row`, `col` is dark. Out of range reads as light.
    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.cells[row * self.size + col]
    }

    /// Whether `row`, `col` lies inside one of the three 7×7 finder zones.
    pub fn in_finder_zone(&self, row: usize, col: usize) -> bool {
        in_finder_zone(self.size, row, col)
    }

    /// Iterate over every dark module as `(row, col)`.
    pub fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, dark)| **dark)
            .map(move |(idx, _)| (idx / self.size, idx % self.size))
    }

    /// Top-left module coordinates `(row, col)` of the three finder patterns.
    pub fn finder_origins(&self) -> [(usize, usize); 3] {
        let far = self.size - FINDER_SIZE;
        [(0, 0), (0, far), (far, 0)]
    }
}

/// Finder-zone predicate for an `n`×`n` matrix.
pub fn in_finder_zone(n: usize, row: usize, col: usize) -> bool {
    let near_row = row < FINDER_SIZE;
    let near_col = col < FINDER_SIZE;
    let far_row = row + FINDER_SIZE >= n;
    let far_col = col + FINDER_SIZE >= n;
    (near_row && near_col) || (near_row && far_col) || (far_row && near_col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_even_or_tiny_sizes() {
        assert!(ModuleMatrix::from_cells(22, vec![false; 22 * 22]).is_err());
        assert!(ModuleMatrix::from_cells(13, vec![false; 13 * 13]).is_err());
        assert!(ModuleMatrix::from_cells(21, vec![false; 20]).is_err());
    }

    #[test]
    fn finder_zone_matches_three_corners() {
        let n = 21;
        for row in 0..n {
            for col in 0..n {
                let expected = (row < 7 && col < 7)
                    || (row < 7 && col >= n - 7)
                    || (row >= n - 7 && col < 7);
                assert_eq!(in_finder_zone(n, row, col), expected, "({row}, {col})");
            }
        }
        // The bottom-right corner never hosts a finder.
        assert!(!in_finder_zone(n, n - 1, n - 1));
    }

    #[test]
    fn dark_modules_reports_row_major_positions() {
        let mut cells = vec![false; 21 * 21];
        cells[21 * 3 + 5] = true;
        cells[21 * 20 + 20] = true;
        let matrix = ModuleMatrix::from_cells(21, cells).unwrap();
        let dark: Vec<_> = matrix.dark_modules().collect();
        assert_eq!(dark, vec![(3, 5), (20, 20)]);
        assert!(matrix.is_dark(3, 5));
        assert!(!matrix.is_dark(99, 0));
    }
}
