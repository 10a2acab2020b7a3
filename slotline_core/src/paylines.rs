use serde::{Deserialize, Serialize};

/// One cell of the grid a payline passes through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Cell {
    pub reel: usize,
    pub row: usize,
}

/// Ordered cells, one per reel, read left to right.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payline(pub Vec<Cell>);

impl Payline {
    pub fn new(cells: impl IntoIterator<Item = (usize, usize)>) -> Self {
        Self(
            cells
                .into_iter()
                .map(|(reel, row)| Cell { reel, row })
                .collect(),
        )
    }

    /// Same row across every reel.
    pub fn straight(row: usize, reels: usize) -> Self {
        Self::new((0..reels).map(|reel| (reel, row)))
    }

    /// Reel `i` reads row `rows[i]`, e.g. `[0, 1, 2, 1, 0]` for a V.
    pub fn from_rows(rows: &[usize]) -> Self {
        Self::new(rows.iter().copied().enumerate())
    }

    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Top, middle, bottom, V and inverted V on a 5x3 window.
pub fn standard_5x3() -> Vec<Payline> {
    vec![
        Payline::straight(0, 5),
        Payline::straight(1, 5),
        Payline::straight(2, 5),
        Payline::from_rows(&[0, 1, 2, 1, 0]),
        Payline::from_rows(&[2, 1, 0, 1, 2]),
    ]
}

/// The single line of a one-row machine.
pub fn single_row(reels: usize) -> Vec<Payline> {
    vec![Payline::straight(0, reels)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payline_straight() {
        let line = Payline::straight(1, 5);
        assert_eq!(line.len(), 5);
        assert!(line.cells().iter().enumerate().all(|(i, c)| c.reel == i && c.row == 1));
    }

    #[test]
    fn test_standard_lines_fit_5x3() {
        for line in standard_5x3() {
            assert_eq!(line.len(), 5);
            assert!(line.cells().iter().all(|c| c.reel < 5 && c.row < 3));
        }
    }

    #[test]
    fn test_v_shape_dips_to_bottom_in_the_middle() {
        let v = &standard_5x3()[3];
        let rows: Vec<usize> = v.cells().iter().map(|c| c.row).collect();
        assert_eq!(rows, vec![0, 1, 2, 1, 0]);
    }
}
