use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::symbols::Symbol;

/// A filled `reels x rows` window of symbols.
///
/// Cells are stored reel-major so that `cells[reel * rows + row]` is the
/// symbol shown on `reel` at `row`. The only ways to build one are
/// [`crate::engine::generate`] and [`OutcomeGrid::from_rows`], so every cell
/// is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeGrid {
    reels: usize,
    rows: usize,
    cells: Vec<Symbol>,
}

impl OutcomeGrid {
    pub(crate) fn from_cells(reels: usize, rows: usize, cells: Vec<Symbol>) -> Self {
        debug_assert_eq!(cells.len(), reels * rows);
        Self { reels, rows, cells }
    }

    /// Build a grid from row-major symbols, `rows[row][reel]`.
    pub fn from_rows(rows: Vec<Vec<Symbol>>) -> EngineResult<Self> {
        let row_count = rows.len();
        let reels = rows.first().map(Vec::len).unwrap_or(0);
        if row_count == 0 || reels == 0 || rows.iter().any(|r| r.len() != reels) {
            return Err(EngineError::RaggedGrid {
                reels,
                rows: row_count,
            });
        }
        let mut cells = Vec::with_capacity(reels * row_count);
        for reel in 0..reels {
            for row in &rows {
                cells.push(row[reel]);
            }
        }
        Ok(Self::from_cells(reels, row_count, cells))
    }

    pub fn reels(&self) -> usize {
        self.reels
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, reel: usize, row: usize) -> Option<Symbol> {
        if reel >= self.reels || row >= self.rows {
            return None;
        }
        Some(self.cells[reel * self.rows + row])
    }

    /// Symbols of one reel, top to bottom.
    pub fn reel(&self, reel: usize) -> Option<&[Symbol]> {
        if reel >= self.reels {
            return None;
        }
        let start = reel * self.rows;
        Some(&self.cells[start..start + self.rows])
    }

    pub fn cells(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.cells.iter().copied()
    }

    /// Row-major copy, `out[row][reel]`, the layout the wire and the UI use.
    pub fn to_rows(&self) -> Vec<Vec<Symbol>> {
        (0..self.rows)
            .map(|row| {
                (0..self.reels)
                    .map(|reel| self.cells[reel * self.rows + row])
                    .collect()
            })
            .collect()
    }
}

impl<'de> Deserialize<'de> for OutcomeGrid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            reels: usize,
            rows: usize,
            cells: Vec<Symbol>,
        }
        let raw = Raw::deserialize(deserializer)?;
        if raw.reels == 0 || raw.rows == 0 || raw.cells.len() != raw.reels * raw.rows {
            return Err(serde::de::Error::custom(format!(
                "grid of {} cells does not fill {}x{}",
                raw.cells.len(),
                raw.reels,
                raw.rows
            )));
        }
        Ok(Self::from_cells(raw.reels, raw.rows, raw.cells))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Symbol::*;

    #[test]
    fn test_from_rows_transposes() {
        let grid = OutcomeGrid::from_rows(vec![
            vec![Cherry, Lemon, Orange],
            vec![Plum, Grapes, Bell],
        ])
        .unwrap();
        assert_eq!(grid.reels(), 3);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.get(0, 1), Some(Plum));
        assert_eq!(grid.get(2, 0), Some(Orange));
        assert_eq!(grid.reel(1), Some(&[Lemon, Grapes][..]));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 2), None);
    }

    #[test]
    fn test_to_rows_round_trip() {
        let rows = vec![vec![Seven, Bar], vec![Bell, BigWin], vec![Cherry, Cherry]];
        let grid = OutcomeGrid::from_rows(rows.clone()).unwrap();
        assert_eq!(grid.to_rows(), rows);
    }

    #[test]
    fn test_from_rows_rejects_ragged_and_empty() {
        assert!(OutcomeGrid::from_rows(vec![]).is_err());
        assert!(OutcomeGrid::from_rows(vec![vec![]]).is_err());
        let err = OutcomeGrid::from_rows(vec![vec![Cherry, Lemon], vec![Cherry]]).unwrap_err();
        assert_eq!(err, EngineError::RaggedGrid { reels: 2, rows: 2 });
        assert_eq!(err.to_string(), "grid rows must be non-empty and equal in length (2 reels, 2 rows)");
    }

    #[test]
    fn test_deserialize_rejects_short_cells() {
        let bad = r#"{"reels":2,"rows":2,"cells":["cherry","lemon","plum"]}"#;
        assert!(serde_json::from_str::<OutcomeGrid>(bad).is_err());
        let good = r#"{"reels":1,"rows":2,"cells":["cherry","lemon"]}"#;
        let grid: OutcomeGrid = serde_json::from_str(good).unwrap();
        assert_eq!(grid.get(0, 1), Some(Lemon));
    }
}
