use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::grid::OutcomeGrid;
use crate::paylines::Payline;
use crate::symbols::Symbol;

/// Multiplier per run category, plus which symbol pays the jackpot tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MultiplierTable {
    pub all_match: f64,
    pub all_match_jackpot: f64,
    pub four_in_row: f64,
    pub three_in_row: f64,
    pub two_in_row: f64,
    pub jackpot: Option<Symbol>,
}

impl MultiplierTable {
    /// Table of the five-reel video machine.
    pub fn video_default() -> Self {
        Self {
            all_match: 5.0,
            all_match_jackpot: 10.0,
            four_in_row: 2.5,
            three_in_row: 1.5,
            two_in_row: 0.5,
            jackpot: Some(Symbol::BigWin),
        }
    }

    /// Table of the three-reel classic machine.
    pub fn classic_default() -> Self {
        Self {
            all_match: 5.0,
            all_match_jackpot: 10.0,
            four_in_row: 0.0,
            three_in_row: 0.0,
            two_in_row: 0.5,
            jackpot: Some(Symbol::BigWin),
        }
    }

    pub fn is_jackpot(&self, symbol: Symbol) -> bool {
        self.jackpot == Some(symbol)
    }

    pub fn multiplier(&self, pattern: MatchPattern, symbol: Symbol) -> f64 {
        match pattern {
            MatchPattern::AllMatch if self.is_jackpot(symbol) => self.all_match_jackpot,
            MatchPattern::AllMatch => self.all_match,
            MatchPattern::FourInRow => self.four_in_row,
            MatchPattern::ThreeInRow => self.three_in_row,
            MatchPattern::TwoInRow => self.two_in_row,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchPattern {
    AllMatch,
    FourInRow,
    ThreeInRow,
    TwoInRow,
}

impl MatchPattern {
    /// Classify a line by its run of equal symbols starting at the first reel.
    /// Runs that start anywhere else never count.
    pub fn classify(line: &[Symbol]) -> Option<(MatchPattern, Symbol)> {
        let first = *line.first()?;
        let run = line.iter().take_while(|&&s| s == first).count();
        let pattern = if run == line.len() {
            MatchPattern::AllMatch
        } else if run >= 4 {
            MatchPattern::FourInRow
        } else if run >= 3 {
            MatchPattern::ThreeInRow
        } else if run >= 2 {
            MatchPattern::TwoInRow
        } else {
            return None;
        };
        Some((pattern, first))
    }
}

/// A scoring payline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineWin {
    pub line_index: usize,
    pub symbol: Symbol,
    pub pattern: MatchPattern,
    pub jackpot: bool,
    pub multiplier: f64,
}

/// Check every payline against the grid shape before anything is scored.
pub fn validate_paylines(grid_reels: usize, grid_rows: usize, paylines: &[Payline]) -> EngineResult<()> {
    for (index, line) in paylines.iter().enumerate() {
        if line.len() != grid_reels {
            return Err(EngineError::PaylineLength {
                index,
                len: line.len(),
                reels: grid_reels,
            });
        }
        if let Some(cell) = line
            .cells()
            .iter()
            .find(|c| c.reel >= grid_reels || c.row >= grid_rows)
        {
            return Err(EngineError::InvalidPayline {
                index,
                reel: cell.reel,
                row: cell.row,
                reels: grid_reels,
                rows: grid_rows,
            });
        }
    }
    Ok(())
}

/// Every payline that pays, in payline order.
pub fn evaluate_lines(
    grid: &OutcomeGrid,
    paylines: &[Payline],
    table: &MultiplierTable,
) -> EngineResult<Vec<LineWin>> {
    validate_paylines(grid.reels(), grid.rows(), paylines)?;

    let mut wins = Vec::new();
    let mut line = Vec::with_capacity(grid.reels());
    for (line_index, payline) in paylines.iter().enumerate() {
        line.clear();
        // bounds were checked above
        line.extend(payline.cells().iter().filter_map(|c| grid.get(c.reel, c.row)));

        let Some((pattern, symbol)) = MatchPattern::classify(&line) else {
            continue;
        };
        let multiplier = table.multiplier(pattern, symbol);
        if multiplier > 0.0 {
            wins.push(LineWin {
                line_index,
                symbol,
                pattern,
                jackpot: pattern == MatchPattern::AllMatch && table.is_jackpot(symbol),
                multiplier,
            });
        }
    }
    Ok(wins)
}

/// Total multiplier across all paylines. Paylines add up; they do not
/// compete for a maximum.
pub fn evaluate(grid: &OutcomeGrid, paylines: &[Payline], table: &MultiplierTable) -> EngineResult<f64> {
    Ok(evaluate_lines(grid, paylines, table)?
        .iter()
        .map(|w| w.multiplier)
        .sum())
}
