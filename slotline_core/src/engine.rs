use serde::{Deserialize, Serialize};

use crate::{
    error::{EngineError, EngineResult},
    grid::OutcomeGrid,
    paylines::{self, Payline},
    paytable::{evaluate_lines, validate_paylines, LineWin, MultiplierTable},
    rng::{EntropySource, ProvablyFairRng},
    symbols::{Symbol, SymbolSet},
};

/// How many extra draws a held-back win gets to land on a losing grid.
pub const MAX_HOLDBACK_RESPINS: usize = 16;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Three-reel, one-row demo machine.
    #[default]
    Free,
    /// Five-reel, three-row wallet machine.
    Paid,
}

impl Variant {
    pub fn machine(self) -> MachineConfig {
        match self {
            Variant::Free => MachineConfig::classic_3x1(),
            Variant::Paid => MachineConfig::video_5x3(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Free => "free",
            Variant::Paid => "paid",
        }
    }
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Variant::Free),
            "paid" => Ok(Variant::Paid),
            other => Err(format!("unknown variant '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineConfig {
    pub variant: Variant,
    pub reels: usize,
    pub rows: usize,
    pub symbols: SymbolSet,
    pub paylines: Vec<Payline>,
    pub table: MultiplierTable,
}

impl MachineConfig {
    pub fn classic_3x1() -> Self {
        Self {
            variant: Variant::Free,
            reels: 3,
            rows: 1,
            symbols: SymbolSet::classic(),
            paylines: paylines::single_row(3),
            table: MultiplierTable::classic_default(),
        }
    }

    pub fn video_5x3() -> Self {
        Self {
            variant: Variant::Paid,
            reels: 5,
            rows: 3,
            symbols: SymbolSet::full(),
            paylines: paylines::standard_5x3(),
            table: MultiplierTable::video_default(),
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        check_dimensions(self.reels, self.rows, self.symbols.as_slice())?;
        validate_paylines(self.reels, self.rows, &self.paylines)
    }
}

fn check_dimensions(reels: usize, rows: usize, symbols: &[Symbol]) -> EngineResult<()> {
    if reels == 0 || rows == 0 || symbols.is_empty() {
        return Err(EngineError::InvalidDimensions {
            reels,
            rows,
            symbols: symbols.len(),
        });
    }
    Ok(())
}

/// Fill a `reels x rows` grid, drawing every cell independently and
/// uniformly from `symbols`. Cells are drawn reel by reel, top to bottom.
pub fn generate<E: EntropySource + ?Sized>(
    reels: usize,
    rows: usize,
    symbols: &[Symbol],
    entropy: &mut E,
) -> EngineResult<OutcomeGrid> {
    check_dimensions(reels, rows, symbols)?;
    let cells = (0..reels * rows)
        .map(|_| symbols[entropy.pick(symbols.len())])
        .collect();
    Ok(OutcomeGrid::from_cells(reels, rows, cells))
}

/// Probability, in percent, that a winning spin is allowed to pay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WinGate {
    win_percentage: f64,
}

impl WinGate {
    pub fn new(win_percentage: f64) -> EngineResult<Self> {
        if !(0.0..=100.0).contains(&win_percentage) {
            return Err(EngineError::InvalidWinPercentage(win_percentage));
        }
        Ok(Self { win_percentage })
    }

    /// Lets every win through.
    pub fn open() -> Self {
        Self {
            win_percentage: 100.0,
        }
    }

    pub fn win_percentage(&self) -> f64 {
        self.win_percentage
    }

    pub fn admits<E: EntropySource + ?Sized>(&self, entropy: &mut E) -> bool {
        entropy.next_unit() * 100.0 < self.win_percentage
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub variant: Variant,
    pub grid: OutcomeGrid,
    pub line_wins: Vec<LineWin>,
    pub total_multiplier: f64,
    pub bet: f64,
    pub winnings: f64,
    /// The grid won but the win gate kept the payout.
    pub held_back: bool,
    pub message: String,
}

fn outcome_message(winnings: f64, jackpot: bool, held_back: bool) -> String {
    if held_back {
        "So close! Better luck next spin.".to_string()
    } else if jackpot {
        format!("JACKPOT! You won {winnings:.2}!")
    } else if winnings > 0.0 {
        format!("You won {winnings:.2}!")
    } else {
        "No win this time.".to_string()
    }
}

fn score<E: EntropySource + ?Sized>(
    config: &MachineConfig,
    entropy: &mut E,
) -> EngineResult<(OutcomeGrid, Vec<LineWin>, f64)> {
    let grid = generate(config.reels, config.rows, config.symbols.as_slice(), entropy)?;
    let line_wins = evaluate_lines(&grid, &config.paylines, &config.table)?;
    let total = line_wins.iter().map(|w| w.multiplier).sum();
    Ok((grid, line_wins, total))
}

fn finish(
    config: &MachineConfig,
    bet: f64,
    grid: OutcomeGrid,
    line_wins: Vec<LineWin>,
    total_multiplier: f64,
    held_back: bool,
) -> SpinOutcome {
    let winnings = if held_back { 0.0 } else { bet * total_multiplier };
    let jackpot = line_wins.iter().any(|w| w.jackpot);
    SpinOutcome {
        variant: config.variant,
        message: outcome_message(winnings, jackpot, held_back),
        grid,
        // a withheld win pays no line
        line_wins: if held_back { Vec::new() } else { line_wins },
        total_multiplier: if held_back { 0.0 } else { total_multiplier },
        bet,
        winnings,
        held_back,
    }
}

/// One ungated spin: generate, evaluate, apply the bet.
pub fn spin<E: EntropySource + ?Sized>(
    config: &MachineConfig,
    bet: f64,
    entropy: &mut E,
) -> EngineResult<SpinOutcome> {
    config.validate()?;
    let (grid, line_wins, total) = score(config, entropy)?;
    Ok(finish(config, bet, grid, line_wins, total, false))
}

/// A spin whose win must also pass `gate`.
///
/// A losing first grid is returned as is. A winning one draws once against
/// the gate; if the draw fails, the machine re-spins up to
/// [`MAX_HOLDBACK_RESPINS`] times for a losing grid so the reels agree with
/// the payout. If every re-spin still wins, the last grid is shown with the
/// payout withheld.
pub fn spin_gated<E: EntropySource + ?Sized>(
    config: &MachineConfig,
    bet: f64,
    gate: WinGate,
    entropy: &mut E,
) -> EngineResult<SpinOutcome> {
    config.validate()?;
    let (grid, line_wins, total) = score(config, entropy)?;
    if total <= 0.0 || gate.admits(entropy) {
        return Ok(finish(config, bet, grid, line_wins, total, false));
    }

    let mut last = (grid, line_wins, total);
    for _ in 0..MAX_HOLDBACK_RESPINS {
        let (grid, line_wins, total) = score(config, entropy)?;
        if total <= 0.0 {
            return Ok(finish(config, bet, grid, line_wins, total, false));
        }
        last = (grid, line_wins, total);
    }
    let (grid, line_wins, total) = last;
    Ok(finish(config, bet, grid, line_wins, total, true))
}

/// Re-run a provably-fair gated spin from its seeds.
pub fn replay(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    config: &MachineConfig,
    bet: f64,
    gate: WinGate,
) -> EngineResult<SpinOutcome> {
    let rng = ProvablyFairRng::new(server_seed, client_seed, nonce);
    spin_gated(config, bet, gate, &mut rng.stream())
}

/// Check that a reported row-major grid is what the seeds produce.
pub fn verify_grid(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    config: &MachineConfig,
    gate: WinGate,
    expected_rows: &[Vec<Symbol>],
) -> EngineResult<bool> {
    let outcome = replay(server_seed, client_seed, nonce, config, 1.0, gate)?;
    Ok(outcome.grid.to_rows() == expected_rows)
}
