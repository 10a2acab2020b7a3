pub mod engine;
pub mod error;
pub mod grid;
pub mod paylines;
pub mod paytable;
pub mod rng;
pub mod symbols;

pub use crate::engine::{
    generate, replay, spin, spin_gated, verify_grid, MachineConfig, SpinOutcome, Variant, WinGate,
};
pub use crate::error::{EngineError, EngineResult};
pub use crate::grid::OutcomeGrid;
pub use crate::paylines::{Cell, Payline};
pub use crate::paytable::{evaluate, evaluate_lines, LineWin, MatchPattern, MultiplierTable};
pub use crate::rng::{
    derive_floats, derive_hash_hex, random_seed_hex, EntropySource, FairEntropy, FixedSequence,
    ProvablyFairRng, ThreadEntropy,
};
pub use crate::symbols::{Symbol, SymbolSet};
