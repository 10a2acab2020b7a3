use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slotline_core::{LineWin, SpinOutcome, Symbol, Variant};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpinRequest {
    pub client_seed: String,
    pub bet: f64,
    #[serde(default)]
    pub variant: Variant,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpinResponse {
    pub server_seed_hash: String,
    pub nonce: u64,
    /// Gate in force when the spin ran; replays need it.
    pub win_percentage: f64,
    pub variant: Variant,
    pub reels: Vec<Vec<Symbol>>, // rows x reels
    pub line_wins: Vec<LineWin>,
    pub total_multiplier: f64,
    pub winnings: f64,
    pub held_back: bool,
    pub message: String,
}

impl SpinResponse {
    pub fn from_outcome(
        server_seed_hash: String,
        nonce: u64,
        win_percentage: f64,
        outcome: SpinOutcome,
    ) -> Self {
        Self {
            server_seed_hash,
            nonce,
            win_percentage,
            variant: outcome.variant,
            reels: outcome.grid.to_rows(),
            line_wins: outcome.line_wins,
            total_multiplier: outcome.total_multiplier,
            winnings: outcome.winnings,
            held_back: outcome.held_back,
            message: outcome.message,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VerifyResponse {
    pub server_seed_hash: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RotateSeedResponse {
    /// The seed that was in use until now, revealed so past spins can be replayed.
    pub previous_server_seed: String,
    pub server_seed_hash: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct WinPercentage {
    pub win_percentage: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TransactionRequest {
    /// Wallet address or account the entry belongs to.
    pub player: String,
    pub amount: f64,
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionEntry {
    pub id: i64,
    pub ts: DateTime<Utc>,
    pub player: String,
    pub amount: f64,
    pub reference: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpinLogEntry {
    pub id: i64,
    pub ts: DateTime<Utc>,
    pub variant: Variant,
    pub client_seed: String,
    pub nonce: i64,
    pub server_seed_hash: String,
    pub win_percentage: f64,
    pub result_reels: Vec<Vec<Symbol>>,
    pub bet: f64,
    pub payout: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_request_defaults_to_free_variant() {
        let req: SpinRequest = serde_json::from_str(r#"{"client_seed":"abc","bet":1.0}"#).unwrap();
        assert_eq!(req.variant, Variant::Free);
        let req: SpinRequest =
            serde_json::from_str(r#"{"client_seed":"abc","bet":1.0,"variant":"paid"}"#).unwrap();
        assert_eq!(req.variant, Variant::Paid);
    }

    #[test]
    fn response_reels_are_symbol_names() {
        let config = slotline_core::MachineConfig::classic_3x1();
        let mut seq = slotline_core::FixedSequence::picking(&[0, 0, 0], config.symbols.len());
        let outcome = slotline_core::spin(&config, 1.0, &mut seq).unwrap();
        let resp = SpinResponse::from_outcome("hash".into(), 7, 65.0, outcome);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["reels"], serde_json::json!([["cherry", "cherry", "cherry"]]));
        assert_eq!(json["variant"], "free");
        assert_eq!(json["total_multiplier"], 5.0);
        assert_eq!(json["win_percentage"], 65.0);
    }
}
