//! Browser entry points. The free machine runs entirely in the page; paid
//! spins come from the server and can be checked here once the server seed
//! is revealed.

use wasm_bindgen::prelude::*;

use slotline_core::{
    derive_hash_hex, evaluate, spin_gated, verify_grid, OutcomeGrid, Symbol, ThreadEntropy,
    Variant, WinGate,
};
use slotline_shared::SpinResponse;

fn to_js(err: String) -> JsValue {
    JsValue::from_str(&err)
}

fn parse_variant(variant: &str) -> Result<Variant, String> {
    variant.parse()
}

fn free_spin_json(bet: f64, win_percentage: f64) -> Result<String, String> {
    if !bet.is_finite() || bet <= 0.0 {
        return Err("bet must be a positive number".into());
    }
    let gate = WinGate::new(win_percentage).map_err(|e| e.to_string())?;
    let outcome = spin_gated(&Variant::Free.machine(), bet, gate, &mut ThreadEntropy)
        .map_err(|e| e.to_string())?;
    serde_json::to_string(&outcome).map_err(|e| e.to_string())
}

fn evaluate_rows_json(rows_json: &str, variant: &str) -> Result<f64, String> {
    let config = parse_variant(variant)?.machine();
    let rows: Vec<Vec<Symbol>> = serde_json::from_str(rows_json).map_err(|e| e.to_string())?;
    let grid = OutcomeGrid::from_rows(rows).map_err(|e| e.to_string())?;
    evaluate(&grid, &config.paylines, &config.table).map_err(|e| e.to_string())
}

fn verify_response_json(
    response_json: &str,
    server_seed: &str,
    client_seed: &str,
) -> Result<bool, String> {
    let resp: SpinResponse = serde_json::from_str(response_json).map_err(|e| e.to_string())?;
    if derive_hash_hex(server_seed.as_bytes()) != resp.server_seed_hash {
        return Ok(false);
    }
    let gate = WinGate::new(resp.win_percentage).map_err(|e| e.to_string())?;
    verify_grid(
        server_seed,
        client_seed,
        resp.nonce,
        &resp.variant.machine(),
        gate,
        &resp.reels,
    )
    .map_err(|e| e.to_string())
}

/// Spin the free machine locally. Returns the outcome as JSON.
#[wasm_bindgen]
pub fn free_spin(bet: f64, win_percentage: f64) -> Result<String, JsValue> {
    free_spin_json(bet, win_percentage).map_err(to_js)
}

/// Total multiplier of a row-major grid given as JSON symbol names.
#[wasm_bindgen]
pub fn evaluate_rows(rows_json: &str, variant: &str) -> Result<f64, JsValue> {
    evaluate_rows_json(rows_json, variant).map_err(to_js)
}

/// Check a server spin response against the revealed server seed. The win
/// percentage is taken from the response, not the current setting.
#[wasm_bindgen]
pub fn verify_response(
    response_json: &str,
    server_seed: &str,
    client_seed: &str,
) -> Result<bool, JsValue> {
    verify_response_json(response_json, server_seed, client_seed).map_err(to_js)
}
