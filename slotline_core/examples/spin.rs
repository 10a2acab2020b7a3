use slotline_core::{spin_gated, MachineConfig, ProvablyFairRng, WinGate};

fn main() {
    // Example end-to-end spin on the five-reel machine
    let server_seed = "example-server-seed";
    let client_seed = "example-client-seed";
    let nonce = 1u64;
    let rng = ProvablyFairRng::new(server_seed, client_seed, nonce);
    let config = MachineConfig::video_5x3();
    let gate = WinGate::new(50.0).expect("50 is a valid percentage");
    let outcome = spin_gated(&config, 1.0, gate, &mut rng.stream()).expect("preset is valid");
    println!(
        "server_seed_hash={} multiplier={} winnings={} message={:?}",
        rng.server_seed_hash_hex(),
        outcome.total_multiplier,
        outcome.winnings,
        outcome.message
    );
    for row in outcome.grid.to_rows() {
        let names: Vec<&str> = row.iter().map(|s| s.name()).collect();
        println!("  {}", names.join(" | "));
    }
}
