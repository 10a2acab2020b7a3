use slotline_core::{
    evaluate, generate, paylines::standard_5x3, spin, EngineError, FixedSequence, MachineConfig,
    MultiplierTable, OutcomeGrid, Payline, ProvablyFairRng, Symbol, ThreadEntropy,
};
use Symbol::*;

fn grid_with_top(top: Vec<Symbol>) -> OutcomeGrid {
    OutcomeGrid::from_rows(vec![
        top,
        vec![Lemon, Orange, Plum, Bell, Bar],
        vec![Orange, Plum, Bell, Bar, Seven],
    ])
    .unwrap()
}

#[test]
fn rng_repeatable() {
    let rng1 = ProvablyFairRng::new("s", "c", 42);
    let rng2 = ProvablyFairRng::new("s", "c", 42);
    assert_eq!(rng1.next_floats(10), rng2.next_floats(10));
}

#[test]
fn generated_grid_is_full_and_in_set() {
    let symbols = [Cherry, Grapes, Bell, BigWin];
    for (reels, rows) in [(1, 1), (3, 1), (5, 3), (7, 4)] {
        let grid = generate(reels, rows, &symbols, &mut ThreadEntropy).unwrap();
        assert_eq!(grid.len(), reels * rows);
        assert_eq!(grid.reels(), reels);
        assert_eq!(grid.rows(), rows);
        assert!(grid.cells().all(|s| symbols.contains(&s)));
    }
}

#[test]
fn generate_covers_every_symbol() {
    let symbols = Symbol::ALL;
    let rng = ProvablyFairRng::new("server", "coverage", 0);
    let grid = generate(50, 20, &symbols, &mut rng.stream()).unwrap();
    for sym in symbols {
        assert!(grid.cells().any(|s| s == sym), "{sym} never drawn");
    }
}

#[test]
fn uniform_lines_pay_all_match_per_line() {
    let table = MultiplierTable::video_default();
    for sym in [Cherry, Bell, Seven] {
        let grid = OutcomeGrid::from_rows(vec![vec![sym; 5]; 3]).unwrap();
        let lines = standard_5x3();
        let total = evaluate(&grid, &lines, &table).unwrap();
        assert_eq!(total, lines.len() as f64 * table.all_match);
    }
}

#[test]
fn leftmost_three_scores_three_in_row() {
    let grid = grid_with_top(vec![Plum, Plum, Plum, Bar, Bar]);
    let table = MultiplierTable {
        four_in_row: 4.0,
        three_in_row: 3.0,
        two_in_row: 2.0,
        ..Default::default()
    };
    let total = evaluate(&grid, &[Payline::straight(0, 5)], &table).unwrap();
    assert_eq!(total, 3.0);
}

#[test]
fn run_not_starting_at_first_reel_scores_zero() {
    let grid = grid_with_top(vec![Bar, Plum, Plum, Plum, Plum]);
    let table = MultiplierTable::video_default();
    assert_eq!(evaluate(&grid, &[Payline::straight(0, 5)], &table).unwrap(), 0.0);
}

#[test]
fn jackpot_outpays_plain_all_match() {
    let table = MultiplierTable::video_default();
    let top = [Payline::straight(0, 5)];
    let jackpot = evaluate(&grid_with_top(vec![BigWin; 5]), &top, &table).unwrap();
    let plain = evaluate(&grid_with_top(vec![Seven; 5]), &top, &table).unwrap();
    assert_eq!(jackpot, table.all_match_jackpot);
    assert!(jackpot > plain);
}

#[test]
fn cherry_grapes_pays_one_and_a_half() {
    let grid = grid_with_top(vec![Cherry, Cherry, Cherry, Grapes, Grapes]);
    let table = MultiplierTable {
        three_in_row: 1.5,
        ..Default::default()
    };
    assert_eq!(evaluate(&grid, &[Payline::straight(0, 5)], &table).unwrap(), 1.5);
}

#[test]
fn big_win_on_all_five_lines_pays_fifty() {
    let grid = OutcomeGrid::from_rows(vec![vec![BigWin; 5]; 3]).unwrap();
    let table = MultiplierTable {
        all_match_jackpot: 10.0,
        jackpot: Some(BigWin),
        ..Default::default()
    };
    assert_eq!(evaluate(&grid, &standard_5x3(), &table).unwrap(), 50.0);
}

#[test]
fn reel_five_on_five_reels_is_invalid_payline() {
    let grid = grid_with_top(vec![Cherry; 5]);
    let line = Payline::new([(1, 0), (2, 0), (3, 0), (4, 0), (5, 0)]);
    let err = evaluate(&grid, &[line], &MultiplierTable::video_default()).unwrap_err();
    assert!(matches!(err, EngineError::InvalidPayline { reel: 5, row: 0, .. }));
}

#[test]
fn winnings_are_bet_times_multiplier() {
    let config = MachineConfig::video_5x3();
    for nonce in 0..200u64 {
        let rng = ProvablyFairRng::new("server", "client", nonce);
        let out = spin(&config, 2.5, &mut rng.stream()).unwrap();
        assert_eq!(out.winnings, 2.5 * out.total_multiplier);
        let recomputed = evaluate(&out.grid, &config.paylines, &config.table).unwrap();
        assert_eq!(recomputed, out.total_multiplier);
    }
}

#[test]
fn forced_grid_through_fixed_sequence() {
    let config = MachineConfig::video_5x3();
    let n = config.symbols.len();
    // reel-major draws: every reel shows seven, bell, bar top to bottom
    let per_reel = [Seven.to_index() as usize, Bell.to_index() as usize, Bar.to_index() as usize];
    let indices: Vec<usize> = (0..5).flat_map(|_| per_reel).collect();
    let mut seq = FixedSequence::picking(&indices, n);
    let out = spin(&config, 1.0, &mut seq).unwrap();
    // three straight all-match lines; the two V lines mix rows
    assert_eq!(out.total_multiplier, 3.0 * 5.0);
    assert_eq!(out.line_wins.len(), 3);
}

#[test]
fn rtp_simulation_smoke() {
    let config = MachineConfig::video_5x3();
    let mut total_bet = 0.0;
    let mut total_payout = 0.0;
    for n in 0..1000u64 {
        let rng = ProvablyFairRng::new("server", "client", n);
        let out = spin(&config, 1.0, &mut rng.stream()).unwrap();
        total_bet += 1.0;
        total_payout += out.winnings;
    }
    let rtp = total_payout / total_bet;
    // very loose bounds since the table is not tuned
    assert!((0.0..=10.0).contains(&rtp));
}
