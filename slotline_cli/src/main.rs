use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;
use tracing_subscriber::EnvFilter;

use slotline_core::{derive_hash_hex, random_seed_hex, replay, Symbol, Variant, WinGate};
use slotline_shared::{SpinLogEntry, TransactionEntry};

#[derive(Parser)]
#[command(name = "slotline-cli", about = "Admin CLI for slotline server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Database URL, default sqlite://slotline.db
    #[arg(long, value_parser, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rotate server seed to a new secret (random when omitted)
    RotateSeed { new_seed: Option<String> },
    /// View last N spins
    ViewLogs {
        #[arg(default_value_t = 20)]
        n: i64,
    },
    /// Export spins to CSV path
    ExportCsv { path: String },
    /// Export the transaction log to CSV path
    ExportTransactions { path: String },
    /// Set the percentage of winning spins allowed to pay
    SetWinPercentage { percentage: f64 },
    /// Recompute a spin from its revealed seeds
    Replay {
        #[arg(long)]
        server_seed: String,
        #[arg(long)]
        client_seed: String,
        #[arg(long)]
        nonce: u64,
        #[arg(long, default_value = "free")]
        variant: Variant,
        #[arg(long)]
        win_percentage: f64,
        #[arg(long, default_value_t = 1.0)]
        bet: f64,
    },
}

#[derive(sqlx::FromRow)]
struct SpinRow {
    id: i64,
    ts: DateTime<Utc>,
    variant: String,
    client_seed: String,
    nonce: i64,
    server_seed_hash: String,
    win_percentage: f64,
    result_reels_json: String,
    bet: f64,
    payout: f64,
}

impl TryFrom<SpinRow> for SpinLogEntry {
    type Error = anyhow::Error;

    fn try_from(r: SpinRow) -> anyhow::Result<Self> {
        Ok(Self {
            id: r.id,
            ts: r.ts,
            variant: r.variant.parse().map_err(anyhow::Error::msg)?,
            client_seed: r.client_seed,
            nonce: r.nonce,
            server_seed_hash: r.server_seed_hash,
            win_percentage: r.win_percentage,
            result_reels: serde_json::from_str(&r.result_reels_json)?,
            bet: r.bet,
            payout: r.payout,
        })
    }
}

async fn get_pool(url: Option<String>) -> anyhow::Result<SqlitePool> {
    let url = url.unwrap_or_else(|| "sqlite://slotline.db".into());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;
    Ok(pool)
}

fn format_reels(rows: &[Vec<Symbol>]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|s| s.name())
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join(" / ")
}

async fn fetch_spins(pool: &SqlitePool, newest_first: bool, limit: i64) -> anyhow::Result<Vec<SpinLogEntry>> {
    let sql = if newest_first {
        "SELECT id, ts, variant, client_seed, nonce, server_seed_hash, win_percentage, result_reels_json, bet, payout \
         FROM spins ORDER BY id DESC LIMIT ?"
    } else {
        "SELECT id, ts, variant, client_seed, nonce, server_seed_hash, win_percentage, result_reels_json, bet, payout \
         FROM spins ORDER BY id ASC LIMIT ?"
    };
    let rows = sqlx::query_as::<_, SpinRow>(sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(SpinLogEntry::try_from).collect()
}

async fn fetch_transactions(pool: &SqlitePool) -> anyhow::Result<Vec<TransactionEntry>> {
    let rows = sqlx::query_as::<_, TransactionEntry>(
        "SELECT id, ts, player, amount, reference FROM transactions ORDER BY id ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Replace the server seed and return `(previous, new_hash)`. The update only
/// lands if the seed read is still current, so a rotation racing the server
/// never reports a seed it did not replace.
async fn rotate_seed(pool: &SqlitePool, new_seed: &str) -> anyhow::Result<(String, String)> {
    let hash = derive_hash_hex(new_seed.as_bytes());
    for _ in 0..5 {
        let previous: String = sqlx::query_scalar("SELECT server_seed FROM params WHERE id = 1")
            .fetch_one(pool)
            .await?;
        let done = sqlx::query(
            "UPDATE params SET server_seed = ?, server_seed_hash = ?, nonce = 0 \
             WHERE id = 1 AND server_seed = ?",
        )
        .bind(new_seed)
        .bind(&hash)
        .bind(&previous)
        .execute(pool)
        .await?;
        if done.rows_affected() == 1 {
            return Ok((previous, hash));
        }
    }
    anyhow::bail!("server seed kept changing during rotation")
}

async fn export_spins(pool: &SqlitePool, path: &str) -> anyhow::Result<usize> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "id",
        "ts",
        "variant",
        "client_seed",
        "nonce",
        "server_seed_hash",
        "win_percentage",
        "reels",
        "bet",
        "payout",
    ])?;
    let spins = fetch_spins(pool, false, i64::MAX).await?;
    for s in &spins {
        wtr.write_record(&[
            s.id.to_string(),
            s.ts.to_rfc3339(),
            s.variant.as_str().to_string(),
            s.client_seed.clone(),
            s.nonce.to_string(),
            s.server_seed_hash.clone(),
            s.win_percentage.to_string(),
            format_reels(&s.result_reels),
            s.bet.to_string(),
            s.payout.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(spins.len())
}

async fn export_transactions(pool: &SqlitePool, path: &str) -> anyhow::Result<usize> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["id", "ts", "player", "amount", "reference"])?;
    let entries = fetch_transactions(pool).await?;
    for t in &entries {
        wtr.write_record(&[
            t.id.to_string(),
            t.ts.to_rfc3339(),
            t.player.clone(),
            t.amount.to_string(),
            t.reference.clone().unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(entries.len())
}

fn print_replay(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    variant: Variant,
    win_percentage: f64,
    bet: f64,
) -> anyhow::Result<()> {
    let gate = WinGate::new(win_percentage)?;
    let outcome = replay(server_seed, client_seed, nonce, &variant.machine(), bet, gate)?;
    println!("server_seed_hash={}", derive_hash_hex(server_seed.as_bytes()));
    for row in outcome.grid.to_rows() {
        println!("  {}", format_reels(&[row]));
    }
    println!(
        "multiplier={} winnings={} held_back={} {}",
        outcome.total_multiplier, outcome.winnings, outcome.held_back, outcome.message
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
    let cli = Cli::parse();
    let db_url = cli.database_url;

    match cli.command {
        Commands::Replay {
            server_seed,
            client_seed,
            nonce,
            variant,
            win_percentage,
            bet,
        } => {
            print_replay(&server_seed, &client_seed, nonce, variant, win_percentage, bet)?;
        }
        Commands::RotateSeed { new_seed } => {
            let pool = get_pool(db_url).await?;
            let new_seed = new_seed.unwrap_or_else(random_seed_hex);
            let (previous, hash) = rotate_seed(&pool, &new_seed).await?;
            info!(%hash, "server seed rotated");
            println!("Rotated server seed. Previous seed: {}", previous);
            println!("New hash: {}", hash);
        }
        Commands::ViewLogs { n } => {
            let pool = get_pool(db_url).await?;
            for s in fetch_spins(&pool, true, n).await? {
                println!(
                    "#{:>6} {} {} seed={} nonce={} hash={} win%={} bet={} payout={} reels={}",
                    s.id,
                    s.ts.to_rfc3339(),
                    s.variant.as_str(),
                    s.client_seed,
                    s.nonce,
                    s.server_seed_hash,
                    s.win_percentage,
                    s.bet,
                    s.payout,
                    format_reels(&s.result_reels)
                );
            }
        }
        Commands::ExportCsv { path } => {
            let pool = get_pool(db_url).await?;
            let total = export_spins(&pool, &path).await?;
            println!("Exported {} rows to {}", total, path);
        }
        Commands::ExportTransactions { path } => {
            let pool = get_pool(db_url).await?;
            let total = export_transactions(&pool, &path).await?;
            println!("Exported {} transactions to {}", total, path);
        }
        Commands::SetWinPercentage { percentage } => {
            let pool = get_pool(db_url).await?;
            let gate = WinGate::new(percentage)?;
            sqlx::query("UPDATE params SET win_percentage = ? WHERE id = 1")
                .bind(gate.win_percentage())
                .execute(&pool)
                .await?;
            info!(win_percentage = gate.win_percentage(), "win percentage updated");
            println!("Win percentage set to {}", gate.win_percentage());
        }
    }

    Ok(())
}
