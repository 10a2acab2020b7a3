use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use slotline_core::{derive_hash_hex, random_seed_hex, Symbol, Variant};
use slotline_shared::TransactionEntry;

// Placeholder seed written by the first migration.
const UNSET_SEED: &str = "change-me";
const ROTATE_ATTEMPTS: usize = 5;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredParams {
    pub server_seed: String,
    pub server_seed_hash: String,
    pub win_percentage: f64,
    pub nonce: i64,
}

pub async fn get_params(pool: &SqlitePool) -> anyhow::Result<StoredParams> {
    let row = sqlx::query_as::<_, StoredParams>(
        "SELECT server_seed, server_seed_hash, win_percentage, nonce FROM params WHERE id = 1",
    )
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn init_db(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(db).await?;
    let p = get_params(db).await?;
    if p.server_seed == UNSET_SEED {
        let seed = random_seed_hex();
        if swap_seed(db, UNSET_SEED, &seed).await?.is_some() {
            info!("generated initial server seed");
        }
        return Ok(());
    }
    // ensure server_seed_hash matches server_seed
    let hash = derive_hash_hex(p.server_seed.as_bytes());
    if p.server_seed_hash != hash {
        sqlx::query("UPDATE params SET server_seed_hash = ? WHERE id = 1")
            .bind(hash)
            .execute(db)
            .await?;
    }
    Ok(())
}

/// Replace the seed only if it is still `expected`. Returns the new hash, or
/// `None` when another writer rotated first.
pub async fn swap_seed(
    db: &SqlitePool,
    expected: &str,
    new_seed: &str,
) -> sqlx::Result<Option<String>> {
    let hash = derive_hash_hex(new_seed.as_bytes());
    let done = sqlx::query(
        "UPDATE params SET server_seed = ?, server_seed_hash = ?, nonce = 0 \
         WHERE id = 1 AND server_seed = ?",
    )
    .bind(new_seed)
    .bind(&hash)
    .bind(expected)
    .execute(db)
    .await?;
    Ok((done.rows_affected() == 1).then_some(hash))
}

/// Swap in `new_seed`, reset the nonce and hand back the retired seed.
/// The seed returned is exactly the one the swap replaced.
pub async fn rotate_seed(db: &SqlitePool, new_seed: &str) -> anyhow::Result<(String, String)> {
    for _ in 0..ROTATE_ATTEMPTS {
        let previous = get_params(db).await?.server_seed;
        if let Some(hash) = swap_seed(db, &previous, new_seed).await? {
            return Ok((previous, hash));
        }
    }
    anyhow::bail!("server seed kept changing during rotation")
}

/// Claim the next nonce. The increment and the read happen in one statement
/// so two spins can never draw the same nonce.
pub async fn next_spin_params(conn: &mut SqliteConnection) -> sqlx::Result<StoredParams> {
    sqlx::query_as::<_, StoredParams>(
        "UPDATE params SET nonce = nonce + 1 WHERE id = 1 \
         RETURNING server_seed, server_seed_hash, win_percentage, nonce",
    )
    .fetch_one(conn)
    .await
}

pub async fn set_win_percentage(db: &SqlitePool, win_percentage: f64) -> sqlx::Result<()> {
    sqlx::query("UPDATE params SET win_percentage = ? WHERE id = 1")
        .bind(win_percentage)
        .execute(db)
        .await?;
    Ok(())
}

pub struct NewSpin<'a> {
    pub variant: Variant,
    pub client_seed: &'a str,
    pub nonce: i64,
    pub server_seed_hash: &'a str,
    pub win_percentage: f64,
    pub reels: &'a [Vec<Symbol>],
    pub bet: f64,
    pub payout: f64,
}

pub async fn insert_spin(conn: &mut SqliteConnection, spin: &NewSpin<'_>) -> anyhow::Result<()> {
    let reels_json = serde_json::to_string(spin.reels)?;
    sqlx::query(
        "INSERT INTO spins (ts, variant, client_seed, nonce, server_seed_hash, win_percentage, result_reels_json, bet, payout) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Utc::now())
    .bind(spin.variant.as_str())
    .bind(spin.client_seed)
    .bind(spin.nonce)
    .bind(spin.server_seed_hash)
    .bind(spin.win_percentage)
    .bind(reels_json)
    .bind(spin.bet)
    .bind(spin.payout)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn append_transaction(
    db: &SqlitePool,
    player: &str,
    amount: f64,
    reference: Option<&str>,
) -> sqlx::Result<TransactionEntry> {
    sqlx::query_as::<_, TransactionEntry>(
        "INSERT INTO transactions (ts, player, amount, reference) VALUES (?, ?, ?, ?) \
         RETURNING id, ts, player, amount, reference",
    )
    .bind(Utc::now())
    .bind(player)
    .bind(amount)
    .bind(reference)
    .fetch_one(db)
    .await
}

pub async fn list_transactions(db: &SqlitePool, limit: i64) -> sqlx::Result<Vec<TransactionEntry>> {
    sqlx::query_as::<_, TransactionEntry>(
        "SELECT id, ts, player, amount, reference FROM transactions ORDER BY id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(db)
    .await
}

#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    let db = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    init_db(&db).await.expect("migrations");
    db
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn init_replaces_placeholder_seed() {
        let db = memory_pool().await;
        let p = get_params(&db).await.unwrap();
        assert_ne!(p.server_seed, UNSET_SEED);
        assert_eq!(p.server_seed_hash, derive_hash_hex(p.server_seed.as_bytes()));
        assert_eq!(p.win_percentage, 50.0);
        assert_eq!(p.nonce, 0);
    }

    #[tokio::test]
    async fn nonce_increments_per_claim() {
        let db = memory_pool().await;
        let mut conn = db.acquire().await.unwrap();
        assert_eq!(next_spin_params(&mut conn).await.unwrap().nonce, 1);
        assert_eq!(next_spin_params(&mut conn).await.unwrap().nonce, 2);
    }

    #[tokio::test]
    async fn rotate_resets_nonce_and_reveals_previous() {
        let db = memory_pool().await;
        let before = get_params(&db).await.unwrap();
        {
            let mut conn = db.acquire().await.unwrap();
            next_spin_params(&mut conn).await.unwrap();
        }
        let (previous, hash) = rotate_seed(&db, "fresh-seed").await.unwrap();
        assert_eq!(previous, before.server_seed);
        assert_eq!(hash, derive_hash_hex(b"fresh-seed"));
        let after = get_params(&db).await.unwrap();
        assert_eq!(after.nonce, 0);
        assert_eq!(after.server_seed, "fresh-seed");
    }

    #[tokio::test]
    async fn swap_with_stale_seed_changes_nothing() {
        let db = memory_pool().await;
        let before = get_params(&db).await.unwrap();
        let (first_prev, _) = rotate_seed(&db, "seed-a").await.unwrap();
        assert_eq!(first_prev, before.server_seed);

        // a writer that read the seed before "seed-a" landed must lose
        assert_eq!(swap_seed(&db, &before.server_seed, "seed-b").await.unwrap(), None);
        assert_eq!(get_params(&db).await.unwrap().server_seed, "seed-a");

        let (second_prev, _) = rotate_seed(&db, "seed-c").await.unwrap();
        assert_eq!(second_prev, "seed-a");
    }

    #[tokio::test]
    async fn concurrent_rotations_reveal_each_seed_once() {
        let db = memory_pool().await;
        let start = get_params(&db).await.unwrap().server_seed;
        let (a, b) = tokio::join!(rotate_seed(&db, "seed-a"), rotate_seed(&db, "seed-b"));
        let (a, b) = (a.unwrap().0, b.unwrap().0);
        let last = get_params(&db).await.unwrap().server_seed;

        let mut revealed = vec![a, b];
        revealed.sort();
        let mut expected = vec![start, if last == "seed-a" { "seed-b" } else { "seed-a" }.to_string()];
        expected.sort();
        assert_eq!(revealed, expected);
    }

    #[tokio::test]
    async fn transaction_rows_decode_as_shared_entries() {
        let db = memory_pool().await;
        let before = Utc::now();
        let stored = append_transaction(&db, "0xabc", 12.25, Some("ref")).await.unwrap();
        assert_eq!(stored.id, 1);
        assert!(stored.ts >= before - chrono::Duration::seconds(1));

        let listed = list_transactions(&db, 1).await.unwrap().remove(0);
        assert_eq!(listed.id, stored.id);
        assert_eq!(listed.ts, stored.ts);
        assert_eq!(listed.amount, 12.25);
        assert_eq!(listed.reference.as_deref(), Some("ref"));
    }

    #[tokio::test]
    async fn transactions_list_newest_first() {
        let db = memory_pool().await;
        append_transaction(&db, "0xabc", 10.0, Some("deposit-1")).await.unwrap();
        append_transaction(&db, "0xdef", -2.5, None).await.unwrap();
        let list = list_transactions(&db, 10).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].player, "0xdef");
        assert_eq!(list[1].reference.as_deref(), Some("deposit-1"));
        assert_eq!(list_transactions(&db, 1).await.unwrap().len(), 1);
    }
}
