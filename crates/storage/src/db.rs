use khata_core::{CanonicalTransaction, ProcessingLog, ProcessingResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, SqliteExecutor};
use std::path::Path;

pub type DbPool = Pool<Sqlite>;

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            amount TEXT NOT NULL,
            transaction_type TEXT NOT NULL,
            balance TEXT,
            reference TEXT,
            category TEXT,
            subcategory TEXT,
            vendor TEXT,
            confidence REAL,
            bank_name TEXT NOT NULL,
            bank_code TEXT NOT NULL,
            is_manually_reviewed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions (user_id, date)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS processing_logs (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            file_name TEXT NOT NULL,
            bank_name TEXT NOT NULL,
            bank_code TEXT NOT NULL,
            total_transactions INTEGER NOT NULL,
            processed_transactions INTEGER NOT NULL,
            failed_transactions INTEGER NOT NULL,
            processing_time_ms INTEGER NOT NULL,
            errors TEXT NOT NULL DEFAULT '',
            source_sha256 TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Plain insert; a resubmitted statement produces new rows.
pub async fn insert_transaction<'e, E>(executor: E, tx: &CanonicalTransaction) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO transactions (id, user_id, date, description, amount, transaction_type, balance, reference, category, subcategory, vendor, confidence, bank_name, bank_code, is_manually_reviewed, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(tx.id.to_string())
    .bind(&tx.user_id)
    .bind(tx.date)
    .bind(&tx.description)
    .bind(tx.amount.as_decimal().to_string())
    .bind(tx.transaction_type.to_string())
    .bind(tx.balance.map(|b| b.as_decimal().to_string()))
    .bind(&tx.reference)
    .bind(&tx.category)
    .bind(&tx.subcategory)
    .bind(&tx.vendor)
    .bind(tx.confidence)
    .bind(&tx.bank_name)
    .bind(&tx.bank_code)
    .bind(tx.is_manually_reviewed)
    .bind(tx.created_at)
    .bind(tx.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn insert_processing_log<'e, E>(executor: E, log: &ProcessingLog) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO processing_logs (id, user_id, file_name, bank_name, bank_code, total_transactions, processed_transactions, failed_transactions, processing_time_ms, errors, source_sha256, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(log.id.to_string())
    .bind(&log.user_id)
    .bind(&log.file_name)
    .bind(&log.bank_name)
    .bind(&log.bank_code)
    .bind(log.total_transactions as i64)
    .bind(log.processed_transactions as i64)
    .bind(log.failed_transactions as i64)
    .bind(log.processing_time as i64)
    .bind(&log.errors)
    .bind(&log.source_sha256)
    .bind(log.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Writes every transaction of a run plus its processing log in one SQL
/// transaction. Returns the log that was stored.
pub async fn save_processing_result(
    pool: &DbPool,
    result: &ProcessingResult,
    user_id: &str,
    file_name: &str,
) -> Result<ProcessingLog, sqlx::Error> {
    let log = ProcessingLog::from_result(result, user_id, file_name);

    let mut db_tx = pool.begin().await?;
    for tx in &result.transactions {
        insert_transaction(&mut *db_tx, tx).await?;
    }
    insert_processing_log(&mut *db_tx, &log).await?;
    db_tx.commit().await?;

    tracing::info!(
        "Stored {} transactions from {} ({})",
        result.transactions.len(),
        file_name,
        log.bank_code
    );
    Ok(log)
}
