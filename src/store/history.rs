//! Append-only store of past conversions

use crate::core::ConversionRecord;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

type ConversionRow = (i64, f64, String, String, f64, f64, DateTime<Utc>);

pub struct HistoryStore {
    pool: SqlitePool,
}

impl HistoryStore {
    /// Opens (creating if missing) the database at `path` and applies migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open history database: {}", path.display()))?;
        debug!("Opened history database at {}", path.display());
        Self::with_pool(pool).await
    }

    /// Private database living as long as the store.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!()
            .run(&pool)
            .await
            .context("Failed to migrate history database")?;
        Ok(Self { pool })
    }

    /// Inserts `record` and returns its assigned identifier.
    pub async fn append(&self, record: &ConversionRecord) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO conversions
                (amount, from_currency, to_currency, converted_amount, exchange_rate, date)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.amount)
        .bind(&record.from_currency)
        .bind(&record.to_currency)
        .bind(record.converted_amount)
        .bind(record.exchange_rate)
        .bind(record.date)
        .execute(&self.pool)
        .await
        .context("Failed to insert conversion")?;

        let id = result.last_insert_rowid();
        debug!("Stored conversion {}", id);
        Ok(id)
    }

    /// All conversions in insertion order.
    pub async fn list_all(&self) -> Result<Vec<ConversionRecord>> {
        let rows = sqlx::query_as::<_, ConversionRow>(
            r#"
            SELECT id, amount, from_currency, to_currency, converted_amount, exchange_rate, date
            FROM conversions
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list conversions")?;

        Ok(rows
            .into_iter()
            .map(
                |(id, amount, from_currency, to_currency, converted_amount, exchange_rate, date)| {
                    ConversionRecord {
                        id: Some(id),
                        amount,
                        from_currency,
                        to_currency,
                        converted_amount,
                        exchange_rate,
                        date,
                    }
                },
            )
            .collect())
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
