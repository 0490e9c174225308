use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Runs a rendered seed batch against a Postgres database.
///
/// The batch goes over as a single simple-query script; no transaction is
/// opened around it, each upsert commits on its own.
pub async fn apply_batch(database_url: &str, batch: &str) -> anyhow::Result<u64> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(database_url)
        .await
        .context("Failed to connect to the target database")?;

    info!("Connected, applying {} bytes of seed statements", batch.len());

    let result = sqlx::raw_sql(batch)
        .execute(&pool)
        .await
        .context("Failed to apply seed batch")?;

    pool.close().await;

    Ok(result.rows_affected())
}
