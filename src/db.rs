use crate::{cache::AliasCache, models::AliasMapping};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

// ── Pool ───────────────────────────────────────────────────────────────────

/// Open the SQLite pool (creating the file if needed) and apply the embedded
/// migrations from `migrations/`.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(
            database_url
                .parse::<SqliteConnectOptions>()?
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
        )
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}

/// Cheap round-trip used by the health check.
pub async fn ping(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

// ── Warm-up ────────────────────────────────────────────────────────────────

/// Load every mapping into the in-memory cache at startup.
pub async fn warm_cache(pool: &SqlitePool, cache: &AliasCache) -> Result<usize, sqlx::Error> {
    let rows: Vec<(String, String)> = sqlx::query_as("SELECT alias, full_url FROM aliases")
        .fetch_all(pool)
        .await?;

    let count = rows.len();
    for (alias, full_url) in rows {
        cache.set(alias, full_url);
    }

    tracing::info!("Cache warmed with {} alias(es)", count);
    Ok(count)
}

// ── Aliases ────────────────────────────────────────────────────────────────

/// Insert a mapping unless the alias is already taken.
///
/// Returns `false` when the primary key already exists. The check and the
/// write are one statement, so concurrent callers racing for the same alias
/// get exactly one `true`.
pub async fn insert_mapping(
    pool: &SqlitePool,
    mapping: &AliasMapping,
) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query(
        "INSERT INTO aliases (alias, full_url, created_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(alias) DO NOTHING",
    )
    .bind(&mapping.alias)
    .bind(&mapping.full_url)
    .bind(mapping.created_at)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(affected == 1)
}

/// Fetch a single mapping by alias.
pub async fn get_mapping(
    pool: &SqlitePool,
    alias: &str,
) -> Result<Option<AliasMapping>, sqlx::Error> {
    let mapping: Option<AliasMapping> =
        sqlx::query_as("SELECT alias, full_url, created_at FROM aliases WHERE alias = ?1")
            .bind(alias)
            .fetch_optional(pool)
            .await?;

    Ok(mapping)
}

/// Every mapping, newest first.
pub async fn list_mappings(pool: &SqlitePool) -> Result<Vec<AliasMapping>, sqlx::Error> {
    let mappings: Vec<AliasMapping> = sqlx::query_as(
        "SELECT alias, full_url, created_at FROM aliases
         ORDER BY created_at DESC, alias ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(mappings)
}

/// Permanently delete a mapping. Returns `false` if nothing matched.
pub async fn delete_mapping(pool: &SqlitePool, alias: &str) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query("DELETE FROM aliases WHERE alias = ?1")
        .bind(alias)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected > 0)
}
