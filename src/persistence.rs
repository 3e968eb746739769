use log::{debug, info};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

pub mod alerts;
pub mod servers;
pub mod storage_info;
pub mod virtual_machines;

pub type SQLConnection = Pool<Sqlite>;

pub async fn get_sql_connection(
    db_url: &str,
    max_connections: u32,
) -> Result<SQLConnection, sqlx::Error> {
    ensure_db_folder(db_url)?;

    let options = SqliteConnectOptions::from_str(db_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    debug!("connected to {} with {} max connections", db_url, max_connections);

    Ok(pool)
}

// sqlite creates the file but not the folder it lives in
fn ensure_db_folder(db_url: &str) -> Result<(), sqlx::Error> {
    let path = db_url
        .trim_start_matches("sqlite:")
        .trim_start_matches("//")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() || path.contains(":memory:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("creating database folder {}", parent.display());
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(())
}

pub async fn init_db(conn: &SQLConnection) -> Result<(), sqlx::Error> {
    servers::create_servers_table(conn).await?;
    virtual_machines::create_virtual_machines_table(conn).await?;
    alerts::create_alerts_table(conn).await?;
    storage_info::create_storage_info_table(conn).await?;

    Ok(())
}

/// A fresh in-memory database with every table created.
#[cfg(test)]
pub async fn test_connection() -> SQLConnection {
    // each in-memory connection is its own database, so keep exactly one alive
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    init_db(&pool).await.unwrap();

    pool
}
