use super::SQLConnection;
use crate::models::{InsertStorage, StorageInfo};

const STORAGE_INFO_TABLE_NAME: &str = "storage_info";

pub async fn fetch_storage_info(conn: &SQLConnection) -> Result<Vec<StorageInfo>, sqlx::Error> {
    let statement = format!("SELECT * FROM {} ORDER BY id", STORAGE_INFO_TABLE_NAME);
    let info = sqlx::query_as::<_, StorageInfo>(&statement)
        .fetch_all(conn)
        .await?;

    Ok(info)
}

pub async fn fetch_storage_by_server(
    conn: &SQLConnection,
    server_id: i64,
) -> Result<Vec<StorageInfo>, sqlx::Error> {
    let statement = format!(
        "SELECT * FROM {} WHERE server_id = ? ORDER BY id",
        STORAGE_INFO_TABLE_NAME
    );
    let info = sqlx::query_as::<_, StorageInfo>(&statement)
        .bind(server_id)
        .fetch_all(conn)
        .await?;

    Ok(info)
}

/// Drops every storage row of `server_id` and inserts `entries` in their
/// place, all in one transaction.
pub async fn replace_storage_info(
    conn: &SQLConnection,
    server_id: i64,
    entries: &[InsertStorage],
) -> Result<Vec<StorageInfo>, sqlx::Error> {
    let mut tx = conn.begin().await?;

    let delete_statement = format!("DELETE FROM {} WHERE server_id = ?", STORAGE_INFO_TABLE_NAME);
    sqlx::query(&delete_statement)
        .bind(server_id)
        .execute(&mut *tx)
        .await?;

    let insert_statement = format!(
        "INSERT INTO {}
        (server_id, storage, used, total, type)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *",
        STORAGE_INFO_TABLE_NAME
    );

    let mut inserted = Vec::with_capacity(entries.len());
    for entry in entries {
        let row = sqlx::query_as::<_, StorageInfo>(&insert_statement)
            .bind(server_id)
            .bind(&entry.storage)
            .bind(entry.used)
            .bind(entry.total)
            .bind(&entry.kind)
            .fetch_one(&mut *tx)
            .await?;
        inserted.push(row);
    }

    tx.commit().await?;

    Ok(inserted)
}

pub(super) async fn create_storage_info_table(conn: &SQLConnection) -> Result<(), sqlx::Error> {
    let statement = format!(
        "CREATE TABLE IF NOT EXISTS {} (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        server_id INTEGER NOT NULL,
        storage TEXT NOT NULL,
        used REAL NOT NULL,
        total REAL NOT NULL,
        type TEXT NOT NULL
    )",
        STORAGE_INFO_TABLE_NAME
    );

    sqlx::query(&statement).execute(conn).await?;

    Ok(())
}
