use chrono::Utc;

use super::SQLConnection;
use crate::models::{InsertServer, Server, ServerPatch};

const SERVERS_TABLE_NAME: &str = "servers";

pub async fn fetch_servers(conn: &SQLConnection) -> Result<Vec<Server>, sqlx::Error> {
    let statement = format!("SELECT * FROM {} ORDER BY id", SERVERS_TABLE_NAME);
    let servers = sqlx::query_as::<_, Server>(&statement)
        .fetch_all(conn)
        .await?;

    Ok(servers)
}

pub async fn fetch_server(conn: &SQLConnection, id: i64) -> Result<Option<Server>, sqlx::Error> {
    let statement = format!("SELECT * FROM {} WHERE id = ?", SERVERS_TABLE_NAME);
    let server = sqlx::query_as::<_, Server>(&statement)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(server)
}

pub async fn count_servers(conn: &SQLConnection) -> Result<i64, sqlx::Error> {
    let statement = format!("SELECT COUNT(*) FROM {}", SERVERS_TABLE_NAME);
    let (count,) = sqlx::query_as::<_, (i64,)>(&statement)
        .fetch_one(conn)
        .await?;

    Ok(count)
}

pub async fn insert_server(
    conn: &SQLConnection,
    server: &InsertServer,
) -> Result<Server, sqlx::Error> {
    let statement = format!(
        "INSERT INTO {}
        (name, host, port, username, status, cpu_usage, memory_usage,
        memory_total, uptime, vm_count, lxc_count, last_seen)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *",
        SERVERS_TABLE_NAME
    );

    let inserted = sqlx::query_as::<_, Server>(&statement)
        .bind(&server.name)
        .bind(&server.host)
        .bind(server.port)
        .bind(server.status)
        .bind(server.cpu_usage)
        .bind(server.memory_usage)
        .bind(server.memory_total)
        .bind(&server.uptime)
        .bind(server.vm_count)
        .bind(server.lxc_count)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

    Ok(inserted)
}

/// Applies the fields present in `patch`. Returns `None` if there is no
/// server with the given id.
pub async fn update_server(
    conn: &SQLConnection,
    id: i64,
    patch: &ServerPatch,
) -> Result<Option<Server>, sqlx::Error> {
    let statement = format!(
        "UPDATE {}
        SET
        name = COALESCE(?, name),
        host = COALESCE(?, host),
        port = COALESCE(?, port),
        username = COALESCE(?, username),
        status = COALESCE(?, status),
        cpu_usage = COALESCE(?, cpu_usage),
        memory_usage = COALESCE(?, memory_usage),
        memory_total = COALESCE(?, memory_total),
        uptime = COALESCE(?, uptime),
        vm_count = COALESCE(?, vm_count),
        lxc_count = COALESCE(?, lxc_count),
        last_seen = COALESCE(?, last_seen)
        WHERE id = ?
        RETURNING *",
        SERVERS_TABLE_NAME
    );

    let updated = sqlx::query_as::<_, Server>(&statement)
        .bind(&patch.name)
        .bind(&patch.host)
        .bind(patch.port)
        .bind(patch.status)
        .bind(patch.cpu_usage)
        .bind(patch.memory_usage)
        .bind(patch.memory_total)
        .bind(&patch.uptime)
        .bind(patch.vm_count)
        .bind(patch.lxc_count)
        .bind(patch.last_seen)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(updated)
}

/// Deletes only the server row, its vms, alerts and storage rows stay.
pub async fn delete_server(conn: &SQLConnection, id: i64) -> Result<bool, sqlx::Error> {
    let statement = format!("DELETE FROM {} WHERE id = ?", SERVERS_TABLE_NAME);
    let result = sqlx::query(&statement).bind(id).execute(conn).await?;

    Ok(result.rows_affected() > 0)
}

pub(super) async fn create_servers_table(conn: &SQLConnection) -> Result<(), sqlx::Error> {
    let statement = format!(
        "CREATE TABLE IF NOT EXISTS {} (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        host TEXT NOT NULL,
        port INTEGER NOT NULL DEFAULT 8006,
        username TEXT NOT NULL,
        status TEXT NOT NULL,
        cpu_usage REAL NOT NULL DEFAULT 0,
        memory_usage REAL NOT NULL DEFAULT 0,
        memory_total REAL NOT NULL DEFAULT 0,
        uptime TEXT,
        vm_count INTEGER NOT NULL DEFAULT 0,
        lxc_count INTEGER NOT NULL DEFAULT 0,
        last_seen TEXT NOT NULL
    )",
        SERVERS_TABLE_NAME
    );

    sqlx::query(&statement).execute(conn).await?;

    Ok(())
}
