use chrono::Utc;

use super::SQLConnection;
use crate::models::{Alert, InsertAlert};

const ALERTS_TABLE_NAME: &str = "alerts";

pub async fn fetch_alerts(conn: &SQLConnection) -> Result<Vec<Alert>, sqlx::Error> {
    let statement = format!("SELECT * FROM {} ORDER BY timestamp, id", ALERTS_TABLE_NAME);
    let alerts = sqlx::query_as::<_, Alert>(&statement)
        .fetch_all(conn)
        .await?;

    Ok(alerts)
}

/// Alerts that have not been acknowledged yet, oldest first.
pub async fn fetch_active_alerts(conn: &SQLConnection) -> Result<Vec<Alert>, sqlx::Error> {
    let statement = format!(
        "SELECT * FROM {} WHERE acknowledged = 0 ORDER BY timestamp, id",
        ALERTS_TABLE_NAME
    );
    let alerts = sqlx::query_as::<_, Alert>(&statement)
        .fetch_all(conn)
        .await?;

    Ok(alerts)
}

pub async fn insert_alert(conn: &SQLConnection, alert: &InsertAlert) -> Result<Alert, sqlx::Error> {
    let statement = format!(
        "INSERT INTO {}
        (server_id, vm_id, type, message, timestamp, acknowledged)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *",
        ALERTS_TABLE_NAME
    );

    let inserted = sqlx::query_as::<_, Alert>(&statement)
        .bind(alert.server_id)
        .bind(alert.vm_id)
        .bind(alert.kind)
        .bind(&alert.message)
        .bind(Utc::now())
        .bind(alert.acknowledged)
        .fetch_one(conn)
        .await?;

    Ok(inserted)
}

pub async fn acknowledge_alert(conn: &SQLConnection, id: i64) -> Result<Option<Alert>, sqlx::Error> {
    let statement = format!(
        "UPDATE {} SET acknowledged = 1 WHERE id = ? RETURNING *",
        ALERTS_TABLE_NAME
    );
    let updated = sqlx::query_as::<_, Alert>(&statement)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(updated)
}

pub(super) async fn create_alerts_table(conn: &SQLConnection) -> Result<(), sqlx::Error> {
    let statement = format!(
        "CREATE TABLE IF NOT EXISTS {} (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        server_id INTEGER,
        vm_id INTEGER,
        type TEXT NOT NULL,
        message TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        acknowledged INTEGER NOT NULL DEFAULT 0
    )",
        ALERTS_TABLE_NAME
    );

    sqlx::query(&statement).execute(conn).await?;

    Ok(())
}
