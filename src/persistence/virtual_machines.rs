use super::SQLConnection;
use crate::models::{InsertVm, VirtualMachine, VmPatch};

const VIRTUAL_MACHINES_TABLE_NAME: &str = "virtual_machines";

pub async fn fetch_vms(conn: &SQLConnection) -> Result<Vec<VirtualMachine>, sqlx::Error> {
    let statement = format!("SELECT * FROM {} ORDER BY id", VIRTUAL_MACHINES_TABLE_NAME);
    let vms = sqlx::query_as::<_, VirtualMachine>(&statement)
        .fetch_all(conn)
        .await?;

    Ok(vms)
}

pub async fn fetch_vms_by_server(
    conn: &SQLConnection,
    server_id: i64,
) -> Result<Vec<VirtualMachine>, sqlx::Error> {
    let statement = format!(
        "SELECT * FROM {} WHERE server_id = ? ORDER BY id",
        VIRTUAL_MACHINES_TABLE_NAME
    );
    let vms = sqlx::query_as::<_, VirtualMachine>(&statement)
        .bind(server_id)
        .fetch_all(conn)
        .await?;

    Ok(vms)
}

pub async fn insert_vm(conn: &SQLConnection, vm: &InsertVm) -> Result<VirtualMachine, sqlx::Error> {
    let statement = format!(
        "INSERT INTO {}
        (server_id, vmid, name, type, status, cpu_usage, memory_usage,
        memory_total, uptime, node)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *",
        VIRTUAL_MACHINES_TABLE_NAME
    );

    let inserted = sqlx::query_as::<_, VirtualMachine>(&statement)
        .bind(vm.server_id)
        .bind(vm.vmid)
        .bind(&vm.name)
        .bind(vm.kind)
        .bind(vm.status)
        .bind(vm.cpu_usage)
        .bind(vm.memory_usage)
        .bind(vm.memory_total)
        .bind(&vm.uptime)
        .bind(&vm.node)
        .fetch_one(conn)
        .await?;

    Ok(inserted)
}

pub async fn update_vm(
    conn: &SQLConnection,
    id: i64,
    patch: &VmPatch,
) -> Result<Option<VirtualMachine>, sqlx::Error> {
    let statement = format!(
        "UPDATE {}
        SET
        server_id = COALESCE(?, server_id),
        vmid = COALESCE(?, vmid),
        name = COALESCE(?, name),
        type = COALESCE(?, type),
        status = COALESCE(?, status),
        cpu_usage = COALESCE(?, cpu_usage),
        memory_usage = COALESCE(?, memory_usage),
        memory_total = COALESCE(?, memory_total),
        uptime = COALESCE(?, uptime),
        node = COALESCE(?, node)
        WHERE id = ?
        RETURNING *",
        VIRTUAL_MACHINES_TABLE_NAME
    );

    let updated = sqlx::query_as::<_, VirtualMachine>(&statement)
        .bind(patch.server_id)
        .bind(patch.vmid)
        .bind(&patch.name)
        .bind(patch.kind)
        .bind(patch.status)
        .bind(patch.cpu_usage)
        .bind(patch.memory_usage)
        .bind(patch.memory_total)
        .bind(&patch.uptime)
        .bind(&patch.node)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(updated)
}

pub(super) async fn create_virtual_machines_table(
    conn: &SQLConnection,
) -> Result<(), sqlx::Error> {
    // server_id is a soft reference to servers.id
    let statement = format!(
        "CREATE TABLE IF NOT EXISTS {} (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        server_id INTEGER NOT NULL,
        vmid INTEGER NOT NULL,
        name TEXT NOT NULL,
        type TEXT NOT NULL,
        status TEXT NOT NULL,
        cpu_usage REAL NOT NULL DEFAULT 0,
        memory_usage REAL NOT NULL DEFAULT 0,
        memory_total REAL NOT NULL DEFAULT 0,
        uptime TEXT,
        node TEXT
    )",
        VIRTUAL_MACHINES_TABLE_NAME
    );

    sqlx::query(&statement).execute(conn).await?;

    Ok(())
}
