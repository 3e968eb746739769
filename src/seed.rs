//! Demo data for a fresh database. The dashboard does not talk to Proxmox
//! itself, so without seeding every panel starts empty.

use log::info;

use crate::models::{
    AlertType, InsertAlert, InsertServer, InsertStorage, InsertVm, ServerStatus, VmStatus, VmType,
};
use crate::persistence::{alerts, servers, storage_info, virtual_machines, SQLConnection};

struct DemoGuest {
    vmid: i64,
    name: &'static str,
    kind: VmType,
    status: VmStatus,
    cpu_usage: f64,
    memory_usage: f64,
    memory_total: f64,
    uptime: Option<&'static str>,
}

struct DemoNode {
    name: &'static str,
    host: &'static str,
    status: ServerStatus,
    cpu_usage: f64,
    memory_usage: f64,
    memory_total: f64,
    uptime: Option<&'static str>,
    guests: Vec<DemoGuest>,
    // (storage, used, total, type)
    storage: Vec<(&'static str, f64, f64, &'static str)>,
}

fn guest(
    vmid: i64,
    name: &'static str,
    kind: VmType,
    status: VmStatus,
    usage: (f64, f64),
    memory_total: f64,
    uptime: Option<&'static str>,
) -> DemoGuest {
    DemoGuest {
        vmid,
        name,
        kind,
        status,
        cpu_usage: usage.0,
        memory_usage: usage.1,
        memory_total,
        uptime,
    }
}

fn demo_nodes() -> Vec<DemoNode> {
    use VmStatus::*;
    use VmType::*;

    vec![
        DemoNode {
            name: "pve-node-01",
            host: "192.168.1.10",
            status: ServerStatus::Online,
            cpu_usage: 34.2,
            memory_usage: 62.8,
            memory_total: 128.0,
            uptime: Some("23d 4h 12m"),
            guests: vec![
                guest(100, "web-frontend", Vm, Running, (12.4, 48.0), 8.0, Some("12d 2h")),
                guest(101, "postgres-main", Vm, Running, (41.7, 71.3), 32.0, Some("23d 4h")),
                guest(200, "nginx-proxy", Lxc, Running, (2.1, 18.5), 1.0, Some("23d 4h")),
                guest(201, "redis-cache", Lxc, Running, (5.8, 36.0), 2.0, Some("9d 7h")),
            ],
            storage: vec![
                ("local", 42.5, 100.0, "dir"),
                ("local-lvm", 612.0, 900.0, "lvmthin"),
            ],
        },
        DemoNode {
            name: "pve-node-02",
            host: "192.168.1.11",
            status: ServerStatus::Warning,
            cpu_usage: 87.5,
            memory_usage: 91.2,
            memory_total: 64.0,
            uptime: Some("7d 18h 40m"),
            guests: vec![
                guest(102, "ci-runner", Vm, Warning, (96.3, 88.1), 16.0, Some("7d 18h")),
                guest(103, "windows-build", Vm, Stopped, (0.0, 0.0), 16.0, None),
                guest(202, "monitoring", Lxc, Running, (8.9, 52.4), 4.0, Some("7d 18h")),
            ],
            storage: vec![
                ("local", 71.0, 100.0, "dir"),
                ("ceph-pool", 1840.0, 4000.0, "rbd"),
            ],
        },
        DemoNode {
            name: "pve-backup",
            host: "192.168.1.12",
            status: ServerStatus::Offline,
            cpu_usage: 0.0,
            memory_usage: 0.0,
            memory_total: 32.0,
            uptime: None,
            guests: vec![guest(203, "pbs-agent", Lxc, Stopped, (0.0, 0.0), 2.0, None)],
            storage: vec![("backup-nfs", 2300.0, 8000.0, "nfs")],
        },
    ]
}

/// Inserts the demo data when there are no servers yet. Returns whether
/// anything was inserted.
pub async fn seed_if_empty(conn: &SQLConnection) -> Result<bool, sqlx::Error> {
    if servers::count_servers(conn).await? > 0 {
        info!("database already has servers, skipping demo data");
        return Ok(false);
    }

    let mut server_ids = Vec::new();

    for node in demo_nodes() {
        let vm_count = node.guests.iter().filter(|g| g.kind == VmType::Vm).count() as i64;
        let lxc_count = node.guests.len() as i64 - vm_count;

        let server = servers::insert_server(
            conn,
            &InsertServer {
                name: node.name.to_owned(),
                host: node.host.to_owned(),
                port: crate::models::server::DEF_PROXMOX_PORT,
                username: "root@pam".to_owned(),
                status: node.status,
                cpu_usage: node.cpu_usage,
                memory_usage: node.memory_usage,
                memory_total: node.memory_total,
                uptime: node.uptime.map(str::to_owned),
                vm_count,
                lxc_count,
            },
        )
        .await?;

        for g in &node.guests {
            virtual_machines::insert_vm(
                conn,
                &InsertVm {
                    server_id: server.id,
                    vmid: g.vmid,
                    name: g.name.to_owned(),
                    kind: g.kind,
                    status: g.status,
                    cpu_usage: g.cpu_usage,
                    memory_usage: g.memory_usage,
                    memory_total: g.memory_total,
                    uptime: g.uptime.map(str::to_owned),
                    node: Some(node.name.to_owned()),
                },
            )
            .await?;
        }

        let storage: Vec<InsertStorage> = node
            .storage
            .iter()
            .map(|(name, used, total, kind)| InsertStorage {
                storage: (*name).to_owned(),
                used: *used,
                total: *total,
                kind: (*kind).to_owned(),
            })
            .collect();
        storage_info::replace_storage_info(conn, server.id, &storage).await?;

        server_ids.push(server.id);
    }

    let demo_alerts = [
        (0, AlertType::Info, "Scheduled backup of postgres-main completed", true),
        (1, AlertType::Critical, "CPU usage above 85% on pve-node-02", false),
        (1, AlertType::Warning, "Memory usage above 90% on pve-node-02", false),
        (2, AlertType::Critical, "pve-backup is not responding", false),
    ];
    for (idx, kind, message, acknowledged) in demo_alerts {
        alerts::insert_alert(
            conn,
            &InsertAlert {
                server_id: server_ids.get(idx).copied(),
                vm_id: None,
                kind,
                message: message.to_owned(),
                acknowledged,
            },
        )
        .await?;
    }

    info!(
        "seeded demo data: {} servers, {} alerts",
        server_ids.len(),
        demo_alerts.len()
    );

    Ok(true)
}
