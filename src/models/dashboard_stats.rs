use serde::{Deserialize, Serialize};

use super::{Alert, Server, ServerStatus, VirtualMachine, VmType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(rename = "totalServers")]
    pub total_servers: usize,
    #[serde(rename = "onlineServers")]
    pub online_servers: usize,
    #[serde(rename = "totalVMs")]
    pub total_vms: usize,
    #[serde(rename = "totalLXC")]
    pub total_lxc: usize,
    #[serde(rename = "avgCPU")]
    pub avg_cpu: f64,
    #[serde(rename = "avgMemory")]
    pub avg_memory: f64,
    #[serde(rename = "activeAlerts")]
    pub active_alerts: usize,
}

impl DashboardStats {
    pub fn compute(servers: &[Server], vms: &[VirtualMachine], alerts: &[Alert]) -> Self {
        DashboardStats {
            total_servers: servers.len(),
            online_servers: servers
                .iter()
                .filter(|s| s.status == ServerStatus::Online)
                .count(),
            total_vms: vms.iter().filter(|vm| vm.kind == VmType::Vm).count(),
            total_lxc: vms.iter().filter(|vm| vm.kind == VmType::Lxc).count(),
            avg_cpu: round_one_decimal(mean(servers.iter().map(|s| s.cpu_usage))),
            avg_memory: round_one_decimal(mean(servers.iter().map(|s| s.memory_usage))),
            // callers may pass the full alert list
            active_alerts: alerts.iter().filter(|a| !a.acknowledged).count(),
        }
    }
}

fn mean<I>(values: I) -> f64
where
    I: ExactSizeIterator<Item = f64>,
{
    let len = values.len();
    let sum: Option<f64> = values.reduce(|a, b| a + b);

    match sum {
        Some(sum) => sum / len as f64,
        None => 0.0,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
