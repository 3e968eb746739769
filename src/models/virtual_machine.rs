use serde::{Deserialize, Serialize};

use super::{check_non_negative, check_not_blank, check_percentage, check_positive_id};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum VmType {
    Vm,
    Lxc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum VmStatus {
    Running,
    Stopped,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachine {
    pub id: i64,
    // not enforced, the server may be gone
    pub server_id: i64,
    pub vmid: i64,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: VmType,
    pub status: VmStatus,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub memory_total: f64,
    pub uptime: Option<String>,
    pub node: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertVm {
    pub server_id: i64,
    pub vmid: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VmType,
    pub status: VmStatus,
    #[serde(default)]
    pub cpu_usage: f64,
    #[serde(default)]
    pub memory_usage: f64,
    #[serde(default)]
    pub memory_total: f64,
    #[serde(default)]
    pub uptime: Option<String>,
    #[serde(default)]
    pub node: Option<String>,
}

impl InsertVm {
    pub fn validate(&self) -> Result<(), ApiError> {
        check_positive_id("serverId", self.server_id)?;
        check_positive_id("vmid", self.vmid)?;
        check_not_blank("name", &self.name)?;
        check_percentage("cpuUsage", self.cpu_usage)?;
        check_percentage("memoryUsage", self.memory_usage)?;
        check_non_negative("memoryTotal", self.memory_total)?;

        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmPatch {
    pub server_id: Option<i64>,
    pub vmid: Option<i64>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<VmType>,
    pub status: Option<VmStatus>,
    pub cpu_usage: Option<f64>,
    pub memory_usage: Option<f64>,
    pub memory_total: Option<f64>,
    pub uptime: Option<String>,
    pub node: Option<String>,
}

impl VmPatch {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(server_id) = self.server_id {
            check_positive_id("serverId", server_id)?;
        }
        if let Some(vmid) = self.vmid {
            check_positive_id("vmid", vmid)?;
        }
        if let Some(name) = &self.name {
            check_not_blank("name", name)?;
        }
        if let Some(cpu) = self.cpu_usage {
            check_percentage("cpuUsage", cpu)?;
        }
        if let Some(mem) = self.memory_usage {
            check_percentage("memoryUsage", mem)?;
        }
        if let Some(total) = self.memory_total {
            check_non_negative("memoryTotal", total)?;
        }

        Ok(())
    }
}
