use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{check_non_negative, check_non_negative_int, check_not_blank, check_percentage};
use crate::error::ApiError;

// the default port of the proxmox web api
pub const DEF_PROXMOX_PORT: i64 = 8006;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ServerStatus {
    Online,
    Warning,
    Offline,
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub id: i64,
    pub name: String,
    pub host: String,
    pub port: i64,
    pub username: String,
    pub status: ServerStatus,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub memory_total: f64,
    pub uptime: Option<String>,
    pub vm_count: i64,
    pub lxc_count: i64,
    pub last_seen: DateTime<Utc>,
}

fn default_port() -> i64 {
    DEF_PROXMOX_PORT
}

/// Body of `POST /api/servers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertServer {
    pub name: String,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: i64,
    pub username: String,
    pub status: ServerStatus,
    #[serde(default)]
    pub cpu_usage: f64,
    #[serde(default)]
    pub memory_usage: f64,
    #[serde(default)]
    pub memory_total: f64,
    #[serde(default)]
    pub uptime: Option<String>,
    #[serde(default)]
    pub vm_count: i64,
    #[serde(default)]
    pub lxc_count: i64,
}

impl InsertServer {
    pub fn validate(&self) -> Result<(), ApiError> {
        check_not_blank("name", &self.name)?;
        check_not_blank("host", &self.host)?;
        check_not_blank("username", &self.username)?;
        check_port(self.port)?;
        check_percentage("cpuUsage", self.cpu_usage)?;
        check_percentage("memoryUsage", self.memory_usage)?;
        check_non_negative("memoryTotal", self.memory_total)?;
        check_non_negative_int("vmCount", self.vm_count)?;
        check_non_negative_int("lxcCount", self.lxc_count)?;

        Ok(())
    }
}

/// Body of `PATCH /api/servers/:id`, absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerPatch {
    pub name: Option<String>,
    pub host: Option<String>,
    pub port: Option<i64>,
    pub username: Option<String>,
    pub status: Option<ServerStatus>,
    pub cpu_usage: Option<f64>,
    pub memory_usage: Option<f64>,
    pub memory_total: Option<f64>,
    pub uptime: Option<String>,
    pub vm_count: Option<i64>,
    pub lxc_count: Option<i64>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl ServerPatch {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            check_not_blank("name", name)?;
        }
        if let Some(host) = &self.host {
            check_not_blank("host", host)?;
        }
        if let Some(username) = &self.username {
            check_not_blank("username", username)?;
        }
        if let Some(port) = self.port {
            check_port(port)?;
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
        if let Some(count) = self.vm_count {
            check_non_negative_int("vmCount", count)?;
        }
        if let Some(count) = self.lxc_count {
            check_non_negative_int("lxcCount", count)?;
        }

        Ok(())
    }
}

fn check_port(port: i64) -> Result<(), ApiError> {
    if !(1..=65535).contains(&port) {
        return Err(ApiError::validation("port must be between 1 and 65535"));
    }
    Ok(())
}
