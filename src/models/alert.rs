use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{check_not_blank, check_positive_id};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AlertType {
    Warning,
    Critical,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: i64,
    pub server_id: Option<i64>,
    pub vm_id: Option<i64>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: AlertType,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub acknowledged: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAlert {
    #[serde(default)]
    pub server_id: Option<i64>,
    #[serde(default)]
    pub vm_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: AlertType,
    pub message: String,
    #[serde(default)]
    pub acknowledged: bool,
}

impl InsertAlert {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(server_id) = self.server_id {
            check_positive_id("serverId", server_id)?;
        }
        if let Some(vm_id) = self.vm_id {
            check_positive_id("vmId", vm_id)?;
        }
        check_not_blank("message", &self.message)?;

        Ok(())
    }
}
