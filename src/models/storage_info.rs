use serde::{Deserialize, Serialize};

use super::{check_non_negative, check_not_blank};
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    pub id: i64,
    pub server_id: i64,
    // the storage name as configured on the node, e.g. local-lvm
    pub storage: String,
    pub used: f64,
    pub total: f64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

/// A single storage entry. The owning server comes from the request path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertStorage {
    pub storage: String,
    pub used: f64,
    pub total: f64,
    #[serde(rename = "type")]
    pub kind: String,
}

impl InsertStorage {
    pub fn validate(&self) -> Result<(), ApiError> {
        check_not_blank("storage", &self.storage)?;
        check_not_blank("type", &self.kind)?;
        check_non_negative("used", self.used)?;
        check_non_negative("total", self.total)?;

        Ok(())
    }
}
