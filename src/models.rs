pub mod alert;
pub mod dashboard_stats;
pub mod server;
pub mod storage_info;
pub mod virtual_machine;

pub use alert::{Alert, AlertType, InsertAlert};
pub use dashboard_stats::DashboardStats;
pub use server::{InsertServer, Server, ServerPatch, ServerStatus};
pub use storage_info::{InsertStorage, StorageInfo};
pub use virtual_machine::{InsertVm, VirtualMachine, VmPatch, VmStatus, VmType};

use crate::error::ApiError;

// shared field checks for the insert and patch bodies

pub(crate) fn check_not_blank(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub(crate) fn check_percentage(field: &str, value: f64) -> Result<(), ApiError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(ApiError::validation(format!(
            "{} must be between 0 and 100",
            field
        )));
    }
    Ok(())
}

pub(crate) fn check_non_negative(field: &str, value: f64) -> Result<(), ApiError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ApiError::validation(format!(
            "{} must be a non-negative number",
            field
        )));
    }
    Ok(())
}

pub(crate) fn check_non_negative_int(field: &str, value: i64) -> Result<(), ApiError> {
    if value < 0 {
        return Err(ApiError::validation(format!(
            "{} must not be negative",
            field
        )));
    }
    Ok(())
}

pub(crate) fn check_positive_id(field: &str, value: i64) -> Result<(), ApiError> {
    if value <= 0 {
        return Err(ApiError::validation(format!(
            "{} must be a positive integer",
            field
        )));
    }
    Ok(())
}
