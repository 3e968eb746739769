use hyper::{Body, Request, StatusCode};
use log::warn;
use serde::Deserialize;

use super::{json_response, read_json_body, read_query, ApiResult};
use crate::error::ApiError;
use crate::models::{AlertType, InsertAlert};
use crate::persistence::{alerts, SQLConnection};

#[derive(Debug, Default, Deserialize)]
pub struct AlertListParams {
    pub active: Option<String>,
}

pub async fn list_alerts(req: Request<Body>, conn: &SQLConnection) -> ApiResult {
    let params = read_query::<AlertListParams>(&req)?;
    // anything but an explicit "true" lists every alert
    let active_only = params.active.as_deref() == Some("true");

    let alerts = if active_only {
        alerts::fetch_active_alerts(conn).await?
    } else {
        alerts::fetch_alerts(conn).await?
    };

    json_response(StatusCode::OK, &alerts)
}

pub async fn create_alert(req: Request<Body>, conn: &SQLConnection) -> ApiResult {
    let new_alert = read_json_body::<InsertAlert>(req, "alert").await?;
    new_alert.validate()?;

    let alert = alerts::insert_alert(conn, &new_alert).await?;
    if alert.kind == AlertType::Critical {
        warn!("critical alert {}: {}", alert.id, alert.message);
    }

    json_response(StatusCode::CREATED, &alert)
}

pub async fn acknowledge_alert(conn: &SQLConnection, id: i64) -> ApiResult {
    let alert = alerts::acknowledge_alert(conn, id)
        .await?
        .ok_or(ApiError::NotFound("Alert"))?;

    json_response(StatusCode::OK, &alert)
}
