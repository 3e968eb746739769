use hyper::StatusCode;

use super::{json_response, ApiResult};
use crate::models::DashboardStats;
use crate::persistence::{alerts, servers, virtual_machines, SQLConnection};

pub async fn get_dashboard_stats(conn: &SQLConnection) -> ApiResult {
    let servers = servers::fetch_servers(conn).await?;
    let vms = virtual_machines::fetch_vms(conn).await?;
    let active_alerts = alerts::fetch_active_alerts(conn).await?;

    let stats = DashboardStats::compute(&servers, &vms, &active_alerts);

    json_response(StatusCode::OK, &stats)
}
