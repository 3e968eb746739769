use hyper::{Body, Request, StatusCode};
use log::info;

use super::{json_response, read_json_body, read_query, ApiResult, ServerFilter};
use crate::error::ApiError;
use crate::models::InsertStorage;
use crate::persistence::{servers, storage_info, SQLConnection};

pub async fn list_storage(req: Request<Body>, conn: &SQLConnection) -> ApiResult {
    let info = match read_query::<ServerFilter>(&req)?.server_id()? {
        Some(server_id) => storage_info::fetch_storage_by_server(conn, server_id).await?,
        None => storage_info::fetch_storage_info(conn).await?,
    };

    json_response(StatusCode::OK, &info)
}

/// `PUT /api/servers/:id/storage`, the body is the complete new list.
pub async fn replace_server_storage(
    req: Request<Body>,
    conn: &SQLConnection,
    server_id: i64,
) -> ApiResult {
    if servers::fetch_server(conn, server_id).await?.is_none() {
        return Err(ApiError::NotFound("Server"));
    }

    let entries = read_json_body::<Vec<InsertStorage>>(req, "storage").await?;
    for entry in &entries {
        entry.validate()?;
    }

    let rows = storage_info::replace_storage_info(conn, server_id, &entries).await?;
    info!("replaced storage of server {} with {} entries", server_id, rows.len());

    json_response(StatusCode::OK, &rows)
}
