use hyper::{Body, Request, StatusCode};
use log::info;

use super::{json_response, no_content, read_json_body, ApiResult};
use crate::error::ApiError;
use crate::models::{InsertServer, ServerPatch};
use crate::persistence::{servers, SQLConnection};

pub async fn list_servers(conn: &SQLConnection) -> ApiResult {
    let servers = servers::fetch_servers(conn).await?;

    json_response(StatusCode::OK, &servers)
}

pub async fn get_server(conn: &SQLConnection, id: i64) -> ApiResult {
    let server = servers::fetch_server(conn, id)
        .await?
        .ok_or(ApiError::NotFound("Server"))?;

    json_response(StatusCode::OK, &server)
}

pub async fn create_server(req: Request<Body>, conn: &SQLConnection) -> ApiResult {
    let new_server = read_json_body::<InsertServer>(req, "server").await?;
    new_server.validate()?;

    let server = servers::insert_server(conn, &new_server).await?;
    info!("created server {} ({})", server.id, server.name);

    json_response(StatusCode::CREATED, &server)
}

pub async fn update_server(req: Request<Body>, conn: &SQLConnection, id: i64) -> ApiResult {
    let patch = read_json_body::<ServerPatch>(req, "server").await?;
    patch.validate()?;

    let server = servers::update_server(conn, id, &patch)
        .await?
        .ok_or(ApiError::NotFound("Server"))?;

    json_response(StatusCode::OK, &server)
}

pub async fn delete_server(conn: &SQLConnection, id: i64) -> ApiResult {
    if !servers::delete_server(conn, id).await? {
        return Err(ApiError::NotFound("Server"));
    }

    // TODO: remove the server's vms, alerts and storage rows as well
    info!("deleted server {}", id);

    Ok(no_content())
}
