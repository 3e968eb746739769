use hyper::{Body, Request, StatusCode};

use super::{json_response, read_json_body, read_query, ApiResult, ServerFilter};
use crate::error::ApiError;
use crate::models::{InsertVm, VmPatch};
use crate::persistence::{virtual_machines, SQLConnection};

pub async fn list_vms(req: Request<Body>, conn: &SQLConnection) -> ApiResult {
    let vms = match read_query::<ServerFilter>(&req)?.server_id()? {
        Some(server_id) => virtual_machines::fetch_vms_by_server(conn, server_id).await?,
        None => virtual_machines::fetch_vms(conn).await?,
    };

    json_response(StatusCode::OK, &vms)
}

pub async fn create_vm(req: Request<Body>, conn: &SQLConnection) -> ApiResult {
    let new_vm = read_json_body::<InsertVm>(req, "VM").await?;
    new_vm.validate()?;

    let vm = virtual_machines::insert_vm(conn, &new_vm).await?;

    json_response(StatusCode::CREATED, &vm)
}

pub async fn update_vm(req: Request<Body>, conn: &SQLConnection, id: i64) -> ApiResult {
    let patch = read_json_body::<VmPatch>(req, "VM").await?;
    patch.validate()?;

    let vm = virtual_machines::update_vm(conn, id, &patch)
        .await?
        .ok_or(ApiError::NotFound("VM"))?;

    json_response(StatusCode::OK, &vm)
}
