use hyper::body::HttpBody;
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::error::ApiError;
use crate::persistence::SQLConnection;

pub mod _404;
pub mod alerts;
pub mod dashboard_stats;
pub mod healthcheck;
pub mod response_body;
pub mod servers;
pub mod storage;
pub mod vms;

use response_body::ResponseBody;

pub type ApiResult = Result<Response<Body>, ApiError>;

/// Upper bound for JSON request bodies.
const MAX_BODY_BYTES: usize = 1024 * 1024;

pub async fn req_handler(
    req: Request<Body>,
    conn: SQLConnection,
) -> Result<Response<Body>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = match route(req, &conn).await {
        Ok(response) => response,
        Err(err) => {
            if err.status_code().is_client_error() {
                debug!("{} {} rejected: {}", method, path, err);
            } else {
                error!("{} {} failed: {}", method, path, err);
            }
            error_response(&err)
        }
    };

    debug!("{} {} -> {}", method, path, response.status().as_u16());

    Ok(response)
}

async fn route(req: Request<Body>, conn: &SQLConnection) -> ApiResult {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (&method, segments.as_slice()) {
        (&Method::GET, ["healthcheck"]) => Ok(healthcheck::healthcheck()),

        (&Method::GET, ["api", "servers"]) => servers::list_servers(conn).await,
        (&Method::POST, ["api", "servers"]) => servers::create_server(req, conn).await,
        (&Method::GET, ["api", "servers", id]) => servers::get_server(conn, parse_id(id)?).await,
        (&Method::PATCH, ["api", "servers", id]) => {
            servers::update_server(req, conn, parse_id(id)?).await
        }
        (&Method::DELETE, ["api", "servers", id]) => {
            servers::delete_server(conn, parse_id(id)?).await
        }
        (&Method::PUT, ["api", "servers", id, "storage"]) => {
            storage::replace_server_storage(req, conn, parse_id(id)?).await
        }

        (&Method::GET, ["api", "vms"]) => vms::list_vms(req, conn).await,
        (&Method::POST, ["api", "vms"]) => vms::create_vm(req, conn).await,
        (&Method::PATCH, ["api", "vms", id]) => vms::update_vm(req, conn, parse_id(id)?).await,

        (&Method::GET, ["api", "alerts"]) => alerts::list_alerts(req, conn).await,
        (&Method::POST, ["api", "alerts"]) => alerts::create_alert(req, conn).await,
        (&Method::PATCH, ["api", "alerts", id, "acknowledge"]) => {
            alerts::acknowledge_alert(conn, parse_id(id)?).await
        }

        (&Method::GET, ["api", "storage"]) => storage::list_storage(req, conn).await,

        (&Method::GET, ["api", "dashboard", "stats"]) => {
            dashboard_stats::get_dashboard_stats(conn).await
        }

        (_, segments) if is_known_path(segments) => Err(ApiError::MethodNotAllowed),

        _ => Ok(_404::_404()),
    }
}

fn is_known_path(segments: &[&str]) -> bool {
    matches!(
        segments,
        ["healthcheck"]
            | ["api", "servers"]
            | ["api", "servers", _]
            | ["api", "servers", _, "storage"]
            | ["api", "vms"]
            | ["api", "vms", _]
            | ["api", "alerts"]
            | ["api", "alerts", _, "acknowledge"]
            | ["api", "storage"]
            | ["api", "dashboard", "stats"]
    )
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::validation(format!("Invalid id: {}", raw))),
    }
}

/// `?serverId=N` filter shared by the list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ServerFilter {
    #[serde(rename = "serverId")]
    pub server_id: Option<String>,
}

impl ServerFilter {
    /// Absent or empty means no filter.
    pub fn server_id(&self) -> Result<Option<i64>, ApiError> {
        match self.server_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<i64>()
                .map(Some)
                .map_err(|_| ApiError::validation(format!("Invalid serverId: {}", raw))),
        }
    }
}

/// Decodes the query string into `T`. A request without a query yields the
/// same as an empty one.
fn read_query<T: DeserializeOwned>(req: &Request<Body>) -> Result<T, ApiError> {
    serde_urlencoded::from_str::<T>(req.uri().query().unwrap_or(""))
        .map_err(|e| ApiError::validation(format!("Invalid query: {}", e)))
}

async fn read_body(req: Request<Body>) -> Result<Vec<u8>, ApiError> {
    let too_large =
        || ApiError::validation(format!("Request body exceeds {} bytes", MAX_BODY_BYTES));

    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.map_or(false, |len| len > MAX_BODY_BYTES as u64) {
        return Err(too_large());
    }

    let mut body = req.into_body();
    let mut buf = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk = chunk.map_err(|e| {
            warn!("failed to read request body: {}", e);
            ApiError::validation("Failed to read request body")
        })?;

        // chunked bodies carry no length up front
        if buf.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(too_large());
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(buf)
}

async fn read_json_body<T: DeserializeOwned>(req: Request<Body>, what: &str) -> Result<T, ApiError> {
    let body_bytes = read_body(req).await?;

    serde_json::from_slice::<T>(&body_bytes)
        .map_err(|e| ApiError::validation(format!("Invalid {} data: {}", what, e)))
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> ApiResult {
    let body = serde_json::to_vec(value).map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(with_body(status, "application/json", Body::from(body)))
}

fn no_content() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
}

fn with_body(status: StatusCode, content_type: &'static str, body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn error_response(err: &ApiError) -> Response<Body> {
    let body = ResponseBody::message(err.public_message());

    // serializing a single string field cannot fail
    let json = serde_json::to_vec(&body).unwrap_or_default();

    with_body(err.status_code(), "application/json", Body::from(json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::test_connection;
    use serde_json::{json, Value};

    async fn call(
        conn: &SQLConnection,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let body = match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        };
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(body)
            .unwrap();

        let response = req_handler(req, conn.clone()).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).to_string(),
            ))
        };

        (status, value)
    }

    fn server_body(name: &str, status: &str, cpu: f64, mem: f64) -> Value {
        json!({
            "name": name,
            "host": "192.168.1.10",
            "username": "root@pam",
            "status": status,
            "cpuUsage": cpu,
            "memoryUsage": mem,
            "memoryTotal": 64,
            "uptime": "4d 2h",
        })
    }

    #[tokio::test]
    async fn create_then_fetch_server_returns_identical_fields() {
        let conn = test_connection().await;

        let (status, created) = call(
            &conn,
            Method::POST,
            "/api/servers",
            Some(server_body("pve-01", "online", 12.5, 40.0)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["port"], 8006);
        assert_eq!(created["vmCount"], 0);

        let id = created["id"].as_i64().unwrap();
        let (status, fetched) = call(&conn, Method::GET, &format!("/api/servers/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, list) = call(&conn, Method::GET, "/api/servers/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_server_bodies_are_rejected() {
        let conn = test_connection().await;

        let (status, body) = call(
            &conn,
            Method::POST,
            "/api/servers",
            Some(server_body("pve-01", "rebooting", 1.0, 1.0)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().starts_with("Invalid server data"));

        let (status, _) = call(
            &conn,
            Method::POST,
            "/api/servers",
            Some(server_body("pve-01", "online", 120.0, 1.0)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &conn,
            Method::POST,
            "/api/servers",
            Some(json!({"host": "h", "username": "u", "status": "online"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, list) = call(&conn, Method::GET, "/api/servers", None).await;
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn patch_and_delete_server() {
        let conn = test_connection().await;
        let (_, created) = call(
            &conn,
            Method::POST,
            "/api/servers",
            Some(server_body("pve-01", "online", 10.0, 10.0)),
        )
        .await;
        let uri = format!("/api/servers/{}", created["id"]);

        let (status, updated) = call(
            &conn,
            Method::PATCH,
            &uri,
            Some(json!({"status": "maintenance", "name": "pve-01a"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "maintenance");
        assert_eq!(updated["name"], "pve-01a");
        assert_eq!(updated["host"], created["host"]);

        let (status, _) = call(&conn, Method::PATCH, &uri, Some(json!({"port": 70000}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(&conn, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, body) = call(&conn, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Server not found");

        let (status, _) = call(&conn, Method::PATCH, &uri, Some(json!({"name": "x"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_and_malformed_ids() {
        let conn = test_connection().await;

        let (status, _) = call(&conn, Method::DELETE, "/api/servers/12345", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&conn, Method::GET, "/api/servers/12345", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&conn, Method::GET, "/api/servers/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&conn, Method::PATCH, "/api/alerts/-1/acknowledge", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn vms_filtered_by_server() {
        let conn = test_connection().await;

        for (server_id, vmid, kind) in [(1, 100, "vm"), (2, 200, "lxc"), (1, 101, "lxc")] {
            let (status, _) = call(
                &conn,
                Method::POST,
                "/api/vms",
                Some(json!({
                    "serverId": server_id,
                    "vmid": vmid,
                    "name": format!("guest-{}", vmid),
                    "type": kind,
                    "status": "running",
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, all) = call(&conn, Method::GET, "/api/vms", None).await;
        assert_eq!(all.as_array().unwrap().len(), 3);

        let (_, filtered) = call(&conn, Method::GET, "/api/vms?serverId=1", None).await;
        let filtered = filtered.as_array().unwrap();
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|vm| vm["serverId"] == 1));

        let (_, unfiltered) = call(&conn, Method::GET, "/api/vms?serverId=", None).await;
        assert_eq!(unfiltered.as_array().unwrap().len(), 3);

        let (status, _) = call(&conn, Method::GET, "/api/vms?serverId=one", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let id = filtered[0]["id"].as_i64().unwrap();
        let (status, vm) = call(
            &conn,
            Method::PATCH,
            &format!("/api/vms/{}", id),
            Some(json!({"status": "stopped"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(vm["status"], "stopped");

        let (status, _) = call(&conn, Method::PATCH, "/api/vms/999", Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn alerts_and_dashboard_stats() {
        let conn = test_connection().await;

        call(&conn, Method::POST, "/api/servers", Some(server_body("a", "online", 10.0, 20.0))).await;
        call(&conn, Method::POST, "/api/servers", Some(server_body("b", "offline", 15.0, 45.0))).await;
        call(
            &conn,
            Method::POST,
            "/api/vms",
            Some(json!({"serverId": 1, "vmid": 100, "name": "db", "type": "vm", "status": "running"})),
        )
        .await;

        let mut ids = vec![];
        for (kind, message) in [("warning", "cpu high"), ("critical", "disk full"), ("info", "backup")] {
            let (status, alert) = call(
                &conn,
                Method::POST,
                "/api/alerts",
                Some(json!({"type": kind, "message": message, "serverId": 1})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(alert["acknowledged"], false);
            ids.push(alert["id"].as_i64().unwrap());
        }

        let ack_uri = format!("/api/alerts/{}/acknowledge", ids[0]);
        let (status, acked) = call(&conn, Method::PATCH, &ack_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(acked["acknowledged"], true);
        let (status, _) = call(&conn, Method::PATCH, &ack_uri, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&conn, Method::PATCH, "/api/alerts/999/acknowledge", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, active) = call(&conn, Method::GET, "/api/alerts?active=true", None).await;
        assert_eq!(active.as_array().unwrap().len(), 2);
        let (_, all) = call(&conn, Method::GET, "/api/alerts?active=false", None).await;
        assert_eq!(all.as_array().unwrap().len(), 3);

        let (status, stats) = call(&conn, Method::GET, "/api/dashboard/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["totalServers"], 2);
        assert_eq!(stats["onlineServers"], 1);
        assert_eq!(stats["totalVMs"], 1);
        assert_eq!(stats["totalLXC"], 0);
        assert_eq!(stats["avgCPU"], 12.5);
        assert_eq!(stats["avgMemory"], 32.5);
        assert_eq!(stats["activeAlerts"], 2);
    }

    #[tokio::test]
    async fn dashboard_stats_on_empty_database() {
        let conn = test_connection().await;

        let (status, stats) = call(&conn, Method::GET, "/api/dashboard/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["totalServers"], 0);
        assert_eq!(stats["avgCPU"], 0.0);
        assert_eq!(stats["avgMemory"], 0.0);
    }

    #[tokio::test]
    async fn storage_replace_and_filter() {
        let conn = test_connection().await;
        let (_, server) = call(
            &conn,
            Method::POST,
            "/api/servers",
            Some(server_body("pve-01", "online", 1.0, 1.0)),
        )
        .await;
        let uri = format!("/api/servers/{}/storage", server["id"]);

        let (status, rows) = call(
            &conn,
            Method::PUT,
            &uri,
            Some(json!([
                {"storage": "local", "used": 20.5, "total": 100, "type": "dir"},
                {"storage": "local-lvm", "used": 300, "total": 900, "type": "lvmthin"},
            ])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rows.as_array().unwrap().len(), 2);
        assert_eq!(rows[0]["serverId"], server["id"]);

        let (_, listed) = call(
            &conn,
            Method::GET,
            &format!("/api/storage?serverId={}", server["id"]),
            None,
        )
        .await;
        assert_eq!(listed, rows);

        let (_, other) = call(&conn, Method::GET, "/api/storage?serverId=999", None).await;
        assert!(other.as_array().unwrap().is_empty());

        let (status, _) = call(&conn, Method::PUT, "/api/servers/999/storage", Some(json!([]))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(
            &conn,
            Method::PUT,
            &uri,
            Some(json!([{"storage": "", "used": 1, "total": 2, "type": "dir"}])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn fallback_routes() {
        let conn = test_connection().await;

        let (status, body) = call(&conn, Method::GET, "/api/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["message"].is_string());

        let (status, _) = call(&conn, Method::DELETE, "/api/vms", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, body) = call(&conn, Method::GET, "/healthcheck", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_string());
    }

    #[tokio::test]
    async fn database_failures_hide_details() {
        let conn = test_connection().await;
        conn.close().await;

        let (status, body) = call(&conn, Method::GET, "/api/servers", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }

    #[tokio::test]
    async fn encoded_query_values_are_decoded() {
        let conn = test_connection().await;

        for (server_id, vmid) in [(1, 100), (2, 101)] {
            call(
                &conn,
                Method::POST,
                "/api/vms",
                Some(json!({
                    "serverId": server_id,
                    "vmid": vmid,
                    "name": format!("guest-{}", vmid),
                    "type": "vm",
                    "status": "running",
                })),
            )
            .await;
        }

        let (status, vms) = call(&conn, Method::GET, "/api/vms?serverId=%31", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(vms.as_array().unwrap().len(), 1);
        assert_eq!(vms[0]["serverId"], 1);

        // the key is decoded too, so a bad value is still caught
        let (status, _) = call(&conn, Method::GET, "/api/storage?server%49d=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&conn, Method::GET, "/api/vms?serverId=%20", None).await;
        assert_eq!(status, StatusCode::OK);

        let mut ids = vec![];
        for message in ["one", "two"] {
            let (_, alert) = call(
                &conn,
                Method::POST,
                "/api/alerts",
                Some(json!({"type": "info", "message": message})),
            )
            .await;
            ids.push(alert["id"].as_i64().unwrap());
        }
        let ack_uri = format!("/api/alerts/{}/acknowledge", ids[1]);
        call(&conn, Method::PATCH, &ack_uri, None).await;

        let (status, active) = call(&conn, Method::GET, "/api/alerts?active=%74rue", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(active.as_array().unwrap().len(), 1);
        assert_eq!(active[0]["message"], "one");
    }

    #[test]
    fn server_filter_parsing() {
        let req = Request::builder()
            .uri("/api/vms?active=true&serverId=42&flag")
            .body(Body::empty())
            .unwrap();
        let filter = read_query::<ServerFilter>(&req).unwrap();
        assert_eq!(filter.server_id().unwrap(), Some(42));

        let req = Request::builder().uri("/api/vms").body(Body::empty()).unwrap();
        let filter = read_query::<ServerFilter>(&req).unwrap();
        assert_eq!(filter.server_id().unwrap(), None);

        let filter = ServerFilter {
            server_id: Some("".to_string()),
        };
        assert_eq!(filter.server_id().unwrap(), None);

        let filter = ServerFilter {
            server_id: Some("x1".to_string()),
        };
        assert!(filter.server_id().is_err());
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() {
        let conn = test_connection().await;

        let padding = "x".repeat(MAX_BODY_BYTES);
        let (status, body) = call(
            &conn,
            Method::POST,
            "/api/servers",
            Some(json!({"name": padding, "host": "h", "username": "u", "status": "online"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().starts_with("Request body exceeds"));

        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/alerts")
            .header(CONTENT_LENGTH, (MAX_BODY_BYTES + 1).to_string())
            .body(Body::from("{}"))
            .unwrap();
        let response = req_handler(req, conn.clone()).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let (_, list) = call(&conn, Method::GET, "/api/servers", None).await;
        assert!(list.as_array().unwrap().is_empty());
    }
}
