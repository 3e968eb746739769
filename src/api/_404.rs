use hyper::{Body, Response, StatusCode};

use super::{error_response, response_body::ResponseBody, with_body};

pub fn _404() -> Response<Body> {
    let body = ResponseBody::message("The requested resource was not found.");

    match serde_json::to_vec(&body) {
        Ok(json) => with_body(StatusCode::NOT_FOUND, "application/json", Body::from(json)),
        Err(e) => error_response(&crate::error::ApiError::Internal(e.to_string())),
    }
}
