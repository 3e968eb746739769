use hyper::{Body, Response, StatusCode};

use super::with_body;

pub fn healthcheck() -> Response<Body> {
    with_body(StatusCode::OK, "text/plain", Body::from("Running smoothly!"))
}
