//! Request ID propagation.

use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

/// Response header carrying the generated request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware to inject request ID into all responses.
pub async fn inject_request_id(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let mut response = next.run(req).await;

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    response
}
