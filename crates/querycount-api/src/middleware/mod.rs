//! Request middleware.

pub mod cors;
pub mod request_id;

pub use cors::cors_middleware;
pub use request_id::inject_request_id;
