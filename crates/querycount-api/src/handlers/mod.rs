//! HTTP request handlers.
//!
//! Handlers take `AppState`, return `Result<_, ApiError>`, and leave CORS
//! to the router's middleware.

pub mod submissions;

pub use submissions::{create_submission, list_recent};
