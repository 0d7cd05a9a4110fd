//! Middleware for the account service.
//!
//! # Components
//!
//! - `auth` - Access token authentication for protected routes
//! - `http_metrics` - HTTP request metrics middleware

pub mod auth;
pub mod http_metrics;

pub use auth::{require_auth, AuthState, CurrentAccount};
pub use http_metrics::http_metrics_middleware;
