//! HTTP handlers for the account service.
//!
//! Handlers stay thin: they parse the request, call into the service
//! layer, and wrap the result in the uniform response envelope.
//!
//! # Components
//!
//! - `accounts` - Registration, current account, details and media updates
//! - `health` - Liveness and readiness probes
//! - `metrics` - Prometheus scrape endpoint
//! - `profiles` - Channel pages and watch history
//! - `sessions` - Login, logout, refresh and password changes

pub mod accounts;
pub mod health;
pub mod metrics;
pub mod profiles;
pub mod sessions;

pub use accounts::{current_account, register, update_avatar, update_cover_image, update_details};
pub use health::{health_check, readiness_check};
pub use metrics::metrics_handler;
pub use profiles::{channel_profile, watch_history};
pub use sessions::{change_password, login, logout, refresh_token};
