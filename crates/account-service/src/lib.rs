//! Account management for the video platform: registration with media
//! uploads, cookie-based sessions with refresh token rotation, channel
//! profiles, and watch history.
//!
//! Requests flow through `routes` into `handlers`, which stay thin and
//! delegate to `services` for the actual logic; `repositories` owns all
//! SQL. `crypto`, `cookies`, and `uploads` are leaf helpers, and
//! `middleware` covers bearer-token extraction plus per-request metrics.

pub mod config;
pub mod cookies;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod uploads;
