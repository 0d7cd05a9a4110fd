//! Service layer for the account service.
//!
//! This module contains the business logic between the HTTP handlers and the
//! repositories, plus the outbound media upload client.
//!
//! # Components
//!
//! - `account_service` - registration and account detail/media management
//! - `media_client` - HTTP client for the media upload service
//! - `profile_service` - channel profiles and watch history
//! - `session_service` - login, logout, refresh rotation, password changes
//! - `token_service` - signed access/refresh token pair issuance

pub mod account_service;
pub mod media_client;
pub mod profile_service;
pub mod session_service;
pub mod token_service;

pub use media_client::MediaClient;
