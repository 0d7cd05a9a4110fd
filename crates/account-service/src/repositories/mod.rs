//! Database access layer.
//!
//! Each submodule owns the queries for one table. Business rules live in
//! the services layer; functions here translate rows and database errors
//! only.

pub mod accounts;
pub mod subscriptions;
pub mod watch_history;
