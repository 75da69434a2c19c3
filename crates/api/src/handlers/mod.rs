//! Request handlers.
//!
//! Database-backed handlers delegate to the repositories in `floodwatch_db`;
//! proxy handlers go through the shared cache and the provider clients in
//! `floodwatch_upstream`. Errors are mapped via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod alerts;
pub mod flood_reports;
pub mod proxy;
pub mod shelters;
