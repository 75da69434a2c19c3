//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod flood_alert_repo;
pub mod flood_report_repo;
pub mod shelter_repo;

pub use flood_alert_repo::FloodAlertRepo;
pub use flood_report_repo::{FloodReportFilter, FloodReportRepo};
pub use shelter_repo::ShelterRepo;
