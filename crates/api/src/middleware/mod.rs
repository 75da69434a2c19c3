//! Request middleware.
//!
//! - [`rate_limit::enforce_rate_limit`] -- Per-client sliding-window quota
//!   for proxy routes and report submission.

pub mod rate_limit;
