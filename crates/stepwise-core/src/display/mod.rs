//! Display formatting for models and run reports.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! run reports go through the [`RunSummary`] wrapper so the same plan can be
//! shown either as a plan listing or as the outcome of a run.
//!
//! - [`datetime`]: Timestamp and duration formatting
//! - [`models`]: Display implementations for domain models
//! - [`summary`]: Run summary wrapper and [`SummaryGenerator`]

pub mod datetime;
pub mod models;
pub mod summary;

pub use datetime::{Elapsed, LocalDateTime};
pub use summary::{RunSummary, SummaryGenerator, NOTHING_EXECUTED};
