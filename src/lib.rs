//! Student Wellbeing - batch compute engine for student productivity and burnout risk
//!
//! Transforms a table of daily digital-behavior metrics into derived indicators
//! through a deterministic pipeline: load → score (productivity score, burnout
//! risk, productivity level) → write, with filtered summaries on demand.
//!
//! ## Modules
//!
//! - **Scoring**: [`metrics`], [`classifier`], and [`scorer`] derive per-record fields
//! - **Reporting**: [`aggregate`] projects by day type and computes summaries;
//!   [`report`] wraps them for JSON or text output
//! - **IO**: [`loader`] and [`writer`] read and atomically persist delimited files

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod scorer;
pub mod types;
pub mod writer;

pub use aggregate::{project, summarize, DayFilter, Summary};
pub use config::{PipelineConfig, QualityPolicy};
pub use error::WellbeingError;
pub use pipeline::{process_csv, summarize_csv, RunOutcome, WellbeingPipeline};
pub use types::{
    BurnoutRisk, DayType, DerivedMetrics, ProductivityLevel, QualityIssue, ScoredRecord,
    ScoredTable, StudentRecord, Table,
};

/// Crate version embedded in every summary report
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report metadata
pub const PRODUCER_NAME: &str = "student-wellbeing";
