//! Repository health, trend and newcomer-readiness scoring.
//!
//! The three entry points are [`score::compute_health_snapshot`],
//! [`trend::compute_trend_derived`] and [`newcomer::recommend_for_newcomer`];
//! everything else supports them or the `repo-pulse` binary.

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod newcomer;
pub mod normalize;
pub mod report;
pub mod score;
pub mod store;
pub mod trend;
pub mod types;

pub use error::{PulseError, Result};
