pub mod catalog;
pub mod config;
pub mod metrics;
pub mod report;
pub mod scoring;
