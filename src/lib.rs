//! # Run Insights
//!
//! A batch statistics engine for newline-delimited JSON game-run logs.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (runs, lookup tables, insight tables)
//! - **corpus**: Log ingestion, date-keyed batches, bucketing, binary cache
//! - **insights**: Shared aggregation primitives and the analysis catalog
//! - **report**: Console and file renderers
//! - **sheets**: Google Sheets publishing
//! - **config**: Configuration loading and validation

pub mod config;
pub mod corpus;
pub mod insights;
pub mod models;
pub mod report;
pub mod sheets;

pub use models::*;
