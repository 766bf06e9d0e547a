//! Benford Workbench
//!
//! Client-side workflow for a remote Benford's-Law analysis service: stage
//! a tabular data file, upload it, request a leading-digit analysis, and
//! inspect the per-column result against Benford's expected distribution.
//!
//! This library holds everything the binaries share:
//! - `model`: analysis result types and the fixed expected series
//! - `client`: typed async HTTP client for the service endpoints
//! - `workflow`: the state machine driving upload -> analyze -> visualize
//!
//! Binaries:
//! - `benford-ui`: iced desktop interface
//! - `benford-cli`: headless command-line interface

pub mod client;
pub mod model;
pub mod workflow;

// Re-export the types nearly every caller touches.
pub use client::{ApiClient, ApiError};
pub use model::{
    AnalysisReport, AnalyzeRequest, ColumnEntry, ColumnStats, LeadDigitChart, BENFORD_EXPECTED,
};
pub use workflow::{ColumnSelect, FileRegistry, UploadStage, ValidationError, Workbench};
