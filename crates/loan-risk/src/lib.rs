//! Deterministic, configurable risk assessment for loan origination.

pub mod assessment;
pub mod config;
pub mod error;
pub mod import;
pub mod origination;
pub mod telemetry;
