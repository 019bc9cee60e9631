//! Churn Dashboard - Customer churn analytics over the Telco dataset.
//!
//! The library holds the derived-metrics pipeline (loading, enrichment,
//! filtering, aggregation) plus the egui dashboard and static chart export
//! that render its output.

pub mod charts;
pub mod data;
pub mod gui;
pub mod stats;
