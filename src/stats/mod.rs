//! Stats module - Churn aggregations

pub mod calculator;
mod summary;

pub use calculator::ChurnCalculator;
pub use summary::{DashboardSummary, HighRiskRow, ScatterPoint};
