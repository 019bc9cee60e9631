//! Churn Dashboard - Customer Churn Analytics
//!
//! Loads the Telco churn dataset once and opens the interactive dashboard.

use anyhow::Context;
use churn_dashboard::data;
use churn_dashboard::gui::ChurnDashboardApp;
use eframe::egui;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    // A missing or unreadable dataset aborts startup
    let dataset = data::load().context("Cannot build dashboard")?;

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1500.0, 950.0])
            .with_min_inner_size([1200.0, 700.0])
            .with_title("Churn Analytics Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Churn Analytics Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(ChurnDashboardApp::new(cc, dataset)))),
    )
    .map_err(|e| anyhow::anyhow!("Dashboard window failed: {}", e))
}
