//! Churn Dashboard Main Application
//! Main window with the filter panel and the dashboard viewer.

use crate::charts::StaticChartRenderer;
use crate::data::{EnrichedDataset, FilterOptions};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::stats::DashboardSummary;
use anyhow::Context;
use egui::SidePanel;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// PNG export size
const EXPORT_WIDTH: u32 = 1600;
const EXPORT_HEIGHT: u32 = 1100;

/// Main application window.
pub struct ChurnDashboardApp {
    dataset: Arc<EnrichedDataset>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    summary: DashboardSummary,
}

impl ChurnDashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, dataset: Arc<EnrichedDataset>) -> Self {
        let options = FilterOptions::from_dataset(&dataset);
        let control_panel = ControlPanel::new(options, dataset.len(), dataset.skipped_rows());

        let mut app = Self {
            dataset,
            control_panel,
            chart_viewer: ChartViewer::new(),
            summary: DashboardSummary::default(),
        };
        app.recompute();
        app
    }

    /// Filter and aggregate for the current selection.
    fn recompute(&mut self) {
        let view = self.control_panel.selection.apply(&self.dataset);
        self.summary = DashboardSummary::compute(&view, self.dataset.len());
    }

    fn pick_save_path(filter_name: &str, extension: &str, default_name: &str) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .add_filter(filter_name, &[extension])
            .set_file_name(default_name)
            .save_file()
    }

    /// Handle PNG export - render the overview and open it
    fn handle_export_png(&mut self) {
        let Some(path) = Self::pick_save_path("PNG Image", "png", "churn_dashboard.png") else {
            return;
        };

        self.control_panel.set_status("Rendering charts...");
        let result = StaticChartRenderer::render_overview_png(
            &self.summary,
            &path,
            EXPORT_WIDTH,
            EXPORT_HEIGHT,
        )
        .map_err(anyhow::Error::from)
        .and_then(|()| Self::open_exported(&path));
        self.report_export(&path, result);
    }

    /// Handle JSON export - write the summary snapshot
    fn handle_export_json(&mut self) {
        let Some(path) = Self::pick_save_path("JSON", "json", "churn_summary.json") else {
            return;
        };

        let result = Self::write_json(&self.summary, &path);
        self.report_export(&path, result);
    }

    fn write_json(summary: &DashboardSummary, path: &Path) -> anyhow::Result<()> {
        let json = summary.to_json().context("Failed to serialize summary")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn open_exported(path: &Path) -> anyhow::Result<()> {
        open::that(path).with_context(|| format!("Failed to open {}", path.display()))
    }

    fn report_export(&mut self, path: &Path, result: anyhow::Result<()>) {
        match result {
            Ok(()) => {
                info!(path = %path.display(), "Export complete");
                self.control_panel
                    .set_status(&format!("Exported {}", path.display()));
            }
            Err(e) => {
                error!(error = %e, "Export failed");
                self.control_panel.set_status(&format!("Error: {:#}", e));
            }
        }
    }
}

impl eframe::App for ChurnDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Filters
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::FiltersChanged => self.recompute(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::ExportJson => self.handle_export_json(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui, &self.summary);
        });
    }
}
