//! Control Panel Widget
//! Left side panel with the four multi-select filters and export buttons.

use crate::data::{FilterOptions, FilterSelection};
use egui::{Color32, RichText};
use std::collections::BTreeSet;

/// Left side control panel with filter checkboxes and export controls.
pub struct ControlPanel {
    pub options: FilterOptions,
    pub selection: FilterSelection,
    pub dataset_size: usize,
    pub skipped_rows: usize,
    pub status: String,
}

impl ControlPanel {
    /// Build with every observed value selected.
    pub fn new(options: FilterOptions, dataset_size: usize, skipped_rows: usize) -> Self {
        let selection = FilterSelection::all(&options);
        Self {
            options,
            selection,
            dataset_size,
            skipped_rows,
            status: "Ready".to_string(),
        }
    }

    /// Checkbox group for one filter dimension. Returns true when it changed.
    fn multi_select<T: Ord + Clone>(
        ui: &mut egui::Ui,
        title: &str,
        values: &[T],
        selected: &mut BTreeSet<T>,
        label: impl Fn(&T) -> String,
    ) -> bool {
        let mut changed = false;

        ui.label(RichText::new(title).size(11.0).color(Color32::GRAY));
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(6.0)
            .show(ui, |ui| {
                for value in values {
                    let mut checked = selected.contains(value);
                    if ui.checkbox(&mut checked, label(value)).changed() {
                        if checked {
                            selected.insert(value.clone());
                        } else {
                            selected.remove(value);
                        }
                        changed = true;
                    }
                }

                ui.horizontal(|ui| {
                    if ui.small_button("All").clicked() {
                        *selected = values.iter().cloned().collect();
                        changed = true;
                    }
                    if ui.small_button("None").clicked() {
                        selected.clear();
                        changed = true;
                    }
                });
            });
        ui.add_space(8.0);

        changed
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("CHURN ANALYTICS")
                    .size(20.0)
                    .color(Color32::from_rgb(74, 222, 128)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Filters =====
        ui.label(RichText::new("FILTERS").size(14.0).strong());
        ui.add_space(5.0);

        let mut changed = Self::multi_select(
            ui,
            "CONTRACT TYPE",
            &self.options.contracts,
            &mut self.selection.contracts,
            |v| v.clone(),
        );
        changed |= Self::multi_select(
            ui,
            "INTERNET SERVICE",
            &self.options.internet_services,
            &mut self.selection.internet_services,
            |v| v.clone(),
        );
        changed |= Self::multi_select(
            ui,
            "TENURE GROUP",
            &self.options.tenure_groups,
            &mut self.selection.tenure_groups,
            |v| v.label().to_string(),
        );
        changed |= Self::multi_select(
            ui,
            "SENIOR CITIZEN",
            &self.options.senior_labels,
            &mut self.selection.senior_labels,
            |v| v.as_str().to_string(),
        );

        if changed {
            action = ControlPanelAction::FiltersChanged;
        }

        if ui.button("Reset filters").clicked() {
            self.selection = FilterSelection::all(&self.options);
            action = ControlPanelAction::FiltersChanged;
        }

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        let caption = if self.skipped_rows > 0 {
            format!(
                "Dataset: {} customers ({} rows skipped) · Telco Churn",
                self.dataset_size, self.skipped_rows
            )
        } else {
            format!("Dataset: {} customers · Telco Churn", self.dataset_size)
        };
        ui.label(RichText::new(caption).size(11.0).color(Color32::GRAY));

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.label(RichText::new("EXPORT").size(14.0).strong());
        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if ui.button("Export PNG").clicked() {
                action = ControlPanelAction::ExportPng;
            }
            if ui.button("Export JSON").clicked() {
                action = ControlPanelAction::ExportJson;
            }
        });

        ui.add_space(5.0);
        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    FiltersChanged,
    ExportPng,
    ExportJson,
}
