//! Chart Viewer Widget
//! Central scrollable panel: KPI cards, chart sections and the high-risk table.

use crate::charts::plotter::{AMBER, BLUE, GREEN, MUTED, RED};
use crate::charts::ChartPlotter;
use crate::stats::DashboardSummary;
use egui::{Color32, RichText, ScrollArea};

const CARD_SPACING: f32 = 12.0;
const KPI_CARD_WIDTH: f32 = 170.0;

/// Signature shared by every chart drawing function.
type DrawChart = fn(&mut egui::Ui, &DashboardSummary);

/// Scrollable dashboard display.
#[derive(Default)]
pub struct ChartViewer;

impl ChartViewer {
    pub fn new() -> Self {
        Self
    }

    /// Draw the dashboard for the current summary
    pub fn show(&mut self, ui: &mut egui::Ui, summary: &DashboardSummary) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(RichText::new("Customer Churn Analytics").size(26.0).strong());
                ui.label(
                    RichText::new(format!(
                        "Showing {} of {} customers after filters",
                        summary.totals.total, summary.dataset_size
                    ))
                    .size(13.0)
                    .color(MUTED),
                );
                ui.add_space(CARD_SPACING);

                Self::draw_kpi_row(ui, summary);

                Self::section_header(ui, "CHURN DRIVERS");
                Self::chart_row(
                    ui,
                    summary,
                    &[
                        ("Churn by Contract Type", ChartPlotter::draw_contract_chart as DrawChart),
                        ("Churn Rate by Tenure Group", ChartPlotter::draw_tenure_chart as DrawChart),
                    ],
                );
                Self::chart_row(
                    ui,
                    summary,
                    &[
                        (
                            "Monthly Charges Distribution",
                            ChartPlotter::draw_charge_distribution as DrawChart,
                        ),
                        ("Churn by Internet Service", ChartPlotter::draw_internet_chart as DrawChart),
                    ],
                );

                Self::section_header(ui, "RISK SEGMENTATION");
                Self::chart_row(
                    ui,
                    summary,
                    &[
                        ("Risk Distribution", ChartPlotter::draw_risk_distribution as DrawChart),
                        ("Churn Rate per Risk Tier", ChartPlotter::draw_risk_tier_chart as DrawChart),
                        (
                            "Customer Landscape: Tenure vs Monthly Charges",
                            ChartPlotter::draw_landscape_scatter as DrawChart,
                        ),
                    ],
                );

                Self::section_header(ui, "RETENTION INSIGHTS");
                Self::chart_row(
                    ui,
                    summary,
                    &[
                        (
                            "Churn Rate: With vs Without Add-on Services",
                            ChartPlotter::draw_add_on_chart as DrawChart,
                        ),
                        ("Churn Rate by Payment Method", ChartPlotter::draw_payment_chart as DrawChart),
                    ],
                );

                Self::section_header(ui, "HIGH RISK CUSTOMERS");
                ChartPlotter::draw_high_risk_table(ui, &summary.high_risk);
                ui.add_space(CARD_SPACING * 2.0);
            });
    }

    fn section_header(ui: &mut egui::Ui, title: &str) {
        ui.add_space(CARD_SPACING * 2.0);
        ui.label(RichText::new(title).size(12.0).strong().color(GREEN));
        ui.separator();
        ui.add_space(CARD_SPACING);
    }

    /// Charts laid out side by side with equal widths.
    fn chart_row(ui: &mut egui::Ui, summary: &DashboardSummary, charts: &[(&str, DrawChart)]) {
        let count = charts.len().max(1) as f32;
        let width = (ui.available_width() - CARD_SPACING * (count - 1.0)) / count;

        ui.horizontal_top(|ui| {
            for (title, draw) in charts {
                ui.vertical(|ui| {
                    ui.set_width(width);
                    ui.label(RichText::new(*title).size(14.0).strong());
                    draw(ui, summary);
                });
                ui.add_space(CARD_SPACING);
            }
        });
        ui.add_space(CARD_SPACING);
    }

    fn draw_kpi_row(ui: &mut egui::Ui, summary: &DashboardSummary) {
        let totals = &summary.totals;
        ui.horizontal_wrapped(|ui| {
            Self::kpi_card(
                ui,
                "TOTAL CUSTOMERS",
                totals.total.to_string(),
                "in filtered view",
                BLUE,
            );
            Self::kpi_card(
                ui,
                "CHURNED",
                totals.churned.to_string(),
                &format!("{:.1}% churn rate", totals.churn_rate),
                RED,
            );
            Self::kpi_card(
                ui,
                "AVG TENURE",
                format!("{:.0} mo", totals.mean_tenure),
                "months retained",
                GREEN,
            );
            Self::kpi_card(
                ui,
                "AVG MONTHLY $",
                format!("${:.0}", totals.mean_monthly_charge),
                "per customer",
                AMBER,
            );
            Self::kpi_card(
                ui,
                "REVENUE AT RISK",
                format!("${:.0}", totals.revenue_at_risk),
                "monthly from churned",
                RED,
            );
            Self::kpi_card(
                ui,
                "HIGH RISK",
                totals.high_risk.to_string(),
                "customers in High Risk tier",
                RED,
            );
        });
    }

    fn kpi_card(ui: &mut egui::Ui, label: &str, value: String, delta: &str, accent: Color32) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, accent.gamma_multiply(0.6)))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(KPI_CARD_WIDTH);
                ui.vertical(|ui| {
                    ui.label(RichText::new(label).size(10.0).color(MUTED));
                    ui.label(RichText::new(value).size(24.0).strong());
                    ui.label(RichText::new(delta).size(11.0).color(MUTED));
                });
            });
        ui.add_space(CARD_SPACING);
    }
}
