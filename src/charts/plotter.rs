//! Chart Plotter Module
//! Creates the interactive dashboard charts using egui_plot.

use crate::data::RiskTier;
use crate::stats::calculator::{ChargeHistogram, RiskTierChurn};
use crate::stats::{DashboardSummary, HighRiskRow};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text};
use std::ops::RangeInclusive;

/// Dashboard palette
pub const GREEN: Color32 = Color32::from_rgb(74, 222, 128);
pub const RED: Color32 = Color32::from_rgb(248, 113, 113);
pub const AMBER: Color32 = Color32::from_rgb(251, 191, 36);
pub const BLUE: Color32 = Color32::from_rgb(96, 165, 250);
pub const PURPLE: Color32 = Color32::from_rgb(167, 139, 250);
pub const RETAINED: Color32 = Color32::from_rgb(31, 45, 61);
pub const MUTED: Color32 = Color32::from_rgb(107, 114, 128);

const CHART_HEIGHT: f32 = 280.0;

/// Creates churn dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Color for a risk tier.
    pub fn tier_color(tier: RiskTier) -> Color32 {
        match tier {
            RiskTier::Low => GREEN,
            RiskTier::Medium => AMBER,
            RiskTier::High => RED,
        }
    }

    /// Axis formatter that maps integer positions to category labels.
    fn category_formatter(
        labels: Vec<String>,
    ) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
        move |mark: GridMark, _range: &RangeInclusive<f64>| {
            let v = mark.value;
            if v < -0.01 || (v - v.round()).abs() > 1e-6 {
                return String::new();
            }
            labels.get(v.round() as usize).cloned().unwrap_or_default()
        }
    }

    /// Stacked retained/churned bars per contract with churn-rate labels.
    pub fn draw_contract_chart(ui: &mut egui::Ui, summary: &DashboardSummary) {
        let labels: Vec<String> = summary.by_contract.iter().map(|c| c.contract.clone()).collect();

        Plot::new("churn_by_contract")
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_formatter(Self::category_formatter(labels))
            .include_y(0.0)
            .show(ui, |plot_ui| {
                let retained = BarChart::new(
                    summary
                        .by_contract
                        .iter()
                        .enumerate()
                        .map(|(i, c)| Bar::new(i as f64, c.retained as f64).width(0.6))
                        .collect(),
                )
                .color(RETAINED)
                .name("Retained");

                let churned = BarChart::new(
                    summary
                        .by_contract
                        .iter()
                        .enumerate()
                        .map(|(i, c)| Bar::new(i as f64, c.churned as f64).width(0.6))
                        .collect(),
                )
                .color(RED)
                .name("Churned")
                .stack_on(&[&retained]);

                plot_ui.bar_chart(retained);
                plot_ui.bar_chart(churned);

                for (i, c) in summary.by_contract.iter().enumerate() {
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(i as f64, c.total as f64),
                            RichText::new(format!("{:.1}%", c.churn_rate)).color(RED).strong(),
                        )
                        .anchor(egui::Align2::CENTER_BOTTOM),
                    );
                }
            });
    }

    /// Churn rate (%) line across tenure groups.
    pub fn draw_tenure_chart(ui: &mut egui::Ui, summary: &DashboardSummary) {
        let labels: Vec<String> = summary
            .by_tenure_group
            .iter()
            .map(|t| t.group.label().to_string())
            .collect();
        let points: Vec<[f64; 2]> = summary
            .by_tenure_group
            .iter()
            .enumerate()
            .map(|(i, t)| [i as f64, t.churn_rate_pct()])
            .collect();

        Plot::new("churn_by_tenure")
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_formatter(Self::category_formatter(labels))
            .y_axis_formatter(|mark, _range| format!("{:.0}%", mark.value))
            .include_y(0.0)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(points.iter().copied()))
                        .color(AMBER)
                        .width(3.0)
                        .fill(0.0)
                        .name("Churn rate"),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points.iter().copied()))
                        .radius(5.0)
                        .color(AMBER),
                );
            });
    }

    fn histogram_chart(histogram: &ChargeHistogram) -> BarChart {
        let (color, name) = if histogram.churned {
            (RED, "Churn: Yes")
        } else {
            (GREEN, "Churn: No")
        };

        BarChart::new(
            histogram
                .bins
                .iter()
                .map(|b| {
                    Bar::new((b.lower + b.upper) / 2.0, b.density).width(b.upper - b.lower)
                })
                .collect(),
        )
        .color(color.gamma_multiply(0.7))
        .name(name)
    }

    /// Overlaid monthly charge densities for churned and retained customers.
    pub fn draw_charge_distribution(ui: &mut egui::Ui, summary: &DashboardSummary) {
        Plot::new("charge_distribution")
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_formatter(|mark, _range| format!("${:.0}", mark.value))
            .show(ui, |plot_ui| {
                for histogram in &summary.charge_histograms {
                    plot_ui.bar_chart(Self::histogram_chart(histogram));
                }
            });
    }

    /// Grouped churned/retained counts per internet service.
    pub fn draw_internet_chart(ui: &mut egui::Ui, summary: &DashboardSummary) {
        let mut services: Vec<String> = Vec::new();
        for c in &summary.by_internet_service {
            if !services.contains(&c.internet_service) {
                services.push(c.internet_service.clone());
            }
        }

        let bars_for = |churned: bool| -> Vec<Bar> {
            summary
                .by_internet_service
                .iter()
                .filter(|c| c.churned == churned)
                .filter_map(|c| {
                    let idx = services.iter().position(|s| s == &c.internet_service)?;
                    let offset = if churned { 0.2 } else { -0.2 };
                    Some(Bar::new(idx as f64 + offset, c.count as f64).width(0.4))
                })
                .collect()
        };
        let retained = BarChart::new(bars_for(false)).color(PURPLE).name("No");
        let churned = BarChart::new(bars_for(true)).color(RED).name("Yes");

        Plot::new("churn_by_internet")
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_formatter(Self::category_formatter(services.clone()))
            .include_y(0.0)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(retained);
                plot_ui.bar_chart(churned);
            });
    }

    /// Customers per risk tier.
    pub fn draw_risk_distribution(ui: &mut egui::Ui, summary: &DashboardSummary) {
        let total = summary.totals.total.max(1) as f64;
        let labels: Vec<String> = summary
            .risk_distribution
            .iter()
            .map(|r| r.tier.label().to_string())
            .collect();

        Plot::new("risk_distribution")
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_formatter(Self::category_formatter(labels))
            .include_y(0.0)
            .show(ui, |plot_ui| {
                for (i, r) in summary.risk_distribution.iter().enumerate() {
                    let color = Self::tier_color(r.tier);
                    plot_ui.bar_chart(
                        BarChart::new(vec![Bar::new(i as f64, r.count as f64)
                            .width(0.6)
                            .fill(color)])
                        .color(color)
                        .name(r.tier.label()),
                    );
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(i as f64, r.count as f64),
                            format!("{:.1}%", r.count as f64 / total * 100.0),
                        )
                        .anchor(egui::Align2::CENTER_BOTTOM),
                    );
                }
            });
    }

    fn tier_rate_bars(tiers: &[RiskTierChurn]) -> Vec<BarChart> {
        tiers
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let color = Self::tier_color(t.tier);
                BarChart::new(vec![Bar::new(i as f64, t.churn_rate).width(0.6).fill(color)])
                    .color(color)
                    .name(t.tier.label())
            })
            .collect()
    }

    /// Churn rate (%) per risk tier.
    pub fn draw_risk_tier_chart(ui: &mut egui::Ui, summary: &DashboardSummary) {
        let labels: Vec<String> = summary
            .by_risk_tier
            .iter()
            .map(|t| t.tier.label().to_string())
            .collect();

        Plot::new("churn_by_risk_tier")
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_formatter(Self::category_formatter(labels))
            .y_axis_formatter(|mark, _range| format!("{:.0}%", mark.value))
            .include_y(0.0)
            .show(ui, |plot_ui| {
                for chart in Self::tier_rate_bars(&summary.by_risk_tier) {
                    plot_ui.bar_chart(chart);
                }
                for (i, t) in summary.by_risk_tier.iter().enumerate() {
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(i as f64, t.churn_rate),
                            format!("{:.1}%", t.churn_rate),
                        )
                        .anchor(egui::Align2::CENTER_BOTTOM),
                    );
                }
            });
    }

    /// Tenure vs monthly charge for the sampled customers, coloured by tier.
    pub fn draw_landscape_scatter(ui: &mut egui::Ui, summary: &DashboardSummary) {
        Plot::new("customer_landscape")
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_label("Tenure (months)")
            .y_axis_label("Monthly Charges ($)")
            .show(ui, |plot_ui| {
                for tier in RiskTier::ALL {
                    let points: PlotPoints = summary
                        .scatter
                        .iter()
                        .filter(|p| p.tier == tier)
                        .map(|p| [p.tenure as f64, p.monthly_charges])
                        .collect();
                    plot_ui.points(
                        Points::new(points)
                            .radius(3.0)
                            .color(Self::tier_color(tier).gamma_multiply(0.7))
                            .name(tier.label()),
                    );
                }
            });
    }

    /// Churn with vs without each add-on service.
    pub fn draw_add_on_chart(ui: &mut egui::Ui, summary: &DashboardSummary) {
        let labels: Vec<String> = summary.by_add_on.iter().map(|a| a.service.to_string()).collect();
        let with_service = BarChart::new(
            summary
                .by_add_on
                .iter()
                .enumerate()
                .map(|(i, a)| Bar::new(i as f64 - 0.2, a.with_service).width(0.4))
                .collect(),
        )
        .color(GREEN)
        .name("With Service");
        let without_service = BarChart::new(
            summary
                .by_add_on
                .iter()
                .enumerate()
                .map(|(i, a)| Bar::new(i as f64 + 0.2, a.without_service).width(0.4))
                .collect(),
        )
        .color(RED)
        .name("Without Service");

        Plot::new("churn_by_add_on")
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_formatter(Self::category_formatter(labels))
            .y_axis_formatter(|mark, _range| format!("{:.0}%", mark.value))
            .include_y(0.0)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(with_service);
                plot_ui.bar_chart(without_service);
            });
    }

    /// Horizontal churn-rate bars per payment method, lowest first.
    pub fn draw_payment_chart(ui: &mut egui::Ui, summary: &DashboardSummary) {
        let labels: Vec<String> = summary
            .by_payment_method
            .iter()
            .map(|p| p.method.clone())
            .collect();
        let max_rate = summary
            .by_payment_method
            .iter()
            .map(|p| p.churn_rate)
            .fold(0.0, f64::max)
            .max(1.0);

        Plot::new("churn_by_payment")
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .y_axis_formatter(Self::category_formatter(labels))
            .x_axis_formatter(|mark, _range| format!("{:.0}%", mark.value))
            .include_x(0.0)
            .show(ui, |plot_ui| {
                let bars = summary
                    .by_payment_method
                    .iter()
                    .enumerate()
                    .map(|(i, p)| {
                        Bar::new(i as f64, p.churn_rate)
                            .width(0.6)
                            .fill(Self::rate_color(p.churn_rate / max_rate))
                            .name(&p.method)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).horizontal().name("Churn rate"));
            });
    }

    /// Green → amber → red scale over [0, 1].
    pub fn rate_color(t: f64) -> Color32 {
        let t = t.clamp(0.0, 1.0) as f32;
        let lerp = |a: Color32, b: Color32, f: f32| {
            let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * f).round() as u8;
            Color32::from_rgb(mix(a.r(), b.r()), mix(a.g(), b.g()), mix(a.b(), b.b()))
        };
        if t < 0.5 {
            lerp(GREEN, AMBER, t * 2.0)
        } else {
            lerp(AMBER, RED, (t - 0.5) * 2.0)
        }
    }

    /// Draw the high-risk customer table
    pub fn draw_high_risk_table(ui: &mut egui::Ui, rows: &[HighRiskRow]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                if rows.is_empty() {
                    ui.label(RichText::new("No high-risk customers in view").color(MUTED));
                    return;
                }

                egui::Grid::new("high_risk_table")
                    .striped(true)
                    .min_col_width(70.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for header in [
                            "Customer ID",
                            "Contract",
                            "Tenure (mo)",
                            "Monthly $",
                            "Internet",
                            "Tech Support",
                            "Security",
                            "Risk Score",
                            "Churned",
                        ] {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        for row in rows {
                            ui.label(RichText::new(&row.customer_id).size(11.0));
                            ui.label(RichText::new(&row.contract).size(11.0));
                            ui.label(RichText::new(row.tenure.to_string()).size(11.0));
                            ui.label(
                                RichText::new(format!("${:.2}", row.monthly_charges)).size(11.0),
                            );
                            ui.label(RichText::new(&row.internet_service).size(11.0));
                            ui.label(RichText::new(&row.tech_support).size(11.0));
                            ui.label(RichText::new(&row.online_security).size(11.0));
                            ui.label(RichText::new(row.risk_score.to_string()).size(11.0));
                            if row.churned {
                                ui.label(RichText::new("Yes").size(11.0).color(RED).strong());
                            } else {
                                ui.label(RichText::new("No").size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}
