//! Static Chart Renderer
//! Writes a PNG overview of the current dashboard summary with plotters.
//!
//! Layout (2x2):
//! 1. Churn by contract type (stacked retained/churned bars)
//! 2. Churn rate by tenure group (line)
//! 3. Churn rate per risk tier (bars)
//! 4. Churn rate by payment method (bars, lowest first)

use crate::data::RiskTier;
use crate::stats::DashboardSummary;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::info;

// Colors
const CHURN_RED: RGBColor = RGBColor(248, 113, 113);
const RETAINED_SLATE: RGBColor = RGBColor(31, 45, 61);
const TENURE_AMBER: RGBColor = RGBColor(251, 191, 36);
const LOW_GREEN: RGBColor = RGBColor(74, 222, 128);
const MEDIUM_AMBER: RGBColor = RGBColor(251, 146, 60);
const PAYMENT_BLUE: RGBColor = RGBColor(96, 165, 250);

const FONT: &str = "sans-serif";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Chart rendering failed: {0}")]
    Draw(String),
}

/// Convert any plotters drawing error into a render error.
fn draw_err<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Draw(err.to_string())
}

/// One categorical bar: label, height and fill.
struct CategoryBar {
    label: String,
    value: f64,
    color: RGBColor,
}

fn tier_rgb(tier: RiskTier) -> RGBColor {
    match tier {
        RiskTier::Low => LOW_GREEN,
        RiskTier::Medium => MEDIUM_AMBER,
        RiskTier::High => CHURN_RED,
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the 2x2 overview to a PNG file.
    pub fn render_overview_png(
        summary: &DashboardSummary,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let title = format!(
            "Customer Churn Analytics - {} of {} customers",
            summary.totals.total, summary.dataset_size
        );
        let root = root
            .titled(&title, (FONT, 28).into_font())
            .map_err(draw_err)?;
        let areas = root.split_evenly((2, 2));

        Self::draw_contract_panel(&areas[0], summary)?;
        Self::draw_tenure_panel(&areas[1], summary)?;

        let tiers: Vec<CategoryBar> = summary
            .by_risk_tier
            .iter()
            .map(|t| CategoryBar {
                label: t.tier.label().to_string(),
                value: t.churn_rate,
                color: tier_rgb(t.tier),
            })
            .collect();
        Self::draw_rate_panel(&areas[2], "Churn Rate per Risk Tier", &tiers)?;

        let methods: Vec<CategoryBar> = summary
            .by_payment_method
            .iter()
            .map(|p| CategoryBar {
                label: p.method.clone(),
                value: p.churn_rate,
                color: PAYMENT_BLUE,
            })
            .collect();
        Self::draw_rate_panel(&areas[3], "Churn Rate by Payment Method", &methods)?;

        root.present().map_err(draw_err)?;
        info!(path = %path.display(), "Rendered dashboard overview");
        Ok(())
    }

    fn label_at(labels: &[String], x: &f64) -> String {
        if (x - x.round()).abs() > 1e-6 || *x < 0.0 {
            return String::new();
        }
        labels.get(x.round() as usize).cloned().unwrap_or_default()
    }

    fn draw_contract_panel(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        summary: &DashboardSummary,
    ) -> Result<(), RenderError> {
        let labels: Vec<String> = summary.by_contract.iter().map(|c| c.contract.clone()).collect();
        let y_max = summary
            .by_contract
            .iter()
            .map(|c| c.total as f64)
            .fold(1.0, f64::max)
            * 1.15;
        let n = labels.len().max(1) as f64;

        let mut chart = ChartBuilder::on(area)
            .caption("Churn by Contract Type", (FONT, 20))
            .margin(15)
            .x_label_area_size(35)
            .y_label_area_size(50)
            .build_cartesian_2d(-0.5f64..(n - 0.5), 0f64..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len().max(1))
            .x_label_formatter(&|x| Self::label_at(&labels, x))
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(summary.by_contract.iter().enumerate().map(|(i, c)| {
                let x = i as f64;
                Rectangle::new(
                    [(x - 0.3, 0.0), (x + 0.3, c.retained as f64)],
                    RETAINED_SLATE.filled(),
                )
            }))
            .map_err(draw_err)?
            .label("Retained")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], RETAINED_SLATE.filled()));

        chart
            .draw_series(summary.by_contract.iter().enumerate().map(|(i, c)| {
                let x = i as f64;
                Rectangle::new(
                    [(x - 0.3, c.retained as f64), (x + 0.3, c.total as f64)],
                    CHURN_RED.filled(),
                )
            }))
            .map_err(draw_err)?
            .label("Churned")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], CHURN_RED.filled()));

        chart
            .draw_series(summary.by_contract.iter().enumerate().map(|(i, c)| {
                Text::new(
                    format!("{:.1}%", c.churn_rate),
                    (i as f64 - 0.15, c.total as f64 * 1.08),
                    (FONT, 15).into_font().color(&CHURN_RED),
                )
            }))
            .map_err(draw_err)?;

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;

        Ok(())
    }

    fn draw_tenure_panel(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        summary: &DashboardSummary,
    ) -> Result<(), RenderError> {
        let labels: Vec<String> = summary
            .by_tenure_group
            .iter()
            .map(|t| t.group.label().to_string())
            .collect();
        let points: Vec<(f64, f64)> = summary
            .by_tenure_group
            .iter()
            .enumerate()
            .map(|(i, t)| (i as f64, t.churn_rate_pct()))
            .collect();
        let y_max = points.iter().map(|p| p.1).fold(10.0, f64::max) * 1.15;
        let n = labels.len().max(1) as f64;

        let mut chart = ChartBuilder::on(area)
            .caption("Churn Rate by Tenure Group", (FONT, 20))
            .margin(15)
            .x_label_area_size(35)
            .y_label_area_size(50)
            .build_cartesian_2d(-0.5f64..(n - 0.5), 0f64..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len().max(1))
            .x_label_formatter(&|x| Self::label_at(&labels, x))
            .y_label_formatter(&|y| format!("{:.0}%", y))
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(LineSeries::new(points.iter().copied(), TENURE_AMBER.stroke_width(3)))
            .map_err(draw_err)?;
        chart
            .draw_series(
                points
                    .iter()
                    .map(|&p| Circle::new(p, 6, TENURE_AMBER.filled())),
            )
            .map_err(draw_err)?;

        Ok(())
    }

    fn draw_rate_panel(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        caption: &str,
        bars: &[CategoryBar],
    ) -> Result<(), RenderError> {
        let labels: Vec<String> = bars.iter().map(|b| b.label.clone()).collect();
        let y_max = bars.iter().map(|b| b.value).fold(10.0, f64::max) * 1.15;
        let n = labels.len().max(1) as f64;

        let mut chart = ChartBuilder::on(area)
            .caption(caption, (FONT, 20))
            .margin(15)
            .x_label_area_size(35)
            .y_label_area_size(50)
            .build_cartesian_2d(-0.5f64..(n - 0.5), 0f64..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len().max(1))
            .x_label_formatter(&|x| Self::label_at(&labels, x))
            .y_label_formatter(&|y| format!("{:.0}%", y))
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(bars.iter().enumerate().map(|(i, b)| {
                let x = i as f64;
                Rectangle::new([(x - 0.3, 0.0), (x + 0.3, b.value)], b.color.filled())
            }))
            .map_err(draw_err)?;

        chart
            .draw_series(bars.iter().enumerate().map(|(i, b)| {
                Text::new(
                    format!("{:.1}%", b.value),
                    (i as f64 - 0.12, b.value + y_max * 0.03),
                    (FONT, 14).into_font(),
                )
            }))
            .map_err(draw_err)?;

        Ok(())
    }
}
