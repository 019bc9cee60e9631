//! Dashboard Summary Module
//! One recomputation pass over a filtered view, stored as owned values for
//! the chart viewer, the PNG renderer and the JSON export.

use crate::data::{CustomerRecord, FilteredView, RiskTier};
use crate::stats::calculator::{
    AddOnChurn, ChargeHistogram, ChurnCalculator, ContractChurn, InternetChurnCount,
    PaymentMethodChurn, RiskTierChurn, RiskTierCount, TenureChurn, Totals, HIGH_RISK_TABLE_SIZE,
    HISTOGRAM_BINS, SCATTER_SAMPLE_SIZE, SCATTER_SEED,
};
use serde::Serialize;
use tracing::debug;

/// Row of the high-risk customer table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighRiskRow {
    pub customer_id: String,
    pub contract: String,
    pub tenure: i64,
    pub monthly_charges: f64,
    pub internet_service: String,
    pub tech_support: String,
    pub online_security: String,
    pub risk_score: u8,
    pub churned: bool,
}

impl From<&CustomerRecord> for HighRiskRow {
    fn from(record: &CustomerRecord) -> Self {
        Self {
            customer_id: record.customer_id.clone(),
            contract: record.contract.clone(),
            tenure: record.tenure,
            monthly_charges: record.monthly_charges,
            internet_service: record.internet_service.clone(),
            tech_support: record.add_ons.tech_support.as_str().to_string(),
            online_security: record.add_ons.online_security.as_str().to_string(),
            risk_score: record.risk_score,
            churned: record.churned,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub tenure: i64,
    pub monthly_charges: f64,
    pub tier: RiskTier,
}

/// Every aggregate the dashboard draws for one filter selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// Size of the unfiltered dataset
    pub dataset_size: usize,
    pub totals: Totals,
    pub by_contract: Vec<ContractChurn>,
    pub by_tenure_group: Vec<TenureChurn>,
    pub by_internet_service: Vec<InternetChurnCount>,
    pub by_risk_tier: Vec<RiskTierChurn>,
    pub risk_distribution: Vec<RiskTierCount>,
    pub by_add_on: Vec<AddOnChurn>,
    pub by_payment_method: Vec<PaymentMethodChurn>,
    pub charge_histograms: Vec<ChargeHistogram>,
    pub high_risk: Vec<HighRiskRow>,
    pub scatter: Vec<ScatterPoint>,
}

impl DashboardSummary {
    pub fn compute(view: &FilteredView<'_>, dataset_size: usize) -> Self {
        debug!(view = view.len(), dataset_size, "Recomputing dashboard summary");

        Self {
            dataset_size,
            totals: ChurnCalculator::totals(view),
            by_contract: ChurnCalculator::churn_by_contract(view),
            by_tenure_group: ChurnCalculator::churn_by_tenure_group(view),
            by_internet_service: ChurnCalculator::churn_by_internet_service(view),
            by_risk_tier: ChurnCalculator::churn_by_risk_tier(view),
            risk_distribution: ChurnCalculator::risk_distribution(view),
            by_add_on: ChurnCalculator::churn_by_add_on(view),
            by_payment_method: ChurnCalculator::churn_by_payment_method(view),
            charge_histograms: ChurnCalculator::charge_histograms(view, HISTOGRAM_BINS),
            high_risk: ChurnCalculator::top_high_risk(view, HIGH_RISK_TABLE_SIZE)
                .into_iter()
                .map(HighRiskRow::from)
                .collect(),
            scatter: ChurnCalculator::scatter_sample(view, SCATTER_SAMPLE_SIZE, SCATTER_SEED)
                .into_iter()
                .map(|r| ScatterPoint {
                    tenure: r.tenure,
                    monthly_charges: r.monthly_charges,
                    tier: r.risk_tier,
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.totals.total == 0
    }

    /// Pretty JSON snapshot.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::tests::raw_customer;

    #[test]
    fn test_empty_summary() {
        let summary = DashboardSummary::compute(&FilteredView::default(), 42);
        assert!(summary.is_empty());
        assert_eq!(summary.dataset_size, 42);
        assert!(summary.high_risk.is_empty());
        assert!(summary.scatter.is_empty());
        assert_eq!(summary.by_add_on.len(), 6);
    }

    #[test]
    fn test_json_snapshot_has_sections() {
        let records: Vec<CustomerRecord> = (0..3)
            .map(|i| CustomerRecord::enrich(raw_customer(&format!("id-{}", i))).unwrap())
            .collect();
        let view = FilteredView::from_records(records.iter().collect());

        let json = DashboardSummary::compute(&view, 3).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["totals"]["total"], 3);
        assert_eq!(value["by_contract"][0]["contract"], "One year");
        assert_eq!(value["scatter"].as_array().unwrap().len(), 3);
    }
}
