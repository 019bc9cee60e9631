//! Churn Statistics Calculator Module
//! Aggregates over a filtered view: KPI totals, group-by churn rates, the
//! high-risk table, the scatter sample and the charge distribution.
//!
//! Every function is total: the empty view yields zeros or empty results.

use crate::data::{
    AddOnService, CustomerRecord, FilteredView, RiskTier, ServiceFlag, TenureGroup,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Rows shown in the high-risk customer table.
pub const HIGH_RISK_TABLE_SIZE: usize = 15;
/// Maximum points in the tenure/charge scatter.
pub const SCATTER_SAMPLE_SIZE: usize = 800;
/// Seed for the scatter sample.
pub const SCATTER_SEED: u64 = 42;
/// Bins per monthly charge histogram.
pub const HISTOGRAM_BINS: usize = 30;

/// Headline KPIs for the current view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub total: usize,
    pub churned: usize,
    /// Percentage
    pub churn_rate: f64,
    pub mean_tenure: f64,
    pub mean_monthly_charge: f64,
    /// Monthly charges of churned customers
    pub revenue_at_risk: f64,
    pub high_risk: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractChurn {
    pub contract: String,
    pub total: usize,
    pub churned: usize,
    pub retained: usize,
    /// Percentage, one decimal
    pub churn_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenureChurn {
    pub group: TenureGroup,
    /// Fraction in [0, 1]
    pub churn_rate: f64,
}

impl TenureChurn {
    pub fn churn_rate_pct(&self) -> f64 {
        self.churn_rate * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InternetChurnCount {
    pub internet_service: String,
    pub churned: bool,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskTierChurn {
    pub tier: RiskTier,
    pub count: usize,
    /// Percentage, one decimal
    pub churn_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskTierCount {
    pub tier: RiskTier,
    pub count: usize,
}

/// Churn among subscribers with vs. without an add-on.
/// An empty subgroup reports 0.0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddOnChurn {
    pub service: AddOnService,
    /// Percentage, one decimal
    pub with_service: f64,
    /// Percentage, one decimal
    pub without_service: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMethodChurn {
    pub method: String,
    pub count: usize,
    /// Percentage, one decimal
    pub churn_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub density: f64,
}

/// Probability-density histogram of monthly charges for one churn outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeHistogram {
    pub churned: bool,
    pub bins: Vec<HistogramBin>,
}

/// Churn percentage with a zero guard.
pub fn churn_rate_pct(churned: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        churned as f64 / total as f64 * 100.0
    }
}

/// Round to one decimal place, ties to even.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Mean with 0.0 for an empty input.
fn mean_or_zero(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.mean()
    }
}

/// (total, churned) counter keyed by group.
fn count_by<K, F>(view: &FilteredView<'_>, key: F) -> BTreeMap<K, (usize, usize)>
where
    K: Ord,
    F: Fn(&CustomerRecord) -> Option<K>,
{
    let mut groups: BTreeMap<K, (usize, usize)> = BTreeMap::new();
    for record in view.iter() {
        if let Some(k) = key(record) {
            let entry = groups.entry(k).or_default();
            entry.0 += 1;
            if record.churned {
                entry.1 += 1;
            }
        }
    }
    groups
}

/// Handles churn aggregations over a filtered view.
pub struct ChurnCalculator;

impl ChurnCalculator {
    pub fn totals(view: &FilteredView<'_>) -> Totals {
        let total = view.len();
        let churned = view.iter().filter(|r| r.churned).count();

        let tenures: Vec<f64> = view.iter().map(|r| r.tenure as f64).collect();
        let charges: Vec<f64> = view.iter().map(|r| r.monthly_charges).collect();

        Totals {
            total,
            churned,
            churn_rate: churn_rate_pct(churned, total),
            mean_tenure: mean_or_zero(&tenures),
            mean_monthly_charge: mean_or_zero(&charges),
            revenue_at_risk: view
                .iter()
                .filter(|r| r.churned)
                .map(|r| r.monthly_charges)
                .sum(),
            high_risk: view
                .iter()
                .filter(|r| r.risk_tier == RiskTier::High)
                .count(),
        }
    }

    /// Per contract type, sorted by contract name.
    pub fn churn_by_contract(view: &FilteredView<'_>) -> Vec<ContractChurn> {
        count_by(view, |r| Some(r.contract.clone()))
            .into_iter()
            .map(|(contract, (total, churned))| ContractChurn {
                contract,
                total,
                churned,
                retained: total - churned,
                churn_rate: round1(churn_rate_pct(churned, total)),
            })
            .collect()
    }

    /// Per observed tenure bucket, in bucket order.
    pub fn churn_by_tenure_group(view: &FilteredView<'_>) -> Vec<TenureChurn> {
        count_by(view, |r| r.tenure_group)
            .into_iter()
            .map(|(group, (total, churned))| TenureChurn {
                group,
                churn_rate: churn_rate_pct(churned, total) / 100.0,
            })
            .collect()
    }

    /// Internet service × churn outcome counts, sorted by (service, outcome).
    pub fn churn_by_internet_service(view: &FilteredView<'_>) -> Vec<InternetChurnCount> {
        let mut counts: BTreeMap<(String, bool), usize> = BTreeMap::new();
        for record in view.iter() {
            *counts
                .entry((record.internet_service.clone(), record.churned))
                .or_default() += 1;
        }

        counts
            .into_iter()
            .map(|((internet_service, churned), count)| InternetChurnCount {
                internet_service,
                churned,
                count,
            })
            .collect()
    }

    /// Per observed risk tier, Low to High.
    pub fn churn_by_risk_tier(view: &FilteredView<'_>) -> Vec<RiskTierChurn> {
        count_by(view, |r| Some(r.risk_tier))
            .into_iter()
            .map(|(tier, (count, churned))| RiskTierChurn {
                tier,
                count,
                churn_rate: round1(churn_rate_pct(churned, count)),
            })
            .collect()
    }

    /// Observed tiers by descending count.
    pub fn risk_distribution(view: &FilteredView<'_>) -> Vec<RiskTierCount> {
        let mut counts: Vec<RiskTierCount> = count_by(view, |r| Some(r.risk_tier))
            .into_iter()
            .map(|(tier, (count, _))| RiskTierCount { tier, count })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts
    }

    /// With/without churn for each add-on service.
    ///
    /// Subscribers whose flag is not applicable (no internet service) belong
    /// to neither subgroup.
    pub fn churn_by_add_on(view: &FilteredView<'_>) -> Vec<AddOnChurn> {
        AddOnService::ALL
            .par_iter()
            .map(|&service| {
                let rate_for = |flag: ServiceFlag| {
                    let (total, churned) = view
                        .iter()
                        .filter(|r| r.add_ons.get(service) == flag)
                        .fold((0usize, 0usize), |(total, churned), r| {
                            (total + 1, churned + usize::from(r.churned))
                        });
                    round1(churn_rate_pct(churned, total))
                };

                AddOnChurn {
                    service,
                    with_service: rate_for(ServiceFlag::Yes),
                    without_service: rate_for(ServiceFlag::No),
                }
            })
            .collect()
    }

    /// Per payment method, ascending by churn rate. Ties keep name order.
    pub fn churn_by_payment_method(view: &FilteredView<'_>) -> Vec<PaymentMethodChurn> {
        let mut methods: Vec<PaymentMethodChurn> = count_by(view, |r| Some(r.payment_method.clone()))
            .into_iter()
            .map(|(method, (count, churned))| PaymentMethodChurn {
                method,
                count,
                churn_rate: round1(churn_rate_pct(churned, count)),
            })
            .collect();
        methods.sort_by(|a, b| a.churn_rate.total_cmp(&b.churn_rate));
        methods
    }

    /// High Risk records by descending score, first `limit`.
    ///
    /// The sort is stable so equal scores keep view order.
    pub fn top_high_risk<'a>(view: &FilteredView<'a>, limit: usize) -> Vec<&'a CustomerRecord> {
        let mut high: Vec<&'a CustomerRecord> = view
            .iter()
            .filter(|r| r.risk_tier == RiskTier::High)
            .collect();
        high.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
        high.truncate(limit);
        high
    }

    /// Up to `size` records drawn with a fixed seed.
    ///
    /// Views no larger than `size` come back whole, in view order.
    pub fn scatter_sample<'a>(
        view: &FilteredView<'a>,
        size: usize,
        seed: u64,
    ) -> Vec<&'a CustomerRecord> {
        if view.len() <= size {
            return view.records().to_vec();
        }

        let mut rng = StdRng::seed_from_u64(seed);
        rand::seq::index::sample(&mut rng, view.len(), size)
            .into_iter()
            .map(|idx| view.records()[idx])
            .collect()
    }

    /// Monthly charge densities for retained and churned customers over a
    /// shared set of equal-width bins.
    pub fn charge_histograms(view: &FilteredView<'_>, bins: usize) -> Vec<ChargeHistogram> {
        if view.is_empty() || bins == 0 {
            return Vec::new();
        }

        let charges: Vec<f64> = view.iter().map(|r| r.monthly_charges).collect();
        let min = charges.iter().copied().fold(f64::INFINITY, f64::min);
        let max = charges.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let width = if max > min {
            (max - min) / bins as f64
        } else {
            1.0
        };

        [false, true]
            .into_iter()
            .map(|churned| {
                let mut counts = vec![0usize; bins];
                let mut n = 0usize;
                for record in view.iter().filter(|r| r.churned == churned) {
                    let idx = ((record.monthly_charges - min) / width) as usize;
                    counts[idx.min(bins - 1)] += 1;
                    n += 1;
                }

                let densities = counts
                    .iter()
                    .enumerate()
                    .map(|(i, &count)| HistogramBin {
                        lower: min + i as f64 * width,
                        upper: min + (i + 1) as f64 * width,
                        density: if n == 0 {
                            0.0
                        } else {
                            count as f64 / (n as f64 * width)
                        },
                    })
                    .collect();

                ChargeHistogram {
                    churned,
                    bins: densities,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::tests::raw_customer;
    use crate::data::record::{FIBER_OPTIC, MONTH_TO_MONTH};

    fn record(id: &str, churned: bool) -> CustomerRecord {
        let mut raw = raw_customer(id);
        raw.churn = if churned { "Yes" } else { "No" }.to_string();
        CustomerRecord::enrich(raw).unwrap()
    }

    /// Record with a chosen High Risk score between 6 and 10.
    fn high_risk(id: &str, score: u8) -> CustomerRecord {
        let mut raw = raw_customer(id);
        raw.contract = MONTH_TO_MONTH.to_string();
        raw.internet_service = FIBER_OPTIC.to_string();
        raw.tenure = 5;
        let mut extra = score.saturating_sub(7);
        if extra > 0 {
            raw.monthly_charges = 90.0;
            extra -= 1;
        }
        if extra > 0 {
            raw.add_ons.tech_support = ServiceFlag::No;
            extra -= 1;
        }
        if extra > 0 {
            raw.add_ons.online_security = ServiceFlag::No;
        }
        if score == 6 {
            raw.tenure = 30;
            raw.monthly_charges = 90.0;
        }
        let record = CustomerRecord::enrich(raw).unwrap();
        assert_eq!(record.risk_score, score);
        record
    }

    #[test]
    fn test_churn_rate_quarter() {
        let records: Vec<CustomerRecord> =
            (0..100).map(|i| record(&i.to_string(), i < 25)).collect();
        let view = FilteredView::from_records(records.iter().collect());

        let totals = ChurnCalculator::totals(&view);
        assert_eq!(totals.total, 100);
        assert_eq!(totals.churned, 25);
        assert!((totals.churn_rate - 25.0).abs() < 1e-9);
        assert!((totals.revenue_at_risk - 25.0 * 50.0).abs() < 1e-9);
        assert!((totals.mean_monthly_charge - 50.0).abs() < 1e-9);
        assert!((totals.mean_tenure - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_view_is_well_defined() {
        let view = FilteredView::default();

        assert_eq!(ChurnCalculator::totals(&view), Totals::default());
        assert!(ChurnCalculator::churn_by_contract(&view).is_empty());
        assert!(ChurnCalculator::churn_by_tenure_group(&view).is_empty());
        assert!(ChurnCalculator::churn_by_internet_service(&view).is_empty());
        assert!(ChurnCalculator::churn_by_risk_tier(&view).is_empty());
        assert!(ChurnCalculator::risk_distribution(&view).is_empty());
        assert!(ChurnCalculator::churn_by_payment_method(&view).is_empty());
        assert!(ChurnCalculator::top_high_risk(&view, HIGH_RISK_TABLE_SIZE).is_empty());
        assert!(ChurnCalculator::scatter_sample(&view, SCATTER_SAMPLE_SIZE, SCATTER_SEED).is_empty());
        assert!(ChurnCalculator::charge_histograms(&view, HISTOGRAM_BINS).is_empty());

        let add_ons = ChurnCalculator::churn_by_add_on(&view);
        assert_eq!(add_ons.len(), 6);
        assert!(add_ons
            .iter()
            .all(|a| a.with_service == 0.0 && a.without_service == 0.0));
    }

    #[test]
    fn test_contract_breakdown() {
        let mut records = vec![record("a", true), record("b", false), record("c", false)];
        records[2].contract = "Two year".to_string();
        let view = FilteredView::from_records(records.iter().collect());

        let groups = ChurnCalculator::churn_by_contract(&view);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].contract, "One year");
        assert_eq!((groups[0].total, groups[0].churned, groups[0].retained), (2, 1, 1));
        assert_eq!(groups[0].churn_rate, 50.0);
        assert_eq!(groups[1].contract, "Two year");
        assert_eq!(groups[1].churn_rate, 0.0);
    }

    #[test]
    fn test_rates_round_to_one_decimal() {
        let records = vec![record("a", true), record("b", false), record("c", false)];
        let view = FilteredView::from_records(records.iter().collect());

        let tiers = ChurnCalculator::churn_by_risk_tier(&view);
        assert_eq!(tiers.len(), 1);
        assert_eq!(tiers[0].churn_rate, 33.3);

        let tenure = ChurnCalculator::churn_by_tenure_group(&view);
        assert_eq!(tenure[0].group, TenureGroup::From25To48);
        assert!((tenure[0].churn_rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_round1_ties_to_even() {
        assert_eq!(round1(6.25), 6.2);
        assert_eq!(round1(0.25), 0.2);
        assert_eq!(round1(0.75), 0.8);
        assert_eq!(round1(33.333), 33.3);
    }

    #[test]
    fn test_one_in_sixteen_rounds_down() {
        let records: Vec<CustomerRecord> =
            (0..16).map(|i| record(&i.to_string(), i == 0)).collect();
        let view = FilteredView::from_records(records.iter().collect());

        let groups = ChurnCalculator::churn_by_contract(&view);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].churn_rate, 6.2);
    }

    #[test]
    fn test_add_on_subgroups() {
        let mut records = vec![record("a", true), record("b", false), record("c", true)];
        records[0].add_ons.streaming_tv = ServiceFlag::Yes;
        records[1].add_ons.streaming_tv = ServiceFlag::Yes;
        records[2].add_ons.streaming_tv = ServiceFlag::NotApplicable;
        let view = FilteredView::from_records(records.iter().collect());

        let rates = ChurnCalculator::churn_by_add_on(&view);
        let order: Vec<AddOnService> = rates.iter().map(|r| r.service).collect();
        assert_eq!(order, AddOnService::ALL.to_vec());

        let tv = rates
            .iter()
            .find(|r| r.service == AddOnService::StreamingTv)
            .unwrap();
        assert_eq!(tv.with_service, 50.0);
        assert_eq!(tv.without_service, 0.0);

        let security = rates
            .iter()
            .find(|r| r.service == AddOnService::OnlineSecurity)
            .unwrap();
        assert_eq!(security.with_service, 66.7);
    }

    #[test]
    fn test_payment_methods_sorted_by_rate() {
        let mut records = vec![record("a", true), record("b", false), record("c", false)];
        records[0].payment_method = "Electronic check".to_string();
        records[1].payment_method = "Electronic check".to_string();
        records[2].payment_method = "Credit card (automatic)".to_string();
        let view = FilteredView::from_records(records.iter().collect());

        let methods = ChurnCalculator::churn_by_payment_method(&view);
        assert_eq!(methods[0].method, "Credit card (automatic)");
        assert_eq!(methods[0].churn_rate, 0.0);
        assert_eq!(methods[1].method, "Electronic check");
        assert_eq!(methods[1].churn_rate, 50.0);
    }

    #[test]
    fn test_internet_cross_tab() {
        let mut records = vec![record("a", true), record("b", false), record("c", false)];
        records[2].internet_service = "Fiber optic".to_string();
        let view = FilteredView::from_records(records.iter().collect());

        let counts = ChurnCalculator::churn_by_internet_service(&view);
        let flat: Vec<(&str, bool, usize)> = counts
            .iter()
            .map(|c| (c.internet_service.as_str(), c.churned, c.count))
            .collect();
        assert_eq!(
            flat,
            vec![("DSL", false, 1), ("DSL", true, 1), ("Fiber optic", false, 1)]
        );
    }

    #[test]
    fn test_top_high_risk_distinct_scores() {
        let scores = [6u8, 7, 8, 9, 10];
        let records: Vec<CustomerRecord> = (0..20)
            .map(|i| high_risk(&format!("c{}", i), scores[i % scores.len()]))
            .collect();
        let view = FilteredView::from_records(records.iter().collect());

        let top = ChurnCalculator::top_high_risk(&view, HIGH_RISK_TABLE_SIZE);
        assert_eq!(top.len(), 15);
        assert!(top.windows(2).all(|w| w[0].risk_score >= w[1].risk_score));
        assert_eq!(top[0].risk_score, 10);
    }

    #[test]
    fn test_top_high_risk_is_stable() {
        let records = vec![
            high_risk("first", 8),
            high_risk("second", 9),
            high_risk("third", 8),
            record("low", true),
        ];
        let view = FilteredView::from_records(records.iter().collect());

        let top = ChurnCalculator::top_high_risk(&view, HIGH_RISK_TABLE_SIZE);
        let ids: Vec<&str> = top.iter().map(|r| r.customer_id.as_str()).collect();
        assert_eq!(ids, vec!["second", "first", "third"]);
    }

    #[test]
    fn test_scatter_sample_is_deterministic() {
        let records: Vec<CustomerRecord> =
            (0..1000).map(|i| record(&i.to_string(), false)).collect();
        let view = FilteredView::from_records(records.iter().collect());

        let first = ChurnCalculator::scatter_sample(&view, SCATTER_SAMPLE_SIZE, SCATTER_SEED);
        let second = ChurnCalculator::scatter_sample(&view, SCATTER_SAMPLE_SIZE, SCATTER_SEED);
        assert_eq!(first.len(), SCATTER_SAMPLE_SIZE);
        assert_eq!(first, second);
    }

    #[test]
    fn test_scatter_sample_small_view_returns_all() {
        let records: Vec<CustomerRecord> = (0..10).map(|i| record(&i.to_string(), false)).collect();
        let view = FilteredView::from_records(records.iter().collect());

        let sample = ChurnCalculator::scatter_sample(&view, SCATTER_SAMPLE_SIZE, SCATTER_SEED);
        assert_eq!(sample.len(), 10);
        assert_eq!(sample[0].customer_id, "0");
    }

    #[test]
    fn test_charge_histogram_densities_integrate_to_one() {
        let mut records: Vec<CustomerRecord> =
            (0..40).map(|i| record(&i.to_string(), i % 4 == 0)).collect();
        for (i, r) in records.iter_mut().enumerate() {
            r.monthly_charges = 20.0 + i as f64 * 2.5;
        }
        let view = FilteredView::from_records(records.iter().collect());

        let hists = ChurnCalculator::charge_histograms(&view, HISTOGRAM_BINS);
        assert_eq!(hists.len(), 2);
        assert!(!hists[0].churned);
        for hist in &hists {
            assert_eq!(hist.bins.len(), HISTOGRAM_BINS);
            let area: f64 = hist
                .bins
                .iter()
                .map(|b| b.density * (b.upper - b.lower))
                .sum();
            assert!((area - 1.0).abs() < 1e-9);
        }
    }
}
