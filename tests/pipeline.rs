//! Integration tests for the churn pipeline: CSV load, enrichment, filtering
//! and the dashboard summary.

use churn_dashboard::data::{
    DataLoader, DatasetCache, FilterOptions, FilterSelection, LoaderError, RiskTier, SeniorLabel,
    TenureGroup,
};
use churn_dashboard::stats::DashboardSummary;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const HEADER: &str = "customerID,gender,SeniorCitizen,Partner,Dependents,tenure,PhoneService,MultipleLines,InternetService,OnlineSecurity,OnlineBackup,DeviceProtection,TechSupport,StreamingTV,StreamingMovies,Contract,PaperlessBilling,PaymentMethod,MonthlyCharges,TotalCharges,Churn";

/// Create a test CSV file with sample Telco rows
fn create_test_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();

    // Short-tenure fiber customer, month-to-month, no support: score 10
    writeln!(file, "0001-AAAAA,Female,0,Yes,No,1,No,No phone service,Fiber optic,No,Yes,No,No,No,No,Month-to-month,Yes,Electronic check,89.85,89.85,Yes").unwrap();
    // Long-tenure DSL customer on a two-year contract: score 0
    writeln!(file, "0002-BBBBB,Male,0,No,No,34,Yes,No,DSL,Yes,No,Yes,Yes,No,No,Two year,No,Mailed check,56.95,1889.5,No").unwrap();
    // Senior, month-to-month DSL, tenure exactly 12: score 5
    writeln!(file, "0003-CCCCC,Male,1,No,No,12,Yes,No,DSL,No,Yes,No,No,No,No,Month-to-month,Yes,Mailed check,53.85,646.2,Yes").unwrap();
    // Zero tenure with a blank total charge: dropped
    writeln!(file, "0004-DDDDD,Male,0,Yes,Yes,0,Yes,No,DSL,Yes,No,Yes,Yes,Yes,No,Two year,Yes,Bank transfer (automatic),52.55, ,No").unwrap();
    // No internet service, one-year contract, 72 months: score 0
    writeln!(file, "0005-EEEEE,Female,0,Yes,Yes,72,Yes,Yes,No,No internet service,No internet service,No internet service,No internet service,No internet service,No internet service,One year,No,Credit card (automatic),25.4,1828.8,No").unwrap();
    // Fiber, month-to-month, tenure 25, no support: score 3+2+1+1+1 = 8
    writeln!(file, "0006-FFFFF,Female,1,No,No,25,Yes,Yes,Fiber optic,No,No,No,No,Yes,Yes,Month-to-month,Yes,Electronic check,99.65,2500.1,Yes").unwrap();
    // Unparseable total charge: dropped
    writeln!(file, "0007-GGGGG,Male,0,No,No,5,Yes,No,DSL,Yes,No,No,Yes,No,No,One year,No,Mailed check,45.0,not-a-number,No").unwrap();

    file
}

fn load_fixture() -> (NamedTempFile, Arc<churn_dashboard::data::EnrichedDataset>) {
    let file = create_test_csv();
    let dataset = Arc::new(DataLoader::load_csv(file.path()).unwrap());
    (file, dataset)
}

#[test]
fn test_loader_drops_unparseable_total_charges() {
    let (_file, dataset) = load_fixture();

    assert_eq!(dataset.len(), 5);
    assert_eq!(dataset.skipped_rows(), 2);
    let ids: Vec<&str> = dataset
        .records()
        .iter()
        .map(|r| r.customer_id.as_str())
        .collect();
    assert!(!ids.contains(&"0004-DDDDD"));
    assert!(!ids.contains(&"0007-GGGGG"));
}

#[test]
fn test_enriched_columns() {
    let (_file, dataset) = load_fixture();
    let by_id = |id: &str| {
        dataset
            .records()
            .iter()
            .find(|r| r.customer_id == id)
            .unwrap()
            .clone()
    };

    let first = by_id("0001-AAAAA");
    assert!(first.churned);
    assert_eq!(first.risk_score, 10);
    assert_eq!(first.risk_tier, RiskTier::High);
    assert_eq!(first.tenure_group, Some(TenureGroup::UpTo12));

    let second = by_id("0002-BBBBB");
    assert!(!second.churned);
    assert_eq!(second.risk_score, 0);
    assert_eq!(second.risk_tier, RiskTier::Low);
    assert_eq!(second.tenure_group, Some(TenureGroup::From25To48));

    let third = by_id("0003-CCCCC");
    assert_eq!(third.senior_label, SeniorLabel::Yes);
    assert_eq!(third.tenure_group, Some(TenureGroup::UpTo12));
    assert_eq!(third.risk_score, 5);
    assert_eq!(third.risk_tier, RiskTier::Medium);

    let fifth = by_id("0005-EEEEE");
    assert_eq!(fifth.risk_score, 0);
    assert_eq!(fifth.tenure_group, Some(TenureGroup::From49To72));

    assert_eq!(by_id("0006-FFFFF").risk_score, 8);

    for record in dataset.records() {
        assert!(record.risk_score <= 10);
        assert_eq!(record.risk_tier, RiskTier::from_score(record.risk_score));
    }
}

#[test]
fn test_default_selection_keeps_full_set() {
    let (_file, dataset) = load_fixture();
    let options = FilterOptions::from_dataset(&dataset);
    let selection = FilterSelection::all(&options);

    let view = selection.apply(&dataset);
    assert_eq!(view.len(), dataset.len());

    let summary = DashboardSummary::compute(&view, dataset.len());
    assert_eq!(summary.totals.total, 5);
    assert_eq!(summary.totals.churned, 3);
    assert!((summary.totals.churn_rate - 60.0).abs() < 1e-9);
    assert!((summary.totals.revenue_at_risk - (89.85 + 53.85 + 99.65)).abs() < 1e-9);
    assert_eq!(summary.totals.high_risk, 2);

    let ids: Vec<&str> = summary
        .high_risk
        .iter()
        .map(|r| r.customer_id.as_str())
        .collect();
    assert_eq!(ids, vec!["0001-AAAAA", "0006-FFFFF"]);
    assert_eq!(summary.scatter.len(), 5);
}

#[test]
fn test_empty_dimension_gives_zero_summary() {
    let (_file, dataset) = load_fixture();
    let mut selection = FilterSelection::all(&FilterOptions::from_dataset(&dataset));
    selection.senior_labels.clear();

    let view = selection.apply(&dataset);
    assert!(view.is_empty());

    let summary = DashboardSummary::compute(&view, dataset.len());
    assert_eq!(summary.totals.total, 0);
    assert_eq!(summary.totals.churn_rate, 0.0);
    assert_eq!(summary.totals.mean_tenure, 0.0);
    assert!(summary.by_contract.is_empty());
    assert!(summary.high_risk.is_empty());
    assert_eq!(summary.dataset_size, 5);
}

#[test]
fn test_filter_narrows_and_is_idempotent() {
    let (_file, dataset) = load_fixture();
    let mut selection = FilterSelection::all(&FilterOptions::from_dataset(&dataset));
    selection.contracts = ["Month-to-month".to_string()].into_iter().collect();

    let first = selection.apply(&dataset);
    let second = selection.apply(&dataset);
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);

    let summary = DashboardSummary::compute(&first, dataset.len());
    assert_eq!(summary.by_contract.len(), 1);
    assert_eq!(summary.by_contract[0].churn_rate, 100.0);
    // The master set is untouched
    assert_eq!(dataset.len(), 5);
}

#[test]
fn test_missing_column_is_fatal() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "customerID,tenure,Churn").unwrap();
    writeln!(file, "0001-AAAAA,1,Yes").unwrap();

    let err = DataLoader::load_csv(file.path()).unwrap_err();
    assert!(matches!(err, LoaderError::MissingColumn { .. }));
}

#[test]
fn test_missing_file_is_fatal() {
    let err = DataLoader::load_csv(std::path::Path::new("no/such/churn.csv")).unwrap_err();
    assert!(matches!(err, LoaderError::DataUnavailable { .. }));
}

#[test]
fn test_cache_loads_once() {
    let file = create_test_csv();
    let cache = DatasetCache::new(file.path());
    assert!(!cache.is_loaded());

    let first = cache.get_or_load().unwrap();
    let second = cache.get_or_load().unwrap();
    assert!(cache.is_loaded());
    assert!(Arc::ptr_eq(&first, &second));
}
