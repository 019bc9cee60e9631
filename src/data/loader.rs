//! CSV Data Loader Module
//! Reads the Telco churn CSV with Polars, rejects malformed rows and enriches
//! the rest into typed customer records. The enriched set is loaded once.

use crate::data::record::{AddOnService, AddOns, CustomerRecord, RawCustomer, ServiceFlag};
use once_cell::sync::{Lazy, OnceCell};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Source file used by the dashboard.
pub const DEFAULT_SOURCE: &str = "WA_Fn-UseC_-Telco-Customer-Churn.csv";

/// Columns that must be present in the source.
pub const REQUIRED_COLUMNS: [&str; 21] = [
    "customerID",
    "gender",
    "SeniorCitizen",
    "Partner",
    "Dependents",
    "tenure",
    "PhoneService",
    "MultipleLines",
    "InternetService",
    "OnlineSecurity",
    "OnlineBackup",
    "DeviceProtection",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
    "Contract",
    "PaperlessBilling",
    "PaymentMethod",
    "MonthlyCharges",
    "TotalCharges",
    "Churn",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data unavailable at {}: {source}", path.display())]
    DataUnavailable {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("Data unavailable at {}: missing column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },
}

/// The cleaned and enriched customer set. Read-only after construction.
#[derive(Debug, Clone)]
pub struct EnrichedDataset {
    source: PathBuf,
    records: Vec<CustomerRecord>,
    skipped_rows: usize,
}

impl EnrichedDataset {
    pub fn new(source: PathBuf, records: Vec<CustomerRecord>, skipped_rows: usize) -> Self {
        Self {
            source,
            records,
            skipped_rows,
        }
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of source rows dropped because a typed field failed to parse.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// Handles CSV loading and enrichment.
pub struct DataLoader;

impl DataLoader {
    /// Load and enrich a CSV file.
    ///
    /// Every column is read as text so that the blank `TotalCharges` cells of
    /// zero-tenure customers reach the row parser instead of poisoning the
    /// inferred schema.
    pub fn load_csv(path: &Path) -> Result<EnrichedDataset, LoaderError> {
        info!(path = %path.display(), "Loading customer dataset");

        let unavailable = |source: PolarsError| LoaderError::DataUnavailable {
            path: path.to_path_buf(),
            source,
        };

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()
            .map_err(unavailable)?
            .collect()
            .map_err(unavailable)?;

        let columns = SourceColumns::bind(&df, path)?;

        let mut records = Vec::with_capacity(df.height());
        let mut skipped_rows = 0usize;

        for idx in 0..df.height() {
            match columns.row(idx).and_then(|raw| {
                CustomerRecord::enrich(raw).ok_or("SeniorCitizen")
            }) {
                Ok(record) => records.push(record),
                Err(column) => {
                    skipped_rows += 1;
                    debug!(row = idx, column, "Skipping malformed row");
                }
            }
        }

        if skipped_rows > 0 {
            warn!(skipped_rows, "Dropped rows with unparseable fields");
        }
        info!(records = records.len(), "Customer dataset ready");

        Ok(EnrichedDataset::new(path.to_path_buf(), records, skipped_rows))
    }
}

/// Borrowed text columns of the source frame.
struct SourceColumns<'a> {
    customer_id: &'a StringChunked,
    gender: &'a StringChunked,
    senior_citizen: &'a StringChunked,
    partner: &'a StringChunked,
    dependents: &'a StringChunked,
    tenure: &'a StringChunked,
    phone_service: &'a StringChunked,
    multiple_lines: &'a StringChunked,
    internet_service: &'a StringChunked,
    online_security: &'a StringChunked,
    online_backup: &'a StringChunked,
    device_protection: &'a StringChunked,
    tech_support: &'a StringChunked,
    streaming_tv: &'a StringChunked,
    streaming_movies: &'a StringChunked,
    contract: &'a StringChunked,
    paperless_billing: &'a StringChunked,
    payment_method: &'a StringChunked,
    monthly_charges: &'a StringChunked,
    total_charges: &'a StringChunked,
    churn: &'a StringChunked,
}

impl<'a> SourceColumns<'a> {
    fn bind(df: &'a DataFrame, path: &Path) -> Result<Self, LoaderError> {
        let text = |name: &str| -> Result<&'a StringChunked, LoaderError> {
            let missing = || LoaderError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            };
            df.column(name)
                .map_err(|_| missing())?
                .str()
                .map_err(|source| LoaderError::DataUnavailable {
                    path: path.to_path_buf(),
                    source,
                })
        };

        Ok(Self {
            customer_id: text("customerID")?,
            gender: text("gender")?,
            senior_citizen: text("SeniorCitizen")?,
            partner: text("Partner")?,
            dependents: text("Dependents")?,
            tenure: text("tenure")?,
            phone_service: text("PhoneService")?,
            multiple_lines: text("MultipleLines")?,
            internet_service: text("InternetService")?,
            online_security: text(AddOnService::OnlineSecurity.column())?,
            online_backup: text(AddOnService::OnlineBackup.column())?,
            device_protection: text(AddOnService::DeviceProtection.column())?,
            tech_support: text(AddOnService::TechSupport.column())?,
            streaming_tv: text(AddOnService::StreamingTv.column())?,
            streaming_movies: text(AddOnService::StreamingMovies.column())?,
            contract: text("Contract")?,
            paperless_billing: text("PaperlessBilling")?,
            payment_method: text("PaymentMethod")?,
            monthly_charges: text("MonthlyCharges")?,
            total_charges: text("TotalCharges")?,
            churn: text("Churn")?,
        })
    }

    /// Parse one row. The error names the first column that failed.
    fn row(&self, idx: usize) -> Result<RawCustomer, &'static str> {
        let text = |ca: &StringChunked| ca.get(idx).unwrap_or_default().trim().to_string();
        let flag = |ca: &StringChunked| ServiceFlag::parse(ca.get(idx).unwrap_or_default());

        Ok(RawCustomer {
            customer_id: text(self.customer_id),
            gender: text(self.gender),
            senior_citizen: parse_int(self.senior_citizen.get(idx)).ok_or("SeniorCitizen")?,
            partner: text(self.partner),
            dependents: text(self.dependents),
            tenure: parse_int(self.tenure.get(idx)).ok_or("tenure")?,
            phone_service: text(self.phone_service),
            multiple_lines: text(self.multiple_lines),
            internet_service: text(self.internet_service),
            add_ons: AddOns {
                online_security: flag(self.online_security),
                tech_support: flag(self.tech_support),
                online_backup: flag(self.online_backup),
                device_protection: flag(self.device_protection),
                streaming_tv: flag(self.streaming_tv),
                streaming_movies: flag(self.streaming_movies),
            },
            contract: text(self.contract),
            paperless_billing: text(self.paperless_billing),
            payment_method: text(self.payment_method),
            monthly_charges: parse_decimal(self.monthly_charges.get(idx))
                .ok_or("MonthlyCharges")?,
            total_charges: parse_decimal(self.total_charges.get(idx)).ok_or("TotalCharges")?,
            churn: text(self.churn),
        })
    }
}

/// Parse a finite decimal; blanks, whitespace and NaN/inf are rejected.
pub(crate) fn parse_decimal(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn parse_int(cell: Option<&str>) -> Option<i64> {
    cell.and_then(|s| s.trim().parse::<i64>().ok())
}

/// Memoized dataset bound to one source path.
pub struct DatasetCache {
    path: PathBuf,
    dataset: OnceCell<Arc<EnrichedDataset>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dataset: OnceCell::new(),
        }
    }

    /// Load on first access, then hand out the same dataset.
    ///
    /// A failed load is not cached.
    pub fn get_or_load(&self) -> Result<Arc<EnrichedDataset>, LoaderError> {
        self.dataset
            .get_or_try_init(|| DataLoader::load_csv(&self.path).map(Arc::new))
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.get().is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

static DEFAULT_DATASET: Lazy<DatasetCache> = Lazy::new(|| DatasetCache::new(DEFAULT_SOURCE));

/// Process-wide dataset for the default source, loaded once.
pub fn load() -> Result<Arc<EnrichedDataset>, LoaderError> {
    DEFAULT_DATASET.get_or_load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal(Some("29.85")), Some(29.85));
        assert_eq!(parse_decimal(Some(" 108.15 ")), Some(108.15));
        assert_eq!(parse_decimal(Some(" ")), None);
        assert_eq!(parse_decimal(Some("")), None);
        assert_eq!(parse_decimal(Some("NaN")), None);
        assert_eq!(parse_decimal(Some("abc")), None);
        assert_eq!(parse_decimal(None), None);
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int(Some("34")), Some(34));
        assert_eq!(parse_int(Some("3.5")), None);
        assert_eq!(parse_int(None), None);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let cache = DatasetCache::new("definitely/not/here.csv");
        let err = cache.get_or_load().unwrap_err();
        assert!(matches!(err, LoaderError::DataUnavailable { .. }));
        assert!(!cache.is_loaded());
    }
}
