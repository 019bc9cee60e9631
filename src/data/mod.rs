//! Data module - CSV loading, enrichment and filtering

pub mod filter;
pub mod loader;
pub mod record;

pub use filter::{apply, FilterOptions, FilterSelection, FilteredView};
pub use loader::{load, DataLoader, DatasetCache, EnrichedDataset, LoaderError, DEFAULT_SOURCE};
pub use record::{
    AddOnService, AddOns, CustomerRecord, RawCustomer, RiskTier, SeniorLabel, ServiceFlag,
    TenureGroup,
};
