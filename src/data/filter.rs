//! Filter Module
//! Sidebar filter selection and the filtered view it produces.

use crate::data::loader::EnrichedDataset;
use crate::data::record::{CustomerRecord, SeniorLabel, TenureGroup};
use std::collections::BTreeSet;

/// Distinct values observed per filter dimension, used to populate controls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    /// First-appearance order
    pub contracts: Vec<String>,
    /// First-appearance order
    pub internet_services: Vec<String>,
    pub tenure_groups: Vec<TenureGroup>,
    pub senior_labels: Vec<SeniorLabel>,
}

impl FilterOptions {
    pub fn from_dataset(dataset: &EnrichedDataset) -> Self {
        let mut contracts: Vec<String> = Vec::new();
        let mut internet_services: Vec<String> = Vec::new();
        let mut tenure_seen = BTreeSet::new();
        let mut senior_seen = BTreeSet::new();

        for record in dataset.records() {
            if !contracts.contains(&record.contract) {
                contracts.push(record.contract.clone());
            }
            if !internet_services.contains(&record.internet_service) {
                internet_services.push(record.internet_service.clone());
            }
            if let Some(group) = record.tenure_group {
                tenure_seen.insert(group);
            }
            senior_seen.insert(record.senior_label);
        }

        Self {
            contracts,
            internet_services,
            tenure_groups: tenure_seen.into_iter().collect(),
            senior_labels: SeniorLabel::ALL
                .into_iter()
                .filter(|label| senior_seen.contains(label))
                .collect(),
        }
    }
}

/// Allowed values per dimension. An empty set admits nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub contracts: BTreeSet<String>,
    pub internet_services: BTreeSet<String>,
    pub tenure_groups: BTreeSet<TenureGroup>,
    pub senior_labels: BTreeSet<SeniorLabel>,
}

impl FilterSelection {
    /// Select every observed value; the dashboard's default.
    pub fn all(options: &FilterOptions) -> Self {
        Self {
            contracts: options.contracts.iter().cloned().collect(),
            internet_services: options.internet_services.iter().cloned().collect(),
            tenure_groups: options.tenure_groups.iter().copied().collect(),
            senior_labels: options.senior_labels.iter().copied().collect(),
        }
    }

    /// True when any dimension has nothing selected.
    pub fn has_empty_dimension(&self) -> bool {
        self.contracts.is_empty()
            || self.internet_services.is_empty()
            || self.tenure_groups.is_empty()
            || self.senior_labels.is_empty()
    }

    pub fn matches(&self, record: &CustomerRecord) -> bool {
        self.contracts.contains(&record.contract)
            && self.internet_services.contains(&record.internet_service)
            && record
                .tenure_group
                .is_some_and(|group| self.tenure_groups.contains(&group))
            && self.senior_labels.contains(&record.senior_label)
    }

    /// Apply the selection. The dataset itself is never touched.
    pub fn apply<'a>(&self, dataset: &'a EnrichedDataset) -> FilteredView<'a> {
        let records = if self.has_empty_dimension() {
            Vec::new()
        } else {
            dataset
                .records()
                .iter()
                .filter(|record| self.matches(record))
                .collect()
        };
        FilteredView { records }
    }
}

/// Free-function form of [`FilterSelection::apply`].
pub fn apply<'a>(dataset: &'a EnrichedDataset, selection: &FilterSelection) -> FilteredView<'a> {
    selection.apply(dataset)
}

/// Records surviving a selection, in dataset order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView<'a> {
    records: Vec<&'a CustomerRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn from_records(records: Vec<&'a CustomerRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[&'a CustomerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CustomerRecord> + '_ {
        self.records.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::tests::raw_customer;
    use std::path::PathBuf;

    fn dataset() -> EnrichedDataset {
        let rows = [
            ("a", "Month-to-month", "Fiber optic", 5, 0),
            ("b", "One year", "DSL", 20, 1),
            ("c", "Two year", "No", 60, 0),
            ("d", "Month-to-month", "DSL", 40, 1),
            ("e", "Two year", "Fiber optic", 72, 0),
        ];
        let records = rows
            .iter()
            .map(|(id, contract, internet, tenure, senior)| {
                let mut raw = raw_customer(id);
                raw.contract = contract.to_string();
                raw.internet_service = internet.to_string();
                raw.tenure = *tenure;
                raw.senior_citizen = *senior;
                CustomerRecord::enrich(raw).unwrap()
            })
            .collect();
        EnrichedDataset::new(PathBuf::from("test.csv"), records, 0)
    }

    #[test]
    fn test_options_first_appearance_order() {
        let options = FilterOptions::from_dataset(&dataset());
        assert_eq!(options.contracts, vec!["Month-to-month", "One year", "Two year"]);
        assert_eq!(options.internet_services, vec!["Fiber optic", "DSL", "No"]);
        assert_eq!(options.tenure_groups, TenureGroup::ALL.to_vec());
        assert_eq!(options.senior_labels, vec![SeniorLabel::Yes, SeniorLabel::No]);
    }

    #[test]
    fn test_all_selection_keeps_everything() {
        let data = dataset();
        let selection = FilterSelection::all(&FilterOptions::from_dataset(&data));
        assert_eq!(selection.apply(&data).len(), data.len());
    }

    #[test]
    fn test_conjunction_across_dimensions() {
        let data = dataset();
        let mut selection = FilterSelection::all(&FilterOptions::from_dataset(&data));
        selection.contracts = ["Month-to-month".to_string()].into_iter().collect();
        selection.senior_labels = [SeniorLabel::Yes].into_iter().collect();

        let view = apply(&data, &selection);
        let ids: Vec<&str> = view.iter().map(|r| r.customer_id.as_str()).collect();
        assert_eq!(ids, vec!["d"]);
    }

    #[test]
    fn test_empty_dimension_yields_empty_view() {
        let data = dataset();
        let mut selection = FilterSelection::all(&FilterOptions::from_dataset(&data));
        selection.tenure_groups.clear();
        assert!(selection.has_empty_dimension());
        assert!(selection.apply(&data).is_empty());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let data = dataset();
        let mut selection = FilterSelection::all(&FilterOptions::from_dataset(&data));
        selection.internet_services.remove("DSL");
        assert_eq!(selection.apply(&data), selection.apply(&data));
    }

    #[test]
    fn test_unbucketed_tenure_never_matches() {
        let mut raw = raw_customer("z");
        raw.tenure = 80;
        let record = CustomerRecord::enrich(raw).unwrap();
        let data = EnrichedDataset::new(PathBuf::from("t.csv"), vec![record], 0);

        let mut selection = FilterSelection::all(&FilterOptions::from_dataset(&data));
        selection.tenure_groups = TenureGroup::ALL.into_iter().collect();
        assert!(selection.apply(&data).is_empty());
    }
}
