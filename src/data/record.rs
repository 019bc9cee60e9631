//! Customer Record Module
//! Typed Telco customer rows and the derived churn/risk columns.

use serde::Serialize;
use std::fmt;

/// Outcome value marking a churned customer.
pub const CHURN_SENTINEL: &str = "Yes";

/// Contract value that adds the largest risk weight.
pub const MONTH_TO_MONTH: &str = "Month-to-month";
/// Internet service value that adds risk weight.
pub const FIBER_OPTIC: &str = "Fiber optic";

// Risk weights and thresholds
const WEIGHT_MONTH_TO_MONTH: u8 = 3;
const WEIGHT_FIBER_OPTIC: u8 = 2;
const WEIGHT_SHORT_TENURE: u8 = 2;
const WEIGHT_HIGH_CHARGE: u8 = 1;
const WEIGHT_NO_TECH_SUPPORT: u8 = 1;
const WEIGHT_NO_ONLINE_SECURITY: u8 = 1;
const SHORT_TENURE_MONTHS: i64 = 12;
const HIGH_MONTHLY_CHARGE: f64 = 70.0;

/// Highest possible risk score.
pub const MAX_RISK_SCORE: u8 = WEIGHT_MONTH_TO_MONTH
    + WEIGHT_FIBER_OPTIC
    + WEIGHT_SHORT_TENURE
    + WEIGHT_HIGH_CHARGE
    + WEIGHT_NO_TECH_SUPPORT
    + WEIGHT_NO_ONLINE_SECURITY;

/// Senior citizen label mapped from the 0/1 source flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SeniorLabel {
    Yes,
    No,
}

impl SeniorLabel {
    pub const ALL: [SeniorLabel; 2] = [SeniorLabel::Yes, SeniorLabel::No];

    /// Map the numeric source flag. Anything other than 0 or 1 is rejected.
    pub fn from_flag(flag: i64) -> Option<Self> {
        match flag {
            0 => Some(SeniorLabel::No),
            1 => Some(SeniorLabel::Yes),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeniorLabel::Yes => "Yes",
            SeniorLabel::No => "No",
        }
    }
}

impl fmt::Display for SeniorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tenure bucket.
///
/// Buckets are closed on the right: a tenure sitting on a shared edge belongs
/// to the lower bucket, and the first bucket also takes tenure 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TenureGroup {
    UpTo12,
    From13To24,
    From25To48,
    From49To72,
}

impl TenureGroup {
    pub const ALL: [TenureGroup; 4] = [
        TenureGroup::UpTo12,
        TenureGroup::From13To24,
        TenureGroup::From25To48,
        TenureGroup::From49To72,
    ];

    /// Bin edges shared by the four buckets.
    pub const EDGES: [i64; 5] = [0, 12, 24, 48, 72];

    /// Assign a tenure (months) to its bucket, `None` outside [0, 72].
    pub fn from_tenure(tenure: i64) -> Option<Self> {
        let edges = Self::EDGES;
        if tenure < edges[0] || tenure > edges[4] {
            return None;
        }
        Self::ALL
            .iter()
            .zip(edges[1..].iter())
            .find(|(_, &upper)| tenure <= upper)
            .map(|(group, _)| *group)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TenureGroup::UpTo12 => "0-12 mo",
            TenureGroup::From13To24 => "13-24 mo",
            TenureGroup::From25To48 => "25-48 mo",
            TenureGroup::From49To72 => "49-72 mo",
        }
    }
}

impl fmt::Display for TenureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse risk bucket over the risk score: (-1,2], (2,5], (5,10].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Medium, RiskTier::High];

    pub fn from_score(score: u8) -> Self {
        match score {
            0..=2 => RiskTier::Low,
            3..=5 => RiskTier::Medium,
            _ => RiskTier::High,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low Risk",
            RiskTier::Medium => "Medium Risk",
            RiskTier::High => "High Risk",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Three-valued service flag. The source spells the third state
/// "No internet service" or "No phone service".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ServiceFlag {
    Yes,
    No,
    NotApplicable,
}

impl ServiceFlag {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Yes" => ServiceFlag::Yes,
            "No" => ServiceFlag::No,
            _ => ServiceFlag::NotApplicable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceFlag::Yes => "Yes",
            ServiceFlag::No => "No",
            ServiceFlag::NotApplicable => "N/A",
        }
    }
}

/// The six add-on services compared in the retention breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AddOnService {
    OnlineSecurity,
    TechSupport,
    OnlineBackup,
    DeviceProtection,
    StreamingTv,
    StreamingMovies,
}

impl AddOnService {
    pub const ALL: [AddOnService; 6] = [
        AddOnService::OnlineSecurity,
        AddOnService::TechSupport,
        AddOnService::OnlineBackup,
        AddOnService::DeviceProtection,
        AddOnService::StreamingTv,
        AddOnService::StreamingMovies,
    ];

    /// Source column name.
    pub fn column(&self) -> &'static str {
        match self {
            AddOnService::OnlineSecurity => "OnlineSecurity",
            AddOnService::TechSupport => "TechSupport",
            AddOnService::OnlineBackup => "OnlineBackup",
            AddOnService::DeviceProtection => "DeviceProtection",
            AddOnService::StreamingTv => "StreamingTV",
            AddOnService::StreamingMovies => "StreamingMovies",
        }
    }
}

impl fmt::Display for AddOnService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Per-customer add-on flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddOns {
    pub online_security: ServiceFlag,
    pub tech_support: ServiceFlag,
    pub online_backup: ServiceFlag,
    pub device_protection: ServiceFlag,
    pub streaming_tv: ServiceFlag,
    pub streaming_movies: ServiceFlag,
}

impl AddOns {
    pub fn get(&self, service: AddOnService) -> ServiceFlag {
        match service {
            AddOnService::OnlineSecurity => self.online_security,
            AddOnService::TechSupport => self.tech_support,
            AddOnService::OnlineBackup => self.online_backup,
            AddOnService::DeviceProtection => self.device_protection,
            AddOnService::StreamingTv => self.streaming_tv,
            AddOnService::StreamingMovies => self.streaming_movies,
        }
    }
}

/// A cleaned source row, before derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCustomer {
    pub customer_id: String,
    pub gender: String,
    pub senior_citizen: i64,
    pub partner: String,
    pub dependents: String,
    pub tenure: i64,
    pub phone_service: String,
    pub multiple_lines: String,
    pub internet_service: String,
    pub add_ons: AddOns,
    pub contract: String,
    pub paperless_billing: String,
    pub payment_method: String,
    pub monthly_charges: f64,
    pub total_charges: f64,
    pub churn: String,
}

/// Enriched customer row. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub gender: String,
    pub partner: String,
    pub dependents: String,
    pub tenure: i64,
    pub phone_service: String,
    pub multiple_lines: String,
    pub internet_service: String,
    pub add_ons: AddOns,
    pub contract: String,
    pub paperless_billing: String,
    pub payment_method: String,
    pub monthly_charges: f64,
    pub total_charges: f64,
    pub churned: bool,
    pub senior_label: SeniorLabel,
    pub tenure_group: Option<TenureGroup>,
    pub risk_score: u8,
    pub risk_tier: RiskTier,
}

impl CustomerRecord {
    /// Derive churn, senior, tenure and risk columns from a cleaned row.
    ///
    /// Returns `None` when the senior flag is not 0/1.
    pub fn enrich(raw: RawCustomer) -> Option<Self> {
        let senior_label = SeniorLabel::from_flag(raw.senior_citizen)?;
        let risk_score = risk_score(&raw);

        Some(Self {
            churned: raw.churn.trim() == CHURN_SENTINEL,
            senior_label,
            tenure_group: TenureGroup::from_tenure(raw.tenure),
            risk_score,
            risk_tier: RiskTier::from_score(risk_score),
            customer_id: raw.customer_id,
            gender: raw.gender,
            partner: raw.partner,
            dependents: raw.dependents,
            tenure: raw.tenure,
            phone_service: raw.phone_service,
            multiple_lines: raw.multiple_lines,
            internet_service: raw.internet_service,
            add_ons: raw.add_ons,
            contract: raw.contract,
            paperless_billing: raw.paperless_billing,
            payment_method: raw.payment_method,
            monthly_charges: raw.monthly_charges,
            total_charges: raw.total_charges,
        })
    }

    /// "Yes"/"No" churn label as shown in tables.
    pub fn churn_label(&self) -> &'static str {
        if self.churned {
            "Yes"
        } else {
            "No"
        }
    }
}

/// Weighted churn-propensity heuristic, always within [0, MAX_RISK_SCORE].
pub fn risk_score(raw: &RawCustomer) -> u8 {
    let indicators = [
        (raw.contract == MONTH_TO_MONTH, WEIGHT_MONTH_TO_MONTH),
        (raw.internet_service == FIBER_OPTIC, WEIGHT_FIBER_OPTIC),
        (raw.tenure < SHORT_TENURE_MONTHS, WEIGHT_SHORT_TENURE),
        (raw.monthly_charges > HIGH_MONTHLY_CHARGE, WEIGHT_HIGH_CHARGE),
        (
            raw.add_ons.tech_support == ServiceFlag::No,
            WEIGHT_NO_TECH_SUPPORT,
        ),
        (
            raw.add_ons.online_security == ServiceFlag::No,
            WEIGHT_NO_ONLINE_SECURITY,
        ),
    ];

    indicators
        .iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, weight)| weight)
        .sum()
}
