//! Core types: transaction records and typed alerts

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Customer risk rating carried on each transaction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskRating {
    Low,
    Medium,
    High,
}

impl RiskRating {
    /// Parse the upstream string form. Unknown values are `None`, never an error.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Low" | "low" | "LOW" => Some(RiskRating::Low),
            "Medium" | "medium" | "MEDIUM" => Some(RiskRating::Medium),
            "High" | "high" | "HIGH" => Some(RiskRating::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskRating::Low => "Low",
            RiskRating::Medium => "Medium",
            RiskRating::High => "High",
        }
    }
}

// Source feeds carry ratings as free-form strings; anything unrecognized
// degrades to "absent" rather than failing the whole record.
fn de_risk_rating<'de, D>(deserializer: D) -> Result<Option<RiskRating>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(RiskRating::parse))
}

/// One financial-transaction record. Every field is tolerant of absence so
/// that partially populated upstream records still deserialize; evaluators
/// apply their own default/skip policy per field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Transaction {
    pub tx_id: Option<String>,
    /// Raw timestamp as received; parsing happens per evaluator so that a
    /// garbled value can still be reported by the data-quality checks.
    pub timestamp: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub sender_account: Option<String>,
    pub receiver_account: Option<String>,
    pub sender_country: Option<String>,
    pub receiver_country: Option<String>,
    pub purpose_code: Option<String>,
    pub customer_id: Option<String>,
    #[serde(deserialize_with = "de_risk_rating")]
    pub risk_rating: Option<RiskRating>,
    pub kyc_completed: Option<bool>,
    /// Retention period in years.
    pub retention_period: Option<u32>,
    pub initiator_id: Option<String>,
    pub approver_id: Option<String>,
    pub source_of_funds: Option<String>,
}

impl Transaction {
    /// Alert-subject identity for this record: the `tx_id` when present and
    /// non-empty, otherwise derived from the record's position in the batch.
    pub fn record_id(&self, index: usize) -> String {
        match present(&self.tx_id) {
            Some(id) => id.to_string(),
            None => format!("tx#{index}"),
        }
    }

    /// Missing numeric fields default to zero.
    pub fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }

    /// Parse the raw timestamp. Accepts RFC 3339 and naive ISO-8601 forms
    /// (assumed UTC). Anything else is `None`.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
        None
    }
}

/// `Some(s)` only when the field is present and non-blank.
pub(crate) fn present(field: &Option<String>) -> Option<&str> {
    match field.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

/// Which side of a transaction an account-level match was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountSide {
    Sender,
    Receiver,
}

impl AccountSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountSide::Sender => "Sender",
            AccountSide::Receiver => "Receiver",
        }
    }
}

/// A typed compliance alert. One variant per rule kind, each carrying a
/// structured payload; `kind()`, `subject()` and `detail()` reduce an alert
/// to the flat `(rule, entity, detail)` triple used by downstream reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Alert {
    /// Transaction amount above the CTR threshold.
    LargeTxn { tx_id: String, amount: Decimal },
    /// KYC not completed for the transacting customer.
    CipFailure { tx_id: String },
    /// Customer rated High.
    HighRiskCustomer { tx_id: String, rating: RiskRating },
    /// Sender or receiver country is on the high-risk list.
    SanctionsHit {
        tx_id: String,
        sender_country: String,
        receiver_country: String,
    },
    /// Customer id found on the PEP list.
    PepMatch { customer_id: String },
    /// Account identifier found on the OFAC list.
    OfacMatch {
        tx_id: String,
        side: AccountSide,
        account: String,
    },
    /// A beneficial owner of a high-risk customer.
    EddHierarchyFailure { parent_id: String, child_id: String },
    /// Cash transaction above the SOF threshold with no source of funds.
    EddFailure { tx_id: String, threshold: Decimal },
    /// Per-customer transaction count above the SAR threshold.
    SuspiciousActivity { customer_id: String, count: usize },
    /// A required field is absent or empty.
    MissingField { tx_id: String, field: String },
    /// Amount is zero or negative.
    NegativeAmount { tx_id: String, amount: Decimal },
    /// Timestamp is unparsable or more than 24h old; the raw value is kept
    /// so a garbled timestamp is still visible in the report.
    StaleData { tx_id: String, timestamp: String },
    /// Summed per-customer exposure above the exposure threshold.
    HighCustomerExposure { customer_id: String, total: Decimal },
    /// Burst of transactions inside the velocity window.
    VelocityAnomaly {
        tx_id: String,
        count: usize,
        window_minutes: i64,
    },
    /// Settlement-chain country mismatch between consecutive transactions.
    GeoJump {
        tx_id: String,
        from_country: String,
        to_country: String,
        window_minutes: i64,
    },
    /// No retention period on the record.
    MissingRetention { tx_id: String },
    /// Retention period below the configured minimum.
    RetentionPeriodTooShort { tx_id: String, years: u32 },
    /// Initiator and approver are the same person.
    SodViolation { tx_id: String },
}

/// Closed set of rule kinds, one per alert variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    LargeTxn,
    CipFailure,
    HighRiskCustomer,
    SanctionsHit,
    PepMatch,
    OfacMatch,
    EddHierarchyFailure,
    EddFailure,
    SuspiciousActivity,
    MissingField,
    NegativeAmount,
    StaleData,
    HighCustomerExposure,
    VelocityAnomaly,
    GeoJump,
    MissingRetention,
    RetentionPeriodTooShort,
    SodViolation,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::LargeTxn => "LargeTxn",
            RuleKind::CipFailure => "CIPFailure",
            RuleKind::HighRiskCustomer => "HighRiskCustomer",
            RuleKind::SanctionsHit => "SanctionsHit",
            RuleKind::PepMatch => "PEPMatch",
            RuleKind::OfacMatch => "OFACMatch",
            RuleKind::EddHierarchyFailure => "EDDHierarchyFailure",
            RuleKind::EddFailure => "EDDFailure",
            RuleKind::SuspiciousActivity => "SuspiciousActivity",
            RuleKind::MissingField => "MissingField",
            RuleKind::NegativeAmount => "NegativeAmount",
            RuleKind::StaleData => "StaleData",
            RuleKind::HighCustomerExposure => "HighCustomerExposure",
            RuleKind::VelocityAnomaly => "VelocityAnomaly",
            RuleKind::GeoJump => "GeoJump",
            RuleKind::MissingRetention => "MissingRetention",
            RuleKind::RetentionPeriodTooShort => "RetentionPeriodTooShort",
            RuleKind::SodViolation => "SoDViolation",
        }
    }

    /// Regulation family label for presentation layers.
    pub fn regulation(&self) -> &'static str {
        match self {
            RuleKind::LargeTxn => "BSA/AML (CTR)",
            RuleKind::CipFailure => "KYC/CIP",
            RuleKind::HighRiskCustomer => "AML",
            RuleKind::SanctionsHit => "AML (High-Risk Geography)",
            RuleKind::PepMatch => "PEP Screening",
            RuleKind::OfacMatch => "OFAC Sanctions",
            RuleKind::EddHierarchyFailure | RuleKind::EddFailure => "EDD",
            RuleKind::SuspiciousActivity => "SAR",
            RuleKind::MissingField
            | RuleKind::NegativeAmount
            | RuleKind::StaleData
            | RuleKind::HighCustomerExposure => "BCBS 239",
            RuleKind::VelocityAnomaly | RuleKind::GeoJump => "AML (Pattern)",
            RuleKind::MissingRetention | RuleKind::RetentionPeriodTooShort => "GDPR",
            RuleKind::SodViolation => "SOX",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Alert {
    pub fn kind(&self) -> RuleKind {
        match self {
            Alert::LargeTxn { .. } => RuleKind::LargeTxn,
            Alert::CipFailure { .. } => RuleKind::CipFailure,
            Alert::HighRiskCustomer { .. } => RuleKind::HighRiskCustomer,
            Alert::SanctionsHit { .. } => RuleKind::SanctionsHit,
            Alert::PepMatch { .. } => RuleKind::PepMatch,
            Alert::OfacMatch { .. } => RuleKind::OfacMatch,
            Alert::EddHierarchyFailure { .. } => RuleKind::EddHierarchyFailure,
            Alert::EddFailure { .. } => RuleKind::EddFailure,
            Alert::SuspiciousActivity { .. } => RuleKind::SuspiciousActivity,
            Alert::MissingField { .. } => RuleKind::MissingField,
            Alert::NegativeAmount { .. } => RuleKind::NegativeAmount,
            Alert::StaleData { .. } => RuleKind::StaleData,
            Alert::HighCustomerExposure { .. } => RuleKind::HighCustomerExposure,
            Alert::VelocityAnomaly { .. } => RuleKind::VelocityAnomaly,
            Alert::GeoJump { .. } => RuleKind::GeoJump,
            Alert::MissingRetention { .. } => RuleKind::MissingRetention,
            Alert::RetentionPeriodTooShort { .. } => RuleKind::RetentionPeriodTooShort,
            Alert::SodViolation { .. } => RuleKind::SodViolation,
        }
    }

    /// The entity the alert is about: a transaction id for per-record rules,
    /// a customer or parent id for batch and hierarchy rules.
    pub fn subject(&self) -> &str {
        match self {
            Alert::LargeTxn { tx_id, .. }
            | Alert::CipFailure { tx_id }
            | Alert::HighRiskCustomer { tx_id, .. }
            | Alert::SanctionsHit { tx_id, .. }
            | Alert::OfacMatch { tx_id, .. }
            | Alert::EddFailure { tx_id, .. }
            | Alert::MissingField { tx_id, .. }
            | Alert::NegativeAmount { tx_id, .. }
            | Alert::StaleData { tx_id, .. }
            | Alert::VelocityAnomaly { tx_id, .. }
            | Alert::GeoJump { tx_id, .. }
            | Alert::MissingRetention { tx_id }
            | Alert::RetentionPeriodTooShort { tx_id, .. }
            | Alert::SodViolation { tx_id } => tx_id,
            Alert::PepMatch { customer_id }
            | Alert::SuspiciousActivity { customer_id, .. }
            | Alert::HighCustomerExposure { customer_id, .. } => customer_id,
            Alert::EddHierarchyFailure { parent_id, .. } => parent_id,
        }
    }

    /// Flat human-readable detail, matching the legacy report format.
    pub fn detail(&self) -> String {
        match self {
            Alert::LargeTxn { amount, .. } => amount.to_string(),
            Alert::CipFailure { .. } => "KYC not completed".to_string(),
            Alert::HighRiskCustomer { rating, .. } => rating.as_str().to_string(),
            Alert::SanctionsHit {
                sender_country,
                receiver_country,
                ..
            } => format!("{sender_country}→{receiver_country}"),
            Alert::PepMatch { .. } => "PEP customer".to_string(),
            Alert::OfacMatch { side, account, .. } => format!("{} {account}", side.as_str()),
            Alert::EddHierarchyFailure { child_id, .. } => {
                format!("High-risk child {child_id}")
            }
            Alert::EddFailure { threshold, .. } => format!("Missing SOF >{threshold}"),
            Alert::SuspiciousActivity { count, .. } => count.to_string(),
            Alert::MissingField { field, .. } => field.clone(),
            Alert::NegativeAmount { amount, .. } => amount.to_string(),
            Alert::StaleData { timestamp, .. } => timestamp.clone(),
            Alert::HighCustomerExposure { total, .. } => total.to_string(),
            Alert::VelocityAnomaly {
                count,
                window_minutes,
                ..
            } => format!("{count} txns in {window_minutes}m"),
            Alert::GeoJump {
                from_country,
                to_country,
                window_minutes,
                ..
            } => format!("{from_country}→{to_country} in {window_minutes}m"),
            Alert::MissingRetention { .. } => "No retention_period".to_string(),
            Alert::RetentionPeriodTooShort { years, .. } => years.to_string(),
            Alert::SodViolation { .. } => "Initiator==Approver".to_string(),
        }
    }
}
