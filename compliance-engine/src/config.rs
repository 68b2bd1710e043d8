//! Engine configuration: thresholds and toggles

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// All thresholds and toggles for one engine run. Immutable for the
/// duration of an invocation; the engine performs no validation on it;
/// contradictory values (e.g. negative thresholds) are a caller error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// CTR reporting threshold; strictly-greater amounts are flagged.
    pub ctr_threshold: Decimal,

    /// Per-customer summed-amount threshold (strict).
    pub exposure_threshold: Decimal,

    /// Per-customer transaction-count threshold (strict).
    pub sar_threshold: usize,

    /// Minimum acceptable retention period in years.
    pub min_retention_years: u32,

    /// Cash transactions above this amount require a source of funds.
    pub sof_threshold: Decimal,

    /// Window-size threshold (strict) for the velocity detector.
    pub velocity_threshold: usize,

    /// Sliding-window width for the velocity detector.
    pub velocity_window_minutes: i64,

    /// Maximum gap between consecutive transactions for a geo-jump.
    pub geojump_window_minutes: i64,

    /// Enable PEP list screening.
    pub enable_pep: bool,

    /// Enable OFAC account screening.
    pub enable_ofac: bool,

    /// Enforce the source-of-funds check on cash transactions.
    pub require_sof: bool,

    /// ISO country codes treated as high-risk jurisdictions.
    pub high_risk_countries: BTreeSet<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ctr_threshold: Decimal::from(10_000),
            exposure_threshold: Decimal::from(100_000),
            sar_threshold: 5,
            min_retention_years: 5,
            sof_threshold: Decimal::from(10_000),
            velocity_threshold: 5,
            velocity_window_minutes: 10,
            geojump_window_minutes: 10,
            enable_pep: true,
            enable_ofac: true,
            require_sof: true,
            high_risk_countries: ["IR", "KP", "NG", "SY", "VE"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}
