//! Compliance Rule-Evaluation Engine
//!
//! Deterministic batch scorer for financial-transaction records. One run is
//! a pure function of `(transactions, config, screening sets, ownership
//! graph, now)` and produces a typed alert list covering AML monitoring,
//! PEP/OFAC screening, beneficial-ownership and source-of-funds checks,
//! data-quality aggregation, retention and duties-segregation checks, and
//! per-customer velocity / geo-jump sequence anomalies.

#![forbid(unsafe_code)]

pub mod batch;
pub mod config;
pub mod engine;
pub mod ownership;
pub mod rules;
pub mod screening;
pub mod types;

pub use config::EngineConfig;
pub use engine::{ComplianceEngine, RunSummary};
pub use ownership::{OwnershipGraph, OwnershipIndex};
pub use screening::ScreeningSets;
pub use types::{AccountSide, Alert, RiskRating, RuleKind, Transaction};
