//! Per-record evaluators: AML predicates, source-of-funds, retention,
//! duties segregation. Each operates on one transaction, is independent of
//! the others, and never fails: missing fields are treated as "condition
//! not met" except where absence is itself the finding.

use crate::config::EngineConfig;
use crate::types::{present, Alert, RiskRating, Transaction};

/// AML monitoring checks, emitted in fixed order: large transaction,
/// CIP/KYC failure, high-risk customer, high-risk jurisdiction.
pub fn aml_alerts(tx: &Transaction, record_id: &str, config: &EngineConfig) -> Vec<Alert> {
    let mut alerts = Vec::new();

    let amount = tx.amount_or_zero();
    if amount > config.ctr_threshold {
        alerts.push(Alert::LargeTxn {
            tx_id: record_id.to_string(),
            amount,
        });
    }

    // Absent flag counts as not completed.
    if !tx.kyc_completed.unwrap_or(false) {
        alerts.push(Alert::CipFailure {
            tx_id: record_id.to_string(),
        });
    }

    if tx.risk_rating == Some(RiskRating::High) {
        alerts.push(Alert::HighRiskCustomer {
            tx_id: record_id.to_string(),
            rating: RiskRating::High,
        });
    }

    let sender = present(&tx.sender_country);
    let receiver = present(&tx.receiver_country);
    let hits_high_risk = |country: Option<&str>| {
        country.is_some_and(|c| config.high_risk_countries.contains(c))
    };
    if hits_high_risk(sender) || hits_high_risk(receiver) {
        alerts.push(Alert::SanctionsHit {
            tx_id: record_id.to_string(),
            sender_country: sender.unwrap_or("?").to_string(),
            receiver_country: receiver.unwrap_or("?").to_string(),
        });
    }

    alerts
}

/// Source-of-funds check: cash above the SOF threshold must carry one.
pub fn sof_alerts(tx: &Transaction, record_id: &str, config: &EngineConfig) -> Vec<Alert> {
    if !config.require_sof {
        return Vec::new();
    }
    let is_cash = present(&tx.purpose_code) == Some("CASH");
    if is_cash
        && tx.amount_or_zero() > config.sof_threshold
        && present(&tx.source_of_funds).is_none()
    {
        return vec![Alert::EddFailure {
            tx_id: record_id.to_string(),
            threshold: config.sof_threshold,
        }];
    }
    Vec::new()
}

/// Retention-policy check: the period must be present and at least the
/// configured minimum.
pub fn retention_alerts(tx: &Transaction, record_id: &str, config: &EngineConfig) -> Vec<Alert> {
    match tx.retention_period {
        None => vec![Alert::MissingRetention {
            tx_id: record_id.to_string(),
        }],
        Some(years) if years < config.min_retention_years => {
            vec![Alert::RetentionPeriodTooShort {
                tx_id: record_id.to_string(),
                years,
            }]
        }
        Some(_) => Vec::new(),
    }
}

/// Duties-segregation check: initiator and approver must differ.
pub fn segregation_alerts(tx: &Transaction, record_id: &str) -> Vec<Alert> {
    if let (Some(initiator), Some(approver)) =
        (present(&tx.initiator_id), present(&tx.approver_id))
    {
        if initiator == approver {
            return vec![Alert::SodViolation {
                tx_id: record_id.to_string(),
            }];
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RuleKind;
    use rust_decimal::Decimal;

    fn base_tx() -> Transaction {
        Transaction {
            tx_id: Some("T1".to_string()),
            amount: Some(Decimal::from(500)),
            kyc_completed: Some(true),
            sender_country: Some("US".to_string()),
            receiver_country: Some("GB".to_string()),
            retention_period: Some(7),
            ..Transaction::default()
        }
    }

    #[test]
    fn test_large_txn_strict_threshold() {
        let config = EngineConfig::default();

        let mut tx = base_tx();
        tx.amount = Some(Decimal::from(10_000));
        assert!(aml_alerts(&tx, "T1", &config).is_empty());

        tx.amount = Some(Decimal::from(10_001));
        let alerts = aml_alerts(&tx, "T1", &config);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind(), RuleKind::LargeTxn);
        assert_eq!(alerts[0].detail(), "10001");
    }

    #[test]
    fn test_cip_failure_on_absent_kyc() {
        let config = EngineConfig::default();

        let mut tx = base_tx();
        tx.kyc_completed = None;
        let alerts = aml_alerts(&tx, "T1", &config);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind(), RuleKind::CipFailure);

        tx.kyc_completed = Some(false);
        assert_eq!(aml_alerts(&tx, "T1", &config).len(), 1);
    }

    #[test]
    fn test_sanctions_hit_on_either_side() {
        let config = EngineConfig::default();

        let mut tx = base_tx();
        tx.receiver_country = Some("IR".to_string());
        let alerts = aml_alerts(&tx, "T1", &config);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].detail(), "US→IR");

        // Missing sender country still reports the corridor.
        tx.sender_country = None;
        let alerts = aml_alerts(&tx, "T1", &config);
        assert_eq!(alerts[0].detail(), "?→IR");
    }

    #[test]
    fn test_aml_alert_ordering_within_record() {
        let config = EngineConfig::default();
        let tx = Transaction {
            tx_id: Some("T1".to_string()),
            amount: Some(Decimal::from(20_000)),
            kyc_completed: Some(false),
            risk_rating: Some(RiskRating::High),
            sender_country: Some("KP".to_string()),
            receiver_country: Some("US".to_string()),
            ..Transaction::default()
        };
        let kinds: Vec<_> = aml_alerts(&tx, "T1", &config)
            .iter()
            .map(Alert::kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                RuleKind::LargeTxn,
                RuleKind::CipFailure,
                RuleKind::HighRiskCustomer,
                RuleKind::SanctionsHit,
            ]
        );
    }

    #[test]
    fn test_sof_requires_all_conditions() {
        let config = EngineConfig::default();

        let mut tx = base_tx();
        tx.purpose_code = Some("CASH".to_string());
        tx.amount = Some(Decimal::from(15_000));
        tx.source_of_funds = None;
        let alerts = sof_alerts(&tx, "T1", &config);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].detail(), "Missing SOF >10000");

        // Presence of SOF clears it.
        tx.source_of_funds = Some("salary".to_string());
        assert!(sof_alerts(&tx, "T1", &config).is_empty());

        // Non-cash purpose is out of scope.
        tx.source_of_funds = None;
        tx.purpose_code = Some("TRANSFER".to_string());
        assert!(sof_alerts(&tx, "T1", &config).is_empty());

        // Toggle off disables the rule entirely.
        tx.purpose_code = Some("CASH".to_string());
        let mut off = EngineConfig::default();
        off.require_sof = false;
        assert!(sof_alerts(&tx, "T1", &off).is_empty());
    }

    #[test]
    fn test_retention_rules() {
        let config = EngineConfig::default();

        let mut tx = base_tx();
        assert!(retention_alerts(&tx, "T1", &config).is_empty());

        tx.retention_period = Some(3);
        let alerts = retention_alerts(&tx, "T1", &config);
        assert_eq!(alerts[0].kind(), RuleKind::RetentionPeriodTooShort);
        assert_eq!(alerts[0].detail(), "3");

        tx.retention_period = None;
        let alerts = retention_alerts(&tx, "T1", &config);
        assert_eq!(alerts[0].kind(), RuleKind::MissingRetention);
        assert_eq!(alerts[0].detail(), "No retention_period");
    }

    #[test]
    fn test_segregation_of_duties() {
        let mut tx = base_tx();
        tx.initiator_id = Some("EMP-7".to_string());
        tx.approver_id = Some("EMP-7".to_string());
        let alerts = segregation_alerts(&tx, "T1");
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].detail(), "Initiator==Approver");

        tx.approver_id = Some("EMP-9".to_string());
        assert!(segregation_alerts(&tx, "T1").is_empty());

        // Absent approver is not a violation.
        tx.approver_id = None;
        assert!(segregation_alerts(&tx, "T1").is_empty());
    }
}
