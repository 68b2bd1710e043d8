//! PEP and OFAC screening-set matchers

use crate::types::{present, AccountSide, Alert, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Read-only screening identifiers for one run: PEP customer ids and OFAC
/// account/entity identifiers. Both default to empty, which is also what a
/// disabled toggle or a failed list refresh degrades to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreeningSets {
    pub pep_ids: HashSet<String>,
    pub ofac_ids: HashSet<String>,
}

impl ScreeningSets {
    pub fn new(pep_ids: HashSet<String>, ofac_ids: HashSet<String>) -> Self {
        Self { pep_ids, ofac_ids }
    }

    pub fn is_empty(&self) -> bool {
        self.pep_ids.is_empty() && self.ofac_ids.is_empty()
    }
}

/// PEP match: customer id membership in the PEP set, keyed by customer.
pub fn pep_alerts(tx: &Transaction, sets: &ScreeningSets, enabled: bool) -> Vec<Alert> {
    if !enabled {
        return Vec::new();
    }
    match present(&tx.customer_id) {
        Some(cid) if sets.pep_ids.contains(cid) => vec![Alert::PepMatch {
            customer_id: cid.to_string(),
        }],
        _ => Vec::new(),
    }
}

/// OFAC match: sender and receiver accounts are tested independently, so a
/// single transaction can produce zero, one, or two alerts.
pub fn ofac_alerts(
    tx: &Transaction,
    record_id: &str,
    sets: &ScreeningSets,
    enabled: bool,
) -> Vec<Alert> {
    if !enabled {
        return Vec::new();
    }
    let mut alerts = Vec::new();
    let sides = [
        (AccountSide::Sender, &tx.sender_account),
        (AccountSide::Receiver, &tx.receiver_account),
    ];
    for (side, account) in sides {
        if let Some(acct) = present(account) {
            if sets.ofac_ids.contains(acct) {
                alerts.push(Alert::OfacMatch {
                    tx_id: record_id.to_string(),
                    side,
                    account: acct.to_string(),
                });
            }
        }
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RuleKind;

    fn sets() -> ScreeningSets {
        ScreeningSets::new(
            ["C-PEP"].into_iter().map(str::to_string).collect(),
            ["ACC-BAD"].into_iter().map(str::to_string).collect(),
        )
    }

    #[test]
    fn test_pep_match() {
        let tx = Transaction {
            customer_id: Some("C-PEP".to_string()),
            ..Transaction::default()
        };
        let alerts = pep_alerts(&tx, &sets(), true);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].subject(), "C-PEP");
        assert_eq!(alerts[0].detail(), "PEP customer");

        assert!(pep_alerts(&tx, &sets(), false).is_empty());
    }

    #[test]
    fn test_ofac_both_sides_match_independently() {
        let tx = Transaction {
            sender_account: Some("ACC-BAD".to_string()),
            receiver_account: Some("ACC-BAD".to_string()),
            ..Transaction::default()
        };
        let alerts = ofac_alerts(&tx, "T1", &sets(), true);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].detail(), "Sender ACC-BAD");
        assert_eq!(alerts[1].detail(), "Receiver ACC-BAD");
        assert!(alerts.iter().all(|a| a.kind() == RuleKind::OfacMatch));
    }

    #[test]
    fn test_empty_sets_never_match_regardless_of_toggle() {
        let tx = Transaction {
            customer_id: Some("C-PEP".to_string()),
            sender_account: Some("ACC-BAD".to_string()),
            ..Transaction::default()
        };
        let empty = ScreeningSets::default();
        assert!(pep_alerts(&tx, &empty, true).is_empty());
        assert!(pep_alerts(&tx, &empty, false).is_empty());
        assert!(ofac_alerts(&tx, "T1", &empty, true).is_empty());
        assert!(ofac_alerts(&tx, "T1", &empty, false).is_empty());
    }
}
