//! Beneficial-ownership graph and the EDD hierarchy evaluator

use crate::types::{present, Alert, RiskRating, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Parent → children ownership mapping, read-only per run. Backed by
/// ordered maps so that iteration (and therefore derived alert order) is
/// deterministic for a given graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnershipGraph {
    children: BTreeMap<String, BTreeSet<String>>,
}

impl OwnershipGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_edge(&mut self, parent: impl Into<String>, child: impl Into<String>) {
        self.children
            .entry(parent.into())
            .or_default()
            .insert(child.into());
    }

    pub fn children_of(&self, parent: &str) -> Option<&BTreeSet<String>> {
        self.children.get(parent)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn parent_count(&self) -> usize {
        self.children.len()
    }

    /// Build the child → parents reverse index once per run. Parents of a
    /// child come out in the graph's sorted parent order.
    pub fn reverse_index(&self) -> OwnershipIndex {
        let mut parents: HashMap<String, Vec<String>> = HashMap::new();
        for (parent, children) in &self.children {
            for child in children {
                parents.entry(child.clone()).or_default().push(parent.clone());
            }
        }
        OwnershipIndex { parents }
    }
}

impl<P, C> FromIterator<(P, C)> for OwnershipGraph
where
    P: Into<String>,
    C: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let mut graph = OwnershipGraph::new();
        for (parent, child) in iter {
            graph.insert_edge(parent, child);
        }
        graph
    }
}

/// Precomputed reverse lookup, child → parents. Makes the per-transaction
/// hierarchy check an amortized O(1) map hit instead of a graph scan.
#[derive(Debug, Clone, Default)]
pub struct OwnershipIndex {
    parents: HashMap<String, Vec<String>>,
}

impl OwnershipIndex {
    pub fn parents_of(&self, child: &str) -> &[String] {
        self.parents.get(child).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// EDD hierarchy check: every beneficial owner of a high-risk customer is
/// flagged, keyed by the parent entity.
pub fn hierarchy_alerts(tx: &Transaction, index: &OwnershipIndex) -> Vec<Alert> {
    if tx.risk_rating != Some(RiskRating::High) {
        return Vec::new();
    }
    let Some(customer_id) = present(&tx.customer_id) else {
        return Vec::new();
    };
    index
        .parents_of(customer_id)
        .iter()
        .map(|parent| Alert::EddHierarchyFailure {
            parent_id: parent.clone(),
            child_id: customer_id.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> OwnershipGraph {
        [
            ("HOLDCO-A", "C1"),
            ("HOLDCO-A", "C2"),
            ("HOLDCO-B", "C1"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_reverse_index() {
        let index = graph().reverse_index();
        assert_eq!(index.parents_of("C1"), ["HOLDCO-A", "HOLDCO-B"]);
        assert_eq!(index.parents_of("C2"), ["HOLDCO-A"]);
        assert!(index.parents_of("C3").is_empty());
    }

    #[test]
    fn test_hierarchy_alerts_only_for_high_risk() {
        let index = graph().reverse_index();
        let mut tx = Transaction {
            customer_id: Some("C1".to_string()),
            risk_rating: Some(RiskRating::High),
            ..Transaction::default()
        };

        let alerts = hierarchy_alerts(&tx, &index);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].subject(), "HOLDCO-A");
        assert_eq!(alerts[0].detail(), "High-risk child C1");
        assert_eq!(alerts[1].subject(), "HOLDCO-B");

        tx.risk_rating = Some(RiskRating::Medium);
        assert!(hierarchy_alerts(&tx, &index).is_empty());
    }

    #[test]
    fn test_empty_graph_is_safe() {
        let index = OwnershipGraph::new().reverse_index();
        let tx = Transaction {
            customer_id: Some("C1".to_string()),
            risk_rating: Some(RiskRating::High),
            ..Transaction::default()
        };
        assert!(hierarchy_alerts(&tx, &index).is_empty());
    }
}
