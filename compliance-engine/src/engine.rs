//! Orchestrator: composes all evaluators over one batch in a fixed order

use crate::batch;
use crate::config::EngineConfig;
use crate::ownership::OwnershipGraph;
use crate::rules;
use crate::screening::{self, ScreeningSets};
use crate::types::{Alert, Transaction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The compliance engine. One `run` is a pure function of the batch, the
/// injected screening/ownership snapshots and the injected clock; the
/// engine holds no mutable state and never touches I/O.
#[derive(Debug, Clone, Default)]
pub struct ComplianceEngine {
    config: EngineConfig,
}

impl ComplianceEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate one batch. Alerts are concatenated in a fixed pipeline
    /// order so that identical inputs always yield an identical list:
    /// per-record AML/screening/EDD rules in batch order, then the batch
    /// aggregators (velocity, geo-jump, SAR, completeness/exposure), then
    /// the per-record retention and duties-segregation rules.
    pub fn run(
        &self,
        txs: &[Transaction],
        screening_sets: &ScreeningSets,
        graph: &OwnershipGraph,
        now: DateTime<Utc>,
    ) -> Vec<Alert> {
        let config = &self.config;
        let index = graph.reverse_index();
        let mut alerts = Vec::new();

        for (i, tx) in txs.iter().enumerate() {
            let record_id = tx.record_id(i);
            alerts.extend(rules::aml_alerts(tx, &record_id, config));
            alerts.extend(screening::pep_alerts(tx, screening_sets, config.enable_pep));
            alerts.extend(screening::ofac_alerts(
                tx,
                &record_id,
                screening_sets,
                config.enable_ofac,
            ));
            alerts.extend(crate::ownership::hierarchy_alerts(tx, &index));
            alerts.extend(rules::sof_alerts(tx, &record_id, config));
        }

        alerts.extend(batch::velocity_alerts(txs, config));
        alerts.extend(batch::geojump_alerts(txs, config));
        alerts.extend(batch::sar_alerts(txs, config));
        alerts.extend(batch::completeness_alerts(txs, config, now));

        for (i, tx) in txs.iter().enumerate() {
            let record_id = tx.record_id(i);
            alerts.extend(rules::retention_alerts(tx, &record_id, config));
            alerts.extend(rules::segregation_alerts(tx, &record_id));
        }

        alerts
    }
}

/// Run-level audit record, written one line per run by the hosting
/// process. The engine only produces the alert list; this is the agreed
/// shape of the persisted summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub timestamp: DateTime<Utc>,
    pub transaction_count: usize,
    pub alert_count: usize,
    pub alerts: Vec<Alert>,
}

impl RunSummary {
    pub fn new(timestamp: DateTime<Utc>, transaction_count: usize, alerts: Vec<Alert>) -> Self {
        Self {
            timestamp,
            transaction_count,
            alert_count: alerts.len(),
            alerts,
        }
    }
}
