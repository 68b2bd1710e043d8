//! Vigil compliance agent: demo run loop
//!
//! Generates (or in a real deployment, receives) a transaction batch, runs
//! one compliance evaluation against the current screening snapshot, logs
//! every alert and appends a run summary to the audit log.

mod generate;

use anyhow::Context;
use chrono::{Duration, Utc};
use compliance_engine::{ComplianceEngine, EngineConfig, RunSummary};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use screening_loader::ListCache;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CUSTOMER_COUNT: usize = 200;
const TRANSACTION_COUNT: usize = 200;
const AUDIT_LOG: &str = "audit_log.jsonl";

const PEP_LIST_PATH: &str = "data/pep_list.csv";
const OFAC_LIST_PATH: &str = "data/ofac_list.csv";
const OWNERSHIP_GRAPH_PATH: &str = "data/ownership_graph.csv";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    info!("compliance agent run started");

    // Seed from the first CLI argument when given, so demo runs can be
    // replayed exactly.
    let seed = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<u64>()
            .with_context(|| format!("invalid seed argument: {arg}"))?,
        None => rand::thread_rng().gen(),
    };
    info!(seed, "generating mock batch");

    let now = Utc::now();
    let mut rng = StdRng::seed_from_u64(seed);
    let customers = generate::build_customer_map(&mut rng, CUSTOMER_COUNT);
    let transactions: Vec<_> = (0..TRANSACTION_COUNT)
        .map(|_| generate::gen_transaction(&mut rng, &customers, now))
        .collect();
    info!(count = transactions.len(), "batch ready");

    let ownership = Path::new(OWNERSHIP_GRAPH_PATH)
        .exists()
        .then(|| OWNERSHIP_GRAPH_PATH.into());
    let cache = ListCache::new(
        PEP_LIST_PATH,
        OFAC_LIST_PATH,
        ownership,
        Duration::hours(ListCache::DEFAULT_TTL_HOURS),
    );
    let snapshot = cache.snapshot(now);
    if snapshot.screening.is_empty() {
        warn!("screening sets are empty; PEP/OFAC rules will not fire");
    }

    let engine = ComplianceEngine::new(EngineConfig::default());
    let alerts = engine.run(&transactions, &snapshot.screening, &snapshot.graph, now);
    info!(alert_count = alerts.len(), "compliance checks finished");

    for alert in &alerts {
        info!(
            rule = %alert.kind(),
            regulation = alert.kind().regulation(),
            subject = alert.subject(),
            detail = %alert.detail(),
            "ALERT"
        );
    }

    // TODO: feed alert outcomes back into threshold tuning once a
    // false-positive signal exists; for now the run only reports.
    info!(alert_count = alerts.len(), "threshold tuning skipped (not implemented)");

    let summary = RunSummary::new(now, transactions.len(), alerts);
    append_audit_line(AUDIT_LOG, &summary)?;

    info!("compliance agent run completed");
    Ok(())
}

fn append_audit_line(path: &str, summary: &RunSummary) -> anyhow::Result<()> {
    let line = serde_json::to_string(summary).context("serializing run summary")?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {path}"))?;
    writeln!(file, "{line}").with_context(|| format!("writing {path}"))?;
    Ok(())
}
