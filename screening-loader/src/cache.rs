//! TTL-cached screening snapshots
//!
//! The cache owns its own "last refreshed" state and refresh policy, and
//! hands the engine read-only `Arc` snapshots. A refresh builds the new
//! sets off to the side and swaps them in whole, so an in-flight run keeps
//! the snapshot it started with.

use crate::sources::{load_ofac_list, load_ownership_graph, load_pep_list};
use chrono::{DateTime, Duration, Utc};
use compliance_engine::{OwnershipGraph, ScreeningSets};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Immutable view of the screening data for one engine run.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub screening: Arc<ScreeningSets>,
    pub graph: Arc<OwnershipGraph>,
    pub refreshed_at: DateTime<Utc>,
}

/// File-backed screening-list and ownership-graph cache with a TTL.
/// `snapshot` takes the caller's clock so that refresh timing is testable
/// and consistent with the engine's injected "now".
pub struct ListCache {
    pep_path: PathBuf,
    ofac_path: PathBuf,
    ownership_path: Option<PathBuf>,
    ttl: Duration,
    state: RwLock<Option<Snapshot>>,
}

impl ListCache {
    /// Default cache TTL, matching the upstream 24h list refresh cadence.
    pub const DEFAULT_TTL_HOURS: i64 = 24;

    pub fn new(
        pep_path: impl Into<PathBuf>,
        ofac_path: impl Into<PathBuf>,
        ownership_path: Option<PathBuf>,
        ttl: Duration,
    ) -> Self {
        Self {
            pep_path: pep_path.into(),
            ofac_path: ofac_path.into(),
            ownership_path,
            ttl,
            state: RwLock::new(None),
        }
    }

    /// Current snapshot, refreshing from disk when the TTL has lapsed.
    /// A failed refresh keeps the previous lists (or empty ones on the
    /// first load) and logs the failure; the engine runs correctly against
    /// empty sets.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Snapshot {
        if let Some(current) = self.state.read().clone() {
            if now - current.refreshed_at < self.ttl {
                return current;
            }
        }
        self.refresh(now)
    }

    /// When the lists were last (re)loaded, if ever.
    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.state.read().as_ref().map(|s| s.refreshed_at)
    }

    /// Reload all sources now, regardless of TTL.
    pub fn refresh(&self, now: DateTime<Utc>) -> Snapshot {
        let mut state = self.state.write();
        // Another caller may have refreshed while we waited on the lock.
        if let Some(current) = state.as_ref() {
            if now - current.refreshed_at < self.ttl {
                return current.clone();
            }
        }

        let previous_screening = state
            .as_ref()
            .map(|s| s.screening.clone())
            .unwrap_or_default();
        let previous_graph = state.as_ref().map(|s| s.graph.clone()).unwrap_or_default();

        let pep_ids = match load_pep_list(&self.pep_path) {
            Ok(ids) => ids,
            Err(err) => {
                warn!(error = %err, "PEP refresh failed, keeping previous list");
                previous_screening.pep_ids.clone()
            }
        };
        let ofac_ids = match load_ofac_list(&self.ofac_path) {
            Ok(ids) => ids,
            Err(err) => {
                warn!(error = %err, "OFAC refresh failed, keeping previous list");
                previous_screening.ofac_ids.clone()
            }
        };
        let graph = match &self.ownership_path {
            Some(path) => match load_ownership_graph(path) {
                Ok(graph) => Arc::new(graph),
                Err(err) => {
                    warn!(error = %err, "ownership refresh failed, keeping previous graph");
                    previous_graph
                }
            },
            None => Arc::new(OwnershipGraph::new()),
        };

        // The refresh timestamp advances even when a source failed, so a
        // broken file is retried once per TTL, not once per run.
        let snapshot = Snapshot {
            screening: Arc::new(ScreeningSets::new(pep_ids, ofac_ids)),
            graph,
            refreshed_at: now,
        };
        info!(
            pep = snapshot.screening.pep_ids.len(),
            ofac = snapshot.screening.ofac_ids.len(),
            parents = snapshot.graph.parent_count(),
            "screening snapshot refreshed"
        );
        *state = Some(snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn write_lists(dir: &TempDir, pep: &str, ofac: &str) -> (PathBuf, PathBuf) {
        let pep_path = dir.path().join("pep.csv");
        let ofac_path = dir.path().join("ofac.csv");
        fs::write(&pep_path, pep).unwrap();
        fs::write(&ofac_path, ofac).unwrap();
        (pep_path, ofac_path)
    }

    #[test]
    fn test_snapshot_serves_cached_until_ttl() {
        let dir = TempDir::new().unwrap();
        let (pep, ofac) = write_lists(&dir, "customer_id\nC1\n", "account\nA1\n");
        let cache = ListCache::new(&pep, &ofac, None, Duration::hours(24));

        let first = cache.snapshot(t0());
        assert!(first.screening.pep_ids.contains("C1"));

        // File changes are not observed inside the TTL.
        fs::write(&pep, "customer_id\nC1\nC2\n").unwrap();
        let inside = cache.snapshot(t0() + Duration::hours(1));
        assert_eq!(inside.screening.pep_ids.len(), 1);
        assert_eq!(inside.refreshed_at, t0());

        // After expiry the new list is picked up.
        let after = cache.snapshot(t0() + Duration::hours(25));
        assert_eq!(after.screening.pep_ids.len(), 2);
        assert_eq!(after.refreshed_at, t0() + Duration::hours(25));
    }

    #[test]
    fn test_failed_refresh_keeps_previous_lists() {
        let dir = TempDir::new().unwrap();
        let (pep, ofac) = write_lists(&dir, "customer_id\nC1\n", "account\nA1\n");
        let cache = ListCache::new(&pep, &ofac, None, Duration::hours(24));

        cache.snapshot(t0());
        fs::remove_file(&pep).unwrap();

        let snapshot = cache.snapshot(t0() + Duration::hours(25));
        assert!(snapshot.screening.pep_ids.contains("C1"));
        assert!(snapshot.screening.ofac_ids.contains("A1"));
        // The refresh clock still advances.
        assert_eq!(cache.last_refreshed(), Some(t0() + Duration::hours(25)));
    }

    #[test]
    fn test_missing_files_yield_empty_sets() {
        let dir = TempDir::new().unwrap();
        let cache = ListCache::new(
            dir.path().join("absent-pep.csv"),
            dir.path().join("absent-ofac.csv"),
            None,
            Duration::hours(24),
        );
        let snapshot = cache.snapshot(t0());
        assert!(snapshot.screening.is_empty());
        assert!(snapshot.graph.is_empty());
    }

    #[test]
    fn test_ownership_graph_loaded_when_configured() {
        let dir = TempDir::new().unwrap();
        let (pep, ofac) = write_lists(&dir, "customer_id\nC1\n", "account\nA1\n");
        let graph_path = dir.path().join("ownership.csv");
        fs::write(&graph_path, "parent_id,child_id\nHOLDCO,C1\n").unwrap();

        let cache = ListCache::new(&pep, &ofac, Some(graph_path), Duration::hours(24));
        let snapshot = cache.snapshot(t0());
        assert_eq!(snapshot.graph.parent_count(), 1);
    }
}
