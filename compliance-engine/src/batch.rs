//! Batch aggregators: SAR count velocity, completeness/exposure,
//! sliding-window velocity and geo-jump sequence detection.
//!
//! All grouping is by `customer_id` and all group output follows the
//! first-seen order of customers in the input batch, so a run is fully
//! deterministic for a given input.

use crate::config::EngineConfig;
use crate::types::{present, Alert, Transaction};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Records in stale checks are compared against `now - STALE_AFTER`.
const STALE_AFTER_HOURS: i64 = 24;

/// Fields that must be present on every record for it to be complete.
const REQUIRED_FIELDS: [&str; 5] = ["tx_id", "timestamp", "amount", "currency", "customer_id"];

// Group records by customer id, keeping batch order inside each group and
// first-seen order across groups. Records without a customer id cannot be
// attributed and are skipped by customer-keyed rules.
fn group_by_customer<'a>(
    txs: &'a [Transaction],
) -> Vec<(&'a str, Vec<(usize, &'a Transaction)>)> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<(usize, &Transaction)>> = HashMap::new();
    for (index, tx) in txs.iter().enumerate() {
        let Some(cid) = present(&tx.customer_id) else {
            continue;
        };
        if !groups.contains_key(cid) {
            order.push(cid);
        }
        groups.entry(cid).or_default().push((index, tx));
    }
    order
        .into_iter()
        .map(|cid| (cid, groups.remove(cid).unwrap_or_default()))
        .collect()
}

// Parse and time-order one customer group. Records with unparsable
// timestamps are silently dropped here; the data-quality checks report
// them separately. The sort is stable, so ties keep batch order.
fn time_ordered<'a>(
    group: &[(usize, &'a Transaction)],
) -> Vec<(usize, &'a Transaction, DateTime<Utc>)> {
    let mut timed: Vec<_> = group
        .iter()
        .filter_map(|&(index, tx)| tx.parsed_timestamp().map(|ts| (index, tx, ts)))
        .collect();
    timed.sort_by_key(|&(_, _, ts)| ts);
    timed
}

/// SAR transaction-count check: one alert per customer whose batch count
/// strictly exceeds the threshold.
pub fn sar_alerts(txs: &[Transaction], config: &EngineConfig) -> Vec<Alert> {
    group_by_customer(txs)
        .into_iter()
        .filter(|(_, group)| group.len() > config.sar_threshold)
        .map(|(cid, group)| Alert::SuspiciousActivity {
            customer_id: cid.to_string(),
            count: group.len(),
        })
        .collect()
}

/// Data-quality and exposure aggregation. Per record: missing required
/// fields, non-positive amounts, stale or unparsable timestamps. Then per
/// customer: summed amount against the exposure threshold.
pub fn completeness_alerts(
    txs: &[Transaction],
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let stale_cutoff = now - Duration::hours(STALE_AFTER_HOURS);

    for (index, tx) in txs.iter().enumerate() {
        let record_id = tx.record_id(index);

        let field_values = [
            present(&tx.tx_id),
            present(&tx.timestamp),
            tx.amount.map(|_| "set"),
            present(&tx.currency),
            present(&tx.customer_id),
        ];
        for (field, value) in REQUIRED_FIELDS.iter().zip(field_values) {
            if value.is_none() {
                alerts.push(Alert::MissingField {
                    tx_id: record_id.clone(),
                    field: field.to_string(),
                });
            }
        }

        if tx.amount_or_zero() <= Decimal::ZERO {
            alerts.push(Alert::NegativeAmount {
                tx_id: record_id.clone(),
                amount: tx.amount_or_zero(),
            });
        }

        // A timestamp that cannot be parsed is reported the same way as a
        // genuinely old one.
        let stale = match tx.parsed_timestamp() {
            Some(ts) => ts < stale_cutoff,
            None => true,
        };
        if stale {
            alerts.push(Alert::StaleData {
                tx_id: record_id,
                timestamp: tx.timestamp.clone().unwrap_or_default(),
            });
        }
    }

    for (cid, group) in group_by_customer(txs) {
        let total: Decimal = group.iter().map(|&(_, tx)| tx.amount_or_zero()).sum();
        if total > config.exposure_threshold {
            alerts.push(Alert::HighCustomerExposure {
                customer_id: cid.to_string(),
                total,
            });
        }
    }

    alerts
}

/// Sliding-window velocity detection. Two pointers over each customer's
/// time-ordered records: `start` advances while the window span strictly
/// exceeds the configured width; the moment the window holds more than
/// `velocity_threshold` records, every record in it is flagged and the
/// rest of that customer's sequence is skipped. Only the first qualifying
/// window per customer is reported; later bursts are intentionally not.
pub fn velocity_alerts(txs: &[Transaction], config: &EngineConfig) -> Vec<Alert> {
    let window = Duration::minutes(config.velocity_window_minutes);
    let mut alerts = Vec::new();

    for (_, group) in group_by_customer(txs) {
        let timed = time_ordered(&group);
        let mut start = 0;
        for end in 0..timed.len() {
            while timed[end].2 - timed[start].2 > window {
                start += 1;
            }
            let size = end - start + 1;
            if size > config.velocity_threshold {
                for &(index, tx, _) in &timed[start..=end] {
                    alerts.push(Alert::VelocityAnomaly {
                        tx_id: tx.record_id(index),
                        count: size,
                        window_minutes: config.velocity_window_minutes,
                    });
                }
                break;
            }
        }
    }

    alerts
}

/// Geo-jump detection over consecutive pairs only: the next transaction's
/// sender country must match the previous one's receiver country when they
/// fall inside the window, otherwise the settlement chain is inconsistent.
pub fn geojump_alerts(txs: &[Transaction], config: &EngineConfig) -> Vec<Alert> {
    let window = Duration::minutes(config.geojump_window_minutes);
    let mut alerts = Vec::new();

    for (_, group) in group_by_customer(txs) {
        let timed = time_ordered(&group);
        for pair in timed.windows(2) {
            let (_, prev, prev_ts) = &pair[0];
            let (curr_index, curr, curr_ts) = &pair[1];
            if *curr_ts - *prev_ts > window {
                continue;
            }
            let (Some(from), Some(to)) =
                (present(&prev.receiver_country), present(&curr.sender_country))
            else {
                continue;
            };
            if from != to {
                alerts.push(Alert::GeoJump {
                    tx_id: curr.record_id(*curr_index),
                    from_country: from.to_string(),
                    to_country: to.to_string(),
                    window_minutes: config.geojump_window_minutes,
                });
            }
        }
    }

    alerts
}
