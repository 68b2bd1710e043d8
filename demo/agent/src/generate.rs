//! Seeded mock-transaction generation for demo runs
//!
//! All randomness comes through the caller's `Rng`, so a seeded generator
//! reproduces the same batch run after run.

use chrono::{DateTime, Duration, Utc};
use compliance_engine::{RiskRating, Transaction};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use rust_decimal::Decimal;
use uuid::Uuid;

const COUNTRIES: [&str; 10] = ["US", "GB", "DE", "FR", "SG", "IN", "BR", "NG", "IR", "JP"];
const PURPOSES: [&str; 3] = ["CASH", "PAYMENT", "TRANSFER"];
const RETENTION_CHOICES: [u32; 5] = [1, 3, 5, 7, 10];

/// A demo customer: a fixed id, rating and KYC status shared by all of the
/// customer's transactions in a batch.
#[derive(Debug, Clone)]
pub struct CustomerProfile {
    pub customer_id: String,
    pub risk_rating: RiskRating,
    pub kyc_completed: bool,
}

pub fn build_customer_map<R: Rng>(rng: &mut R, count: usize) -> Vec<CustomerProfile> {
    (0..count)
        .map(|_| CustomerProfile {
            customer_id: Uuid::from_u128(rng.gen()).to_string(),
            risk_rating: *[RiskRating::Low, RiskRating::Medium, RiskRating::High]
                .choose(rng)
                .unwrap_or(&RiskRating::Low),
            kyc_completed: rng.gen(),
        })
        .collect()
}

/// One fully-populated transaction for a random customer. Amounts follow
/// the demo's |N(5000, 8000)| model rounded to cents; timestamps spread
/// over the last 48 hours so the staleness check has something to find.
pub fn gen_transaction<R: Rng>(
    rng: &mut R,
    customers: &[CustomerProfile],
    now: DateTime<Utc>,
) -> Transaction {
    let customer = customers
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| CustomerProfile {
            customer_id: "C-FALLBACK".to_string(),
            risk_rating: RiskRating::Low,
            kyc_completed: true,
        });

    // Fixed, valid parameters: construction cannot fail.
    let normal: Normal<f64> = Normal::new(5_000.0, 8_000.0).unwrap();
    let raw_amount: f64 = normal.sample(rng).abs();
    let cents = (raw_amount * 100.0).round() as i64;

    let minutes_ago = rng.gen_range(0..48 * 60);
    let initiator = rng.gen_range(0..50u32);
    // Small pool, so initiator == approver collisions occur and exercise
    // the duties-segregation rule.
    let approver = rng.gen_range(0..50u32);

    Transaction {
        tx_id: Some(Uuid::from_u128(rng.gen()).to_string()),
        timestamp: Some((now - Duration::minutes(minutes_ago)).to_rfc3339()),
        amount: Some(Decimal::new(cents, 2)),
        currency: Some("USD".to_string()),
        sender_account: Some(format!("ACC{:010}", rng.gen_range(0..10_000_000_000u64))),
        receiver_account: Some(format!("ACC{:010}", rng.gen_range(0..10_000_000_000u64))),
        sender_country: COUNTRIES.choose(rng).map(|c| c.to_string()),
        receiver_country: COUNTRIES.choose(rng).map(|c| c.to_string()),
        purpose_code: PURPOSES.choose(rng).map(|p| p.to_string()),
        customer_id: Some(customer.customer_id),
        risk_rating: Some(customer.risk_rating),
        kyc_completed: Some(customer.kyc_completed),
        retention_period: RETENTION_CHOICES.choose(rng).copied(),
        initiator_id: Some(format!("EMP-{initiator:04}")),
        approver_id: Some(format!("EMP-{approver:04}")),
        source_of_funds: None,
    }
}
