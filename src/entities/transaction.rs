// Normalized transaction - one revenue event against one profit center.
//
// Amounts are integer cents to avoid floating-point drift; dates are
// zero-padded YYYY-MM-DD strings so lexical ordering equals chronological
// ordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub holding_account_id: String,
    pub profit_center_id: String,
    pub company_id: String,

    /// Calendar date (YYYY-MM-DD), the single day bucket this amount lands in.
    pub txn_date: String,

    /// Signed integer cents; positive = revenue.
    pub amount_cents: i64,

    pub currency: String,

    /// "manual" for operator-entered rows, otherwise the source provider.
    pub provider: String,

    /// Provider-side identifier, when sourced from an integration.
    pub external_id: Option<String>,

    pub description: String,

    /// Link back to the raw provider event this row was normalized from.
    pub raw_event_id: Option<String>,

    /// True means expected-but-not-yet-realized revenue. Projected amounts
    /// never count toward MTD or daily actual totals.
    pub is_projected: bool,

    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        holding_account_id: String,
        profit_center_id: String,
        company_id: String,
        txn_date: String,
        amount_cents: i64,
        provider: Option<String>,
        description: Option<String>,
        is_projected: bool,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            holding_account_id,
            profit_center_id,
            company_id,
            txn_date,
            amount_cents,
            currency: "USD".to_string(),
            provider: provider.unwrap_or_else(|| "manual".to_string()),
            external_id: None,
            description: description.unwrap_or_default(),
            raw_event_id: None,
            is_projected,
            created_at: Utc::now(),
        }
    }

    /// Idempotency hash for bulk imports: re-importing the same CSV must not
    /// insert duplicates. This is deduplication, not identity - the stable
    /// identity is `id`.
    pub fn compute_idempotency_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}{}{}{}{}",
            self.holding_account_id,
            self.profit_center_id,
            self.txn_date,
            self.amount_cents,
            self.description
        ));
        format!("{:x}", hasher.finalize())
    }
}

/// Convert a dollar amount to integer cents, rounding to the nearest cent.
/// API payloads may carry either `amount_cents` directly or a float `amount`.
pub fn dollars_to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(amount_cents: i64) -> Transaction {
        Transaction::new(
            "ha-1".to_string(),
            "pc-1".to_string(),
            "co-1".to_string(),
            "2024-02-05".to_string(),
            amount_cents,
            None,
            Some("wholesale order".to_string()),
            false,
        )
    }

    #[test]
    fn test_idempotency_hash_is_stable() {
        let tx = sample(12500);
        let h1 = tx.compute_idempotency_hash();
        let h2 = tx.compute_idempotency_hash();

        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64, "SHA-256 hash should be 64 hex characters");
    }

    #[test]
    fn test_idempotency_hash_differs_by_amount() {
        let a = sample(12500);
        let mut b = sample(12500);
        b.amount_cents = 12600;

        assert_ne!(
            a.compute_idempotency_hash(),
            b.compute_idempotency_hash()
        );
    }

    #[test]
    fn test_dollars_to_cents_rounds_to_nearest() {
        assert_eq!(dollars_to_cents(100.0), 10000);
        assert_eq!(dollars_to_cents(0.125), 13);
        assert_eq!(dollars_to_cents(19.994), 1999);
        assert_eq!(dollars_to_cents(-0.125), -13);
    }
}
