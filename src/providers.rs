// Provider integrations - explicit stubs.
//
// Shopify, Amazon, Stripe and QuickBooks connections are part of the data
// model today, but none of the sync machinery exists yet. The functions here
// fail loudly instead of pretending, so nothing upstream can mistake a stub
// for a working integration.

use anyhow::{bail, Result};

use crate::entities::{MappingRule, Transaction};

/// The providers a financial connection can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Shopify,
    Amazon,
    Stripe,
    Quickbooks,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::Shopify,
        Provider::Amazon,
        Provider::Stripe,
        Provider::Quickbooks,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "shopify" => Some(Provider::Shopify),
            "amazon" => Some(Provider::Amazon),
            "stripe" => Some(Provider::Stripe),
            "quickbooks" => Some(Provider::Quickbooks),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Shopify => "shopify",
            Provider::Amazon => "amazon",
            Provider::Stripe => "stripe",
            Provider::Quickbooks => "quickbooks",
        }
    }

    /// Display metadata for the connections UI.
    pub fn info(&self) -> ProviderInfo {
        match self {
            Provider::Shopify => ProviderInfo {
                name: "Shopify",
                description: "E-commerce platform - sync orders and payouts",
                color: "#96bf48",
            },
            Provider::Stripe => ProviderInfo {
                name: "Stripe",
                description: "Payment processor - sync charges and payouts",
                color: "#635bff",
            },
            Provider::Amazon => ProviderInfo {
                name: "Amazon",
                description: "Marketplace - sync settlement reports",
                color: "#ff9900",
            },
            Provider::Quickbooks => ProviderInfo {
                name: "QuickBooks Online",
                description: "Accounting - sync sales and deposits",
                color: "#2ca01c",
            },
        }
    }

    /// Webhook events each integration would subscribe to.
    pub fn webhook_events(&self) -> &'static [&'static str] {
        match self {
            Provider::Shopify => &["orders/create", "orders/updated", "refunds/create"],
            Provider::Stripe => &[
                "charge.succeeded",
                "charge.refunded",
                "payout.paid",
                "balance.available",
            ],
            Provider::Amazon => &["settlement.report.ready"],
            Provider::Quickbooks => &["SalesReceipt.Create", "Deposit.Create"],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProviderInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub color: &'static str,
}

/// Convert a raw provider event into a normalized transaction.
/// TODO: implement per-provider normalization once the first real
/// integration (Stripe) is connected.
pub fn normalize_raw_event(
    provider: &str,
    _raw_event: &serde_json::Value,
    _holding_account_id: &str,
) -> Result<Transaction> {
    let Some(provider) = Provider::from_str(provider) else {
        bail!("Unknown provider: {}", provider);
    };
    bail!("Normalization for {} not implemented", provider.as_str());
}

/// Fetch historical data for a freshly connected account.
pub fn sync_historical_data(provider: Provider) -> Result<usize> {
    bail!("{} historical sync not implemented", provider.as_str());
}

/// Walk active rules, highest priority first, and return the profit center
/// the transaction should land in. Matching is not implemented yet, so every
/// transaction stays unassigned.
pub fn apply_mapping_rules(_transaction: &Transaction, rules: &[MappingRule]) -> Option<String> {
    let mut ordered: Vec<&MappingRule> = rules.iter().filter(|r| r.active).collect();
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority));

    for _rule in ordered {
        // Match types: account, store, sku, product, payout, memo, customer,
        // class, location. Evaluation lands together with the first provider
        // integration.
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_round_trip() {
        for provider in Provider::ALL {
            assert_eq!(Provider::from_str(provider.as_str()), Some(provider));
        }
        assert_eq!(Provider::from_str("paypal"), None);
    }

    #[test]
    fn test_normalize_rejects_unknown_provider() {
        let err = normalize_raw_event("paypal", &serde_json::json!({}), "ha-1")
            .unwrap_err()
            .to_string();
        assert!(err.contains("Unknown provider"));
    }

    #[test]
    fn test_normalize_is_an_explicit_stub() {
        let err = normalize_raw_event("stripe", &serde_json::json!({}), "ha-1")
            .unwrap_err()
            .to_string();
        assert!(err.contains("not implemented"));
    }

    #[test]
    fn test_mapping_rules_leave_transactions_unassigned() {
        let tx = Transaction::new(
            "ha-1".to_string(),
            String::new(),
            String::new(),
            "2024-02-01".to_string(),
            1000,
            Some("stripe".to_string()),
            None,
            false,
        );
        let rule = MappingRule::new(
            "ha-1".to_string(),
            "stripe".to_string(),
            "payout".to_string(),
            "po_123".to_string(),
            "pc-1".to_string(),
            5,
        );
        assert_eq!(apply_mapping_rules(&tx, &[rule]), None);
    }
}
