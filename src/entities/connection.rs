// Provider plumbing entities: financial connections and mapping rules.
// Both are stubs today - connections never leave "disconnected" and rules
// are stored but not yet applied (see providers module).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connected,
    Error,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
        }
    }
}

/// Rule match vocabulary understood by the (future) mapping engine.
pub const MATCH_TYPES: &[&str] = &[
    "account", "store", "sku", "product", "payout", "memo", "customer", "class", "location",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialConnection {
    pub id: String,
    pub holding_account_id: String,

    /// shopify | amazon | stripe | quickbooks
    pub provider: String,

    pub status: ConnectionStatus,
    pub external_account_id: Option<String>,
    pub metadata: serde_json::Value,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl FinancialConnection {
    pub fn new(holding_account_id: String, provider: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            holding_account_id,
            provider,
            status: ConnectionStatus::Disconnected,
            external_account_id: None,
            metadata: serde_json::json!({}),
            last_synced_at: None,
            created_at: Utc::now(),
        }
    }
}

/// Routes normalized provider transactions to a profit center.
/// Higher priority rules are checked first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingRule {
    pub id: String,
    pub holding_account_id: String,
    pub provider: String,
    pub match_type: String,
    pub match_value: String,
    pub profit_center_id: String,
    pub priority: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl MappingRule {
    pub fn new(
        holding_account_id: String,
        provider: String,
        match_type: String,
        match_value: String,
        profit_center_id: String,
        priority: i64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            holding_account_id,
            provider,
            match_type,
            match_value,
            profit_center_id,
            priority,
            active: true,
            created_at: Utc::now(),
        }
    }
}
