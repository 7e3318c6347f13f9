// Holding account hierarchy: HoldingAccount -> Company -> ProfitCenter
//
// A holding account is the top-level tenant. Companies and profit centers
// are soft-deleted (active = false) rather than removed, because
// transactions keep referencing them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// COLOR PALETTE
// ============================================================================

/// Default color assigned to a company created without one.
pub const DEFAULT_COMPANY_COLOR: &str = "#3b82f6";

/// Neutral gray used when a profit center's owning company cannot be found.
pub const UNKNOWN_COMPANY_COLOR: &str = "#9ca3af";

/// Name shown when a profit center's owning company cannot be found.
pub const UNKNOWN_COMPANY_NAME: &str = "Unknown";

/// Company color palette - distinct colors for visual differentiation.
pub const COMPANY_COLORS: &[(&str, &str)] = &[
    ("Blue", "#3b82f6"),
    ("Green", "#22c55e"),
    ("Purple", "#a855f7"),
    ("Orange", "#f97316"),
    ("Pink", "#ec4899"),
    ("Teal", "#14b8a6"),
    ("Red", "#ef4444"),
    ("Yellow", "#eab308"),
    ("Indigo", "#6366f1"),
    ("Cyan", "#06b6d4"),
];

// ============================================================================
// HOLDING ACCOUNT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingAccount {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HoldingAccount {
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// COMPANY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub holding_account_id: String,
    pub name: String,

    /// Hex color used to differentiate companies in the revenue grid.
    pub color: String,

    /// Display sequence, ascending. Mutated by batch reorder.
    pub display_order: i64,

    /// Soft-delete flag. Inactive companies are excluded from the dashboard.
    pub active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    pub fn new(
        holding_account_id: String,
        name: String,
        color: Option<String>,
        display_order: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            holding_account_id,
            name,
            color: color.unwrap_or_else(|| DEFAULT_COMPANY_COLOR.to_string()),
            display_order,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// PROFIT CENTER
// ============================================================================

/// The finest-grained revenue-tracking unit ("pole"), owned by one company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitCenter {
    pub id: String,
    pub holding_account_id: String,
    pub company_id: String,
    pub name: String,
    pub display_order: i64,
    pub active: bool,

    /// When explicitly false, this center's run-rate projection contributes 0
    /// to the holding-wide projection total. Absent/NULL means included:
    /// legacy rows predate the field, and they must keep counting.
    #[serde(default)]
    pub include_in_projection: Option<bool>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfitCenter {
    pub fn new(
        holding_account_id: String,
        company_id: String,
        name: String,
        display_order: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            holding_account_id,
            company_id,
            name,
            display_order,
            active: true,
            include_in_projection: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Opt-out check: only an explicit `false` excludes the center.
    pub fn included_in_projection(&self) -> bool {
        self.include_in_projection != Some(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_opt_out_defaults_to_included() {
        let mut pc = ProfitCenter::new(
            "ha".to_string(),
            "co".to_string(),
            "Online Store".to_string(),
            0,
        );

        // Absent means included (legacy rows)
        assert!(pc.included_in_projection());

        pc.include_in_projection = Some(true);
        assert!(pc.included_in_projection());

        pc.include_in_projection = Some(false);
        assert!(!pc.included_in_projection());
    }
}
