// Companion tracking entities: notes, overhead, team, kanban board, rocks
// (quarterly goals) and resource links. Thin CRUD surface - no algorithmic
// content beyond ordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// NOTES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteEntry {
    pub id: String,
    pub profit_center_id: String,
    pub text: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl NoteEntry {
    pub fn new(profit_center_id: String, text: String, created_by: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            profit_center_id,
            text,
            created_by: created_by.unwrap_or_else(|| "user".to_string()),
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// OVERHEAD
// ============================================================================

/// How often a recurring overhead item is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Annual,
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Monthly
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverheadItem {
    pub id: String,
    pub profit_center_id: String,
    pub name: String,
    pub amount_cents: i64,
    pub frequency: Frequency,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OverheadItem {
    pub fn new(
        profit_center_id: String,
        name: String,
        amount_cents: i64,
        frequency: Frequency,
        note: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            profit_center_id,
            name,
            amount_cents,
            frequency,
            note: note.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// TEAM
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub holding_account_id: String,
    pub name: String,
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TeamMember {
    pub fn new(holding_account_id: String, name: String, role: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            holding_account_id,
            name,
            role,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// KANBAN BOARD
// ============================================================================

/// Default column color when none is chosen.
pub const DEFAULT_COLUMN_COLOR: &str = "#6b7280";

/// Columns seeded by the one-time board init for a holding account.
pub const DEFAULT_COLUMNS: &[&str] = &["To Do", "In Progress", "Done"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KanbanColumn {
    pub id: String,
    pub holding_account_id: String,
    pub title: String,
    pub color: String,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
}

impl KanbanColumn {
    pub fn new(
        holding_account_id: String,
        title: String,
        color: Option<String>,
        display_order: i64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            holding_account_id,
            title,
            color: color.unwrap_or_else(|| DEFAULT_COLUMN_COLOR.to_string()),
            display_order,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KanbanCard {
    pub id: String,
    pub holding_account_id: String,

    /// Optional link to the profit center this task belongs to.
    pub profit_center_id: Option<String>,

    pub column_id: String,
    pub title: String,
    pub description: String,
    pub amount_cents: Option<i64>,
    pub due_date: Option<String>,

    /// low | medium | high; free-form on purpose, the UI owns the vocabulary.
    pub priority: Option<String>,

    /// Position within the column, ascending. Mutated by drag-and-drop moves.
    pub display_order: i64,

    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KanbanCard {
    pub fn new(
        holding_account_id: String,
        profit_center_id: Option<String>,
        column_id: String,
        title: String,
        display_order: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            holding_account_id,
            profit_center_id,
            column_id,
            title,
            description: String::new(),
            amount_cents: None,
            due_date: None,
            priority: None,
            display_order,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// ROCKS (quarterly goals)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RockStatus {
    Active,
    Completed,
}

impl RockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RockStatus::Active => "active",
            RockStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rock {
    pub id: String,
    pub holding_account_id: String,
    pub profit_center_id: Option<String>,
    pub company_id: Option<String>,
    pub title: String,
    pub description: Option<String>,

    /// Team member accountable for this rock.
    pub owner_id: Option<String>,

    pub due_date: Option<String>,
    pub status: RockStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rock {
    pub fn new(
        holding_account_id: String,
        profit_center_id: Option<String>,
        company_id: Option<String>,
        title: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            holding_account_id,
            profit_center_id,
            company_id,
            title,
            description: None,
            owner_id: None,
            due_date: None,
            status: RockStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// RESOURCE LINKS
// ============================================================================

/// A saved link scoped to a card, profit center, or the whole holding account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub holding_account_id: String,
    pub scope_type: String,
    pub scope_id: String,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl Resource {
    pub fn new(
        holding_account_id: String,
        scope_type: String,
        scope_id: String,
        title: String,
        url: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            holding_account_id,
            scope_type,
            scope_id,
            title,
            url,
            created_at: Utc::now(),
        }
    }
}
