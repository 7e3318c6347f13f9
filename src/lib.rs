// Fishing Poles Dashboard - Core Library
// Revenue tracking for a multi-company holding account: companies own
// profit centers ("poles"), transactions land on poles, and the dashboard
// aggregates them into a daily revenue matrix with run-rate projections.

pub mod dashboard;
pub mod entities;
pub mod providers;
pub mod store;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use dashboard::{compute_dashboard, CompanyGroup, DashboardReport, Month, ProfitCenterReport};
pub use entities::{
    dollars_to_cents, Company, FinancialConnection, Frequency, HoldingAccount, KanbanCard,
    KanbanColumn, MappingRule, NoteEntry, OverheadItem, ProfitCenter, Resource, Rock, RockStatus,
    TeamMember, Transaction,
};
pub use store::{open_database, open_in_memory, setup_database};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
