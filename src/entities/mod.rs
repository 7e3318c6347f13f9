// Entity models shared by the store, the dashboard aggregator, and the API.

pub mod connection;
pub mod holding;
pub mod tracker;
pub mod transaction;

pub use connection::{ConnectionStatus, FinancialConnection, MappingRule, MATCH_TYPES};
pub use holding::{
    Company, HoldingAccount, ProfitCenter, COMPANY_COLORS, DEFAULT_COMPANY_COLOR,
    UNKNOWN_COMPANY_COLOR, UNKNOWN_COMPANY_NAME,
};
pub use tracker::{
    Frequency, KanbanCard, KanbanColumn, NoteEntry, OverheadItem, Resource, Rock, RockStatus,
    TeamMember, DEFAULT_COLUMNS, DEFAULT_COLUMN_COLOR,
};
pub use transaction::{dollars_to_cents, Transaction};
