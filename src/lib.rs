// Finance Ledger - Core Library
// Aggregation engine for a personal/shared finance tracker: period totals,
// credit card cycles, bills and group settlement. Used by the CLI and tests.

pub mod money;          // Exact cent arithmetic over Decimal
pub mod calendar;       // Year-month math and day clamping
pub mod error;          // Typed engine failures
pub mod entities;       // Transaction, CreditCard, Group, Category
pub mod classifier;     // Income / Expense / Shared
pub mod filter;         // Search, payment type, category, date range
pub mod aggregator;     // Period summaries and report helpers
pub mod cycle;          // Card billing cycles and upcoming bills
pub mod settlement;     // Group net positions and settle-up plan
pub mod snapshot;       // Record sources and reference checks
pub mod import;         // CSV / JSON loaders
pub mod config;         // Engine thresholds from JSON

// Re-export commonly used types
pub use error::{LedgerError, ReferenceKind, Result};
pub use entities::{
    Brand, Category, CreditCard, Group, GroupMember, PaymentMethod, PaymentType, Role,
    Transaction, TransactionRecord,
};
pub use classifier::{classify, resolve_parties, Classification, Parties};
pub use filter::{ReportPeriod, TransactionFilter};
pub use aggregator::{
    aggregate, aggregate_iter, category_shares, monthly_totals, recent_transactions,
    top_expenses, CategoryShare, LedgerReport, MonthlyTotals, PeriodSummary,
};
pub use cycle::{
    current_cycle, cycle_containing, due_date_for, BillStatus, CardCycleStatus, CycleEngine,
    CycleStatus, CycleThresholds, CycleWindow, UpcomingBill,
};
pub use settlement::{group_overview, settle, settle_up, GroupOverview, MemberBalance, SettlementTransfer};
pub use snapshot::{check_references, CardSource, GroupSource, LedgerSnapshot, TransactionSource};
pub use import::{
    load_cards_csv, load_groups_json, load_snapshot, load_transactions_csv, read_cards,
    read_groups_json, read_transactions,
};
pub use config::{EngineConfig, CONFIG_ENV};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
