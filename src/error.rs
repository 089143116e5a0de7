// ⚠️ Engine Errors - typed failures reported synchronously to the caller
//
// Every engine call either returns a value or one of these. Nothing is
// coerced to zero behind the caller's back.

use thiserror::Error;

/// What kind of record a dangling reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    CreditCard,
    Group,
    Member,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::CreditCard => "credit card",
            ReferenceKind::Group => "group",
            ReferenceKind::Member => "group member",
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("card {card_id}: closing day {closing_day} / due day {due_day} must be within 1..=31")]
    InvalidCycleConfig {
        card_id: String,
        closing_day: u32,
        due_day: u32,
    },

    #[error("group {group_id} has no members to settle")]
    EmptyGroup { group_id: String },

    #[error("transaction {transaction_id} references unknown {kind} '{reference}'")]
    InconsistentReference {
        transaction_id: String,
        kind: ReferenceKind,
        reference: String,
    },

    #[error("invalid record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{what} exceeds the representable decimal range")]
    AmountOverflow { what: &'static str },
}

impl LedgerError {
    pub(crate) fn invalid_record(id: &str, reason: impl Into<String>) -> Self {
        LedgerError::InvalidRecord {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
