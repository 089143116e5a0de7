// 🏷️ Transaction Classifier
//
// Every transaction lands in exactly one bucket, checked in this order:
//   1. shared         → Shared
//   2. amount > 0     → Income
//   3. anything else  → Expense (zero included: a no-op outflow, never income)

use crate::entities::{Group, Transaction};
use crate::error::{LedgerError, ReferenceKind, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// CLASSIFICATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Income,
    Expense,
    Shared,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Income => "income",
            Classification::Expense => "expense",
            Classification::Shared => "shared",
        }
    }

    /// Money leaving the reporting user's pocket
    pub fn is_outflow(&self) -> bool {
        match self {
            Classification::Income => false,
            Classification::Expense | Classification::Shared => true,
        }
    }
}

pub fn classify(tx: &Transaction) -> Classification {
    if tx.is_shared() {
        Classification::Shared
    } else if tx.amount > Decimal::ZERO {
        Classification::Income
    } else {
        Classification::Expense
    }
}

// ============================================================================
// PARTIES
// ============================================================================

/// Who paid a transaction and who it is split between
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parties {
    pub payer: String,
    pub participants: Vec<String>,
}

/// Resolve the effective payer and participants of a transaction.
///
/// The payer is the responsible person, or whoever recorded the transaction.
/// A shared transaction is split between the members of its group, so the
/// matching group must be supplied; anything else involves only the payer.
pub fn resolve_parties(tx: &Transaction, group: Option<&Group>) -> Result<Parties> {
    let payer = tx.payer().to_string();

    let participants = match (&tx.group_id, group) {
        (None, _) => vec![payer.clone()],
        (Some(group_id), Some(group)) if &group.id == group_id => {
            group.member_ids().map(str::to_string).collect()
        }
        (Some(group_id), _) => {
            return Err(LedgerError::InconsistentReference {
                transaction_id: tx.id.clone(),
                kind: ReferenceKind::Group,
                reference: group_id.clone(),
            })
        }
    };

    Ok(Parties {
        payer,
        participants,
    })
}

// ============================================================================
// TESTS
// ============================================================================
