// 🧾 Transaction - immutable ledger record
//
// The flat shape collaborators store (payment_type + credit_card_id,
// is_shared + group_id) allows states that make no sense: a credit purchase
// without a card, a shared expense without a group. Here those pairs are
// folded into sum types, so a `Transaction` that exists is always valid.
// The flat shape survives as `TransactionRecord`, used for CSV/JSON and
// converted with `TryFrom`.

use crate::entities::category::Category;
use crate::error::LedgerError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// PAYMENT TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Credit,
    Debit,
    Pix,
    Cash,
    Transfer,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Credit => "credit",
            PaymentType::Debit => "debit",
            PaymentType::Pix => "pix",
            PaymentType::Cash => "cash",
            PaymentType::Transfer => "transfer",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "credit" => Ok(PaymentType::Credit),
            "debit" => Ok(PaymentType::Debit),
            "pix" => Ok(PaymentType::Pix),
            "cash" => Ok(PaymentType::Cash),
            "transfer" => Ok(PaymentType::Transfer),
            other => Err(LedgerError::invalid_record(other, "unknown payment type")),
        }
    }
}

/// How a transaction was paid. Only credit carries a card reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Credit { card_id: String },
    Debit,
    Pix,
    Cash,
    Transfer,
}

impl PaymentMethod {
    pub fn credit(card_id: impl Into<String>) -> Self {
        PaymentMethod::Credit {
            card_id: card_id.into(),
        }
    }

    pub fn payment_type(&self) -> PaymentType {
        match self {
            PaymentMethod::Credit { .. } => PaymentType::Credit,
            PaymentMethod::Debit => PaymentType::Debit,
            PaymentMethod::Pix => PaymentType::Pix,
            PaymentMethod::Cash => PaymentType::Cash,
            PaymentMethod::Transfer => PaymentType::Transfer,
        }
    }

    pub fn card_id(&self) -> Option<&str> {
        match self {
            PaymentMethod::Credit { card_id } => Some(card_id),
            _ => None,
        }
    }
}

// ============================================================================
// TRANSACTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TransactionRecord", into = "TransactionRecord")]
pub struct Transaction {
    /// Stable identity
    pub id: String,

    pub description: String,

    /// Signed: negative = outflow, positive = inflow
    pub amount: Decimal,

    pub date: NaiveDate,

    pub category: Category,

    pub payment: PaymentMethod,

    /// Set iff the transaction is a shared expense
    pub group_id: Option<String>,

    /// Who actually paid, when different from the user who recorded it
    pub responsible_person: Option<String>,

    /// User who recorded the transaction
    pub created_by: String,
}

impl Transaction {
    /// New non-shared transaction
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        amount: Decimal,
        date: NaiveDate,
        category: Category,
        payment: PaymentMethod,
        created_by: impl Into<String>,
    ) -> Self {
        Transaction {
            id: id.into(),
            description: description.into(),
            amount,
            date,
            category,
            payment,
            group_id: None,
            responsible_person: None,
            created_by: created_by.into(),
        }
    }

    /// Same transaction with a freshly generated id
    pub fn with_generated_id(self) -> Self {
        Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            ..self
        }
    }

    /// Copy of this transaction marked as shared within `group_id`
    pub fn shared_with(self, group_id: impl Into<String>) -> Self {
        Transaction {
            group_id: Some(group_id.into()),
            ..self
        }
    }

    /// Copy of this transaction paid by `person`
    pub fn paid_by(self, person: impl Into<String>) -> Self {
        Transaction {
            responsible_person: Some(person.into()),
            ..self
        }
    }

    pub fn is_shared(&self) -> bool {
        self.group_id.is_some()
    }

    pub fn payment_type(&self) -> PaymentType {
        self.payment.payment_type()
    }

    pub fn card_id(&self) -> Option<&str> {
        self.payment.card_id()
    }

    /// Effective payer: the responsible person, or the recording user
    pub fn payer(&self) -> &str {
        self.responsible_person
            .as_deref()
            .unwrap_or(&self.created_by)
    }
}

// ============================================================================
// FLAT RECORD (CSV / JSON shape)
// ============================================================================

/// Flat transaction row as exported by the app's storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(default)]
    pub id: String,

    pub description: String,

    /// Parsed from the exact text, never through a float
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,

    pub date: NaiveDate,

    pub category: Category,

    pub payment_type: PaymentType,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_card_id: Option<String>,

    #[serde(default)]
    pub is_shared: bool,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_person: Option<String>,

    #[serde(default)]
    pub created_by: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = LedgerError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        let id = if record.id.trim().is_empty() {
            uuid::Uuid::new_v4().to_string()
        } else {
            record.id.trim().to_string()
        };

        let card_id = non_blank(record.credit_card_id);
        let payment = match (record.payment_type, card_id) {
            (PaymentType::Credit, Some(card_id)) => PaymentMethod::Credit { card_id },
            (PaymentType::Credit, None) => {
                return Err(LedgerError::invalid_record(
                    &id,
                    "credit payment requires a credit_card_id",
                ))
            }
            (other, Some(_)) => {
                return Err(LedgerError::invalid_record(
                    &id,
                    format!("credit_card_id is only allowed for credit payments, not {}", other),
                ))
            }
            (PaymentType::Debit, None) => PaymentMethod::Debit,
            (PaymentType::Pix, None) => PaymentMethod::Pix,
            (PaymentType::Cash, None) => PaymentMethod::Cash,
            (PaymentType::Transfer, None) => PaymentMethod::Transfer,
        };

        let group_id = match (record.is_shared, non_blank(record.group_id)) {
            (true, Some(group_id)) => Some(group_id),
            (false, None) => None,
            (true, None) => {
                return Err(LedgerError::invalid_record(
                    &id,
                    "shared transaction requires a group_id",
                ))
            }
            (false, Some(_)) => {
                return Err(LedgerError::invalid_record(
                    &id,
                    "group_id set on a transaction that is not shared",
                ))
            }
        };

        Ok(Transaction {
            id,
            description: record.description,
            amount: record.amount,
            date: record.date,
            category: record.category,
            payment,
            group_id,
            responsible_person: non_blank(record.responsible_person),
            created_by: record.created_by.trim().to_string(),
        })
    }
}

impl From<Transaction> for TransactionRecord {
    fn from(tx: Transaction) -> Self {
        let payment_type = tx.payment_type();
        let credit_card_id = tx.card_id().map(str::to_string);
        TransactionRecord {
            id: tx.id,
            description: tx.description,
            amount: tx.amount,
            date: tx.date,
            category: tx.category,
            payment_type,
            credit_card_id,
            is_shared: tx.group_id.is_some(),
            group_id: tx.group_id,
            responsible_person: tx.responsible_person,
            created_by: tx.created_by,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(payment_type: PaymentType) -> TransactionRecord {
        TransactionRecord {
            id: "tx-1".to_string(),
            description: "Supermercado Extra".to_string(),
            amount: dec!(-450.00),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            category: Category::Food,
            payment_type,
            credit_card_id: None,
            is_shared: false,
            group_id: None,
            responsible_person: None,
            created_by: "ana".to_string(),
        }
    }

    #[test]
    fn test_credit_record_becomes_credit_method() {
        let mut rec = record(PaymentType::Credit);
        rec.credit_card_id = Some("nubank".to_string());

        let tx = Transaction::try_from(rec).unwrap();
        assert_eq!(tx.payment, PaymentMethod::credit("nubank"));
        assert_eq!(tx.card_id(), Some("nubank"));
        assert_eq!(tx.payment_type(), PaymentType::Credit);
        assert!(!tx.is_shared());
    }

    #[test]
    fn test_credit_without_card_is_rejected() {
        let err = Transaction::try_from(record(PaymentType::Credit)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRecord { .. }));
    }

    #[test]
    fn test_card_on_non_credit_payment_is_rejected() {
        let mut rec = record(PaymentType::Pix);
        rec.credit_card_id = Some("nubank".to_string());
        assert!(Transaction::try_from(rec).is_err());
    }

    #[test]
    fn test_blank_card_id_counts_as_missing() {
        let mut rec = record(PaymentType::Debit);
        rec.credit_card_id = Some("   ".to_string());
        let tx = Transaction::try_from(rec).unwrap();
        assert_eq!(tx.payment, PaymentMethod::Debit);
    }

    #[test]
    fn test_shared_flag_and_group_must_agree() {
        let mut shared_without_group = record(PaymentType::Cash);
        shared_without_group.is_shared = true;
        assert!(Transaction::try_from(shared_without_group).is_err());

        let mut group_without_flag = record(PaymentType::Cash);
        group_without_flag.group_id = Some("trip".to_string());
        assert!(Transaction::try_from(group_without_flag).is_err());

        let mut shared = record(PaymentType::Cash);
        shared.is_shared = true;
        shared.group_id = Some("trip".to_string());
        let tx = Transaction::try_from(shared).unwrap();
        assert!(tx.is_shared());
        assert_eq!(tx.group_id.as_deref(), Some("trip"));
    }

    #[test]
    fn test_missing_id_gets_generated() {
        let mut rec = record(PaymentType::Debit);
        rec.id = String::new();
        let tx = Transaction::try_from(rec).unwrap();
        assert!(uuid::Uuid::parse_str(&tx.id).is_ok());
    }

    #[test]
    fn test_with_generated_id_keeps_other_fields() {
        let tx = Transaction::try_from(record(PaymentType::Pix)).unwrap();
        let copy = tx.clone().with_generated_id();

        assert_ne!(copy.id, tx.id);
        assert!(uuid::Uuid::parse_str(&copy.id).is_ok());
        assert_eq!(Transaction { id: tx.id.clone(), ..copy }, tx);
    }

    #[test]
    fn test_payer_falls_back_to_creator() {
        let tx = Transaction::try_from(record(PaymentType::Debit)).unwrap();
        assert_eq!(tx.payer(), "ana");

        let tx = tx.paid_by("bruno");
        assert_eq!(tx.payer(), "bruno");
    }

    #[test]
    fn test_json_uses_flat_shape() {
        let tx = Transaction::new(
            "tx-9",
            "Posto Shell",
            dec!(-280.50),
            NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
            Category::Transport,
            PaymentMethod::credit("itau"),
            "ana",
        );

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["payment_type"], "credit");
        assert_eq!(json["credit_card_id"], "itau");
        assert_eq!(json["is_shared"], false);
        assert_eq!(json["amount"], "-280.50");

        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }
}
