// 📸 Ledger Snapshot - one coherent view of the user's records
//
// The engine never fetches anything. Collaborators hand it records through
// the source traits below; `LedgerSnapshot` is the in-memory implementation,
// and it checks on construction that every card/group a transaction points
// at is actually present.

use crate::aggregator::{aggregate, LedgerReport};
use crate::cycle::{CardCycleStatus, CycleEngine, UpcomingBill};
use crate::entities::{CreditCard, Group, Transaction};
use crate::error::{LedgerError, ReferenceKind, Result};
use crate::filter::TransactionFilter;
use crate::settlement::{group_overview, GroupOverview};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

// ============================================================================
// SOURCES (collaborator-owned repositories)
// ============================================================================

pub trait TransactionSource {
    /// Transactions matching `filter`
    fn transactions(&self, filter: &TransactionFilter) -> Vec<Transaction>;
}

pub trait CardSource {
    fn card(&self, id: &str) -> Option<CreditCard>;
    fn cards(&self) -> Vec<CreditCard>;
}

pub trait GroupSource {
    fn group(&self, id: &str) -> Option<Group>;
    fn groups(&self) -> Vec<Group>;
}

/// Fail with `InconsistentReference` on the first transaction that points at
/// a card or group the sources do not know.
pub fn check_references<C, G>(transactions: &[Transaction], cards: &C, groups: &G) -> Result<()>
where
    C: CardSource + ?Sized,
    G: GroupSource + ?Sized,
{
    for tx in transactions {
        if let Some(card_id) = tx.card_id() {
            if cards.card(card_id).is_none() {
                return Err(LedgerError::InconsistentReference {
                    transaction_id: tx.id.clone(),
                    kind: ReferenceKind::CreditCard,
                    reference: card_id.to_string(),
                });
            }
        }

        if let Some(group_id) = &tx.group_id {
            if groups.group(group_id).is_none() {
                return Err(LedgerError::InconsistentReference {
                    transaction_id: tx.id.clone(),
                    kind: ReferenceKind::Group,
                    reference: group_id.clone(),
                });
            }
        }
    }
    Ok(())
}

// ============================================================================
// LEDGER SNAPSHOT
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    transactions: Vec<Transaction>,
    cards: BTreeMap<String, CreditCard>,
    groups: BTreeMap<String, Group>,
}

impl LedgerSnapshot {
    /// Validate every record and every reference, then freeze the set
    pub fn new(
        transactions: Vec<Transaction>,
        cards: Vec<CreditCard>,
        groups: Vec<Group>,
    ) -> Result<Self> {
        let mut card_map = BTreeMap::new();
        for card in cards {
            card.validate()?;
            if card_map.contains_key(&card.id) {
                return Err(LedgerError::invalid_record(&card.id, "duplicate card id"));
            }
            card_map.insert(card.id.clone(), card);
        }

        let mut group_map = BTreeMap::new();
        for group in groups {
            group.validate()?;
            if group_map.contains_key(&group.id) {
                return Err(LedgerError::invalid_record(&group.id, "duplicate group id"));
            }
            group_map.insert(group.id.clone(), group);
        }

        let snapshot = LedgerSnapshot {
            transactions,
            cards: card_map,
            groups: group_map,
        };
        check_references(&snapshot.transactions, &snapshot, &snapshot)?;

        debug!(
            transactions = snapshot.transactions.len(),
            cards = snapshot.cards.len(),
            groups = snapshot.groups.len(),
            "snapshot ready"
        );
        Ok(snapshot)
    }

    pub fn all_transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn card_list(&self) -> Vec<&CreditCard> {
        self.cards.values().collect()
    }

    pub fn group_list(&self) -> Vec<&Group> {
        self.groups.values().collect()
    }

    /// Aggregate the snapshot's transactions
    pub fn report(&self, filter: Option<&TransactionFilter>) -> Result<LedgerReport> {
        aggregate(&self.transactions, filter)
    }

    /// Current cycle of every active card, ordered by card id
    pub fn card_statuses(&self, engine: &CycleEngine, as_of: NaiveDate) -> Result<Vec<CardCycleStatus>> {
        self.cards
            .values()
            .filter(|card| card.is_active)
            .map(|card| engine.current_cycle(card, &self.transactions, as_of))
            .collect()
    }

    pub fn upcoming_bills(
        &self,
        engine: &CycleEngine,
        as_of: NaiveDate,
        urgent_within_days: i64,
    ) -> Result<Vec<UpcomingBill>> {
        let cards: Vec<CreditCard> = self.cards.values().cloned().collect();
        engine.upcoming_bills(&cards, &self.transactions, as_of, urgent_within_days)
    }

    /// Balances of every group, ordered by group id
    pub fn group_overviews(&self) -> Result<Vec<GroupOverview>> {
        self.groups
            .values()
            .map(|group| group_overview(group, &self.transactions))
            .collect()
    }
}

impl TransactionSource for LedgerSnapshot {
    fn transactions(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        filter.apply(&self.transactions).cloned().collect()
    }
}

impl CardSource for LedgerSnapshot {
    fn card(&self, id: &str) -> Option<CreditCard> {
        self.cards.get(id).cloned()
    }

    fn cards(&self) -> Vec<CreditCard> {
        self.cards.values().cloned().collect()
    }
}

impl GroupSource for LedgerSnapshot {
    fn group(&self, id: &str) -> Option<Group> {
        self.groups.get(id).cloned()
    }

    fn groups(&self) -> Vec<Group> {
        self.groups.values().cloned().collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Brand, Category, PaymentMethod, PaymentType};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn nubank() -> CreditCard {
        CreditCard::new("nubank", "Nubank", Brand::Mastercard, "1234", 15, 22, dec!(5000)).unwrap()
    }

    fn casa() -> Group {
        Group::new("casa", "Despesas Casa", "ana").with_member("bruno").unwrap()
    }

    fn tx(id: &str, amount: rust_decimal::Decimal, payment: PaymentMethod) -> Transaction {
        Transaction::new(id, "Compra", amount, date(2024, 1, 10), Category::Home, payment, "ana")
    }

    #[test]
    fn test_snapshot_accepts_consistent_records() {
        let txs = vec![
            tx("1", dec!(-100), PaymentMethod::credit("nubank")),
            tx("2", dec!(-80), PaymentMethod::Pix).shared_with("casa"),
        ];
        let snapshot = LedgerSnapshot::new(txs, vec![nubank()], vec![casa()]).unwrap();

        assert_eq!(snapshot.all_transactions().len(), 2);
        assert!(snapshot.card("nubank").is_some());
        assert!(snapshot.group("casa").is_some());
    }

    #[test]
    fn test_unknown_card_is_inconsistent() {
        let txs = vec![tx("1", dec!(-100), PaymentMethod::credit("ghost"))];
        let err = LedgerSnapshot::new(txs, vec![nubank()], vec![]).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InconsistentReference {
                transaction_id: "1".to_string(),
                kind: ReferenceKind::CreditCard,
                reference: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_group_is_inconsistent() {
        let txs = vec![tx("1", dec!(-100), PaymentMethod::Cash).shared_with("ghost")];
        let err = LedgerSnapshot::new(txs, vec![], vec![casa()]).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InconsistentReference { kind: ReferenceKind::Group, .. }
        ));
    }

    #[test]
    fn test_invalid_card_is_rejected() {
        let mut card = nubank();
        card.closing_day = 45;
        let err = LedgerSnapshot::new(vec![], vec![card], vec![]).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidCycleConfig { .. }));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        assert!(LedgerSnapshot::new(vec![], vec![nubank(), nubank()], vec![]).is_err());
        assert!(LedgerSnapshot::new(vec![], vec![], vec![casa(), casa()]).is_err());
    }

    #[test]
    fn test_transaction_source_filters() {
        let txs = vec![
            tx("1", dec!(-100), PaymentMethod::credit("nubank")),
            tx("2", dec!(-80), PaymentMethod::Pix),
        ];
        let snapshot = LedgerSnapshot::new(txs, vec![nubank()], vec![]).unwrap();

        let pix = snapshot.transactions(&TransactionFilter::all().with_payment_type(PaymentType::Pix));
        assert_eq!(pix.len(), 1);
        assert_eq!(pix[0].id, "2");
    }

    #[test]
    fn test_snapshot_views() {
        let txs = vec![
            tx("1", dec!(-100), PaymentMethod::credit("nubank")),
            tx("2", dec!(-80), PaymentMethod::Pix).shared_with("casa"),
        ];
        let snapshot = LedgerSnapshot::new(txs, vec![nubank()], vec![casa()]).unwrap();

        let report = snapshot.report(None).unwrap();
        assert_eq!(report.summary.expenses, dec!(100));
        assert_eq!(report.summary.shared_total, dec!(80));

        let statuses = snapshot.card_statuses(&CycleEngine::default(), date(2024, 1, 12)).unwrap();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].spent_in_cycle, dec!(100));

        let groups = snapshot.group_overviews().unwrap();
        assert_eq!(groups[0].shared_total, dec!(80));
        assert_eq!(groups[0].balances[0].net_position, dec!(40)); // ana paid
    }
}
