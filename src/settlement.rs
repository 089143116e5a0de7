// ⚖️ Group Settlement - who owes whom inside a group
//
// Equal split. For every shared transaction of the group:
//   - |amount| is first rounded to whole cents, half away from zero
//   - the payer (responsible person, else the creator) is credited that amount
//   - every member, payer included, is debited amount / member_count
//
// net_position = credits − debits. Positive: the group owes the member.
// Negative: the member owes the group.
//
// Shares are whole cents; leftover cents go one each to members in ascending
// user-id order. Nothing is lost to rounding, so positions always add up to
// exactly zero.

use crate::entities::{Group, Transaction};
use crate::error::{LedgerError, ReferenceKind, Result};
use crate::money::{checked_total, magnitude, round_cents, split_evenly};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub user_id: String,
    pub net_position: Decimal,
}

impl MemberBalance {
    pub fn is_creditor(&self) -> bool {
        self.net_position > Decimal::ZERO
    }

    pub fn is_debtor(&self) -> bool {
        self.net_position < Decimal::ZERO
    }
}

fn group_transactions<'a>(
    group: &'a Group,
    transactions: &'a [Transaction],
) -> impl Iterator<Item = &'a Transaction> + 'a {
    transactions
        .iter()
        .filter(move |tx| tx.group_id.as_deref() == Some(group.id.as_str()))
}

/// Net position of every member of `group`, sorted by user id.
///
/// Transactions that are not shared within this group are ignored.
pub fn settle(group: &Group, shared_transactions: &[Transaction]) -> Result<Vec<MemberBalance>> {
    if group.members.is_empty() {
        return Err(LedgerError::EmptyGroup {
            group_id: group.id.clone(),
        });
    }

    let mut positions: BTreeMap<&str, Decimal> = group
        .member_ids()
        .map(|id| (id, Decimal::ZERO))
        .collect();
    let member_count = positions.len();

    let mut settled = 0usize;
    for tx in group_transactions(group, shared_transactions) {
        let payer = tx.payer();
        if !positions.contains_key(payer) {
            return Err(LedgerError::InconsistentReference {
                transaction_id: tx.id.clone(),
                kind: ReferenceKind::Member,
                reference: payer.to_string(),
            });
        }

        let amount = round_cents(magnitude(tx.amount));
        let shares = split_evenly(amount, member_count);

        for (position, share) in positions.values_mut().zip(shares) {
            *position = checked_total(*position, -share, "member position")?;
        }
        if let Some(position) = positions.get_mut(payer) {
            *position = checked_total(*position, amount, "member position")?;
        }
        settled += 1;
    }

    debug!(
        group = %group.id,
        members = member_count,
        transactions = settled,
        "settled group"
    );

    Ok(positions
        .into_iter()
        .map(|(user_id, net_position)| MemberBalance {
            user_id: user_id.to_string(),
            net_position,
        })
        .collect())
}

// ============================================================================
// SETTLE UP
// ============================================================================

/// One payment that moves money from a debtor to a creditor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementTransfer {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
}

/// Payments that bring every position back to zero.
///
/// Greedy: the largest debtor pays the largest creditor until one of them is
/// even, then the next pair. Ties break on user id so the plan is stable.
pub fn settle_up(balances: &[MemberBalance]) -> Vec<SettlementTransfer> {
    let by_size = |a: &(String, Decimal), b: &(String, Decimal)| b.1.cmp(&a.1).then(a.0.cmp(&b.0));

    let mut creditors: Vec<(String, Decimal)> = balances
        .iter()
        .filter(|b| b.is_creditor())
        .map(|b| (b.user_id.clone(), b.net_position))
        .collect();
    let mut debtors: Vec<(String, Decimal)> = balances
        .iter()
        .filter(|b| b.is_debtor())
        .map(|b| (b.user_id.clone(), -b.net_position))
        .collect();
    creditors.sort_by(by_size);
    debtors.sort_by(by_size);

    let mut transfers = Vec::new();
    let (mut c, mut d) = (0, 0);
    while c < creditors.len() && d < debtors.len() {
        let amount = creditors[c].1.min(debtors[d].1);
        if amount > Decimal::ZERO {
            transfers.push(SettlementTransfer {
                from: debtors[d].0.clone(),
                to: creditors[c].0.clone(),
                amount,
            });
        }

        creditors[c].1 -= amount;
        debtors[d].1 -= amount;
        if creditors[c].1.is_zero() {
            c += 1;
        }
        if debtors[d].1.is_zero() {
            d += 1;
        }
    }

    transfers
}

// ============================================================================
// GROUP OVERVIEW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOverview {
    pub group_id: String,
    pub name: String,
    pub member_count: usize,
    /// Σ |amount| of the group's shared transactions, in cents
    pub shared_total: Decimal,
    pub balances: Vec<MemberBalance>,
    /// Every member is even
    pub settled: bool,
}

pub fn group_overview(group: &Group, transactions: &[Transaction]) -> Result<GroupOverview> {
    let balances = settle(group, transactions)?;
    let shared_total: Decimal = group_transactions(group, transactions)
        .map(|tx| round_cents(magnitude(tx.amount)))
        .sum();

    Ok(GroupOverview {
        group_id: group.id.clone(),
        name: group.name.clone(),
        member_count: group.member_count(),
        shared_total,
        settled: balances.iter().all(|b| b.net_position.is_zero()),
        balances,
    })
}

// ============================================================================
// TESTS
// ============================================================================
