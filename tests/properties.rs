// Property tests for the aggregation and settlement invariants

use chrono::{Days, NaiveDate};
use finance_ledger::{
    aggregate, settle, settle_up, Category, Group, LedgerReport, PaymentMethod, Transaction,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

const MEMBERS: [&str; 3] = ["a", "b", "c"];

fn group() -> Group {
    Group::new("trip", "Viagem", "a")
        .with_member("b")
        .unwrap()
        .with_member("c")
        .unwrap()
}

/// Amounts in cents, both signs
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn category_strategy() -> impl Strategy<Value = Category> {
    prop_oneof![
        Just(Category::Food),
        Just(Category::Transport),
        Just(Category::Home),
        Just(Category::Income),
        Just(Category::Other),
    ]
}

fn transaction_strategy() -> impl Strategy<Value = Transaction> {
    (
        0u32..10_000,
        amount_strategy(),
        0u64..365,
        category_strategy(),
        any::<bool>(),
        any::<bool>(),
        0usize..MEMBERS.len(),
    )
        .prop_map(|(id, amount, offset, category, credit, shared, payer)| {
            let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Days::new(offset);
            let payment = if credit {
                PaymentMethod::credit("nubank")
            } else {
                PaymentMethod::Pix
            };
            let tx = Transaction::new(
                format!("tx-{}", id),
                "Compra",
                amount,
                date,
                category,
                payment,
                MEMBERS[payer],
            );
            if shared {
                tx.shared_with("trip")
            } else {
                tx
            }
        })
}

fn transactions_strategy() -> impl Strategy<Value = Vec<Transaction>> {
    prop::collection::vec(transaction_strategy(), 0..40)
}

/// A transaction list and a random permutation of it
fn shuffled_pair_strategy() -> impl Strategy<Value = (Vec<Transaction>, Vec<Transaction>)> {
    transactions_strategy().prop_flat_map(|txs| (Just(txs.clone()), Just(txs).prop_shuffle()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_net_is_income_minus_outflow(txs in transactions_strategy()) {
        let report = aggregate(&txs, None).unwrap();
        let s = report.summary;

        prop_assert!(s.is_consistent());
        prop_assert_eq!(s.income - s.expenses - s.shared_total, s.net);
        prop_assert!(s.income >= Decimal::ZERO);
        prop_assert!(s.expenses >= Decimal::ZERO);
        prop_assert!(s.shared_total >= Decimal::ZERO);
        prop_assert_eq!(report.transaction_count, txs.len());
    }

    #[test]
    fn prop_aggregate_ignores_order((txs, shuffled) in shuffled_pair_strategy()) {
        prop_assert_eq!(aggregate(&txs, None).unwrap(), aggregate(&shuffled, None).unwrap());
    }

    #[test]
    fn prop_merge_matches_whole(txs in transactions_strategy(), split in 0usize..40) {
        let split = split.min(txs.len());
        let (left, right) = txs.split_at(split);

        let merged: LedgerReport = aggregate(left, None)
            .unwrap()
            .merge(aggregate(right, None).unwrap())
            .unwrap();
        prop_assert_eq!(merged, aggregate(&txs, None).unwrap());
    }

    #[test]
    fn prop_category_breakdown_covers_outflow(txs in transactions_strategy()) {
        let report = aggregate(&txs, None).unwrap();
        prop_assert_eq!(
            report.total_outflow().unwrap(),
            report.summary.expenses + report.summary.shared_total
        );
    }

    #[test]
    fn prop_settlement_sums_to_zero(txs in transactions_strategy()) {
        let balances = settle(&group(), &txs).unwrap();
        let total: Decimal = balances.iter().map(|b| b.net_position).sum();

        prop_assert_eq!(balances.len(), MEMBERS.len());
        prop_assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn prop_settle_up_clears_every_balance(txs in transactions_strategy()) {
        let balances = settle(&group(), &txs).unwrap();
        let transfers = settle_up(&balances);

        let mut after: BTreeMap<String, Decimal> = balances
            .iter()
            .map(|b| (b.user_id.clone(), b.net_position))
            .collect();
        for transfer in &transfers {
            prop_assert!(transfer.amount > Decimal::ZERO);
            *after.get_mut(&transfer.from).unwrap() += transfer.amount;
            *after.get_mut(&transfer.to).unwrap() -= transfer.amount;
        }

        prop_assert!(after.values().all(|v| v.is_zero()));
        prop_assert!(transfers.len() < MEMBERS.len());
    }
}
