// 📊 Ledger Aggregator - fold transactions into period totals
//
//   income       = Σ amount   of Income
//   expenses     = Σ |amount| of Expense
//   shared_total = Σ |amount| of Shared
//   net          = income − expenses − shared_total
//
// Every total is a plain sum, so the fold is associative and commutative:
// splitting the input into batches and merging the partial reports gives the
// same result as aggregating it in one go, in any order. Sums are checked:
// totals past Decimal's range are an `AmountOverflow`, never a panic.

use crate::calendar::YearMonth;
use crate::classifier::{classify, Classification};
use crate::entities::{Category, Transaction};
use crate::error::{LedgerError, Result};
use crate::filter::TransactionFilter;
use crate::money::{checked_total, magnitude, percentage_of, round_cents};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

// ============================================================================
// PERIOD SUMMARY
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub income: Decimal,
    pub expenses: Decimal,
    pub shared_total: Decimal,
    pub net: Decimal,
}

impl PeriodSummary {
    pub fn zero() -> Self {
        Self::default()
    }

    fn from_totals(income: Decimal, expenses: Decimal, shared_total: Decimal) -> Result<Self> {
        let net = income
            .checked_sub(expenses)
            .and_then(|rest| rest.checked_sub(shared_total))
            .ok_or(LedgerError::AmountOverflow { what: "net" })?;
        Ok(PeriodSummary {
            income,
            expenses,
            shared_total,
            net,
        })
    }

    /// Summary with one more transaction folded in
    pub fn record(self, tx: &Transaction) -> Result<Self> {
        let (mut income, mut expenses, mut shared) = (self.income, self.expenses, self.shared_total);
        match classify(tx) {
            Classification::Income => income = checked_total(income, tx.amount, "income")?,
            Classification::Expense => expenses = checked_total(expenses, magnitude(tx.amount), "expenses")?,
            Classification::Shared => shared = checked_total(shared, magnitude(tx.amount), "shared total")?,
        }
        Self::from_totals(income, expenses, shared)
    }

    /// Combine two partial summaries
    pub fn merge(self, other: PeriodSummary) -> Result<Self> {
        Self::from_totals(
            checked_total(self.income, other.income, "income")?,
            checked_total(self.expenses, other.expenses, "expenses")?,
            checked_total(self.shared_total, other.shared_total, "shared total")?,
        )
    }

    /// `income − expenses − shared_total == net`
    pub fn is_consistent(&self) -> bool {
        self.income - self.expenses - self.shared_total == self.net
    }

    pub fn is_zero(&self) -> bool {
        self.income.is_zero()
            && self.expenses.is_zero()
            && self.shared_total.is_zero()
            && self.net.is_zero()
    }
}

// ============================================================================
// LEDGER REPORT
// ============================================================================

/// Totals plus breakdowns for one set of transactions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReport {
    pub summary: PeriodSummary,

    /// Outflow magnitude (expense + shared) per category
    pub by_category: BTreeMap<Category, Decimal>,

    /// |amount| of credit purchases per card id
    pub by_card: BTreeMap<String, Decimal>,

    pub transaction_count: usize,
}

impl LedgerReport {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Report with one more transaction folded in
    pub fn record(mut self, tx: &Transaction) -> Result<Self> {
        let classification = classify(tx);
        self.summary = self.summary.record(tx)?;

        if classification.is_outflow() {
            let total = self.by_category.entry(tx.category).or_insert(Decimal::ZERO);
            *total = checked_total(*total, magnitude(tx.amount), "category total")?;
        }

        if let Some(card_id) = tx.card_id() {
            let total = self.by_card.entry(card_id.to_string()).or_insert(Decimal::ZERO);
            *total = checked_total(*total, magnitude(tx.amount), "card total")?;
        }

        self.transaction_count += 1;
        Ok(self)
    }

    /// Combine two partial reports (batched or incremental aggregation)
    pub fn merge(mut self, other: LedgerReport) -> Result<Self> {
        self.summary = self.summary.merge(other.summary)?;
        for (category, amount) in other.by_category {
            let total = self.by_category.entry(category).or_insert(Decimal::ZERO);
            *total = checked_total(*total, amount, "category total")?;
        }
        for (card_id, amount) in other.by_card {
            let total = self.by_card.entry(card_id).or_insert(Decimal::ZERO);
            *total = checked_total(*total, amount, "card total")?;
        }
        self.transaction_count += other.transaction_count;
        Ok(self)
    }

    /// Sum of every category's outflow
    pub fn total_outflow(&self) -> Result<Decimal> {
        self.by_category
            .values()
            .try_fold(Decimal::ZERO, |sum, amount| checked_total(sum, *amount, "total outflow"))
    }
}

/// Aggregate the transactions matching `filter` (all of them when None)
pub fn aggregate(transactions: &[Transaction], filter: Option<&TransactionFilter>) -> Result<LedgerReport> {
    let report = match filter {
        Some(filter) => aggregate_iter(filter.apply(transactions))?,
        None => aggregate_iter(transactions.iter())?,
    };

    debug!(
        input = transactions.len(),
        matched = report.transaction_count,
        net = %report.summary.net,
        "aggregated ledger"
    );
    Ok(report)
}

/// Aggregate any stream of borrowed transactions
pub fn aggregate_iter<'a, I>(transactions: I) -> Result<LedgerReport>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .try_fold(LedgerReport::empty(), LedgerReport::record)
}

// ============================================================================
// REPORT HELPERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    pub year: i32,
    pub month: u32,
    pub summary: PeriodSummary,
}

/// Per-month summaries, oldest month first. Months without transactions are
/// left out.
pub fn monthly_totals(
    transactions: &[Transaction],
    filter: Option<&TransactionFilter>,
) -> Result<Vec<MonthlyTotals>> {
    let all = TransactionFilter::all();
    let filter = filter.unwrap_or(&all);

    let mut months: BTreeMap<YearMonth, PeriodSummary> = BTreeMap::new();
    for tx in filter.apply(transactions) {
        let entry = months.entry(YearMonth::of(tx.date)).or_default();
        *entry = entry.record(tx)?;
    }

    Ok(months
        .into_iter()
        .map(|(ym, summary)| MonthlyTotals {
            year: ym.year(),
            month: ym.month(),
            summary,
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: Category,
    pub total: Decimal,
    /// Share of total outflow, two decimals
    pub percentage: Decimal,
}

/// Category distribution of a report's outflow, largest first
pub fn category_shares(report: &LedgerReport) -> Result<Vec<CategoryShare>> {
    let total = report.total_outflow()?;

    let mut shares: Vec<CategoryShare> = report
        .by_category
        .iter()
        .map(|(category, amount)| CategoryShare {
            category: *category,
            total: *amount,
            percentage: percentage_of(*amount, total)
                .map(round_cents)
                .unwrap_or(Decimal::ZERO),
        })
        .collect();

    shares.sort_by(|a, b| b.total.cmp(&a.total).then(a.category.cmp(&b.category)));
    Ok(shares)
}

/// The `n` largest outflows (newest first among equal amounts)
pub fn top_expenses(transactions: &[Transaction], n: usize) -> Vec<&Transaction> {
    let mut outflows: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| classify(tx).is_outflow() && !tx.amount.is_zero())
        .collect();

    outflows.sort_by(|a, b| {
        magnitude(b.amount)
            .cmp(&magnitude(a.amount))
            .then(b.date.cmp(&a.date))
            .then(a.id.cmp(&b.id))
    });
    outflows.truncate(n);
    outflows
}

/// The `n` most recent transactions
pub fn recent_transactions(transactions: &[Transaction], n: usize) -> Vec<&Transaction> {
    let mut recent: Vec<&Transaction> = transactions.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
    recent.truncate(n);
    recent
}

// ============================================================================
// TESTS
// ============================================================================
