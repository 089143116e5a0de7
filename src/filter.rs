// 🔎 Transaction Filter
//
// Search term, payment type, category and date range. Every criterion that is
// set must match (AND); an empty filter matches everything.

use crate::calendar::YearMonth;
use crate::entities::{Category, PaymentType, Transaction};
use crate::error::LedgerError;
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// REPORT PERIOD
// ============================================================================

/// Calendar period picked on the reports screen, always the one containing
/// the reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    /// Monday through Sunday
    Week,
    Month,
    Quarter,
    Year,
}

impl ReportPeriod {
    /// Inclusive first and last day of the period containing `as_of`
    pub fn range(&self, as_of: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            ReportPeriod::Week => {
                let monday = as_of - Days::new(u64::from(as_of.weekday().num_days_from_monday()));
                (monday, monday + Days::new(6))
            }
            ReportPeriod::Month => {
                let month = YearMonth::of(as_of);
                (month.first_day(), month.last_day())
            }
            ReportPeriod::Quarter => {
                let month = YearMonth::of(as_of).first_day();
                let start = month - Months::new(as_of.month0() % 3);
                (start, start + Months::new(3) - Days::new(1))
            }
            ReportPeriod::Year => {
                let start = YearMonth::of(as_of).first_day() - Months::new(as_of.month0());
                (start, start + Months::new(12) - Days::new(1))
            }
        }
    }
}

impl FromStr for ReportPeriod {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" | "semana" => Ok(ReportPeriod::Week),
            "month" | "mês" | "mes" => Ok(ReportPeriod::Month),
            "quarter" | "trimestre" => Ok(ReportPeriod::Quarter),
            "year" | "ano" => Ok(ReportPeriod::Year),
            other => Err(LedgerError::InvalidConfig(format!("unknown report period '{}'", other))),
        }
    }
}

// ============================================================================
// TRANSACTION FILTER
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Case-insensitive substring of the description
    #[serde(default)]
    pub search: Option<String>,

    #[serde(default)]
    pub payment_type: Option<PaymentType>,

    #[serde(default)]
    pub category: Option<Category>,

    /// Inclusive lower bound
    #[serde(default)]
    pub date_from: Option<NaiveDate>,

    /// Inclusive upper bound
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
}

impl TransactionFilter {
    /// Filter that matches every transaction
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_search(self, term: impl Into<String>) -> Self {
        let term = term.into();
        TransactionFilter {
            search: if term.trim().is_empty() { None } else { Some(term) },
            ..self
        }
    }

    pub fn with_payment_type(self, payment_type: PaymentType) -> Self {
        TransactionFilter {
            payment_type: Some(payment_type),
            ..self
        }
    }

    pub fn with_category(self, category: Category) -> Self {
        TransactionFilter {
            category: Some(category),
            ..self
        }
    }

    pub fn between(self, from: NaiveDate, to: NaiveDate) -> Self {
        TransactionFilter {
            date_from: Some(from),
            date_to: Some(to),
            ..self
        }
    }

    /// Restrict to the calendar `period` containing `as_of`
    pub fn for_period(self, period: ReportPeriod, as_of: NaiveDate) -> Self {
        let (from, to) = period.range(as_of);
        self.between(from, to)
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(term) = &self.search {
            let needle = term.trim().to_lowercase();
            if !tx.description.to_lowercase().contains(&needle) {
                return false;
            }
        }

        if let Some(payment_type) = self.payment_type {
            if tx.payment_type() != payment_type {
                return false;
            }
        }

        if let Some(category) = self.category {
            if tx.category != category {
                return false;
            }
        }

        if let Some(from) = self.date_from {
            if tx.date < from {
                return false;
            }
        }

        if let Some(to) = self.date_to {
            if tx.date > to {
                return false;
            }
        }

        true
    }

    /// Borrowing iterator over the matching transactions
    pub fn apply<'a>(&'a self, transactions: &'a [Transaction]) -> impl Iterator<Item = &'a Transaction> + 'a {
        transactions.iter().filter(move |tx| self.matches(tx))
    }
}

// ============================================================================
// TESTS
// ============================================================================
