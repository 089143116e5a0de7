// 💳 Credit Card Cycle Engine
//
// A billing cycle is the window (previous closing date, closing date]:
//
//   cycle_start = day after the previous closing date
//   cycle_end   = closing date, inclusive
//
// so a purchase made on the closing day is billed in the cycle that is
// closing, not the next one. Closing dates are (year, month, closing_day)
// clamped to the month's last day.
//
// Utilization is spent / limit × 100 and is compared against two thresholds
// (warning > 60%, over > 80% by default).

use crate::calendar::{days_between, YearMonth};
use crate::entities::{CreditCard, Transaction};
use crate::error::{LedgerError, Result};
use crate::money::{magnitude, percentage_of, round_cents};
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// THRESHOLDS & STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleThresholds {
    /// Utilization above this is a warning
    pub warning_pct: Decimal,
    /// Utilization above this is over the comfortable limit
    pub over_pct: Decimal,
}

impl CycleThresholds {
    pub fn new(warning_pct: Decimal, over_pct: Decimal) -> Result<Self> {
        if warning_pct < Decimal::ZERO || warning_pct > over_pct {
            return Err(LedgerError::InvalidConfig(format!(
                "thresholds must satisfy 0 <= warning ({}) <= over ({})",
                warning_pct, over_pct
            )));
        }
        Ok(CycleThresholds {
            warning_pct,
            over_pct,
        })
    }

    pub fn status_for(&self, utilization_pct: Option<Decimal>) -> CycleStatus {
        match utilization_pct {
            Some(pct) if pct > self.over_pct => CycleStatus::Over,
            Some(pct) if pct > self.warning_pct => CycleStatus::Warning,
            _ => CycleStatus::Normal,
        }
    }
}

impl Default for CycleThresholds {
    fn default() -> Self {
        CycleThresholds {
            warning_pct: Decimal::from(60),
            over_pct: Decimal::from(80),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleStatus {
    Normal,
    Warning,
    Over,
}

impl CycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStatus::Normal => "normal",
            CycleStatus::Warning => "warning",
            CycleStatus::Over => "over",
        }
    }
}

// ============================================================================
// CYCLE WINDOW
// ============================================================================

/// Inclusive date window [start, end] of one billing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CycleWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The cycle right before this one
    pub fn previous(&self, closing_day: u32) -> CycleWindow {
        window_containing(closing_day, self.start - Days::new(1))
    }
}

fn window_containing(closing_day: u32, date: NaiveDate) -> CycleWindow {
    let month = YearMonth::of(date);
    let closing = month.day_clamped(closing_day);

    let (previous_closing, end) = if date <= closing {
        (month.previous().day_clamped(closing_day), closing)
    } else {
        (closing, month.next().day_clamped(closing_day))
    };

    CycleWindow {
        start: previous_closing + Days::new(1),
        end,
    }
}

/// Billing cycle of `card` that `date` falls in
pub fn cycle_containing(card: &CreditCard, date: NaiveDate) -> Result<CycleWindow> {
    card.validate_cycle()?;
    Ok(window_containing(card.closing_day, date))
}

/// Due date of the bill for a cycle ending on `cycle_end`: the first due day
/// strictly after the closing date.
pub fn due_date_for(card: &CreditCard, cycle_end: NaiveDate) -> Result<NaiveDate> {
    card.validate_cycle()?;
    let month = YearMonth::of(cycle_end);
    let same_month = month.day_clamped(card.due_day);
    if card.due_day > card.closing_day && same_month > cycle_end {
        Ok(same_month)
    } else {
        Ok(month.next().day_clamped(card.due_day))
    }
}

/// Σ |amount| of the card's transactions dated inside `window`
pub fn spent_in_window(card_id: &str, transactions: &[Transaction], window: &CycleWindow) -> Decimal {
    transactions
        .iter()
        .filter(|tx| tx.card_id() == Some(card_id) && window.contains(tx.date))
        .map(|tx| magnitude(tx.amount))
        .sum()
}

// ============================================================================
// CARD CYCLE STATUS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCycleStatus {
    pub card_id: String,
    pub cycle_start: NaiveDate,
    pub cycle_end: NaiveDate,
    pub due_date: NaiveDate,
    pub spent_in_cycle: Decimal,
    pub limit: Decimal,
    /// limit − spent; negative once the limit is exceeded
    pub available_limit: Decimal,
    /// None when the card has no limit (zero)
    pub utilization_pct: Option<Decimal>,
    pub status: CycleStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    Urgent,
    Pending,
}

/// Statement of a closed cycle that still has to be paid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingBill {
    pub card_id: String,
    pub card_name: String,
    pub cycle_end: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub days_until_due: i64,
    pub status: BillStatus,
}

// ============================================================================
// CYCLE ENGINE
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct CycleEngine {
    pub thresholds: CycleThresholds,
}

impl CycleEngine {
    pub fn new(thresholds: CycleThresholds) -> Self {
        CycleEngine { thresholds }
    }

    /// Status of the cycle containing `as_of`
    pub fn current_cycle(
        &self,
        card: &CreditCard,
        transactions: &[Transaction],
        as_of: NaiveDate,
    ) -> Result<CardCycleStatus> {
        let window = cycle_containing(card, as_of)?;
        self.status_for_window(card, transactions, window)
    }

    /// Status of an arbitrary cycle of `card`
    pub fn status_for_window(
        &self,
        card: &CreditCard,
        transactions: &[Transaction],
        window: CycleWindow,
    ) -> Result<CardCycleStatus> {
        let due_date = due_date_for(card, window.end)?;
        let spent = spent_in_window(&card.id, transactions, &window);

        let exact_pct = percentage_of(spent, card.credit_limit);
        let status = self.thresholds.status_for(exact_pct);

        debug!(
            card = %card.id,
            start = %window.start,
            end = %window.end,
            spent = %spent,
            status = status.as_str(),
            "computed card cycle"
        );

        Ok(CardCycleStatus {
            card_id: card.id.clone(),
            cycle_start: window.start,
            cycle_end: window.end,
            due_date,
            spent_in_cycle: spent,
            limit: card.credit_limit,
            available_limit: card.credit_limit - spent,
            utilization_pct: exact_pct.map(round_cents),
            status,
        })
    }

    /// Bills of active cards whose statement has closed and is not yet due,
    /// soonest first. A bill is urgent when due within `urgent_within_days`.
    pub fn upcoming_bills(
        &self,
        cards: &[CreditCard],
        transactions: &[Transaction],
        as_of: NaiveDate,
        urgent_within_days: i64,
    ) -> Result<Vec<UpcomingBill>> {
        let mut bills = Vec::new();

        for card in cards.iter().filter(|card| card.is_active) {
            let current = cycle_containing(card, as_of)?;
            let closed = if current.end == as_of {
                current
            } else {
                current.previous(card.closing_day)
            };

            let due_date = due_date_for(card, closed.end)?;
            if due_date < as_of {
                continue;
            }

            let amount = spent_in_window(&card.id, transactions, &closed);
            if amount.is_zero() {
                continue;
            }

            let days_until_due = days_between(as_of, due_date);
            bills.push(UpcomingBill {
                card_id: card.id.clone(),
                card_name: card.name.clone(),
                cycle_end: closed.end,
                due_date,
                amount,
                days_until_due,
                status: if days_until_due <= urgent_within_days {
                    BillStatus::Urgent
                } else {
                    BillStatus::Pending
                },
            });
        }

        bills.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.card_id.cmp(&b.card_id)));
        Ok(bills)
    }
}

/// `CycleEngine::current_cycle` with the default thresholds
pub fn current_cycle(
    card: &CreditCard,
    transactions: &[Transaction],
    as_of: NaiveDate,
) -> Result<CardCycleStatus> {
    CycleEngine::default().current_cycle(card, transactions, as_of)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Brand, Category, PaymentMethod};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn card(closing_day: u32, due_day: u32, limit: Decimal) -> CreditCard {
        CreditCard::new("nubank", "Nubank", Brand::Mastercard, "1234", closing_day, due_day, limit).unwrap()
    }

    fn purchase(id: &str, card_id: &str, on: NaiveDate, amount: Decimal) -> Transaction {
        Transaction::new(id, "Compra", amount, on, Category::Other, PaymentMethod::credit(card_id), "ana")
    }

    #[test]
    fn test_window_mid_cycle() {
        let card = card(15, 22, dec!(5000));

        let window = cycle_containing(&card, date(2025, 3, 20)).unwrap();
        assert_eq!(window.start, date(2025, 3, 16));
        assert_eq!(window.end, date(2025, 4, 15));

        let window = cycle_containing(&card, date(2025, 3, 10)).unwrap();
        assert_eq!(window.start, date(2025, 2, 16));
        assert_eq!(window.end, date(2025, 3, 15));
    }

    #[test]
    fn test_closing_day_belongs_to_closing_cycle() {
        let card = card(15, 22, dec!(5000));
        let txs = vec![
            purchase("on-close", "nubank", date(2025, 3, 15), dec!(-100)),
            purchase("after-close", "nubank", date(2025, 3, 16), dec!(-10)),
        ];

        let closing = cycle_containing(&card, date(2025, 3, 15)).unwrap();
        assert_eq!(closing.end, date(2025, 3, 15));
        assert!(closing.contains(date(2025, 3, 15)));
        assert_eq!(spent_in_window("nubank", &txs, &closing), dec!(100));

        let next = cycle_containing(&card, date(2025, 3, 16)).unwrap();
        assert!(!next.contains(date(2025, 3, 15)));
        assert_eq!(spent_in_window("nubank", &txs, &next), dec!(10));
    }

    #[test]
    fn test_closing_day_31_clamps_in_february() {
        let card = card(31, 10, dec!(1000));

        let window = cycle_containing(&card, date(2025, 2, 10)).unwrap();
        assert_eq!(window.start, date(2025, 2, 1));
        assert_eq!(window.end, date(2025, 2, 28));

        let window = cycle_containing(&card, date(2024, 2, 10)).unwrap();
        assert_eq!(window.end, date(2024, 2, 29));

        // The day after the clamped close starts the March cycle
        let window = cycle_containing(&card, date(2025, 3, 1)).unwrap();
        assert_eq!(window.start, date(2025, 3, 1));
        assert_eq!(window.end, date(2025, 3, 31));

        // Feb 28 is the closing day itself
        let window = cycle_containing(&card, date(2025, 2, 28)).unwrap();
        assert_eq!(window.end, date(2025, 2, 28));
    }

    #[test]
    fn test_closing_day_31_in_30_day_month() {
        let card = card(31, 10, dec!(1000));
        let window = cycle_containing(&card, date(2025, 4, 30)).unwrap();
        assert_eq!(window.start, date(2025, 4, 1));
        assert_eq!(window.end, date(2025, 4, 30));
    }

    #[test]
    fn test_cycle_across_year_boundary() {
        let card = card(10, 17, dec!(1000));
        let window = cycle_containing(&card, date(2025, 1, 5)).unwrap();
        assert_eq!(window.start, date(2024, 12, 11));
        assert_eq!(window.end, date(2025, 1, 10));
    }

    #[test]
    fn test_utilization_scenario_over() {
        let card = card(15, 22, dec!(5000));
        let txs = vec![
            purchase("1", "nubank", date(2025, 3, 16), dec!(-2000)),
            purchase("2", "nubank", date(2025, 4, 1), dec!(-1200)),
            purchase("3", "nubank", date(2025, 4, 15), dec!(-1000)),
            purchase("outside", "nubank", date(2025, 3, 15), dec!(-999)),
            purchase("other-card", "itau", date(2025, 4, 2), dec!(-999)),
        ];

        let status = current_cycle(&card, &txs, date(2025, 4, 10)).unwrap();
        assert_eq!(status.spent_in_cycle, dec!(4200));
        assert_eq!(status.utilization_pct, Some(dec!(84.0)));
        assert_eq!(status.status, CycleStatus::Over);
        assert_eq!(status.available_limit, dec!(800));
        assert_eq!(status.due_date, date(2025, 4, 22));
    }

    #[test]
    fn test_status_thresholds() {
        let thresholds = CycleThresholds::default();
        assert_eq!(thresholds.status_for(Some(dec!(60))), CycleStatus::Normal);
        assert_eq!(thresholds.status_for(Some(dec!(60.01))), CycleStatus::Warning);
        assert_eq!(thresholds.status_for(Some(dec!(80))), CycleStatus::Warning);
        assert_eq!(thresholds.status_for(Some(dec!(80.001))), CycleStatus::Over);
        assert_eq!(thresholds.status_for(None), CycleStatus::Normal);
    }

    #[test]
    fn test_custom_thresholds() {
        let engine = CycleEngine::new(CycleThresholds::new(dec!(30), dec!(50)).unwrap());
        let card = card(15, 22, dec!(1000));
        let txs = vec![purchase("1", "nubank", date(2025, 3, 20), dec!(-400))];

        let status = engine.current_cycle(&card, &txs, date(2025, 3, 25)).unwrap();
        assert_eq!(status.status, CycleStatus::Warning);

        assert!(CycleThresholds::new(dec!(90), dec!(80)).is_err());
    }

    #[test]
    fn test_zero_limit_has_no_utilization() {
        let card = card(15, 22, Decimal::ZERO);
        let txs = vec![purchase("1", "nubank", date(2025, 3, 20), dec!(-50))];

        let status = current_cycle(&card, &txs, date(2025, 3, 25)).unwrap();
        assert_eq!(status.utilization_pct, None);
        assert_eq!(status.status, CycleStatus::Normal);
        assert_eq!(status.available_limit, dec!(-50));
    }

    #[test]
    fn test_invalid_cycle_config() {
        let mut bad = card(15, 22, dec!(1000));
        bad.closing_day = 0;
        let err = current_cycle(&bad, &[], date(2025, 3, 25)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidCycleConfig { .. }));

        let mut bad = card(15, 22, dec!(1000));
        bad.due_day = 40;
        assert!(current_cycle(&bad, &[], date(2025, 3, 25)).is_err());
    }

    #[test]
    fn test_due_date_rolls_to_next_month() {
        // closes on the 28th, due on the 5th of the following month
        let card = card(28, 5, dec!(3000));
        assert_eq!(due_date_for(&card, date(2025, 1, 28)).unwrap(), date(2025, 2, 5));

        // due day after closing day stays in the same month
        let card = self::card(10, 17, dec!(3000));
        assert_eq!(due_date_for(&card, date(2025, 1, 10)).unwrap(), date(2025, 1, 17));

        // closing 30 clamps to Feb 28, due 31 would clamp onto the close itself
        let card = self::card(30, 31, dec!(3000));
        assert_eq!(due_date_for(&card, date(2025, 2, 28)).unwrap(), date(2025, 3, 31));
    }

    #[test]
    fn test_upcoming_bills() {
        let nubank = card(15, 22, dec!(5000));
        let itau = CreditCard::new("itau", "Itaú Platinum", Brand::Visa, "5678", 10, 17, dec!(8000)).unwrap();
        let inactive = CreditCard::new("old", "Old", Brand::Elo, "0000", 10, 17, dec!(100))
            .unwrap()
            .deactivated();

        let txs = vec![
            purchase("1", "nubank", date(2024, 1, 2), dec!(-2430.50)),
            purchase("2", "itau", date(2024, 1, 5), dec!(-4200.00)),
            purchase("3", "old", date(2024, 1, 5), dec!(-10)),
        ];

        let bills = CycleEngine::default()
            .upcoming_bills(&[nubank, itau, inactive], &txs, date(2024, 1, 15), 3)
            .unwrap();

        assert_eq!(bills.len(), 2);
        assert_eq!(bills[0].card_id, "itau");
        assert_eq!(bills[0].due_date, date(2024, 1, 17));
        assert_eq!(bills[0].amount, dec!(4200.00));
        assert_eq!(bills[0].status, BillStatus::Urgent);

        // Nubank closes today, so its statement is already out
        assert_eq!(bills[1].card_id, "nubank");
        assert_eq!(bills[1].cycle_end, date(2024, 1, 15));
        assert_eq!(bills[1].due_date, date(2024, 1, 22));
        assert_eq!(bills[1].amount, dec!(2430.50));
        assert_eq!(bills[1].status, BillStatus::Pending);
    }

    #[test]
    fn test_paid_bills_are_not_upcoming() {
        let itau = CreditCard::new("itau", "Itaú", Brand::Visa, "5678", 10, 17, dec!(8000)).unwrap();
        let txs = vec![purchase("1", "itau", date(2024, 1, 5), dec!(-100))];

        // Past Jan 17 the Jan 10 statement is already due
        let bills = CycleEngine::default()
            .upcoming_bills(&[itau], &txs, date(2024, 1, 20), 3)
            .unwrap();
        assert!(bills.is_empty());
    }
}
