// 📅 Calendar - month arithmetic for billing cycles
//
// Billing days are "day of month" numbers (1..=31) that must land on a real
// date in every month. A day past the end of a short month is clamped to the
// month's last day: closing day 31 in April closes on the 30th, in a
// non-leap February on the 28th.

use chrono::{Datelike, Days, Months, NaiveDate};
use std::fmt;

/// A calendar month, stored as its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    /// The month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            first: date - Days::new(u64::from(date.day0())),
        }
    }

    /// None when `month` is not 1..=12 or the year is outside chrono's range
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| YearMonth { first })
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first - Days::new(1)
    }

    pub fn next(&self) -> Self {
        YearMonth {
            first: self.first + Months::new(1),
        }
    }

    pub fn previous(&self) -> Self {
        YearMonth {
            first: self.first - Months::new(1),
        }
    }

    /// Number of days in this month (28..=31)
    pub fn days(&self) -> u32 {
        self.last_day().day()
    }

    /// `day` in this month, clamped to 1..=days()
    pub fn day_clamped(&self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days());
        self.first + Days::new(u64::from(day - 1))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Number of days in `month` of `year`, None for an invalid month
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    YearMonth::new(year, month).map(|ym| ym.days())
}

/// Whole days from `from` to `to` (negative when `to` is earlier)
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

// ============================================================================
// TESTS
// ============================================================================
