//! Shared traits and calendar utilities for back-office records.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// Supplies a common contract for retrieving monetary amounts.
pub trait Amounted {
    fn amount(&self) -> f64;
}

/// Exposes the instant a record is booked at, when it has one.
pub trait Dated {
    fn occurred_at(&self) -> Option<DateTime<Utc>>;

    /// Calendar day (UTC) the record is booked on.
    fn occurred_on(&self) -> Option<NaiveDate> {
        self.occurred_at().map(|instant| instant.date_naive())
    }
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Replaces NaN and infinities with zero so sums never poison a report.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Sums amounts starting from `+0.0`; an empty input stays a positive zero.
pub fn add_up(amounts: impl IntoIterator<Item = f64>) -> f64 {
    amounts.into_iter().fold(0.0, |total, amount| total + amount)
}

/// Returns the first day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Returns the first day of the calendar quarter containing `date`.
pub fn first_of_quarter(date: NaiveDate) -> NaiveDate {
    let month = ((date.month() - 1) / 3) * 3 + 1;
    NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
}

/// Returns January 1st of the year containing `date`.
pub fn first_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

/// Moves `date` by `months`, clamping the day to the target month's length.
pub fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    match NaiveDate::from_ymd_opt(next_year, next_month, 1) {
        Some(first_next) => (first_next - Duration::days(1)).day(),
        None => 28,
    }
}

/// Short label such as `Oct 2026`.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}
