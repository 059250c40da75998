//! Resolves the dashboard query string into the date range to report on.

use std::ops::RangeInclusive;

use serde::Deserialize;
use time::{Date, Month, util::days_in_month};

use crate::html::DATE_FORMAT;

pub const INVALID_DATE_FORMAT_MSG: &str = "Invalid date format.";

/// The raw query parameters of the dashboard page.
///
/// Kept as strings so that malformed values fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub year: Option<String>,
    pub month: Option<String>,
    pub filter_start: Option<String>,
    pub filter_end: Option<String>,
}

/// The period the dashboard reports on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRange {
    pub year: i32,
    pub month: Month,
    /// The dates to include, inclusive of both ends.
    pub range: RangeInclusive<Date>,
    /// Whether a date filter was given but could not be parsed.
    pub invalid_filter: bool,
}

/// The first and last day of `month` in `year`.
///
/// Returns `None` if `year` is outside the supported range.
pub fn month_range(year: i32, month: Month) -> Option<RangeInclusive<Date>> {
    let first_day = Date::from_calendar_date(year, month, 1).ok()?;
    let last_day = Date::from_calendar_date(year, month, days_in_month(month, year)).ok()?;

    Some(first_day..=last_day)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn parse_month(raw: &str) -> Option<Month> {
    let month: u8 = raw.parse().ok()?;
    Month::try_from(month).ok()
}

/// Work out which dates the dashboard should show.
///
/// The month defaults to the one containing `today`, and a year or month that
/// does not parse falls back to the current month as a whole. An explicit
/// filter overrides the month only when both ends are given and both parse.
/// A reversed filter is used as given and matches nothing.
pub fn resolve_range(query: &DashboardQuery, today: Date) -> ResolvedRange {
    let requested_month = match (non_empty(&query.year), non_empty(&query.month)) {
        (None, None) => None,
        (year, month) => {
            let year = match year {
                Some(raw) => raw.parse().ok(),
                None => Some(today.year()),
            };
            let month = match month {
                Some(raw) => parse_month(raw),
                None => Some(today.month()),
            };

            year.zip(month)
                .and_then(|(year, month)| month_range(year, month).map(|range| (year, month, range)))
        }
    };

    let (year, month, month_dates) = requested_month.unwrap_or_else(|| {
        let start = today.replace_day(1).unwrap_or(today);
        let end = today
            .replace_day(days_in_month(today.month(), today.year()))
            .unwrap_or(today);

        (today.year(), today.month(), start..=end)
    });

    let (range, invalid_filter) =
        match (non_empty(&query.filter_start), non_empty(&query.filter_end)) {
            (Some(start), Some(end)) => match (
                Date::parse(start, DATE_FORMAT),
                Date::parse(end, DATE_FORMAT),
            ) {
                (Ok(start), Ok(end)) => (start..=end, false),
                _ => (month_dates, true),
            },
            // A filter with only one end is ignored.
            _ => (month_dates, false),
        };

    ResolvedRange {
        year,
        month,
        range,
        invalid_filter,
    }
}
