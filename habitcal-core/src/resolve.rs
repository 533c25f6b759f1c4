//! Weekday, day-of-month and clock-time resolution.
//!
//! Pure helpers that turn the symbolic references found in schedule steps
//! into concrete dates. Unrecognized input resolves to `None` so that callers
//! can skip the offending entry and keep going.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveTime, Weekday};

use crate::schedule::DayOfMonth;

/// A parsed day-of-month reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DaySpec {
    StartOfMonth,
    EndOfMonth,
    Day(i64),
}

/// Parse a weekday name: full names and abbreviations, any case.
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    let weekday = match name.trim().to_lowercase().as_str() {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thur" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

/// Days to walk forward from `from` to reach `to` (0-6).
fn days_forward(from: Weekday, to: Weekday) -> u32 {
    (7 + to.num_days_from_monday() - from.num_days_from_monday()) % 7
}

/// Start of the week containing `date`, for a calendar whose weeks begin on
/// `first_weekday`.
pub fn week_start_for(date: NaiveDate, first_weekday: Weekday) -> NaiveDate {
    let back = days_forward(first_weekday, date.weekday());
    date - Duration::days(i64::from(back))
}

/// Resolve a weekday name to a date in the week beginning at `week_start`.
///
/// The offset is counted forward (0-6) from `week_start`'s own weekday.
pub fn resolve_weekday(name: &str, week_start: NaiveDate) -> Option<NaiveDate> {
    let target = parse_weekday(name)?;
    let offset = days_forward(week_start.weekday(), target);
    Some(week_start + Duration::days(i64::from(offset)))
}

type DaySpecExtractor = fn(&str) -> Option<DaySpec>;

fn named_boundary(text: &str) -> Option<DaySpec> {
    match text {
        "start_of_month" | "start" | "first" => Some(DaySpec::StartOfMonth),
        "end_of_month" | "end" | "last" => Some(DaySpec::EndOfMonth),
        _ => None,
    }
}

fn plain_number(text: &str) -> Option<DaySpec> {
    text.parse::<i64>().ok().map(DaySpec::Day)
}

/// "1st", "22nd", "3rd", "15th"
fn ordinal_number(text: &str) -> Option<DaySpec> {
    ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| text.strip_suffix(suffix))
        .and_then(plain_number)
}

const DAY_SPEC_EXTRACTORS: &[DaySpecExtractor] = &[named_boundary, plain_number, ordinal_number];

/// Parse a day-of-month reference. Non-numeric text that is not a known
/// boundary name yields `None`.
pub fn parse_day_spec(day: &DayOfMonth) -> Option<DaySpec> {
    match day {
        DayOfMonth::Number(n) => Some(DaySpec::Day(*n)),
        DayOfMonth::Named(text) => {
            let text = text.trim().to_lowercase();
            DAY_SPEC_EXTRACTORS
                .iter()
                .find_map(|extract| extract(&text))
        }
    }
}

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = first_of_month(date);
    match first.checked_add_months(Months::new(1)) {
        Some(next) => (next - first).num_days() as u32,
        // Only reachable at the very end of chrono's range.
        None => 31,
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Resolve a day-of-month spec within the month containing `month_anchor`.
///
/// Numeric days are clamped into `[1, days_in_month]`, so "31" in February
/// lands on the last day of February.
pub fn resolve_month_day(spec: DaySpec, month_anchor: NaiveDate) -> Option<NaiveDate> {
    let last = days_in_month(month_anchor);
    let day = match spec {
        DaySpec::StartOfMonth => 1,
        DaySpec::EndOfMonth => last,
        DaySpec::Day(n) => n.clamp(1, i64::from(last)) as u32,
    };
    month_anchor.with_day(day)
}

type ClockExtractor = fn(&str) -> Option<NaiveTime>;

fn twenty_four_hour(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M").ok()
}

fn twenty_four_hour_seconds(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S").ok()
}

fn twelve_hour(text: &str) -> Option<NaiveTime> {
    let compact: String = text.split_whitespace().collect();
    NaiveTime::parse_from_str(&compact, "%I:%M%p")
        .ok()
        .or_else(|| {
            // "9pm" has no minutes; chrono needs them to build a time.
            let split = compact.len().checked_sub(2)?;
            if !compact.is_char_boundary(split) {
                return None;
            }
            let (hour, meridiem) = compact.split_at(split);
            NaiveTime::parse_from_str(&format!("{}:00{}", hour, meridiem), "%I:%M%p").ok()
        })
}

const CLOCK_EXTRACTORS: &[ClockExtractor] =
    &[twenty_four_hour, twenty_four_hour_seconds, twelve_hour];

/// Parse a clock time, trying each known format in order.
pub fn parse_clock_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    CLOCK_EXTRACTORS.iter().find_map(|extract| extract(text))
}
