//! Parsing and display formatting for the heterogeneous time and date
//! strings found in commute observation rows.
//!
//! Clock times arrive as `H:MM`, `H:MM AM/PM`, or full timestamps; dates as
//! ISO strings or `M/D/YY`. Parsing never fails: unparseable clock times get
//! a sentinel that sorts last, unparseable dates collapse to the Unix epoch
//! and display as their raw text.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Sentinel for clock times that could not be parsed. Sorts after every
/// real time of day.
pub const SORT_LAST: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// Splits `H:MM` with an optional trailing `AM`/`PM` (any case, space
/// optional) into its parts. Returns `None` when the text has any other
/// shape.
fn split_clock(text: &str) -> Option<(u32, u32, Option<Meridiem>)> {
    let trimmed = text.trim();

    let (body, meridiem) = if let Some(rest) = strip_suffix_ignore_case(trimmed, "AM") {
        (rest.trim_end(), Some(Meridiem::Am))
    } else if let Some(rest) = strip_suffix_ignore_case(trimmed, "PM") {
        (rest.trim_end(), Some(Meridiem::Pm))
    } else {
        (trimmed, None)
    };

    let (hours_text, minutes_text) = body.split_once(':')?;
    if hours_text.is_empty()
        || hours_text.len() > 2
        || minutes_text.len() != 2
        || !hours_text.bytes().all(|b| b.is_ascii_digit())
        || !minutes_text.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let hours = hours_text.parse().ok()?;
    let minutes = minutes_text.parse().ok()?;
    Some((hours, minutes, meridiem))
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let start = text.len().checked_sub(suffix.len())?;
    text.is_char_boundary(start)
        .then(|| text.split_at(start))
        .filter(|(_, tail)| tail.eq_ignore_ascii_case(suffix))
        .map(|(head, _)| head)
}

/// Last-resort parse of a full timestamp or bare time, used when the text is
/// not in `H:MM [AM/PM]` shape.
fn fallback_time(text: &str) -> Option<NaiveTime> {
    let trimmed = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.time());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.time());
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S").ok()
}

/// Parses a clock-time string into minutes since midnight.
///
/// `PM` adds 12 to hours other than 12; `12:xx AM` maps to hour 0. Without a
/// meridiem suffix the hour is taken as already 24-hour. Returns
/// [`SORT_LAST`] when nothing matches.
pub fn parse_clock_minutes(text: &str) -> u32 {
    if let Some((hours, minutes, meridiem)) = split_clock(text) {
        let hours = match meridiem {
            Some(Meridiem::Pm) if hours != 12 => hours + 12,
            Some(Meridiem::Am) if hours == 12 => 0,
            _ => hours,
        };
        return hours * 60 + minutes;
    }

    match fallback_time(text) {
        Some(time) => time.hour() * 60 + time.minute(),
        None => SORT_LAST,
    }
}

/// Formats a clock-time string as a 12-hour `H:MM AM/PM` display label.
/// Unparseable text comes back unchanged.
pub fn format_clock_label(text: &str) -> String {
    if let Some((hours, minutes, meridiem)) = split_clock(text) {
        let (display_hours, period) = match meridiem {
            Some(Meridiem::Am) => (hours, "AM"),
            Some(Meridiem::Pm) => (hours, "PM"),
            None => {
                let period = if hours >= 12 { "PM" } else { "AM" };
                let display = match hours {
                    0 => 12,
                    h if h > 12 => h - 12,
                    h => h,
                };
                (display, period)
            }
        };
        return format!("{}:{:02} {}", display_hours, minutes, period);
    }

    match fallback_time(text) {
        Some(time) => time.format("%-I:%M %p").to_string(),
        None => text.to_string(),
    }
}

/// Parses a calendar-date string, trying generic formats before the US
/// `M/D/YY` form. Two-digit years are expanded by adding 2000.
pub fn try_parse_calendar_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }

    let mut parts = trimmed.split('/');
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    let year: i32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let year = if year < 100 { year + 2000 } else { year };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Like [`try_parse_calendar_date`] but total: unparseable dates collapse to
/// the Unix epoch so they sort first without failing.
pub fn parse_calendar_date(text: &str) -> NaiveDate {
    try_parse_calendar_date(text).unwrap_or_default()
}

/// Formats a date string as `M/D/YYYY` for display, falling back to the raw
/// text when it cannot be parsed.
pub fn format_date_label(text: &str) -> String {
    match try_parse_calendar_date(text) {
        Some(date) => date.format("%-m/%-d/%Y").to_string(),
        None => text.to_string(),
    }
}
