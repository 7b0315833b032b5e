// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Short "Mon D" label used in recurring event titles (e.g. "Feb 22").
pub fn short_month_day(date: DateTime<Utc>) -> String {
    date.format("%b %-d").to_string()
}

/// Current time in whole milliseconds since the Unix epoch.
pub fn unix_millis(date: DateTime<Utc>) -> i64 {
    date.timestamp_millis()
}
