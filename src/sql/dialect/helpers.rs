//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Closing character of an identifier quote: `]` for `[`, the quote itself
/// otherwise.
pub fn closing_quote(open: char) -> char {
    match open {
        '[' => ']',
        other => other,
    }
}

// =============================================================================
// Date Parts
// =============================================================================

/// Date-part keywords accepted as bare arguments by date-arithmetic functions.
pub const DATE_PARTS: &[&str] = &[
    "year",
    "years",
    "yy",
    "yyyy",
    "quarter",
    "quarters",
    "qq",
    "q",
    "month",
    "months",
    "mm",
    "mon",
    "week",
    "weeks",
    "wk",
    "ww",
    "isoweek",
    "day",
    "days",
    "dd",
    "d",
    "dayofweek",
    "dayofyear",
    "dy",
    "dw",
    "weekday",
    "hour",
    "hours",
    "hh",
    "minute",
    "minutes",
    "mi",
    "n",
    "second",
    "seconds",
    "ss",
    "s",
    "millisecond",
    "milliseconds",
    "ms",
    "microsecond",
    "microseconds",
    "mcs",
    "nanosecond",
    "ns",
    "date",
    "datetime",
    "time",
];

/// Whether `name` is a date-part keyword (case-insensitive).
pub fn is_date_part(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    DATE_PARTS.contains(&lower.as_str())
}

/// Functions taking the date part as their first argument:
/// `DATEADD(day, 1, d)`, `DATEDIFF(day, a, b)`, `DATE_PART(day, d)`.
/// Used by: Snowflake, Redshift, T-SQL, Databricks
pub const LEADING_DATE_PART_FUNCTIONS: &[&str] = &[
    "DATEADD",
    "DATEDIFF",
    "DATE_PART",
    "DATEPART",
    "DATENAME",
    "DATETRUNC",
    "TIMEADD",
    "TIMEDIFF",
    "TIMESTAMPADD",
    "TIMESTAMPDIFF",
];

/// Look `function` up in a date-part function table.
pub fn find_date_part_arg(function: &str, table: &[(&str, usize)]) -> Option<usize> {
    let upper = function.to_ascii_uppercase();
    table
        .iter()
        .find(|(name, _)| *name == upper)
        .map(|(_, position)| *position)
}

/// Position 0 if `function` is one of [`LEADING_DATE_PART_FUNCTIONS`].
pub fn leading_date_part_arg(function: &str) -> Option<usize> {
    let upper = function.to_ascii_uppercase();
    LEADING_DATE_PART_FUNCTIONS
        .contains(&upper.as_str())
        .then_some(0)
}
