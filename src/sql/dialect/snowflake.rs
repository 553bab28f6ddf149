//! Snowflake SQL dialect.
//!
//! Snowflake features:
//! - ANSI identifier quoting (`"`), backticks also accepted
//! - Bare date-part keywords in `DATEADD(day, 1, d)`, `DATEDIFF(day, a, b)`,
//!   `DATE_TRUNC(month, d)` and `LAST_DAY(d, month)`

use sqlparser::dialect::{Dialect as ParserDialect, SnowflakeDialect};

use super::helpers;
use super::SqlDialect;

/// Functions whose date part is not covered by the shared leading-argument table.
const DATE_PART_FUNCTIONS: &[(&str, usize)] = &[("DATE_TRUNC", 0), ("LAST_DAY", 1)];

/// Snowflake SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Snowflake;

impl SqlDialect for Snowflake {
    fn name(&self) -> &'static str {
        "snowflake"
    }

    fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        Box::new(SnowflakeDialect {})
    }

    fn identifier_quotes(&self) -> &'static [char] {
        &['"', '`']
    }

    fn date_part_arg(&self, function: &str) -> Option<usize> {
        helpers::leading_date_part_arg(function)
            .or_else(|| helpers::find_date_part_arg(function, DATE_PART_FUNCTIONS))
    }
}
