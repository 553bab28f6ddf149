//! Amazon Redshift dialect.
//!
//! Redshift features:
//! - ANSI identifier quoting (`"`), square brackets also accepted
//! - Postgres-style `date_trunc('month', d)` alongside bare date parts in
//!   `DATEADD(day, 1, d)`, `DATEDIFF(day, a, b)` and `DATE_PART(day, d)`

use sqlparser::dialect::{Dialect as ParserDialect, RedshiftSqlDialect};

use super::helpers;
use super::SqlDialect;

/// Amazon Redshift dialect.
#[derive(Debug, Clone, Copy)]
pub struct Redshift;

impl SqlDialect for Redshift {
    fn name(&self) -> &'static str {
        "redshift"
    }

    fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        Box::new(RedshiftSqlDialect {})
    }

    fn identifier_quotes(&self) -> &'static [char] {
        &['"', '[']
    }

    fn date_part_arg(&self, function: &str) -> Option<usize> {
        helpers::leading_date_part_arg(function)
    }
}
