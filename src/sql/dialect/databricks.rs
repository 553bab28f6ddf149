//! Databricks (Spark SQL) dialect.
//!
//! Databricks features:
//! - Backtick identifier quoting
//! - Bare date-part keywords in `DATEADD(day, 1, d)`,
//!   `TIMESTAMPDIFF(HOUR, a, b)`; `date_trunc('MONTH', d)` takes a string

use sqlparser::dialect::{DatabricksDialect, Dialect as ParserDialect};

use super::helpers;
use super::SqlDialect;

/// Databricks (Spark SQL) dialect.
#[derive(Debug, Clone, Copy)]
pub struct Databricks;

impl SqlDialect for Databricks {
    fn name(&self) -> &'static str {
        "databricks"
    }

    fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        Box::new(DatabricksDialect {})
    }

    fn identifier_quotes(&self) -> &'static [char] {
        &['`']
    }

    fn date_part_arg(&self, function: &str) -> Option<usize> {
        helpers::leading_date_part_arg(function)
    }
}
