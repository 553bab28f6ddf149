//! BigQuery SQL dialect.
//!
//! BigQuery features:
//! - Backtick identifier quoting
//! - Date parts trail the operands: `DATE_TRUNC(d, MONTH)`,
//!   `TIMESTAMP_DIFF(a, b, DAY)`, `LAST_DAY(d, MONTH)`

use sqlparser::dialect::{BigQueryDialect, Dialect as ParserDialect};

use super::helpers;
use super::SqlDialect;

const DATE_PART_FUNCTIONS: &[(&str, usize)] = &[
    ("DATE_TRUNC", 1),
    ("DATETIME_TRUNC", 1),
    ("TIMESTAMP_TRUNC", 1),
    ("TIME_TRUNC", 1),
    ("LAST_DAY", 1),
    ("DATE_DIFF", 2),
    ("DATETIME_DIFF", 2),
    ("TIMESTAMP_DIFF", 2),
    ("TIME_DIFF", 2),
];

/// BigQuery SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct BigQuery;

impl SqlDialect for BigQuery {
    fn name(&self) -> &'static str {
        "bigquery"
    }

    fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        Box::new(BigQueryDialect {})
    }

    fn identifier_quotes(&self) -> &'static [char] {
        &['`']
    }

    fn date_part_arg(&self, function: &str) -> Option<usize> {
        helpers::find_date_part_arg(function, DATE_PART_FUNCTIONS)
    }
}
