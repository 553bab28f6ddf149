//! MySQL dialect.
//!
//! MySQL features:
//! - Backtick identifier quoting
//! - Bare units in `TIMESTAMPADD(DAY, 1, d)` / `TIMESTAMPDIFF(DAY, a, b)`

use sqlparser::dialect::{Dialect as ParserDialect, MySqlDialect};

use super::helpers;
use super::SqlDialect;

const DATE_PART_FUNCTIONS: &[(&str, usize)] = &[("TIMESTAMPADD", 0), ("TIMESTAMPDIFF", 0)];

/// MySQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        Box::new(MySqlDialect {})
    }

    fn identifier_quotes(&self) -> &'static [char] {
        &['`']
    }

    fn date_part_arg(&self, function: &str) -> Option<usize> {
        helpers::find_date_part_arg(function, DATE_PART_FUNCTIONS)
    }
}
