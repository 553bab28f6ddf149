//! T-SQL (SQL Server / Azure SQL) dialect.
//!
//! T-SQL features:
//! - Square bracket identifier quoting (`[name]`), double quotes with
//!   QUOTED_IDENTIFIER on
//! - Bare date-part keywords in `DATEADD(dd, 1, d)`, `DATEDIFF(day, a, b)`,
//!   `DATEPART(month, d)`, `DATENAME(weekday, d)`, `DATETRUNC(month, d)`

use sqlparser::dialect::{Dialect as ParserDialect, MsSqlDialect};

use super::helpers;
use super::SqlDialect;

/// T-SQL (SQL Server) dialect.
#[derive(Debug, Clone, Copy)]
pub struct TSql;

impl SqlDialect for TSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        Box::new(MsSqlDialect {})
    }

    fn identifier_quotes(&self) -> &'static [char] {
        &['[', '"']
    }

    fn date_part_arg(&self, function: &str) -> Option<usize> {
        helpers::leading_date_part_arg(function)
    }
}
