//! DuckDB SQL dialect.
//!
//! DuckDB features:
//! - ANSI identifier quoting (`"`), backticks also accepted
//! - Date parts passed as string literals (`date_trunc('month', d)`), so no
//!   function argument needs protecting from qualification

use sqlparser::dialect::{Dialect as ParserDialect, DuckDbDialect};

use super::SqlDialect;

/// DuckDB SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct DuckDb;

impl SqlDialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        Box::new(DuckDbDialect {})
    }

    fn identifier_quotes(&self) -> &'static [char] {
        &['"', '`']
    }
}
