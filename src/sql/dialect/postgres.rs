//! PostgreSQL dialect.
//!
//! PostgreSQL features:
//! - ANSI identifier quoting (`"`)
//! - Date parts as string literals (`date_trunc('month', d)`,
//!   `date_part('day', d)`) and `EXTRACT(day FROM d)`, which the parser
//!   already treats as syntax rather than column references

use sqlparser::dialect::{Dialect as ParserDialect, PostgreSqlDialect};

use super::SqlDialect;

/// PostgreSQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        Box::new(PostgreSqlDialect {})
    }
}
