//! SQL dialect registry.
//!
//! Maps the logical dialect chosen for a compilation run to the grammar rules
//! the qualifier needs:
//!
//! - Which `sqlparser` grammar parses fragments written for the warehouse
//! - Identifier quote characters the grammar accepts: `"` (ANSI/PG), `` ` ``
//!   (BigQuery, MySQL, Databricks), `[]` (T-SQL, Redshift)
//! - Date-arithmetic syntax: functions whose date-part argument is a bare
//!   keyword (`DATEADD(day, 1, d)`, `DATE_TRUNC(d, MONTH)`) rather than a
//!   column, and must therefore never be qualified
//!
//! # Usage
//!
//! ```
//! use mantis_lookml::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::from_name("snowflake");
//! assert!(dialect.identifier_quotes().contains(&'"'));
//! assert_eq!(dialect.date_part_arg("DATEADD"), Some(0));
//! ```
//!
//! Unknown dialect names never fail: they resolve to [`Dialect::default()`].

mod bigquery;
mod databricks;
mod duckdb;
pub mod helpers;
mod mysql;
mod postgres;
mod redshift;
mod snowflake;
mod tsql;

pub use bigquery::BigQuery;
pub use databricks::Databricks;
pub use duckdb::DuckDb;
pub use mysql::MySql;
pub use postgres::Postgres;
pub use redshift::Redshift;
pub use snowflake::Snowflake;
pub use tsql::TSql;

use sqlparser::dialect::Dialect as ParserDialect;

/// SQL dialect trait - the grammar rules a dialect contributes to qualification.
///
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// The `sqlparser` grammar used to parse fragments in this dialect.
    fn parser_dialect(&self) -> Box<dyn ParserDialect>;

    /// Opening quote characters this dialect's grammar accepts around
    /// identifiers. The qualifier recognises quoted columns by these.
    fn identifier_quotes(&self) -> &'static [char] {
        &['"']
    }

    /// Position of the bare date-part keyword argument of a date function.
    ///
    /// `DATEADD(day, 1, order_date)` has its date part at position 0, BigQuery's
    /// `DATE_TRUNC(order_date, MONTH)` at position 1. Returns `None` when the
    /// function takes no keyword date part in this dialect. Matched
    /// case-insensitively.
    fn date_part_arg(&self, function: &str) -> Option<usize> {
        let _ = function;
        None
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    #[default]
    DuckDb,
    Postgres,
    Snowflake,
    BigQuery,
    Redshift,
    Databricks,
    MySql,
    TSql,
}

impl Dialect {
    /// Every supported dialect, in registry order.
    pub const ALL: [Dialect; 8] = [
        Dialect::DuckDb,
        Dialect::Postgres,
        Dialect::Snowflake,
        Dialect::BigQuery,
        Dialect::Redshift,
        Dialect::Databricks,
        Dialect::MySql,
        Dialect::TSql,
    ];

    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::DuckDb => &DuckDb,
            Dialect::Postgres => &Postgres,
            Dialect::Snowflake => &Snowflake,
            Dialect::BigQuery => &BigQuery,
            Dialect::Redshift => &Redshift,
            Dialect::Databricks => &Databricks,
            Dialect::MySql => &MySql,
            Dialect::TSql => &TSql,
        }
    }

    /// Resolve a dialect identifier, falling back to the default dialect.
    pub fn from_name(name: &str) -> Dialect {
        Self::lookup(name).unwrap_or_default()
    }

    /// Resolve a dialect identifier, `None` if it is not recognised.
    pub fn lookup(name: &str) -> Option<Dialect> {
        match name.trim().to_ascii_lowercase().as_str() {
            "duckdb" => Some(Dialect::DuckDb),
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            "snowflake" => Some(Dialect::Snowflake),
            "bigquery" => Some(Dialect::BigQuery),
            "redshift" => Some(Dialect::Redshift),
            "databricks" | "spark" => Some(Dialect::Databricks),
            "mysql" => Some(Dialect::MySql),
            "tsql" | "mssql" | "sqlserver" => Some(Dialect::TSql),
            _ => None,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        self.dialect().parser_dialect()
    }

    fn identifier_quotes(&self) -> &'static [char] {
        self.dialect().identifier_quotes()
    }

    fn date_part_arg(&self, function: &str) -> Option<usize> {
        self.dialect().date_part_arg(function)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
