//! Integration tests for the dialect registry.

use mantis_lookml::sql::dialect::{Dialect, SqlDialect};

#[test]
fn test_unknown_names_fall_back_to_duckdb() {
    assert_eq!(Dialect::from_name("oracle"), Dialect::DuckDb);
    assert_eq!(Dialect::from_name(""), Dialect::DuckDb);
    assert_eq!(Dialect::lookup("oracle"), None);
}

#[test]
fn test_aliases_are_case_insensitive() {
    assert_eq!(Dialect::from_name("SQLServer"), Dialect::TSql);
    assert_eq!(Dialect::from_name("postgresql"), Dialect::Postgres);
    assert_eq!(Dialect::from_name("SPARK"), Dialect::Databricks);
    assert_eq!(Dialect::from_name("BigQuery"), Dialect::BigQuery);
}

#[test]
fn test_identifier_quotes() {
    assert_eq!(Dialect::Postgres.identifier_quotes(), &['"']);
    assert_eq!(Dialect::Databricks.identifier_quotes(), &['`']);
    assert!(Dialect::DuckDb.identifier_quotes().contains(&'"'));
    assert!(Dialect::TSql.identifier_quotes().contains(&'['));
    assert!(Dialect::Redshift.identifier_quotes().contains(&'['));
}

#[test]
fn test_date_part_positions() {
    assert_eq!(Dialect::Snowflake.date_part_arg("DATEADD"), Some(0));
    assert_eq!(Dialect::Snowflake.date_part_arg("date_trunc"), Some(0));
    assert_eq!(Dialect::BigQuery.date_part_arg("DATE_TRUNC"), Some(1));
    assert_eq!(Dialect::BigQuery.date_part_arg("TIMESTAMP_DIFF"), Some(2));
    assert_eq!(Dialect::TSql.date_part_arg("DATEDIFF"), Some(0));
    assert_eq!(Dialect::MySql.date_part_arg("TIMESTAMPDIFF"), Some(0));
    assert_eq!(Dialect::Postgres.date_part_arg("DATEADD"), None);
    assert_eq!(Dialect::DuckDb.date_part_arg("DATE_TRUNC"), None);
}

#[test]
fn test_every_dialect_parses_a_simple_expression() {
    use sqlparser::parser::Parser;

    for dialect in Dialect::ALL {
        let grammar = dialect.parser_dialect();
        let parsed = Parser::new(&*grammar)
            .try_with_sql("amount * 2")
            .and_then(|mut p| p.parse_expr());
        assert!(parsed.is_ok(), "{dialect} failed to parse");
    }
}
