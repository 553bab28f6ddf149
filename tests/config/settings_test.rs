//! Integration tests for TOML settings.

use std::fs;

use mantis_lookml::config::{Settings, SettingsError};
use mantis_lookml::labels::PopStyle;
use mantis_lookml::pop::PopStrategy;
use mantis_lookml::semantic::{ExposeLevel, Relationship};
use mantis_lookml::sql::Dialect;

const FULL: &str = r#"
[compile]
dialect = "snowflake"
view_prefix = "dev_"
explore_prefix = "x_"
schema_override = "analytics_dev"
connection = "warehouse"

[labels]
max_length = 24
group_conformity = false
pop_style = "verbose"

[pop]
strategy = "dynamic"
comparison_field = "in_prior_period"

[[explores]]
fact = "orders"
label = "Orders"
exclude = ["audit_log"]

[explores.overrides.customers]
relationship = "one_to_one"
expose = "all"

[[explores]]
fact = "sessions"
name = "web_sessions"
"#;

#[test]
fn test_parse_full_settings() {
    let settings: Settings = FULL.parse().unwrap();

    assert_eq!(settings.compile.dialect_type(), Dialect::Snowflake);
    assert_eq!(settings.compile.view_prefix, "dev_");
    assert_eq!(
        settings.compile.resolved_schema_override().unwrap().as_deref(),
        Some("analytics_dev")
    );
    assert_eq!(settings.compile.connection.as_deref(), Some("warehouse"));

    let labels = settings.labels.to_config();
    assert_eq!(labels.max_length, 24);
    assert!(!labels.group_conformity);
    assert_eq!(labels.pop_style, PopStyle::Verbose);

    assert_eq!(settings.pop.strategy_type(), PopStrategy::Dynamic);
    assert_eq!(settings.pop.comparison_field, "in_prior_period");
}

#[test]
fn test_explore_settings() {
    let settings: Settings = FULL.parse().unwrap();
    assert_eq!(settings.explores.len(), 2);

    let orders = &settings.explores[0];
    assert_eq!(orders.explore_name(), "orders");
    assert_eq!(orders.exclude, vec!["audit_log"]);
    let overrides = orders.join_overrides();
    assert_eq!(overrides["customers"].relationship, Some(Relationship::OneToOne));
    assert_eq!(overrides["customers"].expose, Some(ExposeLevel::All));

    assert_eq!(settings.explores[1].explore_name(), "web_sessions");
}

#[test]
fn test_missing_sections_use_defaults() {
    let settings: Settings = "[pop]\nstrategy = \"native\"\n".parse().unwrap();
    assert_eq!(settings.pop.strategy_type(), PopStrategy::Materialized);
    assert_eq!(settings.pop.comparison_field, "is_comparison_period");
    assert_eq!(settings.compile.dialect_type(), Dialect::DuckDb);
    assert_eq!(settings.labels.max_length, 30);
}

#[test]
fn test_unknown_override_values_are_ignored() {
    let settings: Settings = r#"
[[explores]]
fact = "orders"

[explores.overrides.customers]
relationship = "sideways"
"#
    .parse()
    .unwrap();
    let overrides = settings.explores[0].join_overrides();
    assert_eq!(overrides["customers"].relationship, None);
    assert_eq!(overrides["customers"].expose, None);
}

#[test]
fn test_invalid_values_are_rejected() {
    let too_short = "[labels]\nmax_length = 2\n".parse::<Settings>();
    assert!(matches!(too_short, Err(SettingsError::InvalidConfig(_))));

    let no_fact = "[[explores]]\nlabel = \"Orphan\"\n".parse::<Settings>();
    assert!(matches!(no_fact, Err(SettingsError::InvalidConfig(_))));

    let malformed = "[labels\nmax_length = 30".parse::<Settings>();
    assert!(matches!(malformed, Err(SettingsError::ParseError(_))));
}

#[test]
fn test_from_file() {
    let path = std::env::temp_dir().join("mantis_lookml_settings_test.toml");
    fs::write(&path, FULL).unwrap();

    let settings = Settings::from_file(&path).unwrap();
    assert_eq!(settings.compile.explore_prefix, "x_");

    fs::remove_file(&path).unwrap();
    assert!(matches!(
        Settings::from_file(&path),
        Err(SettingsError::FileNotFound(_))
    ));
}

#[test]
fn test_schema_override_expands_env_vars() {
    std::env::set_var("MANTIS_LOOKML_SCHEMA_TEST", "scratch");
    let settings: Settings = "[compile]\nschema_override = \"${MANTIS_LOOKML_SCHEMA_TEST}\"\n"
        .parse()
        .unwrap();
    assert_eq!(
        settings.compile.resolved_schema_override().unwrap().as_deref(),
        Some("scratch")
    );
    std::env::remove_var("MANTIS_LOOKML_SCHEMA_TEST");
}
