//! Integration tests for SQL fragment qualification.

use insta::assert_snapshot;
use mantis_lookml::sql::{qualify, Dialect, KnownFields, Qualifier};

fn status_known() -> KnownFields {
    [("status", "status_field")].into_iter().collect()
}

// ============================================================================
// Reference resolution
// ============================================================================

#[test]
fn test_known_field_takes_precedence_over_table_column() {
    let known = status_known();
    assert_eq!(qualify("status", &known, Dialect::DuckDb), "${status_field}");
    assert_eq!(qualify("amount", &known, Dialect::DuckDb), "${TABLE}.amount");
}

#[test]
fn test_every_bare_column_in_a_predicate_is_rewritten() {
    let q = Qualifier::new(Dialect::Postgres);
    assert_snapshot!(
        q.qualify("status = 'paid' AND amount > 0 AND NOT is_test", &status_known()),
        @"${status_field} = 'paid' AND ${TABLE}.amount > 0 AND NOT ${TABLE}.is_test"
    );
}

#[test]
fn test_function_arguments_are_rewritten() {
    let q = Qualifier::new(Dialect::DuckDb);
    assert_snapshot!(
        q.qualify("COALESCE(discount, 0) + LOWER(status)", &status_known()),
        @"COALESCE(${TABLE}.discount, 0) + LOWER(${status_field})"
    );
}

#[test]
fn test_string_literals_are_not_columns() {
    let q = Qualifier::new(Dialect::Snowflake);
    assert_snapshot!(
        q.qualify("status IN ('status', 'amount')", &status_known()),
        @"${status_field} IN ('status', 'amount')"
    );
}

// ============================================================================
// Idempotence and degradation
// ============================================================================

#[test]
fn test_qualifying_twice_changes_nothing() {
    let q = Qualifier::new(Dialect::Postgres);
    let known = status_known();
    let once = q.qualify("amount * 2 + status", &known);
    assert_eq!(q.qualify(&once, &known), once);
}

#[test]
fn test_already_qualified_columns_are_untouched() {
    let q = Qualifier::new(Dialect::Snowflake);
    assert_eq!(
        q.qualify("orders.amount - refunds.amount", &status_known()),
        "orders.amount - refunds.amount"
    );
}

#[test]
fn test_unbalanced_input_round_trips_exactly() {
    for dialect in Dialect::ALL {
        assert_eq!(qualify("(((", &KnownFields::new(), dialect), "(((");
    }
}

// ============================================================================
// Declaration order
// ============================================================================

#[test]
fn test_fields_only_see_earlier_registrations() {
    let q = Qualifier::new(Dialect::DuckDb);
    let mut known = KnownFields::new();

    // `order_id` qualified before it is registered refers to the raw column.
    let entity_sql = q.qualify("order_id", &known);
    known.insert("order_id", "order_id");
    let dimension_sql = q.qualify("order_id || '-' || line", &known);

    assert_eq!(entity_sql, "${TABLE}.order_id");
    assert_snapshot!(dimension_sql, @"${order_id} || '-' || ${TABLE}.line");
}

#[test]
fn test_time_dimensions_resolve_to_raw_timeframe() {
    let q = Qualifier::new(Dialect::Snowflake);
    let known: KnownFields = [("created", "created_raw")].into_iter().collect();
    assert_snapshot!(
        q.qualify("DATEDIFF(day, created, shipped_at)", &known),
        @"DATEDIFF(day, ${created_raw}, ${TABLE}.shipped_at)"
    );
}

#[test]
fn test_referenced_columns_skip_date_parts() {
    let q = Qualifier::new(Dialect::Redshift);
    assert_eq!(
        q.referenced_columns("DATEADD(month, -1, created) < shipped"),
        vec!["created", "shipped"]
    );
}
