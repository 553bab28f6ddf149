//! Measures: aggregations over a model's rows.

use super::types::Aggregation;
use crate::labels::Labeled;

/// Default rank of a percentile measure.
pub const DEFAULT_PERCENTILE: f64 = 50.0;

/// A measure spelled as a LookML aggregate: `type` plus optional `sql`.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSql {
    pub measure_type: &'static str,
    pub sql: Option<String>,
    pub percentile: Option<f64>,
}

impl AggregateSql {
    /// Whether LookML `filters:` apply to this aggregate.
    ///
    /// `number` measures are plain SQL and ignore filters.
    pub fn supports_filters(&self) -> bool {
        self.measure_type != "number"
    }

    /// Map the SQL through `f`, e.g. to qualify column references.
    pub fn map_sql(mut self, f: impl FnOnce(&str) -> String) -> Self {
        self.sql = self.sql.as_deref().map(f);
        self
    }

    /// Restrict the aggregate to rows matching `condition`.
    ///
    /// Both the aggregate SQL and `condition` must already be qualified.
    pub fn restrict(self, condition: &str) -> Self {
        match (self.measure_type, self.sql) {
            ("count", None) => AggregateSql {
                measure_type: "sum",
                sql: Some(format!("CASE WHEN {condition} THEN 1 ELSE 0 END")),
                percentile: None,
            },
            ("number", Some(sql)) => AggregateSql {
                measure_type: "number",
                sql: Some(restrict_count(&sql, condition)),
                percentile: None,
            },
            (measure_type, Some(sql)) => AggregateSql {
                measure_type,
                sql: Some(format!("CASE WHEN {condition} THEN {sql} END")),
                percentile: self.percentile,
            },
            (measure_type, None) => AggregateSql {
                measure_type,
                sql: None,
                percentile: self.percentile,
            },
        }
    }
}

/// `COUNT(x)` restricted to `condition`.
fn restrict_count(sql: &str, condition: &str) -> String {
    match sql
        .strip_prefix("COUNT(")
        .and_then(|inner| inner.strip_suffix(')'))
    {
        Some(inner) => format!("COUNT(CASE WHEN {condition} THEN {inner} END)"),
        None => format!("CASE WHEN {condition} THEN {sql} END"),
    }
}

/// An aggregation over a column expression.
///
/// `expr` is the inner expression (`amount`), never the aggregate call.
/// A `count` without `expr` counts distinct primary keys of the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    pub name: String,
    pub agg: Aggregation,
    pub expr: Option<String>,
    /// Percentile rank for `Aggregation::Percentile` (defaults to 50).
    pub percentile: Option<f64>,
    /// Time dimension the measure is aggregated over.
    pub agg_time_dimension: Option<String>,
    pub group: Option<String>,
    pub label: Option<String>,
    pub short_label: Option<String>,
    pub description: Option<String>,
}

impl Measure {
    pub fn new(name: impl Into<String>, agg: Aggregation) -> Self {
        Self {
            name: name.into(),
            agg,
            expr: None,
            percentile: None,
            agg_time_dimension: None,
            group: None,
            label: None,
            short_label: None,
            description: None,
        }
    }

    pub fn sum(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self::new(name, Aggregation::Sum).with_expr(expr)
    }

    pub fn count(name: impl Into<String>) -> Self {
        Self::new(name, Aggregation::Count)
    }

    pub fn with_expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = Some(expr.into());
        self
    }

    pub fn with_agg_time_dimension(mut self, dimension: impl Into<String>) -> Self {
        self.agg_time_dimension = Some(dimension.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The measure as a LookML aggregate, with unqualified SQL.
    ///
    /// `primary_key` is the SQL of the model's primary entity: a `count`
    /// without `expr` counts distinct keys, or rows when there is no key.
    /// A `count` with `expr` counts non-null values.
    pub fn aggregate(&self, primary_key: Option<&str>) -> AggregateSql {
        match (self.agg, self.expr.as_deref()) {
            (Aggregation::Count, None) => match primary_key {
                Some(key) => AggregateSql {
                    measure_type: Aggregation::CountDistinct.lookml_type(),
                    sql: Some(key.to_string()),
                    percentile: None,
                },
                None => AggregateSql {
                    measure_type: "count",
                    sql: None,
                    percentile: None,
                },
            },
            (Aggregation::Count, Some(expr)) => AggregateSql {
                measure_type: "number",
                sql: Some(format!("COUNT({expr})")),
                percentile: None,
            },
            (Aggregation::Percentile, expr) => AggregateSql {
                measure_type: Aggregation::Percentile.lookml_type(),
                sql: expr.map(str::to_string),
                percentile: Some(self.percentile.unwrap_or(DEFAULT_PERCENTILE)),
            },
            (agg, expr) => AggregateSql {
                measure_type: agg.lookml_type(),
                sql: expr.map(str::to_string),
                percentile: None,
            },
        }
    }
}

impl Labeled for Measure {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn short_label(&self) -> Option<&str> {
        self.short_label.as_deref()
    }
}
