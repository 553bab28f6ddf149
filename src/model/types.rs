//! Enum-like vocabulary of the semantic model.
//!
//! Every enum parses leniently: `parse` returns `None` for unknown text and
//! `from_name` substitutes the fixed fallback, so a typo in a model file never
//! aborts compilation.

use serde::Serialize;

/// Role of an entity (join key) on its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Primary,
    Foreign,
    Unique,
}

impl EntityKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Some(EntityKind::Primary),
            "foreign" => Some(EntityKind::Foreign),
            "unique" => Some(EntityKind::Unique),
            _ => None,
        }
    }

    /// Unknown kinds fall back to `Foreign`.
    pub fn from_name(s: &str) -> Self {
        Self::parse(s).unwrap_or(EntityKind::Foreign)
    }
}

/// Categorical or time dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    #[default]
    Categorical,
    Time,
}

impl DimensionKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "categorical" => Some(DimensionKind::Categorical),
            "time" => Some(DimensionKind::Time),
            _ => None,
        }
    }

    /// Unknown kinds fall back to `Categorical`.
    pub fn from_name(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }
}

/// Finest grain a time dimension is recorded at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

/// Timeframes offered for each granularity, finest first.
const TIMEFRAMES: &[(Granularity, &str)] = &[
    (Granularity::Second, "time"),
    (Granularity::Minute, "minute"),
    (Granularity::Hour, "hour"),
    (Granularity::Day, "date"),
    (Granularity::Week, "week"),
    (Granularity::Month, "month"),
    (Granularity::Quarter, "quarter"),
    (Granularity::Year, "year"),
];

impl Granularity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "second" => Some(Granularity::Second),
            "minute" => Some(Granularity::Minute),
            "hour" => Some(Granularity::Hour),
            "day" | "date" => Some(Granularity::Day),
            "week" => Some(Granularity::Week),
            "month" => Some(Granularity::Month),
            "quarter" => Some(Granularity::Quarter),
            "year" => Some(Granularity::Year),
            _ => None,
        }
    }

    /// Timeframes at or coarser than `granularity`, always led by `raw`.
    ///
    /// Without a granularity every timeframe from `time` upward is offered.
    pub fn timeframes(granularity: Option<Granularity>) -> Vec<&'static str> {
        let floor = granularity.unwrap_or(Granularity::Second);
        std::iter::once("raw")
            .chain(
                TIMEFRAMES
                    .iter()
                    .filter(|(g, _)| *g >= floor)
                    .map(|(_, tf)| *tf),
            )
            .collect()
    }
}

/// Aggregation applied by a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Sum,
    Count,
    CountDistinct,
    Avg,
    Min,
    Max,
    Median,
    Percentile,
}

impl Aggregation {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Some(Aggregation::Sum),
            "count" => Some(Aggregation::Count),
            "count_distinct" => Some(Aggregation::CountDistinct),
            "avg" | "average" => Some(Aggregation::Avg),
            "min" => Some(Aggregation::Min),
            "max" => Some(Aggregation::Max),
            "median" => Some(Aggregation::Median),
            "percentile" => Some(Aggregation::Percentile),
            _ => None,
        }
    }

    /// Unknown aggregations fall back to `Sum`.
    pub fn from_name(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    /// LookML measure type for this aggregation.
    pub fn lookml_type(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Count => "count",
            Aggregation::CountDistinct => "count_distinct",
            Aggregation::Avg => "average",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Median => "median",
            Aggregation::Percentile => "percentile",
        }
    }
}
