//! Metrics and their variants.
//!
//! A metric is a business calculation over measures. Its period-over-period
//! and benchmark configuration expands into a list of [`MetricVariant`]s that
//! the metric owns:
//!
//! ```text
//! revenue  pop { comparisons: [prior_year, prior_month], outputs: [previous, change] }
//!   ├── Base                          revenue
//!   ├── Pop(prior_year,  previous)    revenue_py
//!   ├── Pop(prior_year,  change)      revenue_py_change
//!   ├── Pop(prior_month, previous)    revenue_pm
//!   └── Pop(prior_month, change)      revenue_pm_change
//! ```
//!
//! Variant names are always derived from the owning metric, never stored.

use serde::Serialize;

use crate::labels::Labeled;
use crate::sql::Qualifier;

// ============================================================================
// Period-over-period vocabulary
// ============================================================================

/// The prior period a metric is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PopComparison {
    PriorYear,
    PriorQuarter,
    PriorMonth,
    PriorWeek,
}

/// What a period-over-period variant reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PopOutput {
    /// The metric's value in the prior period.
    Previous,
    /// Current minus prior.
    Change,
    /// (Current minus prior) / prior.
    PctChange,
}

/// Name suffix per comparison.
pub const COMPARISON_SUFFIXES: [(PopComparison, &str); 4] = [
    (PopComparison::PriorYear, "_py"),
    (PopComparison::PriorQuarter, "_pq"),
    (PopComparison::PriorMonth, "_pm"),
    (PopComparison::PriorWeek, "_pw"),
];

/// Name suffix per output; `previous` adds nothing beyond the comparison.
pub const OUTPUT_SUFFIXES: [(PopOutput, &str); 3] = [
    (PopOutput::Previous, ""),
    (PopOutput::Change, "_change"),
    (PopOutput::PctChange, "_pct_change"),
];

/// Human name, abbreviation and LookML period per comparison.
const COMPARISON_NAMES: [(PopComparison, &str, &str, &str); 4] = [
    (PopComparison::PriorYear, "Prior Year", "PY", "year"),
    (PopComparison::PriorQuarter, "Prior Quarter", "PQ", "quarter"),
    (PopComparison::PriorMonth, "Prior Month", "PM", "month"),
    (PopComparison::PriorWeek, "Prior Week", "PW", "week"),
];

impl PopComparison {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prior_year" | "py" | "year" | "yoy" => Some(PopComparison::PriorYear),
            "prior_quarter" | "pq" | "quarter" | "qoq" => Some(PopComparison::PriorQuarter),
            "prior_month" | "pm" | "month" | "mom" => Some(PopComparison::PriorMonth),
            "prior_week" | "pw" | "week" | "wow" => Some(PopComparison::PriorWeek),
            _ => None,
        }
    }

    /// Unknown comparisons fall back to `PriorYear`.
    pub fn from_name(s: &str) -> Self {
        Self::parse(s).unwrap_or(PopComparison::PriorYear)
    }

    pub fn suffix(&self) -> &'static str {
        lookup(&COMPARISON_SUFFIXES, self)
    }

    /// Human name, e.g. "Prior Year".
    pub fn label(&self) -> &'static str {
        self.names().1
    }

    /// Abbreviation, e.g. "PY".
    pub fn abbreviation(&self) -> &'static str {
        self.names().2
    }

    /// LookML `period` of a `period_over_period` measure.
    pub fn period(&self) -> &'static str {
        self.names().3
    }

    fn names(&self) -> (PopComparison, &'static str, &'static str, &'static str) {
        COMPARISON_NAMES
            .iter()
            .copied()
            .find(|(c, ..)| c == self)
            .unwrap_or(COMPARISON_NAMES[0])
    }
}

impl PopOutput {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "previous" | "prior" => Some(PopOutput::Previous),
            "change" | "difference" => Some(PopOutput::Change),
            "pct_change" | "percent_change" | "relative_change" => Some(PopOutput::PctChange),
            _ => None,
        }
    }

    /// Unknown outputs fall back to `Previous`.
    pub fn from_name(s: &str) -> Self {
        Self::parse(s).unwrap_or(PopOutput::Previous)
    }

    pub fn suffix(&self) -> &'static str {
        lookup(&OUTPUT_SUFFIXES, self)
    }

    /// LookML `kind` of a `period_over_period` measure.
    pub fn lookml_kind(&self) -> &'static str {
        match self {
            PopOutput::Previous => "previous",
            PopOutput::Change => "difference",
            PopOutput::PctChange => "relative_change",
        }
    }
}

fn lookup<K: PartialEq>(table: &[(K, &'static str)], key: &K) -> &'static str {
    table
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| *v)
        .unwrap_or("")
}

/// Declarative period-over-period configuration of a metric.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PopConfig {
    pub comparisons: Vec<PopComparison>,
    pub outputs: Vec<PopOutput>,
}

impl PopConfig {
    pub fn new(comparisons: Vec<PopComparison>, outputs: Vec<PopOutput>) -> Self {
        Self {
            comparisons,
            outputs,
        }
    }
}

/// A named filtered slice a metric is benchmarked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkSlice {
    pub name: String,
    /// SQL condition selecting the benchmark rows.
    pub filter: String,
}

// ============================================================================
// Variants
// ============================================================================

/// Discriminant of a [`MetricVariant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    Base,
    Pop,
    Benchmark,
}

/// One concrete rendered form of a metric.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetricVariant {
    /// The metric's unmodified aggregation.
    Base,
    /// A comparison against a prior period.
    Pop {
        comparison: PopComparison,
        output: PopOutput,
    },
    /// The metric restricted to a benchmark slice.
    Benchmark { slice: String },
}

impl MetricVariant {
    pub fn kind(&self) -> VariantKind {
        match self {
            MetricVariant::Base => VariantKind::Base,
            MetricVariant::Pop { .. } => VariantKind::Pop,
            MetricVariant::Benchmark { .. } => VariantKind::Benchmark,
        }
    }

    /// Suffix appended to the metric name.
    pub fn suffix(&self) -> String {
        match self {
            MetricVariant::Base => String::new(),
            MetricVariant::Pop { comparison, output } => {
                format!("{}{}", comparison.suffix(), output.suffix())
            }
            MetricVariant::Benchmark { slice } => format!("_{slice}_benchmark"),
        }
    }

    /// The variant's field name: `metric.name + suffix`.
    pub fn resolve_name(&self, metric: &Metric) -> String {
        format!("{}{}", metric.name, self.suffix())
    }
}

// ============================================================================
// Metric
// ============================================================================

/// How a metric computes its value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricKind {
    /// A single measure.
    Simple { measure: String },
    /// An expression over other metrics or measures.
    Derived { expr: String, metrics: Vec<String> },
    /// numerator / denominator, both measures or metrics.
    Ratio {
        numerator: String,
        denominator: String,
    },
}

/// A business metric and the variants it renders as.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub kind: MetricKind,
    /// SQL condition restricting the rows a simple metric aggregates.
    pub filter: Option<String>,
    pub pop: Option<PopConfig>,
    pub benchmarks: Vec<BenchmarkSlice>,
    /// Expanded variants; see [`Metric::expand_variants`].
    pub variants: Vec<MetricVariant>,
    /// Time dimension period comparisons are based on.
    pub time_dimension: Option<String>,
    pub group: Option<String>,
    pub label: Option<String>,
    pub short_label: Option<String>,
    pub description: Option<String>,
    pub value_format: Option<String>,
}

impl Metric {
    pub fn new(name: impl Into<String>, kind: MetricKind) -> Self {
        Self {
            name: name.into(),
            kind,
            filter: None,
            pop: None,
            benchmarks: Vec::new(),
            variants: Vec::new(),
            time_dimension: None,
            group: None,
            label: None,
            short_label: None,
            description: None,
            value_format: None,
        }
    }

    pub fn simple(name: impl Into<String>, measure: impl Into<String>) -> Self {
        Self::new(
            name,
            MetricKind::Simple {
                measure: measure.into(),
            },
        )
    }

    pub fn derived(name: impl Into<String>, expr: impl Into<String>, metrics: Vec<String>) -> Self {
        Self::new(
            name,
            MetricKind::Derived {
                expr: expr.into(),
                metrics,
            },
        )
    }

    pub fn ratio(
        name: impl Into<String>,
        numerator: impl Into<String>,
        denominator: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            MetricKind::Ratio {
                numerator: numerator.into(),
                denominator: denominator.into(),
            },
        )
    }

    pub fn with_pop(mut self, pop: PopConfig) -> Self {
        self.pop = Some(pop);
        self
    }

    pub fn with_benchmark(mut self, name: impl Into<String>, filter: impl Into<String>) -> Self {
        self.benchmarks.push(BenchmarkSlice {
            name: name.into(),
            filter: filter.into(),
        });
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_short_label(mut self, short: impl Into<String>) -> Self {
        self.short_label = Some(short.into());
        self
    }

    pub fn with_time_dimension(mut self, dimension: impl Into<String>) -> Self {
        self.time_dimension = Some(dimension.into());
        self
    }

    pub fn is_simple(&self) -> bool {
        matches!(self.kind, MetricKind::Simple { .. })
    }

    /// Expand the PoP and benchmark configuration into `variants`.
    ///
    /// Produces `Base`, then one `Pop` variant per (comparison, output) pair
    /// in configuration order, then one `Benchmark` per slice. Exact
    /// duplicates are dropped. The list is rebuilt from the configuration on
    /// every call, so expanding twice yields the same variants.
    pub fn expand_variants(&mut self) {
        let mut variants = vec![MetricVariant::Base];

        if let Some(pop) = &self.pop {
            for comparison in &pop.comparisons {
                for output in &pop.outputs {
                    variants.push(MetricVariant::Pop {
                        comparison: *comparison,
                        output: *output,
                    });
                }
            }
        }

        for slice in &self.benchmarks {
            variants.push(MetricVariant::Benchmark {
                slice: slice.name.clone(),
            });
        }

        let mut unique: Vec<MetricVariant> = Vec::with_capacity(variants.len());
        for variant in variants {
            if !unique.contains(&variant) {
                unique.push(variant);
            }
        }
        self.variants = unique;
    }

    /// Expanded PoP variants, in expansion order.
    pub fn pop_variants(&self) -> impl Iterator<Item = (PopComparison, PopOutput)> + '_ {
        self.variants.iter().filter_map(|v| match v {
            MetricVariant::Pop { comparison, output } => Some((*comparison, *output)),
            _ => None,
        })
    }

    pub fn benchmark(&self, slice: &str) -> Option<&BenchmarkSlice> {
        self.benchmarks.iter().find(|b| b.name == slice)
    }

    /// Category used to label PoP variants: the group's second path segment,
    /// else its first.
    pub fn category(&self) -> Option<&str> {
        let group = self.group.as_deref()?;
        let mut parts = group.split('.').filter(|p| !p.is_empty());
        let first = parts.next()?;
        Some(parts.next().unwrap_or(first))
    }

    /// Names of the measures or metrics this metric reads directly.
    ///
    /// Derived metrics list their declared dependencies first, then any other
    /// bare identifier in the expression.
    pub fn inputs(&self, qualifier: &Qualifier) -> Vec<String> {
        match &self.kind {
            MetricKind::Simple { measure } => vec![measure.clone()],
            MetricKind::Ratio {
                numerator,
                denominator,
            } => {
                let mut inputs = vec![numerator.clone()];
                if denominator != numerator {
                    inputs.push(denominator.clone());
                }
                inputs
            }
            MetricKind::Derived { expr, metrics } => {
                let mut inputs: Vec<String> = Vec::new();
                for name in metrics.iter().cloned().chain(qualifier.referenced_columns(expr)) {
                    if !inputs.contains(&name) {
                        inputs.push(name);
                    }
                }
                inputs
            }
        }
    }
}

impl Labeled for Metric {
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
