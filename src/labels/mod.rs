//! Display labels for rendered fields.
//!
//! Labels are resolved against a [`LabelConfig`] loaded once per run:
//!
//! - a field's *base* label is its explicit label, else its name in title case
//! - a base label longer than `max_length` is replaced by the field's short
//!   label when it has one (never silently truncated)
//! - with group conformity, one long label in a sibling group switches every
//!   sibling that has a short label over to it
//!
//! Period-over-period variants get their labels from fixed templates selected
//! by [`PopStyle`]; those *are* truncated to fit.

use std::collections::{BTreeMap, HashMap};

use inflector::Inflector;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::model::{PopComparison, PopOutput};

/// Default maximum label length.
pub const DEFAULT_MAX_LENGTH: usize = 30;

/// Reserved view label sorted ahead of every other view label.
pub const METRICS_VIEW_LABEL: &str = "Metrics";

const ELLIPSIS: char = '…';

/// Anything that can be labelled: entities, dimensions, measures, metrics.
pub trait Labeled {
    fn name(&self) -> &str;
    fn label(&self) -> Option<&str>;
    fn short_label(&self) -> Option<&str>;
}

/// A bare labelled field, for callers without a model object at hand.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldLabel {
    pub name: String,
    pub label: Option<String>,
    pub short_label: Option<String>,
}

impl FieldLabel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_short_label(mut self, short: impl Into<String>) -> Self {
        self.short_label = Some(short.into());
        self
    }
}

impl Labeled for FieldLabel {
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

// ============================================================================
// Configuration
// ============================================================================

/// Template family for period-over-period labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PopStyle {
    /// `Revenue (PY)`, `Revenue Δ PY`, `Revenue %Δ PY`
    #[default]
    Compact,
    /// `Revenue (PY)`, `Revenue Change (PY)`, `Revenue % Change (PY)`
    Standard,
    /// `Revenue - Prior Year`, `Revenue Change vs Prior Year`, ...
    Verbose,
}

impl PopStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Some(PopStyle::Compact),
            "standard" => Some(PopStyle::Standard),
            "verbose" => Some(PopStyle::Verbose),
            _ => None,
        }
    }

    /// Unknown styles fall back to `Compact`.
    pub fn from_name(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }
}

/// Label templates for one [`PopStyle`].
#[derive(Debug, Clone, Copy)]
struct PopTemplates {
    previous: &'static str,
    change: &'static str,
    pct_change: &'static str,
}

impl PopTemplates {
    fn for_output(&self, output: PopOutput) -> &'static str {
        match output {
            PopOutput::Previous => self.previous,
            PopOutput::Change => self.change,
            PopOutput::PctChange => self.pct_change,
        }
    }
}

static POP_TEMPLATES: Lazy<HashMap<PopStyle, PopTemplates>> = Lazy::new(|| {
    HashMap::from([
        (
            PopStyle::Compact,
            PopTemplates {
                previous: "{label} ({comp_abbrev})",
                change: "{label} Δ {comp_abbrev}",
                pct_change: "{label} %Δ {comp_abbrev}",
            },
        ),
        (
            PopStyle::Standard,
            PopTemplates {
                previous: "{label} ({comp_abbrev})",
                change: "{label} Change ({comp_abbrev})",
                pct_change: "{label} % Change ({comp_abbrev})",
            },
        ),
        (
            PopStyle::Verbose,
            PopTemplates {
                previous: "{label} - {comparison}",
                change: "{label} Change vs {comparison}",
                pct_change: "{label} % Change vs {comparison}",
            },
        ),
    ])
});

/// Label policy for one compilation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelConfig {
    pub max_length: usize,
    pub group_conformity: bool,
    pub pop_style: PopStyle,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            group_conformity: true,
            pop_style: PopStyle::default(),
        }
    }
}

/// `order_status` -> `Order Status`.
pub fn title_case(name: &str) -> String {
    name.to_title_case()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl LabelConfig {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            ..Self::default()
        }
    }

    pub fn with_group_conformity(mut self, enabled: bool) -> Self {
        self.group_conformity = enabled;
        self
    }

    pub fn with_pop_style(mut self, style: PopStyle) -> Self {
        self.pop_style = style;
        self
    }

    /// Explicit label, else the name in title case.
    pub fn base_label(&self, field: &dyn Labeled) -> String {
        field
            .label()
            .map(str::to_string)
            .unwrap_or_else(|| title_case(field.name()))
    }

    fn exceeds(&self, label: &str) -> bool {
        char_len(label) > self.max_length
    }

    /// The label a field displays on its own.
    ///
    /// A base label over `max_length` gives way to the short label when one
    /// exists; otherwise the base label is kept at full length.
    pub fn effective_label(&self, field: &dyn Labeled) -> String {
        let base = self.base_label(field);
        match field.short_label() {
            Some(short) if self.exceeds(&base) => short.to_string(),
            _ => base,
        }
    }

    /// Labels for a group of sibling fields, keyed by field name.
    ///
    /// With group conformity, a single over-long base label anywhere in the
    /// group makes every field that has a short label use it.
    pub fn resolve_group_labels(&self, fields: &[&dyn Labeled]) -> BTreeMap<String, String> {
        if !self.group_conformity {
            return fields
                .iter()
                .map(|f| (f.name().to_string(), self.effective_label(*f)))
                .collect();
        }

        let any_too_long = fields.iter().any(|f| self.exceeds(&self.base_label(*f)));
        fields
            .iter()
            .map(|f| {
                let label = match f.short_label() {
                    Some(short) if any_too_long => short.to_string(),
                    _ => self.base_label(*f),
                };
                (f.name().to_string(), label)
            })
            .collect()
    }

    /// Label of a period-over-period variant of `metric`.
    pub fn pop_label(
        &self,
        metric: &dyn Labeled,
        comparison: PopComparison,
        output: PopOutput,
    ) -> String {
        self.render_pop_template(
            metric,
            output,
            comparison.label(),
            comparison.abbreviation(),
        )
    }

    /// Label of a dynamic (filter-driven) comparison measure, whose period is
    /// chosen at query time.
    pub fn dynamic_pop_label(&self, metric: &dyn Labeled, output: PopOutput) -> String {
        self.render_pop_template(metric, output, "Prior Period", "PP")
    }

    /// Label of a benchmark variant.
    pub fn benchmark_label(&self, metric: &dyn Labeled, slice: &str) -> String {
        let label = format!("{} ({} Benchmark)", self.base_label(metric), title_case(slice));
        self.fit(label)
    }

    fn render_pop_template(
        &self,
        metric: &dyn Labeled,
        output: PopOutput,
        comparison: &str,
        abbreviation: &str,
    ) -> String {
        let label = match self.pop_style {
            PopStyle::Compact => metric
                .short_label()
                .map(str::to_string)
                .unwrap_or_else(|| self.base_label(metric)),
            PopStyle::Standard | PopStyle::Verbose => self.base_label(metric),
        };
        let template = POP_TEMPLATES
            .get(&self.pop_style)
            .or_else(|| POP_TEMPLATES.get(&PopStyle::Compact))
            .map(|t| t.for_output(output))
            .unwrap_or("{label}");

        let rendered = template
            .replace("{label}", &label)
            .replace("{comparison}", comparison)
            .replace("{comp_abbrev}", abbreviation);
        self.fit(rendered)
    }

    /// Truncate to `max_length - 2` characters plus an ellipsis if too long.
    pub fn fit(&self, label: String) -> String {
        if !self.exceeds(&label) {
            return label;
        }
        let mut truncated: String = label
            .chars()
            .take(self.max_length.saturating_sub(2))
            .collect();
        truncated.push(ELLIPSIS);
        truncated
    }
}

// ============================================================================
// Group paths
// ============================================================================

/// View and group labels parsed from a dotted `group` path.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GroupLabels {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_label: Option<String>,
}

/// Parse `view.group` into LookML view/group labels.
///
/// One part sets only the group label. Two or more parts set the view label
/// (space-prefixed for sort order, two spaces for the reserved metrics view)
/// and the group label; further parts are ignored.
pub fn parse_group(group: &str) -> Option<GroupLabels> {
    let parts: Vec<&str> = group
        .split('.')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [] => None,
        [group] => Some(GroupLabels {
            view_label: None,
            group_label: Some(group.to_string()),
        }),
        [view, group, ..] => {
            let padding = if view.eq_ignore_ascii_case(METRICS_VIEW_LABEL) {
                "  "
            } else {
                " "
            };
            Some(GroupLabels {
                view_label: Some(format!("{padding}{view}")),
                group_label: Some(group.to_string()),
            })
        }
    }
}
