//! Dimensions: the attributes a model can be sliced by.

use std::collections::BTreeMap;

use super::types::{DimensionKind, Granularity};
use crate::labels::Labeled;

/// A categorical or time dimension.
///
/// Either `expr` or a non-empty `variants` map supplies the SQL. A dimension
/// with variants renders one field per variant: the primary variant under
/// the dimension's own name, every other variant as `{name}_{variant}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub name: String,
    pub kind: DimensionKind,
    pub expr: Option<String>,
    pub variants: BTreeMap<String, String>,
    pub primary_variant: Option<String>,
    pub granularity: Option<Granularity>,
    /// Dotted `view.group` path used for view/group labels.
    pub group: Option<String>,
    pub label: Option<String>,
    pub short_label: Option<String>,
    pub description: Option<String>,
    pub hidden: bool,
}

/// One rendered field of a dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionForm {
    pub field_name: String,
    pub sql: String,
    pub variant: Option<String>,
}

impl Dimension {
    pub fn new(name: impl Into<String>, kind: DimensionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            expr: None,
            variants: BTreeMap::new(),
            primary_variant: None,
            granularity: None,
            group: None,
            label: None,
            short_label: None,
            description: None,
            hidden: false,
        }
    }

    pub fn categorical(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self::new(name, DimensionKind::Categorical).with_expr(expr)
    }

    pub fn time(name: impl Into<String>, expr: impl Into<String>, granularity: Granularity) -> Self {
        let mut dim = Self::new(name, DimensionKind::Time).with_expr(expr);
        dim.granularity = Some(granularity);
        dim
    }

    pub fn with_expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = Some(expr.into());
        self
    }

    pub fn with_variant(mut self, name: impl Into<String>, expr: impl Into<String>) -> Self {
        self.variants.insert(name.into(), expr.into());
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

    pub fn is_time(&self) -> bool {
        self.kind == DimensionKind::Time
    }

    /// The variant rendered under the dimension's own name: the declared
    /// primary variant, else the first variant in name order.
    pub fn primary_variant_name(&self) -> Option<&str> {
        self.primary_variant
            .as_deref()
            .or_else(|| self.variants.keys().next().map(String::as_str))
    }

    /// Fields this dimension renders as, primary form first.
    pub fn forms(&self) -> Vec<DimensionForm> {
        let Some(primary) = self.primary_variant_name() else {
            return vec![DimensionForm {
                field_name: self.name.clone(),
                sql: self.expr.clone().unwrap_or_else(|| self.name.clone()),
                variant: None,
            }];
        };

        let mut forms = Vec::with_capacity(self.variants.len());
        if let Some(sql) = self.variants.get(primary) {
            forms.push(DimensionForm {
                field_name: self.name.clone(),
                sql: sql.clone(),
                variant: Some(primary.to_string()),
            });
        }
        for (variant, sql) in &self.variants {
            if variant == primary {
                continue;
            }
            forms.push(DimensionForm {
                field_name: format!("{}_{}", self.name, variant),
                sql: sql.clone(),
                variant: Some(variant.clone()),
            });
        }
        forms
    }

    /// Timeframes of a time dimension; empty for categorical ones.
    pub fn timeframes(&self) -> Vec<&'static str> {
        if self.is_time() {
            Granularity::timeframes(self.granularity)
        } else {
            Vec::new()
        }
    }

    /// The field other SQL should reference for a rendered form of this
    /// dimension: the form itself, or its `_raw` timeframe for time dimensions.
    pub fn reference_field(&self, field_name: &str) -> String {
        if self.is_time() {
            format!("{field_name}_raw")
        } else {
            field_name.to_string()
        }
    }

    /// The finest user-facing timeframe field, e.g. `created_date`.
    pub fn finest_timeframe_field(&self) -> Option<String> {
        self.timeframes()
            .into_iter()
            .find(|tf| *tf != "raw")
            .map(|tf| format!("{}_{}", self.name, tf))
    }
}

impl Labeled for Dimension {
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
