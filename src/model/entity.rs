//! Entities: the join keys of a semantic model.

use super::types::EntityKind;

/// A named join key on a model.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
    /// SQL for the key column; defaults to the entity name.
    pub expr: String,
    /// Every row carries a valid, non-null value for this key.
    ///
    /// Only meaningful on foreign entities: joins through a complete key
    /// expose the joined model's measures as well as its dimensions.
    pub complete: bool,
    pub label: Option<String>,
    pub description: Option<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        let name = name.into();
        Self {
            expr: name.clone(),
            name,
            kind,
            complete: false,
            label: None,
            description: None,
        }
    }

    pub fn primary(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Primary)
    }

    pub fn foreign(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Foreign)
    }

    pub fn unique(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Unique)
    }

    pub fn with_expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = expr.into();
        self
    }

    pub fn complete(mut self) -> Self {
        self.complete = true;
        self
    }

    pub fn is_primary(&self) -> bool {
        self.kind == EntityKind::Primary
    }

    pub fn is_foreign(&self) -> bool {
        self.kind == EntityKind::Foreign
    }
}

impl crate::labels::Labeled for Entity {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn short_label(&self) -> Option<&str> {
        None
    }
}
