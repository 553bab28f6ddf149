//! Physical table behind a semantic model.

/// Where a model's rows live in the warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableRef {
    /// BI connection the view is served from.
    pub connection: Option<String>,
    /// Database / project / catalog.
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub table: String,
}

impl TableRef {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Dotted `catalog.schema.table`, omitting absent parts.
    pub fn sql_table_name(&self) -> String {
        [self.catalog.as_deref(), self.schema.as_deref(), Some(self.table.as_str())]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(".")
    }
}
