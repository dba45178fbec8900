//! Dataset descriptor — the in-memory tabular value agents plan and act on.

use serde::{Deserialize, Serialize};

/// Semantic type of a column, used to steer agent prompts and the
/// visualization-input heuristic in the agent registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Numeric,
    Categorical,
    Temporal,
    Other,
}

/// A single column's name and inferred semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub semantic_type: SemanticType,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self { name: name.into(), semantic_type }
    }
}

/// Descriptor for a dataset bound to a session.
///
/// Immutable per session update: `SessionManager::update_dataset` replaces
/// this wholesale rather than mutating it in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    /// Dataset display name (e.g. the uploaded file name).
    pub name: String,
    pub schema: Vec<ColumnSchema>,
    /// Free-text context used to prime agents (sample rows, dtypes, etc).
    pub dataset_context: String,
}

impl DatasetDescriptor {
    pub fn new(
        name: impl Into<String>,
        schema: Vec<ColumnSchema>,
        dataset_context: impl Into<String>,
    ) -> Self {
        Self { name: name.into(), schema, dataset_context: dataset_context.into() }
    }

    /// A compact textual summary suitable for direct inclusion in an agent
    /// prompt as the `dataset` input field.
    pub fn as_prompt_text(&self) -> String {
        let columns = self
            .schema
            .iter()
            .map(|c| format!("{} ({:?})", c.name, c.semantic_type))
            .collect::<Vec<_>>()
            .join(", ");
        format!("Dataset '{}' — columns: {}\n{}", self.name, columns, self.dataset_context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_text_includes_columns_and_context() {
        let descriptor = DatasetDescriptor::new(
            "housing.csv",
            vec![
                ColumnSchema::new("price", SemanticType::Numeric),
                ColumnSchema::new("sqft", SemanticType::Numeric),
            ],
            "2 rows sampled",
        );
        let text = descriptor.as_prompt_text();
        assert!(text.contains("price"));
        assert!(text.contains("housing.csv"));
        assert!(text.contains("2 rows sampled"));
    }
}
