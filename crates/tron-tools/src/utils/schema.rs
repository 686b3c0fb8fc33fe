//! Builder for tool JSON Schema definitions.
//!
//! Replaces the repetitive `Map::new()` + `insert()` boilerplate in every
//! tool's `definition()` method with a concise builder API.

use serde_json::Value;
use tron_core::tools::{Tool, ToolParameterSchema};

/// Fluent builder for [`Tool`] schemas.
///
/// ```ignore
/// ToolSchemaBuilder::new("Read", "Read file contents")
///     .required_property("file_path", json!({"type": "string", "description": "Path"}))
///     .property("offset", json!({"type": "number", "description": "Start line"}))
///     .build()
/// ```
pub struct ToolSchemaBuilder {
    name: String,
    description: String,
    properties: serde_json::Map<String, Value>,
    required: Vec<String>,
}

impl ToolSchemaBuilder {
    /// Create a new builder with the given tool name and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            properties: serde_json::Map::new(),
            required: Vec::new(),
        }
    }

    /// Add an optional property.
    pub fn property(mut self, name: &str, schema: Value) -> Self {
        let _ = self.properties.insert(name.into(), schema);
        self
    }

    /// Add a required property.
    pub fn required_property(mut self, name: &str, schema: Value) -> Self {
        let _ = self.properties.insert(name.into(), schema);
        self.required.push(name.into());
        self
    }

    /// Build the final [`Tool`] definition.
    pub fn build(self) -> Tool {
        Tool {
            name: self.name,
            description: self.description,
            parameters: ToolParameterSchema {
                schema_type: "object".into(),
                properties: if self.properties.is_empty() {
                    None
                } else {
                    Some(self.properties)
                },
                required: if self.required.is_empty() {
                    None
                } else {
                    Some(self.required)
                },
                description: None,
                extra: serde_json::Map::new(),
            },
        }
    }
}
