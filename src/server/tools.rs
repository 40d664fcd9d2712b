//! Tool definitions and their JSON schemas.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Tool definition advertised by `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: ToolSchema,
}

/// JSON Schema for tool input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl ToolSchema {
    /// An object schema that already requires `project_dir`.
    pub fn project() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: Map::new(),
            required: Vec::new(),
        }
        .with_property(
            "project_dir",
            json!({
                "type": "string",
                "description": "Absolute path to the project root containing the LCOV report"
            }),
        )
        .with_required("project_dir")
    }

    pub fn with_property(mut self, name: &str, schema: Value) -> Self {
        self.properties.insert(name.to_string(), schema);
        self
    }

    pub fn with_required(mut self, field: &str) -> Self {
        self.required.push(field.to_string());
        self
    }
}

fn tool(name: &str, description: &str, input_schema: ToolSchema) -> Tool {
    Tool {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

pub fn available_tools() -> Vec<Tool> {
    vec![
        tool(
            "rank_files",
            "Rank source files by testing priority (coverage gaps weighted by file size). Highest priority first.",
            ToolSchema::project()
                .with_property("weights", json!({
                    "type": "string",
                    "description": "branches,functions,lines multipliers, e.g. \"0.5,0.3,0.2\""
                }))
                .with_property("min_lines", json!({
                    "type": "integer",
                    "description": "Skip files with fewer instrumented lines"
                }))
                .with_property("top", json!({
                    "type": "integer",
                    "description": "Maximum files to return (0 returns all)"
                })),
        ),
        tool(
            "project_summary",
            "Overall line, function and branch coverage for a project, plus the report location.",
            ToolSchema::project(),
        ),
        tool(
            "file_details",
            "Coverage, priority score and rank for a single file. Accepts the report path or a trailing part of it.",
            ToolSchema::project()
                .with_property("file", json!({
                    "type": "string",
                    "description": "File path as it appears in the report, or a unique suffix such as src/lib.rs"
                }))
                .with_required("file"),
        ),
        tool(
            "estimate_impact",
            "Estimate overall coverage if the given files were fully covered.",
            ToolSchema::project()
                .with_property("files", json!({
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "File paths (or unique suffixes) to treat as fully covered"
                }))
                .with_required("files"),
        ),
    ]
}
