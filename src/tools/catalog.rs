//! Tool catalog — typed metadata, parameter validation, schema rendering.
//!
//! Owns tool *metadata* (not implementations — connectors do the work).
//! Arguments are validated against typed parameter definitions before any
//! authorization check, and the same definitions render the JSON input
//! schema served by the tool listing endpoint.

use crate::types::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// =============================================================================
// Parameter types
// =============================================================================

/// Parameter type for tool inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Int {
        min: Option<i64>,
        max: Option<i64>,
    },
    Bool,
    StringList {
        /// Allowed item values, when the list is drawn from a fixed set.
        item_enum: Option<Vec<String>>,
    },
    Optional(Box<ParamType>),
}

impl ParamType {
    /// Validate a JSON value against this parameter type.
    pub fn validate(&self, value: &Value) -> std::result::Result<(), String> {
        match self {
            ParamType::String => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err(format!("expected string, got {}", value_type_name(value)))
                }
            }
            ParamType::Int { min, max } => {
                let Some(n) = value.as_i64() else {
                    return Err(format!("expected integer, got {}", value_type_name(value)));
                };
                if let Some(min) = min {
                    if n < *min {
                        return Err(format!("value {} below minimum {}", n, min));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(format!("value {} above maximum {}", n, max));
                    }
                }
                Ok(())
            }
            ParamType::Bool => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err(format!("expected boolean, got {}", value_type_name(value)))
                }
            }
            ParamType::StringList { item_enum } => {
                let Some(arr) = value.as_array() else {
                    return Err(format!("expected array, got {}", value_type_name(value)));
                };
                for (i, item) in arr.iter().enumerate() {
                    let Some(s) = item.as_str() else {
                        return Err(format!(
                            "expected string at index {}, got {}",
                            i,
                            value_type_name(item)
                        ));
                    };
                    if let Some(allowed) = item_enum {
                        if !allowed.iter().any(|a| a == s) {
                            return Err(format!(
                                "invalid value '{}', expected one of: {}",
                                s,
                                allowed.join(", ")
                            ));
                        }
                    }
                }
                Ok(())
            }
            ParamType::Optional(inner) => {
                if value.is_null() {
                    Ok(())
                } else {
                    inner.validate(value)
                }
            }
        }
    }

    /// Render this type as a JSON Schema fragment.
    pub fn schema_value(&self) -> Value {
        match self {
            ParamType::String => serde_json::json!({"type": "string"}),
            ParamType::Int { min, max } => {
                let mut schema = serde_json::json!({"type": "integer"});
                if let Some(min) = min {
                    schema["minimum"] = serde_json::json!(min);
                }
                if let Some(max) = max {
                    schema["maximum"] = serde_json::json!(max);
                }
                schema
            }
            ParamType::Bool => serde_json::json!({"type": "boolean"}),
            ParamType::StringList { item_enum } => {
                let mut items = serde_json::json!({"type": "string"});
                if let Some(allowed) = item_enum {
                    items["enum"] = serde_json::json!(allowed);
                }
                serde_json::json!({"type": "array", "items": items})
            }
            ParamType::Optional(inner) => inner.schema_value(),
        }
    }
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Parameter definition
// =============================================================================

/// A single parameter definition for a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParamDef {
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !matches!(self.param_type, ParamType::Optional(_))
    }
}

// =============================================================================
// Tool entry
// =============================================================================

/// Complete tool metadata entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolEntry {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamDef>,
    /// Scope category a caller must hold some grant in for the tool to be
    /// listed (e.g. `workplace`). Authorization itself is per-resource and
    /// happens in the dispatcher.
    pub scope_category: String,
    /// Scope action paired with `scope_category` for listing visibility.
    pub scope_action: String,
}

impl ToolEntry {
    /// Render the JSON input schema for this tool, as served by the tool
    /// listing endpoint.
    pub fn input_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();
        for param in &self.parameters {
            let mut schema = param.param_type.schema_value();
            schema["description"] = serde_json::json!(param.description);
            if let Some(default) = &param.default {
                schema["default"] = default.clone();
            }
            properties.insert(param.name.clone(), schema);
            if param.is_required() {
                required.push(param.name.clone());
            }
        }
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

// =============================================================================
// Tool catalog
// =============================================================================

/// In-memory tool catalog. Owns metadata, not implementations.
#[derive(Debug, Default)]
pub struct ToolCatalog {
    entries: HashMap<String, ToolEntry>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a tool entry.
    pub fn register(&mut self, entry: ToolEntry) -> crate::types::Result<()> {
        if entry.name.is_empty() {
            return Err(Error::validation("Tool name cannot be empty"));
        }
        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    /// Get a tool entry by name.
    pub fn get(&self, tool_name: &str) -> Option<&ToolEntry> {
        self.entries.get(tool_name)
    }

    /// Check if a tool exists.
    pub fn has_tool(&self, tool_name: &str) -> bool {
        self.entries.contains_key(tool_name)
    }

    /// List all tool entries, sorted by name.
    pub fn list_entries(&self) -> Vec<&ToolEntry> {
        let mut entries: Vec<&ToolEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// Validate arguments against a tool's parameter definitions.
    ///
    /// Returns a list of validation errors (empty = valid).
    pub fn validate_params(
        &self,
        tool_name: &str,
        params: &Value,
    ) -> crate::types::Result<Vec<String>> {
        let entry = self
            .entries
            .get(tool_name)
            .ok_or_else(|| Error::not_found(format!("Unknown tool: {}", tool_name)))?;

        let param_map = params
            .as_object()
            .ok_or_else(|| Error::validation("Arguments must be a JSON object"))?;

        let mut errors = Vec::new();

        // Check required parameters are present
        for param_def in &entry.parameters {
            if param_def.is_required() && !param_map.contains_key(&param_def.name) {
                errors.push(format!("Missing required parameter: {}", param_def.name));
            }
        }

        // Build param name lookup for checking unknown params
        let known_names: HashMap<&str, &ParamDef> = entry
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p))
            .collect();

        // Validate types of provided parameters
        for (key, value) in param_map {
            if let Some(param_def) = known_names.get(key.as_str()) {
                if let Err(e) = param_def.param_type.validate(value) {
                    errors.push(format!("Parameter '{}': {}", key, e));
                }
            } else {
                errors.push(format!("Unknown parameter: {}", key));
            }
        }

        Ok(errors)
    }

    /// Fill in default values for missing optional parameters.
    pub fn fill_defaults(&self, tool_name: &str, params: &mut Value) -> crate::types::Result<()> {
        let entry = self
            .entries
            .get(tool_name)
            .ok_or_else(|| Error::not_found(format!("Unknown tool: {}", tool_name)))?;

        if let Some(map) = params.as_object_mut() {
            for param_def in &entry.parameters {
                if !map.contains_key(&param_def.name) {
                    if let Some(default) = &param_def.default {
                        map.insert(param_def.name.clone(), default.clone());
                    }
                }
            }
        }

        Ok(())
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_entry() -> ToolEntry {
        ToolEntry {
            name: "workplace_search".to_string(),
            description: "Search across workplace document sources".to_string(),
            parameters: vec![
                ParamDef {
                    name: "query".to_string(),
                    param_type: ParamType::String,
                    description: "Search query".to_string(),
                    default: None,
                },
                ParamDef {
                    name: "sources".to_string(),
                    param_type: ParamType::StringList {
                        item_enum: Some(vec![
                            "google_drive".to_string(),
                            "notion".to_string(),
                        ]),
                    },
                    description: "Sources to search".to_string(),
                    default: Some(serde_json::json!(["google_drive", "notion"])),
                },
                ParamDef {
                    name: "max_results".to_string(),
                    param_type: ParamType::Int {
                        min: Some(1),
                        max: Some(50),
                    },
                    description: "Maximum number of results".to_string(),
                    default: Some(serde_json::json!(10)),
                },
                ParamDef {
                    name: "include_content".to_string(),
                    param_type: ParamType::Bool,
                    description: "Include document content in results".to_string(),
                    default: Some(serde_json::json!(true)),
                },
            ],
            scope_category: "workplace".to_string(),
            scope_action: "read".to_string(),
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_entry()).unwrap();

        assert!(catalog.has_tool("workplace_search"));
        assert!(!catalog.has_tool("nonexistent"));
        assert_eq!(catalog.len(), 1);

        let entry = catalog.get("workplace_search").unwrap();
        assert_eq!(entry.scope_category, "workplace");
    }

    #[test]
    fn test_register_empty_name_fails() {
        let mut catalog = ToolCatalog::new();
        let mut entry = sample_entry();
        entry.name = String::new();
        assert!(catalog.register(entry).is_err());
    }

    #[test]
    fn test_validate_params_valid() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_entry()).unwrap();

        let params = serde_json::json!({"query": "quarterly planning"});
        let errors = catalog.validate_params("workplace_search", &params).unwrap();
        assert!(errors.is_empty(), "Expected no errors, got: {:?}", errors);
    }

    #[test]
    fn test_validate_params_missing_required() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_entry()).unwrap();

        let params = serde_json::json!({});
        let errors = catalog.validate_params("workplace_search", &params).unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Missing required parameter: query"));
    }

    #[test]
    fn test_validate_params_wrong_type() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_entry()).unwrap();

        let params = serde_json::json!({"query": 42});
        let errors = catalog.validate_params("workplace_search", &params).unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("expected string"));
    }

    #[test]
    fn test_validate_params_int_bounds() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_entry()).unwrap();

        let params = serde_json::json!({"query": "q", "max_results": 0});
        let errors = catalog.validate_params("workplace_search", &params).unwrap();
        assert!(errors[0].contains("below minimum"));

        let params = serde_json::json!({"query": "q", "max_results": 51});
        let errors = catalog.validate_params("workplace_search", &params).unwrap();
        assert!(errors[0].contains("above maximum"));
    }

    #[test]
    fn test_validate_params_item_enum() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_entry()).unwrap();

        let params = serde_json::json!({"query": "q", "sources": ["dropbox"]});
        let errors = catalog.validate_params("workplace_search", &params).unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("invalid value 'dropbox'"));
    }

    #[test]
    fn test_validate_params_unknown_param() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_entry()).unwrap();

        let params = serde_json::json!({"query": "q", "bogus": true});
        let errors = catalog.validate_params("workplace_search", &params).unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Unknown parameter: bogus"));
    }

    #[test]
    fn test_validate_params_unknown_tool() {
        let catalog = ToolCatalog::new();
        let params = serde_json::json!({});
        assert!(catalog.validate_params("nonexistent", &params).is_err());
    }

    #[test]
    fn test_fill_defaults() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_entry()).unwrap();

        let mut params = serde_json::json!({"query": "roadmap"});
        catalog.fill_defaults("workplace_search", &mut params).unwrap();

        assert_eq!(params["max_results"], 10);
        assert_eq!(params["include_content"], true);
        assert_eq!(params["sources"], serde_json::json!(["google_drive", "notion"]));
    }

    #[test]
    fn test_fill_defaults_no_overwrite() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_entry()).unwrap();

        let mut params = serde_json::json!({"query": "roadmap", "max_results": 5});
        catalog.fill_defaults("workplace_search", &mut params).unwrap();

        assert_eq!(params["max_results"], 5);
    }

    #[test]
    fn test_input_schema_rendering() {
        let schema = sample_entry().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], serde_json::json!(["query"]));
        assert_eq!(schema["properties"]["query"]["type"], "string");
        assert_eq!(schema["properties"]["max_results"]["minimum"], 1);
        assert_eq!(schema["properties"]["max_results"]["maximum"], 50);
        assert_eq!(
            schema["properties"]["sources"]["items"]["enum"],
            serde_json::json!(["google_drive", "notion"])
        );
        assert_eq!(schema["properties"]["include_content"]["default"], true);
    }
}
