//! Tool infrastructure — catalog, parameter validation, schema rendering.
//!
//! The catalog owns tool metadata; connectors own the search implementations
//! and the dispatcher owns the authorization decision.

pub mod catalog;

pub use catalog::{ParamDef, ParamType, ToolCatalog, ToolEntry};

use crate::auth::scope::{READ_ACTION, WORKPLACE_CATEGORY};
use crate::types::{LimitsConfig, Result};

/// Name of the workplace search tool.
pub const WORKPLACE_SEARCH_TOOL: &str = "workplace_search";

/// Build the default catalog: the workplace search tool, with its sources
/// enum and result bound drawn from the registered connectors and configured
/// limits rather than hard-coded.
pub fn default_catalog(source_names: &[String], limits: &LimitsConfig) -> Result<ToolCatalog> {
    let mut catalog = ToolCatalog::new();
    catalog.register(ToolEntry {
        name: WORKPLACE_SEARCH_TOOL.to_string(),
        description: "Search across workplace documents (Google Drive, Notion, SharePoint) \
                      with permission controls"
            .to_string(),
        parameters: vec![
            ParamDef {
                name: "query".to_string(),
                param_type: ParamType::String,
                description: "Search query to find relevant documents".to_string(),
                default: None,
            },
            ParamDef {
                name: "sources".to_string(),
                param_type: ParamType::StringList {
                    item_enum: Some(source_names.to_vec()),
                },
                description: "Sources to search in".to_string(),
                default: Some(serde_json::json!(source_names)),
            },
            ParamDef {
                name: "max_results".to_string(),
                param_type: ParamType::Int {
                    min: Some(1),
                    max: Some(i64::from(limits.max_results_ceiling)),
                },
                description: "Maximum number of results to return".to_string(),
                default: Some(serde_json::json!(10)),
            },
            ParamDef {
                name: "include_content".to_string(),
                param_type: ParamType::Bool,
                description: "Whether to include document content in results".to_string(),
                default: Some(serde_json::json!(true)),
            },
        ],
        scope_category: WORKPLACE_CATEGORY.to_string(),
        scope_action: READ_ACTION.to_string(),
    })?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_registers_workplace_search() {
        let sources = vec!["google_drive".to_string(), "notion".to_string()];
        let catalog = default_catalog(&sources, &LimitsConfig::default()).unwrap();
        assert!(catalog.has_tool(WORKPLACE_SEARCH_TOOL));

        let schema = catalog.get(WORKPLACE_SEARCH_TOOL).unwrap().input_schema();
        assert_eq!(
            schema["properties"]["sources"]["items"]["enum"],
            serde_json::json!(["google_drive", "notion"])
        );
        assert_eq!(schema["properties"]["max_results"]["maximum"], 50);
    }
}
