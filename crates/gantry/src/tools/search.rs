use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capability::Capability;
use crate::errors::{ToolError, ToolResult};
use crate::models::schema::{PropertySchema, ToolSchema};

const DEFAULT_MAX_RESULTS: u64 = 5;
const MAX_RESULTS_LIMIT: u64 = 10;
const DEFAULT_SEARCH_TYPE: &str = "web";

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    max_results: Option<f64>,
    #[serde(default)]
    search_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchHit {
    title: String,
    url: String,
    snippet: String,
    #[serde(rename = "type")]
    kind: String,
    position: u64,
}

#[derive(Debug, Serialize)]
struct SearchOutput {
    query: String,
    search_type: String,
    results_count: usize,
    results: Vec<SearchHit>,
}

/// Simulated web search returning placeholder hits
pub struct SearchTool {
    parameters: ToolSchema,
}

impl Default for SearchTool {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchTool {
    pub fn new() -> Self {
        Self {
            parameters: ToolSchema::object()
                .property("query", PropertySchema::string("The search query"))
                .property(
                    "max_results",
                    PropertySchema::number("Maximum number of results to return (1-10)"),
                )
                .property(
                    "search_type",
                    PropertySchema::string("Type of search to perform"),
                )
                .required(["query"]),
        }
    }

    fn search(query: &str, max_results: u64, search_type: &str) -> SearchOutput {
        let results: Vec<SearchHit> = (1..=max_results)
            .map(|position| SearchHit {
                title: format!("Result {} for \"{}\"", position, query),
                url: format!(
                    "https://pepeso.com/{}/{}/result-{}",
                    search_type,
                    urlencoding::encode(query),
                    position
                ),
                snippet: format!(
                    "This is a sample {} search result for \"{}\". The search returned relevant information about the topic.",
                    search_type, query
                ),
                kind: search_type.to_string(),
                position,
            })
            .collect();

        SearchOutput {
            query: query.to_string(),
            search_type: search_type.to_string(),
            results_count: results.len(),
            results,
        }
    }
}

#[async_trait]
impl Capability for SearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Perform a web search to find information on any topic"
    }

    fn parameters(&self) -> &ToolSchema {
        &self.parameters
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        self.parameters.validate_arguments(&arguments)?;
        let args: SearchArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        if args.query.trim().is_empty() {
            return Err(ToolError::InvalidParameters(
                "query must not be empty".to_string(),
            ));
        }

        let max_results = args
            .max_results
            .map(|n| n.floor().clamp(1.0, MAX_RESULTS_LIMIT as f64) as u64)
            .unwrap_or(DEFAULT_MAX_RESULTS);
        let search_type = args
            .search_type
            .as_deref()
            .unwrap_or(DEFAULT_SEARCH_TYPE);

        let output = Self::search(&args.query, max_results, search_type);
        serde_json::to_value(output).map_err(|e| ToolError::ExecutionError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_defaults() -> anyhow::Result<()> {
        let tool = SearchTool::new();
        let output = tool.call(json!({"query": "rust agents"})).await?;

        assert_eq!(output["query"], "rust agents");
        assert_eq!(output["search_type"], "web");
        assert_eq!(output["results_count"], 5);
        assert_eq!(output["results"][0]["position"], 1);
        assert_eq!(output["results"][0]["type"], "web");
        assert_eq!(
            output["results"][4]["url"],
            "https://pepeso.com/web/rust%20agents/result-5"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_max_results_is_clamped() -> anyhow::Result<()> {
        let tool = SearchTool::new();
        let output = tool
            .call(json!({"query": "q", "max_results": 50, "search_type": "news"}))
            .await?;
        assert_eq!(output["results_count"], 10);
        assert_eq!(output["results"][9]["type"], "news");

        let output = tool.call(json!({"query": "q", "max_results": 0})).await?;
        assert_eq!(output["results_count"], 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_requires_query() {
        let tool = SearchTool::new();
        assert!(matches!(
            tool.call(json!({"max_results": 2})).await,
            Err(ToolError::InvalidParameters(_))
        ));
        assert!(matches!(
            tool.call(json!({"query": "  "})).await,
            Err(ToolError::InvalidParameters(_))
        ));
    }
}
