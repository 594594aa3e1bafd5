use async_trait::async_trait;
use maestro_core::{MaestroError, MaestroResult};
use serde_json::{json, Value};

/// An external capability (web search, CLI execution, file I/O) an agent may
/// call from `execute`. The engine treats it as `(params) -> result | error`.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    async fn invoke(&self, params: Value) -> MaestroResult<Value>;
}

/// Offline search backend returning deterministic hits.
///
/// Returns at most five hits regardless of the requested `max_results`,
/// alternating academic and news sources with decreasing relevance.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedSearch;

const SIMULATED_HIT_CAP: u64 = 5;

#[async_trait]
impl Tool for SimulatedSearch {
    fn name(&self) -> &str {
        "web_search"
    }

    async fn invoke(&self, params: Value) -> MaestroResult<Value> {
        let query = params
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| MaestroError::Execution("web_search requires a query".to_string()))?;
        let max_results = params
            .get("max_results")
            .and_then(Value::as_u64)
            .unwrap_or(10);

        let hits: Vec<Value> = (0..max_results.min(SIMULATED_HIT_CAP))
            .map(|i| {
                json!({
                    "title": format!("Result {} for: {query}", i + 1),
                    "url": format!("https://example.com/result{}", i + 1),
                    "snippet": format!("This is a relevant result about {query}"),
                    "relevance_score": 0.9 - (i as f64 * 0.05),
                    "source": if i % 2 == 0 { "academic" } else { "news" },
                })
            })
            .collect();

        Ok(Value::Array(hits))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_search_caps_hits() {
        let hits = SimulatedSearch
            .invoke(json!({"query": "rust", "max_results": 10}))
            .await
            .unwrap();
        let hits = hits.as_array().unwrap();
        assert_eq!(hits.len(), 5);
        assert_eq!(hits[0]["source"], "academic");
        assert_eq!(hits[1]["source"], "news");
        assert!(hits[0]["title"].as_str().unwrap().contains("rust"));
    }

    #[tokio::test]
    async fn test_simulated_search_respects_small_limit() {
        let hits = SimulatedSearch
            .invoke(json!({"query": "rust", "max_results": 2}))
            .await
            .unwrap();
        assert_eq!(hits.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_simulated_search_requires_query() {
        let err = SimulatedSearch.invoke(json!({})).await.unwrap_err();
        assert!(matches!(err, MaestroError::Execution(_)));
    }
}
