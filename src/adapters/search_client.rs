use crate::config::toml_config::{has_unresolved_placeholder, SearchConfig};
use crate::domain::model::ExternalProduct;
use crate::domain::ports::ProductSearch;
use crate::utils::error::{Result, TireSearchError};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SearchPayload<'a> {
    #[serde(rename = "idEmpG")]
    company_id: &'a str,
    busqueda: &'a str,
}

/// 外部公開商品搜尋 API（不需驗證）
#[derive(Debug, Clone)]
pub struct PublicSearchClient {
    client: Client,
    endpoint: String,
    company_id: String,
}

impl PublicSearchClient {
    pub fn new(endpoint: impl Into<String>, company_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            company_id: company_id.into(),
        }
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        validate_url("search.endpoint", &config.endpoint)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            company_id: config.resolved_company_id().unwrap_or_default().to_string(),
        })
    }
}

#[async_trait]
impl ProductSearch for PublicSearchClient {
    async fn search(&self, text: &str) -> Result<Vec<ExternalProduct>> {
        if self.company_id.trim().is_empty() || has_unresolved_placeholder(&self.company_id) {
            return Err(TireSearchError::ConfigError {
                message: "search.company_id is not configured".to_string(),
            });
        }

        tracing::debug!("🔍 External search request to {}: \"{}\"", self.endpoint, text);
        let payload = SearchPayload {
            company_id: &self.company_id,
            busqueda: text,
        };
        let response = self.client.post(&self.endpoint).json(&payload).send().await?;

        let status = response.status();
        tracing::debug!("External search response status: {}", status);

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "No response body".to_string());
            tracing::error!("❌ External search error {}: {}", status, body);
            return Err(TireSearchError::ApiStatusError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let items: Vec<ExternalProduct> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("❌ External search returned invalid JSON: {}", e);
            TireSearchError::SerializationError(e)
        })?;

        let unpriced = items.iter().filter(|item| item.price().is_none()).count();
        if unpriced > 0 {
            tracing::warn!(
                "⚠️ {} of {} external items have no numeric price, treated as 0",
                unpriced,
                items.len()
            );
        }

        tracing::debug!("External search returned {} items", items.len());
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_search_posts_payload_and_parses_items() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/busqueda")
                .json_body(json!({"idEmpG": "42", "busqueda": "185 65 15"}));
            then.status(200).json_body(json!([
                {"clave": "A1", "descripcion": "185/65R15 88H", "existencia": 3, "precioNeto": 1500.2}
            ]));
        });

        let client = PublicSearchClient::new(server.url("/busqueda"), "42");
        let items = client.search("185 65 15").await.unwrap();

        mock.assert();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id(), "A1");
        assert_eq!(items[0].price(), Some(1500));
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/busqueda");
            then.status(500).body("boom");
        });

        let client = PublicSearchClient::new(server.url("/busqueda"), "42");
        let err = client.search("185 65 15").await.unwrap_err();
        assert!(matches!(err, TireSearchError::ApiStatusError { status: 500, ref body } if body == "boom"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_serialization_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/busqueda");
            then.status(200).body("<html>not json</html>");
        });

        let client = PublicSearchClient::new(server.url("/busqueda"), "42");
        let err = client.search("185").await.unwrap_err();
        assert!(matches!(err, TireSearchError::SerializationError(_)));
    }

    #[tokio::test]
    async fn test_missing_company_id_is_config_error() {
        let client = PublicSearchClient::new("http://localhost:1/busqueda", "");
        let err = client.search("185").await.unwrap_err();
        assert!(matches!(err, TireSearchError::ConfigError { .. }));
    }

    #[tokio::test]
    async fn test_unresolved_company_id_is_never_sent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/busqueda");
            then.status(200).json_body(json!([]));
        });

        let config = SearchConfig {
            endpoint: server.url("/busqueda"),
            company_id: "${SEARCH_COMPANY_ID}".to_string(),
            ..SearchConfig::default()
        };
        let client = PublicSearchClient::from_config(&config).unwrap();
        let err = client.search("185 65 15").await.unwrap_err();
        assert!(matches!(err, TireSearchError::ConfigError { .. }));

        let direct = PublicSearchClient::new(server.url("/busqueda"), "${SEARCH_COMPANY_ID}");
        assert!(direct.search("185 65 15").await.is_err());
        mock.assert_hits(0);
    }

    #[test]
    fn test_from_config_rejects_bad_endpoint() {
        let config = SearchConfig {
            endpoint: "not a url".to_string(),
            ..SearchConfig::default()
        };
        assert!(PublicSearchClient::from_config(&config).is_err());
    }
}
