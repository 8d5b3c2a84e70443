use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::endpoints::Endpoints;
use crate::models::{
    HistoryEntry, Item, ItemInUse, SlackSettings, SlackSettingsUpdate, SyncResult,
    TransactionRequest, TransactionResponse,
};
use crate::retry::{is_retryable_status, with_retry, RetryConfig};

/// Message shown when the server fails without telling us why
pub const GENERIC_ERROR_MESSAGE: &str = "Erro na requisição";

/// Queries shorter than this never reach the search endpoint
pub const MIN_SEARCH_LEN: usize = 2;

pub const DEFAULT_HISTORY_LIMIT: u32 = 50;
pub const DEFAULT_ITEM_HISTORY_LIMIT: u32 = 20;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ApiError {
    /// Non-2xx reply; `message` is whatever the server put in its error body
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Falha de conexão: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Resposta inválida do servidor: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Network(err) => err.status().map(|s| s.as_u16()),
            ApiError::Parse(_) => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            ApiError::Server { status, .. } => StatusCode::from_u16(*status)
                .map(is_retryable_status)
                .unwrap_or(false),
            ApiError::Network(err) => err.is_timeout() || err.is_connect(),
            ApiError::Parse(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Pull a human readable message out of a JSON error body.
///
/// The backend documents `{"message": ...}` but FastAPI answers with `{"detail": ...}`,
/// where `detail` is either a string or a list of validation errors carrying `msg`.
pub fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return GENERIC_ERROR_MESSAGE.to_string();
    };

    if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
        if !message.is_empty() {
            return message.to_string();
        }
    }

    match value.get("detail") {
        Some(serde_json::Value::String(detail)) if !detail.is_empty() => detail.clone(),
        Some(serde_json::Value::Array(errors)) => errors
            .iter()
            .find_map(|e| e.get("msg").and_then(|m| m.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
        _ => GENERIC_ERROR_MESSAGE.to_string(),
    }
}

/// Client for the stock backend's REST API
#[derive(Debug, Clone)]
pub struct InventoryClient {
    client: reqwest::Client,
    base_url: String,
    endpoints: Endpoints,
    retry_config: RetryConfig,
}

impl InventoryClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_options(base_url, Endpoints::default(), DEFAULT_TIMEOUT, RetryConfig::default())
    }

    pub fn with_options(
        base_url: impl Into<String>,
        endpoints: Endpoints,
        timeout: Duration,
        retry_config: RetryConfig,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("almox/0.1.0"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            endpoints,
            retry_config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Generic request: JSON in, JSON out.
    ///
    /// GETs go through the retry policy; anything that mutates server state
    /// is sent exactly once.
    pub async fn request<T, B>(&self, method: Method, endpoint: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let retry_config = if method == Method::GET {
            self.retry_config.clone()
        } else {
            RetryConfig::disabled()
        };

        self.request_with(&retry_config, method, endpoint, body).await
    }

    async fn request_with<T, B>(
        &self,
        retry_config: &RetryConfig,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url_for(endpoint);

        with_retry(retry_config, ApiError::is_retryable, || async {
            debug!("{} {}", method, url);

            let mut request = self.client.request(method.clone(), &url);
            if let Some(body) = body {
                request = request.body(serde_json::to_vec(body)?);
            }

            let response = request.send().await?;
            let status = response.status();
            let text = response.text().await?;

            if !status.is_success() {
                let message = error_message(&text);
                debug!("{} {} failed with {}: {}", method, url, status, message);
                return Err(ApiError::Server {
                    status: status.as_u16(),
                    message,
                });
            }

            Ok(serde_json::from_str(&text)?)
        })
        .await
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request::<T, ()>(Method::GET, endpoint, None).await
    }

    /// Server-side name search. Queries under two characters short-circuit to
    /// an empty result without touching the network.
    pub async fn search_items(&self, query: &str) -> Result<Vec<Item>> {
        if query.trim().chars().count() < MIN_SEARCH_LEN {
            return Ok(Vec::new());
        }

        self.get(&self.endpoints.search_query(query)).await
    }

    pub async fn get_all_items(&self) -> Result<Vec<Item>> {
        self.get(&self.endpoints.items).await
    }

    pub async fn get_item_by_id(&self, id: i64) -> Result<Item> {
        self.get(&self.endpoints.item(id)).await
    }

    pub async fn create_transaction(&self, request: &TransactionRequest) -> Result<TransactionResponse> {
        self.request(Method::POST, &self.endpoints.transactions, Some(request))
            .await
    }

    pub async fn get_history(&self, limit: u32) -> Result<Vec<HistoryEntry>> {
        self.get(&self.endpoints.history_page(limit)).await
    }

    pub async fn get_item_history(&self, item_id: i64, limit: u32) -> Result<Vec<HistoryEntry>> {
        self.get(&self.endpoints.item_history(item_id, limit)).await
    }

    pub async fn get_items_in_use(&self) -> Result<Vec<ItemInUse>> {
        self.get(&self.endpoints.items_in_use).await
    }

    pub async fn sync_with_sheets(&self) -> Result<SyncResult> {
        self.request::<SyncResult, ()>(Method::POST, &self.endpoints.sync, None)
            .await
    }

    /// Health probe. Any failure means "offline"; nothing is propagated.
    pub async fn check_connection(&self) -> bool {
        let probe = self
            .request_with::<serde_json::Value, ()>(
                &RetryConfig::disabled(),
                Method::GET,
                &self.endpoints.health,
                None,
            )
            .await;

        match probe {
            Ok(_) => true,
            Err(err) => {
                warn!("Health check failed: {}", err);
                false
            }
        }
    }

    pub async fn get_slack_settings(&self) -> Result<SlackSettings> {
        self.get(&self.endpoints.slack_settings).await
    }

    pub async fn save_slack_settings(&self, update: &SlackSettingsUpdate) -> Result<serde_json::Value> {
        self.request(Method::POST, &self.endpoints.slack_settings, Some(update))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on the discard port, so any request that actually goes
    // out fails with a connection error.
    fn unreachable_client() -> InventoryClient {
        InventoryClient::with_options(
            "http://127.0.0.1:9/api/",
            Endpoints::default(),
            Duration::from_millis(500),
            RetryConfig::disabled(),
        )
        .unwrap()
    }

    #[test]
    fn test_error_message_prefers_message_field() {
        assert_eq!(error_message(r#"{"message": "Item não encontrado"}"#), "Item não encontrado");
    }

    #[test]
    fn test_error_message_falls_back_to_detail() {
        assert_eq!(
            error_message(r#"{"detail": "Estoque insuficiente! Disponível: 3 unidades"}"#),
            "Estoque insuficiente! Disponível: 3 unidades"
        );
        assert_eq!(
            error_message(r#"{"detail": [{"loc": ["body"], "msg": "field required"}]}"#),
            "field required"
        );
    }

    #[test]
    fn test_error_message_generic_fallback() {
        assert_eq!(error_message("<html>502</html>"), GENERIC_ERROR_MESSAGE);
        assert_eq!(error_message("{}"), GENERIC_ERROR_MESSAGE);
        assert_eq!(error_message(r#"{"message": ""}"#), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = unreachable_client();
        assert_eq!(client.base_url(), "http://127.0.0.1:9/api");
        assert_eq!(client.url_for("/items"), "http://127.0.0.1:9/api/items");
    }

    #[tokio::test]
    async fn test_short_search_never_hits_network() {
        let client = unreachable_client();

        assert!(client.search_items("").await.unwrap().is_empty());
        assert!(client.search_items("a").await.unwrap().is_empty());
        assert!(client.search_items("  b  ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_long_search_goes_out() {
        let client = unreachable_client();
        assert!(matches!(client.search_items("ab").await, Err(ApiError::Network(_))));
    }

    #[tokio::test]
    async fn test_check_connection_swallows_failures() {
        assert!(!unreachable_client().check_connection().await);
    }

    #[test]
    fn test_server_error_display_is_the_message() {
        let err = ApiError::Server {
            status: 400,
            message: "Quantidade inválida!".into(),
        };
        assert_eq!(err.to_string(), "Quantidade inválida!");
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_retryable());

        let err = ApiError::Server {
            status: 503,
            message: GENERIC_ERROR_MESSAGE.into(),
        };
        assert!(err.is_retryable());
    }
}
