//! HTTP client for the mapping backend.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use ecs_map::{MappingService, ServiceError};
use ecs_model::{
    BatchInputItem, ListQuery, MapBatchResponse, MapBatchResultItem, MappingId, MappingPage,
    MappingPatch,
};

use crate::config::ConfigError;

/// User agent string for backend requests.
const USER_AGENT_VALUE: &str = concat!("ecs-mapper/", env!("CARGO_PKG_VERSION"));

/// Path of the batch classification endpoint.
pub const MAP_BATCH_PATH: &str = "map-batch";

/// Path of the persisted mappings collection.
pub const MAPPINGS_PATH: &str = "mappings";

/// [`MappingService`] over HTTP.
#[derive(Debug, Clone)]
pub struct MappingClient {
    client: reqwest::Client,
    base_url: Url,
}

impl MappingClient {
    /// Creates a client for the backend at `base_url`.
    ///
    /// The URL may carry a path prefix; endpoint paths are appended to it.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("expected an http(s) origin".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL of the endpoint made of `segments`.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&impl Serialize>,
    ) -> Result<Response, ServiceError> {
        tracing::debug!("{} {}", method, url);
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(network)?;
        check_status(response).await
    }
}

impl MappingService for MappingClient {
    async fn map_batch(
        &self,
        items: &[BatchInputItem],
        model: &str,
        limit: u32,
    ) -> Result<Vec<MapBatchResultItem>, ServiceError> {
        let mut url = self.endpoint(&[MAP_BATCH_PATH]);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("model", model);

        let response = self.send(Method::POST, url, Some(&items)).await?;
        let body: Value = decode(response).await?;
        let decoded =
            MapBatchResponse::from_value(body).map_err(|e| ServiceError::Decode(e.to_string()))?;
        tracing::info!("Mapped {} fields", decoded.results.len());
        Ok(decoded.results)
    }

    async fn list_mappings(&self, query: &ListQuery) -> Result<MappingPage, ServiceError> {
        let mut url = self.endpoint(&[MAPPINGS_PATH]);
        url.query_pairs_mut()
            .append_pair("search", &query.search)
            .append_pair("page", &query.page.to_string())
            .append_pair("pageSize", &query.page_size.to_string());

        let response = match self.send(Method::GET, url, None::<&()>).await {
            Err(ServiceError::Status { status: 404, .. }) => {
                return Err(ServiceError::NotImplemented {
                    endpoint: format!("/{MAPPINGS_PATH}"),
                });
            }
            other => other?,
        };
        decode(response).await
    }

    async fn update_mapping(
        &self,
        id: &MappingId,
        patch: &MappingPatch,
    ) -> Result<(), ServiceError> {
        let id = id.to_string();
        let url = self.endpoint(&[MAPPINGS_PATH, &id]);
        self.send(Method::PATCH, url, Some(patch)).await?;
        Ok(())
    }
}

fn network(err: reqwest::Error) -> ServiceError {
    ServiceError::Network(err.to_string())
}

/// Turns a non-success response into [`ServiceError::Status`].
async fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

fn status_error(status: StatusCode, body: &str) -> ServiceError {
    ServiceError::Status {
        status: status.as_u16(),
        detail: error_detail(body),
    }
}

/// Human-readable error text from a JSON error body.
///
/// Prefers `detail` (stringified when it is not a string), then `message`.
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail") {
        Some(Value::String(detail)) => return Some(detail.clone()),
        Some(Value::Null) | None => {}
        Some(other) => return Some(other.to_string()),
    }
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let bytes = response.bytes().await.map_err(network)?;
    serde_json::from_slice(&bytes).map_err(|e| ServiceError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_path_prefix() {
        let client = MappingClient::new("http://localhost:8000/api/").unwrap();
        assert_eq!(
            client.endpoint(&[MAPPINGS_PATH, "42"]).as_str(),
            "http://localhost:8000/api/mappings/42"
        );

        let client = MappingClient::new("http://localhost:8000").unwrap();
        assert_eq!(
            client.endpoint(&[MAP_BATCH_PATH]).as_str(),
            "http://localhost:8000/map-batch"
        );
    }

    #[test]
    fn text_ids_are_escaped() {
        let client = MappingClient::new("http://localhost:8000").unwrap();
        assert_eq!(
            client.endpoint(&[MAPPINGS_PATH, "a/b c"]).as_str(),
            "http://localhost:8000/mappings/a%2Fb%20c"
        );
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(matches!(
            MappingClient::new("mailto:ops@example.com"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            MappingClient::new("not a url"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn detail_extraction() {
        assert_eq!(
            error_detail(r#"{"detail": "model not found"}"#).as_deref(),
            Some("model not found")
        );
        assert_eq!(
            error_detail(r#"{"detail": [{"msg": "field required"}]}"#).as_deref(),
            Some(r#"[{"msg":"field required"}]"#)
        );
        assert_eq!(
            error_detail(r#"{"message": "bad gateway"}"#).as_deref(),
            Some("bad gateway")
        );
        assert_eq!(error_detail("<html>oops</html>"), None);
        assert_eq!(error_detail(r#"{"detail": null}"#), None);
    }
}
