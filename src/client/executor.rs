//! Authenticated request executor.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::decode::decode_body;
use super::types::{EntityState, ServiceDomain, ServiceInvocation};
use super::HubApi;
use crate::config::PolicyConfig;
use crate::error::{BridgeError, Result};

/// Client bound to one hub. Cheap to share behind an `Arc`.
#[derive(Clone)]
pub struct HubClient {
    base_url: String,
    token: String,
    timeout_ms: u64,
    http: reqwest::Client,
}

impl fmt::Debug for HubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl HubClient {
    pub fn new(config: &PolicyConfig) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            timeout_ms: config.timeout_ms,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Perform one authenticated request against `{base_url}{path}`.
    ///
    /// GET requests never carry a body; every other method sends `body` or
    /// `{}`. Sending and reading the response share a single deadline.
    pub async fn execute(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(CONTENT_TYPE, "application/json");

        if method != Method::GET {
            let payload = body.cloned().unwrap_or_else(|| Value::Object(Map::new()));
            request = request.body(payload.to_string());
        }

        log::debug!("HA request: {} {}", method, path);

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, text))
        };

        let (status, text) =
            match tokio::time::timeout(Duration::from_millis(self.timeout_ms), exchange).await {
                Ok(result) => result?,
                Err(_) => {
                    log::warn!(
                        "HA request timed out after {}ms: {} {}",
                        self.timeout_ms,
                        method,
                        path
                    );
                    return Err(BridgeError::Timeout {
                        method: method.to_string(),
                        path: path.to_string(),
                        timeout_ms: self.timeout_ms,
                    });
                }
            };

        if !status.is_success() {
            log::debug!("HA responded {} for {} {}", status.as_u16(), method, path);
            return Err(BridgeError::Transport {
                status_code: status.as_u16(),
                body: text,
            });
        }

        Ok(decode_body(&text).into_value())
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.execute(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.execute(Method::POST, path, Some(body)).await
    }
}

fn typed<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| BridgeError::Decode(e.to_string()))
}

// ---------------------------------------------------------------------------
// Path construction
// ---------------------------------------------------------------------------

fn seg(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// Append `?k=v&...` for the pairs that have a value.
fn with_query(path: String, pairs: &[(&str, Option<&str>)]) -> String {
    let query: Vec<String> = pairs
        .iter()
        .filter_map(|(key, value)| value.map(|v| format!("{}={}", seg(key), seg(v))))
        .collect();
    if query.is_empty() {
        path
    } else {
        format!("{}?{}", path, query.join("&"))
    }
}

pub(crate) fn state_path(entity_id: &str) -> String {
    format!("/api/states/{}", seg(entity_id))
}

pub(crate) fn service_path(domain: &str, service: &str) -> String {
    format!("/api/services/{}/{}", seg(domain), seg(service))
}

pub(crate) fn history_path(start: &str, entity_id: Option<&str>, end: Option<&str>) -> String {
    with_query(
        format!("/api/history/period/{}", seg(start)),
        &[("filter_entity_id", entity_id), ("end_time", end)],
    )
}

pub(crate) fn logbook_path(start: &str, entity_id: Option<&str>, end: Option<&str>) -> String {
    with_query(
        format!("/api/logbook/{}", seg(start)),
        &[("entity", entity_id), ("end_time", end)],
    )
}

pub(crate) fn event_path(event_type: &str) -> String {
    format!("/api/events/{}", seg(event_type))
}

#[async_trait]
impl HubApi for HubClient {
    async fn check_connection(&self) -> Result<bool> {
        self.get("/api/").await?;
        Ok(true)
    }

    async fn get_config(&self) -> Result<Value> {
        self.get("/api/config").await
    }

    async fn get_states(&self) -> Result<Vec<EntityState>> {
        typed(self.get("/api/states").await?)
    }

    async fn get_state(&self, entity_id: &str) -> Result<Value> {
        self.get(&state_path(entity_id)).await
    }

    async fn get_services(&self) -> Result<Vec<ServiceDomain>> {
        typed(self.get("/api/services").await?)
    }

    async fn call_service(&self, invocation: ServiceInvocation) -> Result<Value> {
        let path = service_path(&invocation.domain, &invocation.service);
        self.post(&path, &Value::Object(invocation.payload)).await
    }

    async fn get_history(
        &self,
        start: &str,
        entity_id: Option<&str>,
        end: Option<&str>,
    ) -> Result<Value> {
        self.get(&history_path(start, entity_id, end)).await
    }

    async fn get_logbook(
        &self,
        start: &str,
        entity_id: Option<&str>,
        end: Option<&str>,
    ) -> Result<Value> {
        self.get(&logbook_path(start, entity_id, end)).await
    }

    async fn render_template(
        &self,
        template: &str,
        variables: Map<String, Value>,
    ) -> Result<Value> {
        let mut body = Map::new();
        body.insert("template".to_string(), Value::String(template.to_string()));
        body.extend(variables);
        self.post("/api/template", &Value::Object(body)).await
    }

    async fn fire_event(&self, event_type: &str, data: Map<String, Value>) -> Result<Value> {
        self.post(&event_path(event_type), &Value::Object(data)).await
    }
}
