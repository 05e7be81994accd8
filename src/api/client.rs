use crate::core::notify::{Notifier, Severity};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SgeError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// HTTP access to the SGE REST API.
///
/// Every call goes through [`ApiClient::request`]; the typed CRUD helpers and
/// report fetchers are thin wrappers around it.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    notifier: Option<Arc<Notifier>>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::build(base_url, timeout, &HashMap::new())
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::build(
            config.api_base_url(),
            config.request_timeout(),
            &config.default_headers(),
        )
    }

    fn build(base_url: &str, timeout: Duration, headers: &HashMap<String, String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(header_map(headers)?)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            notifier: None,
        })
    }

    /// Failed requests are also reported through `notifier`.
    pub fn with_notifier(mut self, notifier: Arc<Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("API request: {} {}", method, url);

        let mut builder = self.client.request(method.clone(), &url);
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let outcome = Self::send(builder).await;
        match &outcome {
            Ok(_) => tracing::debug!("API request succeeded: {} {}", method, path),
            Err(e) => {
                tracing::error!("API request failed: {} {}: {}", method, path, e);
                if let Some(notifier) = &self.notifier {
                    notifier.notify(&format!("API error: {}", e), Severity::Error);
                }
            }
        }
        outcome
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            let body = serde_json::from_str(&text).unwrap_or(Value::Null);
            return Err(error_from_body(status.as_u16(), &body));
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };
        let data = unwrap_envelope(body)?;
        Ok(serde_json::from_value(data)?)
    }
}

fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| SgeError::InvalidConfigValueError {
                field: "api.headers".to_string(),
                value: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| SgeError::InvalidConfigValueError {
                field: format!("api.headers.{}", name),
                value: value.clone(),
                reason: e.to_string(),
            })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Strips the `{success, data}` envelope some endpoints use. Bare values pass through;
/// an envelope without `data` is returned whole so acknowledgement fields survive.
pub(crate) fn unwrap_envelope(body: Value) -> Result<Value> {
    let mut map = match body {
        Value::Object(map) => map,
        other => return Ok(other),
    };

    let Some(success) = map.get("success").and_then(Value::as_bool) else {
        return Ok(Value::Object(map));
    };

    if !success {
        let message = map
            .get("message")
            .or_else(|| map.get("error"))
            .and_then(Value::as_str)
            .unwrap_or("Request was not successful")
            .to_string();
        return Err(SgeError::EnvelopeError { message });
    }

    Ok(map.remove("data").unwrap_or(Value::Object(map)))
}

pub(crate) fn error_from_body(status: u16, body: &Value) -> SgeError {
    let mut message = body
        .get("error")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP error! status: {}", status));

    if let Some(details) = body.get("detalhes").and_then(Value::as_str) {
        if !message.contains(details) {
            message = format!("{} ({})", message, details);
        }
    }

    SgeError::ApiError {
        status,
        message,
        kind: body.get("tipo").and_then(Value::as_str).map(str::to_string),
    }
}
