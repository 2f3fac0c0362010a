//! Outbound forwarding of submitted requests to the downstream service.

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use std::time::Duration;

use crate::config::DownstreamConfig;
use crate::correlation::types::{ConversationId, ForwardError};

/// Caller-supplied data passed through to the downstream untouched.
#[derive(Debug, Clone, Default)]
pub struct ForwardContext {
    /// Query parameters, in the order the caller sent them.
    pub query: Vec<(String, String)>,
    /// Caller headers, before filtering.
    pub headers: HeaderMap,
}

/// One request to forward.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub conversation_id: ConversationId,
    pub body: serde_json::Value,
    pub context: ForwardContext,
}

/// Sends a submitted request downstream.
///
/// Completion means the downstream accepted the request; the answer itself
/// arrives later through the callback endpoint.
#[async_trait]
pub trait Forwarder: Send + Sync {
    async fn forward(&self, request: &ForwardRequest) -> Result<(), ForwardError>;
}

/// Headers never copied onto the forwarded request.
const STRIPPED_HEADERS: [header::HeaderName; 4] = [
    header::HOST,
    header::CONTENT_LENGTH,
    header::CONNECTION,
    header::TRANSFER_ENCODING,
];

/// Forwarder posting JSON to `{base_url}{messages_path}` over HTTP.
#[derive(Clone)]
pub struct HttpForwarder {
    client: reqwest::Client,
    endpoint: url::Url,
}

impl HttpForwarder {
    pub fn new(config: &DownstreamConfig) -> Result<Self, ForwardError> {
        let endpoint = config
            .endpoint()
            .map_err(|e| ForwardError::InvalidUrl(e.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ForwardError::Transport(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    fn url_for(&self, context: &ForwardContext) -> url::Url {
        let mut url = self.endpoint.clone();
        if !context.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &context.query {
                pairs.append_pair(key, value);
            }
        }
        url
    }
}

/// Copy caller headers minus those describing the inbound connection.
pub fn forward_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = headers.clone();
    for name in STRIPPED_HEADERS.iter() {
        filtered.remove(name);
    }
    filtered
}

#[async_trait]
impl Forwarder for HttpForwarder {
    async fn forward(&self, request: &ForwardRequest) -> Result<(), ForwardError> {
        let url = self.url_for(&request.context);
        tracing::debug!(
            conversation_id = %request.conversation_id,
            url = %url,
            "Forwarding request downstream"
        );

        let response = self
            .client
            .post(url)
            .headers(forward_headers(&request.context.headers))
            .json(&request.body)
            .send()
            .await
            .map_err(|e| ForwardError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::Status(status.as_u16()));
        }
        Ok(())
    }
}
