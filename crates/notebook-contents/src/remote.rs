//! Remote content provider for Jupyter-style contents servers.
//!
//! Each operation builds a request with the `RequestBuilder`, sends it with
//! reqwest, and folds the outcome into an `Envelope`:
//!
//! - 2xx with a decodable body → success envelope with the upstream status
//! - non-2xx → `Backend` error carrying the upstream status and body
//! - send/read failure → `Transport` error (503)
//! - undecodable 2xx body → `Decode` error (502)
//!
//! Bodies are always JSON. A request whose resolved response type is not
//! `json` fails with `UnsupportedResponseType` (400) before it is sent.

use std::sync::Arc;

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Method};
use notebook_core::{
    Checkpoint, ContentItem, ContentModel, GetParams, RequestOptions, ResponseType, ServerConfig,
};
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::envelope::Envelope;
use crate::error::{BackendError, ContentError};
use crate::provider::ContentProvider;
use crate::request::{CookieSource, RequestBuilder, RequestDescriptor};

/// Path prefix of the contents API.
pub const CONTENTS_API: &str = "/api/contents";

// Only used to percent-encode path segments; never contacted.
const SEGMENT_ENCODER_BASE: &str = "http://contents.invalid/";

/// Content provider backed by a remote contents REST API.
#[derive(Debug, Clone, Default)]
pub struct RemoteContentProvider {
    client: reqwest::Client,
    requests: RequestBuilder,
}

impl RemoteContentProvider {
    /// A provider with a default HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that sends through `client`.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            requests: RequestBuilder::new(),
        }
    }

    /// Fall back to the `_xsrf` cookie from `cookies` when the config has no XSRF token.
    #[must_use]
    pub fn with_cookies(mut self, cookies: Arc<dyn CookieSource>) -> Self {
        self.requests = RequestBuilder::with_cookies(cookies);
        self
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestDescriptor) -> Envelope<T> {
        tracing::debug!(method = %request.method, url = %request.url, "remote contents request");

        if request.response_type != ResponseType::Json {
            tracing::warn!(url = %request.url, response_type = %request.response_type, "refusing non-json contents request");
            return Envelope::error(ContentError::UnsupportedResponseType(request.response_type));
        }

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %request.url, "remote contents request failed: {}", e);
                return Envelope::error(ContentError::Transport(e));
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(url = %request.url, %status, "failed to read response body: {}", e);
                return Envelope::error(ContentError::Transport(e)).with_headers(headers);
            }
        };

        if !status.is_success() {
            let err = BackendError::from_response(status, headers.clone(), &bytes);
            tracing::warn!(url = %request.url, %status, fault = ?err.fault(), "backend error: {}", err.message);
            return Envelope::error(ContentError::Backend(err)).with_headers(headers);
        }

        // Empty bodies (204 No Content) decode as null, which is what `()` expects.
        let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        match serde_json::from_slice::<T>(body) {
            Ok(value) => Envelope::success(status, value)
                .with_response_type(request.response_type)
                .with_headers(headers),
            Err(e) => {
                tracing::warn!(url = %request.url, %status, "undecodable response body: {}", e);
                Envelope::error(ContentError::Decode(e)).with_headers(headers)
            }
        }
    }
}

#[async_trait]
impl ContentProvider for RemoteContentProvider {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn get(
        &self,
        config: &ServerConfig,
        path: &str,
        params: &GetParams,
    ) -> Envelope<ContentItem> {
        let mut uri = contents_uri(path, &[]);
        match serde_urlencoded::to_string(params) {
            Ok(query) if !query.is_empty() => {
                uri.push('?');
                uri.push_str(&query);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(path, "dropping unencodable get params: {}", e),
        }
        let request = self.requests.build(config, &uri, RequestOptions::uncached());
        self.send(request).await
    }

    async fn save(
        &self,
        config: &ServerConfig,
        path: &str,
        model: &ContentModel,
    ) -> Envelope<ContentItem> {
        if model.content.is_none() {
            return Envelope::error(ContentError::InvalidModel(
                "no content found to save".to_string(),
            ));
        }
        let options = match json_options(Method::PUT, model) {
            Ok(options) => options,
            Err(e) => return Envelope::error(e),
        };
        let request = self.requests.build(config, &contents_uri(path, &[]), options);
        self.send(request).await
    }

    async fn create(
        &self,
        config: &ServerConfig,
        path: &str,
        model: &ContentModel,
    ) -> Envelope<ContentItem> {
        if model.kind.is_none() {
            return Envelope::error(ContentError::InvalidModel(
                "a type is required to create content".to_string(),
            ));
        }
        let options = match json_options(Method::POST, model) {
            Ok(options) => options,
            Err(e) => return Envelope::error(e),
        };
        let request = self.requests.build(config, &contents_uri(path, &[]), options);
        self.send(request).await
    }

    async fn update(
        &self,
        config: &ServerConfig,
        path: &str,
        model: &ContentModel,
    ) -> Envelope<ContentItem> {
        let options = match json_options(Method::PATCH, model) {
            Ok(options) => options,
            Err(e) => return Envelope::error(e),
        };
        let request = self.requests.build(config, &contents_uri(path, &[]), options);
        self.send(request).await
    }

    async fn remove(&self, config: &ServerConfig, path: &str) -> Envelope<()> {
        let request = self.requests.build(
            config,
            &contents_uri(path, &[]),
            RequestOptions::method(Method::DELETE),
        );
        self.send(request).await
    }

    async fn list_checkpoints(
        &self,
        config: &ServerConfig,
        path: &str,
    ) -> Envelope<Vec<Checkpoint>> {
        let request = self.requests.build(
            config,
            &contents_uri(path, &["checkpoints"]),
            RequestOptions::uncached(),
        );
        self.send(request).await
    }

    async fn create_checkpoint(&self, config: &ServerConfig, path: &str) -> Envelope<Checkpoint> {
        let request = self.requests.build(
            config,
            &contents_uri(path, &["checkpoints"]),
            RequestOptions::method(Method::POST),
        );
        self.send(request).await
    }

    async fn delete_checkpoint(
        &self,
        config: &ServerConfig,
        path: &str,
        checkpoint_id: &str,
    ) -> Envelope<()> {
        let request = self.requests.build(
            config,
            &contents_uri(path, &["checkpoints", checkpoint_id]),
            RequestOptions::method(Method::DELETE),
        );
        self.send(request).await
    }

    async fn restore_from_checkpoint(
        &self,
        config: &ServerConfig,
        path: &str,
        checkpoint_id: &str,
    ) -> Envelope<()> {
        let request = self.requests.build(
            config,
            &contents_uri(path, &["checkpoints", checkpoint_id]),
            RequestOptions::method(Method::POST),
        );
        self.send(request).await
    }
}

fn json_options(method: Method, model: &ContentModel) -> Result<RequestOptions, ContentError> {
    let body =
        serde_json::to_value(model).map_err(|e| ContentError::InvalidModel(e.to_string()))?;
    Ok(RequestOptions::method(method)
        .with_body(body)
        .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json")))
}

/// `/api/contents/<path>/<tail...>` with every segment percent-encoded.
fn contents_uri(path: &str, tail: &[&str]) -> String {
    let segments: Vec<&str> = ["api", "contents"]
        .into_iter()
        .chain(path.split('/').filter(|s| !s.is_empty()))
        .chain(tail.iter().copied())
        .collect();

    let Ok(mut url) = Url::parse(SEGMENT_ENCODER_BASE) else {
        return format!("/{}", segments.join("/"));
    };
    if let Ok(mut path_segments) = url.path_segments_mut() {
        path_segments.clear().extend(segments);
    }
    url.path().to_string()
}
