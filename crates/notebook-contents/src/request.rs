//! Request builder: turns a server configuration into request descriptors.
//!
//! Settings layer in increasing precedence: defaults, then the server-wide
//! `extra_request_options`, then the per-call options. Headers merge
//! separately, key by key, with later layers winning:
//!
//! ```text
//! computed auth headers  <  per-call headers  <  server-wide extra headers
//! ```
//!
//! so a caller can replace the computed `Authorization` header, and the
//! server-wide configuration can replace both.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::Utc;
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use notebook_core::{RequestOptions, ResponseType, ServerConfig};
use reqwest::Url;

/// Header carrying the anti-forgery token.
pub const XSRF_HEADER: &str = "x-xsrftoken";

/// Cookie consulted when the configuration carries no XSRF token.
pub const XSRF_COOKIE: &str = "_xsrf";

/// Query parameter used to defeat HTTP caching.
pub const CACHE_BUST_PARAM: &str = "_";

/// A fully built request, ready for the transport.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
    pub response_type: ResponseType,
    pub timeout: Option<Duration>,
}

/// Source of cookie values, such as a browser or desktop cookie jar.
pub trait CookieSource: Send + Sync {
    /// The value of the named cookie, if set.
    fn cookie(&self, name: &str) -> Option<String>;
}

/// Builds request descriptors, with an optional cookie fallback for XSRF.
#[derive(Clone, Default)]
pub struct RequestBuilder {
    cookies: Option<Arc<dyn CookieSource>>,
}

impl RequestBuilder {
    /// A builder without cookie access.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder that falls back to the `_xsrf` cookie.
    pub fn with_cookies(cookies: Arc<dyn CookieSource>) -> Self {
        Self {
            cookies: Some(cookies),
        }
    }

    /// Build the request for `uri` (the part after the base URL).
    pub fn build(
        &self,
        config: &ServerConfig,
        uri: &str,
        options: RequestOptions,
    ) -> RequestDescriptor {
        let mut url = format!("{}{}", config.base_url(), uri);
        if options.cache == Some(false) {
            url = with_cache_bust(&url, next_cache_token());
        }

        let extra = config.extra_request_options.as_ref();

        let method = options
            .method
            .or_else(|| extra.and_then(|e| e.method.clone()))
            .unwrap_or(Method::GET);
        let body = options.body.or_else(|| extra.and_then(|e| e.body.clone()));
        let response_type = options
            .response_type
            .or_else(|| extra.and_then(|e| e.response_type))
            .unwrap_or_default();
        let timeout = options.timeout.or_else(|| extra.and_then(|e| e.timeout));

        let mut headers = self.auth_headers(config);
        headers.extend(options.headers);
        if let Some(extra) = extra {
            headers.extend(extra.headers.clone());
        }

        RequestDescriptor {
            url,
            method,
            headers,
            body,
            response_type,
            timeout,
        }
    }

    /// `X-XSRFToken` and `Authorization`, each present only when its token is.
    fn auth_headers(&self, config: &ServerConfig) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let xsrf = config
            .xsrf_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| {
                self.cookies
                    .as_ref()
                    .and_then(|c| c.cookie(XSRF_COOKIE))
                    .filter(|t| !t.is_empty())
            });
        if let Some(xsrf) = xsrf {
            insert_header(&mut headers, HeaderName::from_static(XSRF_HEADER), &xsrf);
        }

        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            insert_header(&mut headers, AUTHORIZATION, &format!("token {}", token));
        }

        headers
    }
}

impl std::fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("cookies", &self.cookies.is_some())
            .finish()
    }
}

/// Build a request without cookie access.
pub fn build_request(config: &ServerConfig, uri: &str, options: RequestOptions) -> RequestDescriptor {
    RequestBuilder::new().build(config, uri, options)
}

fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(mut value) => {
            value.set_sensitive(true);
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!(header = %name, "dropping auth header with invalid characters"),
    }
}

static LAST_CACHE_TOKEN: AtomicI64 = AtomicI64::new(0);

/// Epoch milliseconds, bumped when needed so that no two calls share a token.
fn next_cache_token() -> i64 {
    let now = Utc::now().timestamp_millis();
    let previous = LAST_CACHE_TOKEN
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    now.max(previous + 1)
}

/// Set the cache-busting parameter, replacing an existing one.
fn with_cache_bust(url: &str, token: i64) -> String {
    let token = token.to_string();
    match Url::parse(url) {
        Ok(mut parsed) => {
            let kept: Vec<(String, String)> = parsed
                .query_pairs()
                .filter(|(key, _)| key != CACHE_BUST_PARAM)
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect();
            parsed
                .query_pairs_mut()
                .clear()
                .extend_pairs(kept)
                .append_pair(CACHE_BUST_PARAM, &token);
            parsed.to_string()
        }
        // Relative URLs (empty base) cannot be parsed; append textually and
        // let the transport report the failure.
        Err(_) => {
            let separator = if url.contains('?') { '&' } else { '?' };
            format!("{url}{separator}{CACHE_BUST_PARAM}={token}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;

    fn cache_token_of(url: &str) -> i64 {
        let parsed = Url::parse(url).unwrap();
        parsed
            .query_pairs()
            .find(|(k, _)| k == CACHE_BUST_PARAM)
            .map(|(_, v)| v.parse().unwrap())
            .expect("cache-bust parameter present")
    }

    #[test]
    fn joins_base_and_uri() {
        let config = ServerConfig::with_url("http://h/");
        let request = build_request(&config, "/api/x", RequestOptions::default());
        assert_eq!(request.url, "http://h/api/x");
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.response_type, ResponseType::Json);
        assert!(request.headers.is_empty());
    }

    #[test]
    fn uncached_requests_get_fresh_urls() {
        let config = ServerConfig::with_url("http://h/");
        let first = build_request(&config, "/api/x", RequestOptions::uncached());
        let second = build_request(&config, "/api/x", RequestOptions::uncached());

        assert!(first.url.starts_with("http://h/api/x?_="));
        assert!(second.url.starts_with("http://h/api/x?_="));
        assert_ne!(first.url, second.url);
        assert!(cache_token_of(&second.url) > cache_token_of(&first.url));
    }

    #[test]
    fn cache_bust_keeps_other_query_parameters() {
        let config = ServerConfig::with_url("http://h");
        let request = build_request(&config, "/api/contents/a?content=0&_=1", RequestOptions::uncached());
        let parsed = Url::parse(&request.url).unwrap();
        let pairs: Vec<_> = parsed.query_pairs().collect();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, "content");
        assert_eq!(pairs[0].1, "0");
        assert!(cache_token_of(&request.url) > 1);
    }

    #[test]
    fn cache_bust_on_empty_base_appends_textually() {
        let request = build_request(&ServerConfig::local(), "/api/x", RequestOptions::uncached());
        assert!(request.url.starts_with("/api/x?_="));
    }

    #[test]
    fn empty_base_is_not_rejected() {
        let request = build_request(&ServerConfig::local(), "/api/x", RequestOptions::default());
        assert_eq!(request.url, "/api/x");
    }

    #[test]
    fn computes_auth_headers() {
        let config = ServerConfig::with_url("http://h")
            .with_token("abc")
            .with_xsrf_token("xyz");
        let request = build_request(&config, "/", RequestOptions::default());

        assert_eq!(request.headers[AUTHORIZATION], "token abc");
        assert_eq!(request.headers[XSRF_HEADER], "xyz");
    }

    #[test]
    fn auth_headers_are_independent() {
        let config = ServerConfig::with_url("http://h").with_xsrf_token("xyz");
        let request = build_request(&config, "/", RequestOptions::default());
        assert!(request.headers.get(AUTHORIZATION).is_none());
        assert_eq!(request.headers[XSRF_HEADER], "xyz");
    }

    #[test]
    fn caller_authorization_overrides_token() {
        let config = ServerConfig::with_url("http://h").with_token("abc");
        let options = RequestOptions::default()
            .with_header(AUTHORIZATION, HeaderValue::from_static("Bearer caller"));
        let request = build_request(&config, "/", options);

        assert_eq!(request.headers[AUTHORIZATION], "Bearer caller");
        assert_eq!(request.headers.get_all(AUTHORIZATION).iter().count(), 1);
    }

    #[test]
    fn server_wide_headers_override_caller_headers() {
        let extra = RequestOptions::default()
            .with_header(AUTHORIZATION, HeaderValue::from_static("Bearer server"));
        let config = ServerConfig::with_url("http://h")
            .with_token("abc")
            .with_extra_request_options(extra);
        let options = RequestOptions::default()
            .with_header(AUTHORIZATION, HeaderValue::from_static("Bearer caller"))
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let request = build_request(&config, "/", options);

        assert_eq!(request.headers[AUTHORIZATION], "Bearer server");
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn per_call_options_override_server_wide_settings() {
        let extra = RequestOptions {
            method: Some(Method::POST),
            timeout: Some(Duration::from_secs(30)),
            response_type: Some(ResponseType::Text),
            ..RequestOptions::default()
        };
        let config = ServerConfig::with_url("http://h").with_extra_request_options(extra);

        let request = build_request(&config, "/", RequestOptions::method(Method::DELETE));
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.timeout, Some(Duration::from_secs(30)));
        assert_eq!(request.response_type, ResponseType::Text);
    }

    #[test]
    fn xsrf_falls_back_to_cookie() {
        struct Jar;
        impl CookieSource for Jar {
            fn cookie(&self, name: &str) -> Option<String> {
                (name == XSRF_COOKIE).then(|| "from-cookie".to_string())
            }
        }

        let builder = RequestBuilder::with_cookies(Arc::new(Jar));
        let request = builder.build(&ServerConfig::with_url("http://h"), "/", RequestOptions::default());
        assert_eq!(request.headers[XSRF_HEADER], "from-cookie");

        let config = ServerConfig::with_url("http://h").with_xsrf_token("from-config");
        let request = builder.build(&config, "/", RequestOptions::default());
        assert_eq!(request.headers[XSRF_HEADER], "from-config");
    }

    #[test]
    fn invalid_token_is_dropped() {
        let config = ServerConfig::with_url("http://h").with_token("bad\ntoken");
        let request = build_request(&config, "/", RequestOptions::default());
        assert!(request.headers.get(AUTHORIZATION).is_none());
    }
}
