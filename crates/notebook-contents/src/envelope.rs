//! The uniform response envelope.

use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use notebook_core::ResponseType;

use crate::error::ContentError;

/// Header identifying which provider produced an envelope.
pub const CONTENT_PROVIDER_HEADER: &str = "content-provider";

/// Status-coded outcome of a provider operation.
///
/// A 2xx status always comes with `Ok`, anything else with `Err`. The
/// constructors are the only way to build one, so the pairing cannot drift.
#[derive(Debug)]
pub struct Envelope<T> {
    status: StatusCode,
    response: Result<T, ContentError>,
    response_type: ResponseType,
    headers: HeaderMap,
}

impl<T> Envelope<T> {
    /// A 200 OK envelope.
    pub fn ok(value: T) -> Self {
        Self::success(StatusCode::OK, value)
    }

    /// A success envelope with an explicit 2xx status.
    ///
    /// A non-2xx status is clamped to 200 so that `Ok` never pairs with an
    /// error status.
    pub fn success(status: StatusCode, value: T) -> Self {
        let status = if status.is_success() {
            status
        } else {
            tracing::warn!(%status, "success envelope built with non-2xx status");
            StatusCode::OK
        };
        Self {
            status,
            response: Ok(value),
            response_type: ResponseType::Json,
            headers: HeaderMap::new(),
        }
    }

    /// An error envelope. The status comes from the error.
    pub fn error(err: ContentError) -> Self {
        Self {
            status: err.status(),
            response: Err(err),
            response_type: ResponseType::Json,
            headers: HeaderMap::new(),
        }
    }

    /// Wrap a result, using 200 for success.
    pub fn from_result(result: Result<T, ContentError>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(err) => Self::error(err),
        }
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replace all headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the response type.
    #[must_use]
    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn response(&self) -> Result<&T, &ContentError> {
        self.response.as_ref()
    }

    pub fn response_type(&self) -> ResponseType {
        self.response_type
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Consume the envelope, keeping only the outcome.
    pub fn into_result(self) -> Result<T, ContentError> {
        self.response
    }

    /// Transform the success value, keeping status and headers.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            status: self.status,
            response: self.response.map(f),
            response_type: self.response_type,
            headers: self.headers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_pairs_with_success_status() {
        let envelope = Envelope::ok(5);
        assert_eq!(envelope.status(), StatusCode::OK);
        assert!(envelope.is_success());
        assert_eq!(envelope.response().ok(), Some(&5));
    }

    #[test]
    fn error_takes_status_from_error() {
        let envelope: Envelope<()> = Envelope::error(ContentError::InvalidModel("x".into()));
        assert_eq!(envelope.status(), StatusCode::BAD_REQUEST);
        assert!(!envelope.is_success());
        assert!(matches!(
            envelope.into_result(),
            Err(ContentError::InvalidModel(_))
        ));
    }

    #[test]
    fn success_never_carries_error_status() {
        let envelope = Envelope::success(StatusCode::NOT_FOUND, "value");
        assert_eq!(envelope.status(), StatusCode::OK);

        let envelope = Envelope::success(StatusCode::CREATED, "value");
        assert_eq!(envelope.status(), StatusCode::CREATED);
    }

    #[test]
    fn map_keeps_status_and_headers() {
        let envelope = Envelope::success(StatusCode::CREATED, 2)
            .with_header(
                HeaderName::from_static(CONTENT_PROVIDER_HEADER),
                HeaderValue::from_static("local"),
            )
            .map(|n| n * 10);

        assert_eq!(envelope.status(), StatusCode::CREATED);
        assert_eq!(envelope.headers()[CONTENT_PROVIDER_HEADER], "local");
        assert_eq!(envelope.into_result().unwrap(), 20);
    }
}
