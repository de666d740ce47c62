//! Executing `HttpRequest` values.
//!
//! # Design
//! `Transport` is the only place network I/O happens. Status codes come back
//! as data so `DrinkClient::parse_*` owns their interpretation; only failures
//! that never produced a response become `ApiError::Network`.

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Performs one HTTP round-trip. No retries, no caching.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::ureq_transport::UreqTransport;

#[cfg(feature = "ureq")]
mod ureq_transport {
    use super::Transport;
    use crate::error::ApiError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Blocking transport backed by a shared `ureq` agent.
    ///
    /// Disables ureq's status-code-as-error behavior so 4xx/5xx responses
    /// are returned as data rather than `Err`.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl UreqTransport {
        pub fn new() -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self { agent }
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            let mut builder = match request.method {
                HttpMethod::Get => self.agent.get(&request.url),
            };
            for (key, value) in &request.headers {
                builder = builder.header(key.as_str(), value.as_str());
            }

            let mut response = builder.call().map_err(map_transport_error)?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
                .collect();
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(map_transport_error)?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

    fn map_transport_error(error: ureq::Error) -> ApiError {
        match error {
            ureq::Error::BadUri(uri) => ApiError::InvalidUrl(uri),
            other => ApiError::Network(other.to_string()),
        }
    }
}

#[cfg(all(test, feature = "ureq"))]
mod tests {
    use super::*;
    use crate::client::DrinkClient;

    #[test]
    fn unreachable_host_is_network_error() {
        // Bind then drop to get a port nobody listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = DrinkClient::new(&format!("http://127.0.0.1:{port}"));
        let req = client.build_random().unwrap();
        let err = UreqTransport::new().execute(&req).unwrap_err();
        assert!(matches!(err, ApiError::Network(_)), "{err:?}");
    }
}
