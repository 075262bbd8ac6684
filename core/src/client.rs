//! Authenticated request builder and response classifier for the Beanstalk API.
//!
//! # Design
//! `BeanstalkClient` holds the base URL, credentials and a transport, all
//! fixed at construction. A call is split into [`BeanstalkClient::build_request`],
//! which produces an `HttpRequest`, and [`classify`], which consumes the
//! `HttpResponse`. [`BeanstalkClient::raw_request`] runs the transport in
//! between. Both halves are pure so they can be tested without a network.

use base64::Engine as _;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::request::Request;
use crate::transport::{Transport, UreqTransport};

/// Value of the client identifier header sent with every request.
pub const USER_AGENT: &str = "beanstalk-rs";

/// Synchronous client for the Beanstalk API.
pub struct BeanstalkClient<T = UreqTransport> {
    base_url: Url,
    username: String,
    access_token: String,
    transport: T,
}

impl<T> std::fmt::Debug for BeanstalkClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeanstalkClient")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> BeanstalkClient<T> {
    /// Client for the account's hosted API.
    pub fn new(config: &ClientConfig, transport: T) -> Result<Self, ApiError> {
        Self::with_base_url(
            &config.base_url()?,
            &config.username,
            &config.access_token,
            transport,
        )
    }

    /// Client against an explicit API root, e.g. a local mock server.
    pub fn with_base_url(
        base_url: &str,
        username: &str,
        access_token: &str,
        transport: T,
    ) -> Result<Self, ApiError> {
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| ApiError::Config(format!("invalid API URL {normalized:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!("invalid API URL {normalized:?}")));
        }
        Ok(Self {
            base_url,
            username: username.to_owned(),
            access_token: access_token.to_owned(),
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve `request` against the base URL and attach auth and identity headers.
    pub fn build_request(&self, request: Request) -> Result<HttpRequest, ApiError> {
        let mut url = self
            .base_url
            .join(&request.endpoint_path())
            .map_err(|e| ApiError::Config(format!("cannot resolve {}: {e}", request.endpoint_path())))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }

        let mut headers = vec![
            ("User-Agent".to_owned(), USER_AGENT.to_owned()),
            ("Authorization".to_owned(), self.basic_auth()),
        ];
        headers.extend(request.headers);

        Ok(HttpRequest {
            method: request.method,
            url: url.into(),
            headers,
            body: request.body,
        })
    }

    /// Send `request` and return the payload, if the response carries one.
    pub fn raw_request(&self, request: Request) -> Result<Option<Vec<u8>>, ApiError> {
        let http_request = self.build_request(request)?;
        let method = http_request.method;
        let url = http_request.url.clone();

        tracing::debug!(%method, %url, "beanstalk request");
        if let Some(body) = &http_request.body {
            tracing::trace!(%method, %url, body = %String::from_utf8_lossy(body), "request body");
        }

        let response = self.transport.execute(http_request)?;

        tracing::debug!(%method, %url, status = response.status, "beanstalk response");
        tracing::trace!(%method, %url, body = %String::from_utf8_lossy(&response.body), "response body");

        classify(response)
    }

    fn basic_auth(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.access_token);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        )
    }
}

/// Map a response to its payload or to the matching `ApiError`.
///
/// 200 and 201 carry a payload; every other 2xx is payload-free. 404 is the
/// not-found signal whatever the body says.
pub fn classify(response: HttpResponse) -> Result<Option<Vec<u8>>, ApiError> {
    match response.status {
        404 => Err(ApiError::NotFound),
        200 | 201 => Ok(Some(response.body)),
        status if (200..300).contains(&status) => Ok(None),
        status => Err(ApiError::HttpStatus {
            status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    struct NoNetwork;

    impl Transport for NoNetwork {
        fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, ApiError> {
            Err(ApiError::Transport("no network in unit tests".to_string()))
        }
    }

    fn client() -> BeanstalkClient<NoNetwork> {
        let config = ClientConfig {
            account_name: "acme".to_string(),
            username: "alice".to_string(),
            access_token: "secret".to_string(),
        };
        BeanstalkClient::new(&config, NoNetwork).unwrap()
    }

    #[test]
    fn base_url_is_derived_from_account() {
        assert_eq!(client().base_url(), "https://acme.beanstalkapp.com/api/");
    }

    #[test]
    fn account_that_would_change_host_is_rejected() {
        let config = ClientConfig {
            account_name: "evil.example#".to_string(),
            username: "alice".to_string(),
            access_token: "secret".to_string(),
        };
        let err = BeanstalkClient::new(&config, NoNetwork).unwrap_err();
        assert!(matches!(err, ApiError::Config(msg) if msg.contains("evil.example#")));
    }

    #[test]
    fn build_request_resolves_path_against_base() {
        let req = client()
            .build_request(Request::new(
                HttpMethod::Get,
                &["repositories", "42", "integrations", "7"],
            ))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "https://acme.beanstalkapp.com/api/repositories/42/integrations/7.json"
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn build_request_carries_auth_and_identity() {
        let req = client()
            .build_request(Request::new(HttpMethod::Delete, &["teams", "3"]))
            .unwrap();
        assert_eq!(req.header("user-agent"), Some(USER_AGENT));
        // base64("alice:secret")
        assert_eq!(req.header("authorization"), Some("Basic YWxpY2U6c2VjcmV0"));
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn build_request_encodes_query() {
        let req = client()
            .build_request(
                Request::new(HttpMethod::Get, &["users"]).with_query(&[("per_page", "50"), ("page", "1")]),
            )
            .unwrap();
        assert_eq!(
            req.url,
            "https://acme.beanstalkapp.com/api/users.json?page=1&per_page=50"
        );
    }

    #[test]
    fn build_request_keeps_json_body() {
        let req = client()
            .build_request(Request::new(HttpMethod::Post, &["teams"]).with_json_body(b"{\"a\":1}".to_vec()))
            .unwrap();
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some(&b"{\"a\":1}"[..]));
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let a = BeanstalkClient::with_base_url("http://localhost:3000/api", "u", "t", NoNetwork).unwrap();
        let b = BeanstalkClient::with_base_url("http://localhost:3000/api/", "u", "t", NoNetwork).unwrap();
        assert_eq!(a.base_url(), "http://localhost:3000/api/");
        assert_eq!(a.base_url(), b.base_url());
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let err = BeanstalkClient::with_base_url("not a url", "u", "t", NoNetwork).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn classify_404_is_not_found_regardless_of_body() {
        let err = classify(HttpResponse::new(404, r#"{"errors":["gone"]}"#)).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn classify_500_is_http_status() {
        let err = classify(HttpResponse::new(500, "internal error")).unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus { status: 500, .. }));
    }

    #[test]
    fn classify_422_keeps_body_for_diagnosis() {
        match classify(HttpResponse::new(422, "name taken")) {
            Err(ApiError::HttpStatus { status, body }) => {
                assert_eq!(status, 422);
                assert_eq!(body, "name taken");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn classify_200_and_201_return_payload() {
        assert_eq!(classify(HttpResponse::new(200, "{}")).unwrap(), Some(b"{}".to_vec()));
        assert_eq!(classify(HttpResponse::new(201, "[]")).unwrap(), Some(b"[]".to_vec()));
    }

    #[test]
    fn classify_other_2xx_has_no_payload() {
        assert_eq!(classify(HttpResponse::new(204, "")).unwrap(), None);
        assert_eq!(classify(HttpResponse::new(202, "ignored")).unwrap(), None);
    }

    #[test]
    fn raw_request_surfaces_transport_failure() {
        let err = client()
            .raw_request(Request::new(HttpMethod::Get, &["repositories"]))
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
