//! Error types for the Beanstalk API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because resource reads treat "the
//! remote object is gone" as a state transition rather than a failure. All
//! other non-2xx responses land in `HttpStatus` with the raw status code and
//! body for debugging. `PayloadMissing` and `MalformedPayload` are kept apart
//! so a 204 where a body was required is not reported as a decode failure.

use thiserror::Error;

/// Errors returned by the client, the codec and the resource adapters.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404. Carries no payload.
    #[error("not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP error {status}")]
    HttpStatus { status: u16, body: String },

    /// A response payload was required but the server sent none.
    #[error("server did not return a JSON payload")]
    PayloadMissing,

    /// The response payload could not be decoded into the expected shape.
    #[error("error decoding response JSON payload: {0}")]
    MalformedPayload(String),

    /// The request payload could not be serialized to JSON.
    #[error("error encoding request JSON payload: {0}")]
    Serialization(String),

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service does not support this lifecycle operation through its API.
    #[error("{0}")]
    Unsupported(String),

    /// Provider configuration is missing a value or is otherwise unusable.
    #[error("invalid provider configuration: {0}")]
    Config(String),

    /// A declared attribute is absent or does not have the expected shape.
    #[error("attribute `{name}` must be {expected}")]
    InvalidAttribute { name: String, expected: &'static str },

    /// The response decoded fine but lacks something the adapter relies on.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// A multi-step operation changed remote state before a later call
    /// failed. `id` names what now exists remotely so it can be adopted.
    #[error("{resource} {id} was applied but a later call failed: {source}")]
    PartiallyApplied {
        resource: &'static str,
        id: String,
        source: Box<ApiError>,
    },
}

impl ApiError {
    /// Whether this is the not-found signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }

    /// Wrap `source` as a failure after `resource` `id` was already applied.
    /// An error that is already partial keeps its original identity.
    pub fn partially_applied(resource: &'static str, id: &str, source: ApiError) -> Self {
        match source {
            partial @ ApiError::PartiallyApplied { .. } => partial,
            source => ApiError::PartiallyApplied {
                resource,
                id: id.to_owned(),
                source: Box::new(source),
            },
        }
    }

    /// Remote identity left behind by a partially applied operation.
    pub fn applied_id(&self) -> Option<&str> {
        match self {
            ApiError::PartiallyApplied { id, .. } => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_has_no_payload_text() {
        assert_eq!(ApiError::NotFound.to_string(), "not found");
        assert!(ApiError::NotFound.is_not_found());
    }

    #[test]
    fn http_status_display_carries_code() {
        let err = ApiError::HttpStatus {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 500");
        assert!(!err.is_not_found());
    }

    #[test]
    fn malformed_payload_includes_parse_error() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ApiError::MalformedPayload(parse.to_string());
        assert!(err.to_string().starts_with("error decoding response JSON payload: EOF"));
    }

    #[test]
    fn partially_applied_keeps_first_identity() {
        let inner = ApiError::partially_applied("beanstalk_repository", "42", ApiError::NotFound);
        let outer = ApiError::partially_applied("beanstalk_repository", "7", inner);
        assert_eq!(outer.applied_id(), Some("42"));
        assert_eq!(
            outer.to_string(),
            "beanstalk_repository 42 was applied but a later call failed: not found"
        );
        assert!(!outer.is_not_found());
        assert_eq!(ApiError::NotFound.applied_id(), None);
    }
}
