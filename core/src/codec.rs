//! JSON layer on top of [`BeanstalkClient::raw_request`].
//!
//! A request value, when present, is serialized and sent with a JSON content
//! type. The result destination is expressed by the return type: methods
//! returning `R` require a payload, methods returning `()` discard whatever
//! the server sent.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::BeanstalkClient;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::request::Request;
use crate::transport::Transport;

/// Serialize a request value to JSON bytes.
pub fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Decode a payload into `R`. A missing payload is its own error.
pub fn decode_payload<R: DeserializeOwned>(payload: Option<Vec<u8>>) -> Result<R, ApiError> {
    let bytes = payload.ok_or(ApiError::PayloadMissing)?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::MalformedPayload(e.to_string()))
}

impl<T: Transport> BeanstalkClient<T> {
    /// Build and send a request, returning the raw payload if there is one.
    pub fn json_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &[&str],
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Option<Vec<u8>>, ApiError> {
        let mut request = Request::new(method, path).with_query(query);
        if let Some(body) = body {
            request = request.with_json_body(encode_body(body)?);
        }
        self.raw_request(request)
    }

    pub fn get<R: DeserializeOwned>(&self, path: &[&str], query: &[(&str, &str)]) -> Result<R, ApiError> {
        let payload = self.json_request::<()>(HttpMethod::Get, path, query, None)?;
        decode_payload(payload)
    }

    pub fn post<B, R>(&self, path: &[&str], body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let payload = self.json_request(HttpMethod::Post, path, &[], Some(body))?;
        decode_payload(payload)
    }

    /// PUT without decoding the response.
    pub fn put<B: Serialize + ?Sized>(&self, path: &[&str], body: &B) -> Result<(), ApiError> {
        self.json_request(HttpMethod::Put, path, &[], Some(body))?;
        Ok(())
    }

    /// PUT and decode the response into `R`.
    pub fn put_returning<B, R>(&self, path: &[&str], body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let payload = self.json_request(HttpMethod::Put, path, &[], Some(body))?;
        decode_payload(payload)
    }

    pub fn delete(&self, path: &[&str]) -> Result<(), ApiError> {
        self.json_request::<()>(HttpMethod::Delete, path, &[], None)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::http::{HttpRequest, HttpResponse};

    #[derive(Default)]
    struct Scripted {
        responses: RefCell<VecDeque<HttpResponse>>,
        sent: RefCell<Vec<HttpRequest>>,
    }

    impl Transport for Scripted {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.sent.borrow_mut().push(request);
            self.responses
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| ApiError::Transport("no scripted response".to_string()))
        }
    }

    fn client_with(responses: Vec<HttpResponse>) -> BeanstalkClient<Scripted> {
        let transport = Scripted {
            responses: RefCell::new(responses.into()),
            sent: RefCell::default(),
        };
        BeanstalkClient::with_base_url("https://acme.beanstalkapp.com/api/", "alice", "secret", transport)
            .unwrap()
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Wrapped {
        repository: Inner,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Inner {
        id: i64,
    }

    #[test]
    fn get_decodes_payload() {
        let client = client_with(vec![HttpResponse::new(200, r#"{"repository":{"id":42}}"#)]);
        let res: Wrapped = client.get(&["repositories", "42"], &[]).unwrap();
        assert_eq!(res.repository.id, 42);

        let sent = client.transport().sent.borrow();
        assert_eq!(sent[0].method, HttpMethod::Get);
        assert!(sent[0].body.is_none());
        assert_eq!(sent[0].header("content-type"), None);
    }

    #[test]
    fn get_with_no_content_is_payload_missing() {
        let client = client_with(vec![HttpResponse::new(204, "")]);
        let err = client.get::<Wrapped>(&["repositories", "42"], &[]).unwrap_err();
        assert!(matches!(err, ApiError::PayloadMissing));
    }

    #[test]
    fn bad_json_is_malformed_payload_with_parse_text() {
        let client = client_with(vec![HttpResponse::new(200, "not json")]);
        match client.get::<Wrapped>(&["repositories", "42"], &[]) {
            Err(ApiError::MalformedPayload(msg)) => assert!(msg.contains("expected")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn server_error_is_not_decoded() {
        let client = client_with(vec![HttpResponse::new(500, "not json either")]);
        let err = client.get::<Wrapped>(&["repositories"], &[]).unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus { status: 500, .. }));
    }

    #[test]
    fn post_sends_json_body() {
        let client = client_with(vec![HttpResponse::new(201, r#"{"repository":{"id":1}}"#)]);
        let res: Wrapped = client.post(&["repositories"], &json!({"name": "demo"})).unwrap();
        assert_eq!(res, Wrapped { repository: Inner { id: 1 } });

        let sent = client.transport().sent.borrow();
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(sent[0].url, "https://acme.beanstalkapp.com/api/repositories.json");
        assert_eq!(sent[0].header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_slice(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "demo"}));
    }

    #[test]
    fn put_discards_response_body() {
        let client = client_with(vec![HttpResponse::new(200, "definitely not json")]);
        client.put(&["teams", "3"], &json!({"name": "ops"})).unwrap();
    }

    #[test]
    fn put_tolerates_no_content() {
        let client = client_with(vec![HttpResponse::new(204, "")]);
        client.put(&["teams", "3"], &json!({})).unwrap();
    }

    #[test]
    fn put_returning_requires_payload() {
        let client = client_with(vec![HttpResponse::new(204, "")]);
        let err = client.put_returning::<_, Wrapped>(&["teams", "3"], &json!({})).unwrap_err();
        assert!(matches!(err, ApiError::PayloadMissing));
    }

    #[test]
    fn delete_sends_no_body() {
        let client = client_with(vec![HttpResponse::new(200, "")]);
        client.delete(&["teams", "3"]).unwrap();

        let sent = client.transport().sent.borrow();
        assert_eq!(sent[0].method, HttpMethod::Delete);
        assert_eq!(sent[0].url, "https://acme.beanstalkapp.com/api/teams/3.json");
        assert!(sent[0].body.is_none());
    }

    #[test]
    fn delete_propagates_not_found() {
        let client = client_with(vec![HttpResponse::new(404, "")]);
        assert!(client.delete(&["teams", "3"]).unwrap_err().is_not_found());
    }
}
