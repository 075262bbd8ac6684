//! Per-call request description, before it is resolved against a base URL.

use std::collections::BTreeMap;

use crate::http::HttpMethod;

/// Suffix the API dispatches on. Every endpoint path ends with it.
pub const ENDPOINT_SUFFIX: &str = ".json";

/// Join path segments with `/` and append [`ENDPOINT_SUFFIX`].
///
/// Segments are used verbatim; callers pass ids and fixed collection names.
pub fn endpoint_path<S: AsRef<str>>(segments: &[S]) -> String {
    let joined = segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("/");
    format!("{joined}{ENDPOINT_SUFFIX}")
}

/// One API call: method, endpoint path segments, optional query parameters,
/// extra headers and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: HttpMethod,
    pub path: Vec<String>,
    pub query: BTreeMap<String, String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: HttpMethod, path: &[&str]) -> Self {
        Self {
            method,
            path: path.iter().map(|s| (*s).to_owned()).collect(),
            query: BTreeMap::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: &[(&str, &str)]) -> Self {
        self.query
            .extend(query.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())));
        self
    }

    /// Attach an already serialized JSON body and its content type.
    pub fn with_json_body(mut self, body: Vec<u8>) -> Self {
        self.headers
            .push(("Content-Type".to_owned(), "application/json".to_owned()));
        self.body = Some(body);
        self
    }

    pub fn endpoint_path(&self) -> String {
        endpoint_path(&self.path)
    }
}
