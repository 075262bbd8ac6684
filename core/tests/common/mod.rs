//! Scripted transport shared by the scenario tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use beanstalk_core::{ApiError, BeanstalkClient, HttpMethod, HttpRequest, HttpResponse, Transport};
use serde_json::Value;

pub const BASE_URL: &str = "https://acme.beanstalkapp.com/api/";

/// Replays queued responses in order and records every request it is given.
#[derive(Default)]
pub struct Scripted {
    responses: RefCell<VecDeque<HttpResponse>>,
    sent: RefCell<Vec<HttpRequest>>,
}

impl Scripted {
    pub fn sent(&self) -> Vec<HttpRequest> {
        self.sent.borrow().clone()
    }

    /// `(method, url)` of every request sent so far.
    pub fn calls(&self) -> Vec<(HttpMethod, String)> {
        self.sent.borrow().iter().map(|r| (r.method, r.url.clone())).collect()
    }

    pub fn remaining(&self) -> usize {
        self.responses.borrow().len()
    }
}

impl Transport for Scripted {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.sent.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ApiError::Transport("no scripted response left".to_string()))
    }
}

pub fn client(responses: Vec<HttpResponse>) -> BeanstalkClient<Scripted> {
    let transport = Scripted {
        responses: RefCell::new(responses.into()),
        sent: RefCell::default(),
    };
    BeanstalkClient::with_base_url(BASE_URL, "alice", "secret", transport).unwrap()
}

pub fn json(status: u16, body: Value) -> HttpResponse {
    HttpResponse::new(status, body.to_string())
}

pub fn empty(status: u16) -> HttpResponse {
    HttpResponse::new(status, "")
}

pub fn url(path: &str) -> String {
    format!("{BASE_URL}{path}")
}

pub fn body(request: &HttpRequest) -> Value {
    serde_json::from_slice(request.body.as_deref().expect("request has a body")).unwrap()
}
