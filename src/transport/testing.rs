//! Scripted transport for unit tests

use std::collections::VecDeque;

use async_trait::async_trait;
use http::{Method, StatusCode};
use parking_lot::Mutex;
use serde_json::Value;

use super::{HttpResponse, Transport, TransportError};

/// A request as seen by [`ScriptedTransport`]
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub json: Option<Value>,
    pub form: Vec<(String, String)>,
}

/// Replays queued responses in order and records every request
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        let status = StatusCode::from_u16(status).unwrap();
        self.responses
            .lock()
            .push_back(Ok(HttpResponse::new(status, body.as_bytes().to_vec())));
        self
    }

    pub fn respond_json(self, status: u16, body: &Value) -> Self {
        self.respond(status, &body.to_string())
    }

    pub fn fail(self, message: &str) -> Self {
        self.responses.lock().push_back(Err(TransportError::Request {
            method: Method::GET,
            url: "scripted".to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                message.to_string(),
            )),
        }));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    fn next(&self, request: RecordedRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.clone();
        let method = request.method.clone();
        self.requests.lock().push(request);
        self.responses.lock().pop_front().unwrap_or_else(|| {
            Err(TransportError::Request {
                method,
                url,
                source: "no scripted response left".into(),
            })
        })
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.next(RecordedRequest {
            method: Method::GET,
            url: url.to_string(),
            json: None,
            form: Vec::new(),
        })
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, TransportError> {
        self.next(RecordedRequest {
            method: Method::POST,
            url: url.to_string(),
            json: Some(body.clone()),
            form: Vec::new(),
        })
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError> {
        self.next(RecordedRequest {
            method: Method::POST,
            url: url.to_string(),
            json: None,
            form: form
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        })
    }

    async fn delete(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.next(RecordedRequest {
            method: Method::DELETE,
            url: url.to_string(),
            json: None,
            form: Vec::new(),
        })
    }
}
