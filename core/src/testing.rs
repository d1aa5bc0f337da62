//! Scripted in-memory transport shared by the unit tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    Respond { status: u16, body: String },
    Fail(String),
    Nothing,
}

#[derive(Debug)]
pub(crate) struct FakeTransport {
    outcome: Outcome,
    delay: Option<Duration>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub(crate) fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn respond(status: u16, body: &str) -> Self {
        Self::new(Outcome::Respond {
            status,
            body: body.to_string(),
        })
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<Option<HttpResponse>, TransportError> {
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.outcome {
            Outcome::Respond { status, body } => Ok(Some(HttpResponse {
                status: *status,
                url,
                headers: Vec::new(),
                body: body.clone(),
            })),
            Outcome::Fail(msg) => Err(TransportError::Connect(msg.clone())),
            Outcome::Nothing => Ok(None),
        }
    }
}
