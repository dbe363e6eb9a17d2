use std::collections::VecDeque;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use parking_lot::Mutex;
use reqwest::StatusCode;
use reqwest::header::HeaderValue;
use reqwest::header::RETRY_AFTER;

use crate::errors::TransportError;
use crate::transport::Transport;
use crate::transport::TransportFuture;
use crate::transport::TransportRequest;
use crate::transport::TransportResponse;

type Reply = Result<TransportResponse, TransportError>;

/// Transport that replays canned replies and records every request
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<TransportRequest>>,
    calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, reply: Reply) -> Self {
        self.replies.lock().push_back(reply);
        self
    }

    pub fn respond(self, status: StatusCode, body: &'static str) -> Self {
        self.reply(Ok(TransportResponse::new(status, body)))
    }

    pub fn respond_retry_after(self, retry_after: &'static str) -> Self {
        let mut response = TransportResponse::new(StatusCode::TOO_MANY_REQUESTS, r#"{"code":-1003,"msg":"Too many requests."}"#);
        response.headers.insert(RETRY_AFTER, HeaderValue::from_static(retry_after));
        self.reply(Ok(response))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request);
        let reply = self.replies.lock().pop_front().unwrap_or_else(|| Ok(TransportResponse::new(StatusCode::OK, "{}")));

        Box::pin(async move { reply })
    }
}
