use crate::domain::ports::{GatewayReply, GatewayRequest, HttpTransport};
use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One queued outcome for [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Reply(GatewayReply),
    Fail(String),
}

impl ScriptedReply {
    pub fn json(status: u16, body: Value) -> Self {
        ScriptedReply::Reply(GatewayReply::new(status, body.to_string()))
    }

    pub fn empty(status: u16) -> Self {
        ScriptedReply::Reply(GatewayReply::new(status, ""))
    }

    pub fn fail(message: impl Into<String>) -> Self {
        ScriptedReply::Fail(message.into())
    }
}

/// A transport that answers from a queue and records every request.
///
/// `Clone` shares the queue and the log, so a test can keep a handle after
/// giving the transport to a client.
#[derive(Debug, Default, Clone)]
pub struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    requests: Arc<Mutex<Vec<GatewayRequest>>>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            requests: Arc::default(),
        }
    }

    pub async fn push(&self, reply: ScriptedReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Requests seen so far, oldest first.
    pub async fn requests(&self) -> Vec<GatewayRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn remaining(&self) -> usize {
        self.replies.lock().await.len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: GatewayRequest) -> Result<GatewayReply, TransportError> {
        self.requests.lock().await.push(request);
        match self.replies.lock().await.pop_front() {
            Some(ScriptedReply::Reply(reply)) => Ok(reply),
            Some(ScriptedReply::Fail(message)) => Err(TransportError::new(message)),
            None => Err(TransportError::new("scripted reply queue is empty")),
        }
    }
}
