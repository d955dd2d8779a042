//! Scripted transport for tests and offline runs.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

use super::{request_target, ApiTransport, ErrorInfo};

#[derive(Debug)]
struct MockReply {
    result: Result<Value, ErrorInfo>,
    gate: Option<Arc<Notify>>,
}

/// A transport that answers from a queue of scripted replies.
///
/// Replies are keyed by request target (`/search?query=rust`, as produced by
/// [`request_target`]) and consumed in FIFO order. A request with nothing
/// queued fails with `HttpStatusFailure(404)`. Gated replies are held until
/// the returned [`Notify`] is signalled, which lets tests decide the order in
/// which overlapping requests complete.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, VecDeque<MockReply>>>,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    /// Create an empty mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for a request target.
    pub fn reply(&self, target: impl Into<String>, result: Result<Value, ErrorInfo>) {
        self.push(target.into(), result, None);
    }

    /// Queue a successful JSON reply.
    pub fn reply_ok(&self, target: impl Into<String>, body: Value) {
        self.reply(target, Ok(body));
    }

    /// Queue a failed reply.
    pub fn reply_err(&self, target: impl Into<String>, err: ErrorInfo) {
        self.reply(target, Err(err));
    }

    /// Queue a reply that is only delivered once the returned gate is notified.
    pub fn reply_gated(
        &self,
        target: impl Into<String>,
        result: Result<Value, ErrorInfo>,
    ) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.push(target.into(), result, Some(Arc::clone(&gate)));
        gate
    }

    /// Every request target seen so far, in arrival order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests seen so far.
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn push(&self, target: String, result: Result<Value, ErrorInfo>, gate: Option<Arc<Notify>>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(target)
            .or_default()
            .push_back(MockReply { result, gate });
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, ErrorInfo> {
        let target = request_target(path, params);

        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(target.clone());

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&target)
            .and_then(VecDeque::pop_front);

        let Some(reply) = reply else {
            tracing::debug!(%target, "no scripted reply");
            return Err(ErrorInfo::HttpStatusFailure(404));
        };

        if let Some(gate) = reply.gate {
            gate.notified().await;
        }

        reply.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_replies_are_consumed_in_order() {
        let mock = MockTransport::new();
        mock.reply_ok("/query?query=a", json!({ "answer": "first" }));
        mock.reply_err("/query?query=a", ErrorInfo::DecodeFailure);

        let first = mock.get("/query", &[("query", "a")]).await;
        let second = mock.get("/query", &[("query", "a")]).await;
        let third = mock.get("/query", &[("query", "a")]).await;

        assert_eq!(first.unwrap()["answer"], "first");
        assert_eq!(second.unwrap_err(), ErrorInfo::DecodeFailure);
        assert_eq!(third.unwrap_err(), ErrorInfo::HttpStatusFailure(404));
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_gated_reply_waits_for_release() {
        let mock = Arc::new(MockTransport::new());
        let gate = mock.reply_gated("/search?query=slow", Ok(json!({ "results": [] })));

        let pending = tokio::spawn({
            let mock = Arc::clone(&mock);
            async move { mock.get("/search", &[("query", "slow")]).await }
        });

        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        gate.notify_one();
        assert!(pending.await.unwrap().is_ok());
        assert_eq!(mock.calls(), vec!["/search?query=slow".to_string()]);
    }
}
