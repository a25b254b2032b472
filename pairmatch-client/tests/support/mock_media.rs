use async_trait::async_trait;
use pairmatch_client::error::{ClientError, Result};
use pairmatch_client::media::MediaSession;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Mock media transport that records every call in order.
#[derive(Clone, Default)]
pub struct MockMedia {
    pub calls: Arc<Mutex<Vec<String>>>,
    /// How many leading `subscribe_remote` calls fail.
    pub failing_subscribes: Arc<Mutex<u32>>,
}

impl MockMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_subscribe(times: u32) -> Self {
        let media = Self::new();
        *media.failing_subscribes.lock().unwrap() = times;
        media
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl MediaSession for MockMedia {
    async fn create_offer(&mut self) -> Result<Value> {
        self.record("create_offer");
        Ok(json!({"type": "offer", "sdp": "mock-offer"}))
    }

    async fn create_answer(&mut self, _offer: &Value) -> Result<Value> {
        self.record("create_answer");
        Ok(json!({"type": "answer", "sdp": "mock-answer"}))
    }

    async fn set_remote_answer(&mut self, _answer: &Value) -> Result<()> {
        self.record("set_remote_answer");
        Ok(())
    }

    async fn add_remote_candidate(&mut self, candidate: &Value) -> Result<()> {
        self.record(format!("candidate:{}", candidate["id"].as_str().unwrap_or("?")));
        Ok(())
    }

    async fn subscribe_remote(&mut self) -> Result<()> {
        let mut failing = self.failing_subscribes.lock().unwrap();
        if *failing > 0 {
            *failing -= 1;
            self.record("subscribe:err");
            return Err(ClientError::Negotiation("channel not ready".to_string()));
        }
        self.record("subscribe:ok");
        Ok(())
    }

    fn close(&mut self) {
        self.record("close");
    }
}
