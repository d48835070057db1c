//! 테스트용 HttpExchange 대역
//!
//! 요청을 모두 기록하고, 스크립트 클로저로 응답을 만든다.

use super::error::BridgeError;
use super::exchange::{HttpExchange, InboundResponse, OutboundRequest};
use async_trait::async_trait;
use parking_lot::Mutex;

type Script = dyn Fn(&OutboundRequest) -> Result<InboundResponse, BridgeError> + Send + Sync;

pub struct ScriptedExchange {
    script: Box<Script>,
    log: Mutex<Vec<OutboundRequest>>,
}

impl ScriptedExchange {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&OutboundRequest) -> Result<InboundResponse, BridgeError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            log: Mutex::new(Vec::new()),
        }
    }

    /// 모든 연결을 거부
    pub fn refusing() -> Self {
        Self::new(|req| {
            Err(BridgeError::Connection(format!(
                "failed to connect to {}: connection refused",
                req.url
            )))
        })
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.log.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.log.lock().len()
    }

    /// 특정 URL로 간 요청 수
    pub fn calls_to(&self, url: &str) -> usize {
        self.log.lock().iter().filter(|r| r.url == url).count()
    }
}

#[async_trait]
impl HttpExchange for ScriptedExchange {
    async fn send(&self, request: OutboundRequest) -> Result<InboundResponse, BridgeError> {
        let response = (self.script)(&request);
        self.log.lock().push(request);
        response
    }
}
