//! Streamable HTTP 어댑터
//!
//! 모든 메서드가 `target.url` 하나로 간다. 응답은 JSON 또는 SSE 프레임.

use super::{exchange, AdapterOutcome, CallContext, HandshakeMode, TransportAdapter};
use async_trait::async_trait;
use serde_json::Value;
use switchboard_foundation::McpTransport;

#[derive(Debug, Default, Clone, Copy)]
pub struct StreamableHttpAdapter;

#[async_trait]
impl TransportAdapter for StreamableHttpAdapter {
    fn kind(&self) -> McpTransport {
        McpTransport::StreamableHttp
    }

    fn handshake(&self) -> HandshakeMode {
        HandshakeMode::Required
    }

    async fn invoke(&self, call: &CallContext<'_>, method: &str, params: Value) -> AdapterOutcome {
        let body = call.envelope(method, params);
        exchange(call, call.jsonrpc_post(&call.target.url, body)).await
    }
}
