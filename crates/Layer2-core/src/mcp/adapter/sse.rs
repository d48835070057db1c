//! SSE 어댑터
//!
//! base URL에 Streamable HTTP 방식으로 POST하고, 바이트 교환 전에 실패하면
//! 레거시 SSE 릴레이 엔드포인트(`{url}/message`)로 한 번만 다시 보낸다.

use super::{exchange, AdapterOutcome, CallContext, HandshakeMode, TransportAdapter};
use async_trait::async_trait;
use serde_json::Value;
use switchboard_foundation::McpTransport;
use tracing::warn;

/// 레거시 SSE 릴레이 경로
const MESSAGE_PATH: &str = "message";

#[derive(Debug, Default, Clone, Copy)]
pub struct SseAdapter;

impl SseAdapter {
    pub fn fallback_url(call: &CallContext<'_>) -> String {
        format!("{}/{}", call.endpoint(), MESSAGE_PATH)
    }
}

#[async_trait]
impl TransportAdapter for SseAdapter {
    fn kind(&self) -> McpTransport {
        McpTransport::Sse
    }

    fn handshake(&self) -> HandshakeMode {
        HandshakeMode::Opportunistic
    }

    async fn invoke(&self, call: &CallContext<'_>, method: &str, params: Value) -> AdapterOutcome {
        let body = call.envelope(method, params);

        let primary = exchange(call, call.jsonrpc_post(&call.target.url, body.clone())).await;
        match &primary.error {
            Some(err) if err.is_transport_failure() => {
                let fallback = Self::fallback_url(call);
                warn!(
                    "SSE endpoint {} unreachable ({}), retrying via {}",
                    call.target.url, err, fallback
                );
                exchange(call, call.jsonrpc_post(&fallback, body)).await
            }
            _ => primary,
        }
    }
}
