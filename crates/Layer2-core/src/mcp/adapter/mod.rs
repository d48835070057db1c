//! Transport Adapters - 전송 방식별 호출 매핑
//!
//! 세 어댑터 모두 같은 `invoke` 능력을 제공한다:
//! - `LegacyHttpAdapter`: REST 스타일 엔드포인트, 핸드셰이크 없음
//! - `SseAdapter`: base URL POST, 연결 실패 시 `/message`로 한 번 폴백
//! - `StreamableHttpAdapter`: 단일 엔드포인트 JSON-RPC, 세션 필수

mod legacy;
mod sse;
mod streamable;

pub use legacy::LegacyHttpAdapter;
pub use sse::SseAdapter;
pub use streamable::StreamableHttpAdapter;

use super::decoder::FrameDecoder;
use super::error::BridgeError;
use super::exchange::{
    HttpExchange, InboundResponse, OutboundRequest, ACCEPT_STREAMABLE, HEADER_ACCEPT,
    HEADER_PROTOCOL_VERSION, HEADER_SESSION_ID,
};
use super::handshake::Session;
use super::target::Target;
use super::types::{ClientInfo, InitializeParams, JsonRpcRequest, RpcMap};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use switchboard_foundation::{BridgeLimits, McpTransport};
use tracing::debug;

/// 어댑터가 요구하는 핸드셰이크 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeMode {
    /// 핸드셰이크 없음
    None,
    /// 실패하면 세션 없이 진행
    Opportunistic,
    /// 실패하면 호출 중단
    Required,
}

/// 호출 하나(핸드셰이크 + 메서드 호출) 동안만 살아있는 컨텍스트
pub struct CallContext<'a> {
    pub target: &'a Target,
    pub protocol_version: String,
    pub session: Option<Session>,
    pub exchange: &'a dyn HttpExchange,
    pub decoder: &'a dyn FrameDecoder,
    pub limits: &'a BridgeLimits,
    next_id: AtomicU64,
}

impl<'a> CallContext<'a> {
    pub fn new(
        target: &'a Target,
        protocol_version: String,
        exchange: &'a dyn HttpExchange,
        decoder: &'a dyn FrameDecoder,
        limits: &'a BridgeLimits,
    ) -> Self {
        Self {
            target,
            protocol_version,
            session: None,
            exchange,
            decoder,
            limits,
            next_id: AtomicU64::new(1),
        }
    }

    /// 호출 내 요청 ID (1부터 순차 증가)
    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn endpoint(&self) -> &str {
        self.target.endpoint()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.id.as_str())
    }

    pub fn client_info(&self) -> ClientInfo {
        ClientInfo {
            name: self.limits.client_name.clone(),
            version: self.limits.client_version.clone(),
        }
    }

    /// 기본 initialize 파라미터
    pub fn initialize_params(&self) -> Value {
        serde_json::to_value(InitializeParams::new(
            self.protocol_version.clone(),
            self.client_info(),
        ))
        .unwrap_or(Value::Null)
    }

    /// JSON-RPC 요청 봉투 생성
    pub fn envelope(&self, method: &str, params: Value) -> Value {
        serde_json::to_value(JsonRpcRequest::new(self.next_id(), method, params))
            .unwrap_or(Value::Null)
    }

    /// Streamable HTTP 규격 헤더를 붙인 POST
    pub fn jsonrpc_post(&self, url: &str, body: Value) -> OutboundRequest {
        let request = OutboundRequest::post(url, body)
            .header(HEADER_ACCEPT, ACCEPT_STREAMABLE)
            .header(HEADER_PROTOCOL_VERSION, self.protocol_version.clone());

        match self.session_id() {
            Some(sid) => request.header(HEADER_SESSION_ID, sid),
            None => request,
        }
    }
}

/// 어댑터 호출 결과: 원시 메시지 + 전송/프로토콜 에러
#[derive(Debug, Clone, Default)]
pub struct AdapterOutcome {
    pub raw: RpcMap,
    pub error: Option<BridgeError>,
}

impl AdapterOutcome {
    pub fn ok(raw: RpcMap) -> Self {
        Self { raw, error: None }
    }

    pub fn failed(error: BridgeError) -> Self {
        Self {
            raw: RpcMap::new(),
            error: Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// HTTP 응답 → AdapterOutcome
///
/// - 상태 ≥ 400: ProtocolError (본문의 JSON-RPC 에러 메시지를 덧붙임)
/// - 비어있지 않은 본문이 해석되지 않으면: ProtocolError
/// - 빈 본문(202/204 등): 빈 메시지
pub fn decode_response(decoder: &dyn FrameDecoder, response: &InboundResponse) -> AdapterOutcome {
    let raw = decoder.normalize(&response.body, response.content_type());

    if response.is_error_status() {
        let detail = raw
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str);
        return AdapterOutcome::failed(BridgeError::http_status(response.status, detail));
    }

    if raw.is_empty() && !response.body_is_blank() {
        debug!(
            "Undecodable response body ({} bytes, content-type '{}')",
            response.body.len(),
            response.content_type()
        );
        return AdapterOutcome::failed(BridgeError::Protocol(format!(
            "undecodable response body (HTTP {}, content-type '{}')",
            response.status,
            response.content_type()
        )));
    }

    AdapterOutcome::ok(raw)
}

/// 요청 전송 후 디코딩
pub(crate) async fn exchange(call: &CallContext<'_>, request: OutboundRequest) -> AdapterOutcome {
    match call.exchange.send(request).await {
        Ok(response) => decode_response(call.decoder, &response),
        Err(e) => AdapterOutcome::failed(e),
    }
}

/// 전송 방식 어댑터
#[async_trait]
pub trait TransportAdapter: Send + Sync {
    /// 담당 전송 방식
    fn kind(&self) -> McpTransport;

    /// 핸드셰이크 요구 수준
    fn handshake(&self) -> HandshakeMode;

    /// MCP 메서드 호출
    async fn invoke(&self, call: &CallContext<'_>, method: &str, params: Value) -> AdapterOutcome;
}
