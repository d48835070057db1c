//! Call Dispatcher - 브릿지의 공개 진입점
//!
//! Target의 전송 방식으로 어댑터를 고르고, 필요하면 핸드셰이크를 돌린 뒤
//! 메서드를 호출해 `CallResult`로 분류한다.
//!
//! 호출 간에 공유되는 가변 상태는 없다. 세션은 호출 하나 안에서만 살고,
//! 하나의 데드라인이 핸드셰이크부터 응답까지 전체를 감싼다.

use super::adapter::{
    AdapterOutcome, CallContext, HandshakeMode, LegacyHttpAdapter, SseAdapter,
    StreamableHttpAdapter, TransportAdapter,
};
use super::decoder::{FrameDecoder, SniffingDecoder};
use super::error::BridgeError;
use super::exchange::{HttpExchange, ReqwestExchange};
use super::handshake::HandshakeCoordinator;
use super::result::{classify, CallResult};
use super::target::Target;
use super::types::{
    ToolCallParams, METHOD_INITIALIZE, METHOD_RESOURCES_LIST, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use switchboard_foundation::{BridgeLimits, McpTransport};
use tracing::{debug, info, warn};

/// 브릿지 디스패처
pub struct Dispatcher {
    adapters: HashMap<McpTransport, Arc<dyn TransportAdapter>>,
    exchange: Arc<dyn HttpExchange>,
    decoder: Arc<dyn FrameDecoder>,
    limits: BridgeLimits,
}

impl Dispatcher {
    /// reqwest 기반 디스패처
    pub fn new() -> Result<Self, BridgeError> {
        Ok(Self::with_exchange(Arc::new(ReqwestExchange::new()?)))
    }

    /// 주어진 HTTP 교환 구현으로 생성 (세 어댑터 기본 등록)
    pub fn with_exchange(exchange: Arc<dyn HttpExchange>) -> Self {
        let mut dispatcher = Self {
            adapters: HashMap::new(),
            exchange,
            decoder: Arc::new(SniffingDecoder),
            limits: BridgeLimits::default(),
        };
        dispatcher.register(Arc::new(LegacyHttpAdapter));
        dispatcher.register(Arc::new(SseAdapter));
        dispatcher.register(Arc::new(StreamableHttpAdapter));
        dispatcher
    }

    pub fn with_limits(mut self, limits: BridgeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn FrameDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// 어댑터 등록 (같은 전송 방식이면 교체)
    pub fn register(&mut self, adapter: Arc<dyn TransportAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    pub fn limits(&self) -> &BridgeLimits {
        &self.limits
    }

    /// 실제 데드라인: 호출 인자 → Target → 메서드별 기본값
    pub fn effective_timeout(
        &self,
        target: &Target,
        method: &str,
        timeout_override: Option<u64>,
    ) -> Duration {
        timeout_override
            .filter(|secs| *secs > 0)
            .or(target.timeout_secs.filter(|secs| *secs > 0))
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.limits.default_timeout_for(method))
    }

    /// MCP 메서드 호출
    ///
    /// 어떤 실패도 `CallResult`로 돌려준다.
    pub async fn invoke(
        &self,
        target: &Target,
        method: &str,
        params: Value,
        timeout_override: Option<u64>,
    ) -> CallResult {
        let adapter = match target
            .transport_kind()
            .and_then(|kind| self.adapter_for(kind, target))
        {
            Ok(adapter) => adapter,
            Err(e) => {
                warn!("Rejecting call to {}: {}", target.url, e);
                return CallResult::from_error(&e, 0);
            }
        };

        let timeout = self.effective_timeout(target, method, timeout_override);
        info!(
            "MCP {} -> {} ({}, timeout {}s)",
            method,
            target.url,
            adapter.kind(),
            timeout.as_secs()
        );

        let started = Instant::now();
        let outcome = match tokio::time::timeout(
            timeout,
            self.run(adapter.as_ref(), target, method, params),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("MCP {} to {} timed out after {:?}", method, target.url, timeout);
                AdapterOutcome::failed(BridgeError::timed_out(timeout))
            }
        };
        let elapsed = started.elapsed().as_millis() as u64;

        let result = classify(outcome, elapsed);
        debug!(
            "MCP {} <- {}: success={} isError={} ({}ms)",
            method, target.url, result.success, result.is_error, elapsed
        );
        result
    }

    fn adapter_for(
        &self,
        kind: McpTransport,
        target: &Target,
    ) -> Result<Arc<dyn TransportAdapter>, BridgeError> {
        self.adapters
            .get(&kind)
            .cloned()
            .ok_or_else(|| BridgeError::UnsupportedTransport(target.transport.clone()))
    }

    /// 핸드셰이크 + 호출 (데드라인 안에서 실행)
    async fn run(
        &self,
        adapter: &dyn TransportAdapter,
        target: &Target,
        method: &str,
        params: Value,
    ) -> AdapterOutcome {
        let mut call = CallContext::new(
            target,
            target.protocol_version_for(adapter.kind()),
            self.exchange.as_ref(),
            self.decoder.as_ref(),
            &self.limits,
        );
        let is_initialize = method == METHOD_INITIALIZE;

        match adapter.handshake() {
            HandshakeMode::Required => {
                let handshake = HandshakeCoordinator::new().run(&call, &target.url).await;
                match handshake {
                    // initialize 자체를 요청했다면 핸드셰이크 응답이 곧 결과
                    Ok(outcome) if is_initialize => return outcome.initialize,
                    Ok(outcome) => call.session = outcome.session,
                    Err(e) => return AdapterOutcome::failed(e),
                }
            }
            HandshakeMode::Opportunistic if !is_initialize => {
                let handshake = HandshakeCoordinator::new().run(&call, &target.url).await;
                match handshake {
                    Ok(outcome) => call.session = outcome.session,
                    Err(e) => debug!("Optional handshake with {} failed: {}", target.url, e),
                }
            }
            _ => {}
        }

        let params = if is_initialize && is_blank(&params) {
            call.initialize_params()
        } else {
            params
        };

        adapter.invoke(&call, method, params).await
    }

    // ========================================================================
    // Convenience
    // ========================================================================

    /// 연결 테스트 (initialize)
    pub async fn test_connection(&self, target: &Target) -> CallResult {
        self.invoke(target, METHOD_INITIALIZE, Value::Null, None).await
    }

    pub async fn list_tools(&self, target: &Target) -> CallResult {
        self.invoke(target, METHOD_TOOLS_LIST, json!({}), None).await
    }

    pub async fn call_tool(&self, target: &Target, name: &str, arguments: Value) -> CallResult {
        let params = ToolCallParams::new(name, arguments).to_value();
        self.invoke(target, METHOD_TOOLS_CALL, params, None).await
    }

    pub async fn list_resources(&self, target: &Target) -> CallResult {
        self.invoke(target, METHOD_RESOURCES_LIST, json!({}), None).await
    }
}

fn is_blank(params: &Value) -> bool {
    match params {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::error::ErrorKind;
    use crate::mcp::exchange::{InboundResponse, OutboundRequest, HEADER_SESSION_ID};
    use crate::mcp::testing::ScriptedExchange;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn rpc_ok(req: &OutboundRequest, result: Value) -> InboundResponse {
        let id = req.body.as_ref().and_then(|b| b.get("id")).cloned();
        InboundResponse::new(200).with_json(&json!({"jsonrpc": "2.0", "result": result, "id": id}))
    }

    /// initialize마다 새 세션을 발급하는 스트리머블 백엔드
    fn streamable_backend() -> Arc<ScriptedExchange> {
        let issued = AtomicUsize::new(0);
        Arc::new(ScriptedExchange::new(move |req| match req.rpc_method() {
            Some("initialize") => {
                let n = issued.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(rpc_ok(req, json!({"protocolVersion": "2025-11-25"}))
                    .with_header("MCP-Session-Id", format!("s-{}", n)))
            }
            Some("notifications/initialized") => Ok(InboundResponse::new(202)),
            Some("tools/list") => Ok(rpc_ok(req, json!({"tools": [{"name": "echo"}]}))),
            Some(other) => Ok(InboundResponse::new(200).with_json(&json!({
                "jsonrpc": "2.0",
                "error": {"code": -32601, "message": format!("Method not found: {}", other)},
                "id": req.body.as_ref().and_then(|b| b.get("id")).cloned()
            }))),
            None => Ok(InboundResponse::new(400)),
        }))
    }

    #[tokio::test]
    async fn test_unknown_transport_makes_no_calls() {
        let exchange = Arc::new(ScriptedExchange::refusing());
        let dispatcher = Dispatcher::with_exchange(exchange.clone());

        let result = dispatcher
            .invoke(&Target::new("http://x", "carrier-pigeon"), "tools/list", json!({}), None)
            .await;

        assert!(!result.success);
        assert_eq!(
            result.error_message.as_deref(),
            Some("unsupported transport type: carrier-pigeon")
        );
        assert_eq!(result.error_kind, Some(ErrorKind::Unsupported));
        assert_eq!(result.response_time_ms, 0);
        assert_eq!(exchange.call_count(), 0);
    }

    #[tokio::test]
    async fn test_each_invoke_runs_its_own_handshake() {
        let exchange = streamable_backend();
        let dispatcher = Dispatcher::with_exchange(exchange.clone());
        let target = Target::streamable_http("http://mock:9001/mcp");

        assert!(dispatcher.list_tools(&target).await.success);
        assert!(dispatcher.list_tools(&target).await.success);

        let sent = exchange.requests();
        let methods: Vec<_> = sent.iter().map(|r| r.rpc_method().unwrap_or("")).collect();
        assert_eq!(
            methods,
            vec![
                "initialize",
                "notifications/initialized",
                "tools/list",
                "initialize",
                "notifications/initialized",
                "tools/list"
            ]
        );
        assert_eq!(sent[2].header_value(HEADER_SESSION_ID), Some("s-1"));
        assert_eq!(sent[5].header_value(HEADER_SESSION_ID), Some("s-2"));
        assert!(sent[3].header_value(HEADER_SESSION_ID).is_none());

        // 호출마다 ID는 1부터
        assert_eq!(sent[0].body.as_ref().unwrap()["id"], 1);
        assert_eq!(sent[2].body.as_ref().unwrap()["id"], 2);
        assert_eq!(sent[3].body.as_ref().unwrap()["id"], 1);
    }

    #[tokio::test]
    async fn test_rpc_error_is_flagged() {
        let dispatcher = Dispatcher::with_exchange(streamable_backend());
        let target = Target::streamable_http("http://mock:9001/mcp");

        let result = dispatcher.invoke(&target, "foo", json!({}), None).await;
        assert!(result.success);
        assert!(result.is_error);
        assert_eq!(result.error_message.as_deref(), Some("Method not found: foo"));
    }

    #[tokio::test]
    async fn test_initialize_is_the_handshake() {
        let exchange = streamable_backend();
        let dispatcher = Dispatcher::with_exchange(exchange.clone());
        let target = Target::streamable_http("http://mock:9001/mcp");

        let result = dispatcher.test_connection(&target).await;
        assert!(result.success);
        assert_eq!(result.content, Some(json!({"protocolVersion": "2025-11-25"})));
        // initialize + notification, 중복 initialize 없음
        assert_eq!(exchange.call_count(), 2);
    }

    #[tokio::test]
    async fn test_required_handshake_failure_short_circuits() {
        let exchange = Arc::new(ScriptedExchange::refusing());
        let dispatcher = Dispatcher::with_exchange(exchange.clone());

        let result = dispatcher
            .list_tools(&Target::streamable_http("http://down:9001/mcp"))
            .await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::Connection));
        assert_eq!(exchange.call_count(), 1);
    }

    #[tokio::test]
    async fn test_sse_fallback_used_exactly_once() {
        let exchange = Arc::new(ScriptedExchange::new(|req| {
            if req.url == "http://relay:7000/message" {
                Ok(rpc_ok(req, json!({"tools": []})))
            } else {
                Err(BridgeError::Connection("connection refused".into()))
            }
        }));
        let dispatcher = Dispatcher::with_exchange(exchange.clone());

        let result = dispatcher.list_tools(&Target::sse("http://relay:7000")).await;
        assert!(result.success, "{:?}", result.error_message);
        assert_eq!(exchange.calls_to("http://relay:7000/message"), 1);

        // 핸드셰이크 시도(실패) + 기본 경로 + 폴백
        assert_eq!(exchange.call_count(), 3);
    }

    #[tokio::test]
    async fn test_sse_uses_session_from_optional_handshake() {
        let exchange = streamable_backend();
        let dispatcher = Dispatcher::with_exchange(exchange.clone());

        let result = dispatcher.list_tools(&Target::sse("http://relay:7000")).await;
        assert!(result.success);

        let sent = exchange.requests();
        assert_eq!(sent[0].header_value("MCP-Protocol-Version"), Some("2024-11-05"));
        assert_eq!(sent[2].header_value(HEADER_SESSION_ID), Some("s-1"));
    }

    #[tokio::test]
    async fn test_legacy_http_has_no_handshake() {
        let exchange = Arc::new(ScriptedExchange::new(|_| {
            Ok(InboundResponse::new(200).with_json(&json!({"tools": [{"name": "echo"}]})))
        }));
        let dispatcher = Dispatcher::with_exchange(exchange.clone());

        let result = dispatcher.list_tools(&Target::http("http://old:8080")).await;
        assert!(result.success);
        assert_eq!(result.content.as_ref().unwrap()["toolCount"], 1);
        assert_eq!(result.tool_descriptors()[0].name, "echo");
        assert_eq!(exchange.requests()[0].url, "http://old:8080/tools/list");
    }

    #[tokio::test]
    async fn test_legacy_string_error_is_reported() {
        let exchange = Arc::new(ScriptedExchange::new(|_| {
            Ok(InboundResponse::new(200).with_json(&json!({"error": "tool not found"})))
        }));
        let dispatcher = Dispatcher::with_exchange(exchange.clone());

        let result = dispatcher
            .call_tool(&Target::http("http://old:8080"), "missing", Value::Null)
            .await;
        assert!(result.success);
        assert!(result.is_error);
        assert_eq!(result.error_message.as_deref(), Some("tool not found"));
        assert_eq!(result.error_kind, Some(ErrorKind::Rpc));
        assert_eq!(
            exchange.requests()[0].body,
            Some(json!({"name": "missing", "arguments": {}}))
        );
    }

    #[tokio::test]
    async fn test_application_error_passthrough() {
        let exchange = Arc::new(ScriptedExchange::new(|req| match req.rpc_method() {
            Some("tools/call") => Ok(rpc_ok(
                req,
                json!({"content": [{"type": "text", "text": "disk full"}], "isError": true}),
            )),
            _ => Ok(rpc_ok(req, json!({}))),
        }));
        let dispatcher = Dispatcher::with_exchange(exchange);

        let result = dispatcher
            .call_tool(&Target::streamable_http("http://mock/mcp"), "write", json!({}))
            .await;
        assert!(result.success);
        assert!(result.is_error);
        assert_eq!(result.error_message.as_deref(), Some("disk full"));
        assert_eq!(result.http_status_hint(), 200);
    }

    struct StallingExchange;

    #[async_trait]
    impl HttpExchange for StallingExchange {
        async fn send(&self, _request: OutboundRequest) -> Result<InboundResponse, BridgeError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(InboundResponse::new(200))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_covers_whole_sequence() {
        let dispatcher = Dispatcher::with_exchange(Arc::new(StallingExchange));
        let target = Target::streamable_http("http://slow/mcp").with_timeout(20);

        let result = dispatcher.invoke(&target, "tools/list", json!({}), Some(1)).await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::Connection));
        assert_eq!(
            result.error_message.as_deref(),
            Some("connection error: request timed out after 1s")
        );
        assert!(result.response_time_ms < 5_000);
    }

    #[test]
    fn test_effective_timeout() {
        let dispatcher = Dispatcher::with_exchange(Arc::new(ScriptedExchange::refusing()));
        let target = Target::streamable_http("http://x");

        assert_eq!(
            dispatcher.effective_timeout(&target, "initialize", None),
            Duration::from_secs(10)
        );
        assert_eq!(
            dispatcher.effective_timeout(&target, "tools/call", None),
            Duration::from_secs(30)
        );
        assert_eq!(
            dispatcher.effective_timeout(&target, "tools/call", Some(0)),
            Duration::from_secs(30)
        );

        let target = target.with_timeout(7);
        assert_eq!(
            dispatcher.effective_timeout(&target, "tools/call", None),
            Duration::from_secs(7)
        );
        assert_eq!(
            dispatcher.effective_timeout(&target, "tools/call", Some(3)),
            Duration::from_secs(3)
        );
    }
}
