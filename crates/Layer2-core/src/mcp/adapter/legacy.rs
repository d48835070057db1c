//! Legacy HTTP 어댑터
//!
//! JSON-RPC 봉투 없이 메서드별 REST 엔드포인트를 호출한다.
//!
//! | 메서드 | 요청 |
//! |--------|------|
//! | `initialize` | `POST {url}/initialize` |
//! | `tools/list` | `POST {url}/tools/list` |
//! | `tools/call` | `POST {url}/tools/call` (`{name, arguments}`) |
//! | `resources/list` | `GET {url}/resources/list` |
//! | 그 외 | `POST {url}/{method}` |

use super::{exchange, AdapterOutcome, CallContext, HandshakeMode, TransportAdapter};
use crate::mcp::exchange::OutboundRequest;
use crate::mcp::types::{
    RpcMap, ToolCallParams, METHOD_RESOURCES_LIST, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use switchboard_foundation::McpTransport;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyHttpAdapter;

impl LegacyHttpAdapter {
    fn request(call: &CallContext<'_>, method: &str, params: Value) -> OutboundRequest {
        let url = format!("{}/{}", call.endpoint(), method.trim_start_matches('/'));

        match method {
            METHOD_RESOURCES_LIST => OutboundRequest::get(url),
            METHOD_TOOLS_CALL => {
                OutboundRequest::post(url, ToolCallParams::from_params(&params).to_value())
            }
            _ if params.is_null() => OutboundRequest::post(url, json!({})),
            _ => OutboundRequest::post(url, params),
        }
    }

    /// 봉투 없는 응답을 `{"result": ...}`로 감싼다
    ///
    /// REST 백엔드가 보내는 `{"error": "..."}`는 `{"error": {"message": "..."}}`로 바꾼다.
    fn wrap(mut raw: RpcMap) -> RpcMap {
        if let Some(Value::String(message)) = raw.get("error") {
            let message = message.clone();
            raw.insert("error".to_string(), json!({ "message": message }));
            return raw;
        }
        if raw.contains_key("result") || raw.contains_key("error") {
            return raw;
        }
        let mut wrapped = RpcMap::new();
        wrapped.insert("result".to_string(), Value::Object(raw));
        wrapped
    }

    /// 도구 목록 크기 제한: `cap`개 초과면 개수만 보고
    pub fn cap_tool_list(raw: RpcMap, cap: usize) -> RpcMap {
        let tools = raw
            .get("result")
            .and_then(|r| r.get("tools"))
            .or_else(|| raw.get("tools"))
            .and_then(Value::as_array)
            .cloned();

        let Some(tools) = tools else {
            return raw;
        };

        let count = tools.len();
        let mut result = RpcMap::new();
        result.insert("toolCount".to_string(), json!(count));
        if count > cap {
            debug!("Tool list of {} exceeds cap {}, reporting count only", count, cap);
        } else {
            result.insert("tools".to_string(), Value::Array(tools));
        }

        let mut capped = RpcMap::new();
        capped.insert("result".to_string(), Value::Object(result));
        capped
    }
}

#[async_trait]
impl TransportAdapter for LegacyHttpAdapter {
    fn kind(&self) -> McpTransport {
        McpTransport::Http
    }

    fn handshake(&self) -> HandshakeMode {
        HandshakeMode::None
    }

    async fn invoke(&self, call: &CallContext<'_>, method: &str, params: Value) -> AdapterOutcome {
        let outcome = exchange(call, Self::request(call, method, params)).await;
        if outcome.is_failed() {
            return outcome;
        }

        let raw = Self::wrap(outcome.raw);
        let raw = if method == METHOD_TOOLS_LIST {
            Self::cap_tool_list(raw, call.limits.tool_list_cap)
        } else {
            raw
        };
        AdapterOutcome::ok(raw)
    }
}
