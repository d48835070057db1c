//! CallResult - 디스패처가 돌려주는 유일한 결과 형태
//!
//! 모든 에러는 여기서 `success` / `isError` / `errorMessage`로 평탄화된다.

use super::adapter::AdapterOutcome;
use super::error::{BridgeError, ErrorKind};
use super::types::{first_text, JsonRpcError, ResourcesListResult, ToolsListResult};
use super::types::{ResourceDescriptor, ToolDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 브릿지 호출 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallResult {
    /// 전송 계층에서 교환이 성공했는지
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,

    /// RPC 에러 또는 도구 실패
    #[serde(default)]
    pub is_error: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,

    pub response_time_ms: u64,
}

impl CallResult {
    pub fn ok(content: Value, response_time_ms: u64) -> Self {
        Self {
            success: true,
            content: Some(content),
            is_error: false,
            error_message: None,
            error_kind: None,
            response_time_ms,
        }
    }

    /// 에러 → 결과
    ///
    /// RPC/애플리케이션 에러는 교환 자체는 성공이므로 `success=true`.
    pub fn from_error(err: &BridgeError, response_time_ms: u64) -> Self {
        let kind = err.kind();
        let exchanged = matches!(kind, ErrorKind::Rpc | ErrorKind::Application);
        let message = match err {
            BridgeError::Rpc { message, .. } => message.clone(),
            other => other.to_string(),
        };

        Self {
            success: exchanged,
            content: None,
            is_error: exchanged,
            error_message: Some(message),
            error_kind: Some(kind),
            response_time_ms,
        }
    }

    /// 호출측 HTTP 핸들러용 상태 코드 (백엔드 도달 실패 502, 그 외 200)
    pub fn http_status_hint(&self) -> u16 {
        if self.success {
            200
        } else {
            502
        }
    }

    /// `tools/list` 결과 해석
    pub fn tool_descriptors(&self) -> Vec<ToolDescriptor> {
        self.content
            .clone()
            .and_then(|c| serde_json::from_value::<ToolsListResult>(c).ok())
            .map(|r| r.tools)
            .unwrap_or_default()
    }

    /// `resources/list` 결과 해석
    pub fn resource_descriptors(&self) -> Vec<ResourceDescriptor> {
        self.content
            .clone()
            .and_then(|c| serde_json::from_value::<ResourcesListResult>(c).ok())
            .map(|r| r.resources)
            .unwrap_or_default()
    }

    /// 첫 텍스트 콘텐츠
    pub fn text(&self) -> Option<String> {
        self.content.as_ref().and_then(first_text)
    }
}

/// 어댑터 결과 분류
pub fn classify(outcome: AdapterOutcome, response_time_ms: u64) -> CallResult {
    if let Some(err) = &outcome.error {
        return CallResult::from_error(err, response_time_ms);
    }

    let mut raw = outcome.raw;

    if let Some(error) = raw.get("error").and_then(JsonRpcError::from_response) {
        let err = BridgeError::Rpc {
            code: error.code,
            message: error.message,
        };
        return CallResult::from_error(&err, response_time_ms);
    }

    if let Some(result) = raw.remove("result") {
        let failed = result.get("isError").and_then(Value::as_bool) == Some(true);
        let content = match result.get("content") {
            Some(content) => content.clone(),
            None => result,
        };

        if failed {
            let message = first_text(&content).unwrap_or_else(|| "tool reported an error".into());
            let mut call = CallResult::from_error(&BridgeError::Application(message), response_time_ms);
            call.content = Some(content);
            return call;
        }
        return CallResult::ok(content, response_time_ms);
    }

    CallResult::ok(Value::Object(raw), response_time_ms)
}
