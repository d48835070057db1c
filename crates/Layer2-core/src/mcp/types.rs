//! MCP Types - JSON-RPC 봉투 및 MCP 페이로드 타입

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON-RPC 버전 문자열
pub const JSONRPC_VERSION: &str = "2.0";

pub const METHOD_INITIALIZE: &str = "initialize";
pub const METHOD_INITIALIZED: &str = "notifications/initialized";
pub const METHOD_TOOLS_LIST: &str = "tools/list";
pub const METHOD_TOOLS_CALL: &str = "tools/call";
pub const METHOD_RESOURCES_LIST: &str = "resources/list";

/// 디코더가 돌려주는 단일 JSON-RPC 메시지 (키 → 값)
pub type RpcMap = Map<String, Value>;

// ============================================================================
// JSON-RPC 2.0 봉투
// ============================================================================

/// JSON-RPC 2.0 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
    pub id: u64,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// JSON-RPC 알림 (id 없음, 응답 없음)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params: None,
        }
    }

    /// `notifications/initialized`
    pub fn initialized() -> Self {
        Self::new(METHOD_INITIALIZED)
    }
}

/// JSON-RPC 에러 객체
///
/// 백엔드마다 필드가 빠지는 경우가 있어 모두 기본값을 둔다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default = "JsonRpcError::unknown_message")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    fn unknown_message() -> String {
        "unknown JSON-RPC error".to_string()
    }

    /// 응답 맵의 `error` 값 해석 (객체가 아니면 None)
    pub fn from_response(error: &Value) -> Option<Self> {
        if !error.is_object() {
            return None;
        }
        Some(
            serde_json::from_value(error.clone())
                .unwrap_or_else(|_| Self::new(0, Self::unknown_message())),
        )
    }
}

// ============================================================================
// initialize
// ============================================================================

/// MCP 클라이언트 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// 클라이언트 roots capability
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootsCapability {
    pub list_changed: bool,
}

/// 클라이언트 capabilities (최소 구성)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCapabilities {
    pub roots: RootsCapability,
}

impl Default for ClientCapabilities {
    fn default() -> Self {
        Self {
            roots: RootsCapability { list_changed: true },
        }
    }
}

/// initialize 요청 파라미터
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    pub capabilities: ClientCapabilities,
    pub client_info: ClientInfo,
}

impl InitializeParams {
    pub fn new(protocol_version: impl Into<String>, client_info: ClientInfo) -> Self {
        Self {
            protocol_version: protocol_version.into(),
            capabilities: ClientCapabilities::default(),
            client_info,
        }
    }
}

/// MCP 서버 정보
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// initialize 응답 (로그용으로만 해석)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    #[serde(default)]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub server_info: Option<ServerInfo>,
    #[serde(default)]
    pub capabilities: Value,
}

// ============================================================================
// tools / resources
// ============================================================================

/// MCP 서버에서 제공하는 도구 정보
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// 도구 이름
    pub name: String,

    /// 도구 설명
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// 입력 스키마 (JSON Schema)
    #[serde(default)]
    pub input_schema: Value,
}

/// MCP 서버에서 제공하는 리소스 정보
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub uri: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// tools/list 결과
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsListResult {
    #[serde(default)]
    pub tools: Vec<ToolDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// resources/list 결과
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesListResult {
    #[serde(default)]
    pub resources: Vec<ResourceDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// `tools/call` 파라미터
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallParams {
    /// 도구 이름
    #[serde(default)]
    pub name: String,

    /// 인자 (없으면 빈 객체)
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCallParams {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        let arguments = if arguments.is_null() {
            Value::Object(Map::new())
        } else {
            arguments
        };
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// 호출자가 넘긴 params 해석 (형태가 맞지 않으면 이름 없는 빈 호출)
    pub fn from_params(params: &Value) -> Self {
        let parsed: Self = serde_json::from_value(params.clone()).unwrap_or_default();
        Self::new(parsed.name, parsed.arguments)
    }

    /// `{"name": .., "arguments": {..}}`
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert("arguments".to_string(), self.arguments.clone());
        Value::Object(map)
    }
}

/// 콘텐츠 배열(JSON)에서 첫 텍스트 블록 추출
pub fn first_text(content: &Value) -> Option<String> {
    content
        .as_array()?
        .iter()
        .find(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
