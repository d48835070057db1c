//! Mock MCP backend for integration tests
//!
//! Streamable HTTP 백엔드를 wiremock `Respond`로 흉내낸다.
//! 세션은 백엔드 인스턴스가 소유한 `SessionRegistry`에만 저장된다.

#![allow(dead_code)]

use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use wiremock::{Request, Respond, ResponseTemplate};

/// 발급된 세션 목록
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, bool>>,
}

impl SessionRegistry {
    /// 새 세션 발급 (아직 initialized 통지 전)
    pub fn open(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.sessions.lock().insert(id.clone(), false);
        id
    }

    pub fn mark_initialized(&self, id: &str) -> bool {
        match self.sessions.lock().get_mut(id) {
            Some(flag) => {
                *flag = true;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.lock().contains_key(id)
    }

    pub fn is_initialized(&self, id: &str) -> bool {
        self.sessions.lock().get(id).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn ids(&self) -> Vec<String> {
        self.sessions.lock().keys().cloned().collect()
    }
}

/// 응답 프레이밍
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    Json,
    Sse,
}

/// 결정적인 Streamable HTTP MCP 백엔드
#[derive(Clone)]
pub struct MockMcpBackend {
    pub sessions: Arc<SessionRegistry>,
    framing: Framing,
}

impl MockMcpBackend {
    pub fn new(framing: Framing) -> Self {
        Self {
            sessions: Arc::new(SessionRegistry::default()),
            framing,
        }
    }

    fn reply(&self, status: u16, message: Value) -> ResponseTemplate {
        match self.framing {
            Framing::Json => ResponseTemplate::new(status).set_body_json(message),
            Framing::Sse => ResponseTemplate::new(status).set_body_raw(
                format!("event: message\ndata: {}\n\n", message),
                "text/event-stream",
            ),
        }
    }

    fn rpc_result(&self, id: &Value, result: Value) -> ResponseTemplate {
        self.reply(200, json!({"jsonrpc": "2.0", "result": result, "id": id}))
    }

    fn rpc_error(&self, status: u16, id: &Value, code: i64, message: String) -> ResponseTemplate {
        self.reply(
            status,
            json!({"jsonrpc": "2.0", "error": {"code": code, "message": message}, "id": id}),
        )
    }

    fn session_of(request: &Request) -> Option<String> {
        request
            .headers
            .get("mcp-session-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

impl Respond for MockMcpBackend {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return self.rpc_error(400, &Value::Null, -32700, "Parse error".into()),
        };
        let id = body.get("id").cloned().unwrap_or(Value::Null);
        let method = body.get("method").and_then(Value::as_str).unwrap_or("");

        if method == "initialize" {
            let session = self.sessions.open();
            return self
                .rpc_result(
                    &id,
                    json!({
                        "protocolVersion": body["params"]["protocolVersion"],
                        "capabilities": {"tools": {}, "resources": {}},
                        "serverInfo": {"name": "mock-mcp", "version": "1.0.0"}
                    }),
                )
                .insert_header("MCP-Session-Id", session.as_str());
        }

        let session = match Self::session_of(request) {
            Some(session) if self.sessions.contains(&session) => session,
            _ => return self.rpc_error(404, &id, -32001, "Session not found".into()),
        };

        match method {
            "notifications/initialized" => {
                self.sessions.mark_initialized(&session);
                ResponseTemplate::new(202)
            }
            "tools/list" => self.rpc_result(
                &id,
                json!({"tools": [{
                    "name": "echo",
                    "description": "Echoes its arguments",
                    "inputSchema": {
                        "type": "object",
                        "properties": {"message": {"type": "string"}}
                    }
                }]}),
            ),
            "tools/call" => {
                let name = body["params"]["name"].as_str().unwrap_or("");
                let text = format!(
                    "Mock result for tool '{}' with args: {}",
                    name,
                    go_format(&body["params"]["arguments"])
                );
                self.rpc_result(&id, json!({"content": [{"type": "text", "text": text}]}))
            }
            "resources/list" => self.rpc_result(
                &id,
                json!({"resources": [{
                    "uri": "file:///mock/readme.txt",
                    "name": "readme",
                    "mimeType": "text/plain"
                }]}),
            ),
            other => self.rpc_error(200, &id, -32601, format!("Method not found: {}", other)),
        }
    }
}

/// `map[k:v ...]` 형식 (키 정렬)
pub fn go_format(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();
            let entries: Vec<String> = keys
                .into_iter()
                .map(|k| format!("{}:{}", k, go_format(&map[k])))
                .collect();
            format!("map[{}]", entries.join(" "))
        }
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(go_format).collect();
            format!("[{}]", items.join(" "))
        }
        Value::String(s) => s.clone(),
        Value::Null => "map[]".to_string(),
        other => other.to_string(),
    }
}

/// 레거시 HTTP 백엔드가 돌려줄 도구 목록
pub fn legacy_tools(n: usize) -> Value {
    let tools: Vec<Value> = (0..n)
        .map(|i| json!({"name": format!("tool_{}", i), "inputSchema": {"type": "object"}}))
        .collect();
    json!({ "tools": tools })
}
