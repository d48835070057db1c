//! HTTP Exchange - 어댑터와 네트워크 사이의 경계
//!
//! 어댑터는 `HttpExchange`만 알고, 실제 전송은 `ReqwestExchange`가 한다.
//! 테스트에서는 호출 횟수를 세는 대역으로 교체한다.

use super::error::BridgeError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::debug;

pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_ACCEPT: &str = "Accept";
pub const HEADER_PROTOCOL_VERSION: &str = "MCP-Protocol-Version";
pub const HEADER_SESSION_ID: &str = "MCP-Session-Id";

pub const CONTENT_TYPE_JSON: &str = "application/json";
/// Streamable HTTP / SSE 요청의 Accept 헤더
pub const ACCEPT_STREAMABLE: &str = "application/json, text/event-stream";

/// HTTP 메서드 (브릿지는 GET/POST만 사용)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// 나가는 요청
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl OutboundRequest {
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: vec![(HEADER_CONTENT_TYPE.to_string(), CONTENT_TYPE_JSON.to_string())],
            body: Some(body),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// 헤더 값 조회 (대소문자 무시)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// JSON 본문의 `method` 필드
    pub fn rpc_method(&self) -> Option<&str> {
        self.body.as_ref()?.get("method")?.as_str()
    }
}

/// 들어온 응답 (본문은 전부 읽은 상태)
///
/// 헤더 조회는 `HeaderMap`이라 대소문자를 가리지 않는다.
#[derive(Debug, Clone, Default)]
pub struct InboundResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl InboundResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    /// 헤더 추가 (이름/값이 HTTP 헤더로 유효하지 않으면 무시)
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let name = HeaderName::from_bytes(name.as_bytes());
        let value = HeaderValue::from_str(&value.into());
        if let (Ok(name), Ok(value)) = (name, value) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_json(self, value: &Value) -> Self {
        self.with_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON)
            .with_body(value.to_string())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> &str {
        self.header(HEADER_CONTENT_TYPE).unwrap_or("")
    }

    /// `MCP-Session-Id` (어떤 대소문자로 와도 같다)
    pub fn session_id(&self) -> Option<&str> {
        self.header(HEADER_SESSION_ID)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn is_error_status(&self) -> bool {
        self.status >= 400
    }

    pub fn body_is_blank(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }
}

/// HTTP 교환 (요청 하나 → 응답 하나)
#[async_trait]
pub trait HttpExchange: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<InboundResponse, BridgeError>;
}

/// reqwest 기반 실제 구현
///
/// 호출 간에 세션이나 유휴 연결을 보관하지 않는다. 데드라인은 디스패처가 건다.
#[derive(Debug, Clone)]
pub struct ReqwestExchange {
    client: reqwest::Client,
}

impl ReqwestExchange {
    pub fn new() -> Result<Self, BridgeError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| BridgeError::Connection(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpExchange for ReqwestExchange {
    async fn send(&self, request: OutboundRequest) -> Result<InboundResponse, BridgeError> {
        let url = request.url.clone();
        debug!("HTTP {:?} {}", request.method, url);

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| BridgeError::from_reqwest(e, &url))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| BridgeError::from_reqwest(e, &url))?
            .to_vec();

        debug!("HTTP {} <- {} ({} bytes)", status, url, body.len());

        Ok(InboundResponse {
            status,
            headers,
            body,
        })
    }
}
