//! Bridge error taxonomy
//!
//! 브릿지 내부에서만 흐르는 에러. 디스패처 경계를 넘기 전에
//! 모두 `CallResult`로 변환된다.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// 에러 분류 (CallResult에 그대로 실림)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// DNS/TCP/TLS 실패, 타임아웃, 취소
    Connection,
    /// HTTP 4xx/5xx, 해석 불가능한 응답 본문
    Protocol,
    /// JSON-RPC error 객체
    Rpc,
    /// result.isError == true
    Application,
    /// 지원하지 않는 전송 방식
    Unsupported,
}

/// 브릿지 에러
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("{message}")]
    Rpc { code: i64, message: String },

    #[error("{0}")]
    Application(String),

    #[error("unsupported transport type: {0}")]
    UnsupportedTransport(String),
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Connection(_) => ErrorKind::Connection,
            BridgeError::Protocol(_) => ErrorKind::Protocol,
            BridgeError::Rpc { .. } => ErrorKind::Rpc,
            BridgeError::Application(_) => ErrorKind::Application,
            BridgeError::UnsupportedTransport(_) => ErrorKind::Unsupported,
        }
    }

    /// 바이트 교환 전 실패 (SSE 폴백 조건)
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, BridgeError::Connection(_))
    }

    /// 전체 호출 데드라인 초과
    pub fn timed_out(after: Duration) -> Self {
        BridgeError::Connection(format!("request timed out after {}s", after.as_secs_f64()))
    }

    /// HTTP 상태 코드 에러 (본문에 JSON-RPC 에러 메시지가 있으면 덧붙임)
    pub fn http_status(status: u16, detail: Option<&str>) -> Self {
        match detail {
            Some(detail) if !detail.is_empty() => {
                BridgeError::Protocol(format!("HTTP {}: {}", status, detail))
            }
            _ => BridgeError::Protocol(format!("HTTP {}", status)),
        }
    }

    /// reqwest 에러 분류
    pub fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            BridgeError::Connection(format!("request to {} timed out", url))
        } else if err.is_connect() {
            BridgeError::Connection(format!("failed to connect to {}: {}", url, err))
        } else if err.is_body() || err.is_decode() {
            BridgeError::Protocol(format!("failed to read response from {}: {}", url, err))
        } else if err.is_builder() {
            BridgeError::Connection(format!("invalid request for {}: {}", url, err))
        } else {
            BridgeError::Connection(format!("request to {} failed: {}", url, err))
        }
    }
}

/// CLI 등 foundation `Result`로 흐르는 경계에서 사용
impl From<BridgeError> for switchboard_foundation::Error {
    fn from(err: BridgeError) -> Self {
        use switchboard_foundation::Error;
        match err {
            BridgeError::Connection(msg) => Error::McpConnection(msg),
            BridgeError::Protocol(msg) => Error::Http(msg),
            BridgeError::UnsupportedTransport(kind) => Error::UnsupportedTransport(kind),
            other => Error::Mcp(other.to_string()),
        }
    }
}
