//! Target - 브릿지 호출 대상 서술자
//!
//! 레지스트리가 호출마다 넘겨주며, 브릿지는 절대 수정하지 않는다.

use super::error::BridgeError;
use serde::{Deserialize, Serialize};
use switchboard_foundation::{McpServer, McpTransport};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// 백엔드 URL (Streamable HTTP는 엔드포인트 그 자체, 나머지는 base URL)
    pub url: String,

    /// 전송 방식 문자열 (`http` | `sse` | `streamable_http`)
    pub transport: String,

    /// MCP 프로토콜 버전 (없으면 전송 방식 기본값)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,

    /// 호출 타임아웃 (초)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Target {
    pub fn new(url: impl Into<String>, transport: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            transport: transport.into(),
            protocol_version: None,
            timeout_secs: None,
        }
    }

    pub fn http(url: impl Into<String>) -> Self {
        Self::new(url, McpTransport::Http.as_str())
    }

    pub fn sse(url: impl Into<String>) -> Self {
        Self::new(url, McpTransport::Sse.as_str())
    }

    pub fn streamable_http(url: impl Into<String>) -> Self {
        Self::new(url, McpTransport::StreamableHttp.as_str())
    }

    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = Some(version.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// 전송 방식 해석
    pub fn transport_kind(&self) -> Result<McpTransport, BridgeError> {
        self.transport
            .parse()
            .map_err(|_| BridgeError::UnsupportedTransport(self.transport.clone()))
    }

    /// 실제 사용할 프로토콜 버전
    pub fn protocol_version_for(&self, kind: McpTransport) -> String {
        match self.protocol_version.as_deref() {
            Some(v) if !v.trim().is_empty() => v.to_string(),
            _ => kind.default_protocol_version().to_string(),
        }
    }

    /// 끝의 `/`를 제거한 URL
    pub fn endpoint(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

impl From<&McpServer> for Target {
    fn from(server: &McpServer) -> Self {
        Self {
            url: server.resolved_url(),
            transport: server.transport.clone(),
            protocol_version: server.protocol_version.clone(),
            timeout_secs: server.timeout_secs,
        }
    }
}
