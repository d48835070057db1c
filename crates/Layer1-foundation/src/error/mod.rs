//! Error types for Switchboard
//!
//! 설정/저장소/레지스트리 에러를 중앙에서 관리
//! (브릿지 호출 에러는 `switchboard-core`의 `BridgeError`가 담당)

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Switchboard 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 저장소 관련
    // ========================================================================
    #[error("Storage error: {0}")]
    Storage(String),

    // ========================================================================
    // MCP 관련
    // ========================================================================
    #[error("MCP error: {0}")]
    Mcp(String),

    #[error("MCP server not found: {0}")]
    McpServerNotFound(String),

    #[error("MCP server is disabled: {0}")]
    McpServerDisabled(String),

    #[error("MCP connection error: {0}")]
    McpConnection(String),

    #[error("Unsupported transport type: {0}")]
    UnsupportedTransport(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),
}
