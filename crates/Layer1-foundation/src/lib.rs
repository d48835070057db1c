//! # switchboard-foundation
//!
//! Foundation layer for Switchboard:
//! - Error: 공통 에러 타입
//! - Storage: JsonStore (글로벌 + 프로젝트 설정 파일)
//! - Registry: MCP 백엔드 서버 등록 (`servers.json`)
//! - Config: 브릿지 제한 설정 (`bridge.json`)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Registry (servers.json)                                │
//! │     │  McpServer { type, url, protocolVersion, ... }    │
//! │     ▼                                                   │
//! │  Transport Bridge (switchboard-core)                    │
//! │     ├── Legacy HTTP   (POST /tools/list ...)            │
//! │     ├── SSE           (POST {url}, fallback /message)   │
//! │     └── Streamable    (initialize → session → call)     │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod registry;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{BridgeLimits, BridgeLimitsFile, LIMITS_FILE};

// ============================================================================
// Registry (레지스트리)
// ============================================================================
pub use registry::{
    McpConfig, McpConfigFile, McpServer, McpTransport, LEGACY_PROTOCOL_VERSION, MCP_FILE,
    STREAMABLE_PROTOCOL_VERSION,
};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;
