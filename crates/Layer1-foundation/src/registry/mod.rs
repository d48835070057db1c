//! Registry - 백엔드 서버 등록/관리
//!
//! - `mcp/` - MCP 서버 등록 (자체 load/save)

pub mod mcp;

// MCP
pub use mcp::{
    McpConfig, McpConfigFile, McpServer, McpTransport, LEGACY_PROTOCOL_VERSION, MCP_FILE,
    STREAMABLE_PROTOCOL_VERSION,
};
