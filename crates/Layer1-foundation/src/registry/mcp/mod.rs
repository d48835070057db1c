//! MCP 서버 레지스트리 (`servers.json`)

mod server;

pub use server::{
    McpConfig, McpConfigFile, McpServer, McpTransport, LEGACY_PROTOCOL_VERSION, MCP_FILE,
    STREAMABLE_PROTOCOL_VERSION,
};
