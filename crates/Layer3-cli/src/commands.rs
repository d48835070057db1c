//! Command helpers - 대상 해석, 서버 목록 출력

use anyhow::Context;
use serde_json::Value;
use switchboard_core::Target;
use switchboard_foundation::{McpConfig, McpTransport, Result};

/// URL 대상에 적용할 옵션
#[derive(Debug, Default, Clone)]
pub struct TargetOptions {
    pub transport: Option<String>,
    pub protocol_version: Option<String>,
}

/// 서버 이름 또는 URL → Target
///
/// `http://` / `https://`로 시작하면 URL 대상(기본 전송: streamable_http),
/// 아니면 레지스트리에서 찾는다.
pub fn resolve_target(
    server: &str,
    options: &TargetOptions,
    config: &McpConfig,
) -> Result<Target> {
    if server.starts_with("http://") || server.starts_with("https://") {
        let transport = options
            .transport
            .clone()
            .unwrap_or_else(|| McpTransport::StreamableHttp.as_str().to_string());
        let mut target = Target::new(server, transport);
        if let Some(version) = &options.protocol_version {
            target = target.with_protocol_version(version.clone());
        }
        return Ok(target);
    }

    let entry = config.require_enabled(server)?;
    let mut target = Target::from(entry);
    if let Some(version) = &options.protocol_version {
        target = target.with_protocol_version(version.clone());
    }
    Ok(target)
}

/// JSON 인자 파싱
pub fn parse_json(flag: &str, raw: &str) -> anyhow::Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("{} is not valid JSON: {}", flag, raw))
}

/// 등록된 서버 출력
pub fn list_servers(config: &McpConfig) {
    if config.is_empty() {
        println!("No MCP servers configured.");
        return;
    }

    let mut servers: Vec<_> = config.iter().collect();
    servers.sort_by(|a, b| a.0.cmp(b.0));

    for (name, server) in servers {
        let status = if server.enabled { "" } else { " (disabled)" };
        println!("{:<20} {:<16} {}{}", name, server.transport, server.url, status);
        if let Some(description) = &server.description {
            println!("{:<20} {}", "", description);
        }
    }
}
