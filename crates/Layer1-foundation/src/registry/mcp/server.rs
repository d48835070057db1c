use crate::storage::JsonStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// 설정 파일명
pub const MCP_FILE: &str = "servers.json";

/// Streamable HTTP 기본 프로토콜 버전
pub const STREAMABLE_PROTOCOL_VERSION: &str = "2025-11-25";

/// SSE / 레거시 HTTP 기본 프로토콜 버전
pub const LEGACY_PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP 서버 타입 (전송 방식)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum McpTransport {
    /// 레거시 REST 스타일 (`POST {url}/tools/list` 등)
    #[serde(alias = "legacy_http")]
    Http,
    /// 레거시 Server-Sent Events
    Sse,
    /// Streamable HTTP (단일 엔드포인트 + 세션)
    #[serde(alias = "streamable-http")]
    StreamableHttp,
}

impl McpTransport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Sse => "sse",
            Self::StreamableHttp => "streamable_http",
        }
    }

    /// 전송 방식별 기본 프로토콜 버전
    pub fn default_protocol_version(&self) -> &'static str {
        match self {
            Self::StreamableHttp => STREAMABLE_PROTOCOL_VERSION,
            Self::Http | Self::Sse => LEGACY_PROTOCOL_VERSION,
        }
    }
}

impl fmt::Display for McpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for McpTransport {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "legacy_http" => Ok(Self::Http),
            "sse" => Ok(Self::Sse),
            "streamable_http" | "streamable-http" => Ok(Self::StreamableHttp),
            _ => Err(Error::UnsupportedTransport(s.to_string())),
        }
    }
}

/// 개별 MCP 서버 설정
///
/// ```json
/// {
///   "type": "streamable_http",
///   "url": "http://localhost:9001/mcp",
///   "protocolVersion": "2025-11-25",
///   "timeoutSecs": 10
/// }
/// ```
///
/// `type`은 문자열 그대로 보관한다. 알 수 없는 전송 방식도 레지스트리에는
/// 남을 수 있고, 거부는 브릿지 디스패처가 한다.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServer {
    /// 전송 타입 (기본: streamable_http)
    #[serde(rename = "type", default = "default_transport")]
    pub transport: String,

    /// 활성화 여부
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 서버 URL (${VAR} 형식 지원)
    pub url: String,

    /// MCP 프로토콜 버전 (없으면 전송 방식 기본값)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,

    /// 호출 타임아웃 (초, 없으면 브릿지 기본값)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// 설명
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl McpServer {
    pub fn new(transport: McpTransport, url: impl Into<String>) -> Self {
        Self {
            transport: transport.as_str().to_string(),
            enabled: true,
            url: url.into(),
            protocol_version: None,
            timeout_secs: None,
            description: None,
        }
    }

    /// 레거시 HTTP 서버 생성
    pub fn http(url: impl Into<String>) -> Self {
        Self::new(McpTransport::Http, url)
    }

    /// sse 타입 서버 생성
    pub fn sse(url: impl Into<String>) -> Self {
        Self::new(McpTransport::Sse, url)
    }

    /// Streamable HTTP 서버 생성
    pub fn streamable_http(url: impl Into<String>) -> Self {
        Self::new(McpTransport::StreamableHttp, url)
    }

    /// 전송 방식 파싱
    pub fn transport_kind(&self) -> Result<McpTransport> {
        self.transport.parse()
    }

    /// 환경변수가 확장된 URL
    pub fn resolved_url(&self) -> String {
        expand_env_var(&self.url)
    }

    /// 유효성 검증
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Err(e) = self.transport_kind() {
            return Err(e.to_string());
        }
        let url = self.resolved_url();
        if url.trim().is_empty() {
            return Err("server requires 'url'".to_string());
        }
        if let Err(e) = url::Url::parse(&url) {
            return Err(format!("invalid url '{}': {}", url, e));
        }
        Ok(())
    }

    // === Builder methods ===

    pub fn protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = Some(version.into());
        self
    }

    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// MCP 설정 (서버 컬렉션)
///
/// ```json
/// {
///   "mcpServers": {
///     "mock": { "type": "streamable_http", "url": "http://mock:9001/mcp" }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct McpConfig {
    /// MCP 서버들 (이름 -> 설정)
    #[serde(default)]
    pub servers: HashMap<String, McpServer>,
}

impl McpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 서버 추가
    pub fn add(&mut self, name: impl Into<String>, server: McpServer) {
        self.servers.insert(name.into(), server);
    }

    /// 서버 조회
    pub fn get(&self, name: &str) -> Option<&McpServer> {
        self.servers.get(name)
    }

    /// 서버 조회 (없으면 에러)
    pub fn require(&self, name: &str) -> Result<&McpServer> {
        self.servers
            .get(name)
            .ok_or_else(|| Error::McpServerNotFound(name.to_string()))
    }

    /// 호출 가능한 서버 조회 (비활성화된 서버는 에러)
    pub fn require_enabled(&self, name: &str) -> Result<&McpServer> {
        let server = self.require(name)?;
        if !server.enabled {
            return Err(Error::McpServerDisabled(name.to_string()));
        }
        Ok(server)
    }

    /// 서버 제거
    pub fn remove(&mut self, name: &str) -> Option<McpServer> {
        self.servers.remove(name)
    }

    /// 서버 존재 여부
    pub fn contains(&self, name: &str) -> bool {
        self.servers.contains_key(name)
    }

    /// 서버 개수
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// 비어있는지 확인
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// 전체 서버 목록
    pub fn iter(&self) -> impl Iterator<Item = (&String, &McpServer)> {
        self.servers.iter()
    }

    /// 활성화된 서버만
    pub fn iter_enabled(&self) -> impl Iterator<Item = (&String, &McpServer)> {
        self.servers.iter().filter(|(_, s)| s.enabled)
    }

    /// 유효성 검증
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors: Vec<_> = self
            .servers
            .iter()
            .filter_map(|(name, s)| s.validate().err().map(|e| format!("{}: {}", name, e)))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            errors.sort();
            Err(errors)
        }
    }

    /// 다른 설정과 병합 (other가 우선)
    pub fn merge(&mut self, other: McpConfig) {
        for (name, server) in other.servers {
            self.servers.insert(name, server);
        }
    }

    // === Storage 연동 ===

    /// 글로벌 + 프로젝트 MCP 설정 로드
    pub fn load() -> Result<Self> {
        let mut config = McpConfig::new();

        // 1. 글로벌 설정
        if let Ok(global) = JsonStore::global() {
            if let Some(global_mcp) = global.load_optional::<McpConfigFile>(MCP_FILE)? {
                config.merge(global_mcp.mcp_servers);
            }
        }

        // 2. 프로젝트 설정
        if let Ok(project) = JsonStore::current_project() {
            if let Some(project_mcp) = project.load_optional::<McpConfigFile>(MCP_FILE)? {
                config.merge(project_mcp.mcp_servers);
            }
        }

        if let Err(errors) = config.validate() {
            for error in errors {
                warn!("Invalid MCP server entry: {}", error);
            }
        }
        debug!("Loaded {} MCP server(s)", config.len());

        Ok(config)
    }

    /// 지정한 저장소에서 로드
    pub fn load_from(store: &JsonStore) -> Result<Self> {
        Ok(store
            .load_optional::<McpConfigFile>(MCP_FILE)?
            .map(|f| f.mcp_servers)
            .unwrap_or_default())
    }

    /// 지정한 저장소에 저장
    pub fn save_to(&self, store: &JsonStore) -> Result<()> {
        let file = McpConfigFile {
            mcp_servers: self.clone(),
        };
        store.save(MCP_FILE, &file)
    }
}

/// MCP 설정 파일 구조 (`servers.json`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct McpConfigFile {
    #[serde(default, rename = "mcpServers")]
    pub mcp_servers: McpConfig,
}

/// 환경변수 확장
/// - ${VAR}: 환경변수 값
/// - ${VAR:-default}: 환경변수가 없으면 기본값
fn expand_env_var(value: &str) -> String {
    if !value.contains("${") {
        return value.to_string();
    }

    let mut result = value.to_string();

    // ${VAR:-default} 패턴
    if let Ok(re_default) = regex::Regex::new(r"\$\{([^}:]+):-([^}]*)\}") {
        result = re_default
            .replace_all(&result, |caps: &regex::Captures| {
                let var_name = &caps[1];
                let default_val = &caps[2];
                std::env::var(var_name).unwrap_or_else(|_| default_val.to_string())
            })
            .to_string();
    }

    // ${VAR} 패턴
    if let Ok(re_simple) = regex::Regex::new(r"\$\{([^}]+)\}") {
        result = re_simple
            .replace_all(&result, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_default()
            })
            .to_string();
    }

    result
}

fn default_true() -> bool {
    true
}

fn default_transport() -> String {
    McpTransport::StreamableHttp.as_str().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_parse() {
        assert_eq!("http".parse::<McpTransport>().unwrap(), McpTransport::Http);
        assert_eq!(
            "legacy_http".parse::<McpTransport>().unwrap(),
            McpTransport::Http
        );
        assert_eq!("SSE".parse::<McpTransport>().unwrap(), McpTransport::Sse);
        assert_eq!(
            "streamable_http".parse::<McpTransport>().unwrap(),
            McpTransport::StreamableHttp
        );

        let err = "carrier-pigeon".parse::<McpTransport>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedTransport(ref k) if k == "carrier-pigeon"));
    }

    #[test]
    fn test_default_protocol_versions() {
        assert_eq!(
            McpTransport::StreamableHttp.default_protocol_version(),
            "2025-11-25"
        );
        assert_eq!(McpTransport::Sse.default_protocol_version(), "2024-11-05");
    }

    #[test]
    fn test_server_builder() {
        let server = McpServer::streamable_http("http://mock:9001/mcp")
            .protocol_version("2025-11-25")
            .timeout(10);

        assert_eq!(server.transport, "streamable_http");
        assert_eq!(server.timeout_secs, Some(10));
        assert!(server.validate().is_ok());
    }

    #[test]
    fn test_config_file_format() {
        let json = r#"{
            "mcpServers": {
                "mock": { "type": "streamable_http", "url": "http://mock:9001/mcp", "timeoutSecs": 10 },
                "old": { "type": "legacy_http", "url": "http://old:8080", "enabled": false }
            }
        }"#;

        let file: McpConfigFile = serde_json::from_str(json).unwrap();
        let config = file.mcp_servers;

        assert_eq!(config.len(), 2);
        assert_eq!(config.iter_enabled().count(), 1);
        assert_eq!(
            config.get("old").unwrap().transport_kind().unwrap(),
            McpTransport::Http
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = McpConfig::new();
        config.add("pigeon", McpServer::new(McpTransport::Sse, "http://x").disabled());
        config.servers.get_mut("pigeon").unwrap().transport = "carrier-pigeon".into();
        config.add("nourl", McpServer::sse(""));

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("nourl"));
        assert!(errors[1].contains("carrier-pigeon"));
    }

    #[test]
    fn test_require_missing() {
        let config = McpConfig::new();
        assert!(matches!(
            config.require("ghost"),
            Err(Error::McpServerNotFound(_))
        ));
    }

    #[test]
    fn test_require_enabled_refuses_disabled() {
        let mut config = McpConfig::new();
        config.add("old", McpServer::http("http://old:8080").disabled());
        config.add("relay", McpServer::sse("http://relay:7000"));

        assert!(config.require_enabled("relay").is_ok());
        assert!(matches!(
            config.require_enabled("old"),
            Err(Error::McpServerDisabled(ref name)) if name == "old"
        ));
        assert!(matches!(
            config.require_enabled("ghost"),
            Err(Error::McpServerNotFound(_))
        ));
    }

    #[test]
    fn test_save_and_load_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        let mut config = McpConfig::new();
        config.add("mock", McpServer::sse("http://localhost:3000"));
        config.save_to(&store).unwrap();

        let loaded = McpConfig::load_from(&store).unwrap();
        assert!(loaded.contains("mock"));
    }

    #[test]
    fn test_env_expansion() {
        std::env::set_var("SWITCHBOARD_TEST_HOST", "mock");

        let server = McpServer::sse("http://${SWITCHBOARD_TEST_HOST}:${SWITCHBOARD_TEST_PORT:-9001}");
        assert_eq!(server.resolved_url(), "http://mock:9001");

        std::env::remove_var("SWITCHBOARD_TEST_HOST");
    }
}
