//! Session Handshake Coordinator
//!
//! `initialize` → 세션 ID 캡처 → `notifications/initialized` 순서를 진행한다.
//! 세션은 호출 하나 동안만 유지되며 어디에도 저장하지 않는다.

use super::adapter::{decode_response, AdapterOutcome, CallContext};
use super::error::BridgeError;
use super::exchange::HEADER_SESSION_ID;
use super::types::{InitializeResult, JsonRpcNotification, METHOD_INITIALIZE};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// 핸드셰이크 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Disconnected,
    Initializing,
    SessionEstablished,
    Notified,
    Ready,
    Failed,
}

impl std::fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HandshakeState::Disconnected => "disconnected",
            HandshakeState::Initializing => "initializing",
            HandshakeState::SessionEstablished => "session_established",
            HandshakeState::Notified => "notified",
            HandshakeState::Ready => "ready",
            HandshakeState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// 백엔드가 발급한 세션
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub established_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            established_at: Utc::now(),
        }
    }
}

/// 핸드셰이크 결과
#[derive(Debug, Clone)]
pub struct HandshakeOutcome {
    /// 세션 (세션 없는 백엔드면 None)
    pub session: Option<Session>,
    /// initialize 응답 (호출 메서드가 initialize일 때 그대로 결과가 됨)
    pub initialize: AdapterOutcome,
}

/// 호출 하나 동안의 핸드셰이크 진행자
#[derive(Debug)]
pub struct HandshakeCoordinator {
    state: HandshakeState,
}

impl Default for HandshakeCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl HandshakeCoordinator {
    pub fn new() -> Self {
        Self {
            state: HandshakeState::Disconnected,
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    fn transition(&mut self, next: HandshakeState) {
        debug!("Handshake: {} -> {}", self.state, next);
        self.state = next;
    }

    /// `url`로 핸드셰이크 실행
    ///
    /// 연결 실패나 HTTP ≥ 400이면 `Failed`로 끝나고 에러를 돌려준다.
    pub async fn run(
        &mut self,
        call: &CallContext<'_>,
        url: &str,
    ) -> Result<HandshakeOutcome, BridgeError> {
        self.transition(HandshakeState::Initializing);

        let body = call.envelope(METHOD_INITIALIZE, call.initialize_params());
        let response = match call.exchange.send(call.jsonrpc_post(url, body)).await {
            Ok(response) => response,
            Err(e) => {
                self.transition(HandshakeState::Failed);
                return Err(e);
            }
        };

        let initialize = decode_response(call.decoder, &response);
        if response.is_error_status() {
            self.transition(HandshakeState::Failed);
            return Err(initialize
                .error
                .unwrap_or_else(|| BridgeError::http_status(response.status, None)));
        }

        if let Some(result) = initialize.raw.get("result") {
            if let Ok(info) = serde_json::from_value::<InitializeResult>(result.clone()) {
                if let Some(server) = info.server_info {
                    info!(
                        "Initialized MCP backend {} {} (protocol {})",
                        server.name,
                        server.version,
                        info.protocol_version.as_deref().unwrap_or("?")
                    );
                }
            }
        }

        let session = response.session_id().map(Session::new);
        self.transition(HandshakeState::SessionEstablished);

        if let Some(session) = &session {
            self.notify_initialized(call, url, &session.id).await;
        } else {
            debug!("Backend at {} did not issue a session id", url);
        }

        self.transition(HandshakeState::Ready);
        Ok(HandshakeOutcome {
            session,
            initialize,
        })
    }

    /// `notifications/initialized` 전송 (실패는 무시)
    async fn notify_initialized(&mut self, call: &CallContext<'_>, url: &str, session_id: &str) {
        let notification = match serde_json::to_value(JsonRpcNotification::initialized()) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to encode initialized notification: {}", e);
                return;
            }
        };
        let request = call
            .jsonrpc_post(url, notification)
            .header(HEADER_SESSION_ID, session_id);

        match call.exchange.send(request).await {
            Ok(response) if response.is_error_status() => {
                warn!(
                    "initialized notification rejected by {} (HTTP {})",
                    url, response.status
                );
            }
            Ok(_) => {}
            Err(e) => warn!("initialized notification to {} failed: {}", url, e),
        }

        self.transition(HandshakeState::Notified);
    }
}
