//! switchboard-core: MCP Transport Bridge
//!
//! Layer2 - 백엔드 MCP 서버 호출 레이어
//!
//! # 주요 모듈
//!
//! - `mcp`: 전송 어댑터, 응답 디코더, 세션 핸드셰이크, 디스패처
//!
//! # 사용 예시
//!
//! ```ignore
//! use switchboard_core::{Dispatcher, Target};
//! use serde_json::json;
//!
//! let dispatcher = Dispatcher::new()?;
//! let target = Target::streamable_http("http://mock:9001/mcp").with_timeout(10);
//!
//! let result = dispatcher
//!     .call_tool(&target, "echo", json!({"message": "hi"}))
//!     .await;
//!
//! if !result.success {
//!     // 백엔드 도달 실패 (502)
//! } else if result.is_error {
//!     // 도구 또는 RPC 에러 (200 + 에러 페이로드)
//! }
//! ```

pub mod mcp;

// Re-exports: Bridge
pub use mcp::{
    BridgeError, CallResult, Dispatcher, ErrorKind, FrameDecoder, HandshakeMode, HttpExchange,
    ReqwestExchange, SniffingDecoder, StrictDecoder, Target, TransportAdapter,
};
