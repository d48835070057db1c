//! MCP Transport Bridge
//!
//! 전송 방식이 제각각인 MCP 백엔드를 하나의 호출 계약
//! (`Dispatcher::invoke(target, method, params) -> CallResult`)으로 노출한다.
//!
//! ## 지원 전송
//! - `http`: 레거시 REST 스타일 (`POST /tools/list` ...)
//! - `sse`: base URL POST, 실패 시 `/message` 폴백
//! - `streamable_http`: 단일 엔드포인트 JSON-RPC + 세션 핸드셰이크
//!
//! ## 흐름
//!
//! ```text
//! Dispatcher::invoke
//!   → HandshakeCoordinator::run   (Required / Opportunistic)
//!   → TransportAdapter::invoke
//!   → FrameDecoder::normalize
//!   → classify → CallResult
//! ```
//!
//! ## 참고
//! - https://modelcontextprotocol.io/

pub mod adapter;
mod decoder;
mod dispatcher;
mod error;
mod exchange;
mod handshake;
mod result;
mod target;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use adapter::{
    AdapterOutcome, CallContext, HandshakeMode, LegacyHttpAdapter, SseAdapter,
    StreamableHttpAdapter, TransportAdapter,
};
pub use decoder::{looks_like_sse, sse_frame, FrameDecoder, SniffingDecoder, StrictDecoder};
pub use dispatcher::Dispatcher;
pub use error::{BridgeError, ErrorKind};
pub use exchange::{
    HttpExchange, HttpMethod, InboundResponse, OutboundRequest, ReqwestExchange,
    ACCEPT_STREAMABLE, HEADER_PROTOCOL_VERSION, HEADER_SESSION_ID,
};
pub use handshake::{HandshakeCoordinator, HandshakeOutcome, HandshakeState, Session};
pub use result::{classify, CallResult};
pub use target::Target;
pub use types::{
    JsonRpcError, JsonRpcNotification, JsonRpcRequest, ResourceDescriptor, RpcMap,
    ToolCallParams, ToolDescriptor,
};
