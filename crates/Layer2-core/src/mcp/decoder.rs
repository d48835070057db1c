//! Response Frame Decoder
//!
//! 응답 본문이 일반 JSON-RPC 문서인지 SSE 프레임인지 판별하고
//! 그 안의 JSON-RPC 메시지 하나를 꺼낸다.
//!
//! 일부 백엔드는 `Content-Type`을 잘못 붙이므로 기본 전략(`SniffingDecoder`)은
//! 헤더를 힌트로만 쓰고 본문 앞부분(`event:` / `data:`)을 우선한다.
//! 헤더만 믿는 전략이 필요하면 `StrictDecoder`로 교체한다.

use super::types::RpcMap;
use serde_json::Value;

const SSE_CONTENT_TYPE: &str = "text/event-stream";

/// 응답 본문 → 단일 JSON-RPC 메시지
///
/// 해석 실패는 빈 맵으로 돌려준다. `result`/`error` 키 부재 판단은 호출측 몫.
pub trait FrameDecoder: Send + Sync {
    fn normalize(&self, body: &[u8], content_type: &str) -> RpcMap;
}

/// 본문 스니핑 디코더 (기본값)
#[derive(Debug, Default, Clone, Copy)]
pub struct SniffingDecoder;

impl FrameDecoder for SniffingDecoder {
    fn normalize(&self, body: &[u8], content_type: &str) -> RpcMap {
        if is_sse_content_type(content_type) || looks_like_sse(body) {
            decode_sse(body)
        } else {
            decode_json(body)
        }
    }
}

/// Content-Type만 신뢰하는 디코더
#[derive(Debug, Default, Clone, Copy)]
pub struct StrictDecoder;

impl FrameDecoder for StrictDecoder {
    fn normalize(&self, body: &[u8], content_type: &str) -> RpcMap {
        if is_sse_content_type(content_type) {
            decode_sse(body)
        } else {
            decode_json(body)
        }
    }
}

fn is_sse_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains(SSE_CONTENT_TYPE)
}

/// 본문의 첫 비공백 바이트가 `event:` 또는 `data:`로 시작하는지
pub fn looks_like_sse(body: &[u8]) -> bool {
    let start = body
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(body.len());
    let head = &body[start..];
    head.starts_with(b"event:") || head.starts_with(b"data:")
}

/// 첫 `data:` 줄의 JSON만 해석 (여러 이벤트가 와도 첫 메시지만 사용)
fn decode_sse(body: &[u8]) -> RpcMap {
    let text = String::from_utf8_lossy(body);

    let data = text.split('\n').find_map(|line| {
        line.trim_start()
            .strip_prefix("data:")
            .map(|rest| rest.trim().to_string())
    });

    match data {
        Some(payload) => decode_json(payload.as_bytes()),
        None => RpcMap::new(),
    }
}

fn decode_json(body: &[u8]) -> RpcMap {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => RpcMap::new(),
    }
}

/// 메시지를 SSE 프레임으로 감싼다 (`event: message\ndata: {...}\n\n`)
pub fn sse_frame(message: &Value) -> String {
    format!("event: message\ndata: {}\n\n", message)
}
