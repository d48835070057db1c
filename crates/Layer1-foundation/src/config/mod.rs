//! Config - 브릿지 동작 설정
//!
//! - `limits.rs` - 타임아웃/목록 크기 제한

mod limits;

pub use limits::{BridgeLimits, BridgeLimitsFile, LIMITS_FILE};
