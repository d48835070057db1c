//! Storage module for Switchboard
//!
//! - `json`: JSON - 설정 파일 저장/로드 (글로벌 + 프로젝트)

mod json;

pub use json::JsonStore;
