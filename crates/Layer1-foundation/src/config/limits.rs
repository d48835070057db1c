//! Limits Configuration - 브릿지 호출 제한 설정
//!
//! 기본 타임아웃, 레거시 도구 목록 상한, 클라이언트 식별 정보
//!
//! `bridge.json`은 글로벌/프로젝트 두 계층에서 읽는다. 파일에는 일부 키만 있어도 되며,
//! 비어 있거나 0인 값은 아래 계층의 값을 덮어쓰지 않는다.

use crate::storage::JsonStore;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 제한 설정 파일명
pub const LIMITS_FILE: &str = "bridge.json";

/// 브릿지 제한 설정 (병합 결과)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeLimits {
    /// 연결 테스트(initialize) 기본 타임아웃 (초)
    pub probe_timeout_secs: u64,
    /// 일반 호출(tools/call 등) 기본 타임아웃 (초)
    pub call_timeout_secs: u64,
    /// 레거시 HTTP tools/list 응답에서 목록을 그대로 돌려주는 최대 개수
    pub tool_list_cap: usize,
    /// initialize 시 전달할 clientInfo.name
    pub client_name: String,
    /// initialize 시 전달할 clientInfo.version
    pub client_version: String,
}

/// `bridge.json` 한 계층 (파일에 없는 키는 None)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeLimitsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_list_cap: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_version: Option<String>,
}

impl BridgeLimitsFile {
    /// 0과 빈 문자열을 "설정 안 됨"으로 정규화
    fn effective(self) -> Self {
        Self {
            probe_timeout_secs: self.probe_timeout_secs.filter(|v| *v > 0),
            call_timeout_secs: self.call_timeout_secs.filter(|v| *v > 0),
            tool_list_cap: self.tool_list_cap.filter(|v| *v > 0),
            client_name: self.client_name.filter(|v| !v.is_empty()),
            client_version: self.client_version.filter(|v| !v.is_empty()),
        }
    }
}

impl From<&BridgeLimits> for BridgeLimitsFile {
    fn from(limits: &BridgeLimits) -> Self {
        Self {
            probe_timeout_secs: Some(limits.probe_timeout_secs),
            call_timeout_secs: Some(limits.call_timeout_secs),
            tool_list_cap: Some(limits.tool_list_cap),
            client_name: Some(limits.client_name.clone()),
            client_version: Some(limits.client_version.clone()),
        }
    }
}

impl Default for BridgeLimits {
    fn default() -> Self {
        Self {
            probe_timeout_secs: 10,
            call_timeout_secs: 30,
            tool_list_cap: 10,
            client_name: "switchboard".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl BridgeLimits {
    /// 메서드별 기본 타임아웃 (initialize는 연결 테스트로 취급)
    pub fn default_timeout_for(&self, method: &str) -> Duration {
        if method == "initialize" {
            Duration::from_secs(self.probe_timeout_secs)
        } else {
            Duration::from_secs(self.call_timeout_secs)
        }
    }

    /// 두 계층 병합 (project가 global을 오버라이드, 둘 다 없으면 기본값)
    pub fn merge(global: BridgeLimitsFile, project: BridgeLimitsFile) -> Self {
        let global = global.effective();
        let project = project.effective();
        let defaults = Self::default();

        Self {
            probe_timeout_secs: project
                .probe_timeout_secs
                .or(global.probe_timeout_secs)
                .unwrap_or(defaults.probe_timeout_secs),
            call_timeout_secs: project
                .call_timeout_secs
                .or(global.call_timeout_secs)
                .unwrap_or(defaults.call_timeout_secs),
            tool_list_cap: project
                .tool_list_cap
                .or(global.tool_list_cap)
                .unwrap_or(defaults.tool_list_cap),
            client_name: project
                .client_name
                .or(global.client_name)
                .unwrap_or(defaults.client_name),
            client_version: project
                .client_version
                .or(global.client_version)
                .unwrap_or(defaults.client_version),
        }
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let global = JsonStore::global().ok();
        let project = JsonStore::current_project().ok();
        Self::load_from(global.as_ref(), project.as_ref())
    }

    /// 지정한 저장소들에서 병합 로드 (없는 파일은 빈 계층)
    pub fn load_from(global: Option<&JsonStore>, project: Option<&JsonStore>) -> Result<Self> {
        let global_layer = Self::load_layer(global)?;
        let project_layer = Self::load_layer(project)?;
        Ok(Self::merge(global_layer, project_layer))
    }

    fn load_layer(store: Option<&JsonStore>) -> Result<BridgeLimitsFile> {
        match store {
            Some(store) => Ok(store
                .load_optional::<BridgeLimitsFile>(LIMITS_FILE)?
                .unwrap_or_default()),
            None => Ok(BridgeLimitsFile::default()),
        }
    }

    /// 지정한 저장소에 저장
    pub fn save_to(&self, store: &JsonStore) -> Result<()> {
        store.save(LIMITS_FILE, &BridgeLimitsFile::from(self))
    }
}
