//! JSON 파일 저장소
//!
//! `servers.json`, `bridge.json`을 글로벌(`<config_dir>/switchboard/`)과
//! 프로젝트(`.switchboard/`) 두 위치에서 읽고 쓴다.

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// 설정 디렉토리 이름
const APP_DIR: &str = "switchboard";

/// JSON 설정 저장소
#[derive(Debug, Clone)]
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// 글로벌 설정 (<config_dir>/switchboard/)
    pub fn global() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("no user config directory for switchboard".to_string()))?
            .join(APP_DIR);
        Ok(Self::new(dir))
    }

    /// 프로젝트 설정 (.switchboard/)
    pub fn project(root: impl Into<PathBuf>) -> Self {
        Self::new(root.into().join(format!(".{}", APP_DIR)))
    }

    /// 현재 디렉토리 프로젝트 설정
    pub fn current_project() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| {
            Error::Config(format!("cannot locate project .{} directory: {}", APP_DIR, e))
        })?;
        Ok(Self::project(cwd))
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.base_dir.join(filename)
    }

    /// JSON 로드 (파일이 없으면 None)
    pub fn load_optional<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        let path = self.file_path(filename);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::Config(format!(
                    "cannot read switchboard {} at {}: {}",
                    filename,
                    path.display(),
                    e
                )))
            }
        };

        debug!("Loaded {} from {}", filename, path.display());
        serde_json::from_str(&content).map(Some).map_err(|e| {
            Error::Config(format!(
                "invalid switchboard {} at {}: {}",
                filename,
                path.display(),
                e
            ))
        })
    }

    /// JSON 저장 (디렉토리가 없으면 생성)
    pub fn save<T: Serialize>(&self, filename: &str, data: &T) -> Result<()> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            Error::Storage(format!(
                "cannot create {} for switchboard {}: {}",
                self.base_dir.display(),
                filename,
                e
            ))
        })?;

        let path = self.file_path(filename);
        let content = serde_json::to_string_pretty(data)?;
        debug!("Saving {} to {}", filename, path.display());
        std::fs::write(&path, content).map_err(|e| {
            Error::Storage(format!(
                "cannot write switchboard {} at {}: {}",
                filename,
                path.display(),
                e
            ))
        })
    }
}
