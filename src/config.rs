//! 引擎配置
//!
//! 配置文件位于平台配置目录下的 `hazel-notify/config.json`，所有字段可省略，
//! 省略的字段取默认值。文件不存在时直接返回默认配置。

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::decision::DecisionPolicy;

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 决策策略开关
    pub policy: DecisionPolicy,
    /// 系统通知 Sink 的超时（毫秒）
    pub native_timeout_ms: u64,
    /// 声音 Sink 的超时（毫秒）
    pub sound_timeout_ms: u64,
    /// 覆盖声音播放命令（默认按平台选择 afplay / paplay）
    pub sound_command: Option<String>,
    /// 覆盖提示音文件路径
    pub sound_file: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: DecisionPolicy::default(),
            native_timeout_ms: 3000,
            sound_timeout_ms: 1000,
            sound_command: None,
            sound_file: None,
        }
    }
}

impl EngineConfig {
    /// 默认配置文件路径
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("hazel-notify/config.json"))
    }

    /// 从默认位置加载配置，文件不存在时返回默认值
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// 从指定路径加载配置
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}
