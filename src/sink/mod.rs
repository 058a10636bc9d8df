//! 通知 Sink trait 定义
//!
//! 每个 Sink 是一个独立的投递机制（系统通知、声音等），
//! 统一实现 `NotificationSink` trait，由分发器并发调用、互不影响。
//! 新增渠道只需实现 trait 并注册默认抑制原因，不用改动分发器。

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::decision::{NotificationDecision, SuppressReason};
use crate::event::NotificationEvent;

pub mod native;
pub mod sound;

pub use native::{CommandNotifier, NativeNotifier, NativeSink};
pub use sound::{CommandPlayer, SoundPlayer, SoundSink};

/// 系统通知 Sink 的稳定标识
pub const NATIVE_SINK: &str = "native";
/// 声音 Sink 的稳定标识
pub const SOUND_SINK: &str = "sound";

/// 单个 Sink 的投递状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkStatus {
    /// 投递成功
    Sent,
    /// 按决策抑制，未产生副作用
    Suppressed,
    /// 投递失败
    Failed,
}

/// 单个 Sink 的投递结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkResult {
    /// 产生结果的 Sink 标识
    pub sink: String,
    pub status: SinkStatus,
    /// 抑制原因 token，或失败原因分类（timeout / delivery_error / contract_violation）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// 失败时的底层错误描述，仅用于日志
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SinkResult {
    pub fn sent(sink: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            status: SinkStatus::Sent,
            reason: None,
            error: None,
        }
    }

    pub fn suppressed(sink: impl Into<String>, reason: SuppressReason) -> Self {
        Self {
            sink: sink.into(),
            status: SinkStatus::Suppressed,
            reason: Some(reason.as_str().to_string()),
            error: None,
        }
    }

    pub fn failed(
        sink: impl Into<String>,
        reason: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            sink: sink.into(),
            status: SinkStatus::Failed,
            reason: Some(reason.into()),
            error: Some(error.into()),
        }
    }
}

/// 按 Sink 标识查默认抑制原因
///
/// 决策里的 `reasons` 在边缘情况下可能为空（例如 Sink 有自己正交的
/// 抑制逻辑时），此表提供兜底，避免各 Sink 重复写条件分支。
pub fn default_suppress_reason(sink: &str) -> SuppressReason {
    match sink {
        SOUND_SINK => SuppressReason::FocusedCurrentChannel,
        _ => SuppressReason::FocusedWindow,
    }
}

/// 生成抑制结果：优先用决策的首个原因，否则查默认表
pub fn suppressed_result(sink: &str, decision: &NotificationDecision) -> SinkResult {
    let reason = decision
        .reasons
        .first()
        .copied()
        .unwrap_or_else(|| default_suppress_reason(sink));
    SinkResult::suppressed(sink, reason)
}

/// 通知 Sink trait
///
/// `handle` 按契约不可失败：所有内部异常必须折叠为 `Failed` 结果，
/// 绝不向分发器传播，否则会在并发执行下拖累兄弟 Sink。
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Sink 稳定标识（用于结果关联、日志和配置）
    fn name(&self) -> &str;

    /// 单次投递的超时上限
    fn timeout(&self) -> Duration {
        Duration::from_secs(3)
    }

    /// 执行投递或报告抑制
    async fn handle(
        &self,
        event: &NotificationEvent,
        decision: &NotificationDecision,
    ) -> SinkResult;
}
