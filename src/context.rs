//! 环境上下文快照
//!
//! 焦点、当前打开频道、静音列表均由外部提供方感知和维护，
//! 引擎在决策时同步拉取一份只读快照，避免与并发的上下文更新竞争。

use std::collections::HashSet;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::event::ChannelId;

/// 决策时刻的环境快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationContext {
    /// 应用窗口是否持有输入焦点
    pub window_focused: bool,
    /// 当前打开的频道（没有打开任何频道时为 None）
    pub open_channel: Option<ChannelId>,
    /// 已静音的频道集合
    pub muted_channels: HashSet<ChannelId>,
    /// 声音提示总开关
    pub sound_enabled: bool,
}

impl Default for NotificationContext {
    fn default() -> Self {
        Self {
            window_focused: false,
            open_channel: None,
            muted_channels: HashSet::new(),
            sound_enabled: true,
        }
    }
}

impl NotificationContext {
    /// 设置焦点状态（链式调用）
    pub fn with_focus(mut self, focused: bool) -> Self {
        self.window_focused = focused;
        self
    }

    /// 设置当前打开的频道（链式调用）
    pub fn with_open_channel(mut self, channel: impl Into<ChannelId>) -> Self {
        self.open_channel = Some(channel.into());
        self
    }

    /// 添加静音频道（链式调用）
    pub fn with_muted(mut self, channel: impl Into<ChannelId>) -> Self {
        self.muted_channels.insert(channel.into());
        self
    }

    /// 设置声音开关（链式调用）
    pub fn with_sound_enabled(mut self, enabled: bool) -> Self {
        self.sound_enabled = enabled;
        self
    }
}

/// 上下文提供方
///
/// 引擎按拉取方式消费：每次分发开始时取一次快照，分发过程中不再读取。
pub trait ContextProvider: Send + Sync {
    fn snapshot(&self) -> NotificationContext;
}

/// 静态上下文提供方 - 供测试和 CLI 使用
///
/// 宿主可以在两次分发之间用 `set` 更新状态；快照总是整体替换，
/// 进行中的分发不受影响。
#[derive(Debug, Default)]
pub struct StaticContextProvider {
    inner: Mutex<NotificationContext>,
}

impl StaticContextProvider {
    pub fn new(context: NotificationContext) -> Self {
        Self {
            inner: Mutex::new(context),
        }
    }

    /// 整体替换上下文
    pub fn set(&self, context: NotificationContext) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *guard = context;
    }
}

impl ContextProvider for StaticContextProvider {
    fn snapshot(&self) -> NotificationContext {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
