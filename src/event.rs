//! 通知事件结构
//!
//! 消息管道在观察到值得通知的聊天消息时构造 `NotificationEvent`，
//! 事件本身不可变，按值传入引擎，分发完成后即丢弃。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DecisionError;

/// 频道标识
pub type ChannelId = String;

/// 一条候选通知事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// 事件唯一标识（用于幂等与结果关联）
    pub id: String,
    /// 所属频道
    pub channel: ChannelId,
    /// 发送者展示名
    pub author: String,
    /// 消息内容（上游已截断/清洗）
    pub message: String,
    /// 时间戳
    pub timestamp: DateTime<Utc>,
    /// 被回复消息的 ID（回复视同提及）
    pub reply_to: Option<String>,
}

impl NotificationEvent {
    /// 创建新事件，自动分配 UUID 和当前时间戳
    pub fn new(
        channel: impl Into<ChannelId>,
        author: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            channel: channel.into(),
            author: author.into(),
            message: message.into(),
            timestamp: Utc::now(),
            reply_to: None,
        }
    }

    /// 设置事件 ID（链式调用）
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// 设置时间戳（链式调用）
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// 设置被回复消息 ID（链式调用）
    pub fn with_reply_to(mut self, message_id: impl Into<String>) -> Self {
        self.reply_to = Some(message_id.into());
        self
    }

    /// 校验必填字段，缺失视为调用方编程错误
    pub fn validate(&self) -> Result<(), DecisionError> {
        if self.id.trim().is_empty() {
            return Err(DecisionError::MissingField("id"));
        }
        if self.channel.trim().is_empty() {
            return Err(DecisionError::MissingField("channel"));
        }
        Ok(())
    }
}

/// 事件构建器
#[derive(Debug, Default)]
pub struct NotificationEventBuilder {
    id: Option<String>,
    channel: Option<ChannelId>,
    author: Option<String>,
    message: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    reply_to: Option<String>,
}

impl NotificationEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn channel(mut self, channel: impl Into<ChannelId>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn reply_to(mut self, message_id: impl Into<String>) -> Self {
        self.reply_to = Some(message_id.into());
        self
    }

    /// 构建事件，channel 为必填项
    pub fn build(self) -> Result<NotificationEvent, DecisionError> {
        let channel = self
            .channel
            .filter(|c| !c.trim().is_empty())
            .ok_or(DecisionError::MissingField("channel"))?;

        Ok(NotificationEvent {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            channel,
            author: self.author.unwrap_or_default(),
            message: self.message.unwrap_or_default(),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            reply_to: self.reply_to,
        })
    }
}
