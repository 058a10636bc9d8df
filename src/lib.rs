//! Hazel 通知决策与多 Sink 分发引擎
//!
//! # 设计目标
//! 1. 决策唯一：每个事件只计算一次 `NotificationDecision`，Sink 不自行推断策略
//! 2. 渠道解耦：所有投递机制实现 `NotificationSink` trait，互不影响
//! 3. 并发扇出：分发器对同一事件并行调用所有 Sink，并逐个限定超时
//! 4. 故障隔离：任何 Sink 的失败都只体现在自己的结果里，绝不传播到消息管道
//!
//! # 使用示例
//! ```ignore
//! use hazel_notify::{EngineBuilder, NotificationEvent};
//!
//! let dispatcher = EngineBuilder::new().with_default_sinks().build();
//! let event = NotificationEvent::new("general", "bob", "hi there");
//! let report = dispatcher.dispatch(&event).await?;
//! ```

pub mod builder;
pub mod config;
pub mod context;
pub mod decision;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod sink;

pub use builder::EngineBuilder;
pub use config::EngineConfig;
pub use context::{ContextProvider, NotificationContext, StaticContextProvider};
pub use decision::{decide, DecisionPolicy, NotificationDecision, SuppressReason};
pub use dispatcher::{DispatchReport, NotificationDispatcher};
pub use error::DecisionError;
pub use event::{ChannelId, NotificationEvent, NotificationEventBuilder};
pub use sink::{
    default_suppress_reason, CommandNotifier, CommandPlayer, NativeNotifier, NativeSink,
    NotificationSink, SinkResult, SinkStatus, SoundPlayer, SoundSink, NATIVE_SINK, SOUND_SINK,
};
