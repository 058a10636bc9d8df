//! 引擎构建器 - 按配置组装分发器
//!
//! 所有依赖（上下文提供方、Sink 后端）都在这里显式注入，
//! 没有模块级全局状态，同一进程可以并存多个引擎实例。

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::EngineConfig;
use crate::context::{ContextProvider, StaticContextProvider};
use crate::dispatcher::NotificationDispatcher;
use crate::sink::{CommandNotifier, CommandPlayer, NativeSink, NotificationSink, SoundSink};

/// 引擎构建器
pub struct EngineBuilder {
    config: EngineConfig,
    context: Option<Arc<dyn ContextProvider>>,
    sinks: Vec<Arc<dyn NotificationSink>>,
    dry_run: bool,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::from_config(EngineConfig::default())
    }

    /// 用给定配置创建构建器
    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            context: None,
            sinks: Vec::new(),
            dry_run: false,
        }
    }

    /// 注入上下文提供方
    pub fn context(mut self, provider: Arc<dyn ContextProvider>) -> Self {
        self.context = Some(provider);
        self
    }

    /// 注册一个 Sink
    pub fn sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// 设置 dry-run 模式
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 注册平台默认的两个 Sink（系统通知 + 声音）
    pub fn with_default_sinks(mut self) -> Self {
        let native = NativeSink::new(Arc::new(CommandNotifier::new()))
            .with_timeout(Duration::from_millis(self.config.native_timeout_ms));
        self.sinks.push(Arc::new(native));

        let player = match (&self.config.sound_command, &self.config.sound_file) {
            (Some(cmd), Some(file)) => CommandPlayer::new(cmd.as_str(), file.as_str()),
            _ => CommandPlayer::default(),
        };
        let sound = SoundSink::new(Arc::new(player))
            .with_timeout(Duration::from_millis(self.config.sound_timeout_ms));
        self.sinks.push(Arc::new(sound));

        self
    }

    /// 组装分发器
    pub fn build(self) -> NotificationDispatcher {
        let context = self
            .context
            .unwrap_or_else(|| Arc::new(StaticContextProvider::default()));

        let mut dispatcher = NotificationDispatcher::new(context)
            .with_policy(self.config.policy.clone())
            .with_dry_run(self.dry_run);

        for sink in self.sinks {
            dispatcher.register_sink(sink);
        }

        info!(
            sinks = dispatcher.sink_count(),
            dry_run = self.dry_run,
            "Notification engine built"
        );
        dispatcher
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
