//! 声音提示 Sink
//!
//! 声音管理器作为依赖注入，Sink 只负责把决策映射成一次播放请求。
//! 默认后端通过命令行播放本地音频文件（macOS afplay / Linux paplay）。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::decision::NotificationDecision;
use crate::event::NotificationEvent;
use crate::sink::{suppressed_result, NotificationSink, SinkResult, SOUND_SINK};

/// 声音播放后端
#[async_trait]
pub trait SoundPlayer: Send + Sync {
    /// 播放一次提示音，`notification_id` 用于日志关联
    async fn play(&self, notification_id: &str) -> Result<()>;
}

/// 命令行后端 - 调用平台播放器播放提示音文件
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    command: String,
    sound_file: String,
}

impl CommandPlayer {
    pub fn new(command: impl Into<String>, sound_file: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            sound_file: sound_file.into(),
        }
    }
}

impl Default for CommandPlayer {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            Self::new("afplay", "/System/Library/Sounds/Pop.aiff")
        } else {
            Self::new("paplay", "/usr/share/sounds/freedesktop/stereo/message.oga")
        }
    }
}

#[async_trait]
impl SoundPlayer for CommandPlayer {
    async fn play(&self, notification_id: &str) -> Result<()> {
        debug!(notification_id = %notification_id, command = %self.command, "Playing notification sound");
        let output = Command::new(&self.command)
            .arg(&self.sound_file)
            .output()
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            anyhow::bail!(
                "player exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )
        }
    }
}

/// 声音提示 Sink
pub struct SoundSink {
    player: Arc<dyn SoundPlayer>,
    timeout: Duration,
}

impl SoundSink {
    /// 创建 Sink，播放器由调用方注入
    pub fn new(player: Arc<dyn SoundPlayer>) -> Self {
        Self {
            player,
            // 本地播放，超时比系统通知更紧
            timeout: Duration::from_secs(1),
        }
    }

    /// 覆盖默认超时（链式调用）
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl NotificationSink for SoundSink {
    fn name(&self) -> &str {
        SOUND_SINK
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn handle(
        &self,
        event: &NotificationEvent,
        decision: &NotificationDecision,
    ) -> SinkResult {
        if !decision.play_sound {
            return suppressed_result(SOUND_SINK, decision);
        }

        match self.player.play(&event.id).await {
            Ok(()) => {
                debug!(sink = SOUND_SINK, event_id = %event.id, "Notification sound played");
                SinkResult::sent(SOUND_SINK)
            }
            Err(e) => {
                warn!(sink = SOUND_SINK, event_id = %event.id, error = %e, "Notification sound failed");
                SinkResult::failed(SOUND_SINK, "delivery_error", e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::SuppressReason;
    use crate::sink::SinkStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPlayer {
        plays: AtomicUsize,
    }

    impl CountingPlayer {
        fn new() -> Self {
            Self {
                plays: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SoundPlayer for CountingPlayer {
        async fn play(&self, _notification_id: &str) -> Result<()> {
            self.plays.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct BusyPlayer;

    #[async_trait]
    impl SoundPlayer for BusyPlayer {
        async fn play(&self, _notification_id: &str) -> Result<()> {
            anyhow::bail!("audio device busy")
        }
    }

    fn event() -> NotificationEvent {
        NotificationEvent::new("c1", "bob", "hi").with_id("e1")
    }

    #[tokio::test]
    async fn test_sent_on_success() {
        let player = Arc::new(CountingPlayer::new());
        let sink = SoundSink::new(player.clone());
        let decision = NotificationDecision {
            send_native: true,
            play_sound: true,
            reasons: vec![],
        };

        let result = sink.handle(&event(), &decision).await;
        assert_eq!(result.status, SinkStatus::Sent);
        assert_eq!(player.plays.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_suppressed_skips_playback() {
        let player = Arc::new(CountingPlayer::new());
        let sink = SoundSink::new(player.clone());
        let decision = NotificationDecision {
            send_native: true,
            play_sound: false,
            reasons: vec![SuppressReason::SoundDisabled],
        };

        let result = sink.handle(&event(), &decision).await;
        assert_eq!(result.status, SinkStatus::Suppressed);
        assert_eq!(result.reason.as_deref(), Some("sound_disabled"));
        assert_eq!(player.plays.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_suppressed_default_reason_when_decision_has_none() {
        let sink = SoundSink::new(Arc::new(CountingPlayer::new()));
        let decision = NotificationDecision {
            send_native: true,
            play_sound: false,
            reasons: vec![],
        };

        let result = sink.handle(&event(), &decision).await;
        assert_eq!(result.reason.as_deref(), Some("focused_current_channel"));
    }

    #[tokio::test]
    async fn test_failed_on_backend_error() {
        let sink = SoundSink::new(Arc::new(BusyPlayer));
        let decision = NotificationDecision {
            send_native: true,
            play_sound: true,
            reasons: vec![],
        };

        let result = sink.handle(&event(), &decision).await;
        assert_eq!(result.status, SinkStatus::Failed);
        assert!(result.error.unwrap().contains("audio device busy"));
    }

    #[test]
    fn test_default_timeout_is_tighter_than_native() {
        let sink = SoundSink::new(Arc::new(BusyPlayer));
        assert_eq!(sink.timeout(), Duration::from_secs(1));
    }
}
