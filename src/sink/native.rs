//! 系统通知 Sink
//!
//! 把事件内容格式化成标题和正文，交给注入的 `NativeNotifier` 后端展示。
//! 默认后端通过命令行调用系统通知接口（macOS osascript / Linux notify-send），
//! 测试时注入 mock 后端即可。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::decision::NotificationDecision;
use crate::event::NotificationEvent;
use crate::sink::{suppressed_result, NotificationSink, SinkResult, NATIVE_SINK};

/// 正文最大长度，超出部分截断
const MAX_BODY_LEN: usize = 200;

/// 系统通知后端
#[async_trait]
pub trait NativeNotifier: Send + Sync {
    async fn show(&self, title: &str, body: &str) -> Result<()>;
}

/// 命令行后端 - 调用平台自带的通知命令
#[derive(Debug, Default)]
pub struct CommandNotifier;

impl CommandNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NativeNotifier for CommandNotifier {
    async fn show(&self, title: &str, body: &str) -> Result<()> {
        let output = if cfg!(target_os = "macos") {
            let script = format!(
                "display notification \"{}\" with title \"{}\"",
                escape_applescript(body),
                escape_applescript(title)
            );
            Command::new("osascript")
                .args(["-e", script.as_str()])
                .output()
                .await?
        } else {
            Command::new("notify-send").args([title, body]).output().await?
        };

        if output.status.success() {
            Ok(())
        } else {
            anyhow::bail!(
                "notifier exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )
        }
    }
}

/// AppleScript 字符串转义
fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// 从事件构建通知内容（标题 + 正文）
pub fn build_content(event: &NotificationEvent) -> (String, String) {
    let title = if event.channel.is_empty() {
        event.author.clone()
    } else {
        format!("{} (#{})", event.author, event.channel)
    };
    (title, truncate(&event.message, MAX_BODY_LEN))
}

/// 按字符截断，保留 UTF-8 边界
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// 系统通知 Sink
pub struct NativeSink {
    notifier: Arc<dyn NativeNotifier>,
    timeout: Duration,
}

impl NativeSink {
    /// 创建 Sink，后端由调用方注入
    pub fn new(notifier: Arc<dyn NativeNotifier>) -> Self {
        Self {
            notifier,
            timeout: Duration::from_secs(3),
        }
    }

    /// 覆盖默认超时（链式调用）
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl NotificationSink for NativeSink {
    fn name(&self) -> &str {
        NATIVE_SINK
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn handle(
        &self,
        event: &NotificationEvent,
        decision: &NotificationDecision,
    ) -> SinkResult {
        if !decision.send_native {
            return suppressed_result(NATIVE_SINK, decision);
        }

        let (title, body) = build_content(event);
        match self.notifier.show(&title, &body).await {
            Ok(()) => {
                debug!(sink = NATIVE_SINK, event_id = %event.id, "Native notification shown");
                SinkResult::sent(NATIVE_SINK)
            }
            Err(e) => {
                warn!(sink = NATIVE_SINK, event_id = %event.id, error = %e, "Native notification failed");
                SinkResult::failed(NATIVE_SINK, "delivery_error", e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::SuppressReason;
    use crate::sink::SinkStatus;

    struct OkNotifier;

    #[async_trait]
    impl NativeNotifier for OkNotifier {
        async fn show(&self, _title: &str, _body: &str) -> Result<()> {
            Ok(())
        }
    }

    struct DeniedNotifier;

    #[async_trait]
    impl NativeNotifier for DeniedNotifier {
        async fn show(&self, _title: &str, _body: &str) -> Result<()> {
            anyhow::bail!("permission denied")
        }
    }

    fn event() -> NotificationEvent {
        NotificationEvent::new("c1", "bob", "hi").with_id("e1")
    }

    fn enabled() -> NotificationDecision {
        NotificationDecision {
            send_native: true,
            play_sound: true,
            reasons: vec![],
        }
    }

    #[test]
    fn test_build_content() {
        let (title, body) = build_content(&event());
        assert_eq!(title, "bob (#c1)");
        assert_eq!(body, "hi");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long message", 10), "this is...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // 按字符数截断，不应在 UTF-8 边界 panic
        let s = "消息".repeat(200);
        let out = truncate(&s, 10);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 10);
    }

    #[test]
    fn test_escape_applescript() {
        assert_eq!(escape_applescript(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape_applescript(r"a\b"), r"a\\b");
    }

    #[tokio::test]
    async fn test_sent_on_success() {
        let sink = NativeSink::new(Arc::new(OkNotifier));
        let result = sink.handle(&event(), &enabled()).await;
        assert_eq!(result.status, SinkStatus::Sent);
        assert_eq!(result.sink, "native");
    }

    #[tokio::test]
    async fn test_failed_on_backend_error() {
        let sink = NativeSink::new(Arc::new(DeniedNotifier));
        let result = sink.handle(&event(), &enabled()).await;
        assert_eq!(result.status, SinkStatus::Failed);
        assert_eq!(result.reason.as_deref(), Some("delivery_error"));
        assert!(result.error.unwrap().contains("permission denied"));
    }

    #[tokio::test]
    async fn test_suppressed_reads_decision_reason() {
        let sink = NativeSink::new(Arc::new(OkNotifier));
        let decision = NotificationDecision {
            send_native: false,
            play_sound: false,
            reasons: vec![SuppressReason::ChannelMuted],
        };
        let result = sink.handle(&event(), &decision).await;
        assert_eq!(result.status, SinkStatus::Suppressed);
        assert_eq!(result.reason.as_deref(), Some("channel_muted"));
    }
}
