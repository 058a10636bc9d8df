//! Hazel 通知引擎 CLI
//!
//! 手动验证决策策略和 Sink 分发：`hzn decide` 只计算决策，
//! `hzn send` 构建默认引擎并真实分发一次。

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use hazel_notify::{
    decide, DispatchReport, EngineBuilder, EngineConfig, NotificationContext, NotificationEvent,
    SinkStatus, StaticContextProvider,
};

#[derive(Parser)]
#[command(name = "hzn")]
#[command(about = "Hazel notification decision & dispatch engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 只计算决策，不触发任何 Sink
    Decide {
        #[command(flatten)]
        event: EventArgs,
        #[command(flatten)]
        context: ContextArgs,
        /// 输出 JSON 格式
        #[arg(long)]
        json: bool,
    },
    /// 构建默认引擎并分发一次通知
    Send {
        #[command(flatten)]
        event: EventArgs,
        #[command(flatten)]
        context: ContextArgs,
        /// 不触发副作用，只打印将要执行的分发
        #[arg(long)]
        dry_run: bool,
        /// 输出 JSON 格式
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct EventArgs {
    /// 事件所属频道
    #[arg(long, default_value = "general")]
    channel: String,
    /// 发送者展示名
    #[arg(long, default_value = "hzn")]
    author: String,
    /// 消息内容
    #[arg(long, default_value = "test notification")]
    message: String,
}

#[derive(Args)]
struct ContextArgs {
    /// 模拟窗口持有焦点
    #[arg(long)]
    focused: bool,
    /// 模拟当前打开的频道
    #[arg(long)]
    open_channel: Option<String>,
    /// 模拟静音频道（可重复）
    #[arg(long)]
    muted: Vec<String>,
    /// 模拟声音开关关闭
    #[arg(long)]
    no_sound: bool,
}

impl ContextArgs {
    fn to_context(&self) -> NotificationContext {
        NotificationContext {
            window_focused: self.focused,
            open_channel: self.open_channel.clone(),
            muted_channels: self.muted.iter().cloned().collect::<HashSet<_>>(),
            sound_enabled: !self.no_sound,
        }
    }
}

impl EventArgs {
    fn to_event(&self) -> NotificationEvent {
        NotificationEvent::new(
            self.channel.as_str(),
            self.author.as_str(),
            self.message.as_str(),
        )
    }
}

fn load_config() -> EngineConfig {
    match EngineConfig::load() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            EngineConfig::default()
        }
    }
}

fn print_report(report: &DispatchReport) {
    println!("event:    {}", report.event_id);
    println!(
        "decision: native={} sound={} reasons={:?}",
        report.decision.send_native,
        report.decision.play_sound,
        report
            .decision
            .reasons
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
    );
    for result in &report.results {
        let status = match result.status {
            SinkStatus::Sent => "sent",
            SinkStatus::Suppressed => "suppressed",
            SinkStatus::Failed => "failed",
        };
        let detail = result
            .reason
            .as_deref()
            .or(result.error.as_deref())
            .unwrap_or("-");
        println!("  {:<8} {:<10} {}", result.sink, status, detail);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decide {
            event,
            context,
            json,
        } => {
            let config = load_config();
            let decision = decide(&event.to_event(), &context.to_context(), &config.policy)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&decision)?);
            } else {
                println!(
                    "native={} sound={} reasons={:?}",
                    decision.send_native,
                    decision.play_sound,
                    decision.reasons.iter().map(|r| r.as_str()).collect::<Vec<_>>()
                );
            }
        }
        Commands::Send {
            event,
            context,
            dry_run,
            json,
        } => {
            let config = load_config();
            let provider = Arc::new(StaticContextProvider::new(context.to_context()));
            let dispatcher = EngineBuilder::from_config(config)
                .context(provider)
                .with_default_sinks()
                .dry_run(dry_run)
                .build();

            let report = dispatcher.dispatch(&event.to_event()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
    }

    Ok(())
}
