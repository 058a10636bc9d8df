//! 通知分发器 - 决策一次，并发扇出到所有 Sink
//!
//! # 设计目标
//! 1. 并发扇出：所有 Sink 对同一事件并行执行，慢 Sink 不拖慢其他 Sink
//! 2. 结果完整：每次分发为每个已注册 Sink 产出恰好一个结果，部分失败也不例外
//! 3. 故障隔离：Sink 超时、报错甚至 panic 都只影响自己那一条结果
//! 4. 无共享状态：分发过程只读注册表和上下文快照，可安全并发重入

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::context::ContextProvider;
use crate::decision::{decide, DecisionPolicy, NotificationDecision, SuppressReason};
use crate::error::DecisionError;
use crate::event::NotificationEvent;
use crate::sink::{NotificationSink, SinkResult};

/// 一次分发的聚合报告
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    /// 对应的事件 ID
    pub event_id: String,
    /// 本次分发使用的决策
    pub decision: NotificationDecision,
    /// 按注册顺序排列的各 Sink 结果
    pub results: Vec<SinkResult>,
}

impl DispatchReport {
    /// 按 Sink 标识查结果
    pub fn result_for(&self, sink: &str) -> Option<&SinkResult> {
        self.results.iter().find(|r| r.sink == sink)
    }
}

/// 通知分发器
pub struct NotificationDispatcher {
    /// 所有注册的 Sink（注册顺序即报告顺序）
    sinks: Vec<Arc<dyn NotificationSink>>,
    /// 上下文提供方，每次分发开始时取一次快照
    context: Arc<dyn ContextProvider>,
    policy: DecisionPolicy,
    /// dry-run 模式：决策照常计算，但不触发任何副作用
    dry_run: bool,
}

impl NotificationDispatcher {
    /// 创建分发器
    pub fn new(context: Arc<dyn ContextProvider>) -> Self {
        Self {
            sinks: Vec::new(),
            context,
            policy: DecisionPolicy::default(),
            dry_run: false,
        }
    }

    /// 设置决策策略
    pub fn with_policy(mut self, policy: DecisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 设置 dry-run 模式
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 注册 Sink
    ///
    /// 注册需要 `&mut self`，借用规则保证注册变更不会落在进行中的分发上。
    pub fn register_sink(&mut self, sink: Arc<dyn NotificationSink>) {
        info!(sink = sink.name(), "Registering notification sink");
        self.sinks.push(sink);
    }

    /// 已注册的 Sink 数量
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// 已注册的 Sink 标识
    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// 分发一个事件
    ///
    /// 决策计算一次，然后并发调用所有 Sink，逐个套用各自的超时上限。
    /// 只有事件前置条件错误会以 `Err` 返回；Sink 层面的任何故障都折叠进报告。
    pub async fn dispatch(
        &self,
        event: &NotificationEvent,
    ) -> Result<DispatchReport, DecisionError> {
        let context = self.context.snapshot();
        let decision = decide(event, &context, &self.policy)?;

        debug!(
            event_id = %event.id,
            send_native = decision.send_native,
            play_sound = decision.play_sound,
            "Decision computed"
        );

        if self.dry_run {
            let results = self
                .sinks
                .iter()
                .map(|s| SinkResult::suppressed(s.name(), SuppressReason::DryRun))
                .collect();
            return Ok(DispatchReport {
                event_id: event.id.clone(),
                decision,
                results,
            });
        }

        let mut tasks = tokio::task::JoinSet::new();
        let mut task_meta: HashMap<tokio::task::Id, (usize, String)> = HashMap::new();

        for (idx, sink) in self.sinks.iter().enumerate() {
            let sink = Arc::clone(sink);
            let name = sink.name().to_string();
            let event = event.clone();
            let decision = decision.clone();

            let handle = tasks.spawn(async move {
                let limit = sink.timeout();
                match tokio::time::timeout(limit, sink.handle(&event, &decision)).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(
                            sink = sink.name(),
                            timeout_ms = limit.as_millis() as u64,
                            "Sink timed out"
                        );
                        SinkResult::failed(
                            sink.name(),
                            "timeout",
                            format!("no result within {}ms", limit.as_millis()),
                        )
                    }
                }
            });
            task_meta.insert(handle.id(), (idx, name));
        }

        let mut slots: Vec<Option<SinkResult>> = vec![None; self.sinks.len()];
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, result)) => {
                    if let Some((idx, _)) = task_meta.get(&id) {
                        slots[*idx] = Some(result);
                    }
                }
                // Sink 违反自身契约（panic）：转为 failed 结果并单独标记，
                // 以便在源头修复，而不是拖垮整次分发
                Err(join_err) => {
                    if let Some((idx, name)) = task_meta.get(&join_err.id()) {
                        warn!(
                            sink = %name,
                            error = %join_err,
                            "Sink violated its contract; recording failed result"
                        );
                        slots[*idx] = Some(SinkResult::failed(
                            name.clone(),
                            "contract_violation",
                            join_err.to_string(),
                        ));
                    }
                }
            }
        }

        let results = slots
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| {
                slot.unwrap_or_else(|| {
                    SinkResult::failed(
                        self.sinks[idx].name(),
                        "contract_violation",
                        "sink task produced no result",
                    )
                })
            })
            .collect();

        Ok(DispatchReport {
            event_id: event.id.clone(),
            decision,
            results,
        })
    }
}
