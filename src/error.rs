//! 引擎错误类型
//!
//! 只有决策前置条件失败才会以错误形式向调用方传播；
//! sink 投递失败一律折叠进 `SinkResult`，绝不抛回消息管道。

use thiserror::Error;

/// 决策前置条件错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionError {
    /// 事件缺少必填字段（调用方编程错误，而非运行时状态）
    #[error("event field `{0}` is required and must be non-empty")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DecisionError::MissingField("channel");
        assert_eq!(
            err.to_string(),
            "event field `channel` is required and must be non-empty"
        );
    }
}
