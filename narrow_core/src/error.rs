//! `error`：会话与流水线的错误类型。
//!
//! 约定：
//! - 只有会话启动阶段的错误会中止会话（`InvalidCollectionShape`）
//! - 单次事件失败时，事件之前的状态保持权威，不会被部分修改
//! - 导航/多选切换是纯钳位运算，不会产生错误

use thiserror::Error;

/// 动态候选源抛出的错误。
pub type GeneratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum NarrowError {
    /// 动态候选源在处理某个查询时失败；上一次的视图保持不变。
    #[error("候选源生成失败（query = {query:?}）：{source}")]
    GeneratorFailure {
        query: String,
        #[source]
        source: GeneratorError,
    },

    /// 静态候选集合无法规整为候选（会话无法启动）。
    #[error("候选集合第 {row} 项形状非法：{columns} 列（应为 1..=5 列）")]
    InvalidCollectionShape { row: usize, columns: usize },

    /// 要求必须匹配候选时，尝试提交原始输入。
    #[error("必须选择一个候选：{input:?} 不在候选列表中")]
    NoMatchRequired { input: String },

    /// 历史子会话没有可选条目。
    #[error("没有历史记录")]
    EmptyHistory,

    /// 会话已提交或取消。
    #[error("会话已结束")]
    SessionClosed,
}

impl NarrowError {
    /// 是否可恢复：可恢复错误只拒绝当前事件，会话继续。
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::GeneratorFailure { .. } | Self::NoMatchRequired { .. } | Self::EmptyHistory
        )
    }
}

pub type Result<T, E = NarrowError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_errors_keep_session_alive() {
        let failure = NarrowError::GeneratorFailure {
            query: "x".to_string(),
            source: "boom".into(),
        };
        assert!(failure.is_recoverable());
        assert!(NarrowError::EmptyHistory.is_recoverable());
        assert!(
            NarrowError::NoMatchRequired {
                input: "x".to_string()
            }
            .is_recoverable()
        );
        assert!(!NarrowError::SessionClosed.is_recoverable());
        assert!(
            !NarrowError::InvalidCollectionShape { row: 0, columns: 7 }.is_recoverable()
        );
    }

    #[test]
    fn generator_failure_exposes_source() {
        let failure = NarrowError::GeneratorFailure {
            query: "q".to_string(),
            source: "backend down".into(),
        };
        let source = std::error::Error::source(&failure).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("backend down"));
        assert!(failure.to_string().contains("backend down"));
    }
}
