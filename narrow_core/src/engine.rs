use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    pipeline::Pipeline,
    session::{Session, SessionOptions},
    source::{CandidateSource, RawCollection, normalize},
};

/// 默认页大小。
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// 引擎配置：会话开始时读取一次，计算过程中不再读取外部状态。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct EngineConfig {
    /// 默认 preprocess 是否排序；关闭后保留候选生产者自己的顺序
    pub sort_enabled: bool,
    /// 默认页大小（会话选项可覆盖）
    pub page_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sort_enabled: true,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sort_enabled(mut self, enable: bool) -> Self {
        self.sort_enabled = enable;
        self
    }

    /// 设置页大小；0 会回退到默认值。
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        self
    }
}

/// 引擎：持有配置与流水线策略，负责开启会话。
///
/// 结构上对应整条流水线：
/// - source（规整） -> preprocess -> refine -> ordering -> cursor -> viewport -> highlight -> 输出 ViewState
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
    pipeline: Arc<Pipeline>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            pipeline: Arc::new(Pipeline::default()),
        }
    }

    /// 替换流水线（可只替换其中某几个阶段，见 `Pipeline::with_*`）。
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = Arc::new(pipeline);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 开启会话：静态候选 preprocess 一次，并立即对初始查询串重算。
    pub fn start_session(
        &self,
        prompt: impl Into<String>,
        source: impl Into<CandidateSource>,
        options: SessionOptions,
    ) -> Result<Session> {
        Session::start(
            Arc::clone(&self.pipeline),
            &self.config,
            prompt,
            source.into(),
            options,
        )
    }

    /// 先规整原始集合再开启会话；形状非法时会话无法启动。
    pub fn start_session_raw(
        &self,
        prompt: impl Into<String>,
        raw: RawCollection,
        options: SessionOptions,
    ) -> Result<Session> {
        let source = normalize(raw)?;
        self.start_session(prompt, source, options)
    }
}
