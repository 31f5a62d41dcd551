//! `pipeline`：Preprocess -> Refine -> Highlight 三段可替换流水线。
//!
//! 约定：
//! - 每个阶段返回新的序列，不修改调用方可见的输入
//! - 每个阶段都可以重排/过滤/装饰
//! - 排序策略、光标与视口只依赖阶段的输入输出形状，不依赖默认实现

use std::fmt;

use crate::{
    filter::{FirstMatch, LiteralSubstring, StableSort},
    model::Candidate,
};

/// Preprocess：候选进入 refine 之前的整理（通常是排序）。
pub trait Preprocessor: Send + Sync {
    fn preprocess(&self, candidates: Vec<Candidate>) -> Vec<Candidate>;
}

/// Refine：按查询串过滤/重排。
pub trait Refiner: Send + Sync {
    fn refine(&self, query: &str, candidates: &[Candidate]) -> Vec<Candidate>;
}

/// Highlight：只作用于即将展示的那一页候选。
pub trait Highlighter: Send + Sync {
    fn highlight(&self, query: &str, displayed: &[Candidate]) -> Vec<Candidate>;
}

impl<F> Preprocessor for F
where
    F: Fn(Vec<Candidate>) -> Vec<Candidate> + Send + Sync,
{
    fn preprocess(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        self(candidates)
    }
}

impl<F> Refiner for F
where
    F: Fn(&str, &[Candidate]) -> Vec<Candidate> + Send + Sync,
{
    fn refine(&self, query: &str, candidates: &[Candidate]) -> Vec<Candidate> {
        self(query, candidates)
    }
}

impl<F> Highlighter for F
where
    F: Fn(&str, &[Candidate]) -> Vec<Candidate> + Send + Sync,
{
    fn highlight(&self, query: &str, displayed: &[Candidate]) -> Vec<Candidate> {
        self(query, displayed)
    }
}

/// 三个策略槽位；未替换的槽位使用默认实现。
///
/// 默认 preprocess 受 `sort_enabled` 控制（关闭时原样返回，方便保留生产者自己的顺序）；
/// 自定义 preprocess 则总是被调用。
pub struct Pipeline {
    preprocessor: Option<Box<dyn Preprocessor>>,
    refiner: Box<dyn Refiner>,
    highlighter: Box<dyn Highlighter>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            preprocessor: None,
            refiner: Box::new(LiteralSubstring),
            highlighter: Box::new(FirstMatch),
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("custom_preprocessor", &self.preprocessor.is_some())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preprocessor(mut self, preprocessor: impl Preprocessor + 'static) -> Self {
        self.preprocessor = Some(Box::new(preprocessor));
        self
    }

    pub fn with_refiner(mut self, refiner: impl Refiner + 'static) -> Self {
        self.refiner = Box::new(refiner);
        self
    }

    pub fn with_highlighter(mut self, highlighter: impl Highlighter + 'static) -> Self {
        self.highlighter = Box::new(highlighter);
        self
    }

    pub fn preprocess(&self, candidates: Vec<Candidate>, sort_enabled: bool) -> Vec<Candidate> {
        match &self.preprocessor {
            Some(custom) => custom.preprocess(candidates),
            None if sort_enabled => StableSort.preprocess(candidates),
            None => candidates,
        }
    }

    pub fn refine(&self, query: &str, candidates: &[Candidate]) -> Vec<Candidate> {
        self.refiner.refine(query, candidates)
    }

    pub fn highlight(&self, query: &str, displayed: &[Candidate]) -> Vec<Candidate> {
        self.highlighter.highlight(query, displayed)
    }
}
