//! `source`：把调用方给出的候选集合规整为统一的 `CandidateSource`。
//!
//! - 静态序列：会话开始时 preprocess 一次
//! - 生成函数：每个不同的查询调用一次，结果每次都要重新 preprocess

use std::fmt;

use crate::{
    error::{GeneratorError, NarrowError, Result},
    model::Candidate,
};

/// 生成函数的一次输出。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generated {
    pub candidates: Vec<Candidate>,
    /// 覆盖展示用查询串（只影响高亮与提示，不影响"原始输入"）
    pub display_query: Option<String>,
}

impl Generated {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            display_query: None,
        }
    }

    pub fn with_display_query(mut self, display_query: impl Into<String>) -> Self {
        self.display_query = Some(display_query.into());
        self
    }
}

/// 动态候选源：`query -> Generated`，同步调用，要求单次调用足够便宜。
pub trait Generator: Send + Sync {
    fn generate(&self, query: &str) -> Result<Generated, GeneratorError>;
}

impl<F> Generator for F
where
    F: Fn(&str) -> Result<Generated, GeneratorError> + Send + Sync,
{
    fn generate(&self, query: &str) -> Result<Generated, GeneratorError> {
        self(query)
    }
}

/// 调用方可能给出的各种候选集合形状。
pub enum RawCollection {
    /// 纯文本列表
    Strings(Vec<String>),
    /// 已结构化的候选
    Candidates(Vec<Candidate>),
    /// `(展示文本, 提交值)` 对
    Pairs(Vec<(String, String)>),
    /// 表格行：`text [full_form [prefix [suffix [right_margin]]]]`，空串视为缺省
    Rows(Vec<Vec<String>>),
    /// 生成函数
    Generator(Box<dyn Generator>),
}

impl fmt::Debug for RawCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strings(v) => f.debug_tuple("Strings").field(&v.len()).finish(),
            Self::Candidates(v) => f.debug_tuple("Candidates").field(&v.len()).finish(),
            Self::Pairs(v) => f.debug_tuple("Pairs").field(&v.len()).finish(),
            Self::Rows(v) => f.debug_tuple("Rows").field(&v.len()).finish(),
            Self::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// 统一后的候选源。
pub enum CandidateSource {
    Static(Vec<Candidate>),
    Dynamic(Box<dyn Generator>),
}

impl CandidateSource {
    pub fn from_generator(generator: impl Generator + 'static) -> Self {
        Self::Dynamic(Box::new(generator))
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic(_))
    }
}

impl fmt::Debug for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(v) => f.debug_tuple("Static").field(&v.len()).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<Vec<Candidate>> for CandidateSource {
    fn from(candidates: Vec<Candidate>) -> Self {
        Self::Static(candidates)
    }
}

impl From<Vec<&str>> for CandidateSource {
    fn from(texts: Vec<&str>) -> Self {
        Self::Static(texts.into_iter().map(Candidate::from).collect())
    }
}

/// 把原始集合规整为 `CandidateSource`；表格行列数非法时返回 `InvalidCollectionShape`。
pub fn normalize(raw: RawCollection) -> Result<CandidateSource> {
    let candidates = match raw {
        RawCollection::Strings(texts) => texts.into_iter().map(Candidate::from).collect(),
        RawCollection::Candidates(candidates) => candidates,
        RawCollection::Pairs(pairs) => pairs
            .into_iter()
            .map(|(text, full)| Candidate::new(text).with_full_form(full))
            .collect(),
        RawCollection::Rows(rows) => rows
            .into_iter()
            .enumerate()
            .map(|(row, columns)| candidate_from_row(row, columns))
            .collect::<Result<Vec<_>>>()?,
        RawCollection::Generator(generator) => return Ok(CandidateSource::Dynamic(generator)),
    };
    Ok(CandidateSource::Static(candidates))
}

fn candidate_from_row(row: usize, columns: Vec<String>) -> Result<Candidate> {
    if columns.is_empty() || columns.len() > 5 {
        return Err(NarrowError::InvalidCollectionShape {
            row,
            columns: columns.len(),
        });
    }
    let mut it = columns.into_iter();
    let mut next = || it.next().filter(|s| !s.is_empty());
    let text = next().unwrap_or_default();
    Ok(Candidate {
        text,
        full_form: next(),
        prefix: next(),
        suffix: next(),
        right_margin: next(),
        highlights: Vec::new(),
    })
}
