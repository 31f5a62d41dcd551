//! `select`：多选累积与提交结果的组装。

use crate::{
    error::{NarrowError, Result},
    model::Candidate,
};

/// 多选集合：只存提交值，每个值至多一次，按选择顺序。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    values: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已选则移除，未选则追加；返回切换后是否处于选中状态。
    pub fn toggle(&mut self, value: &str) -> bool {
        if let Some(pos) = self.values.iter().position(|v| v == value) {
            self.values.remove(pos);
            false
        } else {
            self.values.push(value.to_owned());
            true
        }
    }

    /// 追加（已存在则忽略）。
    pub fn insert(&mut self, value: &str) {
        if !self.contains(value) {
            self.values.push(value.to_owned());
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 会话的最终结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Single(String),
    /// 多选：按选择顺序
    Multiple(Vec<String>),
}

impl Outcome {
    pub fn values(&self) -> Vec<String> {
        match self {
            Self::Single(v) => vec![v.clone()],
            Self::Multiple(v) => v.clone(),
        }
    }
}

/// 提交目标：某个候选，或"原始输入"。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Candidate(usize),
    Input,
}

/// 把提交目标解析为提交值。
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    pub refined: &'a [Candidate],
    /// 用户实际输入的查询串
    pub query: &'a str,
    pub default_candidate: Option<&'a Candidate>,
    pub require_match: bool,
}

impl Resolver<'_> {
    /// - 候选下标：该候选的提交值（越界视为原始输入）
    /// - 原始输入：查询串；查询串为空时回退到默认候选，再回退到空串
    /// - `require_match` 时原始输入被拒绝
    pub fn resolve(&self, target: Target) -> Result<String> {
        if let Target::Candidate(i) = target {
            if let Some(c) = self.refined.get(i) {
                return Ok(c.full_form().to_owned());
            }
        }
        if self.require_match {
            return Err(NarrowError::NoMatchRequired {
                input: self.query.to_owned(),
            });
        }
        if !self.query.is_empty() {
            return Ok(self.query.to_owned());
        }
        Ok(self
            .default_candidate
            .map(|c| c.full_form().to_owned())
            .unwrap_or_default())
    }

    /// 提交字面输入：`require_match` 时只有当某个候选文本恰好等于输入才允许。
    pub fn resolve_exact(&self) -> Result<String> {
        if !self.require_match {
            return Ok(self.query.to_owned());
        }
        self.refined
            .iter()
            .find(|c| c.text == self.query)
            .map(|c| c.full_form().to_owned())
            .ok_or_else(|| NarrowError::NoMatchRequired {
                input: self.query.to_owned(),
            })
    }
}

/// 组装最终结果：多选时把 `value` 并入集合并返回整个集合。
pub fn assemble(selection: &mut Selection, value: String, multi_select: bool) -> Outcome {
    if multi_select {
        selection.insert(&value);
        Outcome::Multiple(selection.as_slice().to_vec())
    } else {
        Outcome::Single(value)
    }
}
