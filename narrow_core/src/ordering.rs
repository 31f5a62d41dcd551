//! `ordering`：refine 之后、光标重算之前的确定性重排。
//!
//! 固定顺序：
//! 1. `move_default_to_front` 时，把与默认候选提交值相同的项移到最前
//! 2. 总是把文本恰好等于原始输入的项移到最前
//!
//! 两步都是稳定划分：命中项与其余项各自保持相对顺序。

use crate::model::Candidate;

/// 稳定划分：命中 `pred` 的项按原顺序放到前面。
pub fn promote<F>(candidates: Vec<Candidate>, pred: F) -> Vec<Candidate>
where
    F: Fn(&Candidate) -> bool,
{
    let (mut front, rest): (Vec<_>, Vec<_>) = candidates.into_iter().partition(|c| pred(c));
    front.extend(rest);
    front
}

/// 排序策略的输入。
#[derive(Debug, Clone, Copy)]
pub struct OrderingPolicy<'a> {
    pub default_candidate: Option<&'a Candidate>,
    pub move_default_to_front: bool,
}

impl OrderingPolicy<'_> {
    pub fn apply(&self, refined: Vec<Candidate>, raw_input: &str) -> Vec<Candidate> {
        let mut out = refined;
        if self.move_default_to_front {
            if let Some(default) = self.default_candidate {
                out = promote(out, |c| c.same_value(default));
            }
        }
        if !raw_input.is_empty() {
            out = promote(out, |c| c.text == raw_input);
        }
        out
    }
}
