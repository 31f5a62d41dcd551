//! `filter`：流水线各阶段的具体实现。
//!
//! 默认：
//! - `StableSort`：按 (字符数, 文本) 升序稳定排序
//! - `LiteralSubstring`：区分大小写的字面子串过滤，保持顺序
//! - `FirstMatch`：标记第一个匹配区间
//!
//! 可选替代（不是默认行为）：`SmartCase`，以及 `regex` feature 下的 `RegexRefiner`。

use crate::{
    model::{Candidate, Face, Highlight},
    pipeline::{Highlighter, Preprocessor, Refiner},
};

/// 默认 preprocess：按 `(text 字符数, text)` 升序；`sort_by` 本身是稳定的。
#[derive(Debug, Clone, Copy, Default)]
pub struct StableSort;

impl Preprocessor for StableSort {
    fn preprocess(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.sort_by(|a, b| {
            a.text
                .chars()
                .count()
                .cmp(&b.text.chars().count())
                .then_with(|| a.text.cmp(&b.text))
        });
        candidates
    }
}

/// 默认 refine：`text` 包含查询串（字面、区分大小写）即保留；空查询保留全部。
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralSubstring;

impl Refiner for LiteralSubstring {
    fn refine(&self, query: &str, candidates: &[Candidate]) -> Vec<Candidate> {
        candidates
            .iter()
            .filter(|c| c.text.contains(query))
            .cloned()
            .collect()
    }
}

/// smart-case：查询串全小写时忽略大小写，含大写字母时退化为 `LiteralSubstring`。
#[derive(Debug, Clone, Copy, Default)]
pub struct SmartCase;

impl Refiner for SmartCase {
    fn refine(&self, query: &str, candidates: &[Candidate]) -> Vec<Candidate> {
        if query.chars().any(char::is_uppercase) {
            return LiteralSubstring.refine(query, candidates);
        }
        candidates
            .iter()
            .filter(|c| c.text.to_lowercase().contains(query))
            .cloned()
            .collect()
    }
}

/// 把查询串当作正则；非法的正则按字面串匹配。
#[cfg(feature = "regex")]
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexRefiner;

#[cfg(feature = "regex")]
impl Refiner for RegexRefiner {
    fn refine(&self, query: &str, candidates: &[Candidate]) -> Vec<Candidate> {
        let re = match regex::Regex::new(query) {
            Ok(re) => re,
            Err(err) => {
                tracing::debug!(%err, query, "invalid pattern, matching literally");
                match regex::Regex::new(&regex::escape(query)) {
                    Ok(re) => re,
                    Err(_) => return LiteralSubstring.refine(query, candidates),
                }
            }
        };
        candidates
            .iter()
            .filter(|c| re.is_match(&c.text))
            .cloned()
            .collect()
    }
}

/// 默认 highlight：标记 `text` 中第一次出现查询串的区间。
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatch;

impl Highlighter for FirstMatch {
    fn highlight(&self, query: &str, displayed: &[Candidate]) -> Vec<Candidate> {
        displayed
            .iter()
            .map(|c| {
                let mut c = c.clone();
                if !query.is_empty() {
                    if let Some(start) = c.text.find(query) {
                        c.highlights = vec![Highlight {
                            range: start..start + query.len(),
                            face: Face::Primary,
                        }];
                    }
                }
                c
            })
            .collect()
    }
}
