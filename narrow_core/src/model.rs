use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 候选（可被 UI 展示与用户选择）。
///
/// 注意：只有 `text` 参与匹配与高亮；`prefix/suffix/right_margin` 仅用于展示，
/// `full_form` 是提交时真正返回的值（缺省即 `text`）。
/// 流水线各阶段必须原样保留这些字段，只有提交时才剥离。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidate {
    /// 展示文本（匹配/高亮的对象）
    pub text: String,
    /// 提交值；None 表示与 `text` 相同
    pub full_form: Option<String>,
    /// 展示前缀（不参与匹配）
    pub prefix: Option<String>,
    /// 展示后缀（不参与匹配）
    pub suffix: Option<String>,
    /// 右侧补充信息（不参与匹配）
    pub right_margin: Option<String>,
    /// Highlight 阶段产生的标记区间（`text` 内的字节范围）
    pub highlights: Vec<Highlight>,
}

impl Candidate {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_full_form(mut self, full_form: impl Into<String>) -> Self {
        self.full_form = Some(full_form.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_right_margin(mut self, margin: impl Into<String>) -> Self {
        self.right_margin = Some(margin.into());
        self
    }

    /// 提交值：`full_form`，缺省回退到 `text`。
    pub fn full_form(&self) -> &str {
        self.full_form.as_deref().unwrap_or(&self.text)
    }

    /// 按提交值比较（默认候选、多选集合都以此为准）。
    pub fn same_value(&self, other: &Candidate) -> bool {
        self.full_form() == other.full_form()
    }
}

impl From<&str> for Candidate {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Candidate {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// 高亮样式（渲染层决定具体颜色/字体）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Face {
    /// 主匹配区间
    Primary,
}

/// 一段高亮：`text[range]` 使用 `face` 渲染。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Highlight {
    pub range: Range<usize>,
    pub face: Face,
}

/// 计数提示：`shown` 为当前匹配数，`total` 为原始候选数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountSummary {
    pub shown: usize,
    pub total: usize,
}

/// 引擎给渲染层的"快照视图"。
///
/// 设计目标：
/// - 渲染层只读 `ViewState`，不直接读写 `Context`
/// - 每次事件之后整体重算，不做增量修补
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// 提示语
    pub prompt: String,
    /// 用户实际输入的查询串
    pub query: String,
    /// 展示用查询串（动态候选源可覆盖）；None 表示与 `query` 相同
    pub display_query: Option<String>,
    /// 当前页展示的候选（已高亮）
    pub displayed: Vec<Candidate>,
    /// 高亮行在 `displayed` 中的位置；光标在原始输入上或无候选时为 None
    pub highlighted_row: Option<usize>,
    /// `displayed[0]` 在完整候选列表中的下标
    pub first_shown: usize,
    /// 计数提示
    pub count: CountSummary,
    /// 是否提示"直接回车将使用默认值"
    pub default_hint_visible: bool,
    /// 多选模式下已选中的提交值（按选择顺序）
    pub selected: Vec<String>,
}

impl ViewState {
    /// 当前高亮的候选。
    pub fn highlighted(&self) -> Option<&Candidate> {
        self.highlighted_row.and_then(|row| self.displayed.get(row))
    }

    /// 展示用查询串（优先 `display_query`）。
    pub fn shown_query(&self) -> &str {
        self.display_query.as_deref().unwrap_or(&self.query)
    }
}
