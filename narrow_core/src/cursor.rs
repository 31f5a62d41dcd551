//! `cursor`：当前高亮项的状态机。
//!
//! 状态：
//! - `None`：候选列表为空
//! - `Input`：高亮"原始输入"（下标 -1，仅在 `require_match = false` 时可达）
//! - `At(i)`：高亮第 i 个候选
//!
//! 所有迁移都是钳位运算：越界即停在边界，`None` 下全部为空操作。

use crate::model::Candidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    None,
    Input,
    At(usize),
}

/// 导航命令。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Prev,
    Next,
    PrevPage,
    NextPage,
    Beginning,
    End,
}

/// 光标重算所需的会话参数。
#[derive(Debug, Clone, Copy)]
pub struct CursorRule<'a> {
    pub require_match: bool,
    pub move_default_to_front: bool,
    pub default_candidate: Option<&'a Candidate>,
    /// 恢复模式：上一次会话的光标下标
    pub restore: Option<isize>,
}

impl Cursor {
    /// 整数下标；`Input` 为 -1。
    pub fn index(self) -> Option<isize> {
        match self {
            Self::None => None,
            Self::Input => Some(-1),
            Self::At(i) => isize::try_from(i).ok(),
        }
    }

    /// 光标所在候选的下标。
    pub fn candidate(self) -> Option<usize> {
        match self {
            Self::At(i) => Some(i),
            _ => None,
        }
    }

    /// 把任意整数下标钳位到 `[lower_bound, len - 1]`。
    pub fn clamped(index: isize, len: usize, require_match: bool) -> Self {
        if len == 0 {
            return Self::None;
        }
        let lower = if require_match { 0 } else { -1 };
        let upper = isize::try_from(len - 1).unwrap_or(isize::MAX);
        match index.clamp(lower, upper) {
            -1 => Self::Input,
            i => Self::At(i.unsigned_abs()),
        }
    }

    /// 会话开始与每次查询变化时的初始光标。
    pub fn recompute(refined: &[Candidate], rule: &CursorRule<'_>) -> Self {
        if refined.is_empty() {
            return Self::None;
        }
        if let Some(previous) = rule.restore {
            return Self::clamped(previous, refined.len(), rule.require_match);
        }
        if rule.move_default_to_front {
            return Self::At(0);
        }
        let index = rule
            .default_candidate
            .and_then(|default| refined.iter().position(|c| c.same_value(default)))
            .unwrap_or(0);
        Self::At(index)
    }

    pub fn navigate(self, nav: Nav, len: usize, require_match: bool, page_size: usize) -> Self {
        let Some(current) = self.index() else {
            return self;
        };
        let page = isize::try_from(page_size.max(1)).unwrap_or(isize::MAX);
        let last = isize::try_from(len.saturating_sub(1)).unwrap_or(isize::MAX);
        let target = match nav {
            Nav::Prev => current.saturating_sub(1),
            Nav::Next => current.saturating_add(1),
            Nav::PrevPage => current.saturating_sub(page),
            Nav::NextPage => current.saturating_add(page),
            Nav::Beginning => 0,
            Nav::End => last,
        };
        Self::clamped(target, len, require_match)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn cands(texts: &[&str]) -> Vec<Candidate> {
        texts.iter().copied().map(Candidate::from).collect()
    }

    fn rule(require_match: bool) -> CursorRule<'static> {
        CursorRule {
            require_match,
            move_default_to_front: false,
            default_candidate: None,
            restore: None,
        }
    }

    #[test]
    fn empty_list_has_no_cursor() {
        assert_eq!(Cursor::recompute(&[], &rule(false)), Cursor::None);
        assert_eq!(Cursor::None.navigate(Nav::Next, 0, false, 10), Cursor::None);
    }

    #[test]
    fn preselects_default_by_full_form() {
        let refined = cands(&["x", "def", "y"]);
        let default = Candidate::new("def");
        let r = CursorRule {
            default_candidate: Some(&default),
            ..rule(false)
        };
        assert_eq!(Cursor::recompute(&refined, &r), Cursor::At(1));

        let missing = Candidate::new("nope");
        let r = CursorRule {
            default_candidate: Some(&missing),
            ..rule(false)
        };
        assert_eq!(Cursor::recompute(&refined, &r), Cursor::At(0));
    }

    #[test]
    fn moved_default_is_always_first() {
        let refined = cands(&["def", "x"]);
        let default = Candidate::new("def");
        let r = CursorRule {
            move_default_to_front: true,
            default_candidate: Some(&default),
            ..rule(false)
        };
        assert_eq!(Cursor::recompute(&refined, &r), Cursor::At(0));
    }

    #[rstest]
    #[case(Some(7), false, Cursor::At(2))]
    #[case(Some(-1), false, Cursor::Input)]
    #[case(Some(-1), true, Cursor::At(0))]
    #[case(Some(1), true, Cursor::At(1))]
    fn restore_clamps_previous_index(
        #[case] restore: Option<isize>,
        #[case] require_match: bool,
        #[case] expected: Cursor,
    ) {
        let refined = cands(&["a", "b", "c"]);
        let r = CursorRule {
            restore,
            ..rule(require_match)
        };
        assert_eq!(Cursor::recompute(&refined, &r), expected);
    }

    #[rstest]
    #[case(Cursor::At(0), Nav::Prev, false, Cursor::Input)]
    #[case(Cursor::At(0), Nav::Prev, true, Cursor::At(0))]
    #[case(Cursor::Input, Nav::Prev, false, Cursor::Input)]
    #[case(Cursor::Input, Nav::Next, false, Cursor::At(0))]
    #[case(Cursor::At(4), Nav::Next, false, Cursor::At(4))]
    #[case(Cursor::At(1), Nav::NextPage, false, Cursor::At(4))]
    #[case(Cursor::At(3), Nav::PrevPage, false, Cursor::At(0))]
    #[case(Cursor::At(2), Nav::PrevPage, false, Cursor::Input)]
    #[case(Cursor::Input, Nav::Beginning, false, Cursor::At(0))]
    #[case(Cursor::At(0), Nav::End, true, Cursor::At(4))]
    fn navigation_is_clamped(
        #[case] from: Cursor,
        #[case] nav: Nav,
        #[case] require_match: bool,
        #[case] expected: Cursor,
    ) {
        assert_eq!(from.navigate(nav, 5, require_match, 3), expected);
    }
}
