//! `viewport`：决定显示完整候选列表中的哪一段。
//!
//! `first_shown = clamp(cursor - floor(page / 2) + 1, 0, max(0, len - page))`
//!
//! 每次事件之后都从头计算，不做增量修补。

use crate::cursor::Cursor;

/// 当前页在完整列表中的位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// 第一个显示项的下标
    pub first_shown: usize,
    /// 显示区间的结束（不含）
    pub end: usize,
    /// 高亮行在本页中的位置
    pub highlighted_row: Option<usize>,
}

impl Window {
    pub fn len(&self) -> usize {
        self.end - self.first_shown
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.first_shown
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    page_size: usize,
}

impl Viewport {
    /// 页大小至少为 1。
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn first_shown(&self, cursor: Cursor, len: usize) -> usize {
        let page = isize::try_from(self.page_size).unwrap_or(isize::MAX);
        let max_first = isize::try_from(len.saturating_sub(self.page_size)).unwrap_or(isize::MAX);
        let index = cursor.index().unwrap_or(0);
        let first = index.saturating_sub(page / 2).saturating_add(1);
        // page = 1 时公式会越过光标本身
        first.clamp(0, max_first).min(index.max(0)).unsigned_abs()
    }

    pub fn window(&self, cursor: Cursor, len: usize) -> Window {
        let first_shown = self.first_shown(cursor, len);
        let end = (first_shown + self.page_size).min(len);
        let highlighted_row = cursor
            .candidate()
            .filter(|&i| i >= first_shown && i < end)
            .map(|i| i - first_shown);
        Window {
            first_shown,
            end,
            highlighted_row,
        }
    }

    /// 渲染层的滚动校正（可调用零次或多次）。
    ///
    /// `row` 是高亮行在渲染表面上的行号，`visible_rows` 是表面实际可见行数。
    /// 返回新的滚动位置；结果只依赖输入，重复调用收敛于同一值。
    pub fn settle_scroll(row: Option<usize>, scroll: usize, visible_rows: usize) -> usize {
        let Some(row) = row else {
            return scroll;
        };
        if visible_rows == 0 {
            return scroll;
        }
        if row < scroll {
            row
        } else if row >= scroll + visible_rows {
            row + 1 - visible_rows
        } else {
            scroll
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Cursor::At(7), 7)]
    #[case(Cursor::At(0), 0)]
    #[case(Cursor::At(9), 7)]
    #[case(Cursor::At(3), 3)]
    #[case(Cursor::Input, 0)]
    fn first_shown_with_page_of_three(#[case] cursor: Cursor, #[case] expected: usize) {
        assert_eq!(Viewport::new(3).first_shown(cursor, 10), expected);
    }

    #[test]
    fn centres_cursor_in_larger_page() {
        let window = Viewport::new(10).window(Cursor::At(20), 100);
        assert_eq!(window.first_shown, 16);
        assert_eq!(window.end, 26);
        assert_eq!(window.highlighted_row, Some(4));
    }

    #[test]
    fn single_row_page_follows_cursor() {
        let viewport = Viewport::new(1);
        assert_eq!(viewport.first_shown(Cursor::At(4), 10), 4);
        assert_eq!(viewport.window(Cursor::At(9), 10).highlighted_row, Some(0));
    }

    #[test]
    fn short_list_is_shown_whole() {
        let window = Viewport::new(10).window(Cursor::At(2), 4);
        assert_eq!((window.first_shown, window.end), (0, 4));
        assert_eq!(window.highlighted_row, Some(2));
        assert_eq!(window.len(), 4);
    }

    #[test]
    fn input_cursor_has_no_highlighted_row() {
        let window = Viewport::new(5).window(Cursor::Input, 3);
        assert_eq!(window.highlighted_row, None);
        let window = Viewport::new(5).window(Cursor::None, 0);
        assert!(window.is_empty());
    }

    #[test]
    fn settle_scroll_brings_row_into_view() {
        assert_eq!(Viewport::settle_scroll(Some(2), 5, 4), 2);
        assert_eq!(Viewport::settle_scroll(Some(12), 5, 4), 9);
        assert_eq!(Viewport::settle_scroll(Some(6), 5, 4), 5);
        assert_eq!(Viewport::settle_scroll(None, 5, 4), 5);
    }

    proptest! {
        #[test]
        fn window_always_contains_cursor(len in 1usize..200, page in 1usize..30, seed in 0usize..200) {
            let cursor = Cursor::At(seed % len);
            let window = Viewport::new(page).window(cursor, len);
            prop_assert!(window.end <= len);
            prop_assert!(window.len() <= page);
            prop_assert!(window.highlighted_row.is_some());
        }

        #[test]
        fn settle_scroll_is_idempotent(row in proptest::option::of(0usize..500), scroll in 0usize..500, rows in 0usize..50) {
            let once = Viewport::settle_scroll(row, scroll, rows);
            let twice = Viewport::settle_scroll(row, once, rows);
            prop_assert_eq!(once, twice);
        }
    }
}
