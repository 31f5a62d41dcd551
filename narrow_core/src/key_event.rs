use crate::{cursor::Nav, select::Outcome};

/// 输入事件（逻辑事件）。
///
/// 说明：
/// - `Session`/processor 只关心"语义事件"，不关心具体平台键值。
/// - 宿主（CLI/GUI）负责把按键或输入框变化转换成这些事件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// 在查询串末尾追加一个字符
    Char(char),
    /// 删除查询串最后一个字符
    Backspace,
    /// 清空查询串
    Clear,
    /// 输入框整体变化（粘贴、宿主侧编辑等）
    SetQuery(String),
    /// 移动光标
    Navigate(Nav),
    /// 多选：切换当前候选
    Toggle,
    /// 提交；`Some(i)` 指定完整列表中的下标，None 使用当前光标
    Commit(Option<usize>),
    /// 提交字面输入（忽略光标）
    SubmitExactInput,
    /// 把当前候选复制到输入框，不结束会话
    Insert,
    /// 放弃本次会话
    Cancel,
}

/// 引擎输出动作（对宿主的"副作用"请求）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// 会话结束并产生结果
    Commit(Outcome),
    /// 请求宿主把这些值追加到历史
    AppendHistory(Vec<String>),
    /// 候选被复制到输入框
    Insert(String),
    /// 会话被放弃
    Cancel,
}
