//! `processor`：输入事件处理链。
//!
//! 按顺序处理 `InputEvent`，对 `Context` 做状态变更，并可产生 `Action`（例如 Commit）。
//!
//! 当前链路（`Session::start` 默认组装）：
//! - `EditingProcessor`：编辑查询串（Char/Backspace/Clear/SetQuery）并触发重算
//! - `NavigationProcessor`：移动光标
//! - `SelectionProcessor`：多选切换
//! - `CommitProcessor`：提交/字面提交/插入/取消

use crate::{
    context::Context,
    error::Result,
    key_event::{Action, InputEvent},
    pipeline::Pipeline,
};

/// Processor 执行结果：是否"消费"了本次事件。
///
/// - `Consume`：本 processor 已处理该事件，后续 processor 不再执行
/// - `Continue`：本 processor 不处理该事件，交给下一个 processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Consume,
    Continue,
}

/// Processor：处理输入事件并改变 Context；必要时产生输出动作。
///
/// 返回 `Err` 时必须保证 `Context` 未被修改。
pub trait Processor: Send + Sync {
    fn process(
        &mut self,
        pipeline: &Pipeline,
        context: &mut Context,
        input_event: &InputEvent,
    ) -> Result<(ProcessStatus, Vec<Action>)>;
}

/// 编辑查询串的 processor。
pub struct EditingProcessor;

impl Processor for EditingProcessor {
    fn process(
        &mut self,
        pipeline: &Pipeline,
        context: &mut Context,
        input_event: &InputEvent,
    ) -> Result<(ProcessStatus, Vec<Action>)> {
        let query = match input_event {
            InputEvent::Char(ch) => {
                let mut q = context.query().to_owned();
                q.push(*ch);
                q
            }
            InputEvent::Backspace => {
                let mut q = context.query().to_owned();
                q.pop();
                q
            }
            InputEvent::Clear => String::new(),
            InputEvent::SetQuery(q) => q.clone(),
            _ => return Ok((ProcessStatus::Continue, Vec::new())),
        };
        context.set_query(pipeline, query)?;
        Ok((ProcessStatus::Consume, Vec::new()))
    }
}

pub struct NavigationProcessor;

impl Processor for NavigationProcessor {
    fn process(
        &mut self,
        _pipeline: &Pipeline,
        context: &mut Context,
        input_event: &InputEvent,
    ) -> Result<(ProcessStatus, Vec<Action>)> {
        match *input_event {
            InputEvent::Navigate(nav) => {
                context.navigate(nav);
                Ok((ProcessStatus::Consume, Vec::new()))
            }
            _ => Ok((ProcessStatus::Continue, Vec::new())),
        }
    }
}

pub struct SelectionProcessor;

impl Processor for SelectionProcessor {
    fn process(
        &mut self,
        _pipeline: &Pipeline,
        context: &mut Context,
        input_event: &InputEvent,
    ) -> Result<(ProcessStatus, Vec<Action>)> {
        match *input_event {
            InputEvent::Toggle => {
                context.toggle();
                Ok((ProcessStatus::Consume, Vec::new()))
            }
            _ => Ok((ProcessStatus::Continue, Vec::new())),
        }
    }
}

pub struct CommitProcessor;

impl Processor for CommitProcessor {
    fn process(
        &mut self,
        pipeline: &Pipeline,
        context: &mut Context,
        input_event: &InputEvent,
    ) -> Result<(ProcessStatus, Vec<Action>)> {
        let actions = match *input_event {
            InputEvent::Commit(explicit) => context.commit(explicit)?,
            InputEvent::SubmitExactInput => context.submit_exact_input()?,
            InputEvent::Insert => context.insert(pipeline)?,
            InputEvent::Cancel => context.cancel(),
            _ => return Ok((ProcessStatus::Continue, Vec::new())),
        };
        Ok((ProcessStatus::Consume, actions))
    }
}
