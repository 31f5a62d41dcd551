//! `Session`：对宿主（CLI/GUI）提供的会话对象。
//!
//! `Session` 自身不做业务逻辑判断，而是：
//! - 持有 `Context`（状态）
//! - 持有 processors 链（可插拔）
//! - 把每次 `InputEvent` 依次交给 processors，直到被消费
//! - 最后输出 `ViewState` + `Action`，并触发宿主注册的 hook

use std::{fmt, sync::Arc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    context::{Context, ContextSettings},
    cursor::Nav,
    engine::EngineConfig,
    error::{NarrowError, Result},
    history::History,
    key_event::{Action, InputEvent},
    model::{Candidate, ViewState},
    pipeline::Pipeline,
    processor::{
        CommitProcessor, EditingProcessor, NavigationProcessor, ProcessStatus, Processor,
        SelectionProcessor,
    },
    select::Outcome,
    source::CandidateSource,
    viewport::Viewport,
};

/// 启动会话的选项。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct SessionOptions {
    /// 默认候选：存在时预选；`move_default_to_front` 时移到最前
    pub default_candidate: Option<Candidate>,
    /// 初始查询串
    pub initial_input: String,
    /// 只允许提交列表中的候选
    pub require_match: bool,
    pub multi_select: bool,
    pub move_default_to_front: bool,
    /// 页大小；None 使用 `EngineConfig::page_size`
    pub page_size: Option<usize>,
    /// 恢复上一次会话（查询串 + 光标位置）
    pub restore: Option<SessionSnapshot>,
}

impl SessionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, candidate: impl Into<Candidate>) -> Self {
        self.default_candidate = Some(candidate.into());
        self
    }

    pub fn with_initial_input(mut self, input: impl Into<String>) -> Self {
        self.initial_input = input.into();
        self
    }

    pub fn with_require_match(mut self, enable: bool) -> Self {
        self.require_match = enable;
        self
    }

    pub fn with_multi_select(mut self, enable: bool) -> Self {
        self.multi_select = enable;
        self
    }

    pub fn with_move_default_to_front(mut self, enable: bool) -> Self {
        self.move_default_to_front = enable;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_restore(mut self, snapshot: SessionSnapshot) -> Self {
        self.restore = Some(snapshot);
        self
    }
}

/// "重复上一次会话"所需的最小状态；由宿主不透明地保存。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionSnapshot {
    pub prompt: String,
    pub query: String,
    /// 光标下标；-1 表示原始输入，None 表示当时没有候选
    pub cursor_index: Option<isize>,
}

/// 提交事件的结果：会话结束并给出结果，或事件被自定义 processor 消费而会话继续。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitStatus {
    Done(Outcome),
    Pending,
}

impl CommitStatus {
    fn from_actions(actions: Vec<Action>) -> Self {
        actions
            .into_iter()
            .find_map(|a| match a {
                Action::Commit(outcome) => Some(Self::Done(outcome)),
                _ => None,
            })
            .unwrap_or(Self::Pending)
    }

    pub fn outcome(self) -> Option<Outcome> {
        match self {
            Self::Done(outcome) => Some(outcome),
            Self::Pending => None,
        }
    }
}

/// 会话的原始调用参数（提供给 hook）。
#[derive(Debug, Clone)]
pub struct SessionArgs {
    pub prompt: String,
    pub options: SessionOptions,
}

type SelectedHook = Box<dyn FnMut(&Outcome, &SessionArgs) + Send>;
type InsertedHook = Box<dyn FnMut(&str) + Send>;

/// 一次缩小选择会话（状态机容器）。
pub struct Session {
    pipeline: Arc<Pipeline>,
    ctx: Context,
    processors: Vec<Box<dyn Processor>>,
    args: SessionArgs,
    selected_hooks: Vec<SelectedHook>,
    inserted_hooks: Vec<InsertedHook>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("prompt", &self.args.prompt)
            .field("query", &self.ctx.query())
            .field("cursor", &self.ctx.cursor())
            .field("closed", &self.ctx.is_closed())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// 创建会话，组装默认 processors 链，并对初始查询串立即重算一次。
    pub(crate) fn start(
        pipeline: Arc<Pipeline>,
        config: &EngineConfig,
        prompt: impl Into<String>,
        source: CandidateSource,
        options: SessionOptions,
    ) -> Result<Self> {
        let prompt = prompt.into();
        let (initial_query, restore) = match &options.restore {
            Some(snapshot) => (snapshot.query.clone(), snapshot.cursor_index),
            None => (options.initial_input.clone(), None),
        };
        let settings = ContextSettings {
            default_candidate: options.default_candidate.clone(),
            require_match: options.require_match,
            multi_select: options.multi_select,
            move_default_to_front: options.move_default_to_front,
            sort_enabled: config.sort_enabled,
            page_size: Viewport::new(options.page_size.unwrap_or(config.page_size)).page_size(),
            restore,
        };
        debug!(prompt = %prompt, dynamic = source.is_dynamic(), "session start");
        let mut ctx = Context::new(source, &pipeline, settings);
        ctx.set_query(&pipeline, initial_query)?;
        Ok(Self {
            pipeline,
            ctx,
            processors: vec![
                Box::new(EditingProcessor),
                Box::new(NavigationProcessor),
                Box::new(SelectionProcessor),
                Box::new(CommitProcessor),
            ],
            args: SessionArgs { prompt, options },
            selected_hooks: Vec::new(),
            inserted_hooks: Vec::new(),
        })
    }

    /// 在默认链之前插入自定义 processor（可拦截事件）。
    pub fn prepend_processor(&mut self, processor: impl Processor + 'static) {
        self.processors.insert(0, Box::new(processor));
    }

    /// 每次成功提交时调用一次。
    pub fn on_selected(&mut self, hook: impl FnMut(&Outcome, &SessionArgs) + Send + 'static) {
        self.selected_hooks.push(Box::new(hook));
    }

    /// 候选被复制到输入框时调用。
    pub fn on_inserted(&mut self, hook: impl FnMut(&str) + Send + 'static) {
        self.inserted_hooks.push(Box::new(hook));
    }

    pub fn args(&self) -> &SessionArgs {
        &self.args
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn is_closed(&self) -> bool {
        self.ctx.is_closed()
    }

    /// 获取当前渲染快照（只读）。
    pub fn view(&self) -> ViewState {
        self.ctx.view(&self.pipeline, &self.args.prompt)
    }

    /// 处理一个输入事件，返回最新快照与动作列表。
    ///
    /// 会话结束后，导航与多选切换是空操作，其他事件返回 `SessionClosed`。
    pub fn handle(&mut self, ev: InputEvent) -> Result<(ViewState, Vec<Action>)> {
        if self.ctx.is_closed() {
            return match ev {
                InputEvent::Navigate(_) | InputEvent::Toggle => Ok((self.view(), Vec::new())),
                _ => Err(NarrowError::SessionClosed),
            };
        }
        let mut actions = Vec::new();
        for p in &mut self.processors {
            let (status, mut a) = p
                .process(&self.pipeline, &mut self.ctx, &ev)
                .inspect_err(|err| warn!(%err, event = ?ev, "event rejected"))?;
            actions.append(&mut a);
            if status == ProcessStatus::Consume {
                break;
            }
        }
        self.fire_hooks(&actions);
        Ok((self.view(), actions))
    }

    fn fire_hooks(&mut self, actions: &[Action]) {
        for action in actions {
            match action {
                Action::Commit(outcome) => {
                    for hook in &mut self.selected_hooks {
                        hook(outcome, &self.args);
                    }
                }
                Action::Insert(value) => {
                    for hook in &mut self.inserted_hooks {
                        hook(value);
                    }
                }
                Action::AppendHistory(_) | Action::Cancel => {}
            }
        }
    }

    pub fn on_query_changed(&mut self, query: impl Into<String>) -> Result<ViewState> {
        self.handle(InputEvent::SetQuery(query.into()))
            .map(|(view, _)| view)
    }

    /// 导航不会失败。
    pub fn on_navigate(&mut self, nav: Nav) -> ViewState {
        match self.handle(InputEvent::Navigate(nav)) {
            Ok((view, _)) => view,
            Err(_) => self.view(),
        }
    }

    /// 多选切换不会失败。
    pub fn on_toggle_select(&mut self) -> ViewState {
        match self.handle(InputEvent::Toggle) {
            Ok((view, _)) => view,
            Err(_) => self.view(),
        }
    }

    /// 提交；被拒绝时（`NoMatchRequired`）返回错误，会话保持打开。
    pub fn on_commit(&mut self, explicit: Option<usize>) -> Result<CommitStatus> {
        let (_, actions) = self.handle(InputEvent::Commit(explicit))?;
        Ok(CommitStatus::from_actions(actions))
    }

    pub fn on_submit_exact_input(&mut self) -> Result<CommitStatus> {
        let (_, actions) = self.handle(InputEvent::SubmitExactInput)?;
        Ok(CommitStatus::from_actions(actions))
    }

    pub fn on_insert(&mut self) -> Result<ViewState> {
        self.handle(InputEvent::Insert).map(|(view, _)| view)
    }

    pub fn on_cancel(&mut self) {
        if let Err(err) = self.handle(InputEvent::Cancel) {
            debug!(%err, "cancel on closed session");
        }
    }

    /// 渲染层的滚动校正：只返回新的滚动位置，不改变光标与候选。
    pub fn settle_scroll(&self, scroll: usize, visible_rows: usize) -> usize {
        let window = self.ctx.window();
        let row = window.highlighted_row.map(|r| r + window.first_shown);
        Viewport::settle_scroll(row, scroll, visible_rows)
    }

    /// 保存"重复上一次会话"所需的状态。
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            prompt: self.args.prompt.clone(),
            query: self.ctx.query().to_owned(),
            cursor_index: self.ctx.cursor().index(),
        }
    }

    /// 以历史记录为候选开启子会话（保持最新在前，不排序）。
    ///
    /// 子会话提交的值由宿主通过 `on_query_changed` 写回本会话。
    pub fn open_history(&self, history: &History) -> Result<Session> {
        if history.is_empty() {
            warn!(prompt = %self.args.prompt, "history is empty");
            return Err(NarrowError::EmptyHistory);
        }
        let config = EngineConfig::default()
            .with_sort_enabled(false)
            .with_page_size(self.ctx.settings().page_size);
        let source = CandidateSource::Static(
            history
                .entries()
                .iter()
                .map(|v| Candidate::new(v.as_str()))
                .collect(),
        );
        Session::start(
            Arc::clone(&self.pipeline),
            &config,
            format!("{}(history) ", self.args.prompt),
            source,
            SessionOptions::default(),
        )
    }
}
