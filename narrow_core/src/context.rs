//! `Context`：processor 链共享的唯一状态容器（一个会话一个）。
//!
//! 约定：
//! - `refined` 只能由 `set_query` 从 (查询串, 原始候选) 重新推导，不允许手工修改
//! - 每个事件先在局部变量里算出新状态，全部成功后才写回；失败时旧状态保持不变
//! - `cursor` 为 `None` 当且仅当 `refined` 为空
use tracing::{debug, info, trace, warn};

use crate::{
    cursor::{Cursor, CursorRule, Nav},
    error::{NarrowError, Result},
    key_event::Action,
    model::{Candidate, CountSummary, ViewState},
    ordering::OrderingPolicy,
    pipeline::Pipeline,
    select::{Outcome, Resolver, Selection, Target, assemble},
    source::{CandidateSource, Generator},
    viewport::{Viewport, Window},
};

/// 原始候选：静态列表（已 preprocess），或生成函数及其最近一次输出。
enum RawCandidates {
    Static(Vec<Candidate>),
    Dynamic {
        generator: Box<dyn Generator>,
        generated: Vec<Candidate>,
    },
}

/// 创建 `Context` 时读取一次的会话参数。
#[derive(Debug, Clone, Default)]
pub struct ContextSettings {
    pub default_candidate: Option<Candidate>,
    pub require_match: bool,
    pub multi_select: bool,
    pub move_default_to_front: bool,
    pub sort_enabled: bool,
    pub page_size: usize,
    /// 恢复模式：只作用于第一次重算
    pub restore: Option<isize>,
}

/// 会话状态。
pub struct Context {
    raw: RawCandidates,
    refined: Vec<Candidate>,
    cursor: Cursor,
    /// 用户实际输入的查询串
    query: String,
    /// 上一次完成重算的查询串（用于变化检测）
    previous_query: Option<String>,
    /// 生成函数给出的展示用查询串
    display_query: Option<String>,
    selection: Selection,
    settings: ContextSettings,
    outcome: Option<Outcome>,
    closed: bool,
}

impl Context {
    /// 创建会话状态；静态候选在这里 preprocess 一次。
    ///
    /// 此时还没有任何候选被 refine，调用方需要紧接着调用 `set_query`。
    pub fn new(source: CandidateSource, pipeline: &Pipeline, settings: ContextSettings) -> Self {
        let raw = match source {
            CandidateSource::Static(candidates) => {
                RawCandidates::Static(pipeline.preprocess(candidates, settings.sort_enabled))
            }
            CandidateSource::Dynamic(generator) => RawCandidates::Dynamic {
                generator,
                generated: Vec::new(),
            },
        };
        Self {
            raw,
            refined: Vec::new(),
            cursor: Cursor::None,
            query: String::new(),
            previous_query: None,
            display_query: None,
            selection: Selection::new(),
            settings,
            outcome: None,
            closed: false,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn display_query(&self) -> Option<&str> {
        self.display_query.as_deref()
    }

    pub fn refined(&self) -> &[Candidate] {
        &self.refined
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn settings(&self) -> &ContextSettings {
        &self.settings
    }

    /// 会话结束时的结果（仅提交后存在）。
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// 原始候选数（动态源为最近一次生成的数量）。
    pub fn total(&self) -> usize {
        match &self.raw {
            RawCandidates::Static(c) => c.len(),
            RawCandidates::Dynamic { generated, .. } => generated.len(),
        }
    }

    /// 查询串变化：CandidateSource -> Preprocess(动态源) -> Refine -> Ordering -> Cursor。
    ///
    /// 与上一次相同的查询串不会触发重算（生成函数也不会被再次调用）。
    pub fn set_query(&mut self, pipeline: &Pipeline, query: String) -> Result<()> {
        if self.previous_query.as_deref() == Some(query.as_str()) {
            self.query = query;
            return Ok(());
        }

        let (generated, display_query) = match &self.raw {
            RawCandidates::Static(_) => (None, None),
            RawCandidates::Dynamic { generator, .. } => {
                let out = generator.generate(&query).map_err(|source| {
                    warn!(query = %query, error = %source, "candidate generator failed");
                    NarrowError::GeneratorFailure {
                        query: query.clone(),
                        source,
                    }
                })?;
                let candidates = pipeline.preprocess(out.candidates, self.settings.sort_enabled);
                (Some(candidates), out.display_query)
            }
        };
        let base: &[Candidate] = match (&generated, &self.raw) {
            (Some(candidates), _) => candidates,
            (None, RawCandidates::Static(candidates)) => candidates,
            (None, RawCandidates::Dynamic { generated, .. }) => generated,
        };

        let refined = pipeline.refine(&query, base);
        let policy = OrderingPolicy {
            default_candidate: self.settings.default_candidate.as_ref(),
            move_default_to_front: self.settings.move_default_to_front,
        };
        let refined = policy.apply(refined, &query);
        let cursor = Cursor::recompute(
            &refined,
            &CursorRule {
                require_match: self.settings.require_match,
                move_default_to_front: self.settings.move_default_to_front,
                default_candidate: self.settings.default_candidate.as_ref(),
                restore: self.settings.restore,
            },
        );
        debug!(
            query = %query,
            raw = base.len(),
            refined = refined.len(),
            ?cursor,
            "recomputed candidates"
        );

        if let (Some(candidates), RawCandidates::Dynamic { generated, .. }) =
            (generated, &mut self.raw)
        {
            *generated = candidates;
        }
        self.refined = refined;
        self.cursor = cursor;
        self.display_query = display_query;
        self.previous_query = Some(query.clone());
        self.query = query;
        self.settings.restore = None;
        Ok(())
    }

    pub fn navigate(&mut self, nav: Nav) {
        let next = self.cursor.navigate(
            nav,
            self.refined.len(),
            self.settings.require_match,
            self.settings.page_size,
        );
        trace!(?nav, from = ?self.cursor, to = ?next, "navigate");
        self.cursor = next;
    }

    /// 多选：切换当前候选；返回是否发生了变化。
    pub fn toggle(&mut self) -> bool {
        if !self.settings.multi_select {
            return false;
        }
        let Some(candidate) = self.cursor.candidate().and_then(|i| self.refined.get(i)) else {
            return false;
        };
        let selected = self.selection.toggle(candidate.full_form());
        trace!(value = candidate.full_form(), selected, "toggle");
        true
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver {
            refined: &self.refined,
            query: &self.query,
            default_candidate: self.settings.default_candidate.as_ref(),
            require_match: self.settings.require_match,
        }
    }

    /// 提交：`explicit` 是完整候选列表中的下标，None 表示使用当前光标。
    pub fn commit(&mut self, explicit: Option<usize>) -> Result<Vec<Action>> {
        let target = match (explicit, self.cursor) {
            (Some(i), _) | (None, Cursor::At(i)) => Target::Candidate(i),
            (None, _) => Target::Input,
        };
        let value = self.resolver().resolve(target).inspect_err(|err| {
            warn!(%err, "commit rejected");
        })?;
        Ok(self.finish(value))
    }

    /// 提交字面输入，忽略光标位置。
    pub fn submit_exact_input(&mut self) -> Result<Vec<Action>> {
        let value = self.resolver().resolve_exact().inspect_err(|err| {
            warn!(%err, "exact input rejected");
        })?;
        Ok(self.finish(value))
    }

    fn finish(&mut self, value: String) -> Vec<Action> {
        let outcome = assemble(&mut self.selection, value, self.settings.multi_select);
        info!(?outcome, "session committed");
        self.closed = true;
        self.outcome = Some(outcome.clone());
        vec![
            Action::AppendHistory(outcome.values()),
            Action::Commit(outcome),
        ]
    }

    /// 把当前候选的提交值复制到输入框（随后按新查询串重算）。
    pub fn insert(&mut self, pipeline: &Pipeline) -> Result<Vec<Action>> {
        let Some(value) = self
            .cursor
            .candidate()
            .and_then(|i| self.refined.get(i))
            .map(|c| c.full_form().to_owned())
        else {
            return Ok(Vec::new());
        };
        self.set_query(pipeline, value.clone())?;
        Ok(vec![Action::Insert(value)])
    }

    pub fn cancel(&mut self) -> Vec<Action> {
        info!(query = %self.query, "session cancelled");
        self.closed = true;
        vec![Action::Cancel]
    }

    pub fn window(&self) -> Window {
        Viewport::new(self.settings.page_size).window(self.cursor, self.refined.len())
    }

    /// 生成渲染快照；highlight 只作用于当前页。
    pub fn view(&self, pipeline: &Pipeline, prompt: &str) -> ViewState {
        let window = self.window();
        let shown_query = self.display_query.as_deref().unwrap_or(&self.query);
        let displayed = pipeline.highlight(shown_query, &self.refined[window.first_shown..window.end]);
        let default_hint_visible = self.query.is_empty()
            && self
                .settings
                .default_candidate
                .as_ref()
                .is_some_and(|d| !self.refined.iter().any(|c| c.same_value(d)));
        ViewState {
            prompt: prompt.to_owned(),
            query: self.query.clone(),
            display_query: self.display_query.clone(),
            displayed,
            highlighted_row: window.highlighted_row,
            first_shown: window.first_shown,
            count: CountSummary {
                shown: self.refined.len(),
                total: self.total(),
            },
            default_hint_visible,
            selected: self.selection.as_slice().to_vec(),
        }
    }
}
