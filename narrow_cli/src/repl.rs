//! 行模式 REPL：每行输入翻译成一个 `InputEvent`（或一条宿主命令），再把 `ViewState` 打印出来。

use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use narrow_core::{
    Candidate, CandidateSource, Engine, Generated, Nav, Outcome, Session, SessionOptions,
    SessionSnapshot, ViewState,
    error::GeneratorError,
    filter::LiteralSubstring,
    history::History,
    key_event::{Action, InputEvent},
    model::Highlight,
    pipeline::{Pipeline, Refiner},
};
use tracing::{info, warn};

pub const HELP: &str = "\
文本        设置查询串（:s <文本> 可输入以 : 开头或纯数字的查询串）
回车        提交当前候选
<数字>      提交对应编号的候选
:n :p       下一个 / 上一个
:pn :pp     下一页 / 上一页
:b :e       第一个 / 最后一个
:t          多选切换
:i          把当前候选复制到查询串
:x          按字面提交查询串
:bs :clear  删除最后一个字符 / 清空查询串
:h          从历史记录中选择查询串
:r          重复上一次会话
:c          取消本次会话
:q          退出";

/// 一行输入对应的命令。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Event(InputEvent),
    History,
    Repeat,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Command::Event(InputEvent::Commit(None));
    }
    if let Ok(n) = line.parse::<usize>() {
        return match n.checked_sub(1) {
            Some(index) => Command::Event(InputEvent::Commit(Some(index))),
            None => Command::Unknown(line.to_owned()),
        };
    }
    if let Some(query) = line.strip_prefix(":s ") {
        return Command::Event(InputEvent::SetQuery(query.to_owned()));
    }
    let event = match line {
        ":n" => InputEvent::Navigate(Nav::Next),
        ":p" => InputEvent::Navigate(Nav::Prev),
        ":pn" => InputEvent::Navigate(Nav::NextPage),
        ":pp" => InputEvent::Navigate(Nav::PrevPage),
        ":b" => InputEvent::Navigate(Nav::Beginning),
        ":e" => InputEvent::Navigate(Nav::End),
        ":t" => InputEvent::Toggle,
        ":i" => InputEvent::Insert,
        ":x" => InputEvent::SubmitExactInput,
        ":bs" => InputEvent::Backspace,
        ":clear" => InputEvent::Clear,
        ":c" => InputEvent::Cancel,
        ":h" => return Command::History,
        ":r" => return Command::Repeat,
        ":help" | ":?" => return Command::Help,
        ":q" | ":quit" | ":exit" => return Command::Quit,
        other if other.starts_with(':') => return Command::Unknown(other.to_owned()),
        query => InputEvent::SetQuery(query.to_owned()),
    };
    Command::Event(event)
}

/// 候选来源；每次开启会话都重新构造 `CandidateSource`。
#[derive(Debug, Clone)]
pub enum CandidateOrigin {
    Static(Vec<Candidate>),
    Directory(PathBuf),
}

impl CandidateOrigin {
    fn build(&self) -> CandidateSource {
        match self {
            Self::Static(candidates) => CandidateSource::Static(candidates.clone()),
            Self::Directory(root) => CandidateSource::from_generator(directory_generator(root.clone())),
        }
    }
}

/// `dir/na` -> (`dir/`, `na`)
fn split_path(query: &str) -> (&str, &str) {
    match query.rfind('/') {
        Some(i) => query.split_at(i + 1),
        None => ("", query),
    }
}

/// 列出查询串目录部分下的条目；展示用查询串是文件名部分。
fn directory_generator(
    root: PathBuf,
) -> impl Fn(&str) -> Result<Generated, GeneratorError> + Send + Sync + 'static {
    move |query: &str| -> Result<Generated, GeneratorError> {
        let (dir, file) = split_path(query);
        let mut candidates = Vec::new();
        for entry in fs::read_dir(root.join(dir))? {
            let entry = entry?;
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_dir() {
                name.push('/');
            }
            let full = format!("{dir}{name}");
            candidates.push(Candidate::new(name).with_full_form(full));
        }
        Ok(Generated::new(candidates).with_display_query(file))
    }
}

/// 目录模式只用文件名部分做 refine。
pub fn directory_pipeline() -> Pipeline {
    Pipeline::new().with_refiner(|query: &str, candidates: &[Candidate]| -> Vec<Candidate> {
        LiteralSubstring.refine(split_path(query).1, candidates)
    })
}

pub struct App {
    engine: Engine,
    source: CandidateOrigin,
    prompt: String,
    options: SessionOptions,
    history: History,
    history_path: Option<PathBuf>,
    last: Option<SessionSnapshot>,
}

impl App {
    pub fn new(engine: Engine, source: CandidateOrigin, prompt: String, options: SessionOptions) -> Self {
        Self {
            engine,
            source,
            prompt,
            options,
            history: History::new(),
            history_path: None,
            last: None,
        }
    }

    pub fn with_history(mut self, history: History, path: Option<PathBuf>) -> Self {
        self.history = history;
        self.history_path = path;
        self
    }

    fn start(&self, restore: Option<SessionSnapshot>) -> narrow_core::Result<Session> {
        let mut options = self.options.clone();
        if let Some(snapshot) = restore {
            options = options.with_restore(snapshot);
        }
        let mut session = self
            .engine
            .start_session(self.prompt.as_str(), self.source.build(), options)?;
        session.on_selected(|outcome, args| {
            info!(prompt = %args.prompt, values = ?outcome.values(), "selected");
        });
        Ok(session)
    }

    fn record_history(&mut self, values: Vec<String>) -> anyhow::Result<()> {
        self.history.extend(values);
        if let Some(path) = &self.history_path {
            narrow_source::save_history(path, &self.history)?;
        }
        Ok(())
    }

    pub fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> anyhow::Result<()> {
        let mut session = self.start(None)?;
        // 历史子会话期间，原会话暂存在这里
        let mut parent: Option<Session> = None;
        let mut lines = input.lines();
        loop {
            let view = session.view();
            render(out, &view, self.options.default_candidate.as_ref())?;
            write!(out, "{}", view.prompt)?;
            out.flush()?;
            let Some(line) = lines.next() else {
                break;
            };
            let event = match parse_command(&line?) {
                Command::Event(event) => event,
                Command::Quit => break,
                Command::Help => {
                    writeln!(out, "{HELP}")?;
                    continue;
                }
                Command::Unknown(cmd) => {
                    writeln!(out, "未知命令：{cmd}（:help 查看帮助）")?;
                    continue;
                }
                Command::History if parent.is_some() => {
                    writeln!(out, "! 已经在历史记录中")?;
                    continue;
                }
                Command::History => {
                    match session.open_history(&self.history) {
                        Ok(sub) => parent = Some(std::mem::replace(&mut session, sub)),
                        Err(err) => writeln!(out, "! {err}")?,
                    }
                    continue;
                }
                Command::Repeat => {
                    match self.last.clone() {
                        Some(snapshot) => {
                            // 重复会话取代历史子会话，暂存的原会话一并丢弃
                            if let Some(mut previous) = parent.take() {
                                previous.on_cancel();
                            }
                            session = self.start(Some(snapshot))?;
                        }
                        None => writeln!(out, "! 没有可以重复的会话")?,
                    }
                    continue;
                }
            };

            let actions = match session.handle(event) {
                Ok((_, actions)) => actions,
                Err(err) => {
                    writeln!(out, "! {err}")?;
                    continue;
                }
            };
            for action in actions {
                match action {
                    Action::AppendHistory(values) => self.record_history(values)?,
                    Action::Insert(value) => writeln!(out, "insert: {value}")?,
                    Action::Commit(outcome) => {
                        if let Some(mut previous) = parent.take() {
                            if let Outcome::Single(value) = &outcome {
                                if let Err(err) = previous.on_query_changed(value.as_str()) {
                                    warn!(%err, "history value rejected");
                                    writeln!(out, "! {err}")?;
                                }
                            }
                            session = previous;
                            continue;
                        }
                        writeln!(out, "commit: {}", outcome.values().join(", "))?;
                        self.last = Some(session.snapshot());
                        session = self.start(None)?;
                    }
                    Action::Cancel => {
                        if let Some(previous) = parent.take() {
                            session = previous;
                            continue;
                        }
                        writeln!(out, "(cancel)")?;
                        self.last = Some(session.snapshot());
                        session = self.start(None)?;
                    }
                }
            }
        }
        session.on_cancel();
        Ok(())
    }
}

fn render(out: &mut impl Write, view: &ViewState, default: Option<&Candidate>) -> io::Result<()> {
    writeln!(
        out,
        "[{}/{}] {}",
        view.count.shown,
        view.count.total,
        view.shown_query()
    )?;
    if view.default_hint_visible {
        if let Some(default) = default {
            writeln!(out, "  (回车使用默认值：{})", default.full_form())?;
        }
    }
    if view.highlighted_row.is_none() && !view.displayed.is_empty() {
        writeln!(out, ">      (输入)")?;
    }
    for (row, candidate) in view.displayed.iter().enumerate() {
        let marker = if view.highlighted_row == Some(row) { '>' } else { ' ' };
        let selected = if view.selected.iter().any(|s| s == candidate.full_form()) {
            '*'
        } else {
            ' '
        };
        writeln!(
            out,
            "{marker}{selected}{:>3}. {}",
            view.first_shown + row + 1,
            format_candidate(candidate)
        )?;
    }
    Ok(())
}

fn format_candidate(candidate: &Candidate) -> String {
    let mut s = String::new();
    if let Some(prefix) = &candidate.prefix {
        s.push_str(prefix);
    }
    s.push_str(&mark_highlights(&candidate.text, &candidate.highlights));
    if let Some(suffix) = &candidate.suffix {
        s.push_str(suffix);
    }
    if let Some(margin) = &candidate.right_margin {
        s.push('\t');
        s.push_str(margin);
    }
    s
}

/// 用 `[]` 包住高亮区间；越界或不在字符边界上的区间被忽略。
fn mark_highlights(text: &str, highlights: &[Highlight]) -> String {
    let mut ranges: Vec<_> = highlights.iter().map(|h| h.range.clone()).collect();
    ranges.sort_by_key(|r| r.start);
    let mut out = String::with_capacity(text.len() + ranges.len() * 2);
    let mut pos = 0;
    for range in ranges {
        if range.start < pos {
            continue;
        }
        let (Some(before), Some(marked)) = (text.get(pos..range.start), text.get(range.clone()))
        else {
            continue;
        };
        out.push_str(before);
        out.push('[');
        out.push_str(marked);
        out.push(']');
        pos = range.end;
    }
    out.push_str(text.get(pos..).unwrap_or_default());
    out
}

#[cfg(test)]
mod tests {
    use narrow_core::{EngineConfig, model::Face};
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", Command::Event(InputEvent::Commit(None)))]
    #[case("3", Command::Event(InputEvent::Commit(Some(2))))]
    #[case("0", Command::Unknown("0".into()))]
    #[case(":n", Command::Event(InputEvent::Navigate(Nav::Next)))]
    #[case(":s 42", Command::Event(InputEvent::SetQuery("42".into())))]
    #[case("foo bar", Command::Event(InputEvent::SetQuery("foo bar".into())))]
    #[case(":h", Command::History)]
    #[case(":zz", Command::Unknown(":zz".into()))]
    fn parses_lines(#[case] line: &str, #[case] expected: Command) {
        assert_eq!(parse_command(line), expected);
    }

    #[rstest]
    #[case("src/ma", ("src/", "ma"))]
    #[case("ma", ("", "ma"))]
    #[case("a/b/", ("a/b/", ""))]
    fn splits_directory_part(#[case] query: &str, #[case] expected: (&str, &str)) {
        assert_eq!(split_path(query), expected);
    }

    #[test]
    fn marks_highlight_ranges() {
        let h = |range| Highlight {
            range,
            face: Face::Primary,
        };
        assert_eq!(mark_highlights("banana", &[h(2..4)]), "ba[na]na");
        assert_eq!(mark_highlights("ab", &[h(1..9)]), "ab");
        assert_eq!(mark_highlights("ab", &[]), "ab");
    }

    fn app(texts: &[&str], options: SessionOptions) -> App {
        let candidates = texts.iter().copied().map(Candidate::from).collect();
        App::new(
            Engine::new(EngineConfig::new().with_page_size(5)),
            CandidateOrigin::Static(candidates),
            "> ".to_string(),
            options,
        )
    }

    fn run(app: &mut App, script: &str) -> String {
        let mut out = Vec::new();
        app.run(script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn commits_and_records_history() {
        let mut app = app(&["alpha", "beta", "gamma"], SessionOptions::new());
        let out = run(&mut app, "et\n\n:c\n:q\n");
        assert!(out.contains("[1/3] et"));
        assert!(out.contains(">   1. b[et]a"));
        assert!(out.contains("commit: beta"));
        assert!(out.contains("(cancel)"));
        assert_eq!(app.history.entries(), ["beta"]);
    }

    #[test]
    fn history_value_becomes_query() {
        let mut app = app(&["alpha", "beta"], SessionOptions::new())
            .with_history(History::new(), None);
        let out = run(&mut app, ":h\nbeta\n:h\n\n\n");
        assert!(out.contains("! 没有历史记录"));
        assert!(out.contains("commit: beta"));
        // 从历史选出 beta 后写回新会话的查询串，再次回车提交
        assert_eq!(out.matches("commit: beta").count(), 2);
    }

    #[test]
    fn require_match_rejection_is_reported() {
        let mut app = app(&["alpha"], SessionOptions::new().with_require_match(true));
        let out = run(&mut app, "zzz\n\n:q\n");
        assert!(out.contains("! "));
        assert!(!out.contains("commit:"));
    }

    #[test]
    fn repeat_restores_previous_query() {
        let mut app = app(&["a1", "a2", "b"], SessionOptions::new());
        let out = run(&mut app, "a\n:n\n:c\n:r\n\n");
        assert!(out.contains("commit: a2"));
    }

    #[test]
    fn repeat_from_history_replaces_the_sub_session() {
        let mut history = History::new();
        history.push("b");
        let mut app = app(&["a1", "a2", "b"], SessionOptions::new()).with_history(history, None);
        let out = run(&mut app, "a\n:n\n:c\n:h\n:r\n\n");
        assert!(out.contains("commit: a2"));
        assert_eq!(app.history.entries(), ["a2", "b"]);
    }

    #[test]
    fn renders_prefix_suffix_and_margin() {
        let candidate = Candidate::new("main.rs")
            .with_prefix("[f] ")
            .with_suffix(" *")
            .with_right_margin("2 KB");
        let mut app = App::new(
            Engine::new(EngineConfig::new()),
            CandidateOrigin::Static(vec![candidate]),
            "> ".to_string(),
            SessionOptions::new(),
        );
        let out = run(&mut app, "ma\n:q\n");
        assert!(out.contains(">   1. [f] [ma]in.rs *\t2 KB"));
    }
}
