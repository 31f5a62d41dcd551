use std::{io, path::PathBuf};

use anyhow::bail;
use clap::Parser;
use narrow_core::{
    CandidateSource, Engine, EngineConfig, SessionOptions,
    history::{DEFAULT_CAPACITY, History},
    source::normalize,
};
use narrow_source::{load_history, load_lines, load_tsv};

mod cli;
mod logging;
mod repl;

use crate::{
    cli::{Cli, LogFormatArg},
    logging::{LogConfig, LogFormat, init_logging},
    repl::{App, CandidateOrigin, directory_pipeline},
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
    };
    init_logging(&LogConfig::from_verbosity(cli.verbose).with_format(format))?;

    let source = load_source(&cli)?;
    let mut engine = Engine::new(
        EngineConfig::new()
            .with_sort_enabled(!cli.no_sort)
            .with_page_size(cli.page_size),
    );
    if matches!(source, CandidateOrigin::Directory(_)) {
        engine = engine.with_pipeline(directory_pipeline());
    }

    let history = match &cli.history {
        Some(path) => load_history(path, DEFAULT_CAPACITY)?,
        None => History::new(),
    };

    let mut options = SessionOptions::new()
        .with_initial_input(cli.query.as_str())
        .with_require_match(cli.require_match)
        .with_multi_select(cli.multi)
        .with_move_default_to_front(cli.default_first);
    if let Some(default) = &cli.default {
        options = options.with_default(default.as_str());
    }

    println!("narrow demo | 输入 :help 查看命令，:q 退出");
    let mut app = App::new(engine, source, cli.prompt.clone(), options)
        .with_history(history, cli.history.clone());
    app.run(io::stdin().lock(), &mut io::stdout())
}

fn load_source(cli: &Cli) -> anyhow::Result<CandidateOrigin> {
    if let Some(dir) = &cli.dir {
        return Ok(CandidateOrigin::Directory(dir.clone()));
    }
    let raw = match &cli.lines {
        Some(path) => load_lines(path)?,
        None => load_tsv(cli.file.clone().unwrap_or_else(default_candidates_path))?,
    };
    match normalize(raw)? {
        CandidateSource::Static(candidates) => Ok(CandidateOrigin::Static(candidates)),
        CandidateSource::Dynamic(_) => bail!("候选文件只能产生静态候选"),
    }
}

fn default_candidates_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("asset")
        .join("candidates.tsv")
}
