use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use narrow_core::engine::DEFAULT_PAGE_SIZE;

#[derive(Debug, Parser)]
#[command(
    name = "narrow_cli",
    version,
    about = "增量缩小选择 demo",
    long_about = "输入文本即修改查询串；以 `:` 开头的行是命令（:help 查看）。\n\
                  直接回车提交当前候选，输入数字提交对应编号的候选。"
)]
pub struct Cli {
    /// TSV 候选文件（text/full_form/prefix/suffix/right_margin）
    #[arg(long, value_name = "PATH", conflicts_with_all = ["lines", "dir"])]
    pub file: Option<PathBuf>,

    /// 每行一个候选的纯文本文件
    #[arg(long, value_name = "PATH", conflicts_with = "dir")]
    pub lines: Option<PathBuf>,

    /// 动态候选：按查询串的目录部分列出该目录下的条目
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// 历史文件（最新在前，每行一条）
    #[arg(long, value_name = "PATH")]
    pub history: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    #[arg(long)]
    pub require_match: bool,

    #[arg(long)]
    pub multi: bool,

    /// 默认候选
    #[arg(long, value_name = "VALUE")]
    pub default: Option<String>,

    /// 把默认候选移到最前
    #[arg(long, requires = "default")]
    pub default_first: bool,

    /// 保留文件中的原始顺序
    #[arg(long)]
    pub no_sort: bool,

    /// 初始查询串
    #[arg(long, default_value = "")]
    pub query: String,

    #[arg(long, default_value = "narrow> ")]
    pub prompt: String,

    /// 日志详细程度（-v debug，-vv trace）；RUST_LOG 优先
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[arg(long, value_enum, default_value = "compact")]
    pub log_format: LogFormatArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
}
