//! 日志初始化：`tracing` + `tracing-subscriber`，输出到 stderr。
//!
//! 级别约定：
//! - `warn`：被拒绝的事件、生成函数失败
//! - `info`：加载候选、会话提交/取消
//! - `debug`：每次重算的规模
//! - `trace`：光标移动、多选切换

use std::io;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub with_target: bool,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            with_target: false,
            format: LogFormat::default(),
        }
    }
}

impl LogConfig {
    /// REPL 与日志共用终端，默认只输出 warn：
    ///
    /// - 0：warn
    /// - 1（`-v`）：info
    /// - 2（`-vv`）：debug
    /// - 3+：trace
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// 初始化全局 subscriber；重复初始化返回错误。
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let filter = build_env_filter(config.level);
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(config.with_target)
        .without_time();
    match config.format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .try_init()?,
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(layer.pretty())
            .try_init()?,
    }
    Ok(())
}

fn build_env_filter(level: Level) -> EnvFilter {
    // RUST_LOG 优先
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.as_str().to_lowercase();
        EnvFilter::new(format!(
            "warn,narrow_cli={level},narrow_core={level},narrow_source={level}"
        ))
    })
}
