//! `narrow_source`：从文件加载候选集合与历史记录。
//!
//! 这是 I/O 层；`narrow_core` 只接收加载好的 `RawCollection`。
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use narrow_core::{history::History, source::RawCollection};
use thiserror::Error;
use tracing::{debug, info};

/// 每行最多的列数：`text full_form prefix suffix right_margin`
pub const MAX_COLUMNS: usize = 5;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("读取 {} 失败", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("TSV 第 {line} 行有 {columns} 列（允许 1-5 列）")]
    Malformed { line: usize, columns: usize },
    #[error("TSV 第 {line} 行缺少 text")]
    MissingText { line: usize },
}

pub type Result<T, E = SourceError> = std::result::Result<T, E>;

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// 有效行：跳过空行与 `#` 注释；行号从 1 开始。
fn content_lines(s: &str) -> impl Iterator<Item = (usize, &str)> {
    s.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'))
}

/// TSV 格式：
///
/// - `text<TAB>full_form<TAB>prefix<TAB>suffix<TAB>right_margin`
/// - 只有 text 必填；空列视为缺省
/// - 允许 `#` 开头注释行
pub fn parse_tsv(s: &str) -> Result<RawCollection> {
    let mut rows = Vec::new();
    for (line, content) in content_lines(s) {
        let columns: Vec<String> = content.split('\t').map(|c| c.trim().to_owned()).collect();
        if columns.len() > MAX_COLUMNS {
            return Err(SourceError::Malformed {
                line,
                columns: columns.len(),
            });
        }
        if columns[0].is_empty() {
            return Err(SourceError::MissingText { line });
        }
        rows.push(columns);
    }
    debug!(rows = rows.len(), "parsed tsv");
    Ok(RawCollection::Rows(rows))
}

/// 每行一个候选，不做列拆分。
pub fn parse_lines(s: &str) -> RawCollection {
    RawCollection::Strings(content_lines(s).map(|(_, l)| l.trim().to_owned()).collect())
}

pub fn load_tsv(path: impl AsRef<Path>) -> Result<RawCollection> {
    let path = path.as_ref();
    let raw = parse_tsv(&read(path)?)?;
    info!(path = %path.display(), ?raw, "loaded candidates");
    Ok(raw)
}

pub fn load_lines(path: impl AsRef<Path>) -> Result<RawCollection> {
    let path = path.as_ref();
    let raw = parse_lines(&read(path)?);
    info!(path = %path.display(), ?raw, "loaded candidates");
    Ok(raw)
}

/// 历史文件：每行一条，最新在前；文件不存在时返回空历史。
pub fn load_history(path: impl AsRef<Path>, capacity: usize) -> Result<History> {
    let path = path.as_ref();
    let content = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "history file not found");
            return Ok(History::with_capacity(capacity));
        }
        Err(source) => {
            return Err(SourceError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let mut history = History::with_capacity(capacity);
    // 文件最新在前，逐条 push 需要从最旧的开始
    let entries: Vec<&str> = content.lines().filter(|l| !l.is_empty()).collect();
    history.extend(entries.into_iter().rev());
    debug!(path = %path.display(), entries = history.len(), "loaded history");
    Ok(history)
}

pub fn save_history(path: impl AsRef<Path>, history: &History) -> Result<()> {
    let path = path.as_ref();
    let mut content = history.entries().join("\n");
    content.push('\n');
    fs::write(path, content).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use narrow_core::source::{CandidateSource, normalize};
    use rstest::rstest;

    use super::*;

    #[test]
    fn tsv_rows_become_structured_candidates() {
        let raw = parse_tsv(
            "# comment\n\
             hosts\t/etc/hosts\t\t\t1 KB\n\
             \n\
             readme\n",
        )
        .unwrap();
        let CandidateSource::Static(cands) = normalize(raw).unwrap() else {
            panic!("expected static source");
        };
        assert_eq!(cands.len(), 2);
        assert_eq!(cands[0].full_form(), "/etc/hosts");
        assert_eq!(cands[0].right_margin.as_deref(), Some("1 KB"));
        assert_eq!(cands[0].prefix, None);
        assert_eq!(cands[1].full_form(), "readme");
    }

    #[rstest]
    #[case("a\tb\tc\td\te\tf\n", 1, 6)]
    #[case("ok\n# c\nx\t\t\t\t\t\t\n", 3, 7)]
    fn too_many_columns_reports_line(
        #[case] input: &str,
        #[case] line: usize,
        #[case] columns: usize,
    ) {
        let err = parse_tsv(input).unwrap_err();
        assert!(matches!(
            err,
            SourceError::Malformed { line: l, columns: c } if l == line && c == columns
        ));
    }

    #[test]
    fn missing_text_is_rejected() {
        let err = parse_tsv("a\n\t/full\n").unwrap_err();
        assert!(matches!(err, SourceError::MissingText { line: 2 }));
        assert_eq!(err.to_string(), "TSV 第 2 行缺少 text");
    }

    #[test]
    fn lines_keep_file_order() {
        let RawCollection::Strings(v) = parse_lines("b\n\n#x\na b\n") else {
            panic!("expected strings");
        };
        assert_eq!(v, ["b", "a b"]);
    }

    #[test]
    fn history_roundtrips_most_recent_first() {
        let path = std::env::temp_dir().join(format!("narrow-history-{}", std::process::id()));
        let mut history = History::new();
        history.extend(["old", "mid", "new"]);
        save_history(&path, &history).unwrap();

        let loaded = load_history(&path, 2).unwrap();
        assert_eq!(loaded.entries(), ["new", "mid"]);
        fs::remove_file(&path).unwrap();

        let missing = load_history(&path, 2).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_tsv("/nonexistent/narrow/candidates.tsv").unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}
