//! `narrow_core`：纯逻辑层，不做任何 I/O。
//!
//! 设计目标：
//! - **核心可复用**：CLI/GUI/编辑器插件都能复用同一套逻辑
//! - **分层清晰**：source -> preprocess -> refine -> ordering -> cursor -> viewport -> highlight -> 输出（`ViewState`）
//! - **可替换**：流水线三个阶段与 processor 链都可以由调用方替换
//! - **一致性**：每个事件都同步跑完，任何时刻只存在一份完整的会话状态
pub mod context;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod filter;
pub mod history;
pub mod key_event;
pub mod model;
pub mod ordering;
pub mod pipeline;
pub mod processor;
pub mod select;
pub mod session;
pub mod source;
pub mod viewport;

pub use cursor::{Cursor, Nav};
pub use engine::{Engine, EngineConfig};
pub use error::{NarrowError, Result};
pub use model::{Candidate, ViewState};
pub use select::Outcome;
pub use session::{CommitStatus, Session, SessionOptions, SessionSnapshot};
pub use source::{CandidateSource, Generated, RawCollection};
