//! 聊天模块
//!
//! # 架构
//!
//! - [`message`] - 聊天记录条目
//! - [`markdown`] - 回复正文的粗体标记解析
//! - [`view`] - 聊天视图状态（乐观追加 + 两阶段提交）

pub mod markdown;
pub mod message;
pub mod view;

pub use markdown::{render_markdown, TextSegment};
pub use message::{Message, Role};
pub use view::{ChatView, PendingTurn, TurnState, FALLBACK_REPLY, GREETING};
