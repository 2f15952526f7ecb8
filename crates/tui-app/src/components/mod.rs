//! UI 组件模块
//!
//! 包含各种可复用的 UI 组件。

pub mod chat_panel;
pub mod input;
pub mod upload_panel;

pub use chat_panel::{message_lines, ChatPanel, ChatPanelState};
pub use input::InputState;
pub use upload_panel::{UploadPanel, UploadPanelState};
