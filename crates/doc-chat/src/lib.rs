//! DocTalk 客户端核心模块
//!
//! 封装与文档问答后端的全部交互，以及与界面无关的视图状态：
//! 上传批次、聊天记录、会话标识的持久化和视图路由。

use thiserror::Error;

pub mod api;
pub mod chat;
pub mod config;
pub mod export;
pub mod session;
pub mod shell;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ChatReply, DocumentApi, HealthStatus, HttpDocumentApi, UploadReceipt};
pub use chat::{
    render_markdown, ChatView, Message, PendingTurn, Role, TextSegment, TurnState,
    FALLBACK_REPLY, GREETING,
};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use export::{ExportFormat, Exporter};
pub use session::{FileStorage, KeyValueStorage, MemoryStorage, SessionId, SessionStore, SESSION_KEY};
pub use shell::{ChatTicket, Shell, UploadRequest, View};
pub use upload::{
    parse_dropped_paths, DropOutcome, UploadFile, UploadPhase, UploadTicket, UploadView,
    UPLOAD_FAILED_BANNER,
};

/// 客户端错误
///
/// 调用方只关心"成功/失败"，这里保留具体原因仅用于日志。
#[derive(Error, Debug)]
pub enum DocChatError {
    #[error("HTTP 请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("后端返回错误状态 {status}: {body}")]
    Status { status: u16, body: String },

    #[error("响应解析失败: {0}")]
    Decode(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("存储错误: {0}")]
    Storage(String),

    #[error("上传文件列表为空")]
    EmptyUpload,

    #[error("消息内容为空")]
    EmptyMessage,

    #[error("无效文件: {0}")]
    InvalidFile(String),

    #[error("不支持的导出格式: {0}")]
    UnsupportedFormat(String),
}

/// 客户端结果类型
pub type Result<T> = std::result::Result<T, DocChatError>;
