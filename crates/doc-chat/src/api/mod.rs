//! 后端 API 模块
//!
//! 后端只暴露几个 HTTP 接口：上传文档、聊天、下载聊天记录、健康检查。
//!
//! # 架构
//!
//! - [`types`] - 请求/响应数据结构
//! - [`client`] - 基于 reqwest 的实现 [`HttpDocumentApi`]
//!
//! 视图层只依赖 [`DocumentApi`] trait，测试中可以替换为脚本化的实现。

pub mod client;
pub mod types;

pub use client::HttpDocumentApi;
pub use types::{ChatReply, HealthStatus, UploadReceipt};

use crate::export::ExportFormat;
use crate::session::SessionId;
use crate::upload::UploadFile;
use crate::Result;

/// 文档问答后端接口
///
/// 每个方法对应一次请求/响应往返，不做重试、不做退避。
#[async_trait::async_trait]
pub trait DocumentApi: Send + Sync {
    /// 上传一批文件，换取会话标识
    ///
    /// # 错误
    ///
    /// - `DocChatError::EmptyUpload` - 文件列表为空（不会发出请求）
    /// - 其他 - 读取文件或网络请求失败
    async fn upload(&self, files: &[UploadFile]) -> Result<UploadReceipt>;

    /// 发送一条聊天消息，返回回复和引用来源
    ///
    /// # 错误
    ///
    /// - `DocChatError::EmptyMessage` - 去除空白后内容为空（不会发出请求）
    async fn send_message(&self, session_id: &SessionId, text: &str) -> Result<ChatReply>;

    /// 下载指定格式的聊天记录原始字节
    async fn download(&self, session_id: &SessionId, format: ExportFormat) -> Result<Vec<u8>>;

    /// 查询后端健康状态
    async fn health(&self) -> Result<HealthStatus>;
}
