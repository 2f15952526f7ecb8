//! 后端接口的数据结构

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::export::ExportFormat;
use crate::session::SessionId;

/// 上传接口响应
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadReceipt {
    /// 后端分配的会话标识
    pub session_id: SessionId,

    /// 后端提示信息
    #[serde(default)]
    pub message: Option<String>,

    /// 成功处理的文件名
    #[serde(default)]
    pub processed_files: Vec<String>,
}

/// 聊天接口响应
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReply {
    /// 回复正文（可能包含 `**粗体**` 标记）
    pub response: String,

    /// 引用来源文件名，按后端给出的顺序
    #[serde(default)]
    pub sources: Vec<String>,
}

impl ChatReply {
    /// 创建回复
    pub fn new(response: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            response: response.into(),
            sources,
        }
    }
}

/// 健康检查响应
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,

    /// 外部依赖服务是否已配置
    #[serde(default)]
    pub services: BTreeMap<String, bool>,
}

impl HealthStatus {
    /// 后端是否报告健康
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }

    /// 一行摘要，用于日志和控制台输出
    pub fn summary(&self) -> String {
        let services = self
            .services
            .iter()
            .map(|(name, up)| format!("{}={}", name, if *up { "on" } else { "off" }))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{} (version {}) [{}]",
            self.status,
            self.version.as_deref().unwrap_or("?"),
            services
        )
    }
}

/// 聊天请求体
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub session_id: &'a str,
    pub message: &'a str,
}

/// 下载请求体
#[derive(Debug, Serialize)]
pub(crate) struct DownloadRequest<'a> {
    pub session_id: &'a str,
    pub format: ExportFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_receipt_minimal() {
        let receipt: UploadReceipt = serde_json::from_str(r#"{"session_id":"abc123"}"#).unwrap();
        assert_eq!(receipt.session_id.as_str(), "abc123");
        assert!(receipt.message.is_none());
        assert!(receipt.processed_files.is_empty());
    }

    #[test]
    fn test_upload_receipt_full() {
        let json = r#"{
            "message": "Files processed successfully",
            "session_id": "abc123",
            "processed_files": ["a.pdf", "b.txt"]
        }"#;
        let receipt: UploadReceipt = serde_json::from_str(json).unwrap();
        assert_eq!(receipt.processed_files, vec!["a.pdf", "b.txt"]);
        assert_eq!(receipt.message.as_deref(), Some("Files processed successfully"));
    }

    #[test]
    fn test_chat_reply_without_sources() {
        let reply: ChatReply = serde_json::from_str(r#"{"response":"hi"}"#).unwrap();
        assert_eq!(reply.response, "hi");
        assert!(reply.sources.is_empty());
    }

    #[test]
    fn test_request_bodies() {
        let chat = serde_json::to_value(ChatRequest {
            session_id: "s1",
            message: "hello",
        })
        .unwrap();
        assert_eq!(chat, serde_json::json!({"session_id": "s1", "message": "hello"}));

        let download = serde_json::to_value(DownloadRequest {
            session_id: "s1",
            format: ExportFormat::Pdf,
        })
        .unwrap();
        assert_eq!(download, serde_json::json!({"session_id": "s1", "format": "pdf"}));
    }

    #[test]
    fn test_health_summary() {
        let json = r#"{
            "status": "healthy",
            "version": "1.0.0",
            "timestamp": "2024-01-01 00:00:00",
            "services": {"gemini": true, "azure_vision": false}
        }"#;
        let health: HealthStatus = serde_json::from_str(json).unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.summary(), "healthy (version 1.0.0) [azure_vision=off, gemini=on]");
    }
}
