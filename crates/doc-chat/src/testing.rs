//! 测试用的脚本化后端

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::api::{ChatReply, DocumentApi, HealthStatus, UploadReceipt};
use crate::export::ExportFormat;
use crate::session::SessionId;
use crate::upload::UploadFile;
use crate::{DocChatError, Result};

/// 按预设顺序返回结果，并记录每次调用
#[derive(Default)]
pub struct MockApi {
    uploads: Mutex<VecDeque<Result<UploadReceipt>>>,
    replies: Mutex<VecDeque<Result<ChatReply>>>,
    downloads: Mutex<VecDeque<Result<Vec<u8>>>>,
    upload_log: Mutex<Vec<Vec<String>>>,
    chat_log: Mutex<Vec<(SessionId, String)>>,
    download_log: Mutex<Vec<(SessionId, ExportFormat)>>,
}

fn unscripted() -> DocChatError {
    DocChatError::Status {
        status: 503,
        body: "no scripted response".to_string(),
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_upload(&self, result: Result<UploadReceipt>) {
        self.uploads.lock().unwrap().push_back(result);
    }

    pub fn push_session(&self, id: &str) {
        self.push_upload(Ok(UploadReceipt {
            session_id: SessionId::new(id),
            message: Some("Files processed successfully".to_string()),
            processed_files: Vec::new(),
        }));
    }

    pub fn push_reply(&self, result: Result<ChatReply>) {
        self.replies.lock().unwrap().push_back(result);
    }

    pub fn push_download(&self, result: Result<Vec<u8>>) {
        self.downloads.lock().unwrap().push_back(result);
    }

    /// 每次上传的文件名列表
    pub fn upload_calls(&self) -> Vec<Vec<String>> {
        self.upload_log.lock().unwrap().clone()
    }

    pub fn chat_calls(&self) -> Vec<(SessionId, String)> {
        self.chat_log.lock().unwrap().clone()
    }

    pub fn download_calls(&self) -> Vec<(SessionId, ExportFormat)> {
        self.download_log.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DocumentApi for MockApi {
    async fn upload(&self, files: &[UploadFile]) -> Result<UploadReceipt> {
        if files.is_empty() {
            return Err(DocChatError::EmptyUpload);
        }
        self.upload_log
            .lock()
            .unwrap()
            .push(files.iter().map(|f| f.name.clone()).collect());
        self.uploads.lock().unwrap().pop_front().unwrap_or_else(|| Err(unscripted()))
    }

    async fn send_message(&self, session_id: &SessionId, text: &str) -> Result<ChatReply> {
        if text.trim().is_empty() {
            return Err(DocChatError::EmptyMessage);
        }
        self.chat_log
            .lock()
            .unwrap()
            .push((session_id.clone(), text.to_string()));
        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| Err(unscripted()))
    }

    async fn download(&self, session_id: &SessionId, format: ExportFormat) -> Result<Vec<u8>> {
        self.download_log
            .lock()
            .unwrap()
            .push((session_id.clone(), format));
        self.downloads.lock().unwrap().pop_front().unwrap_or_else(|| Err(unscripted()))
    }

    async fn health(&self) -> Result<HealthStatus> {
        Ok(HealthStatus {
            status: "healthy".to_string(),
            version: Some("test".to_string()),
            timestamp: None,
            services: Default::default(),
        })
    }
}
