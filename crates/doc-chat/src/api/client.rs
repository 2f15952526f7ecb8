//! 基于 reqwest 的后端客户端

use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;

use super::types::{ChatReply, ChatRequest, DownloadRequest, HealthStatus, UploadReceipt};
use super::DocumentApi;
use crate::config::ClientConfig;
use crate::export::ExportFormat;
use crate::session::SessionId;
use crate::upload::UploadFile;
use crate::{DocChatError, Result};

/// 上传接口中所有文件共用的表单字段名
const UPLOAD_FIELD: &str = "files";

/// HTTP 后端客户端
#[derive(Debug, Clone)]
pub struct HttpDocumentApi {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpDocumentApi {
    /// 根据配置创建客户端
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    /// 非 2xx 状态统一转换为错误
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(DocChatError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// 读取并解析 JSON 响应体
    async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| DocChatError::Decode(e.to_string()))
    }

    /// 读取文件内容并构建 multipart 表单
    async fn build_form(files: &[UploadFile]) -> Result<Form> {
        let mut form = Form::new();
        for file in files {
            let bytes = tokio::fs::read(&file.path).await?;
            let part = Part::bytes(bytes).file_name(file.name.clone());
            form = form.part(UPLOAD_FIELD, part);
        }
        Ok(form)
    }
}

#[async_trait::async_trait]
impl DocumentApi for HttpDocumentApi {
    async fn upload(&self, files: &[UploadFile]) -> Result<UploadReceipt> {
        if files.is_empty() {
            return Err(DocChatError::EmptyUpload);
        }

        let form = Self::build_form(files).await?;
        tracing::info!("上传 {} 个文件", files.len());

        let response = self
            .client
            .post(self.config.endpoint("/api/upload"))
            .multipart(form)
            .send()
            .await?;

        let receipt: UploadReceipt = Self::decode_json(response).await?;
        tracing::info!(
            "上传完成，会话 {}，已处理 {} 个文件",
            receipt.session_id,
            receipt.processed_files.len()
        );
        Ok(receipt)
    }

    async fn send_message(&self, session_id: &SessionId, text: &str) -> Result<ChatReply> {
        if text.trim().is_empty() {
            return Err(DocChatError::EmptyMessage);
        }

        let body = ChatRequest {
            session_id: session_id.as_str(),
            message: text,
        };

        let response = self
            .client
            .post(self.config.endpoint("/api/chat"))
            .json(&body)
            .send()
            .await?;

        let reply: ChatReply = Self::decode_json(response).await?;
        tracing::debug!("收到回复，{} 个引用来源", reply.sources.len());
        Ok(reply)
    }

    async fn download(&self, session_id: &SessionId, format: ExportFormat) -> Result<Vec<u8>> {
        let body = DownloadRequest {
            session_id: session_id.as_str(),
            format,
        };

        let response = self
            .client
            .post(self.config.endpoint("/api/download"))
            .json(&body)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        tracing::info!("下载聊天记录 {}，{} 字节", format, bytes.len());
        Ok(bytes.to_vec())
    }

    async fn health(&self) -> Result<HealthStatus> {
        let response = self
            .client
            .get(self.config.endpoint("/health"))
            .send()
            .await?;

        Self::decode_json(response).await
    }
}
