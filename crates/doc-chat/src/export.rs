//! 聊天记录导出
//!
//! [`Exporter`] 是聊天视图交给外壳的导出能力对象，外壳把它接到顶栏的导出操作上。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::api::DocumentApi;
use crate::session::SessionId;
use crate::{DocChatError, Result};

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Txt,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// 保存时使用的文件名
    pub fn file_name(&self) -> String {
        format!("chat_history.{}", self.as_str())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = DocChatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" => Ok(ExportFormat::Txt),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(DocChatError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// 导出能力
///
/// 绑定一个会话和一个保存目录；每次挂载聊天视图只创建一次。
#[derive(Clone)]
pub struct Exporter {
    api: Arc<dyn DocumentApi>,
    session_id: SessionId,
    download_dir: PathBuf,
}

impl Exporter {
    pub fn new(api: Arc<dyn DocumentApi>, session_id: SessionId, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            api,
            session_id,
            download_dir: download_dir.into(),
        }
    }

    /// 绑定的会话
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// 下载并保存聊天记录
    ///
    /// 失败只记录日志，返回 None，不向界面报告。
    pub async fn export(&self, format: ExportFormat) -> Option<PathBuf> {
        match self.try_export(format).await {
            Ok(path) => {
                tracing::info!("聊天记录已保存: {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::error!("导出聊天记录失败 ({}): {}", format, e);
                None
            }
        }
    }

    async fn try_export(&self, format: ExportFormat) -> Result<PathBuf> {
        let bytes = self.api.download(&self.session_id, format).await?;

        tokio::fs::create_dir_all(&self.download_dir).await?;
        let path = self.download_dir.join(format.file_name());
        tokio::fs::write(&path, &bytes).await?;
        Ok(path)
    }
}

impl fmt::Debug for Exporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exporter")
            .field("session_id", &self.session_id)
            .field("download_dir", &self.download_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockApi;
    use tempfile::TempDir;

    #[test]
    fn test_parse_format() {
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Txt);
        assert_eq!(" PDF ".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert!(matches!(
            "docx".parse::<ExportFormat>(),
            Err(DocChatError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(ExportFormat::Txt.file_name(), "chat_history.txt");
        assert_eq!(ExportFormat::Pdf.file_name(), "chat_history.pdf");
    }

    #[tokio::test]
    async fn test_export_writes_file() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::new());
        api.push_download(Ok(b"Chat History".to_vec()));

        let exporter = Exporter::new(api.clone(), SessionId::new("abc123"), dir.path());
        let path = exporter.export(ExportFormat::Txt).await.unwrap();

        assert_eq!(path, dir.path().join("chat_history.txt"));
        assert_eq!(std::fs::read(&path).unwrap(), b"Chat History");
        assert_eq!(api.download_calls(), vec![(SessionId::new("abc123"), ExportFormat::Txt)]);
    }

    #[tokio::test]
    async fn test_export_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::new());
        api.push_download(Err(DocChatError::Status {
            status: 400,
            body: "No chat history to download".to_string(),
        }));

        let exporter = Exporter::new(api, SessionId::new("abc123"), dir.path());
        assert!(exporter.export(ExportFormat::Pdf).await.is_none());
        assert!(!dir.path().join("chat_history.pdf").exists());
    }
}
