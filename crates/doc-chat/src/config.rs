//! 客户端配置模块

use std::path::PathBuf;
use std::time::Duration;

/// 默认后端地址
pub const DEFAULT_BASE_URL: &str = "https://doctalk-production.up.railway.app";

/// 客户端配置
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 后端根地址（不带结尾斜杠）
    pub base_url: String,

    /// 单次请求超时，None 表示不限制
    pub timeout: Option<Duration>,

    /// User-Agent 头
    pub user_agent: String,

    /// 导出文件保存目录
    pub download_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            // 文档解析可能很慢，默认不设超时
            timeout: None,
            user_agent: format!("doctalk-rust/{}", env!("CARGO_PKG_VERSION")),
            download_dir: default_download_dir(),
        }
    }
}

impl ClientConfig {
    /// 创建新的配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置后端地址
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// 设置请求超时
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// 设置导出目录
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// 拼接接口完整地址
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// 默认导出目录：系统下载目录，找不到时使用当前目录
fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}
