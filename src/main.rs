use clap::Parser;
use doc_chat::{
    ClientConfig, DocumentApi, FileStorage, HttpDocumentApi, SessionStore, Shell, DEFAULT_BASE_URL,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod console;
mod logging;

/// 存储文件名（保存会话标识）
const STORAGE_FILE: &str = "storage.json";

/// 启动时健康检查的等待上限
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// DocTalk：上传文档，围绕文档内容对话，导出聊天记录
#[derive(Parser, Debug)]
#[command(name = "doctalk", version, about)]
struct CliArgs {
    /// 启用 TUI 图形界面模式
    #[arg(short, long)]
    tui: bool,

    /// 后端地址
    #[arg(long, env = "DOCTALK_API_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// 导出文件保存目录（默认为系统下载目录）
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// 数据目录（会话存储和日志），默认为系统数据目录
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// 日志级别
    #[arg(long, value_enum, default_value_t = logging::LogLevel::Info)]
    log_level: logging::LogLevel,
}

impl CliArgs {
    /// 应用数据目录：`<data_dir>/doctalk`
    fn app_data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(dirs::data_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("doctalk")
    }

    fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new().with_base_url(self.base_url.clone());
        match &self.download_dir {
            Some(dir) => config.with_download_dir(dir.clone()),
            None => config,
        }
    }
}

/// 启动时检查后端，失败不影响运行
async fn log_backend_health(api: &dyn DocumentApi) {
    match tokio::time::timeout(HEALTH_CHECK_TIMEOUT, api.health()).await {
        Ok(Ok(status)) if status.is_healthy() => tracing::info!("后端状态: {}", status.summary()),
        Ok(Ok(status)) => tracing::warn!("后端状态异常: {}", status.summary()),
        Ok(Err(e)) => tracing::warn!("后端健康检查失败: {}", e),
        Err(_) => tracing::warn!("后端健康检查超时"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 解析命令行参数
    let args = CliArgs::parse();
    let data_dir = args.app_data_dir();

    // 初始化日志
    // TUI 模式：只输出到文件（避免干扰 TUI 界面）
    // 控制台模式：输出到文件和控制台
    logging::LoggingConfig::new()
        .with_log_dir(logging::log_dir_in(&data_dir))
        .with_level(args.log_level)
        .with_console_output(!args.tui)
        .with_ansi(!args.tui)
        .init()?;

    let config = args.client_config();
    tracing::info!("后端地址: {}", config.base_url);
    tracing::info!("导出目录: {}", config.download_dir.display());

    let download_dir = config.download_dir.clone();
    let api: Arc<dyn DocumentApi> = Arc::new(HttpDocumentApi::new(config)?);

    // 读取一次已保存的会话
    let storage = FileStorage::new(data_dir.join(STORAGE_FILE));
    tracing::info!("会话存储: {}", storage.path().display());
    let store = SessionStore::open(storage);

    log_backend_health(api.as_ref()).await;

    let shell = Shell::new(store, api, download_dir);

    // 根据参数选择运行模式
    if args.tui {
        tui_app::run_tui(shell).await?;
    } else {
        console::run_console(shell).await?;
    }

    Ok(())
}
