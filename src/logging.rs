//! 日志配置模块
//!
//! 日志始终写入按天滚动的文件；控制台模式下同时输出到 stderr，
//! TUI 模式只写文件，避免干扰界面。

use clap::ValueEnum;
use std::path::{Path, PathBuf};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

/// 日志文件前缀
const LOG_FILE_PREFIX: &str = "doctalk";

/// 日志级别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志目录
    pub log_dir: PathBuf,
    /// 日志级别
    pub level: LogLevel,
    /// 是否同时输出到控制台
    pub console_output: bool,
    /// 是否使用颜色（仅控制台）
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            level: LogLevel::default(),
            console_output: false,
            ansi: false,
        }
    }
}

impl LoggingConfig {
    /// 创建新的日志配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置日志目录
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    /// 设置日志级别
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// 设置是否输出到控制台
    pub fn with_console_output(mut self, output: bool) -> Self {
        self.console_output = output;
        self
    }

    /// 设置是否使用 ANSI 颜色
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// 初始化日志系统
    ///
    /// 此函数应该只调用一次，通常在 main 函数的开头。
    pub fn init(self) -> Result<(), Box<dyn std::error::Error>> {
        // 确保日志目录存在
        std::fs::create_dir_all(&self.log_dir)?;

        // 创建滚动文件 appender（每天一个文件）
        let file_appender = rolling::daily(&self.log_dir, LOG_FILE_PREFIX);
        let (non_blocking_file, guard) = non_blocking(file_appender);

        let level = LevelFilter::from(self.level.to_tracing_level());

        let file_layer = fmt::layer()
            .with_writer(non_blocking_file)
            .with_ansi(false)
            .with_level(true)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(false)
            .with_line_number(false)
            .with_filter(level);

        let subscriber = tracing_subscriber::registry().with(file_layer);

        if self.console_output {
            let console_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(self.ansi)
                .with_level(true)
                .with_target(false)
                .with_filter(level);

            subscriber.with(console_layer).try_init()?;
        } else {
            subscriber.try_init()?;
        }

        // guard 释放后文件日志停止写入，全局日志需要保持到进程结束
        std::mem::forget(guard);

        Ok(())
    }
}

/// 数据目录下的日志目录
pub fn log_dir_in(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
        assert_eq!(LogLevel::Debug.to_tracing_level(), tracing::Level::DEBUG);
        assert_eq!(LogLevel::Info.to_tracing_level(), tracing::Level::INFO);
        assert_eq!(LogLevel::Warn.to_tracing_level(), tracing::Level::WARN);
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_config_builder() {
        let config = LoggingConfig::new()
            .with_log_dir("/tmp/logs")
            .with_level(LogLevel::Debug)
            .with_console_output(true)
            .with_ansi(true);

        assert_eq!(config.log_dir, PathBuf::from("/tmp/logs"));
        assert_eq!(config.level, LogLevel::Debug);
        assert!(config.console_output);
        assert!(config.ansi);
    }

    #[test]
    fn test_log_level_from_cli_value() {
        assert_eq!(LogLevel::from_str("warn", true).unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_init_creates_log_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let log_dir = log_dir_in(dir.path());

        // 全局订阅者只能设置一次，这里只关心目录被创建
        let _ = LoggingConfig::new().with_log_dir(&log_dir).init();
        assert!(log_dir.is_dir());
    }
}
