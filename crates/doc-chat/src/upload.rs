//! 上传视图状态
//!
//! 收集本地文件，提交给后端换取会话标识。
//!
//! 状态流转：`Collecting` →（提交）→ `InFlight` → 成功则由外壳卸载本视图，
//! 失败则回到 `Collecting` 并显示错误提示。

use std::path::{Path, PathBuf};

use crate::api::UploadReceipt;
use crate::session::SessionId;
use crate::{DocChatError, Result};

/// 上传失败时显示的提示
pub const UPLOAD_FAILED_BANNER: &str = "Upload failed. Please check your files and try again.";

/// 待上传文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// 本地路径
    pub path: PathBuf,
    /// 文件名（作为 multipart 的 filename）
    pub name: String,
    /// 添加时的文件大小（字节）
    pub size: u64,
}

impl UploadFile {
    /// 从本地路径创建，路径必须指向已存在的普通文件
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)
            .map_err(|e| DocChatError::InvalidFile(format!("{} - {}", path.display(), e)))?;

        if !metadata.is_file() {
            return Err(DocChatError::InvalidFile(format!("{} 不是普通文件", path.display())));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
        })
    }

    /// 扩展名徽标，如 `PDF`
    pub fn extension_label(&self) -> String {
        match self.name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext.to_uppercase(),
            _ => "FILE".to_string(),
        }
    }

    /// 以 MB 为单位、保留两位小数的大小
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size as f64 / 1024.0 / 1024.0)
    }
}

/// 上传阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    /// 收集文件中
    Collecting,
    /// 请求进行中
    InFlight,
}

/// 一次提交的文件快照
#[derive(Debug, Clone)]
pub struct UploadTicket {
    pub files: Vec<UploadFile>,
}

/// 拖放/粘贴的处理结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropOutcome {
    /// 成功加入的文件数
    pub added: usize,
    /// 被拒绝的路径及原因
    pub rejected: Vec<String>,
}

/// 上传视图状态
#[derive(Debug, Clone)]
pub struct UploadView {
    files: Vec<UploadFile>,
    phase: UploadPhase,
    error: Option<String>,
}

impl Default for UploadView {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadView {
    /// 创建空的上传视图
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            phase: UploadPhase::Collecting,
            error: None,
        }
    }

    /// 当前文件列表
    pub fn files(&self) -> &[UploadFile] {
        &self.files
    }

    /// 当前阶段
    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    /// 是否正在上传
    pub fn is_in_flight(&self) -> bool {
        self.phase == UploadPhase::InFlight
    }

    /// 错误提示
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 追加文件，上传进行中时忽略
    ///
    /// 返回实际加入的数量。
    pub fn add_files(&mut self, files: impl IntoIterator<Item = UploadFile>) -> usize {
        if self.is_in_flight() {
            tracing::debug!("上传进行中，忽略新增文件");
            return 0;
        }

        let before = self.files.len();
        self.files.extend(files);
        self.files.len() - before
    }

    /// 通过路径追加单个文件
    pub fn add_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let file = UploadFile::from_path(path)?;
        self.add_files(std::iter::once(file));
        Ok(())
    }

    /// 处理拖放到终端的文本（终端会把文件路径粘贴进来）
    pub fn add_dropped(&mut self, text: &str) -> DropOutcome {
        let mut outcome = DropOutcome::default();
        for path in parse_dropped_paths(text) {
            match UploadFile::from_path(&path) {
                Ok(file) => outcome.added += self.add_files(std::iter::once(file)),
                Err(e) => {
                    tracing::warn!("忽略无效路径: {}", e);
                    outcome.rejected.push(e.to_string());
                }
            }
        }
        outcome
    }

    /// 移除指定位置的文件
    pub fn remove_file(&mut self, index: usize) -> Option<UploadFile> {
        if self.is_in_flight() || index >= self.files.len() {
            return None;
        }
        Some(self.files.remove(index))
    }

    /// 是否可以提交
    pub fn can_submit(&self) -> bool {
        !self.is_in_flight() && !self.files.is_empty()
    }

    /// 开始提交：`Collecting` → `InFlight`
    ///
    /// 不满足提交条件时返回 None，状态不变。
    pub fn begin_submit(&mut self) -> Option<UploadTicket> {
        if !self.can_submit() {
            return None;
        }

        self.phase = UploadPhase::InFlight;
        self.error = None;
        Some(UploadTicket {
            files: self.files.clone(),
        })
    }

    /// 结束提交
    ///
    /// 成功时清空文件并返回会话标识；失败时回到收集阶段并设置错误提示。
    /// 后端返回空会话标识按失败处理。
    pub fn finish_submit(&mut self, result: Result<UploadReceipt>) -> Option<SessionId> {
        if !self.is_in_flight() {
            tracing::warn!("收到不属于当前提交的上传结果，已忽略");
            return None;
        }

        self.phase = UploadPhase::Collecting;
        match result {
            Ok(receipt) if receipt.session_id.as_str().is_empty() => {
                tracing::error!("上传失败: 后端返回了空的会话标识");
                self.error = Some(UPLOAD_FAILED_BANNER.to_string());
                None
            }
            Ok(receipt) => {
                self.files.clear();
                Some(receipt.session_id)
            }
            Err(e) => {
                tracing::error!("上传失败: {}", e);
                self.error = Some(UPLOAD_FAILED_BANNER.to_string());
                None
            }
        }
    }
}

/// 解析拖放文本中的路径
///
/// 支持空白分隔、单/双引号包裹、反斜杠转义空格以及 `file://` 前缀。
pub fn parse_dropped_paths(text: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None => match c {
                '\'' | '"' => quote = Some(c),
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                }
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        paths.push(normalize_dropped(std::mem::take(&mut current)));
                    }
                }
                c => current.push(c),
            },
        }
    }

    if !current.is_empty() {
        paths.push(normalize_dropped(current));
    }

    paths
}

fn normalize_dropped(raw: String) -> PathBuf {
    match raw.strip_prefix("file://") {
        // URI 形式的路径需要百分号解码，非法编码保留原文
        Some(stripped) => match urlencoding::decode(stripped) {
            Ok(decoded) => PathBuf::from(decoded.into_owned()),
            Err(_) => PathBuf::from(stripped),
        },
        None => PathBuf::from(raw),
    }
}
