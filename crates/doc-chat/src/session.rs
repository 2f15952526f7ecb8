//! 会话标识持久化模块
//!
//! 会话标识由后端在上传成功后签发，客户端只负责原样保存：
//! 启动时读取一次，之后每次变化都同步写回存储。

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::{DocChatError, Result};

/// 存储会话标识使用的固定键名
pub const SESSION_KEY: &str = "chatSessionId";

/// 会话标识（对客户端不透明）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// 创建会话标识
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 获取字符串形式
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// 键值存储后端
///
/// 对应浏览器里的 localStorage：字符串键到字符串值。
pub trait KeyValueStorage: Send + Sync {
    /// 读取键值，不存在时返回 None
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// 写入键值
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// 删除键，不存在时视为成功
    fn remove(&self, key: &str) -> Result<()>;
}

/// 基于 JSON 文件的存储
///
/// 文件内容是一个字符串到字符串的 JSON 对象。
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// 使用指定文件路径创建存储（文件可以尚不存在）
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 存储文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            DocChatError::Storage(format!("解析存储文件失败: {} - {}", self.path.display(), e))
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| DocChatError::Storage(e.to_string()))?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

/// 内存存储
///
/// 克隆出的实例共享同一份数据，可用来模拟"重启后重新打开存储"。
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// 创建空的内存存储
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| DocChatError::Storage("内存存储锁已中毒".to_string()))
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// 会话标识存储
///
/// 持有当前会话标识的内存副本，并把每次变化写回后端存储。
/// 写入失败时内存状态依然更新，错误交给调用方记录。
pub struct SessionStore {
    storage: Box<dyn KeyValueStorage>,
    current: Option<SessionId>,
}

impl SessionStore {
    /// 打开存储并读取一次已保存的会话标识
    ///
    /// 读取失败或值为空字符串都视为没有会话。
    pub fn open(storage: impl KeyValueStorage + 'static) -> Self {
        let current = match storage.get(SESSION_KEY) {
            Ok(Some(id)) if !id.is_empty() => {
                tracing::info!("恢复已保存的会话: {}", id);
                Some(SessionId::new(id))
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("读取会话存储失败，将从上传页开始: {}", e);
                None
            }
        };

        Self {
            storage: Box::new(storage),
            current,
        }
    }

    /// 当前会话标识
    pub fn get(&self) -> Option<&SessionId> {
        self.current.as_ref()
    }

    /// 是否存在会话
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// 设置会话标识并写回存储
    pub fn set(&mut self, id: SessionId) -> Result<()> {
        let value = id.as_str().to_string();
        self.current = Some(id);
        self.storage.set(SESSION_KEY, &value)
    }

    /// 清除会话标识并从存储中删除
    pub fn clear(&mut self) -> Result<()> {
        self.current = None;
        self.storage.remove(SESSION_KEY)
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("current", &self.current)
            .finish()
    }
}
