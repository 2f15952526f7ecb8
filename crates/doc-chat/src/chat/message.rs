//! 聊天记录条目

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::markdown::{render_markdown, TextSegment};

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// 聊天消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,

    /// 正文
    pub text: String,

    /// 引用来源（可能为空）
    pub sources: Vec<String>,

    /// 加入记录的时间，仅用于显示
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// 用户消息
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            sources: Vec::new(),
            sent_at: Utc::now(),
        }
    }

    /// 助手消息
    pub fn assistant(text: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            sources,
            sent_at: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// 显示用的文本片段
    ///
    /// 用户消息按原文显示，助手消息解析粗体标记。
    pub fn segments(&self) -> Vec<TextSegment> {
        match self.role {
            Role::User => vec![TextSegment::Plain(self.text.clone())],
            Role::Assistant => render_markdown(&self.text),
        }
    }

    /// 来源行，没有来源时返回 None
    pub fn sources_line(&self) -> Option<String> {
        if self.sources.is_empty() {
            None
        } else {
            Some(format!("Sources: {}", self.sources.join(", ")))
        }
    }
}
