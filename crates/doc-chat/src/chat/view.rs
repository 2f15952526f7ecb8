//! 聊天视图状态
//!
//! 每条用户消息都先乐观地追加到记录里，再等待后端回复：
//!
//! ```text
//! begin_send ──> Pending ──complete(Ok)──> Committed
//!                        └─complete(Err)─> Failed（追加固定的兜底回复）
//! ```
//!
//! 失败不会撤回用户消息。

use std::path::PathBuf;
use std::sync::Arc;

use super::message::Message;
use crate::api::{ChatReply, DocumentApi};
use crate::export::Exporter;
use crate::session::SessionId;
use crate::Result;

/// 挂载时的欢迎语（本地生成，不来自后端）
pub const GREETING: &str =
    "Documents processed successfully! Ask me anything about your uploaded files.";

/// 请求失败时追加的兜底回复
pub const FALLBACK_REPLY: &str =
    "Sorry, I encountered an error processing your message. Please try again.";

/// 一轮对话的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// 用户消息已追加，等待回复
    Pending,
    /// 已追加真实回复
    Committed,
    /// 已追加兜底回复
    Failed,
}

/// 等待回复的一轮对话
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    /// 本次挂载内的轮次编号
    pub id: u64,
    pub session_id: SessionId,
    /// 去除首尾空白后的消息
    pub text: String,
}

/// 聊天视图状态
#[derive(Debug, Clone)]
pub struct ChatView {
    session_id: SessionId,
    messages: Vec<Message>,
    loading: bool,
    pending: Option<u64>,
    next_turn: u64,
    last_turn: Option<TurnState>,
}

impl ChatView {
    /// 挂载聊天视图，记录中只有一条欢迎语
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            messages: vec![Message::assistant(GREETING, Vec::new())],
            loading: false,
            pending: None,
            next_turn: 0,
            last_turn: None,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// 按加入顺序排列的消息
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// 是否正在等待回复
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// 最近一轮对话的状态
    pub fn turn_state(&self) -> Option<TurnState> {
        self.last_turn
    }

    /// 当前输入能否发送
    pub fn can_send(&self, input: &str) -> bool {
        !self.loading && !input.trim().is_empty()
    }

    /// 第一阶段：追加用户消息并进入等待
    ///
    /// 正在等待或输入全是空白时返回 None，此时不应发出请求。
    pub fn begin_send(&mut self, input: &str) -> Option<PendingTurn> {
        if !self.can_send(input) {
            return None;
        }

        let text = input.trim().to_string();
        let id = self.next_turn;
        self.next_turn += 1;

        self.messages.push(Message::user(text.clone()));
        self.loading = true;
        self.pending = Some(id);
        self.last_turn = Some(TurnState::Pending);

        Some(PendingTurn {
            id,
            session_id: self.session_id.clone(),
            text,
        })
    }

    /// 第二阶段：根据请求结果追加回复
    ///
    /// 不是当前等待中的轮次时忽略并返回 None。
    pub fn complete(&mut self, turn: &PendingTurn, result: Result<ChatReply>) -> Option<TurnState> {
        if self.pending != Some(turn.id) {
            tracing::warn!("收到过期的聊天回复（轮次 {}），已忽略", turn.id);
            return None;
        }

        let state = match result {
            Ok(reply) => {
                self.messages
                    .push(Message::assistant(reply.response, reply.sources));
                TurnState::Committed
            }
            Err(e) => {
                tracing::error!("聊天请求失败: {}", e);
                self.messages.push(Message::assistant(FALLBACK_REPLY, Vec::new()));
                TurnState::Failed
            }
        };

        self.loading = false;
        self.pending = None;
        self.last_turn = Some(state);
        Some(state)
    }

    /// 完整发送一轮：追加、请求、追加回复
    pub async fn send(&mut self, api: &dyn DocumentApi, input: &str) -> Option<TurnState> {
        let turn = self.begin_send(input)?;
        let result = api.send_message(&turn.session_id, &turn.text).await;
        self.complete(&turn, result)
    }

    /// 导出能力，绑定本视图的会话
    pub fn exporter(&self, api: Arc<dyn DocumentApi>, download_dir: impl Into<PathBuf>) -> Exporter {
        Exporter::new(api, self.session_id.clone(), download_dir)
    }
}
