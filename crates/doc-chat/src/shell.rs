//! 应用外壳
//!
//! 根据是否存在会话标识，在上传视图和聊天视图之间切换。
//! 每次切换视图都会递增挂载代数（epoch），属于旧挂载的请求结果到达时直接丢弃。

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{ChatReply, DocumentApi, UploadReceipt};
use crate::chat::{ChatView, PendingTurn, TurnState};
use crate::export::{ExportFormat, Exporter};
use crate::session::{SessionId, SessionStore};
use crate::upload::{UploadFile, UploadView};
use crate::Result;

/// 当前挂载的视图
#[derive(Debug, Clone)]
pub enum View {
    Upload(UploadView),
    Chat(ChatView),
}

/// 待发出的上传请求
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub epoch: u64,
    pub files: Vec<UploadFile>,
}

/// 待发出的聊天请求
#[derive(Debug, Clone)]
pub struct ChatTicket {
    pub epoch: u64,
    pub turn: PendingTurn,
}

/// 应用外壳
pub struct Shell {
    store: SessionStore,
    api: Arc<dyn DocumentApi>,
    download_dir: PathBuf,
    view: View,
    exporter: Option<Exporter>,
    epoch: u64,
}

impl Shell {
    /// 创建外壳；存储中已有会话时直接挂载聊天视图
    pub fn new(store: SessionStore, api: Arc<dyn DocumentApi>, download_dir: impl Into<PathBuf>) -> Self {
        let mut shell = Self {
            store,
            api,
            download_dir: download_dir.into(),
            view: View::Upload(UploadView::new()),
            exporter: None,
            epoch: 0,
        };

        if let Some(id) = shell.store.get().cloned() {
            shell.mount_chat(id);
        }

        shell
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.store.get()
    }

    /// 导出能力，仅在聊天视图挂载时存在
    pub fn exporter(&self) -> Option<&Exporter> {
        self.exporter.as_ref()
    }

    pub fn api(&self) -> Arc<dyn DocumentApi> {
        self.api.clone()
    }

    pub fn upload_view_mut(&mut self) -> Option<&mut UploadView> {
        match &mut self.view {
            View::Upload(view) => Some(view),
            View::Chat(_) => None,
        }
    }

    pub fn chat_view(&self) -> Option<&ChatView> {
        match &self.view {
            View::Chat(view) => Some(view),
            View::Upload(_) => None,
        }
    }

    fn mount_chat(&mut self, id: SessionId) {
        let view = ChatView::new(id);
        self.exporter = Some(view.exporter(self.api.clone(), self.download_dir.clone()));
        self.view = View::Chat(view);
        self.epoch += 1;
    }

    /// 上传成功：保存会话标识并挂载聊天视图
    pub fn upload_succeeded(&mut self, id: SessionId) {
        tracing::info!("上传成功，会话: {}", id);
        if let Err(e) = self.store.set(id.clone()) {
            tracing::error!("保存会话标识失败: {}", e);
        }
        self.mount_chat(id);
    }

    /// 开始新会话：清除会话标识，回到空的上传视图
    pub fn new_session(&mut self) {
        tracing::info!("开始新会话");
        if let Err(e) = self.store.clear() {
            tracing::error!("清除会话标识失败: {}", e);
        }
        self.exporter = None;
        self.view = View::Upload(UploadView::new());
        self.epoch += 1;
    }

    /// 开始上传，不在上传视图或不满足提交条件时返回 None
    pub fn begin_upload(&mut self) -> Option<UploadRequest> {
        let epoch = self.epoch;
        let ticket = self.upload_view_mut()?.begin_submit()?;
        Some(UploadRequest {
            epoch,
            files: ticket.files,
        })
    }

    /// 处理上传结果，成功时返回新会话标识
    pub fn finish_upload(&mut self, epoch: u64, result: Result<UploadReceipt>) -> Option<SessionId> {
        if epoch != self.epoch {
            tracing::warn!("丢弃过期的上传结果（代数 {} != {}）", epoch, self.epoch);
            return None;
        }

        let id = self.upload_view_mut()?.finish_submit(result)?;
        self.upload_succeeded(id.clone());
        Some(id)
    }

    /// 开始发送聊天消息
    pub fn begin_chat(&mut self, input: &str) -> Option<ChatTicket> {
        let epoch = self.epoch;
        match &mut self.view {
            View::Chat(view) => view.begin_send(input).map(|turn| ChatTicket { epoch, turn }),
            View::Upload(_) => None,
        }
    }

    /// 处理聊天回复
    pub fn finish_chat(&mut self, ticket: &ChatTicket, result: Result<ChatReply>) -> Option<TurnState> {
        if ticket.epoch != self.epoch {
            tracing::warn!("丢弃过期的聊天回复（代数 {} != {}）", ticket.epoch, self.epoch);
            return None;
        }

        match &mut self.view {
            View::Chat(view) => view.complete(&ticket.turn, result),
            View::Upload(_) => None,
        }
    }

    /// 顺序执行一次上传
    pub async fn submit_upload(&mut self) -> Option<SessionId> {
        let request = self.begin_upload()?;
        let result = self.api.upload(&request.files).await;
        self.finish_upload(request.epoch, result)
    }

    /// 顺序发送一条聊天消息
    pub async fn send_chat(&mut self, input: &str) -> Option<TurnState> {
        let ticket = self.begin_chat(input)?;
        let result = self
            .api
            .send_message(&ticket.turn.session_id, &ticket.turn.text)
            .await;
        self.finish_chat(&ticket, result)
    }

    /// 通过当前导出能力导出，没有挂载聊天视图时返回 None
    pub async fn export(&self, format: ExportFormat) -> Option<PathBuf> {
        match &self.exporter {
            Some(exporter) => exporter.export(format).await,
            None => {
                tracing::debug!("没有活动会话，忽略导出");
                None
            }
        }
    }
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("store", &self.store)
            .field("view", &self.view)
            .field("epoch", &self.epoch)
            .finish()
    }
}
