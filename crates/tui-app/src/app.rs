//! TUI 应用主逻辑
//!
//! 管理界面状态和主事件循环。网络请求在独立任务中执行，
//! 完成后通过事件通道把结果送回主循环，由 [`Shell`] 根据挂载代数决定是否采纳。

use crate::components::{ChatPanelState, UploadPanelState};
use crate::event::{AppResult, Event, EventHandler};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use doc_chat::{ChatTicket, ExportFormat, Shell, UploadRequest, View};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::time::Duration;
use tokio::sync::mpsc;

/// 按键处理后需要发起的后台操作
#[derive(Debug)]
pub enum Action {
    Upload(UploadRequest),
    Chat(ChatTicket),
    Export(ExportFormat),
}

/// TUI 应用
pub struct TuiApp {
    /// 视图路由与会话
    shell: Shell,
    /// 上传面板状态
    upload_panel: UploadPanelState,
    /// 聊天面板状态
    chat_panel: ChatPanelState,
    /// 底栏提示
    status: Option<String>,
    /// 刷新计数（等待动画）
    tick: u64,
    /// 运行状态
    running: bool,
}

impl TuiApp {
    /// 创建新的 TUI 应用
    pub fn new(shell: Shell) -> Self {
        Self {
            shell,
            upload_panel: UploadPanelState::new(),
            chat_panel: ChatPanelState::new(),
            status: None,
            tick: 0,
            running: true,
        }
    }

    /// 运行应用
    pub async fn run(&mut self) -> AppResult<()> {
        // 启用原始模式
        crossterm::terminal::enable_raw_mode()?;

        // 进入备用屏幕，开启括号粘贴以接收拖放的文件路径
        crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::EnterAlternateScreen,
            crossterm::event::EnableBracketedPaste
        )?;

        // 创建终端
        let backend = CrosstermBackend::new(std::io::stdout());
        let mut terminal = Terminal::new(backend)?;

        // 创建事件通道
        let (event_tx, mut event_rx) = mpsc::channel(100);

        // 启动键盘监听
        let keyboard = EventHandler::new(event_tx.clone());
        tokio::spawn(async move {
            if let Err(err) = keyboard.run_keyboard_listener().await {
                tracing::error!("键盘监听退出: {}", err);
            }
        });

        // 启动定时器
        let ticker = EventHandler::new(event_tx.clone());
        tokio::spawn(async move {
            if let Err(err) = ticker.run_ticker(Duration::from_millis(250)).await {
                tracing::debug!("定时器退出: {}", err);
            }
        });

        // 主事件循环
        while self.running {
            // 绘制 UI
            terminal.draw(|f| {
                crate::ui::draw_ui(f, self);
            })?;

            // 处理事件
            match event_rx.recv().await {
                Some(event) => {
                    if let Some(action) = self.handle_event(event) {
                        self.dispatch(action, &event_tx);
                    }
                }
                None => {
                    break;
                }
            }
        }

        // 清理
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::event::DisableBracketedPaste,
            crossterm::terminal::LeaveAlternateScreen
        )?;

        Ok(())
    }

    /// 处理一个事件，返回需要发起的后台操作
    pub fn handle_event(&mut self, event: Event) -> Option<Action> {
        match event {
            Event::Input(key_event) => self.handle_key_event(key_event),
            Event::Paste(content) => {
                self.handle_paste_event(content);
                None
            }
            Event::Tick => {
                self.tick = self.tick.wrapping_add(1);
                None
            }
            Event::UploadFinished { epoch, result } => {
                if let Some(id) = self.shell.finish_upload(epoch, result) {
                    self.upload_panel = UploadPanelState::new();
                    self.chat_panel = ChatPanelState::new();
                    self.status = Some(format!("Session {} started", id));
                }
                None
            }
            Event::ChatFinished { ticket, result } => {
                if self.shell.finish_chat(&ticket, result).is_some() {
                    self.chat_panel.scroll_to_bottom();
                }
                None
            }
            Event::Exported { format, path } => {
                // 导出失败不提示
                if let Some(path) = path {
                    self.status = Some(format!("Saved {} export to {}", format, path.display()));
                }
                None
            }
        }
    }

    /// 在后台任务中执行操作，结果通过事件通道返回
    fn dispatch(&self, action: Action, tx: &mpsc::Sender<Event>) {
        let tx = tx.clone();
        match action {
            Action::Upload(request) => {
                let api = self.shell.api();
                tokio::spawn(async move {
                    let result = api.upload(&request.files).await;
                    let event = Event::UploadFinished {
                        epoch: request.epoch,
                        result,
                    };
                    if tx.send(event).await.is_err() {
                        tracing::debug!("事件通道已关闭，丢弃上传结果");
                    }
                });
            }
            Action::Chat(ticket) => {
                let api = self.shell.api();
                tokio::spawn(async move {
                    let result = api
                        .send_message(&ticket.turn.session_id, &ticket.turn.text)
                        .await;
                    if tx.send(Event::ChatFinished { ticket, result }).await.is_err() {
                        tracing::debug!("事件通道已关闭，丢弃聊天回复");
                    }
                });
            }
            Action::Export(format) => {
                let Some(exporter) = self.shell.exporter().cloned() else {
                    return;
                };
                tokio::spawn(async move {
                    let path = exporter.export(format).await;
                    if tx.send(Event::Exported { format, path }).await.is_err() {
                        tracing::debug!("事件通道已关闭，丢弃导出结果");
                    }
                });
            }
        }
    }

    /// 处理键盘事件
    fn handle_key_event(&mut self, key_event: KeyEvent) -> Option<Action> {
        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Char('c') if ctrl => {
                self.running = false;
                None
            }
            KeyCode::Char('n') if ctrl => {
                self.shell.new_session();
                self.upload_panel = UploadPanelState::new();
                self.chat_panel = ChatPanelState::new();
                self.status = Some("Started a new session".to_string());
                None
            }
            _ if self.on_upload_view() => self.handle_upload_key(key_event),
            _ => self.handle_chat_key(key_event),
        }
    }

    /// 上传视图按键
    fn handle_upload_key(&mut self, key_event: KeyEvent) -> Option<Action> {
        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);

        match key_event.code {
            KeyCode::Char('u') if ctrl => {
                let request = self.shell.begin_upload();
                if request.is_none() {
                    tracing::debug!("没有可提交的文件或上传进行中");
                }
                request.map(Action::Upload)
            }
            KeyCode::Enter => {
                let text = self.upload_panel.input.take();
                if !text.trim().is_empty() {
                    self.add_paths(&text);
                }
                None
            }
            KeyCode::Up => {
                self.upload_panel.move_up();
                None
            }
            KeyCode::Down => {
                let len = self.file_count();
                self.upload_panel.move_down(len);
                None
            }
            KeyCode::Delete => {
                let cursor = self.upload_panel.cursor;
                if let Some(view) = self.shell.upload_view_mut() {
                    if let Some(file) = view.remove_file(cursor) {
                        tracing::debug!("移除文件: {}", file.name);
                    }
                }
                let len = self.file_count();
                self.upload_panel.clamp(len);
                None
            }
            KeyCode::Backspace => {
                self.upload_panel.input.backspace();
                None
            }
            KeyCode::Left => {
                self.upload_panel.input.move_left();
                None
            }
            KeyCode::Right => {
                self.upload_panel.input.move_right();
                None
            }
            KeyCode::Home => {
                self.upload_panel.input.move_home();
                None
            }
            KeyCode::End => {
                self.upload_panel.input.move_end();
                None
            }
            KeyCode::Char(c) if !ctrl => {
                self.upload_panel.input.insert_char(c);
                None
            }
            _ => None,
        }
    }

    /// 聊天视图按键
    fn handle_chat_key(&mut self, key_event: KeyEvent) -> Option<Action> {
        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
        let newline = key_event
            .modifiers
            .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);

        match key_event.code {
            KeyCode::Char('t') if ctrl => self.export_action(ExportFormat::Txt),
            KeyCode::Char('p') if ctrl => self.export_action(ExportFormat::Pdf),
            KeyCode::Enter if newline => {
                self.chat_panel.input.insert_char('\n');
                None
            }
            KeyCode::Enter => {
                // 空白输入或等待回复时不发送，保留输入内容
                let ticket = self.shell.begin_chat(self.chat_panel.input.value())?;
                self.chat_panel.input.clear();
                self.chat_panel.scroll_to_bottom();
                Some(Action::Chat(ticket))
            }
            KeyCode::Up => {
                self.chat_panel.scroll_up();
                None
            }
            KeyCode::Down => {
                self.chat_panel.scroll_down();
                None
            }
            KeyCode::Backspace => {
                self.chat_panel.input.backspace();
                None
            }
            KeyCode::Left => {
                self.chat_panel.input.move_left();
                None
            }
            KeyCode::Right => {
                self.chat_panel.input.move_right();
                None
            }
            KeyCode::Home => {
                self.chat_panel.input.move_home();
                None
            }
            KeyCode::End => {
                self.chat_panel.input.move_end();
                None
            }
            KeyCode::Char(c) if !ctrl => {
                self.chat_panel.input.insert_char(c);
                None
            }
            _ => None,
        }
    }

    /// 处理粘贴事件
    ///
    /// 上传视图中把内容当作拖放的文件路径；聊天视图中插入输入框。
    fn handle_paste_event(&mut self, content: String) {
        if self.on_upload_view() {
            self.add_paths(&content);
        } else {
            self.chat_panel.input.insert_str(&content);
        }
    }

    fn add_paths(&mut self, text: &str) {
        let Some(view) = self.shell.upload_view_mut() else {
            return;
        };
        if view.is_in_flight() {
            return;
        }

        let outcome = view.add_dropped(text);
        self.upload_panel.notice = if outcome.rejected.is_empty() {
            Some(format!("Added {} file(s)", outcome.added))
        } else {
            Some(format!("Could not add: {}", outcome.rejected.join("; ")))
        };
    }

    fn export_action(&self, format: ExportFormat) -> Option<Action> {
        self.shell.exporter().map(|_| Action::Export(format))
    }

    fn on_upload_view(&self) -> bool {
        matches!(self.shell.view(), View::Upload(_))
    }

    fn file_count(&self) -> usize {
        match self.shell.view() {
            View::Upload(view) => view.files().len(),
            View::Chat(_) => 0,
        }
    }

    /// 获取外壳
    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// 获取上传面板状态
    pub fn upload_panel(&self) -> &UploadPanelState {
        &self.upload_panel
    }

    /// 获取聊天面板状态
    pub fn chat_panel(&self) -> &ChatPanelState {
        &self.chat_panel
    }

    /// 底栏提示
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// 运行 TUI 应用的便捷函数
pub async fn run_tui(shell: Shell) -> AppResult<()> {
    let mut app = TuiApp::new(shell);
    app.run().await
}
