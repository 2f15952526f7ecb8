//! 上传面板组件
//!
//! 显示待上传文件列表、错误提示和路径输入框。

use doc_chat::UploadView;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget, Wrap},
};

use super::input::InputState;

/// 上传面板状态
#[derive(Debug, Clone, Default)]
pub struct UploadPanelState {
    /// 路径输入框
    pub input: InputState,
    /// 文件列表光标
    pub cursor: usize,
    /// 最近一次添加文件的提示
    pub notice: Option<String>,
}

impl UploadPanelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 移动光标向上
    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// 移动光标向下
    pub fn move_down(&mut self, len: usize) {
        if len > 0 && self.cursor < len - 1 {
            self.cursor += 1;
        }
    }

    /// 列表变化后把光标限制在范围内
    pub fn clamp(&mut self, len: usize) {
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }
}

/// 上传面板组件
pub struct UploadPanel<'a> {
    view: &'a UploadView,
    state: &'a UploadPanelState,
    /// 用于等待动画的刷新计数
    tick: u64,
}

impl<'a> UploadPanel<'a> {
    pub fn new(view: &'a UploadView, state: &'a UploadPanelState) -> Self {
        Self { view, state, tick: 0 }
    }

    pub fn tick(mut self, tick: u64) -> Self {
        self.tick = tick;
        self
    }

    fn render_file_list(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" Selected Files ({}) ", self.view.files().len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        if self.view.files().is_empty() {
            let hint = vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Drag files onto the terminal or type a path below",
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "PDF, DOCX, TXT, PNG, JPG",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            Paragraph::new(hint)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .render(area, buf);
            return;
        }

        let items: Vec<ListItem> = self
            .view
            .files()
            .iter()
            .enumerate()
            .map(|(i, file)| {
                let is_cursor = i == self.state.cursor;
                let marker = if is_cursor { "> " } else { "  " };
                let name_style = if is_cursor {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };

                ListItem::new(Line::from(vec![
                    Span::raw(marker),
                    Span::styled(
                        format!("[{}] ", file.extension_label()),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::styled(file.name.clone(), name_style),
                    Span::styled(
                        format!("  {}", file.size_label()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        // 选中项决定滚动偏移，光标始终可见
        let mut list_state = ListState::default().with_selected(Some(self.state.cursor));
        StatefulWidget::render(List::new(items).block(block), area, buf, &mut list_state);
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        let line = if self.view.is_in_flight() {
            let dots = ".".repeat((self.tick % 4) as usize);
            Line::from(Span::styled(
                format!("Processing documents{}", dots),
                Style::default().fg(Color::Yellow),
            ))
        } else if let Some(error) = self.view.error() {
            Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ))
        } else if let Some(notice) = &self.state.notice {
            Line::from(Span::styled(notice.clone(), Style::default().fg(Color::Gray)))
        } else if self.view.can_submit() {
            Line::from(Span::styled(
                "Press Ctrl+U to upload and process",
                Style::default().fg(Color::Green),
            ))
        } else {
            Line::from("")
        };

        Paragraph::new(line).wrap(Wrap { trim: true }).render(area, buf);
    }

    fn render_input(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Add file ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));

        Paragraph::new(format!("> {}", self.state.input.value()))
            .block(block)
            .render(area, buf);
    }
}

impl<'a> Widget for UploadPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Upload Your Documents ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue));
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // 文件列表
                Constraint::Length(2), // 状态行
                Constraint::Length(3), // 输入框
            ])
            .split(inner);

        self.render_file_list(chunks[0], buf);
        self.render_status(chunks[1], buf);
        self.render_input(chunks[2], buf);
    }
}
