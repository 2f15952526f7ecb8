//! UI 渲染模块
//!
//! 负责整个应用的 UI 渲染。

use crate::components::{ChatPanel, UploadPanel};
use crate::TuiApp;
use doc_chat::View;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// 绘制 UI
pub fn draw_ui(f: &mut Frame, app: &TuiApp) {
    // 获取整个区域
    let size = f.area();

    // 主布局：垂直分割（header, body, footer）
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body (flexible)
            Constraint::Length(1), // Footer
        ])
        .split(size);

    draw_header(f, main_chunks[0], app);
    draw_body(f, main_chunks[1], app);
    draw_footer(f, main_chunks[2], app);
}

/// 绘制 Header
fn draw_header(f: &mut Frame, area: Rect, app: &TuiApp) {
    let mut spans = vec![Span::styled(
        "DocTalk",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];

    match app.shell().session_id() {
        Some(id) => {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                format!("Session: {}", id),
                Style::default().fg(Color::Green),
            ));
        }
        None => {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                "No active session",
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    // 只有挂载聊天视图时才有导出操作
    if app.shell().exporter().is_some() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            "Export: [Ctrl+T] TXT [Ctrl+P] PDF",
            Style::default().fg(Color::Yellow),
        ));
    }

    let header = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .alignment(Alignment::Left);

    f.render_widget(header, area);
}

/// 绘制 Body：上传面板或聊天面板
fn draw_body(f: &mut Frame, area: Rect, app: &TuiApp) {
    match app.shell().view() {
        View::Upload(view) => {
            let panel = UploadPanel::new(view, app.upload_panel()).tick(app.tick());
            f.render_widget(panel, area);
        }
        View::Chat(view) => {
            let panel = ChatPanel::new(view, app.chat_panel()).tick(app.tick());
            f.render_widget(panel, area);
        }
    }
}

/// 绘制 Footer
fn draw_footer(f: &mut Frame, area: Rect, app: &TuiApp) {
    let help_keys = match app.shell().view() {
        View::Upload(_) => "[Enter] Add path [↑↓] Select [Del] Remove [Ctrl+U] Upload",
        View::Chat(_) => "[Enter] Send [Alt+Enter] Newline [↑↓] Scroll",
    };
    let help_text = match app.status() {
        Some(status) => format!("{} | {} | [Ctrl+N] New session [Ctrl+Q] Quit", status, help_keys),
        None => format!("{} | [Ctrl+N] New session [Ctrl+Q] Quit", help_keys),
    };

    let footer = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);

    f.render_widget(footer, area);
}
