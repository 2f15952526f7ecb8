//! 聊天面板组件
//!
//! 提供聊天界面，包括消息列表和输入框。

use chrono::Local;
use doc_chat::{ChatView, Message};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use super::input::InputState;

/// 聊天面板状态
#[derive(Debug, Clone, Default)]
pub struct ChatPanelState {
    /// 输入框
    pub input: InputState,
    /// 距离底部的滚动行数，0 表示跟随最新消息
    scroll_from_bottom: u16,
}

impl ChatPanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_offset(&self) -> u16 {
        self.scroll_from_bottom
    }

    /// 向上滚动消息列表
    pub fn scroll_up(&mut self) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(1);
    }

    /// 向下滚动消息列表
    pub fn scroll_down(&mut self) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(1);
    }

    /// 滚动到底部
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_from_bottom = 0;
    }
}

/// 把一条消息转换为显示行
pub fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let (who, color) = if message.is_user() {
        ("You", Color::Cyan)
    } else {
        ("DocTalk", Color::Green)
    };
    let timestamp = message.sent_at.with_timezone(&Local).format("%H:%M").to_string();

    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{} ", timestamp), Style::default().fg(Color::DarkGray)),
        Span::styled(who, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ])];

    // 按换行拆开，片段内的换行也要断行
    let mut current: Vec<Span<'static>> = Vec::new();
    for segment in message.segments() {
        let style = if segment.is_bold() {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let mut parts = segment.text().split('\n').peekable();
        while let Some(part) = parts.next() {
            if !part.is_empty() {
                current.push(Span::styled(part.to_string(), style));
            }
            if parts.peek().is_some() {
                lines.push(Line::from(std::mem::take(&mut current)));
            }
        }
    }
    lines.push(Line::from(current));

    if let Some(sources) = message.sources_line() {
        lines.push(Line::from(Span::styled(
            sources,
            Style::default().fg(Color::Magenta).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

/// 聊天面板组件
pub struct ChatPanel<'a> {
    view: &'a ChatView,
    state: &'a ChatPanelState,
    tick: u64,
}

impl<'a> ChatPanel<'a> {
    pub fn new(view: &'a ChatView, state: &'a ChatPanelState) -> Self {
        Self { view, state, tick: 0 }
    }

    pub fn tick(mut self, tick: u64) -> Self {
        self.tick = tick;
        self
    }

    /// 渲染消息列表
    fn render_message_list(&self, area: Rect, buf: &mut Buffer) {
        let mut lines = Vec::new();
        for message in self.view.messages() {
            lines.extend(message_lines(message));
            lines.push(Line::from(""));
        }

        if self.view.is_loading() {
            let dots = ".".repeat((self.tick % 4) as usize);
            lines.push(Line::from(Span::styled(
                format!("DocTalk is thinking{}", dots),
                Style::default().fg(Color::Yellow),
            )));
        }

        // 按实际折行结果计算总行数，保证跟随最新消息
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        let total = paragraph.line_count(area.width).min(u16::MAX as usize) as u16;
        let top = total
            .saturating_sub(area.height)
            .saturating_sub(self.state.scroll_offset());

        paragraph.scroll((top, 0)).render(area, buf);
    }

    /// 渲染输入框
    fn render_input_box(&self, area: Rect, buf: &mut Buffer) {
        let title = if self.view.is_loading() {
            " Waiting for reply... "
        } else {
            " Ask a question about your documents "
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));

        let lines: Vec<Line> = self
            .state
            .input
            .value()
            .split('\n')
            .enumerate()
            .map(|(i, part)| {
                let prefix = if i == 0 { "> " } else { "  " };
                Line::from(format!("{}{}", prefix, part))
            })
            .collect();

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

impl<'a> Widget for ChatPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Chat with your documents ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue));
        let inner = block.inner(area);
        block.render(area, buf);

        let input_rows = self.state.input.value().split('\n').count().clamp(1, 5) as u16;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(input_rows + 2)])
            .split(inner);

        self.render_message_list(chunks[0], buf);
        self.render_input_box(chunks[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_chat::{ChatReply, SessionId, GREETING};

    fn is_bold_span(span: &Span) -> bool {
        span.style.add_modifier.contains(Modifier::BOLD)
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut text = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                text.push_str(buf[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn view_with_reply() -> ChatView {
        let mut view = ChatView::new(SessionId::new("abc123"));
        let turn = view.begin_send("What is the refund policy?").unwrap();
        view.complete(
            &turn,
            Ok(ChatReply::new(
                "Refunds within **30 days**",
                vec!["policy.pdf".to_string()],
            )),
        );
        view
    }

    #[test]
    fn test_scroll_operations() {
        let mut state = ChatPanelState::new();
        state.scroll_down();
        assert_eq!(state.scroll_offset(), 0); // 已在底部
        state.scroll_up();
        state.scroll_up();
        assert_eq!(state.scroll_offset(), 2);
        state.scroll_to_bottom();
        assert_eq!(state.scroll_offset(), 0);
    }

    #[test]
    fn test_message_lines_bold_and_sources() {
        let view = view_with_reply();
        let lines = message_lines(&view.messages()[2]);

        assert_eq!(lines.len(), 3);
        let body = &lines[1].spans;
        assert_eq!(body[0].content, "Refunds within ");
        assert!(!is_bold_span(&body[0]));
        assert_eq!(body[1].content, "30 days");
        assert!(is_bold_span(&body[1]));
        assert_eq!(lines[2].spans[0].content, "Sources: policy.pdf");
    }

    #[test]
    fn test_message_lines_split_newlines() {
        let view = ChatView::new(SessionId::new("s"));
        let mut message = view.messages()[0].clone();
        message.text = "line one\nline two".to_string();

        let lines = message_lines(&message);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].spans[0].content, "line one");
        assert_eq!(lines[2].spans[0].content, "line two");
    }

    #[test]
    fn test_renders_transcript_and_input() {
        let view = view_with_reply();
        let mut state = ChatPanelState::new();
        state.input.insert_str("next question");

        let area = Rect::new(0, 0, 90, 20);
        let mut buf = Buffer::empty(area);
        ChatPanel::new(&view, &state).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains(GREETING));
        assert!(text.contains("What is the refund policy?"));
        assert!(text.contains("Sources: policy.pdf"));
        assert!(text.contains("> next question"));
    }

    #[test]
    fn test_long_reply_tail_visible_at_bottom() {
        let mut view = ChatView::new(SessionId::new("abc123"));
        let turn = view.begin_send("summarize").unwrap();
        let reply = format!("{}ENDMARK", "abcdefghijklm ".repeat(40));
        view.complete(&turn, Ok(ChatReply::new(reply, Vec::new())));
        let state = ChatPanelState::new();

        // 窄区域下按单词折行会比按字符宽度估算多占行
        let area = Rect::new(0, 0, 24, 14);
        let mut buf = Buffer::empty(area);
        ChatPanel::new(&view, &state).render(area, &mut buf);

        assert!(buffer_text(&buf).contains("ENDMARK"));
    }

    #[test]
    fn test_scrolled_up_hides_tail() {
        let mut view = ChatView::new(SessionId::new("abc123"));
        let turn = view.begin_send("summarize").unwrap();
        let reply = format!("{}ENDMARK", "abcdefghijklm ".repeat(40));
        view.complete(&turn, Ok(ChatReply::new(reply, Vec::new())));
        let mut state = ChatPanelState::new();
        for _ in 0..10 {
            state.scroll_up();
        }

        let area = Rect::new(0, 0, 24, 14);
        let mut buf = Buffer::empty(area);
        ChatPanel::new(&view, &state).render(area, &mut buf);

        assert!(!buffer_text(&buf).contains("ENDMARK"));
    }

    #[test]
    fn test_loading_indicator() {
        let mut view = ChatView::new(SessionId::new("abc123"));
        view.begin_send("hello").unwrap();
        let state = ChatPanelState::new();

        let area = Rect::new(0, 0, 90, 16);
        let mut buf = Buffer::empty(area);
        ChatPanel::new(&view, &state).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("DocTalk is thinking"));
        assert!(text.contains("Waiting for reply"));
    }
}
