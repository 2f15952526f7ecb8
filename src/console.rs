//! 控制台模式
//!
//! 逐行读取标准输入：以 `/` 开头的是命令，聊天视图中的其他内容作为消息发送，
//! 上传视图中的其他内容当作拖放进来的文件路径。

use crossterm::style::Stylize;
use doc_chat::{ExportFormat, Message, Shell, View, UPLOAD_FAILED_BANNER};
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  /add <path>...     add files to the upload batch (quotes for spaces)
  /remove <n>        remove file number n from the batch
  /files             list the upload batch
  /upload            upload and process the batch
  /export txt|pdf    save the chat history to the download directory
  /new               forget the current session and start over
  /health            check the backend
  /help              show this help
  /quit              exit
Any other line is sent as a chat message once documents are uploaded.";

/// 控制台命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Add(String),
    Remove(Option<usize>),
    Files,
    Upload,
    Export(String),
    New,
    Health,
    Help,
    Quit,
    Unknown(String),
    Text(String),
}

/// 解析一行输入
pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }
    if !trimmed.starts_with('/') {
        return Command::Text(line.to_string());
    }

    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };

    match name {
        "/add" => Command::Add(rest.to_string()),
        "/remove" | "/rm" => Command::Remove(rest.parse().ok()),
        "/files" | "/ls" => Command::Files,
        "/upload" => Command::Upload,
        "/export" => Command::Export(rest.to_string()),
        "/new" => Command::New,
        "/health" => Command::Health,
        "/help" | "/?" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

/// 控制台会话
pub struct Console<W: Write> {
    shell: Shell,
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(shell: Shell, out: W) -> Self {
        Self { shell, out }
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// 启动提示
    pub fn banner(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "DocTalk".cyan().bold())?;
        writeln!(self.out, "Type /help for commands.")?;
        self.print_view_intro()
    }

    fn print_view_intro(&mut self) -> io::Result<()> {
        let intro = match self.shell.view() {
            View::Upload(_) => None,
            View::Chat(view) => view.messages().first().cloned(),
        };
        match intro {
            Some(greeting) => {
                if let Some(id) = self.shell.session_id() {
                    writeln!(self.out, "Session: {}", id)?;
                }
                self.print_message(&greeting)
            }
            None => writeln!(
                self.out,
                "Upload your documents: /add <path>... then /upload (PDF, DOCX, TXT, PNG, JPG)"
            ),
        }
    }

    fn print_message(&mut self, message: &Message) -> io::Result<()> {
        let time = message.sent_at.with_timezone(&chrono::Local).format("%H:%M");
        let who = if message.is_user() { "You".cyan() } else { "DocTalk".green() };
        write!(self.out, "[{}] {}: ", time, who.bold())?;

        for segment in message.segments() {
            if segment.is_bold() {
                write!(self.out, "{}", segment.text().bold())?;
            } else {
                write!(self.out, "{}", segment.text())?;
            }
        }
        writeln!(self.out)?;

        if let Some(sources) = message.sources_line() {
            writeln!(self.out, "{}", sources.magenta())?;
        }
        Ok(())
    }

    /// 处理一行输入，返回 false 表示退出
    pub async fn handle_line(&mut self, line: &str) -> io::Result<bool> {
        match parse_command(line) {
            Command::Empty => {}
            Command::Quit => return Ok(false),
            Command::Help => writeln!(self.out, "{}", HELP)?,
            Command::Add(paths) => self.add_paths(&paths)?,
            Command::Remove(index) => self.remove_file(index)?,
            Command::Files => self.list_files()?,
            Command::Upload => self.upload().await?,
            Command::Export(format) => self.export(&format).await?,
            Command::New => {
                self.shell.new_session();
                writeln!(self.out, "Started a new session.")?;
                self.print_view_intro()?;
            }
            Command::Health => self.health().await?,
            Command::Unknown(name) => {
                writeln!(self.out, "Unknown command {}. Type /help for commands.", name)?
            }
            Command::Text(text) => {
                if matches!(self.shell.view(), View::Upload(_)) {
                    self.add_paths(&text)?;
                } else {
                    self.chat(&text).await?;
                }
            }
        }
        Ok(true)
    }

    fn add_paths(&mut self, text: &str) -> io::Result<()> {
        let Some(view) = self.shell.upload_view_mut() else {
            return writeln!(self.out, "Documents are already uploaded. Use /new to start over.");
        };
        if text.trim().is_empty() {
            return writeln!(self.out, "Usage: /add <path>...");
        }

        let outcome = view.add_dropped(text);
        for reason in &outcome.rejected {
            writeln!(self.out, "{} {}", "skipped:".yellow(), reason)?;
        }
        writeln!(self.out, "Added {} file(s).", outcome.added)?;
        self.list_files()
    }

    fn remove_file(&mut self, index: Option<usize>) -> io::Result<()> {
        let Some(view) = self.shell.upload_view_mut() else {
            return writeln!(self.out, "No upload in progress.");
        };
        let removed = index
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| view.remove_file(i));

        match removed {
            Some(file) => writeln!(self.out, "Removed {}.", file.name),
            None => writeln!(self.out, "Usage: /remove <n> (see /files)"),
        }
    }

    fn list_files(&mut self) -> io::Result<()> {
        let files = match self.shell.view() {
            View::Upload(view) => view.files().to_vec(),
            View::Chat(_) => return writeln!(self.out, "No upload in progress."),
        };

        if files.is_empty() {
            return writeln!(self.out, "No files selected.");
        }
        writeln!(self.out, "Selected Files ({}):", files.len())?;
        for (i, file) in files.iter().enumerate() {
            writeln!(
                self.out,
                "  {}. [{}] {}  {}",
                i + 1,
                file.extension_label(),
                file.name,
                file.size_label()
            )?;
        }
        Ok(())
    }

    async fn upload(&mut self) -> io::Result<()> {
        match self.shell.view() {
            View::Chat(_) => {
                return writeln!(self.out, "Documents are already uploaded. Use /new to start over.")
            }
            View::Upload(view) if !view.can_submit() => {
                return writeln!(self.out, "No files selected. Use /add <path> first.")
            }
            View::Upload(_) => {}
        }

        writeln!(self.out, "Processing documents...")?;
        self.out.flush()?;

        if self.shell.submit_upload().await.is_some() {
            self.print_view_intro()
        } else {
            let banner = match self.shell.view() {
                View::Upload(view) => view.error().unwrap_or(UPLOAD_FAILED_BANNER).to_string(),
                View::Chat(_) => UPLOAD_FAILED_BANNER.to_string(),
            };
            writeln!(self.out, "{}", banner.red())
        }
    }

    async fn chat(&mut self, text: &str) -> io::Result<()> {
        if self.shell.send_chat(text).await.is_none() {
            return Ok(());
        }
        let reply = self
            .shell
            .chat_view()
            .and_then(|view| view.messages().last().cloned());
        if let Some(reply) = reply {
            self.print_message(&reply)?;
        }
        Ok(())
    }

    async fn export(&mut self, format: &str) -> io::Result<()> {
        let format = match format.parse::<ExportFormat>() {
            Ok(format) => format,
            Err(_) => {
                return writeln!(self.out, "Unsupported format {:?}. Use /export txt or /export pdf.", format)
            }
        };
        if self.shell.exporter().is_none() {
            return writeln!(self.out, "No active session. Upload documents first.");
        }

        // 失败只写日志，不提示
        if let Some(path) = self.shell.export(format).await {
            writeln!(self.out, "Saved {}", path.display())?;
        }
        Ok(())
    }

    async fn health(&mut self) -> io::Result<()> {
        match self.shell.api().health().await {
            Ok(status) => writeln!(self.out, "Backend: {}", status.summary()),
            Err(e) => {
                tracing::warn!("健康检查失败: {}", e);
                writeln!(self.out, "Backend unreachable.")
            }
        }
    }
}

fn prompt(shell: &Shell) -> &'static str {
    match shell.view() {
        View::Upload(_) => "upload> ",
        View::Chat(_) => "you> ",
    }
}

/// 运行控制台模式
pub async fn run_console(shell: Shell) -> Result<(), Box<dyn std::error::Error>> {
    let mut console = Console::new(shell, io::stdout());
    console.banner()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", prompt(console.shell()));
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if !console.handle_line(&line).await? {
            break;
        }
    }

    tracing::info!("控制台会话结束");
    Ok(())
}
