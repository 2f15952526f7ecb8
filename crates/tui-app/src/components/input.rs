//! 单行/多行输入框状态
//!
//! 光标按字符计数，可以安全处理中文等多字节字符。

#[derive(Debug, Clone, Default)]
pub struct InputState {
    buffer: String,
    /// 光标位置（字符下标）
    cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前内容
    pub fn value(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.buffer.len())
    }

    fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }

    /// 在光标处插入字符
    pub fn insert_char(&mut self, c: char) {
        let idx = self.byte_index(self.cursor);
        self.buffer.insert(idx, c);
        self.cursor += 1;
    }

    /// 在光标处插入字符串
    pub fn insert_str(&mut self, s: &str) {
        let idx = self.byte_index(self.cursor);
        self.buffer.insert_str(idx, s);
        self.cursor += s.chars().count();
    }

    /// 删除光标前一个字符
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let idx = self.byte_index(self.cursor - 1);
            self.buffer.remove(idx);
            self.cursor -= 1;
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// 取出内容并清空
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_backspace() {
        let mut input = InputState::new();
        input.insert_char('H');
        input.insert_char('i');
        assert_eq!(input.value(), "Hi");
        assert_eq!(input.cursor(), 2);

        input.backspace();
        assert_eq!(input.value(), "H");
        assert_eq!(input.cursor(), 1);
    }

    #[test]
    fn test_multibyte_cursor() {
        let mut input = InputState::new();
        input.insert_str("退款政策");
        input.move_left();
        input.move_left();
        input.insert_char('的');
        assert_eq!(input.value(), "退款的政策");

        input.move_end();
        input.backspace();
        assert_eq!(input.value(), "退款的政");
    }

    #[test]
    fn test_cursor_bounds() {
        let mut input = InputState::new();
        input.move_left();
        input.backspace();
        assert_eq!(input.cursor(), 0);

        input.insert_str("ABC");
        input.move_right();
        assert_eq!(input.cursor(), 3);

        input.move_home();
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_take_clears() {
        let mut input = InputState::new();
        input.insert_str("hello");
        assert_eq!(input.take(), "hello");
        assert!(input.is_empty());
        assert_eq!(input.cursor(), 0);
    }
}
