//! 粗体标记解析
//!
//! 只处理 `**文本**`，按最短匹配配对，配对不跨行；其他内容原样保留。

/// 文本片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSegment {
    Plain(String),
    Bold(String),
}

impl TextSegment {
    pub fn text(&self) -> &str {
        match self {
            TextSegment::Plain(s) | TextSegment::Bold(s) => s,
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, TextSegment::Bold(_))
    }
}

/// 把文本拆分为普通/粗体片段
pub fn render_markdown(text: &str) -> Vec<TextSegment> {
    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        match after.find("**") {
            Some(end) if !after[..end].contains('\n') => {
                plain.push_str(&rest[..start]);
                if !plain.is_empty() {
                    segments.push(TextSegment::Plain(std::mem::take(&mut plain)));
                }
                segments.push(TextSegment::Bold(after[..end].to_string()));
                rest = &after[end + 2..];
            }
            _ => {
                // 这一对标记不成立，开头的 ** 按普通文本处理
                plain.push_str(&rest[..start + 2]);
                rest = after;
            }
        }
    }

    plain.push_str(rest);
    if !plain.is_empty() {
        segments.push(TextSegment::Plain(plain));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(s: &str) -> TextSegment {
        TextSegment::Plain(s.to_string())
    }

    fn bold(s: &str) -> TextSegment {
        TextSegment::Bold(s.to_string())
    }

    #[test]
    fn test_no_markers() {
        assert_eq!(render_markdown("hello world"), vec![plain("hello world")]);
        assert!(render_markdown("").is_empty());
    }

    #[test]
    fn test_bold_in_middle() {
        assert_eq!(
            render_markdown("Refunds within **30 days** of purchase."),
            vec![plain("Refunds within "), bold("30 days"), plain(" of purchase.")]
        );
    }

    #[test]
    fn test_shortest_match() {
        assert_eq!(
            render_markdown("**a** and **b**"),
            vec![bold("a"), plain(" and "), bold("b")]
        );
    }

    #[test]
    fn test_unclosed_marker_kept() {
        assert_eq!(render_markdown("2 ** 3"), vec![plain("2 ** 3")]);
    }

    #[test]
    fn test_marker_does_not_span_lines() {
        assert_eq!(
            render_markdown("**a\nb** **c**"),
            vec![plain("**a\nb"), bold(" "), plain("c**")]
        );
    }
}
