/// 文档中的一个段落
///
/// `heading_level` 保存段落样式名（如 `Heading 1`），
/// 只有样式名以 `Heading` 开头时才有值。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    pub heading_level: Option<String>,
}

impl Paragraph {
    /// 普通正文段落
    pub fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            heading_level: None,
        }
    }

    /// 带标题样式的段落
    pub fn heading(text: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            heading_level: Some(level.into()),
        }
    }

    /// 根据解析出的样式名构造段落
    pub fn with_style(text: impl Into<String>, style_name: Option<&str>) -> Self {
        let heading_level = style_name
            .filter(|name| name.starts_with("Heading"))
            .map(str::to_string);
        Self {
            text: text.into(),
            heading_level,
        }
    }

    pub fn is_heading(&self) -> bool {
        self.heading_level.is_some()
    }

    /// 去除首尾空白后是否为空
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_style_only_tags_headings() {
        assert!(Paragraph::with_style("Scope", Some("Heading 2")).is_heading());
        assert!(!Paragraph::with_style("Report", Some("Title")).is_heading());
        assert!(!Paragraph::with_style("text", Some("Normal")).is_heading());
        assert!(!Paragraph::with_style("text", None).is_heading());
    }

    #[test]
    fn test_blank_detection() {
        assert!(Paragraph::body("  \t ").is_blank());
        assert!(!Paragraph::body(" x ").is_blank());
    }
}
