//! 摘要提取服务 - 业务能力层
//!
//! 只负责"从段落序列中找出摘要章节"能力，不关心文档从哪里来

use crate::models::Paragraph;
use tracing::debug;

/// 可识别的摘要章节名（忽略大小写的子串匹配）
pub const SUMMARY_SECTIONS: &[&str] = &[
    "Executive Summary",
    "Summary of Findings",
    "Conclusion",
    "Summary",
];

/// 未找到摘要时的前缀
pub const NO_SUMMARY_MARKER: &str = "No summary section found. Preview:\n";

/// 兜底预览的段落数
pub const PREVIEW_PARAGRAPHS: usize = 3;

/// 扫描状态
#[derive(Debug)]
enum SectionMatch {
    /// 尚未遇到摘要标题
    Idle,
    /// 正在收集摘要标题之后的段落
    Capturing { captured: Vec<String> },
}

/// 单个段落处理后的动作
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Stop,
}

impl SectionMatch {
    fn feed(&mut self, paragraph: &Paragraph) -> Step {
        if is_summary_heading(&paragraph.text) {
            // 标题本身不计入，已收集的内容保留
            let captured = match std::mem::replace(self, SectionMatch::Idle) {
                SectionMatch::Idle => Vec::new(),
                SectionMatch::Capturing { captured } => captured,
            };
            *self = SectionMatch::Capturing { captured };
            return Step::Continue;
        }

        match self {
            SectionMatch::Idle => Step::Continue,
            SectionMatch::Capturing { captured } => {
                if paragraph.is_heading() && !captured.is_empty() {
                    return Step::Stop;
                }
                if !paragraph.is_blank() {
                    captured.push(paragraph.text.clone());
                }
                Step::Continue
            }
        }
    }

    fn into_captured(self) -> Vec<String> {
        match self {
            SectionMatch::Idle => Vec::new(),
            SectionMatch::Capturing { captured } => captured,
        }
    }
}

/// 段落文本是否包含任一摘要章节名
pub fn is_summary_heading(text: &str) -> bool {
    let lower = text.to_lowercase();
    SUMMARY_SECTIONS
        .iter()
        .any(|section| lower.contains(&section.to_lowercase()))
}

/// 提取摘要
///
/// 找到摘要标题后收集其后的非空段落，直到遇到下一个标题（且已收集到内容）。
/// 找不到时返回前 3 个非空段落的预览。
pub fn extract(paragraphs: &[Paragraph]) -> String {
    let mut state = SectionMatch::Idle;

    for paragraph in paragraphs {
        if state.feed(paragraph) == Step::Stop {
            break;
        }
    }

    let captured = state.into_captured();
    if !captured.is_empty() {
        debug!("找到摘要章节，共 {} 段", captured.len());
        return captured.join("\n");
    }

    debug!("未找到摘要章节，使用前 {} 段作为预览", PREVIEW_PARAGRAPHS);
    format!("{}{}", NO_SUMMARY_MARKER, preview(paragraphs).join("\n"))
}

/// 前 N 个非空段落
fn preview(paragraphs: &[Paragraph]) -> Vec<&str> {
    paragraphs
        .iter()
        .filter(|p| !p.is_blank())
        .take(PREVIEW_PARAGRAPHS)
        .map(|p| p.text.as_str())
        .collect()
}
