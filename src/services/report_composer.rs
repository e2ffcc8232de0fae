//! 报告正文组装服务 - 业务能力层
//!
//! 纯格式化，不做任何 IO

use crate::models::SeverityCounts;

/// 邮件主题
pub fn subject_for(filename: &str) -> String {
    format!("Penetration Test Report Summary: {}", filename)
}

/// 洞察部分（总数 + 各等级）
pub fn insights_block(total: usize, counts: &SeverityCounts) -> String {
    let mut lines = vec![format!("Total Defects: {}", total)];
    lines.extend(counts.iter().map(|(tier, count)| format!("{}: {}", tier, count)));
    lines.join("\n")
}

/// 组装邮件正文
///
/// 自定义消息为空字符串时视为未提供
///
/// # 参数
/// - `summary`: 摘要文本
/// - `total`: 缺陷总数
/// - `counts`: 四级统计
/// - `custom_message`: 放在正文最前面的自定义消息
pub fn compose(
    summary: &str,
    total: usize,
    counts: &SeverityCounts,
    custom_message: Option<&str>,
) -> String {
    let body = format!(
        "Report Summary:\n{}\n\nInsights:\n{}",
        summary,
        insights_block(total, counts)
    );

    match custom_message {
        Some(message) if !message.is_empty() => format!("{}\n\n{}", message, body),
        _ => body,
    }
}

/// 自动生成的高/严重/中危摘要消息
pub fn priority_digest(filename: &str, total: usize, priority: &SeverityCounts) -> String {
    let mut digest = format!(
        "Automated Penetration Test Report Summary for {}:\nTotal Defects: {}\n",
        filename, total
    );
    for (tier, count) in priority.iter() {
        digest.push_str(&format!("{}: {}\n", tier, count));
    }
    digest
}
