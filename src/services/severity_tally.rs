//! 严重等级统计服务 - 业务能力层
//!
//! 统计每个等级关键字出现在多少个段落中。
//! 四级统计与三级统计是两次独立扫描，重叠等级的结果可能不同。

use crate::error::AppResult;
use crate::models::{Paragraph, Severity, SeverityCounts, INSIGHT_TIERS, PRIORITY_TIERS};
use tracing::warn;

/// 段落文本是否提到某个等级（忽略大小写的子串匹配）
pub fn mentions(text: &str, tier: Severity) -> bool {
    text.to_lowercase().contains(&tier.name().to_lowercase())
}

/// 按给定等级集合统计
///
/// 每个段落对每个等级最多计 1 次
pub fn tally(paragraphs: &[Paragraph], tiers: &[Severity]) -> SeverityCounts {
    let mut counts = SeverityCounts::zeroed(tiers);
    for paragraph in paragraphs {
        for &tier in tiers {
            if mentions(&paragraph.text, tier) {
                counts.increment(tier);
            }
        }
    }
    counts
}

/// 四级统计（Critical / Medium / Low / Informational）
pub fn insight_counts(paragraphs: &[Paragraph]) -> SeverityCounts {
    tally(paragraphs, INSIGHT_TIERS)
}

/// 三级统计（Critical / High / Medium）
pub fn priority_counts(paragraphs: &[Paragraph]) -> SeverityCounts {
    tally(paragraphs, PRIORITY_TIERS)
}

/// 对加载结果进行统计
///
/// # 参数
/// - `loaded`: 文档加载结果
/// - `tiers`: 要统计的等级集合
///
/// # 返回
/// 加载失败时记录警告，所有等级计 0
pub fn tally_or_zero(loaded: &AppResult<Vec<Paragraph>>, tiers: &[Severity]) -> SeverityCounts {
    match loaded {
        Ok(paragraphs) => tally(paragraphs, tiers),
        Err(e) => {
            warn!("⚠️ 文档无法读取，统计结果按 0 处理: {}", e);
            SeverityCounts::zeroed(tiers)
        }
    }
}
