/// 漏洞严重等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// 严重
    Critical,
    /// 高危
    High,
    /// 中危
    Medium,
    /// 低危
    Low,
    /// 信息
    Informational,
}

/// 报告洞察使用的四级统计
pub const INSIGHT_TIERS: &[Severity] = &[
    Severity::Critical,
    Severity::Medium,
    Severity::Low,
    Severity::Informational,
];

/// 高/严重/中危三级统计
pub const PRIORITY_TIERS: &[Severity] = &[Severity::Critical, Severity::High, Severity::Medium];

impl Severity {
    /// 获取报告中使用的关键字
    pub fn name(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Informational => "Informational",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 各等级的计数，保持声明顺序且包含全部等级
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityCounts {
    entries: Vec<(Severity, usize)>,
}

impl SeverityCounts {
    /// 所有等级计数为 0
    pub fn zeroed(tiers: &[Severity]) -> Self {
        let mut entries: Vec<(Severity, usize)> = Vec::with_capacity(tiers.len());
        for &tier in tiers {
            if !entries.iter().any(|(t, _)| *t == tier) {
                entries.push((tier, 0));
            }
        }
        Self { entries }
    }

    pub(crate) fn increment(&mut self, tier: Severity) {
        if let Some((_, count)) = self.entries.iter_mut().find(|(t, _)| *t == tier) {
            *count += 1;
        }
    }

    /// 获取某个等级的计数，不在统计范围内时返回 None
    pub fn get(&self, tier: Severity) -> Option<usize> {
        self.entries
            .iter()
            .find(|(t, _)| *t == tier)
            .map(|(_, count)| *count)
    }

    /// 本次统计的总数
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// 按声明顺序遍历 (等级, 计数)
    pub fn iter(&self) -> impl Iterator<Item = (Severity, usize)> + '_ {
        self.entries.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_keeps_declared_order() {
        let counts = SeverityCounts::zeroed(INSIGHT_TIERS);
        let tiers: Vec<_> = counts.iter().map(|(tier, _)| tier).collect();
        assert_eq!(tiers, INSIGHT_TIERS.to_vec());
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_get_outside_tier_set() {
        let counts = SeverityCounts::zeroed(INSIGHT_TIERS);
        assert_eq!(counts.get(Severity::High), None);
        assert_eq!(counts.get(Severity::Low), Some(0));
    }
}
