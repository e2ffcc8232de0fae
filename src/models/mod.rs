pub mod paragraph;
pub mod severity;

pub use paragraph::Paragraph;
pub use severity::{Severity, SeverityCounts, INSIGHT_TIERS, PRIORITY_TIERS};
