pub mod report_composer;
pub mod severity_tally;
pub mod summary_extractor;

pub use report_composer::compose;
pub use severity_tally::{insight_counts, mentions, priority_counts, tally};
pub use summary_extractor::extract;
