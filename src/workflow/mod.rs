//! 流程层
//!
//! 串联 段落来源 → 摘要/统计 → 正文组装 → 邮件发送，
//! 并在对外边界把错误转换为结果字符串

pub mod report_tools;

pub use report_tools::ReportTools;
