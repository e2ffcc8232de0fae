//! # Doc Analyzer
//!
//! 从渗透测试报告（.docx）中提取摘要与缺陷等级统计，并可通过邮件发送
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有 IO 能力，只通过 trait 暴露
//! - `DocxReader` - 段落来源，zip + quick-xml 解码正文与样式
//! - `SmtpMailer` - 邮件发送，STARTTLS 中继
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 纯函数，不做 IO
//! - `summary_extractor` - 摘要章节状态机
//! - `severity_tally` - 等级关键字统计
//! - `report_composer` - 邮件正文组装
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - `ReportTools` 串联各能力，对外只返回字符串
//!
//! ### ④ 前端（MCP / CLI）
//! - `mcp/` + `transport/` - stdio 上的 JSON-RPC 工具服务
//! - `main.rs` - 命令行入口
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod mcp;
pub mod models;
pub mod services;
pub mod transport;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, RelayConfig};
pub use error::{AppError, AppResult};
pub use infrastructure::{DocxReader, Mailer, OutgoingMail, ParagraphSource, SmtpMailer};
pub use mcp::DocAnalyzerServer;
pub use models::{Paragraph, Severity, SeverityCounts};
pub use utils::logger;
pub use workflow::ReportTools;
