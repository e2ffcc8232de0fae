//! 报告工具 - 流程层
//!
//! 对外暴露的全部操作都在这里：读取、摘要、统计、组装并发送。
//! 每个操作只返回字符串，内部错误在这一层转换为描述文本，不向外传播。

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{Config, RelayConfig};
use crate::error::{AppError, AppResult};
use crate::infrastructure::{read_text, DocxReader, Mailer, OutgoingMail, ParagraphSource, SmtpMailer};
use crate::models::{Paragraph, INSIGHT_TIERS, PRIORITY_TIERS};
use crate::services::report_composer::{self, compose, subject_for};
use crate::services::severity_tally::{insight_counts, tally_or_zero};
use crate::services::summary_extractor::extract;
use crate::utils::logger::truncate_text;

/// 报告工具集
///
/// 职责：
/// - 把文件名解析到报告目录
/// - 串联 段落来源 → 摘要/统计 → 正文组装 → 邮件发送
/// - 把所有失败转换成可读的结果字符串
#[derive(Clone)]
pub struct ReportTools {
    reports_dir: PathBuf,
    default_relay: RelayConfig,
    source: Arc<dyn ParagraphSource>,
    mailer: Arc<dyn Mailer>,
}

impl ReportTools {
    /// 使用 DOCX 读取器与 SMTP 发送器创建
    pub fn new(config: &Config) -> Self {
        Self::with_parts(config, Arc::new(DocxReader), Arc::new(SmtpMailer))
    }

    /// 使用自定义的段落来源与发送器创建
    pub fn with_parts(
        config: &Config,
        source: Arc<dyn ParagraphSource>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            reports_dir: config.reports_dir.clone(),
            default_relay: config.smtp.clone(),
            source,
            mailer,
        }
    }

    /// 配置中的默认中继
    pub fn default_relay(&self) -> &RelayConfig {
        &self.default_relay
    }

    fn path_of(&self, filename: &str) -> PathBuf {
        self.reports_dir.join(filename)
    }

    fn load(&self, filename: &str) -> AppResult<Vec<Paragraph>> {
        self.source.load(&self.path_of(filename))
    }

    /// 读取纯文本报告
    pub fn read_text(&self, filename: &str) -> String {
        info!("📄 读取文本报告: {}", filename);
        read_text(&self.path_of(filename)).unwrap_or_else(|e| describe_failure(filename, &e))
    }

    /// 读取 DOCX 报告的全部段落文本
    pub fn read_document(&self, filename: &str) -> String {
        info!("📄 读取文档报告: {}", filename);
        match self.load(filename) {
            Ok(paragraphs) => paragraphs
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => describe_failure(filename, &e),
        }
    }

    /// 生成报告摘要
    pub fn summarize(&self, filename: &str) -> String {
        info!("📝 生成报告摘要: {}", filename);
        match self.load(filename) {
            Ok(paragraphs) => extract(&paragraphs),
            Err(e) => describe_failure(filename, &e),
        }
    }

    /// 缺陷总数与四级分布
    pub fn insights(&self, filename: &str) -> String {
        info!("📊 统计缺陷等级: {}", filename);
        match self.load(filename) {
            Ok(paragraphs) => {
                let counts = insight_counts(&paragraphs);
                format!(
                    "Insights:\n{}",
                    report_composer::insights_block(counts.total(), &counts)
                )
            }
            Err(e) => describe_failure(filename, &e),
        }
    }

    /// 基于三级统计的自动消息
    ///
    /// 文档读取失败时按全 0 统计
    pub fn priority_digest(&self, filename: &str) -> String {
        let loaded = self.load(filename);
        let total = tally_or_zero(&loaded, INSIGHT_TIERS).total();
        let priority = tally_or_zero(&loaded, PRIORITY_TIERS);
        report_composer::priority_digest(filename, total, &priority)
    }

    /// 组装摘要与统计并发送邮件
    ///
    /// 文档只读取一次；读取失败时摘要为失败描述、统计全为 0，邮件照常发送
    ///
    /// # 参数
    /// - `recipient`: 收件人
    /// - `filename`: 报告目录中的 DOCX 文件名
    /// - `relay`: SMTP 中继配置
    /// - `custom_message`: 可选的正文前缀
    ///
    /// # 返回
    /// `Email sent to ...` 或 `Failed to send email: ...`
    pub fn compose_and_send(
        &self,
        recipient: &str,
        filename: &str,
        relay: &RelayConfig,
        custom_message: Option<&str>,
    ) -> String {
        info!("📨 准备发送报告摘要: {} → {}", filename, recipient);

        if let Err(e) = relay.credentials() {
            warn!("⚠️ SMTP 凭据缺失，拒绝发送");
            return send_failure(&AppError::from(e));
        }

        let loaded = self.load(filename);
        let summary = match &loaded {
            Ok(paragraphs) => extract(paragraphs),
            Err(e) => describe_failure(filename, e),
        };
        let counts = tally_or_zero(&loaded, INSIGHT_TIERS);
        let body = compose(&summary, counts.total(), &counts, custom_message);

        self.deliver(&OutgoingMail::new(recipient, subject_for(filename), body), relay)
    }

    /// 直接发送任意邮件
    pub fn send_raw(&self, recipient: &str, subject: &str, body: &str, relay: &RelayConfig) -> String {
        info!("📨 发送邮件: {}", recipient);
        if let Err(e) = relay.credentials() {
            warn!("⚠️ SMTP 凭据缺失，拒绝发送");
            return send_failure(&AppError::from(e));
        }
        self.deliver(&OutgoingMail::new(recipient, subject, body), relay)
    }

    fn deliver(&self, mail: &OutgoingMail, relay: &RelayConfig) -> String {
        debug!("邮件主题: {} | 正文: {}", mail.subject, truncate_text(&mail.body, 80));
        match self.mailer.send(mail, relay) {
            Ok(()) => format!("Email sent to {} successfully.", mail.recipient),
            Err(e) => {
                warn!("❌ 邮件发送失败: {}", e);
                send_failure(&e)
            }
        }
    }
}

fn describe_failure(filename: &str, err: &AppError) -> String {
    if err.is_not_found() {
        format!("Error: File '{}' not found.", filename)
    } else {
        format!("An error occurred: {}", err)
    }
}

fn send_failure(err: &AppError) -> String {
    format!("Failed to send email: {}", err)
}
