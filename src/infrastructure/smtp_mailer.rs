//! SMTP 邮件发送器 - 基础设施层
//!
//! 持有"把一封邮件交给中继"的能力，不关心邮件内容从哪里来

use crate::config::RelayConfig;
use crate::error::{AppError, AppResult};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, info};

/// 待发送的邮件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    pub fn new(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// 邮件发送能力
pub trait Mailer: Send + Sync {
    fn send(&self, mail: &OutgoingMail, relay: &RelayConfig) -> AppResult<()>;
}

/// 校验收件人地址
pub fn validate_recipient(address: &str) -> AppResult<()> {
    address
        .trim()
        .parse::<email_address::EmailAddress>()
        .map(|_| ())
        .map_err(|e| AppError::invalid_address(address, e))
}

/// 基于 lettre 的 STARTTLS 发送器（阻塞调用）
#[derive(Debug, Default, Clone, Copy)]
pub struct SmtpMailer;

impl SmtpMailer {
    fn build_message(mail: &OutgoingMail, from: &str) -> AppResult<Message> {
        let from: Mailbox = from
            .parse()
            .map_err(|e| AppError::invalid_address(from, e))?;
        let to: Mailbox = mail
            .recipient
            .trim()
            .parse()
            .map_err(|e| AppError::invalid_address(&mail.recipient, e))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone())
            .map_err(|e| AppError::transport_failed("message-builder", e))
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, mail: &OutgoingMail, relay: &RelayConfig) -> AppResult<()> {
        let (user, password) = relay.credentials()?;
        validate_recipient(&mail.recipient)?;

        let message = Self::build_message(mail, user.trim())?;
        let endpoint = format!("{}:{}", relay.server, relay.port);

        debug!("连接 SMTP 中继: {}", endpoint);
        let transport = SmtpTransport::starttls_relay(&relay.server)
            .map_err(|e| AppError::transport_failed(&endpoint, e))?
            .port(relay.port)
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();

        transport
            .send(&message)
            .map_err(|e| AppError::transport_failed(&endpoint, e))?;

        info!("📧 邮件已发送至 {}", mail.recipient);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MailError;

    #[test]
    fn test_missing_credentials_rejected_before_connect() {
        let relay = RelayConfig {
            server: "127.0.0.1".to_string(),
            port: 1,
            user: String::new(),
            password: String::new(),
        };
        let mail = OutgoingMail::new("sec@example.com", "s", "b");
        let err = SmtpMailer.send(&mail, &relay).unwrap_err();
        assert!(matches!(err, AppError::Mail(MailError::InvalidCredentials)));
    }

    #[test]
    fn test_bad_recipient_rejected() {
        assert!(validate_recipient("sec@example.com").is_ok());
        assert!(matches!(
            validate_recipient("not an address"),
            Err(AppError::Mail(MailError::InvalidAddress { .. }))
        ));
    }

    #[test]
    fn test_build_message_sets_headers() {
        let mail = OutgoingMail::new("sec@example.com", "Penetration Test Report Summary: a.docx", "body");
        let message = SmtpMailer::build_message(&mail, "scanner@example.com").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: sec@example.com"));
        assert!(raw.contains("From: scanner@example.com"));
        assert!(raw.contains("Subject: Penetration Test Report Summary: a.docx"));
    }
}
