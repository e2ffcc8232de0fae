//! 基础设施层
//!
//! 持有 IO 能力：读取文档、投递邮件。上层只通过 trait 使用。

pub mod docx_reader;
pub mod smtp_mailer;

pub use docx_reader::{read_text, DocxReader, ParagraphSource};
pub use smtp_mailer::{Mailer, OutgoingMail, SmtpMailer};
