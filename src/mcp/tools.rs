//! MCP 工具定义与处理

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::protocol::{Tool, ToolResultContent};
use crate::config::RelayConfig;
use crate::workflow::ReportTools;

/// 工具调用错误（只覆盖调用层面，业务失败以文本结果返回）
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("未知工具: {0}")]
    UnknownTool(String),
    #[error("参数错误: {0}")]
    InvalidArgument(String),
    #[error("工具执行中断: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Deserialize)]
struct FileArgs {
    filename: String,
}

/// 覆盖默认中继的可选参数
#[derive(Debug, Default, Deserialize)]
struct RelayArgs {
    smtp_server: Option<String>,
    smtp_port: Option<u16>,
    smtp_user: Option<String>,
    smtp_password: Option<String>,
}

impl RelayArgs {
    fn apply(self, base: &RelayConfig) -> RelayConfig {
        base.with_overrides(
            self.smtp_server,
            self.smtp_port,
            self.smtp_user,
            self.smtp_password,
        )
    }
}

#[derive(Debug, Deserialize)]
struct SummaryEmailArgs {
    recipient: String,
    filename: String,
    #[serde(default)]
    custom_message: Option<String>,
    #[serde(flatten)]
    relay: RelayArgs,
}

#[derive(Debug, Deserialize)]
struct SendmailArgs {
    recipient: String,
    subject: String,
    body: String,
    #[serde(flatten)]
    relay: RelayArgs,
}

fn relay_properties() -> serde_json::Map<String, Value> {
    let props = json!({
        "smtp_server": { "type": "string", "description": "SMTP server address" },
        "smtp_port": { "type": "integer", "description": "SMTP server port (STARTTLS)" },
        "smtp_user": { "type": "string", "description": "SMTP username, also used as sender" },
        "smtp_password": { "type": "string", "description": "SMTP password or app password" }
    });
    match props {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

fn file_tool(name: &str, description: &str) -> Tool {
    Tool {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "filename": {
                    "type": "string",
                    "description": "Name of the report file in the reports directory"
                }
            },
            "required": ["filename"]
        }),
    }
}

fn mail_tool(name: &str, description: &str, mut properties: serde_json::Map<String, Value>, required: &[&str]) -> Tool {
    properties.extend(relay_properties());
    Tool {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: json!({
            "type": "object",
            "properties": properties,
            "required": required
        }),
    }
}

/// 获取所有工具定义
pub fn get_tool_definitions() -> Vec<Tool> {
    let mut summary_props = serde_json::Map::new();
    summary_props.insert("recipient".into(), json!({ "type": "string", "description": "Email address to send the report to" }));
    summary_props.insert("filename".into(), json!({ "type": "string", "description": "Name of the .docx report in the reports directory" }));
    summary_props.insert("custom_message".into(), json!({ "type": "string", "description": "Optional message placed above the summary" }));

    let mut sendmail_props = serde_json::Map::new();
    sendmail_props.insert("recipient".into(), json!({ "type": "string", "description": "Email address to send to" }));
    sendmail_props.insert("subject".into(), json!({ "type": "string", "description": "Email subject" }));
    sendmail_props.insert("body".into(), json!({ "type": "string", "description": "Email body" }));

    vec![
        file_tool("read_text_report", "Reads the content of a text document report."),
        file_tool("read_docx_report", "Reads the text content of a .docx document report."),
        file_tool(
            "produce_report_summary",
            "Produces a summary of a .docx report by looking for sections like 'Executive Summary' or 'Conclusion', or a preview if none is found.",
        ),
        file_tool(
            "report_insights",
            "Counts defects per severity (Critical, Medium, Low, Informational) in a .docx report.",
        ),
        mail_tool(
            "send_report_summary_email",
            "Sends an email with the report summary and insights (defect count, severity breakdown).",
            summary_props,
            &["recipient", "filename"],
        ),
        mail_tool(
            "sendmail",
            "Sends an email using the given SMTP relay.",
            sendmail_props,
            &["recipient", "subject", "body"],
        ),
    ]
}

fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArgument(e.to_string()))
}

/// 处理工具调用
///
/// 文档解析与邮件发送都是阻塞操作，放到 blocking 线程池执行
pub async fn handle_tool_call(
    tools: &ReportTools,
    name: &str,
    arguments: Value,
) -> Result<Vec<ToolResultContent>, ToolError> {
    let tools = tools.clone();
    let text = match name {
        "read_text_report" => {
            let args: FileArgs = parse_args(arguments)?;
            tokio::task::spawn_blocking(move || tools.read_text(&args.filename)).await?
        }
        "read_docx_report" => {
            let args: FileArgs = parse_args(arguments)?;
            tokio::task::spawn_blocking(move || tools.read_document(&args.filename)).await?
        }
        "produce_report_summary" => {
            let args: FileArgs = parse_args(arguments)?;
            tokio::task::spawn_blocking(move || tools.summarize(&args.filename)).await?
        }
        "report_insights" => {
            let args: FileArgs = parse_args(arguments)?;
            tokio::task::spawn_blocking(move || tools.insights(&args.filename)).await?
        }
        "send_report_summary_email" => {
            let args: SummaryEmailArgs = parse_args(arguments)?;
            tokio::task::spawn_blocking(move || {
                let relay = args.relay.apply(tools.default_relay());
                tools.compose_and_send(
                    &args.recipient,
                    &args.filename,
                    &relay,
                    args.custom_message.as_deref(),
                )
            })
            .await?
        }
        "sendmail" => {
            let args: SendmailArgs = parse_args(arguments)?;
            tokio::task::spawn_blocking(move || {
                let relay = args.relay.apply(tools.default_relay());
                tools.send_raw(&args.recipient, &args.subject, &args.body, &relay)
            })
            .await?
        }
        _ => return Err(ToolError::UnknownTool(name.to_string())),
    };

    Ok(vec![ToolResultContent::text(text)])
}
