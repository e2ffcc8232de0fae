use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doc_analyzer::{logger, transport, Config, DocAnalyzerServer, ReportTools};

#[derive(Parser, Debug)]
#[command(name = "doc-analyzer")]
#[command(version, about = "Penetration test report summaries and severity insights")]
struct Args {
    /// TOML 配置文件
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 在 stdio 上运行 MCP 工具服务（默认）
    Serve,
    /// 输出报告全文（.docx 或纯文本）
    Read {
        filename: String,
        /// 按纯文本读取
        #[arg(long)]
        text: bool,
    },
    /// 输出报告摘要
    Summary { filename: String },
    /// 输出缺陷等级统计
    Insights { filename: String },
    /// 发送摘要邮件
    Send {
        #[arg(long)]
        to: String,
        filename: String,
        #[arg(long)]
        message: Option<String>,
    },
    /// 发送摘要邮件，附带自动生成的高/严重/中危统计
    Notify {
        #[arg(long)]
        to: String,
        filename: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 加载配置
    let mut config = Config::load(args.config.as_deref()).context("加载配置失败")?;
    config.verbose_logging |= args.verbose;

    // 初始化日志
    logger::init(config.verbose_logging).context("初始化日志失败")?;

    let tools = ReportTools::new(&config);
    let command = args.command.unwrap_or(Command::Serve);

    if let Command::Serve = command {
        logger::log_startup("MCP stdio 服务", &config.reports_dir.display().to_string());
        transport::run_stdio_server(DocAnalyzerServer::new(tools))
            .await
            .context("stdio 服务异常退出")?;
        logger::log_shutdown();
        return Ok(());
    }

    // 命令行模式下的操作都是阻塞的
    let output = tokio::task::spawn_blocking(move || run_command(&tools, command)).await?;
    println!("{}", output);
    Ok(())
}

fn run_command(tools: &ReportTools, command: Command) -> String {
    let relay = tools.default_relay().clone();
    match command {
        Command::Serve => String::new(),
        Command::Read { filename, text: true } => tools.read_text(&filename),
        Command::Read { filename, text: false } => tools.read_document(&filename),
        Command::Summary { filename } => tools.summarize(&filename),
        Command::Insights { filename } => tools.insights(&filename),
        Command::Send {
            to,
            filename,
            message,
        } => tools.compose_and_send(&to, &filename, &relay, message.as_deref()),
        Command::Notify { to, filename } => {
            let digest = tools.priority_digest(&filename);
            tools.compose_and_send(&to, &filename, &relay, Some(&digest))
        }
    }
}
