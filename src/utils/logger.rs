//! 日志工具模块
//!
//! 初始化 tracing，并提供启动/结束时的日志输出

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化日志
///
/// 日志统一写到 stderr，stdout 留给工具协议和命令输出。
/// 优先使用 `RUST_LOG`，否则按 verbose 选择 debug / info。
///
/// # 参数
/// - `verbose`: 是否输出 debug 级别日志
///
/// # 返回
/// 重复初始化时返回错误
pub fn init(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `mode`: 运行模式（服务 / 单次命令）
/// - `reports_dir`: 报告目录
pub fn log_startup(mode: &str, reports_dir: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {}", mode);
    info!("📁 报告目录: {}", reports_dir);
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}

/// 记录程序结束信息
pub fn log_shutdown() {
    info!("{}", "─".repeat(60));
    info!(
        "✓ 处理完成: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最多保留的字符数
///
/// # 返回
/// 超长时截断并追加 `...`
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("Critical finding", 8), "Critical...");
        assert_eq!(truncate_text("短文本", 10), "短文本");
    }
}
