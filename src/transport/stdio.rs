//! 标准输入输出传输
//!
//! 每行一条 JSON-RPC 消息。stdout 只输出协议消息，日志全部写 stderr。

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse, PARSE_ERROR};
use crate::mcp::DocAnalyzerServer;

/// 在进程的 stdin/stdout 上运行服务
pub async fn run_stdio_server(server: DocAnalyzerServer) -> std::io::Result<()> {
    info!("🔌 启动 stdio 传输: {} v{}", server.name(), server.version());
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(&server, stdin, stdout).await
}

/// 逐行读取请求并写回响应，直到输入结束
///
/// 按字节读取，非 UTF-8 或无法解析的行回复解析错误后继续处理后续请求。
///
/// # 参数
/// - `server`: 请求分发器
/// - `reader`: 请求输入流
/// - `writer`: 响应输出流
///
/// # 返回
/// 输入正常结束时返回 Ok，读写失败时返回对应的 IO 错误
pub async fn serve<R, W>(server: &DocAnalyzerServer, mut reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = match reader.read_until(b'\n', &mut line).await {
            Ok(read) => read,
            Err(e) => {
                error!("读取请求失败: {}", e);
                return Err(e);
            }
        };
        if read == 0 {
            break;
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let response = match serde_json::from_slice::<JsonRpcRequest>(&line) {
            Ok(request) => server.handle_request(request).await,
            Err(e) => {
                warn!("无法解析消息: {}", e);
                Some(JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e)))
            }
        };

        if let Some(response) = response {
            if let Err(e) = write_message(&mut writer, &response).await {
                error!("写入响应失败: {}", e);
                return Err(e);
            }
        }
    }

    info!("输入结束，服务退出");
    Ok(())
}

async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> std::io::Result<()> {
    let mut body = serde_json::to_vec(response)?;
    body.push(b'\n');
    writer.write_all(&body).await?;
    writer.flush().await
}
