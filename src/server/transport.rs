//! Line-delimited JSON-RPC transport.
//!
//! One JSON object per line in, one per line out. Stdout carries protocol
//! messages only; logging goes elsewhere.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::errors::ServerError;
use super::handler::McpServer;
use super::types::{error_codes, JsonRpcResponse};

/// Serve requests from `reader` until EOF, writing responses to `writer`.
pub async fn serve<R, W>(server: &McpServer, mut reader: R, mut writer: W) -> Result<(), ServerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line_buf = Vec::new();

    loop {
        line_buf.clear();
        let bytes_read = reader
            .read_until(b'\n', &mut line_buf)
            .await
            .map_err(|e| ServerError::Read {
                reason: e.to_string(),
            })?;

        if bytes_read == 0 {
            tracing::info!("input closed, stopping MCP server");
            return Ok(());
        }

        let line = match std::str::from_utf8(&line_buf) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "request line is not valid UTF-8");
                let response = JsonRpcResponse::failure(
                    serde_json::Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {e}"),
                );
                write_response(&mut writer, &response).await?;
                continue;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(response) = server.handle_line(trimmed).await {
            write_response(&mut writer, &response).await?;
        }
    }
}

/// Serve over the process's stdin/stdout.
pub async fn serve_stdio(server: &McpServer) -> Result<(), ServerError> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(server, stdin, stdout).await
}

async fn write_response<W>(writer: &mut W, response: &JsonRpcResponse) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    let mut json = serde_json::to_string(response).map_err(|e| ServerError::Serialize {
        reason: e.to_string(),
    })?;
    json.push('\n');

    writer
        .write_all(json.as_bytes())
        .await
        .map_err(|e| ServerError::Write {
            reason: e.to_string(),
        })?;
    writer.flush().await.map_err(|e| ServerError::Write {
        reason: e.to_string(),
    })?;

    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
