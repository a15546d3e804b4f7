pub mod config;
pub mod r2r;
pub mod server;
pub mod tools;

#[cfg(test)]
mod testing;

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

pub use config::{Config, ConfigError};
pub use r2r::{R2rClient, R2rError, Session};
pub use server::McpServer;
pub use tools::{ToolDispatcher, ToolError, ToolResult};

const LOG_FILE_NAME: &str = "r2r-mcp.log";
const LOG_STDERR_VAR: &str = "R2R_MCP_LOG_STDERR";
const LOG_JSON_VAR: &str = "R2R_MCP_LOG_JSON";

/// Return the platform-standard data directory for r2r-mcp.
///
/// - macOS: `~/Library/Application Support/r2r-mcp/`
/// - Linux: `$XDG_DATA_HOME/r2r-mcp/` (fallback `~/.local/share/r2r-mcp/`)
///
/// Falls back to `~/.r2r-mcp/` only if no data directory can be resolved.
pub(crate) fn data_dir() -> PathBuf {
    if let Some(dir) = dirs::data_dir() {
        return dir.join("r2r-mcp");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".r2r-mcp")
}

fn env_flag(name: &str) -> bool {
    matches!(
        std::env::var(name).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Initialize the tracing subscriber.
///
/// Stdout carries MCP protocol messages, so logs go to a file in the data
/// directory (rotated on every start, last 3 kept) or, with
/// `R2R_MCP_LOG_STDERR=1`, to stderr. Falls back to stderr when the log file
/// cannot be opened.
///
/// The file is shared as `Arc<File>`; `File` has no userspace buffer, so each
/// formatted event reaches the OS as soon as it is written.
pub fn init_tracing() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("r2r_mcp=info,warn"));
    let json = env_flag(LOG_JSON_VAR);

    let log_dir = data_dir();
    let log_path = log_dir.join(LOG_FILE_NAME);
    let file_writer = if env_flag(LOG_STDERR_VAR) {
        None
    } else {
        open_log_file(&log_dir, &log_path).map(Arc::new)
    };

    let builder = fmt::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false);

    let log_file = match file_writer {
        Some(writer) => {
            if json {
                builder.json().with_writer(writer).init();
            } else {
                builder.with_writer(writer).init();
            }
            Some(log_path)
        }
        None => {
            if json {
                builder.json().with_writer(std::io::stderr).init();
            } else {
                builder.with_writer(std::io::stderr).init();
            }
            None
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %log_dir.display(),
        log_file = ?log_file,
        pid = std::process::id(),
        "=== r2r-mcp starting ==="
    );
}

fn open_log_file(log_dir: &Path, log_path: &Path) -> Option<File> {
    std::fs::create_dir_all(log_dir).ok()?;
    rotate_log_file(log_path, LOG_GENERATIONS);
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .ok()
}

const LOG_GENERATIONS: u32 = 3;

/// `r2r-mcp.log` for generation 0, `r2r-mcp.log.N` after that.
fn log_generation(base_path: &Path, generation: u32) -> PathBuf {
    if generation == 0 {
        return base_path.to_path_buf();
    }
    let mut name = OsString::from(base_path.as_os_str());
    name.push(format!(".{generation}"));
    PathBuf::from(name)
}

/// Age every log generation by one. Whatever sits in generation `keep` is
/// dropped; gaps in the chain are left as they are.
fn rotate_log_file(base_path: &Path, keep: u32) {
    let _ = std::fs::remove_file(log_generation(base_path, keep));
    for generation in (0..keep).rev() {
        let current = log_generation(base_path, generation);
        if current.exists() {
            let _ = std::fs::rename(&current, log_generation(base_path, generation + 1));
        }
    }
}

/// Run the MCP server on stdio until stdin closes.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("failed to load configuration")?;
    tracing::info!(
        base_url = %config.base_url,
        has_token = config.auth_token.is_some(),
        "configuration resolved"
    );

    let client = R2rClient::new(config.session()).context("failed to build R2R client")?;
    let server = McpServer::new(ToolDispatcher::new(client));

    server::serve_stdio(&server)
        .await
        .context("MCP server stopped unexpectedly")?;

    tracing::info!("r2r-mcp shut down");
    Ok(())
}
