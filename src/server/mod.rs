//! Minimal MCP server over line-delimited JSON-RPC on stdio.

pub mod errors;
pub mod handler;
pub mod transport;
pub mod types;

pub use errors::ServerError;
pub use handler::McpServer;
pub use transport::{serve, serve_stdio};
