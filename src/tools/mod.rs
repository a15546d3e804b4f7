//! MCP tool surface over the R2R client.

pub mod args;
pub mod catalog;
pub mod dispatcher;
pub mod envelope;
pub mod errors;

pub use catalog::{Tool, ToolCatalog, ToolDefinition};
pub use dispatcher::ToolDispatcher;
pub use envelope::{ContentItem, ToolResult};
pub use errors::ToolError;
