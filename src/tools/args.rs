//! Typed tool arguments.
//!
//! Defaults here must match the `default` entries in the catalog schemas;
//! a test below keeps the two in sync.

use serde::Deserialize;
use serde_json::Value;

use crate::r2r::{IngestionMode, KgSearchType, SearchMode};

pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
pub const DEFAULT_LIST_LIMIT: u32 = 100;
pub const DEFAULT_LIST_OFFSET: u32 = 0;

fn default_search_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

fn default_list_limit() -> u32 {
    DEFAULT_LIST_LIMIT
}

fn default_list_offset() -> u32 {
    DEFAULT_LIST_OFFSET
}

/// A `limit` of `0` means "not set".
fn limit_or(limit: u32, default: u32) -> u32 {
    if limit == 0 {
        default
    } else {
        limit
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginArgs {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct IngestArgs {
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub mode: IngestionMode,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub chunks: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SearchArgs {
    pub query: String,
    #[serde(default)]
    pub mode: SearchMode,
    #[serde(default = "default_search_limit")]
    pub limit: u32,
    #[serde(default)]
    pub use_hybrid_search: Option<bool>,
    #[serde(default)]
    pub filters: Option<Value>,
}

impl SearchArgs {
    pub fn effective_limit(&self) -> u32 {
        limit_or(self.limit, DEFAULT_SEARCH_LIMIT)
    }
}

#[derive(Debug, Deserialize)]
pub struct RagArgs {
    pub query: String,
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub search_settings: Option<Value>,
    #[serde(default)]
    pub rag_generation_config: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct KgSearchArgs {
    pub query: String,
    #[serde(default)]
    pub kg_search_type: KgSearchType,
}

#[derive(Debug, Deserialize)]
pub struct ListDocumentsArgs {
    #[serde(default = "default_list_limit")]
    pub limit: u32,
    #[serde(default = "default_list_offset")]
    pub offset: u32,
}

impl ListDocumentsArgs {
    pub fn effective_limit(&self) -> u32 {
        limit_or(self.limit, DEFAULT_LIST_LIMIT)
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteDocumentArgs {
    pub document_id: String,
}
