//! Static catalog of the R2R tools: names, descriptions and input schemas.

use serde::Serialize;
use serde_json::{json, Value};

use super::args::{DEFAULT_LIST_LIMIT, DEFAULT_LIST_OFFSET, DEFAULT_SEARCH_LIMIT};
use super::errors::ToolError;

// ─── Tool identity ───────────────────────────────────────────────────────────

/// The seven operations exposed to the control channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Login,
    Ingest,
    Search,
    Rag,
    KgSearch,
    ListDocuments,
    DeleteDocument,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::Login,
        Tool::Ingest,
        Tool::Search,
        Tool::Rag,
        Tool::KgSearch,
        Tool::ListDocuments,
        Tool::DeleteDocument,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Login => "r2r_login",
            Tool::Ingest => "r2r_ingest",
            Tool::Search => "r2r_search",
            Tool::Rag => "r2r_rag",
            Tool::KgSearch => "r2r_kg_search",
            Tool::ListDocuments => "r2r_list_documents",
            Tool::DeleteDocument => "r2r_delete_document",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Prefix of the error envelope text for this operation.
    pub fn error_prefix(self) -> &'static str {
        match self {
            Tool::Login => "Error logging in: ",
            Tool::Ingest => "Error ingesting document: ",
            Tool::Search => "Error searching documents: ",
            Tool::Rag => "Error performing RAG query: ",
            Tool::KgSearch => "Error performing knowledge graph search: ",
            Tool::ListDocuments => "Error listing documents: ",
            Tool::DeleteDocument => "Error deleting document: ",
        }
    }
}

// ─── Definitions ─────────────────────────────────────────────────────────────

/// Tool definition as advertised by `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Names listed under `required` in the input schema.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.input_schema
            .get("required")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }
}

/// Immutable set of tool definitions, built once at startup.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    // Indexed by `Tool` discriminant, in `Tool::ALL` order.
    tools: Vec<ToolDefinition>,
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self {
            tools: Tool::ALL.into_iter().map(definition).collect(),
        }
    }

    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn get(&self, tool: Tool) -> &ToolDefinition {
        &self.tools[tool as usize]
    }

    /// Resolve a tool name and check the structural shape of its arguments:
    /// an object with every required field present and non-null.
    pub fn validate(&self, name: &str, arguments: &Value) -> Result<Tool, ToolError> {
        let tool = Tool::from_name(name).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
        })?;

        let args = arguments
            .as_object()
            .ok_or_else(|| ToolError::InvalidArguments {
                tool: name.to_string(),
                reason: "arguments must be a JSON object".to_string(),
            })?;

        for field in self.get(tool).required_fields() {
            let present = args.get(field).map(|v| !v.is_null()).unwrap_or(false);
            if !present {
                return Err(ToolError::InvalidArguments {
                    tool: name.to_string(),
                    reason: format!("missing required field: '{field}'"),
                });
            }
        }

        Ok(tool)
    }
}

fn definition(tool: Tool) -> ToolDefinition {
    let (description, input_schema) = match tool {
        Tool::Login => (
            "Login to R2R API and obtain access token. Required for authenticated operations. \
             Returns access token that is automatically used for subsequent requests.",
            json!({
                "type": "object",
                "properties": {
                    "email": {"type": "string", "description": "User email address"},
                    "password": {"type": "string", "description": "User password"}
                },
                "required": ["email", "password"]
            }),
        ),
        Tool::Ingest => (
            "Ingest documents into R2R for indexing and RAG. This is an ASYNC operation - \
             returns immediately with document_id. Use r2r_list_documents to check ingestion \
             status. Supports modes: fast (quick), hi-res (detailed), custom (full control).",
            json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Absolute path to file to ingest"
                    },
                    "mode": {
                        "type": "string",
                        "enum": ["fast", "hi-res", "custom"],
                        "default": "fast",
                        "description": "Ingestion mode: fast (speed), hi-res (quality), custom (full control)"
                    },
                    "metadata": {
                        "type": "object",
                        "description": "Optional metadata to attach to document (e.g., tags, source, author)"
                    },
                    "chunks": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Pre-processed text chunks (alternative to file_path)"
                    }
                }
            }),
        ),
        Tool::Search => (
            "Search indexed documents using vector/hybrid search. Fast synchronous operation. \
             Returns ranked results with scores and metadata. Modes: basic (semantic only), \
             advanced (hybrid), custom (full control).",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Search query or question"},
                    "mode": {
                        "type": "string",
                        "enum": ["basic", "advanced", "custom"],
                        "default": "advanced",
                        "description": "Search mode: basic (semantic), advanced (hybrid), custom (manual)"
                    },
                    "limit": {
                        "type": "number",
                        "default": DEFAULT_SEARCH_LIMIT,
                        "description": "Maximum number of results to return"
                    },
                    "use_hybrid_search": {
                        "type": "boolean",
                        "description": "Enable hybrid search (semantic + keyword)"
                    },
                    "filters": {
                        "type": "object",
                        "description": "Optional filters (e.g., {\"title\": {\"$in\": [\"doc1.pdf\"]}})"
                    }
                },
                "required": ["query"]
            }),
        ),
        Tool::Rag => (
            "Retrieval-Augmented Generation query. Searches indexed documents and generates AI \
             answer using LLM. Supports streaming for real-time responses. Returns answer with \
             source citations.",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Question to answer using RAG"},
                    "stream": {
                        "type": "boolean",
                        "default": false,
                        "description": "Enable streaming for real-time token delivery"
                    },
                    "search_settings": {
                        "type": "object",
                        "description": "Search configuration (mode, limit, filters)",
                        "properties": {
                            "search_mode": {"type": "string"},
                            "limit": {"type": "number"},
                            "use_hybrid_search": {"type": "boolean"},
                            "filters": {"type": "object"}
                        }
                    },
                    "rag_generation_config": {
                        "type": "object",
                        "description": "LLM generation settings (model, temperature, max_tokens)",
                        "properties": {
                            "model": {"type": "string"},
                            "temperature": {"type": "number"},
                            "max_tokens": {"type": "number"}
                        }
                    }
                },
                "required": ["query"]
            }),
        ),
        Tool::KgSearch => (
            "Knowledge graph search for entity relationships and graph-based queries. Explores \
             connections between entities extracted from documents. Types: local \
             (entity-centric), global (graph-wide).",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Entity or relationship query"},
                    "kg_search_type": {
                        "type": "string",
                        "enum": ["local", "global"],
                        "default": "local",
                        "description": "KG search type: local (entity-focused), global (graph-wide)"
                    }
                },
                "required": ["query"]
            }),
        ),
        Tool::ListDocuments => (
            "List all indexed documents with their ingestion status. Use this to check if async \
             ingestion completed. Returns document metadata, status \
             (pending/processing/success/failed), and timestamps.",
            json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "number",
                        "default": DEFAULT_LIST_LIMIT,
                        "description": "Maximum documents to return"
                    },
                    "offset": {
                        "type": "number",
                        "default": DEFAULT_LIST_OFFSET,
                        "description": "Pagination offset"
                    }
                }
            }),
        ),
        Tool::DeleteDocument => (
            "Delete a document from R2R. Cascading deletion: removes document, chunks, \
             embeddings, and KG entries. Use document_id from r2r_list_documents.",
            json!({
                "type": "object",
                "properties": {
                    "document_id": {"type": "string", "description": "UUID of document to delete"}
                },
                "required": ["document_id"]
            }),
        ),
    };

    ToolDefinition {
        name: tool.name(),
        description,
        input_schema,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
