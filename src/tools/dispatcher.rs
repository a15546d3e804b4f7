//! Tool dispatcher: name + arguments in, result envelope out.
//!
//! Looks the tool up in the catalog, validates and defaults its arguments,
//! calls the R2R client, and turns the outcome into a `ToolResult`. Failures
//! become error envelopes prefixed per operation; only an unknown tool name
//! is returned as `Err`.

use std::time::Instant;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::args::{
    DeleteDocumentArgs, IngestArgs, KgSearchArgs, ListDocumentsArgs, LoginArgs, RagArgs,
    SearchArgs,
};
use super::catalog::{Tool, ToolCatalog, ToolDefinition};
use super::envelope::ToolResult;
use super::errors::ToolError;
use crate::r2r::{IngestRequest, IngestSource, R2rClient, RagOutcome, SearchSettings};

#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    client: R2rClient,
    catalog: ToolCatalog,
}

impl ToolDispatcher {
    pub fn new(client: R2rClient) -> Self {
        Self {
            client,
            catalog: ToolCatalog::new(),
        }
    }

    /// Definitions advertised through `tools/list`.
    pub fn definitions(&self) -> &[ToolDefinition] {
        self.catalog.definitions()
    }

    /// Execute one tool invocation. Absent or `null` arguments read as `{}`.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<ToolResult, ToolError> {
        let arguments = match arguments {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(value) => value,
        };

        let tool = match self.catalog.validate(name, &arguments) {
            Ok(tool) => tool,
            Err(err @ ToolError::UnknownTool { .. }) => {
                tracing::warn!(tool = %name, "unknown tool requested");
                return Err(err);
            }
            Err(err) => return Ok(failure(Tool::from_name(name), err)),
        };

        let start = Instant::now();
        let outcome = match tool {
            Tool::Login => self.login(arguments).await,
            Tool::Ingest => self.ingest(arguments).await,
            Tool::Search => self.search(arguments).await,
            Tool::Rag => self.rag(arguments).await,
            Tool::KgSearch => self.kg_search(arguments).await,
            Tool::ListDocuments => self.list_documents(arguments).await,
            Tool::DeleteDocument => self.delete_document(arguments).await,
        };
        let result = outcome.unwrap_or_else(|err| failure(Some(tool), err));

        tracing::info!(
            tool = tool.name(),
            is_error = result.is_error(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "tool call finished"
        );

        Ok(result)
    }

    // ─── Operations ──────────────────────────────────────────────────────

    async fn login(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let args: LoginArgs = parse_args(Tool::Login, arguments)?;
        let outcome = self.client.login(&args.email, &args.password).await?;
        Ok(ToolResult::json(&outcome))
    }

    async fn ingest(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let args: IngestArgs = parse_args(Tool::Ingest, arguments)?;
        let source = IngestSource::from_parts(args.file_path, args.chunks)?;
        let receipt = self
            .client
            .ingest(IngestRequest {
                source,
                mode: args.mode,
                metadata: args.metadata,
            })
            .await?;
        Ok(ToolResult::json(&receipt))
    }

    async fn search(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let args: SearchArgs = parse_args(Tool::Search, arguments)?;
        let settings = SearchSettings {
            search_mode: args.mode,
            limit: args.effective_limit(),
            use_hybrid_search: args.use_hybrid_search,
            filters: args.filters,
        };
        let report = self.client.search(&args.query, settings).await?;
        Ok(ToolResult::json(&report))
    }

    async fn rag(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let args: RagArgs = parse_args(Tool::Rag, arguments)?;
        let outcome = self
            .client
            .rag(
                &args.query,
                args.search_settings.as_ref(),
                args.rag_generation_config.as_ref(),
                args.stream,
            )
            .await?;

        Ok(match outcome {
            RagOutcome::Answer(answer) => ToolResult::json(&answer),
            RagOutcome::Streamed(text) => ToolResult::text(text),
        })
    }

    async fn kg_search(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let args: KgSearchArgs = parse_args(Tool::KgSearch, arguments)?;
        let results = self
            .client
            .kg_search(&args.query, args.kg_search_type)
            .await?;
        Ok(ToolResult::json(&results))
    }

    async fn list_documents(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let args: ListDocumentsArgs = parse_args(Tool::ListDocuments, arguments)?;
        let listing = self
            .client
            .list_documents(args.effective_limit(), args.offset)
            .await?;
        Ok(ToolResult::json(&listing))
    }

    async fn delete_document(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let args: DeleteDocumentArgs = parse_args(Tool::DeleteDocument, arguments)?;
        let receipt = self.client.delete_document(&args.document_id).await?;
        Ok(ToolResult::json(&receipt))
    }
}

fn parse_args<T: DeserializeOwned>(tool: Tool, arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
        tool: tool.name().to_string(),
        reason: e.to_string(),
    })
}

fn failure(tool: Option<Tool>, err: ToolError) -> ToolResult {
    let prefix = tool.map(Tool::error_prefix).unwrap_or("Error: ");
    tracing::warn!(
        tool = tool.map(Tool::name).unwrap_or("unknown"),
        error = %err,
        "tool call failed"
    );
    ToolResult::error(format!("{prefix}{err}"))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
