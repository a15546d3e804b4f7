//! Wire types for the R2R REST API and the result shapes the client returns.
//!
//! Request bodies are `Serialize`, raw responses are `Deserialize`, and the
//! reshaped results handed to the dispatcher are `Serialize` again so they can
//! be pretty-printed into a tool envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maximum characters of chunk text kept in a search result.
pub const CHUNK_TEXT_LIMIT: usize = 300;

/// Marker appended to truncated chunk text.
const TRUNCATION_MARKER: &str = "...";

// ─── Modes ───────────────────────────────────────────────────────────────────

/// Ingestion mode understood by `POST /v3/documents`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionMode {
    #[default]
    Fast,
    #[serde(rename = "hi-res")]
    HiRes,
    Custom,
}

impl IngestionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestionMode::Fast => "fast",
            IngestionMode::HiRes => "hi-res",
            IngestionMode::Custom => "custom",
        }
    }
}

/// Retrieval search mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Basic,
    #[default]
    Advanced,
    Custom,
}

/// Knowledge-graph search scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KgSearchType {
    #[default]
    Local,
    Global,
}

// ─── Request bodies ──────────────────────────────────────────────────────────

/// `POST /v2/login` body.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `search_settings` object of a search request.
#[derive(Debug, Clone, Serialize)]
pub struct SearchSettings {
    pub search_mode: SearchMode,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_hybrid_search: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Value>,
}

/// `POST /v3/retrieval/search` body for chunk search.
#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub search_settings: SearchSettings,
}

/// `POST /v3/retrieval/rag` body. Both settings objects are passed through.
#[derive(Debug, Serialize)]
pub struct RagRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_settings: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rag_generation_config: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
pub struct GraphSearchSettings {
    pub use_graph_search: bool,
    pub kg_search_type: KgSearchType,
}

/// `POST /v3/retrieval/search` body for knowledge-graph search.
#[derive(Debug, Serialize)]
pub struct GraphSearchRequest<'a> {
    pub query: &'a str,
    pub graph_search_settings: GraphSearchSettings,
}

// ─── Raw responses ───────────────────────────────────────────────────────────

/// Every R2R endpoint wraps its payload in `{"results": …}`.
#[derive(Debug, Deserialize)]
pub struct ResultsEnvelope<T> {
    pub results: T,
}

#[derive(Debug, Deserialize)]
pub struct LoginResults {
    pub access_token: AccessToken,
}

#[derive(Debug, Deserialize)]
pub struct AccessToken {
    pub token: String,
    #[serde(default)]
    pub expires_at: Option<Value>,
}

/// Acknowledgement of an accepted upload.
#[derive(Debug, Deserialize)]
pub struct IngestAck {
    pub document_id: String,
    #[serde(default)]
    pub task_id: Option<String>,
}

/// v3 answers with a single object, older servers with a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IngestResults {
    Single(IngestAck),
    Batch(Vec<IngestAck>),
}

impl IngestResults {
    pub fn document_id(&self) -> Option<&str> {
        match self {
            IngestResults::Single(ack) => Some(ack.document_id.as_str()),
            IngestResults::Batch(acks) => acks.first().map(|a| a.document_id.as_str()),
        }
    }
}

/// R2R sends `chunk_search_results: null` when chunk search is disabled.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub chunk_search_results: Option<Vec<ChunkSearchResult>>,
}

impl SearchResults {
    pub fn chunks(&self) -> &[ChunkSearchResult] {
        self.chunk_search_results.as_deref().unwrap_or_default()
    }

    pub fn into_chunks(self) -> Vec<ChunkSearchResult> {
        self.chunk_search_results.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkSearchResult {
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Newer R2R releases carry `generated_answer`, sometimes alongside
/// `completion`.
#[derive(Debug, Deserialize)]
pub struct RagResults {
    #[serde(default)]
    pub completion: Option<String>,
    #[serde(default)]
    pub generated_answer: Option<String>,
    #[serde(default)]
    pub search_results: Option<SearchResults>,
}

impl RagResults {
    /// The answer text, preferring `completion`.
    pub fn into_answer(self) -> Option<String> {
        self.completion.or(self.generated_answer)
    }

    /// Number of chunks that contributed to the completion.
    pub fn source_count(&self) -> usize {
        self.search_results
            .as_ref()
            .map(|s| s.chunks().len())
            .unwrap_or(0)
    }
}

/// Ingestion state of a document. Intermediate pipeline stages
/// (parsing, embedding, …) all read as `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionStatus {
    Pending,
    Success,
    Failed,
    #[serde(other)]
    Processing,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type", alias = "document_type")]
    pub document_type: Option<String>,
    #[serde(default)]
    pub ingestion_status: Option<IngestionStatus>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

// ─── Results returned by the client ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub status: &'static str,
    pub message: &'static str,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReceipt {
    pub status: &'static str,
    pub message: &'static str,
    pub document_id: String,
    pub ingestion_mode: IngestionMode,
    pub note: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedChunk {
    pub rank: usize,
    pub score: Option<f64>,
    pub text: String,
    pub document: String,
    pub metadata: Map<String, Value>,
}

impl RankedChunk {
    /// Reshape a raw chunk; `rank` is 1-based.
    pub fn from_chunk(rank: usize, chunk: ChunkSearchResult) -> Self {
        let document = document_label(&chunk);
        Self {
            rank,
            score: chunk.score,
            text: truncate_text(&chunk.text, CHUNK_TEXT_LIMIT),
            document,
            metadata: chunk.metadata,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub query: String,
    pub total_results: usize,
    pub results: Vec<RankedChunk>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    pub query: String,
    pub answer: String,
    pub sources: usize,
}

/// A RAG call either yields a parsed answer or the drained stream text.
#[derive(Debug, Clone)]
pub enum RagOutcome {
    Answer(RagAnswer),
    Streamed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub document_type: Option<String>,
    pub status: Option<IngestionStatus>,
    pub created: Option<String>,
    pub metadata: Map<String, Value>,
}

impl From<DocumentRecord> for DocumentSummary {
    fn from(doc: DocumentRecord) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            document_type: doc.document_type,
            status: doc.ingestion_status,
            created: doc.created_at,
            metadata: doc.metadata,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentListing {
    pub total: usize,
    pub limit: u32,
    pub offset: u32,
    pub documents: Vec<DocumentSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletionReceipt {
    pub status: &'static str,
    pub message: &'static str,
    pub document_id: String,
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Keep the first `max` characters, appending `...` when anything was cut.
pub fn truncate_text(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Display label for a chunk: metadata title, then document id, then `Unknown`.
pub fn document_label(chunk: &ChunkSearchResult) -> String {
    let from_metadata = |key: &str| {
        chunk
            .metadata
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    from_metadata("title")
        .or_else(|| from_metadata("document_id"))
        .or_else(|| chunk.document_id.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
