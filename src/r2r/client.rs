//! R2R REST client.
//!
//! The only place that knows the R2R REST surface. Each operation issues one
//! request, checks the status, parses the body into a typed result and returns
//! `Result<_, R2rError>`. Envelope formatting happens in the dispatcher.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::Stream;
use reqwest::multipart::{Form, Part};
use reqwest::{Client as HttpClient, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::io::ReaderStream;

use super::errors::R2rError;
use super::session::Session;
use super::streaming::{collect_text, decode_text_stream};
use super::types::{
    DeletionReceipt, DocumentListing, DocumentRecord, GraphSearchRequest, GraphSearchSettings,
    IngestReceipt, IngestResults, IngestionMode, KgSearchType, LoginOutcome, LoginRequest,
    LoginResults, RagAnswer, RagOutcome, RagRequest, RagResults, RankedChunk, ResultsEnvelope,
    SearchReport, SearchRequest, SearchResults, SearchSettings,
};

// ─── Endpoints ───────────────────────────────────────────────────────────────

const LOGIN_PATH: &str = "/v2/login";
const DOCUMENTS_PATH: &str = "/v3/documents";
const SEARCH_PATH: &str = "/v3/retrieval/search";
const RAG_PATH: &str = "/v3/retrieval/rag";

const USER_AGENT: &str = concat!("r2r-mcp/", env!("CARGO_PKG_VERSION"));

const INGEST_NOTE: &str =
    "Ingestion is processing in background. Use r2r_list_documents to check status.";

// ─── Ingest input ────────────────────────────────────────────────────────────

/// What to upload: a file on disk or pre-chunked text.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestSource {
    File(PathBuf),
    Chunks(Vec<String>),
}

impl IngestSource {
    /// Pick the source from the two optional arguments. Exactly one must be set.
    pub fn from_parts(
        file_path: Option<String>,
        chunks: Option<Vec<String>>,
    ) -> Result<Self, R2rError> {
        match (file_path, chunks) {
            (Some(path), None) => Ok(IngestSource::File(PathBuf::from(path))),
            (None, Some(chunks)) => Ok(IngestSource::Chunks(chunks)),
            (Some(_), Some(_)) => Err(R2rError::InvalidArgument {
                reason: "file_path and chunks are mutually exclusive".into(),
            }),
            (None, None) => Err(R2rError::MissingArgument {
                reason: "Either file_path or chunks must be provided".into(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub source: IngestSource,
    pub mode: IngestionMode,
    pub metadata: Option<Value>,
}

// ─── R2rClient ───────────────────────────────────────────────────────────────

/// Client for one R2R deployment.
///
/// Cheap to clone: clones share the HTTP connection pool and the session, so
/// a login through any clone is seen by all of them.
#[derive(Debug, Clone)]
pub struct R2rClient {
    http: HttpClient,
    session: Arc<Session>,
}

impl R2rClient {
    /// Build a client around a session. No request is sent.
    pub fn new(session: Session) -> Result<Self, R2rError> {
        let http = HttpClient::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| R2rError::Transport {
                endpoint: session.base_url().to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            session: Arc::new(session),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Attach the bearer token when one is present.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and turn non-2xx statuses into `RemoteRejection`.
    async fn execute(&self, endpoint: &str, request: RequestBuilder) -> Result<Response, R2rError> {
        let response = request
            .send()
            .await
            .map_err(|e| R2rError::transport(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                endpoint = %endpoint,
                status = status.as_u16(),
                "R2R rejected request"
            );
            return Err(R2rError::RemoteRejection {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Read the body and parse it into `T`.
    async fn read_json<T: DeserializeOwned>(
        endpoint: &str,
        response: Response,
    ) -> Result<T, R2rError> {
        let body = response
            .text()
            .await
            .map_err(|e| R2rError::transport(endpoint, e))?;
        serde_json::from_str(&body).map_err(|e| R2rError::malformed(endpoint, e))
    }

    // ─── Auth ────────────────────────────────────────────────────────────

    /// Log in and store the returned access token in the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, R2rError> {
        let url = self.session.url(LOGIN_PATH);
        tracing::info!(url = %url, email = %email, "logging in to R2R");

        let request = self.http.post(&url).json(&LoginRequest { email, password });
        let response = self.execute(&url, request).await?;
        let data: ResultsEnvelope<LoginResults> = Self::read_json(&url, response).await?;

        let token = data.results.access_token.token;
        self.session.replace_token(token.clone());
        tracing::info!(email = %email, "R2R login succeeded, token stored");

        Ok(LoginOutcome {
            status: "success",
            message: "Logged in successfully",
            token,
            expires_at: data.results.access_token.expires_at,
        })
    }

    // ─── Documents ───────────────────────────────────────────────────────

    /// Upload a document. Returns as soon as R2R accepts it; ingestion
    /// continues remotely and is observed through `list_documents`.
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestReceipt, R2rError> {
        let url = self.session.url(DOCUMENTS_PATH);

        let mut form = match &request.source {
            IngestSource::File(path) => Form::new().part("file", file_part(path).await?),
            IngestSource::Chunks(chunks) => {
                Form::new().text("chunks", Value::from(chunks.clone()).to_string())
            }
        };
        form = form.text("ingestion_mode", request.mode.as_str());
        if let Some(metadata) = &request.metadata {
            form = form.text("metadata", metadata.to_string());
        }

        tracing::info!(
            url = %url,
            mode = request.mode.as_str(),
            has_metadata = request.metadata.is_some(),
            from_file = matches!(request.source, IngestSource::File(_)),
            "submitting document for ingestion"
        );

        let response = self
            .execute(&url, self.authorize(self.http.post(&url).multipart(form)))
            .await?;
        let data: ResultsEnvelope<IngestResults> = Self::read_json(&url, response).await?;

        let document_id = data
            .results
            .document_id()
            .ok_or_else(|| R2rError::malformed(&url, "no document_id in ingestion response"))?
            .to_string();

        tracing::info!(document_id = %document_id, "ingestion accepted");

        Ok(IngestReceipt {
            status: "success",
            message: "Document ingestion started (async operation)",
            document_id,
            ingestion_mode: request.mode,
            note: INGEST_NOTE,
        })
    }

    /// List documents with their ingestion status.
    pub async fn list_documents(&self, limit: u32, offset: u32) -> Result<DocumentListing, R2rError> {
        let url = self.session.url(DOCUMENTS_PATH);
        tracing::debug!(url = %url, limit, offset, "listing documents");

        let request = self
            .http
            .get(&url)
            .query(&[("limit", limit), ("offset", offset)]);
        let response = self.execute(&url, self.authorize(request)).await?;
        let data: ResultsEnvelope<Vec<DocumentRecord>> = Self::read_json(&url, response).await?;

        let documents: Vec<_> = data.results.into_iter().map(Into::into).collect();
        Ok(DocumentListing {
            total: documents.len(),
            limit,
            offset,
            documents,
        })
    }

    /// Delete a document. Derived chunks, embeddings and graph entries are
    /// removed by R2R itself.
    pub async fn delete_document(&self, document_id: &str) -> Result<DeletionReceipt, R2rError> {
        if document_id.trim().is_empty() {
            return Err(R2rError::InvalidArgument {
                reason: "document_id must not be empty".into(),
            });
        }

        let url = self.document_url(document_id)?;
        tracing::info!(url = %url, document_id = %document_id, "deleting document");

        self.execute(url.as_str(), self.authorize(self.http.delete(url.clone())))
            .await?;

        Ok(DeletionReceipt {
            status: "success",
            message: "Document deleted successfully",
            document_id: document_id.to_string(),
        })
    }

    /// `/v3/documents/{id}` with the id percent-encoded as one path segment.
    fn document_url(&self, document_id: &str) -> Result<Url, R2rError> {
        let base = self.session.url(DOCUMENTS_PATH);
        let mut url = Url::parse(&base).map_err(|e| R2rError::InvalidArgument {
            reason: format!("invalid base URL {base}: {e}"),
        })?;
        url.path_segments_mut()
            .map_err(|_| R2rError::InvalidArgument {
                reason: format!("base URL {base} cannot carry a path"),
            })?
            .push(document_id);
        Ok(url)
    }

    // ─── Retrieval ───────────────────────────────────────────────────────

    /// Vector/hybrid chunk search, reshaped into a ranked list.
    pub async fn search(
        &self,
        query: &str,
        settings: SearchSettings,
    ) -> Result<SearchReport, R2rError> {
        let url = self.session.url(SEARCH_PATH);
        tracing::info!(
            url = %url,
            mode = ?settings.search_mode,
            limit = settings.limit,
            hybrid = ?settings.use_hybrid_search,
            has_filters = settings.filters.is_some(),
            "searching documents"
        );

        let body = SearchRequest {
            query,
            search_settings: settings,
        };
        let response = self
            .execute(&url, self.authorize(self.http.post(&url).json(&body)))
            .await?;
        let data: ResultsEnvelope<SearchResults> = Self::read_json(&url, response).await?;

        let results: Vec<RankedChunk> = data
            .results
            .into_chunks()
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| RankedChunk::from_chunk(i + 1, chunk))
            .collect();

        Ok(SearchReport {
            query: query.to_string(),
            total_results: results.len(),
            results,
        })
    }

    /// Retrieval-augmented generation.
    ///
    /// With `stream` set, the response body is drained to the end and returned
    /// as one text; nothing is handed back until the stream is exhausted.
    pub async fn rag(
        &self,
        query: &str,
        search_settings: Option<&Value>,
        rag_generation_config: Option<&Value>,
        stream: bool,
    ) -> Result<RagOutcome, R2rError> {
        if stream {
            let fragments = self
                .rag_stream(query, search_settings, rag_generation_config)
                .await?;
            let text = collect_text(fragments).await?;
            tracing::info!(chars = text.chars().count(), "RAG stream drained");
            return Ok(RagOutcome::Streamed(text));
        }

        let url = self.session.url(RAG_PATH);
        tracing::info!(url = %url, "running RAG query");

        let body = RagRequest {
            query,
            search_settings,
            rag_generation_config,
        };
        let response = self
            .execute(&url, self.authorize(self.http.post(&url).json(&body)))
            .await?;
        let data: ResultsEnvelope<RagResults> = Self::read_json(&url, response).await?;

        let sources = data.results.source_count();
        let answer = data
            .results
            .into_answer()
            .ok_or_else(|| R2rError::malformed(&url, "missing completion"))?;
        Ok(RagOutcome::Answer(RagAnswer {
            query: query.to_string(),
            answer,
            sources,
        }))
    }

    /// Streaming RAG: text fragments in arrival order.
    pub async fn rag_stream(
        &self,
        query: &str,
        search_settings: Option<&Value>,
        rag_generation_config: Option<&Value>,
    ) -> Result<impl Stream<Item = Result<String, R2rError>>, R2rError> {
        let url = self.session.url(RAG_PATH);
        tracing::info!(url = %url, "running streaming RAG query");

        let body = RagRequest {
            query,
            search_settings,
            rag_generation_config,
        };
        let request = self
            .http
            .post(&url)
            .query(&[("stream", "true")])
            .header("Accept", "text/event-stream")
            .json(&body);
        let response = self.execute(&url, self.authorize(request)).await?;

        Ok(decode_text_stream(response.bytes_stream()))
    }

    /// Knowledge-graph search. The graph payload is returned untouched.
    pub async fn kg_search(
        &self,
        query: &str,
        kg_search_type: KgSearchType,
    ) -> Result<Value, R2rError> {
        let url = self.session.url(SEARCH_PATH);
        tracing::info!(url = %url, kg_search_type = ?kg_search_type, "searching knowledge graph");

        let body = GraphSearchRequest {
            query,
            graph_search_settings: GraphSearchSettings {
                use_graph_search: true,
                kg_search_type,
            },
        };
        let response = self
            .execute(&url, self.authorize(self.http.post(&url).json(&body)))
            .await?;
        let data: ResultsEnvelope<Value> = Self::read_json(&url, response).await?;

        Ok(data.results)
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Open a file as a streamed multipart part named after the file.
async fn file_part(path: &Path) -> Result<Part, R2rError> {
    let display = path.display().to_string();
    let io_error = |e: std::io::Error| {
        if e.kind() == std::io::ErrorKind::NotFound {
            R2rError::FileNotFound {
                path: display.clone(),
            }
        } else {
            R2rError::Io {
                path: display.clone(),
                reason: e.to_string(),
            }
        }
    };

    let file = tokio::fs::File::open(path).await.map_err(io_error)?;
    let meta = file.metadata().await.map_err(io_error)?;
    if !meta.is_file() {
        return Err(R2rError::Io {
            path: display,
            reason: "not a regular file".into(),
        });
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
    Ok(Part::stream_with_length(body, meta.len()).file_name(file_name))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockR2r, Reply};
    use serde_json::json;

    fn settings(limit: u32) -> SearchSettings {
        SearchSettings {
            search_mode: Default::default(),
            limit,
            use_hybrid_search: None,
            filters: None,
        }
    }

    #[test]
    fn test_ingest_source_requires_one_input() {
        let err = IngestSource::from_parts(None, None).unwrap_err();
        assert!(matches!(err, R2rError::MissingArgument { .. }));
        assert!(err.to_string().contains("file_path or chunks"));

        let err = IngestSource::from_parts(Some("/a".into()), Some(vec!["x".into()])).unwrap_err();
        assert!(matches!(err, R2rError::InvalidArgument { .. }));

        assert_eq!(
            IngestSource::from_parts(None, Some(vec!["x".into()])).unwrap(),
            IngestSource::Chunks(vec!["x".into()])
        );
    }

    #[tokio::test]
    async fn test_login_stores_token_for_later_requests() {
        let mock = MockR2r::start().await;
        mock.on(
            "POST",
            "/v2/login",
            Reply::json(200, json!({
                "results": {"access_token": {"token": "abc", "token_type": "access"}}
            })),
        );
        mock.on("GET", "/v3/documents", Reply::json(200, json!({"results": []})));

        let client = mock.client(None);
        let outcome = client.login("me@example.com", "hunter2").await.unwrap();
        assert_eq!(outcome.token, "abc");
        assert!(outcome.expires_at.is_none());

        let login = mock.last_request();
        assert!(login.authorization.is_none());
        assert_eq!(
            login.json(),
            json!({"email": "me@example.com", "password": "hunter2"})
        );

        client.list_documents(100, 0).await.unwrap();
        assert_eq!(
            mock.last_request().authorization.as_deref(),
            Some("Bearer abc")
        );
    }

    #[tokio::test]
    async fn test_login_overwrites_existing_token() {
        let mock = MockR2r::start().await;
        mock.on(
            "POST",
            "/v2/login",
            Reply::json(200, json!({
                "results": {"access_token": {"token": "fresh", "expires_at": "2030-01-01T00:00:00"}}
            })),
        );

        let client = mock.client(Some("stale"));
        let outcome = client.login("a@b.c", "pw").await.unwrap();
        assert_eq!(outcome.expires_at, Some(json!("2030-01-01T00:00:00")));
        assert_eq!(client.session().token().as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_login_rejected_keeps_token() {
        let mock = MockR2r::start().await;
        mock.on(
            "POST",
            "/v2/login",
            Reply::text(401, r#"{"detail":"Incorrect email or password"}"#),
        );

        let client = mock.client(Some("kept"));
        let err = client.login("a@b.c", "wrong").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("Incorrect email or password"));
        assert_eq!(client.session().token().as_deref(), Some("kept"));
    }

    #[tokio::test]
    async fn test_login_without_token_is_malformed() {
        let mock = MockR2r::start().await;
        mock.on("POST", "/v2/login", Reply::json(200, json!({"results": {}})));

        let client = mock.client(None);
        let err = client.login("a@b.c", "pw").await.unwrap_err();
        assert!(matches!(err, R2rError::MalformedResponse { .. }));
        assert!(!client.session().has_token());
    }

    #[tokio::test]
    async fn test_no_authorization_without_token() {
        let mock = MockR2r::start().await;
        mock.on("GET", "/v3/documents", Reply::json(200, json!({"results": []})));

        mock.client(None).list_documents(100, 0).await.unwrap();
        assert!(mock.last_request().authorization.is_none());
    }

    #[tokio::test]
    async fn test_search_ranks_and_truncates() {
        let mock = MockR2r::start().await;
        let chunks: Vec<Value> = (0..12)
            .map(|i| {
                json!({
                    "score": 1.0 - (i as f64) / 100.0,
                    "text": format!("{i}-{}", "z".repeat(400)),
                    "metadata": {"title": format!("doc-{i}.pdf")}
                })
            })
            .collect();
        mock.on(
            "POST",
            "/v3/retrieval/search",
            Reply::json(200, json!({"results": {"chunk_search_results": chunks}})),
        );

        let report = mock
            .client(Some("t"))
            .search("vector databases", settings(10))
            .await
            .unwrap();

        assert_eq!(report.total_results, 12);
        for (i, item) in report.results.iter().enumerate() {
            assert_eq!(item.rank, i + 1);
            assert_eq!(item.document, format!("doc-{i}.pdf"));
            assert!(item.text.starts_with(&format!("{i}-")));
            assert!(item.text.chars().count() <= 303);
            assert!(item.text.ends_with("..."));
            assert!(item.score.is_some());
        }

        let sent = mock.last_request().json();
        assert_eq!(sent["query"], "vector databases");
        assert_eq!(
            sent["search_settings"],
            json!({"search_mode": "advanced", "limit": 10})
        );
    }

    #[tokio::test]
    async fn test_search_null_chunk_results_is_empty() {
        let mock = MockR2r::start().await;
        mock.on(
            "POST",
            "/v3/retrieval/search",
            Reply::json(200, json!({"results": {"chunk_search_results": null}})),
        );

        let report = mock.client(None).search("q", settings(10)).await.unwrap();
        assert_eq!(report.total_results, 0);
        assert!(report.results.is_empty());
    }

    #[tokio::test]
    async fn test_search_forwards_hybrid_and_filters() {
        let mock = MockR2r::start().await;
        mock.on(
            "POST",
            "/v3/retrieval/search",
            Reply::json(200, json!({"results": {"chunk_search_results": []}})),
        );

        let filters = json!({"title": {"$in": ["doc1.pdf"]}});
        let report = mock
            .client(None)
            .search(
                "q",
                SearchSettings {
                    search_mode: crate::r2r::SearchMode::Basic,
                    limit: 3,
                    use_hybrid_search: Some(true),
                    filters: Some(filters.clone()),
                },
            )
            .await
            .unwrap();
        assert_eq!(report.total_results, 0);

        let sent = mock.last_request().json();
        assert_eq!(sent["search_settings"]["search_mode"], "basic");
        assert_eq!(sent["search_settings"]["use_hybrid_search"], true);
        assert_eq!(sent["search_settings"]["filters"], filters);
    }

    #[tokio::test]
    async fn test_rag_non_streaming_counts_sources() {
        let mock = MockR2r::start().await;
        mock.on(
            "POST",
            "/v3/retrieval/rag",
            Reply::json(200, json!({
                "results": {
                    "completion": "X",
                    "search_results": {"chunk_search_results": [{"text": "a"}, {"text": "b"}]}
                }
            })),
        );

        let outcome = mock.client(None).rag("why?", None, None, false).await.unwrap();
        match outcome {
            RagOutcome::Answer(answer) => {
                assert_eq!(answer.answer, "X");
                assert_eq!(answer.sources, 2);
                assert_eq!(answer.query, "why?");
            }
            RagOutcome::Streamed(_) => panic!("expected a parsed answer"),
        }
        let request = mock.last_request();
        assert!(request.query.is_none());
        assert_eq!(request.json(), json!({"query": "why?"}));
    }

    #[tokio::test]
    async fn test_rag_accepts_both_answer_keys() {
        let mock = MockR2r::start().await;
        mock.on(
            "POST",
            "/v3/retrieval/rag",
            Reply::json(200, json!({
                "results": {
                    "generated_answer": "from generated",
                    "completion": "from completion",
                    "search_results": {"chunk_search_results": [{"text": "a"}]}
                }
            })),
        );

        match mock.client(None).rag("q", None, None, false).await.unwrap() {
            RagOutcome::Answer(answer) => {
                assert_eq!(answer.answer, "from completion");
                assert_eq!(answer.sources, 1);
            }
            RagOutcome::Streamed(_) => panic!("expected a parsed answer"),
        }
    }

    #[tokio::test]
    async fn test_rag_generated_answer_only() {
        let mock = MockR2r::start().await;
        mock.on(
            "POST",
            "/v3/retrieval/rag",
            Reply::json(200, json!({"results": {"generated_answer": "Y"}})),
        );

        match mock.client(None).rag("q", None, None, false).await.unwrap() {
            RagOutcome::Answer(answer) => {
                assert_eq!(answer.answer, "Y");
                assert_eq!(answer.sources, 0);
            }
            RagOutcome::Streamed(_) => panic!("expected a parsed answer"),
        }
    }

    #[tokio::test]
    async fn test_rag_null_chunk_results_count_zero() {
        let mock = MockR2r::start().await;
        mock.on(
            "POST",
            "/v3/retrieval/rag",
            Reply::json(200, json!({
                "results": {
                    "completion": "X",
                    "search_results": {"chunk_search_results": null, "graph_search_results": null}
                }
            })),
        );

        match mock.client(None).rag("q", None, None, false).await.unwrap() {
            RagOutcome::Answer(answer) => {
                assert_eq!(answer.answer, "X");
                assert_eq!(answer.sources, 0);
            }
            RagOutcome::Streamed(_) => panic!("expected a parsed answer"),
        }
    }

    #[tokio::test]
    async fn test_rag_forwards_settings() {
        let mock = MockR2r::start().await;
        mock.on(
            "POST",
            "/v3/retrieval/rag",
            Reply::json(200, json!({"results": {"completion": "ok"}})),
        );

        let search = json!({"limit": 5});
        let generation = json!({"model": "openai/gpt-4o-mini", "temperature": 0.1});
        mock.client(None)
            .rag("q", Some(&search), Some(&generation), false)
            .await
            .unwrap();

        let sent = mock.last_request().json();
        assert_eq!(sent["search_settings"], search);
        assert_eq!(sent["rag_generation_config"], generation);
    }

    #[tokio::test]
    async fn test_rag_stream_drains_every_chunk() {
        let mock = MockR2r::start().await;
        mock.on(
            "POST",
            "/v3/retrieval/rag",
            Reply::Chunks(vec!["Hel", "lo ", "World"]),
        );

        let outcome = mock.client(None).rag("greet", None, None, true).await.unwrap();
        match outcome {
            RagOutcome::Streamed(text) => assert_eq!(text, "Hello World"),
            RagOutcome::Answer(_) => panic!("expected streamed text"),
        }
        assert_eq!(mock.last_request().query.as_deref(), Some("stream=true"));
    }

    #[tokio::test]
    async fn test_rag_missing_completion_is_malformed() {
        let mock = MockR2r::start().await;
        mock.on("POST", "/v3/retrieval/rag", Reply::json(200, json!({"results": {}})));

        let err = mock.client(None).rag("q", None, None, false).await.unwrap_err();
        assert!(matches!(err, R2rError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_kg_search_returns_raw_results() {
        let mock = MockR2r::start().await;
        let graph = json!({"graph_search_results": [{"content": {"name": "R2R"}}]});
        mock.on(
            "POST",
            "/v3/retrieval/search",
            Reply::json(200, json!({"results": graph.clone()})),
        );

        let results = mock
            .client(None)
            .kg_search("who builds R2R", KgSearchType::Global)
            .await
            .unwrap();
        assert_eq!(results, graph);

        let sent = mock.last_request().json();
        assert_eq!(
            sent["graph_search_settings"],
            json!({"use_graph_search": true, "kg_search_type": "global"})
        );
    }

    #[tokio::test]
    async fn test_list_documents_query_and_reshape() {
        let mock = MockR2r::start().await;
        mock.on(
            "GET",
            "/v3/documents",
            Reply::json(200, json!({
                "results": [{
                    "id": "d1",
                    "title": "a.pdf",
                    "document_type": "pdf",
                    "ingestion_status": "success",
                    "created_at": "2025-02-01T10:00:00Z",
                    "metadata": {"source": "upload"},
                    "user_id": "u1"
                }]
            })),
        );

        let listing = mock.client(None).list_documents(5, 10).await.unwrap();
        assert_eq!(listing.total, 1);
        assert_eq!(listing.limit, 5);
        assert_eq!(listing.offset, 10);

        let doc = serde_json::to_value(&listing.documents[0]).unwrap();
        assert_eq!(
            doc,
            json!({
                "id": "d1",
                "title": "a.pdf",
                "type": "pdf",
                "status": "success",
                "created": "2025-02-01T10:00:00Z",
                "metadata": {"source": "upload"}
            })
        );
        assert_eq!(mock.last_request().query.as_deref(), Some("limit=5&offset=10"));
    }

    #[tokio::test]
    async fn test_delete_document_path() {
        let mock = MockR2r::start().await;
        mock.on(
            "DELETE",
            "/v3/documents/id1",
            Reply::json(200, json!({"results": {"success": true}})),
        );

        let receipt = mock.client(Some("t")).delete_document("id1").await.unwrap();
        assert_eq!(receipt.document_id, "id1");

        let request = mock.last_request();
        assert_eq!(request.method, "DELETE");
        assert_eq!(request.path, "/v3/documents/id1");
        assert_eq!(request.authorization.as_deref(), Some("Bearer t"));
    }

    #[tokio::test]
    async fn test_delete_rejects_empty_id() {
        let mock = MockR2r::start().await;
        let err = mock.client(None).delete_document("  ").await.unwrap_err();
        assert!(matches!(err, R2rError::InvalidArgument { .. }));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_chunks_multipart() {
        let mock = MockR2r::start().await;
        mock.on(
            "POST",
            "/v3/documents",
            Reply::json(202, json!({"results": {"document_id": "new-doc", "task_id": "t1"}})),
        );

        let receipt = mock
            .client(Some("t"))
            .ingest(IngestRequest {
                source: IngestSource::Chunks(vec!["first".into(), "second".into()]),
                mode: IngestionMode::HiRes,
                metadata: Some(json!({"author": "ops"})),
            })
            .await
            .unwrap();
        assert_eq!(receipt.document_id, "new-doc");
        assert_eq!(receipt.ingestion_mode, IngestionMode::HiRes);

        let request = mock.last_request();
        assert!(request
            .content_type
            .as_deref()
            .unwrap_or_default()
            .starts_with("multipart/form-data"));
        let body = request.body_text();
        assert!(body.contains(r#"name="chunks""#));
        assert!(body.contains(r#"["first","second"]"#));
        assert!(body.contains(r#"name="ingestion_mode""#));
        assert!(body.contains("hi-res"));
        assert!(body.contains(r#"{"author":"ops"}"#));
    }

    #[tokio::test]
    async fn test_ingest_file_streams_contents() {
        let mock = MockR2r::start().await;
        mock.on(
            "POST",
            "/v3/documents",
            Reply::json(200, json!({"results": [{"document_id": "file-doc"}]})),
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "quarterly numbers").unwrap();

        let receipt = mock
            .client(None)
            .ingest(IngestRequest {
                source: IngestSource::File(path),
                mode: IngestionMode::Fast,
                metadata: None,
            })
            .await
            .unwrap();
        assert_eq!(receipt.document_id, "file-doc");

        let body = mock.last_request().body_text();
        assert!(body.contains(r#"name="file"; filename="notes.txt""#));
        assert!(body.contains("quarterly numbers"));
        assert!(body.contains("fast"));
        assert!(!body.contains(r#"name="metadata""#));
    }

    #[tokio::test]
    async fn test_ingest_missing_file_never_sends() {
        let mock = MockR2r::start().await;
        let err = mock
            .client(None)
            .ingest(IngestRequest {
                source: IngestSource::File(PathBuf::from("/definitely/not/here.pdf")),
                mode: IngestionMode::Fast,
                metadata: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, R2rError::FileNotFound { .. }));
        assert!(err.to_string().contains("not found"));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_carries_body() {
        let mock = MockR2r::start().await;
        mock.on(
            "POST",
            "/v3/retrieval/search",
            Reply::text(503, "upstream embedding provider down"),
        );

        let err = mock.client(None).search("q", settings(10)).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        let text = err.to_string();
        assert!(text.contains("503"));
        assert!(text.contains("upstream embedding provider down"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let client = R2rClient::new(Session::new("http://127.0.0.1:1", None)).unwrap();
        let err = client.list_documents(1, 0).await.unwrap_err();
        assert!(matches!(err, R2rError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_invalid_json_is_malformed() {
        let mock = MockR2r::start().await;
        mock.on("GET", "/v3/documents", Reply::text(200, "<html>gateway</html>"));

        let err = mock.client(None).list_documents(1, 0).await.unwrap_err();
        assert!(matches!(err, R2rError::MalformedResponse { .. }));
    }
}
