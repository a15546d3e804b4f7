//! Client for the R2R retrieval service.

pub mod client;
pub mod errors;
pub mod session;
pub mod streaming;
pub mod types;

pub use client::{IngestRequest, IngestSource, R2rClient};
pub use errors::R2rError;
pub use session::Session;
pub use types::{
    DeletionReceipt, DocumentListing, DocumentSummary, IngestReceipt, IngestionMode,
    IngestionStatus, KgSearchType, LoginOutcome, RagAnswer, RagOutcome, RankedChunk,
    SearchMode, SearchReport, SearchSettings,
};
