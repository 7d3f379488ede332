//! portal-rag: session-scoped document chat pipeline
//!
//! Ingests heterogeneous documents (PDF/DOCX/TXT/MD) into isolated sessions,
//! chunks and embeds them into a persisted per-session vector index, and
//! answers natural-language questions against that index with multi-turn
//! conversation history. Embedding and generation are injected capabilities
//! behind provider traits; Ollama-backed implementations are included.

pub mod config;
pub mod error;
pub mod generation;
pub mod history;
pub mod index;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_util;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use history::{ConversationStore, ConversationTurn, Role};
pub use index::{SearchResult, VectorIndex};
pub use ingestion::{DocumentIngestor, IngestReport};
pub use retrieval::{ChatAnswer, ConversationalRetriever, SourceAttribution};
pub use session::{SessionHandle, SessionManager};
pub use types::{Chunk, FileType, SourceFile, StagedDocument};
