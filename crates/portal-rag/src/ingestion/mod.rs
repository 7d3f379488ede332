//! Batch document ingestion: staging, extraction, chunking, indexing
//!
//! A batch runs against one session. Individual files that cannot be used
//! (unsupported type, unreadable content, oversize) are skipped with a
//! warning; only a batch that produces no text at all fails. The session's
//! vector index is rebuilt from the full batch and atomically replaces any
//! previous index.

pub mod chunker;
pub mod parser;

pub use chunker::TextChunker;
pub use parser::{FileParser, PageBlock, ParsedDocument};

use std::fs;

use chrono::Utc;
use uuid::Uuid;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::index::VectorIndex;
use crate::providers::EmbeddingProvider;
use crate::session::SessionHandle;
use crate::types::{Chunk, FileType, SourceFile, StagedDocument};

/// Outcome of one ingestion batch
#[derive(Debug)]
pub struct IngestReport {
    /// Session the batch ran against
    pub session_id: String,
    /// Documents that were staged and extracted
    pub documents: Vec<StagedDocument>,
    /// Total chunks indexed across the batch
    pub chunk_count: usize,
    /// Files skipped with the reason for each
    pub skipped: Vec<SkippedFile>,
}

/// A file dropped from a batch
#[derive(Debug)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// Ingestion pipeline for one configured deployment
pub struct DocumentIngestor {
    chunker: TextChunker,
    max_file_size: u64,
}

impl DocumentIngestor {
    /// Create an ingestor from configuration
    pub fn new(config: &RagConfig) -> Self {
        Self {
            chunker: TextChunker::new(&config.chunking),
            max_file_size: config.ingest.max_file_size,
        }
    }

    /// Ingest a batch of files into a session and rebuild its index
    pub async fn ingest(
        &self,
        session: &SessionHandle,
        files: Vec<SourceFile>,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<IngestReport> {
        let mut documents = Vec::new();
        let mut all_chunks: Vec<Chunk> = Vec::new();
        let mut skipped = Vec::new();

        for file in files {
            match self.ingest_file(session, &file) {
                Ok((doc, chunks)) => {
                    documents.push(doc);
                    all_chunks.extend(chunks);
                }
                Err(e) if e.is_file_local() => {
                    tracing::warn!(
                        session_id = %session.id,
                        filename = %file.filename,
                        "Skipping file: {}",
                        e
                    );
                    skipped.push(SkippedFile {
                        filename: file.filename,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        if all_chunks.is_empty() {
            return Err(Error::NoIngestibleContent {
                session_id: session.id.clone(),
            });
        }

        tracing::info!(
            session_id = %session.id,
            documents = documents.len(),
            chunks = all_chunks.len(),
            skipped = skipped.len(),
            "Batch extracted, building index"
        );

        let index = VectorIndex::build(all_chunks, embedder).await?;
        let chunk_count = index.chunk_count();
        index.persist(&session.index_dir)?;

        Ok(IngestReport {
            session_id: session.id.clone(),
            documents,
            chunk_count,
            skipped,
        })
    }

    /// Stage, extract, and chunk a single file
    fn ingest_file(
        &self,
        session: &SessionHandle,
        file: &SourceFile,
    ) -> Result<(StagedDocument, Vec<Chunk>)> {
        let extension = file.extension();
        let file_type = FileType::from_extension(&extension);
        if !file_type.is_supported() {
            return Err(Error::UnsupportedFileType {
                filename: file.filename.clone(),
                extension,
            });
        }

        let size = file.data.len() as u64;
        if size > self.max_file_size {
            return Err(Error::unreadable(
                &file.filename,
                format!("{} bytes exceeds ingest limit of {}", size, self.max_file_size),
            ));
        }

        // Stage under a unique internal name; extraction runs against the
        // staged copy, which doubles as the audit trail.
        let staged_filename = format!(
            "{}.{}",
            &Uuid::new_v4().simple().to_string()[..8],
            extension
        );
        let staged_path = session.staging_dir.join(&staged_filename);
        fs::write(&staged_path, &file.data).map_err(|e| Error::storage(&staged_path, e))?;
        let staged_data = fs::read(&staged_path).map_err(|e| Error::storage(&staged_path, e))?;

        let parsed = FileParser::parse(&file.filename, &staged_data)?;

        let doc_id = Uuid::new_v4();
        let chunks = self.chunker.split(doc_id, &file.filename, &parsed.pages);

        tracing::info!(
            session_id = %session.id,
            filename = %file.filename,
            staged_as = %staged_filename,
            pages = parsed.pages.len(),
            chunks = chunks.len(),
            "File staged and extracted"
        );

        let doc = StagedDocument {
            id: doc_id,
            filename: file.filename.clone(),
            staged_filename,
            file_type: parsed.file_type,
            content_hash: parsed.content_hash.clone(),
            file_size: size,
            page_count: parsed.page_count,
            total_chunks: chunks.len() as u32,
            ingested_at: Utc::now(),
        };

        Ok((doc, chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::session::SessionManager;
    use crate::test_util::HashEmbedder;

    fn setup(tmp: &tempfile::TempDir) -> (DocumentIngestor, SessionHandle) {
        let mut config = RagConfig::default();
        config.storage = StorageConfig {
            data_dir: tmp.path().join("data"),
            index_dir: tmp.path().join("index"),
        };
        let manager = SessionManager::new(&config.storage).unwrap();
        let session = manager.create_session().unwrap();
        (DocumentIngestor::new(&config), session)
    }

    #[tokio::test]
    async fn test_ingest_builds_and_persists_index() {
        let tmp = tempfile::tempdir().unwrap();
        let (ingestor, session) = setup(&tmp);
        let embedder = HashEmbedder::new(64);

        let files = vec![
            SourceFile::new("notes.txt", b"cats are mammals".to_vec()),
            SourceFile::new("science.md", b"rockets use fuel".to_vec()),
        ];

        let report = ingestor.ingest(&session, files, &embedder).await.unwrap();
        assert_eq!(report.documents.len(), 2);
        assert_eq!(report.chunk_count, 2);
        assert!(report.skipped.is_empty());
        assert!(VectorIndex::exists(&session.index_dir));
    }

    #[tokio::test]
    async fn test_staged_copies_land_in_session_staging_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let (ingestor, session) = setup(&tmp);
        let embedder = HashEmbedder::new(64);

        let files = vec![SourceFile::new("notes.txt", b"some staged text".to_vec())];
        let report = ingestor.ingest(&session, files, &embedder).await.unwrap();

        let staged = &report.documents[0].staged_filename;
        assert!(staged.ends_with(".txt"));
        assert_ne!(staged, "notes.txt");
        assert!(session.staging_dir.join(staged).is_file());
    }

    #[tokio::test]
    async fn test_bad_file_in_batch_is_skipped_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let (ingestor, session) = setup(&tmp);
        let embedder = HashEmbedder::new(64);

        let files = vec![
            SourceFile::new("good.txt", b"usable text".to_vec()),
            SourceFile::new("bad.txt", vec![0xff, 0xfe]),
            SourceFile::new("image.png", vec![0x89, 0x50]),
        ];

        let report = ingestor.ingest(&session, files, &embedder).await.unwrap();
        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.skipped.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let (ingestor, session) = setup(&tmp);
        let embedder = HashEmbedder::new(64);

        let files = vec![
            SourceFile::new("bad.txt", vec![0xff, 0xfe]),
            SourceFile::new("image.png", vec![0x89, 0x50]),
        ];

        let err = ingestor.ingest(&session, files, &embedder).await.unwrap_err();
        assert!(matches!(err, Error::NoIngestibleContent { .. }));
    }

    #[tokio::test]
    async fn test_oversize_file_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = RagConfig::default();
        config.storage = StorageConfig {
            data_dir: tmp.path().join("data"),
            index_dir: tmp.path().join("index"),
        };
        config.ingest.max_file_size = 8;
        let manager = SessionManager::new(&config.storage).unwrap();
        let session = manager.create_session().unwrap();
        let ingestor = DocumentIngestor::new(&config);
        let embedder = HashEmbedder::new(64);

        let files = vec![
            SourceFile::new("small.txt", b"tiny".to_vec()),
            SourceFile::new("huge.txt", b"way past the configured limit".to_vec()),
        ];

        let report = ingestor.ingest(&session, files, &embedder).await.unwrap();
        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("limit"));
    }

    #[tokio::test]
    async fn test_chunks_never_span_documents() {
        let tmp = tempfile::tempdir().unwrap();
        let (ingestor, session) = setup(&tmp);
        let embedder = HashEmbedder::new(64);

        let a = "a".repeat(1500);
        let b = "b".repeat(1500);
        let files = vec![
            SourceFile::new("a.txt", a.into_bytes()),
            SourceFile::new("b.txt", b.into_bytes()),
        ];

        let report = ingestor.ingest(&session, files, &embedder).await.unwrap();
        let index = VectorIndex::load(&session.index_dir, &embedder).unwrap();
        let results = index.query("anything", 100, &embedder).await.unwrap();

        assert_eq!(report.documents.len(), 2);
        for result in results {
            let mixed =
                result.chunk.text.contains('a') && result.chunk.text.contains('b');
            assert!(!mixed, "chunk spans two documents");
        }
    }

    #[tokio::test]
    async fn test_reingest_replaces_index() {
        let tmp = tempfile::tempdir().unwrap();
        let (ingestor, session) = setup(&tmp);
        let embedder = HashEmbedder::new(64);

        let first = vec![SourceFile::new("one.txt", b"first batch".to_vec())];
        ingestor.ingest(&session, first, &embedder).await.unwrap();

        let second = vec![SourceFile::new("two.txt", b"second batch".to_vec())];
        ingestor.ingest(&session, second, &embedder).await.unwrap();

        let index = VectorIndex::load(&session.index_dir, &embedder).unwrap();
        assert_eq!(index.chunk_count(), 1);
        let results = index.query("second batch", 5, &embedder).await.unwrap();
        assert_eq!(results[0].chunk.filename, "two.txt");
    }
}
