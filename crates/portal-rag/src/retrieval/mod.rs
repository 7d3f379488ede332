//! History-aware retrieval orchestration
//!
//! A query walks Received -> Rewritten -> Retrieved -> Answered. The
//! follow-up question is condensed against the session transcript into a
//! standalone query, the session index is searched, and the answer is
//! synthesized from the retrieved chunks. Both turns of the exchange are
//! committed to history only after the answer exists; a failure at any phase
//! leaves the transcript untouched.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::history::ConversationStore;
use crate::index::{SearchResult, VectorIndex};
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::session::SessionManager;

/// Answer returned when retrieval finds nothing relevant
const NO_CONTEXT_ANSWER: &str =
    "No relevant context was found in this session's documents for that question.";

/// Phases of a single query, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryPhase {
    Received,
    Rewritten,
    Retrieved,
    Answered,
}

/// Where a retrieved chunk came from
#[derive(Debug, Clone)]
pub struct SourceAttribution {
    /// Original filename of the source document
    pub filename: String,
    /// First page ordinal the chunk covers
    pub page_start: Option<u32>,
    /// Last page ordinal the chunk covers
    pub page_end: Option<u32>,
    /// Similarity score of the match
    pub score: f32,
}

impl SourceAttribution {
    fn from_result(result: &SearchResult) -> Self {
        Self {
            filename: result.chunk.filename.clone(),
            page_start: result.chunk.page_start,
            page_end: result.chunk.page_end,
            score: result.score,
        }
    }
}

/// Completed answer for one query
#[derive(Debug, Clone)]
pub struct ChatAnswer {
    /// Session the query ran against
    pub session_id: String,
    /// Answer text; may be empty if the generator returned nothing
    pub answer: String,
    /// The self-contained query actually searched; equals the raw question
    /// when the session had no history
    pub rewritten_query: String,
    /// Sources of the retrieved chunks, ranked by similarity
    pub sources: Vec<SourceAttribution>,
    /// Set when retrieval returned zero chunks
    pub no_context: bool,
}

/// Composes query rewriting, index search, and answer synthesis
pub struct ConversationalRetriever {
    sessions: SessionManager,
    history: Arc<ConversationStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    top_k: usize,
}

impl ConversationalRetriever {
    /// Create a retriever over an existing session layout and history store
    pub fn new(
        sessions: SessionManager,
        history: Arc<ConversationStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            sessions,
            history,
            embedder,
            llm,
            top_k,
        }
    }

    /// Answer a question against a session's index and transcript
    pub async fn ask(&self, session_id: &str, question: &str) -> Result<ChatAnswer> {
        let mut phase = QueryPhase::Received;
        tracing::debug!(session_id, ?phase, "Query received");

        let session = self.sessions.resolve(session_id);
        if !session.exists() {
            return Err(Error::UnknownSession {
                session_id: session_id.to_string(),
            });
        }
        let index = VectorIndex::load(&session.index_dir, self.embedder.as_ref())?;

        phase = QueryPhase::Rewritten;
        let rewritten = self.rewrite(session_id, question).await?;
        tracing::debug!(session_id, ?phase, query = %rewritten, "Query rewritten");

        phase = QueryPhase::Retrieved;
        let results = index
            .query(&rewritten, self.top_k, self.embedder.as_ref())
            .await?;
        tracing::debug!(session_id, ?phase, chunks = results.len(), "Chunks retrieved");

        let no_context = results.is_empty();
        let answer = if no_context {
            tracing::info!(session_id, "No relevant chunks, answering without context");
            NO_CONTEXT_ANSWER.to_string()
        } else {
            let context = PromptBuilder::build_context(&results);
            let prompt = PromptBuilder::build_answer_prompt(&rewritten, &context);
            let answer = self.llm.generate(&prompt).await.map_err(|e| {
                tracing::error!(session_id, "Answer generation failed: {}", e);
                e
            })?;
            if answer.trim().is_empty() {
                tracing::warn!(session_id, "Generator returned an empty answer");
            }
            answer
        };

        phase = QueryPhase::Answered;
        // Both turns land only now that the answer exists
        self.history.append_exchange(session_id, question, &answer);
        tracing::debug!(session_id, ?phase, "Exchange committed to history");

        Ok(ChatAnswer {
            session_id: session_id.to_string(),
            answer,
            rewritten_query: rewritten,
            sources: results.iter().map(SourceAttribution::from_result).collect(),
            no_context,
        })
    }

    /// Condense the question against session history into a standalone query
    ///
    /// With no history the question passes through untouched.
    async fn rewrite(&self, session_id: &str, question: &str) -> Result<String> {
        let history = self.history.history(session_id);
        if history.is_empty() {
            return Ok(question.to_string());
        }

        let prompt = PromptBuilder::build_condense_prompt(&history, question);
        let rewritten = self.llm.generate(&prompt).await.map_err(|e| {
            tracing::error!(session_id, "Query rewrite failed: {}", e);
            e
        })?;

        let rewritten = rewritten.trim();
        if rewritten.is_empty() {
            tracing::warn!(session_id, "Empty rewrite, falling back to raw question");
            Ok(question.to_string())
        } else {
            Ok(rewritten.to_string())
        }
    }

    /// History store handle
    pub fn history(&self) -> &Arc<ConversationStore> {
        &self.history
    }
}
