//! Prompt templates for query rewriting and answer synthesis

use crate::history::{ConversationTurn, Role};
use crate::index::SearchResult;

/// Prompt builder for retrieval queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build context from search results
    pub fn build_context(results: &[SearchResult]) -> String {
        let mut context = String::new();

        for (i, result) in results.iter().enumerate() {
            context.push_str(&format!(
                "[{}] {}\n\nContent:\n{}\n\n---\n\n",
                i + 1,
                Self::format_source_ref(result),
                result.chunk.text
            ));
        }

        context
    }

    /// Format source reference for context
    fn format_source_ref(result: &SearchResult) -> String {
        let mut parts = vec![result.chunk.filename.clone()];

        match (result.chunk.page_start, result.chunk.page_end) {
            (Some(start), Some(end)) if start != end => {
                parts.push(format!("Pages {}-{}", start, end));
            }
            (Some(page), _) => {
                parts.push(format!("Page {}", page));
            }
            _ => {}
        }

        parts.join(", ")
    }

    /// Build the prompt that condenses history plus a follow-up question into
    /// a single self-contained query
    pub fn build_condense_prompt(history: &[ConversationTurn], question: &str) -> String {
        let transcript = history
            .iter()
            .map(|turn| {
                let speaker = match turn.role {
                    Role::User => "User",
                    Role::Assistant => "Assistant",
                };
                format!("{}: {}", speaker, turn.text)
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"Given the conversation so far and a follow-up question, rewrite the follow-up question as a single self-contained question that can be understood without the conversation. Do NOT answer the question; return only the rewritten question.

Conversation:
{transcript}

Follow-up question: {question}

Standalone question:"#,
            transcript = transcript,
            question = question
        )
    }

    /// Build the context-grounded question-answering prompt
    pub fn build_answer_prompt(question: &str, context: &str) -> String {
        format!(
            r#"Based on the following context, answer the question. Only use information from the context. If the answer is not in the context, say that the information is not available in the provided documents.

Context:
{context}

Question: {question}

Answer:"#,
            context = context,
            question = question
        )
    }
}
