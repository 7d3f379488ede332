//! End-to-end demonstration: ingest files into a fresh session, then chat.
//!
//! Requires a running Ollama with the configured embedding and generation
//! models pulled:
//!
//! ```text
//! cargo run --example chat -- notes.pdf report.docx readme.md
//! ```

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use portal_rag::providers::OllamaProvider;
use portal_rag::{ConversationalRetriever, ConversationStore, DocumentIngestor, RagConfig,
    SessionManager, SourceFile};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portal_rag=info".into()),
        )
        .init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        bail!("usage: chat <file>...");
    }

    let config = RagConfig::default();
    let provider = OllamaProvider::new(&config.llm, config.embeddings.dimensions)?;
    if !provider.health_check().await? {
        bail!(
            "Ollama is not reachable at {} - start it with `ollama serve`",
            config.llm.base_url
        );
    }
    let (embedder, llm) = provider.split();
    let embedder = Arc::new(embedder);

    let sessions = SessionManager::new(&config.storage)?;
    let session = sessions.create_session()?;

    let mut files = Vec::new();
    for path in &paths {
        let data = std::fs::read(path).with_context(|| format!("cannot read '{}'", path))?;
        let filename = std::path::Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        files.push(SourceFile::new(filename, data));
    }

    let ingestor = DocumentIngestor::new(&config);
    let report = ingestor
        .ingest(&session, files, embedder.as_ref())
        .await?;
    println!(
        "Ingested {} document(s) into session {} ({} chunks, {} skipped)",
        report.documents.len(),
        report.session_id,
        report.chunk_count,
        report.skipped.len()
    );
    for skip in &report.skipped {
        println!("  skipped {}: {}", skip.filename, skip.reason);
    }

    let rag = ConversationalRetriever::new(
        sessions,
        Arc::new(ConversationStore::new()),
        embedder,
        Arc::new(llm),
        config.retrieval.top_k,
    );

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut question = String::new();
        if stdin.lock().read_line(&mut question)? == 0 {
            break;
        }
        let question = question.trim();
        if question.is_empty() || question == "exit" {
            break;
        }

        let answer = rag.ask(&session.id, question).await?;
        println!("\n{}\n", answer.answer);
        for source in &answer.sources {
            match (source.page_start, source.page_end) {
                (Some(start), Some(end)) if start != end => {
                    println!("  [{} pages {}-{}, score {:.3}]", source.filename, start, end, source.score);
                }
                (Some(page), _) => {
                    println!("  [{} page {}, score {:.3}]", source.filename, page, source.score);
                }
                _ => println!("  [{}, score {:.3}]", source.filename, source.score),
            }
        }
        println!();
    }

    Ok(())
}
