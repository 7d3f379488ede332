//! Multi-format file parser
//!
//! Dispatches on the declared extension and yields ordered page blocks.
//! Blank pages are omitted from the output but still consume their ordinal,
//! so an all-blank PDF parses to zero blocks without an error.

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::FileType;

/// Parsed document with extracted text blocks and metadata
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// File type
    pub file_type: FileType,
    /// Non-blank text blocks in ascending ordinal order
    pub pages: Vec<PageBlock>,
    /// Total page ordinals the document consumed (including blank pages)
    pub page_count: u32,
    /// Hash of the extracted text for audit and deduplication
    pub content_hash: String,
}

impl ParsedDocument {
    /// Whether extraction produced any usable text
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Text extracted from a single page ordinal
#[derive(Debug, Clone)]
pub struct PageBlock {
    /// Page number (1-indexed)
    pub ordinal: u32,
    /// Text content of the page
    pub text: String,
}

/// Multi-format file parser
pub struct FileParser;

impl FileParser {
    /// Parse a file based on its extension
    pub fn parse(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        let file_type = FileType::from_extension(&extension);

        match file_type {
            FileType::Pdf => Self::parse_pdf(filename, data),
            FileType::Docx => Self::parse_docx(filename, data),
            FileType::Txt | FileType::Markdown => Self::parse_text(filename, data, file_type),
            FileType::Unknown => Err(Error::UnsupportedFileType {
                filename: filename.to_string(),
                extension,
            }),
        }
    }

    /// Parse PDF page by page
    fn parse_pdf(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::unreadable(filename, format!("failed to load PDF: {}", e)))?;

        if doc.is_encrypted() {
            return Err(Error::unreadable(filename, "PDF is encrypted"));
        }

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        let mut pages = Vec::new();

        for page_number in &page_numbers {
            // An unextractable page keeps its ordinal but yields no block
            let text = match doc.extract_text(&[*page_number]) {
                Ok(text) => text,
                Err(e) => {
                    tracing::debug!(
                        filename,
                        page = page_number,
                        "Page extraction failed: {}",
                        e
                    );
                    continue;
                }
            };

            let text = Self::normalize_pdf_text(&text);
            if text.trim().is_empty() {
                continue;
            }

            pages.push(PageBlock {
                ordinal: *page_number,
                text,
            });
        }

        Ok(ParsedDocument {
            file_type: FileType::Pdf,
            content_hash: hash_blocks(&pages),
            page_count: page_numbers.len() as u32,
            pages,
        })
    }

    /// Strip null chars and collapse ragged line endings from extracted PDF text
    fn normalize_pdf_text(text: &str) -> String {
        text.replace('\0', "")
            .lines()
            .map(|l| l.trim_end())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parse DOCX as a single logical block
    fn parse_docx(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let doc = docx_rs::read_docx(data)
            .map_err(|e| Error::unreadable(filename, e.to_string()))?;

        let mut content = String::new();

        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                for child in p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                content.push_str(&t.text);
                            }
                        }
                    }
                }
                content.push('\n');
            }
        }

        let pages = if content.trim().is_empty() {
            Vec::new()
        } else {
            vec![PageBlock {
                ordinal: 1,
                text: content,
            }]
        };

        Ok(ParsedDocument {
            file_type: FileType::Docx,
            content_hash: hash_blocks(&pages),
            page_count: 1,
            pages,
        })
    }

    /// Parse plain text or markdown with strict UTF-8 decoding
    fn parse_text(filename: &str, data: &[u8], file_type: FileType) -> Result<ParsedDocument> {
        let content = std::str::from_utf8(data)
            .map_err(|e| Error::unreadable(filename, format!("invalid UTF-8: {}", e)))?;

        let pages = if content.trim().is_empty() {
            Vec::new()
        } else {
            vec![PageBlock {
                ordinal: 1,
                text: content.to_string(),
            }]
        };

        Ok(ParsedDocument {
            file_type,
            content_hash: hash_blocks(&pages),
            page_count: 1,
            pages,
        })
    }
}

/// Hash extracted blocks for deduplication
fn hash_blocks(pages: &[PageBlock]) -> String {
    let mut hasher = Sha256::new();
    for page in pages {
        hasher.update(page.text.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
