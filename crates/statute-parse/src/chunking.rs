//! Provision-aware chunking for retrieval.
//!
//! Articles and clauses are already small and always stay whole. Parts,
//! chapters and sections whose body exceeds the size limit are split with a
//! separator-aware recursive splitter. Sizes are counted in characters.

use serde::Serialize;
use statute_core::{Level, ParserConfig, Provision};

/// A retrieval chunk carrying its provision's structural metadata.
#[derive(Debug, Clone, Serialize)]
pub struct LegalChunk {
    pub id: String,
    pub content: String,
    pub document_id: String,
    pub chunk_order: usize,
    pub token_estimate: usize,
    pub provision_id: String,
    pub level: Level,
    pub ordinal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub hierarchy_path: Vec<String>,
    /// Position among the parts of a split provision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part: Option<usize>,
}

/// Rough token count: four characters per token.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Splitter that prefers paragraph, then line, then sentence, then word breaks.
pub struct RecursiveSplitter {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    separators: Vec<&'static str>,
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
            separators: vec!["\n\n", "\n", ". ", " "],
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_text(text, &self.separators)
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }

    fn split_text(&self, text: &str, separators: &[&'static str]) -> Vec<String> {
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }
        let Some((&separator, remaining)) = separators.split_first() else {
            return self.hard_split(text);
        };

        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for piece in text.split(separator) {
            if char_len(piece) > self.chunk_size {
                if !current.is_empty() {
                    chunks.push(current.join(separator));
                    current.clear();
                }
                chunks.extend(self.split_text(piece, remaining));
                continue;
            }

            current.push(piece);
            if joined_len(&current, separator) > self.chunk_size && current.len() > 1 {
                current.pop();
                chunks.push(current.join(separator));
                // Keep a tail of the flushed chunk as overlap, if it still fits.
                while !current.is_empty()
                    && (joined_len(&current, separator) > self.chunk_overlap
                        || char_len(piece) + char_len(separator) + joined_len(&current, separator)
                            > self.chunk_size)
                {
                    current.remove(0);
                }
                current.push(piece);
            }
        }

        if !current.is_empty() {
            chunks.push(current.join(separator));
        }
        chunks
    }

    /// Fixed-width character windows, used when no separator is left.
    fn hard_split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let step = self.chunk_size - self.chunk_overlap;
        let mut out = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            out.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
        out
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn joined_len(parts: &[&str], separator: &str) -> usize {
    let pieces: usize = parts.iter().map(|p| char_len(p)).sum();
    pieces + char_len(separator) * parts.len().saturating_sub(1)
}

/// Turns provisions into retrieval chunks.
pub struct LegalChunker {
    splitter: RecursiveSplitter,
}

impl LegalChunker {
    pub fn new(max_chunk_chars: usize, overlap_chars: usize) -> Self {
        Self {
            splitter: RecursiveSplitter::new(max_chunk_chars, overlap_chars),
        }
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new(config.max_chunk_chars, config.chunk_overlap_chars)
    }

    /// Chunk every provision of a document, in document order.
    pub fn chunk_document(&self, provisions: &[Provision], document_id: &str) -> Vec<LegalChunk> {
        provisions
            .iter()
            .flat_map(|p| self.chunk_provision(p, document_id))
            .collect()
    }

    pub fn chunk_provision(&self, provision: &Provision, document_id: &str) -> Vec<LegalChunk> {
        let whole = matches!(provision.level, Level::Article | Level::Clause)
            || char_len(&provision.body) <= self.splitter.chunk_size;
        if whole {
            return vec![self.make_chunk(
                provision,
                document_id,
                format!("chunk-{}", provision.id),
                provision.body.clone(),
                0,
                None,
            )];
        }

        self.splitter
            .split(&provision.body)
            .into_iter()
            .enumerate()
            .map(|(i, content)| {
                self.make_chunk(
                    provision,
                    document_id,
                    format!("chunk-{}-{}", provision.id, i),
                    content,
                    i,
                    Some(i),
                )
            })
            .collect()
    }

    fn make_chunk(
        &self,
        provision: &Provision,
        document_id: &str,
        id: String,
        content: String,
        chunk_order: usize,
        part: Option<usize>,
    ) -> LegalChunk {
        LegalChunk {
            id,
            token_estimate: estimate_tokens(&content),
            content,
            document_id: document_id.to_string(),
            chunk_order,
            provision_id: provision.id.clone(),
            level: provision.level,
            ordinal: provision.ordinal.clone(),
            title: provision.title.clone(),
            hierarchy_path: provision.hierarchy_path.clone(),
            part,
        }
    }
}

impl Default for LegalChunker {
    fn default() -> Self {
        Self::from_config(&ParserConfig::default())
    }
}
