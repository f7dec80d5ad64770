use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// One occurrence of a token: the text it came from and its byte range in that text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenPosition {
    pub content_id: String,
    pub start: u32,
    pub length: u32,
}

impl TokenPosition {
    pub fn new(content_id: impl Into<String>, start: u32, length: u32) -> Self {
        Self { content_id: content_id.into(), start, length }
    }
}

/// A normalized term and every place it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub content: String,
    pub positions: Vec<TokenPosition>,
}

impl Token {
    pub fn new(content: impl Into<String>, positions: Vec<TokenPosition>) -> Self {
        Self { content: content.into(), positions }
    }
}

/// Occurrences of one term within one document.
pub type Posting = Vec<TokenPosition>;

/// Document id -> occurrences of one term in that document.
pub type PostingList = HashMap<String, Posting>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TfidfResult {
    pub document_id: String,
    pub posting: Posting,
    pub score: f32,
}

/// In-memory inverted index with a lazily rebuilt TF-IDF cache.
///
/// Adding or removing documents only touches the dictionary and document lengths and
/// records which terms went stale. `build_inverted_index` refreshes the cache; until
/// then `get_tfidf` keeps serving the previous scores.
///
/// Cloning deep-copies every table.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    dictionary: HashMap<String, PostingList>,
    // Number of tokens per document; one entry per indexed document.
    doc_length: HashMap<String, u32>,
    terms_to_be_updated: HashSet<String>,
    tfidf_cache: HashMap<String, Vec<TfidfResult>>,
    num_docs_from_last_update: u32,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Document id and positions of every occurrence of `term`. Empty if the term is unknown.
    pub fn find_term(&self, term: &str) -> PostingList {
        self.dictionary.get(term).cloned().unwrap_or_default()
    }

    /// Indexed terms that extend `prefix`, not including `prefix` itself. Unordered.
    pub fn terms_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.dictionary
            .keys()
            .filter(move |term| term.len() > prefix.len() && term.starts_with(prefix))
            .map(String::as_str)
    }

    /// Indexes `tokens` under `document_id`, replacing any previous version of the document.
    ///
    /// Every token is expected to have distinct `content`; the caller consolidates first.
    /// If a content value does repeat, the last token wins.
    pub fn add_document(&mut self, document_id: &str, tokens: &[Token]) {
        self.remove_document(document_id);

        for token in tokens {
            let previous = self
                .dictionary
                .entry(token.content.clone())
                .or_default()
                .insert(document_id.to_string(), token.positions.clone());
            if previous.is_some() {
                debug!(document_id, term = %token.content, "duplicate token content, keeping the last one");
            }
            self.terms_to_be_updated.insert(token.content.clone());
        }
        self.doc_length.insert(document_id.to_string(), tokens.len() as u32);
        debug!(document_id, num_tokens = tokens.len(), "added document");
    }

    /// Removes `document_id` and all its postings. Unknown ids are ignored.
    pub fn remove_document(&mut self, document_id: &str) {
        if self.doc_length.remove(document_id).is_none() {
            return;
        }
        let stale = &mut self.terms_to_be_updated;
        self.dictionary.retain(|term, postings| {
            if postings.remove(document_id).is_some() {
                stale.insert(term.clone());
            }
            !postings.is_empty()
        });
        debug!(document_id, "removed document");
    }

    /// Cached TF-IDF scores for `term`, as of the last build.
    pub fn get_tfidf(&self, term: &str) -> &[TfidfResult] {
        self.tfidf_cache.get(term).map(Vec::as_slice).unwrap_or_default()
    }

    /// Recomputes the scores of every stale term. When the number of documents changed
    /// since the last build, every term's IDF moved as well, so all terms are rescored.
    pub fn build_inverted_index(&mut self) {
        let num_docs = self.doc_length.len() as u32;
        let full_rebuild = num_docs != self.num_docs_from_last_update;
        if full_rebuild {
            self.terms_to_be_updated.extend(self.dictionary.keys().cloned());
            // Terms that disappeared entirely are already in the stale set.
        }
        let stale = std::mem::take(&mut self.terms_to_be_updated);
        let num_stale = stale.len();
        for term in stale {
            let results = self.calculate_tfidf(&term);
            if results.is_empty() {
                self.tfidf_cache.remove(&term);
            } else {
                self.tfidf_cache.insert(term, results);
            }
        }
        self.num_docs_from_last_update = num_docs;
        info!(num_docs, num_terms = self.dictionary.len(), num_stale, full_rebuild, "built inverted index");
    }

    /// `true` when no term has a stale TF-IDF score.
    ///
    /// Adding or removing a document without tokens changes the document count, and so every
    /// IDF, without marking any term stale: this still reports `true` until the next
    /// `build_inverted_index`, which detects the count change and rescores all terms.
    pub fn is_inverted_index_built(&self) -> bool { self.terms_to_be_updated.is_empty() }

    pub fn num_documents(&self) -> usize { self.doc_length.len() }

    pub fn num_terms(&self) -> usize { self.dictionary.len() }

    pub fn num_docs_from_last_update(&self) -> u32 { self.num_docs_from_last_update }

    /// Token count recorded for `document_id`.
    pub fn document_length(&self, document_id: &str) -> Option<u32> {
        self.doc_length.get(document_id).copied()
    }

    pub fn contains_document(&self, document_id: &str) -> bool {
        self.doc_length.contains_key(document_id)
    }

    /// tf = occurrences / document length (0 for empty documents), idf = ln(N / df),
    /// with N the current number of documents.
    pub(crate) fn calculate_tfidf(&self, term: &str) -> Vec<TfidfResult> {
        let Some(postings) = self.dictionary.get(term) else {
            return Vec::new();
        };
        let num_docs = self.doc_length.len();
        let idf = if num_docs == 0 || postings.is_empty() {
            0.0
        } else {
            (num_docs as f32 / postings.len() as f32).ln()
        };

        postings
            .iter()
            .map(|(document_id, posting)| {
                let length = self.doc_length.get(document_id).copied().unwrap_or(0);
                let tf = if length == 0 { 0.0 } else { posting.len() as f32 / length as f32 };
                TfidfResult { document_id: document_id.clone(), posting: posting.clone(), score: tf * idf }
            })
            .collect()
    }
}
