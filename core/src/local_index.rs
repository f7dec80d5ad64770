use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{Result, SearchError};
use crate::index::{InvertedIndex, Posting, Token};
use crate::normalizer::normalize;
use crate::tokenizer::{consolidate_token, extract_content};

const MAX_RESULTS_CAP: usize = 100;

/// One indexable string of a document, e.g. one alternate phrasing of a settings entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub id: String,
    pub content: String,
}

impl Content {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self { id: id.into(), content: content.into() }
    }
}

/// A logical document made of several contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    pub id: String,
    pub contents: Vec<Content>,
}

impl Data {
    pub fn new(id: impl Into<String>, contents: Vec<Content>) -> Self {
        Self { id: id.into(), contents }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Locale used to pick stopwords while extracting document contents.
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for IndexConfig {
    fn default() -> Self { Self { locale: default_locale() } }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Strip hyphens from the query before extracting terms, so "wi-fi" searches "wifi".
    #[serde(default)]
    pub remove_hyphens_in_query: bool,
}

fn default_max_results() -> usize { 10 }
fn default_locale() -> String { "en".to_string() }

impl Default for SearchParams {
    fn default() -> Self {
        Self { max_results: default_max_results(), locale: default_locale(), remove_hyphens_in_query: false }
    }
}

impl SearchParams {
    fn result_limit(&self) -> Result<usize> {
        if self.max_results == 0 {
            return Err(SearchError::InvalidParams("max_results must be at least 1".into()));
        }
        Ok(self.max_results.min(MAX_RESULTS_CAP))
    }
}

/// Where one query term matched inside a hit. `term` is the indexed term; it differs from
/// the query term when the query only matched its beginning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermMatch {
    pub term: String,
    pub posting: Posting,
    pub exact: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub positions: Vec<TermMatch>,
}

/// Document-level index: turns [`Data`] into consolidated tokens, keeps the TF-IDF cache
/// built after every batch, and ranks documents by the summed TF-IDF of the query terms.
/// A query term also matches indexed terms it is a prefix of, at a reduced weight.
#[derive(Debug, Clone, Default)]
pub struct LocalIndex {
    config: IndexConfig,
    index: InvertedIndex,
}

impl LocalIndex {
    pub fn new(config: IndexConfig) -> Self {
        Self { config, index: InvertedIndex::new() }
    }

    pub fn config(&self) -> &IndexConfig { &self.config }

    pub fn inverted_index(&self) -> &InvertedIndex { &self.index }

    /// Number of indexed documents.
    pub fn get_size(&self) -> usize { self.index.num_documents() }

    /// Adds new documents or replaces existing ones with the same id.
    pub fn add_or_update(&mut self, data: &[Data]) {
        for item in data {
            let tokens = self.tokens_for(item);
            self.index.add_document(&item.id, &tokens);
        }
        self.index.build_inverted_index();
    }

    /// Removes the given documents and returns how many were actually indexed.
    pub fn delete(&mut self, ids: &[String]) -> usize {
        let mut removed = 0;
        for id in ids {
            if self.index.contains_document(id) {
                self.index.remove_document(id);
                removed += 1;
            }
        }
        self.index.build_inverted_index();
        removed
    }

    pub fn find(&self, query: &str, params: &SearchParams) -> Result<Vec<SearchHit>> {
        let limit = params.result_limit()?;
        let query_text = if params.remove_hyphens_in_query { normalize(query, true) } else { query.to_string() };
        let terms = consolidate_token(&extract_content("query", &query_text, &params.locale));
        if terms.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        if self.index.num_documents() == 0 {
            return Err(SearchError::EmptyIndex);
        }

        let mut hits: HashMap<&str, SearchHit> = HashMap::new();
        for term in &terms {
            for (matched, weight) in self.expand_term(&term.content) {
                for result in self.index.get_tfidf(matched) {
                    let hit = hits.entry(result.document_id.as_str()).or_insert_with(|| SearchHit {
                        id: result.document_id.clone(),
                        score: 0.0,
                        positions: Vec::new(),
                    });
                    hit.score += result.score * weight;
                    hit.positions.push(TermMatch {
                        term: matched.to_string(),
                        posting: result.posting.clone(),
                        exact: matched == term.content,
                    });
                }
            }
        }

        let mut ranked: Vec<SearchHit> = hits.into_values().collect();
        ranked.sort_by(|a, b| {
            b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal).then_with(|| a.id.cmp(&b.id))
        });
        debug!(query, num_terms = terms.len(), total_hits = ranked.len(), "search");
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// The query term itself with weight 1, then every indexed term it is a prefix of,
    /// weighted by the share of the indexed term the query covers ("print" vs "printing"
    /// counts 5/8).
    fn expand_term<'a>(&'a self, term: &'a str) -> Vec<(&'a str, f32)> {
        let mut extensions: Vec<&str> = self.index.terms_with_prefix(term).collect();
        extensions.sort_unstable();
        let query_len = term.chars().count() as f32;
        let mut expanded = vec![(term, 1.0)];
        expanded.extend(extensions.into_iter().map(|t| (t, query_len / t.chars().count() as f32)));
        expanded
    }

    fn tokens_for(&self, data: &Data) -> Vec<Token> {
        let extracted: Vec<Token> = data
            .contents
            .iter()
            .flat_map(|c| extract_content(&c.id, &c.content, &self.config.locale))
            .collect();
        consolidate_token(&extracted)
    }
}
