use parking_lot::RwLock;
use std::sync::Arc;

use crate::index::{InvertedIndex, PostingList, TfidfResult, Token};

/// Cloneable handle to one [`InvertedIndex`] guarded by a read/write lock.
///
/// Every call is synchronous: lookups take the read lock, mutations and builds take the
/// write lock. Scores are returned by value since they cannot outlive the guard.
#[derive(Clone, Default)]
pub struct SharedIndex {
    inner: Arc<RwLock<InvertedIndex>>,
}

impl SharedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn from_index(index: InvertedIndex) -> Self {
        Self { inner: Arc::new(RwLock::new(index)) }
    }

    pub fn add_document(&self, document_id: &str, tokens: &[Token]) {
        self.inner.write().add_document(document_id, tokens);
    }

    pub fn remove_document(&self, document_id: &str) {
        self.inner.write().remove_document(document_id);
    }

    pub fn build_inverted_index(&self) {
        self.inner.write().build_inverted_index();
    }

    pub fn find_term(&self, term: &str) -> PostingList {
        self.inner.read().find_term(term)
    }

    pub fn get_tfidf(&self, term: &str) -> Vec<TfidfResult> {
        self.inner.read().get_tfidf(term).to_vec()
    }

    pub fn is_inverted_index_built(&self) -> bool {
        self.inner.read().is_inverted_index_built()
    }

    pub fn num_documents(&self) -> usize {
        self.inner.read().num_documents()
    }

    /// Deep copy of the current index state.
    pub fn snapshot(&self) -> InvertedIndex {
        self.inner.read().clone()
    }
}
