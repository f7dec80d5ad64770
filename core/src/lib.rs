//! In-process search over short localized strings: content extraction, an inverted
//! index and cached TF-IDF scoring.

pub mod error;
pub mod index;
pub mod local_index;
pub mod normalizer;
pub mod shared;
pub mod stopwords;
pub mod tokenizer;

pub use error::{Result, SearchError};
pub use index::{InvertedIndex, Posting, PostingList, TfidfResult, Token, TokenPosition};
pub use local_index::{Content, Data, IndexConfig, LocalIndex, SearchHit, SearchParams, TermMatch};
pub use normalizer::normalize;
pub use shared::SharedIndex;
pub use stopwords::is_stopword;
pub use tokenizer::{consolidate_token, extract_content};
