use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;

use crate::index::{Token, TokenPosition};
use crate::normalizer::normalize;
use crate::stopwords::is_stopword;

lazy_static! {
    // A word segment must hold at least one letter or digit; anything else is punctuation,
    // symbols or whitespace.
    static ref WORD: Regex = Regex::new(r"[\p{L}\p{N}]").expect("valid regex");
    // Segments such as "gmail.com", "8.8.8.8" or "it's" keep inner punctuation; they are
    // addresses and numbers rather than words.
    static ref INNER_PUNCT: Regex = Regex::new(r"[\p{P}\p{S}]").expect("valid regex");
}

/// Splits `text` on Unicode word boundaries and returns one token per surviving word, in
/// order of appearance. Each token carries a single position whose `start` and `length` are
/// byte offsets into `text` itself, not into the normalized form.
///
/// Symbol runs, segments containing punctuation or symbols, and stopwords of `locale` are
/// dropped. Repeated words are not merged here;
/// see [`consolidate_token`].
pub fn extract_content(content_id: &str, text: &str, locale: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (start, word) in text.split_word_bound_indices() {
        if !WORD.is_match(word) || INNER_PUNCT.is_match(word) {
            continue;
        }
        let content = normalize(word, false);
        if content.is_empty() || is_stopword(&content, locale) {
            continue;
        }
        tokens.push(Token::new(
            content,
            vec![TokenPosition::new(content_id, start as u32, word.len() as u32)],
        ));
    }
    tokens
}

/// Merges tokens with equal content. Output follows the first occurrence of each content;
/// positions are concatenated in input order.
pub fn consolidate_token(tokens: &[Token]) -> Vec<Token> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut merged: Vec<Token> = Vec::new();
    for token in tokens {
        match slots.get(token.content.as_str()) {
            Some(&slot) => merged[slot].positions.extend(token.positions.iter().cloned()),
            None => {
                slots.insert(&token.content, merged.len());
                merged.push(token.clone());
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.content.as_str()).collect()
    }

    #[test]
    fn extracts_words_and_offsets() {
        let text = "Normal... English!!! paragraph: email@gmail.com. Here is a link: https://google.com, ip=8.8.8.8";
        let tokens = extract_content("first test", text, "en");
        assert_eq!(
            contents(&tokens),
            vec!["normal", "english", "paragraph", "email", "link", "https", "ip"]
        );
        assert_eq!(tokens.len(), 7);
        assert_eq!(tokens[1].positions, vec![TokenPosition::new("first test", 10, 7)]);
        assert!(tokens.iter().all(|t| t.positions.len() == 1));
    }

    #[test]
    fn segments_with_inner_punctuation_are_dropped() {
        let tokens = extract_content("id", "Visit chrome.com or call 555-0100 at 8.8.8.8 it's open", "en");
        assert_eq!(contents(&tokens), vec!["visit", "call", "555", "0100", "open"]);
    }

    #[test]
    fn symbol_runs_produce_no_tokens() {
        let tokens = extract_content("3rd test", "Check duplicate. Duplicate is #@$%^&@#$%#@$^@#$ bad", "en");
        assert_eq!(contents(&tokens), vec!["check", "duplicate", "duplicate", "bad"]);
        assert_eq!(tokens[1].positions[0], TokenPosition::new("3rd test", 6, 9));
        assert_eq!(tokens[2].positions[0], TokenPosition::new("3rd test", 17, 9));
        assert!(extract_content("x", "#@$%^& ... !!!", "en").is_empty());
    }

    #[test]
    fn positions_point_into_original_text() {
        let text = "Ĉu Über straße";
        let tokens = extract_content("id", text, "eo");
        assert_eq!(contents(&tokens), vec!["cu", "uber", "straße"]);
        for token in &tokens {
            let p = &token.positions[0];
            let original = &text[p.start as usize..(p.start + p.length) as usize];
            assert_eq!(normalize(original, false), token.content);
        }
        assert_eq!(tokens[1].positions[0], TokenPosition::new("id", 4, 5));
    }

    #[test]
    fn ideographs_are_split_per_character() {
        let tokens = extract_content("2nd test", "@#$%@^你好!!!", "zh");
        assert_eq!(contents(&tokens), vec!["你", "好"]);
        assert_eq!(tokens[0].positions[0], TokenPosition::new("2nd test", 6, 3));
        assert_eq!(tokens[1].positions[0], TokenPosition::new("2nd test", 9, 3));
    }

    #[test]
    fn stopwords_depend_on_locale() {
        assert_eq!(contents(&extract_content("id", "The Wi-Fi is on", "en-US")), vec!["wi", "fi"]);
        assert_eq!(contents(&extract_content("id", "The Wi-Fi is on", "fr")), vec!["the", "wi", "fi", "is", "on"]);
    }

    #[test]
    fn consolidates_extracted_duplicates() {
        let tokens = consolidate_token(&extract_content("3rd test", "Check duplicate. Duplicate is #@$%^&@#$%#@$^@#$ bad", "en"));
        assert_eq!(contents(&tokens), vec!["check", "duplicate", "bad"]);
        assert_eq!(
            tokens[1].positions,
            vec![TokenPosition::new("3rd test", 6, 9), TokenPosition::new("3rd test", 17, 9)]
        );
    }

    #[test]
    fn consolidation_keeps_encounter_order() {
        let sources = vec![
            Token::new("A", vec![TokenPosition::new("ID1", 1, 1), TokenPosition::new("ID1", 3, 1)]),
            Token::new("B", vec![TokenPosition::new("ID1", 5, 1)]),
            Token::new("A", vec![TokenPosition::new("ID2", 10, 1)]),
        ];
        let tokens = consolidate_token(&sources);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].content, "A");
        assert_eq!(
            tokens[0].positions,
            vec![TokenPosition::new("ID1", 1, 1), TokenPosition::new("ID1", 3, 1), TokenPosition::new("ID2", 10, 1)]
        );
        assert_eq!(tokens[1].content, "B");
        assert_eq!(tokens[1].positions, vec![TokenPosition::new("ID1", 5, 1)]);
        assert!(consolidate_token(&[]).is_empty());
    }
}
