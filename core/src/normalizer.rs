use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    /// Every character carrying the Unicode `Dash` property (ASCII hyphen, en/em dash,
    /// Armenian hyphen, horizontal bar, ...).
    static ref HYPHENS: Regex = Regex::new(r"\p{Dash}+").expect("valid regex");
}

/// Latin letters with a stroke or bar have no canonical decomposition, so stripping
/// combining marks leaves them untouched. Map them to their base letter explicitly.
fn fold_stroked_letter(c: char) -> char {
    match c {
        'đ' | 'Đ' | 'ð' | 'Ð' => 'd',
        'ł' | 'Ł' => 'l',
        'ø' | 'Ø' => 'o',
        'ħ' | 'Ħ' => 'h',
        'ŧ' | 'Ŧ' => 't',
        'ı' => 'i',
        other => other,
    }
}

fn strip_marks(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Case-folds `text`, strips diacritics and, when `remove_hyphens` is set, deletes every
/// hyphen-like character. The result is stable under a second application with the same flag.
pub fn normalize(text: &str, remove_hyphens: bool) -> String {
    let folded: String = strip_marks(text)
        .chars()
        .map(fold_stroked_letter)
        .flat_map(char::to_lowercase)
        .collect();
    // Lowercasing may introduce new combining marks (e.g. 'İ' -> "i\u{307}").
    let normalized = strip_marks(&folded);
    if remove_hyphens {
        HYPHENS.replace_all(&normalized, "").into_owned()
    } else {
        normalized
    }
}
