use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

static WORD_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[_\-/]+").unwrap());
static APOSTROPHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"['\u{2019}]").unwrap());

/// Free text reduced to lowercase words with punctuation stripped.
#[derive(Debug, Clone, Default)]
pub struct NormalizedText {
    tokens: Vec<String>,
    token_set: HashSet<String>,
}

impl NormalizedText {
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Single space separated form, e.g. `pain in my stomach`.
    pub fn as_phrase(&self) -> String {
        self.tokens.join(" ")
    }

    /// True if `words` occur back to back somewhere in the text.
    pub fn contains_sequence<S: AsRef<str>>(&self, words: &[S]) -> bool {
        if words.is_empty() || words.len() > self.tokens.len() {
            return false;
        }
        self.tokens.windows(words.len()).any(|window| {
            window
                .iter()
                .zip(words)
                .all(|(token, word)| token == word.as_ref())
        })
    }

    /// True if every one of `words` occurs somewhere in the text, in any order.
    pub fn contains_all<S: AsRef<str>>(&self, words: &[S]) -> bool {
        !words.is_empty() && words.iter().all(|w| self.token_set.contains(w.as_ref()))
    }
}

/// Normalize text: lowercase, treat `_`, `-` and `/` as word breaks, drop
/// apostrophes inside words, strip all other punctuation and collapse whitespace.
pub fn normalize(text: &str) -> NormalizedText {
    let lowered = text.to_lowercase();
    let separated = WORD_SEPARATORS.replace_all(&lowered, " ");

    let tokens: Vec<String> = separated
        .unicode_words()
        .map(|word| APOSTROPHES.replace_all(word, "").into_owned())
        .filter(|word| !word.is_empty())
        .collect();
    let token_set = tokens.iter().cloned().collect();

    NormalizedText { tokens, token_set }
}
