// Text helpers: whitespace normalization, word-bounded chunking and
// sentence-level deduplication of generated summaries.
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const SENTENCE_DELIMITER: &str = ". ";

/// Trim the text and collapse every internal whitespace run to a single space.
pub fn normalize_text(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Sequential, non-overlapping word slices of at most `max_words` words.
///
/// The plan borrows the input and can be iterated any number of times;
/// chunks are only joined into owned strings as they are pulled.
#[derive(Debug, Clone)]
pub struct WordChunks<'a> {
    words: Vec<&'a str>,
    max_words: usize,
}

impl<'a> WordChunks<'a> {
    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        self.words.chunks(self.max_words).map(|slice| slice.join(" "))
    }

    pub fn len(&self) -> usize {
        self.words.len().div_ceil(self.max_words)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

pub fn chunk_text(text: &str, max_words: usize) -> WordChunks<'_> {
    WordChunks {
        words: text.split_whitespace().collect(),
        // a zero budget would never make progress
        max_words: max_words.max(1),
    }
}

/// Drop repeated sentences, keeping the first occurrence of each.
///
/// Sentences are whatever sits between literal `". "` delimiters and are
/// compared exactly. The final `"."` is set aside before splitting and
/// restored only when the input ended with one.
pub fn remove_duplicates(summary: &str) -> String {
    let body = summary.strip_suffix('.').unwrap_or(summary);

    let mut unique: Vec<&str> = Vec::new();
    for sentence in body.split(SENTENCE_DELIMITER) {
        if !sentence.is_empty() && !unique.contains(&sentence) {
            unique.push(sentence);
        }
    }

    let mut out = unique.join(SENTENCE_DELIMITER);
    if summary.ends_with('.') {
        out.push('.');
    }
    out
}
