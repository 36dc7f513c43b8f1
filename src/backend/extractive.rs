// Extractive summarizer: scores sentences by the frequency of their content
// words and keeps the best ones, in document order, within the length bounds.
// Runs fully offline, so it doubles as the backend for the local preset.
use std::collections::{HashMap, HashSet};

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

use super::Summarizer;
use crate::config::LengthParams;

static SENTENCE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^.!?]+[.!?]+").unwrap());

static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z0-9']+").unwrap());

// Common stop words to filter out when scoring sentences
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from",
        "has", "he", "in", "is", "it", "its", "of", "on", "that", "the",
        "to", "was", "will", "with", "this", "but", "they", "have",
        "had", "what", "when", "where", "who", "which", "why", "how"
    ].iter().copied().collect()
});

#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractiveSummarizer;

impl ExtractiveSummarizer {
    pub fn new() -> Self {
        Self
    }
}

impl Summarizer for ExtractiveSummarizer {
    fn summarize(&self, text: &str, params: &LengthParams) -> Result<String> {
        Ok(summarize_extractive(text, params.max_length, params.min_length))
    }
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences: Vec<&str> = SENTENCE_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect();

    // text after the last terminator still counts as a sentence
    let consumed = SENTENCE_PATTERN.find_iter(text).last().map(|m| m.end()).unwrap_or(0);
    let tail = text[consumed..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

fn truncate_words(text: &str, max_words: usize) -> String {
    text.split_whitespace().take(max_words).collect::<Vec<_>>().join(" ")
}

pub fn summarize_extractive(text: &str, max_words: usize, min_words: usize) -> String {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return String::new();
    }

    let lengths: Vec<usize> = sentences.iter().map(|s| s.split_whitespace().count()).collect();
    let total: usize = lengths.iter().sum();

    // Already short enough: nothing to extract
    if total <= min_words.max(1) {
        return truncate_words(&sentences.join(" "), max_words);
    }

    // Calculate word frequencies (excluding stop words)
    let mut word_freq: HashMap<String, usize> = HashMap::new();
    for sentence in &sentences {
        for word in WORD_PATTERN.find_iter(sentence) {
            let word_str = word.as_str().to_lowercase();
            if !STOP_WORDS.contains(word_str.as_str()) && word_str.len() > 2 {
                *word_freq.entry(word_str).or_insert(0) += 1;
            }
        }
    }

    let max_freq = word_freq.values().max().copied().unwrap_or(1);
    for freq in word_freq.values_mut() {
        *freq = (*freq * 100) / max_freq;
    }

    let mut ranked: Vec<(usize, usize)> = sentences
        .iter()
        .enumerate()
        .map(|(idx, sentence)| {
            let words: Vec<_> = WORD_PATTERN.find_iter(sentence).collect();
            let mut score: usize = words
                .iter()
                .filter_map(|w| word_freq.get(&w.as_str().to_lowercase()))
                .sum();

            // Normalize by sentence length to avoid bias toward long sentences
            if !words.is_empty() {
                score /= words.len();
            }
            // Opening sentences usually carry the topic
            if idx == 0 {
                score = (score as f32 * 1.5) as usize;
            }
            (idx, score)
        })
        .collect();

    // highest score first, earlier sentence wins a tie
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut selected: Vec<usize> = Vec::new();
    let mut covered = 0;
    for (idx, _) in ranked {
        if !selected.is_empty() && covered + lengths[idx] > max_words {
            continue;
        }
        selected.push(idx);
        covered += lengths[idx];
        if covered >= min_words {
            break;
        }
    }

    selected.sort_unstable();
    let summary: Vec<&str> = selected.iter().map(|&idx| sentences[idx]).collect();
    truncate_words(&summary.join(" "), max_words)
}
