// Request pipeline: normalize, chunk, summarize, deduplicate.
//
// Everything here is synchronous and processes one request at a time. Model
// calls may be slow; no timeout is applied at this level.

use std::path::{Path, PathBuf};

use crate::backend::Summarizer;
use crate::config::LengthParams;
use crate::error::SummaryError;
use crate::extract::read_file_content;
use crate::models::ModelCache;
use crate::text::{chunk_text, normalize_text, remove_duplicates, word_count};

/// Largest input, in words, handed to the model in a single call.
pub const CHUNK_WORDS: usize = 1024;

/// Summarize text that has already been whitespace-normalized.
pub fn summarize_normalized(
    model: &dyn Summarizer,
    text: &str,
    params: &LengthParams,
) -> Result<String, SummaryError> {
    if text.is_empty() {
        return Err(SummaryError::EmptyInput);
    }

    let words = word_count(text);
    let combined = if words <= CHUNK_WORDS {
        log::debug!("summarizing {} words in a single call", words);
        model
            .summarize(text, params)
            .map_err(|e| SummaryError::Summarization(format!("{:#}", e)))?
    } else {
        let chunks = chunk_text(text, CHUNK_WORDS);
        log::info!("summarizing {} words in {} chunks", words, chunks.len());

        let mut fragments = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            log::debug!("chunk {}/{}", i + 1, chunks.len());
            let fragment = model
                .summarize(&chunk, params)
                .map_err(|e| SummaryError::Summarization(format!("{:#}", e)))?;
            fragments.push(fragment);
        }
        fragments.join(" ")
    };

    Ok(remove_duplicates(&combined))
}

/// Summarize raw user text with the given model.
pub fn summarize_text(
    cache: &ModelCache,
    model_id: &str,
    raw: &str,
    params: &LengthParams,
) -> Result<String, SummaryError> {
    let model = cache.get(model_id)?;
    let text = normalize_text(raw);
    summarize_normalized(model.as_ref(), &text, params)
}

/// Extract a document's text and summarize it.
///
/// Only extraction problems are reported as file-processing errors; a
/// document without any text ends up as an empty-input error.
pub fn summarize_file(
    cache: &ModelCache,
    model_id: &str,
    path: &Path,
    params: &LengthParams,
) -> Result<String, SummaryError> {
    let text = read_file_content(path).map_err(|e| SummaryError::FileProcessing(format!("{:#}", e)))?;
    summarize_text(cache, model_id, &text, params)
}

#[derive(Debug)]
pub enum FileOutcome {
    Summarized(String),
    Failed(SummaryError),
    /// The model answered but with nothing usable.
    NoSummary,
}

impl FileOutcome {
    fn from_result(result: Result<String, SummaryError>) -> Self {
        match result {
            Ok(summary) => {
                let trimmed = summary.trim();
                if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
                    FileOutcome::NoSummary
                } else {
                    FileOutcome::Summarized(summary)
                }
            }
            Err(e) => FileOutcome::Failed(e),
        }
    }
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }
}

/// Summarize each file in turn. A failing file never stops the ones after it.
///
/// `on_done` is called after every file, in input order.
pub fn summarize_files<F>(
    cache: &ModelCache,
    model_id: &str,
    paths: &[PathBuf],
    params: &LengthParams,
    mut on_done: F,
) -> Vec<FileReport>
where
    F: FnMut(&FileReport),
{
    let mut reports = Vec::with_capacity(paths.len());
    for path in paths {
        log::info!("processing {}", path.display());
        let result = summarize_file(cache, model_id, path, params);
        if let Err(e) = &result {
            log::warn!("{} failed ({}): {}", path.display(), e.kind(), e);
        }

        let report = FileReport {
            path: path.clone(),
            outcome: FileOutcome::from_result(result),
        };
        on_done(&report);
        reports.push(report);
    }
    reports
}
