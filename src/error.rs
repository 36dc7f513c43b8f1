// Error kinds surfaced to callers of the summarization pipeline.

use thiserror::Error;

/// Why a request produced no summary.
///
/// The `Display` form of every variant starts with `"Error"`, so callers that
/// only look at the rendered message can still tell a failure from a summary.
#[derive(Error, Debug)]
pub enum SummaryError {
    /// The selected model could not be loaded.
    #[error("Error: Summarizer not initialized.")]
    NotInitialized { model: String },

    /// Nothing left to summarize after whitespace normalization.
    #[error("Error: Input text is empty.")]
    EmptyInput,

    /// The model failed while summarizing.
    #[error("Error during summarization: {0}")]
    Summarization(String),

    /// The input file could not be read or converted to text.
    #[error("Error processing file: {0}")]
    FileProcessing(String),
}

impl SummaryError {
    pub fn kind(&self) -> &'static str {
        match self {
            SummaryError::NotInitialized { .. } => "initialization",
            SummaryError::EmptyInput => "empty-input",
            SummaryError::Summarization(_) => "summarization",
            SummaryError::FileProcessing(_) => "file-processing",
        }
    }
}
