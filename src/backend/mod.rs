// Summarization backends
pub mod extractive;
pub mod inference;

use anyhow::Result;

use crate::config::{InferenceSettings, LengthParams};

pub use extractive::ExtractiveSummarizer;
pub use inference::InferenceSummarizer;

/// Model ids with this prefix run in-process instead of over HTTP.
pub const LOCAL_PREFIX: &str = "local/";

/// A loaded model: text in, summary text out.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str, params: &LengthParams) -> Result<String>;
}

impl<F> Summarizer for F
where
    F: Fn(&str, usize, usize) -> Result<String> + Send + Sync,
{
    fn summarize(&self, text: &str, params: &LengthParams) -> Result<String> {
        self(text, params.max_length, params.min_length)
    }
}

pub fn load_model(model_id: &str, settings: &InferenceSettings) -> Result<Box<dyn Summarizer>> {
    if model_id.starts_with(LOCAL_PREFIX) {
        log::debug!("using in-process extractive backend for {}", model_id);
        Ok(Box::new(ExtractiveSummarizer::new()))
    } else {
        log::debug!("using inference endpoint {} for {}", settings.base_url, model_id);
        Ok(Box::new(InferenceSummarizer::connect(model_id, settings)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_closure_receives_length_bounds() -> Result<()> {
        let stub = |text: &str, max: usize, min: usize| -> Result<String> {
            Ok(format!("{} [{}..{}]", text, min, max))
        };
        let params = LengthParams::new(120, 30)?;
        assert_eq!(stub.summarize("hi", &params)?, "hi [30..120]");
        Ok(())
    }

    #[test]
    fn test_closure_errors_propagate() {
        let failing = |_: &str, _: usize, _: usize| -> Result<String> { Err(anyhow!("boom")) };
        let err = failing.summarize("text", &LengthParams::default()).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_load_local_model_skips_network() -> Result<()> {
        let settings = InferenceSettings {
            base_url: "http://127.0.0.1:1".to_string(),
            ..InferenceSettings::default()
        };
        let model = load_model("local/extractive", &settings)?;
        let summary = model.summarize("Only one sentence here.", &LengthParams::default())?;
        assert_eq!(summary, "Only one sentence here.");
        Ok(())
    }
}
