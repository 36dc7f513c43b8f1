// Model presets and the process-wide cache of loaded models.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use parking_lot::Mutex;

use crate::backend::{self, Summarizer};
use crate::config::InferenceSettings;
use crate::error::SummaryError;

/// A selectable model: the name shown to users and the id handed to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelPreset {
    pub name: &'static str,
    pub id: &'static str,
}

/// Known models. The first entry is the default selection.
pub const MODEL_PRESETS: &[ModelPreset] = &[
    ModelPreset { name: "BART Large CNN", id: "facebook/bart-large-cnn" },
    ModelPreset { name: "T5 Small", id: "t5-small" },
    ModelPreset { name: "DistilBART CNN", id: "sshleifer/distilbart-cnn-12-6" },
    ModelPreset { name: "Extractive (local)", id: "local/extractive" },
];

pub fn default_model() -> &'static ModelPreset {
    &MODEL_PRESETS[0]
}

/// Look a preset up by display name (any case) or by model id.
pub fn resolve_model(selection: &str) -> Result<&'static ModelPreset> {
    let wanted = selection.trim();
    MODEL_PRESETS
        .iter()
        .find(|p| p.id == wanted || p.name.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| {
            let known: Vec<String> = MODEL_PRESETS
                .iter()
                .map(|p| format!("\"{}\" ({})", p.name, p.id))
                .collect();
            anyhow!("unknown model '{}'; choose one of {}", wanted, known.join(", "))
        })
}

type Loader = Box<dyn Fn(&str) -> Result<Box<dyn Summarizer>> + Send + Sync>;

/// Read-through cache of loaded models keyed by model id.
///
/// A model is loaded the first time it is requested and reused afterwards.
/// A failed load is remembered as well: later requests for the same id get
/// `NotInitialized` straight away, without calling the loader again.
pub struct ModelCache {
    loader: Loader,
    // `None` marks a model whose load failed
    loaded: Mutex<HashMap<String, Option<Arc<dyn Summarizer>>>>,
}

impl ModelCache {
    pub fn new(settings: InferenceSettings) -> Self {
        Self::with_loader(move |id| backend::load_model(id, &settings))
    }

    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn(&str) -> Result<Box<dyn Summarizer>> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            loaded: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, model_id: &str) -> Result<Arc<dyn Summarizer>, SummaryError> {
        let mut loaded = self.loaded.lock();
        match loaded.get(model_id) {
            Some(Some(model)) => return Ok(Arc::clone(model)),
            Some(None) => {
                log::debug!("model {} failed to load earlier", model_id);
                return Err(SummaryError::NotInitialized { model: model_id.to_string() });
            }
            None => {}
        }

        log::info!("loading model {}", model_id);
        match (self.loader)(model_id) {
            Ok(model) => {
                let model: Arc<dyn Summarizer> = Arc::from(model);
                loaded.insert(model_id.to_string(), Some(Arc::clone(&model)));
                log::info!("model {} ready", model_id);
                Ok(model)
            }
            Err(e) => {
                log::warn!("could not initialize summarizer model '{}': {:#}", model_id, e);
                loaded.insert(model_id.to_string(), None);
                Err(SummaryError::NotInitialized { model: model_id.to_string() })
            }
        }
    }

    pub fn is_loaded(&self, model_id: &str) -> bool {
        matches!(self.loaded.lock().get(model_id), Some(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LengthParams;
    use anyhow::bail;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn echo_loader(
        counter: Arc<AtomicUsize>,
    ) -> impl Fn(&str) -> Result<Box<dyn Summarizer>> + Send + Sync {
        move |id: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            let id = id.to_string();
            let model = move |text: &str, _: usize, _: usize| -> Result<String> {
                Ok(format!("{}: {}", id, text))
            };
            Ok(Box::new(model) as Box<dyn Summarizer>)
        }
    }

    #[test]
    fn test_presets_have_distinct_ids() {
        assert!(MODEL_PRESETS.len() >= 3);
        for (i, a) in MODEL_PRESETS.iter().enumerate() {
            for b in &MODEL_PRESETS[i + 1..] {
                assert_ne!(a.id, b.id);
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn test_default_model_is_bart() {
        assert_eq!(default_model().id, "facebook/bart-large-cnn");
    }

    #[test]
    fn test_resolve_by_name_and_id() -> Result<()> {
        assert_eq!(resolve_model("T5 Small")?.id, "t5-small");
        assert_eq!(resolve_model("distilbart cnn")?.id, "sshleifer/distilbart-cnn-12-6");
        assert_eq!(resolve_model("facebook/bart-large-cnn")?.name, "BART Large CNN");
        assert_eq!(resolve_model("  local/extractive ")?.name, "Extractive (local)");
        Ok(())
    }

    #[test]
    fn test_resolve_unknown_lists_choices() {
        let err = resolve_model("GPT Huge").unwrap_err().to_string();
        assert!(err.contains("GPT Huge"));
        assert!(err.contains("BART Large CNN"));
    }

    #[test]
    fn test_cache_loads_once_per_model() -> Result<()> {
        let counter = Arc::new(AtomicUsize::new(0));
        let cache = ModelCache::with_loader(echo_loader(Arc::clone(&counter)));
        let params = LengthParams::default();

        let first = cache.get("t5-small")?;
        let again = cache.get("t5-small")?;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(first.summarize("x", &params)?, again.summarize("x", &params)?);

        cache.get("facebook/bart-large-cnn")?;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(cache.is_loaded("t5-small"));
        Ok(())
    }

    #[test]
    fn test_cache_failure_is_remembered() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&attempts);
        let cache = ModelCache::with_loader(move |_id: &str| -> Result<Box<dyn Summarizer>> {
            seen.fetch_add(1, Ordering::SeqCst);
            bail!("weights missing")
        });

        let err = cache.get("t5-small").err().unwrap();
        assert!(matches!(err, SummaryError::NotInitialized { ref model } if model == "t5-small"));
        assert_eq!(err.to_string(), "Error: Summarizer not initialized.");

        let again = cache.get("t5-small").err().unwrap();
        assert!(matches!(again, SummaryError::NotInitialized { .. }));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(!cache.is_loaded("t5-small"));

        // other ids still get their own attempt
        assert!(cache.get("facebook/bart-large-cnn").is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_default_cache_loads_local_preset() -> Result<()> {
        let cache = ModelCache::new(InferenceSettings::default());
        let model = cache.get("local/extractive")?;
        let out = model.summarize("Short input.", &LengthParams::default())?;
        assert_eq!(out, "Short input.");
        Ok(())
    }
}
