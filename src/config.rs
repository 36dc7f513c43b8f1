// Request parameters and environment-driven settings.
use std::time::Duration;

use anyhow::{bail, Result};

pub const MAX_LENGTH_RANGE: (usize, usize) = (50, 300);
pub const MIN_LENGTH_RANGE: (usize, usize) = (10, 150);

pub const DEFAULT_MAX_LENGTH: usize = 200;
pub const DEFAULT_MIN_LENGTH: usize = 100;

// Beam search without sampling keeps repeated requests stable.
pub const DO_SAMPLE: bool = false;
pub const NUM_BEAMS: u32 = 4;

pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Output length bounds passed to the model on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthParams {
    pub max_length: usize,
    pub min_length: usize,
}

impl Default for LengthParams {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

impl LengthParams {
    pub fn new(max_length: usize, min_length: usize) -> Result<Self> {
        let (lo, hi) = MAX_LENGTH_RANGE;
        if !(lo..=hi).contains(&max_length) {
            bail!("max_length must be between {} and {}, got {}", lo, hi, max_length);
        }
        let (lo, hi) = MIN_LENGTH_RANGE;
        if !(lo..=hi).contains(&min_length) {
            bail!("min_length must be between {} and {}, got {}", lo, hi, min_length);
        }
        if min_length > max_length {
            log::warn!(
                "min_length ({}) is greater than max_length ({}); the model decides which wins",
                min_length,
                max_length
            );
        }
        Ok(Self { max_length, min_length })
    }
}

/// Where and how to reach the hosted inference endpoint.
#[derive(Debug, Clone)]
pub struct InferenceSettings {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_INFERENCE_URL.to_string(),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl InferenceSettings {
    /// Read `QUICKSUM_INFERENCE_URL`, `HF_API_TOKEN` and `QUICKSUM_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("QUICKSUM_INFERENCE_URL")
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_INFERENCE_URL.to_string());

        let api_token = lookup("HF_API_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let timeout_secs = match lookup("QUICKSUM_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                log::warn!("ignoring invalid QUICKSUM_TIMEOUT_SECS value '{}'", raw);
                DEFAULT_TIMEOUT_SECS
            }),
            None => DEFAULT_TIMEOUT_SECS,
        };

        Self {
            base_url,
            api_token,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}
