// Hosted summarization models reached over a Hugging Face style inference API.
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

use super::Summarizer;
use crate::config::{InferenceSettings, LengthParams, DO_SAMPLE, NUM_BEAMS};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize, Debug)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Serialize, Debug)]
struct GenerationParameters {
    max_length: usize,
    min_length: usize,
    do_sample: bool,
    num_beams: u32,
}

#[derive(Deserialize, Debug)]
struct SummaryText {
    summary_text: String,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum InferenceResponse {
    Summaries(Vec<SummaryText>),
    Failure { error: String },
}

pub struct InferenceSummarizer {
    agent: ureq::Agent,
    url: String,
    api_token: Option<String>,
}

impl InferenceSummarizer {
    /// Build a client for `model_id` and check that the endpoint answers.
    ///
    /// Any HTTP reply counts as reachable; only transport failures (DNS,
    /// refused connection, timeout) mean the model cannot be used.
    pub fn connect(model_id: &str, settings: &InferenceSettings) -> Result<Self> {
        if model_id.trim().is_empty() {
            bail!("model id is empty");
        }
        let url = format!("{}/{}", settings.base_url, model_id);

        let probe = ureq::AgentBuilder::new().timeout(PROBE_TIMEOUT).build();
        let mut request = probe.get(&url);
        if let Some(token) = &settings.api_token {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }
        match request.call() {
            Ok(_) => {}
            Err(ureq::Error::Status(code, _)) => {
                log::debug!("probe of {} answered with status {}", url, code);
            }
            Err(ureq::Error::Transport(t)) => {
                bail!("inference endpoint {} is unreachable: {}", url, t);
            }
        }

        let agent = ureq::AgentBuilder::new().timeout(settings.timeout).build();
        Ok(Self {
            agent,
            url,
            api_token: settings.api_token.clone(),
        })
    }
}

impl Summarizer for InferenceSummarizer {
    fn summarize(&self, text: &str, params: &LengthParams) -> Result<String> {
        let body = InferenceRequest {
            inputs: text,
            parameters: GenerationParameters {
                max_length: params.max_length,
                min_length: params.min_length,
                do_sample: DO_SAMPLE,
                num_beams: NUM_BEAMS,
            },
        };

        let mut request = self.agent.post(&self.url);
        if let Some(token) = &self.api_token {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }

        match request.send_json(&body) {
            Ok(resp) => {
                let raw = resp.into_string()?;
                parse_response(&raw)
            }
            Err(ureq::Error::Status(code, resp)) => {
                let raw = resp.into_string().unwrap_or_default();
                let reason = parse_response(&raw)
                    .err()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| raw.trim().to_string());
                Err(anyhow!("inference API returned status {}: {}", code, reason))
            }
            Err(ureq::Error::Transport(t)) => Err(anyhow!("request to {} failed: {}", self.url, t)),
        }
    }
}

fn parse_response(raw: &str) -> Result<String> {
    let parsed: InferenceResponse = serde_json::from_str(raw)
        .map_err(|e| anyhow!("unexpected inference response: {}", e))?;
    match parsed {
        InferenceResponse::Summaries(items) => items
            .into_iter()
            .next()
            .map(|item| item.summary_text)
            .ok_or_else(|| anyhow!("inference API returned no summaries")),
        InferenceResponse::Failure { error } => Err(anyhow!(error)),
    }
}
