use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::config::{AppConfig, GeneratorMode};
use crate::ollama::OllamaClient;

const COVID_SUMMARY: &str = "COVID-19 is a respiratory illness that commonly causes fever, \
cough, fatigue, and shortness of breath. Some people may lose their sense of taste or smell. \
It emerged from Asia and Europe and has spread globally. Most people experience mild symptoms \
and recover at home, but it can be more serious for older adults and those with existing \
health conditions. Practicing good hygiene, wearing masks in crowded places, and staying home \
when sick can help reduce spread.";

const AVIAN_FLU_SUMMARY: &str = "Avian Influenza is a flu-like illness that typically causes \
fever, cough, sore throat, and body aches. It originated in Asia and Africa, primarily \
affecting bird populations, but can spread to humans through close contact with infected \
birds. It's currently impacting parts of Europe and North America. Most people recover with \
rest and fluids, though some may need medical care. If you work with birds, wearing \
protective gear and washing hands thoroughly can help reduce your risk.";

const FALLBACK_SUMMARY: &str =
    "Information about this disease is limited. Please consult healthcare professionals for accurate information.";

/// Text generation strategy. The local variant returns deterministic canned
/// prose keyed off the prompt and is safe for offline and test use; the
/// Ollama variant delegates to the remote model, one generation at a time.
///
/// Remote failures degrade to an explicit error string instead of
/// propagating, so callers can always render something.
#[derive(Clone)]
pub enum TextGenerator {
    Local,
    Ollama {
        client: OllamaClient,
        model: String,
        limit: Arc<Semaphore>,
    },
}

impl TextGenerator {
    pub fn from_config(config: &AppConfig) -> Self {
        match config.generator_mode {
            GeneratorMode::Local => TextGenerator::Local,
            GeneratorMode::Ollama => TextGenerator::Ollama {
                client: OllamaClient::new(config.ollama_base_url.clone()),
                model: config.models.generation_model.clone(),
                limit: Arc::new(Semaphore::new(1)),
            },
        }
    }

    pub async fn generate(&self, prompt: &str) -> String {
        match self {
            TextGenerator::Local => local_response(prompt).to_string(),
            TextGenerator::Ollama {
                client,
                model,
                limit,
            } => {
                let _permit = match limit.acquire().await {
                    Ok(permit) => permit,
                    Err(err) => {
                        return format!("Error: Unable to generate content. {err}");
                    }
                };
                match client.generate(model, prompt).await {
                    Ok(text) => text,
                    Err(err) => {
                        tracing::warn!("text generation failed: {err:#}");
                        format!("Error: Unable to generate content. {err}")
                    }
                }
            }
        }
    }
}

fn local_response(prompt: &str) -> &'static str {
    if prompt.contains("COVID-19") {
        COVID_SUMMARY
    } else if prompt.contains("Avian Influenza") {
        AVIAN_FLU_SUMMARY
    } else {
        FALLBACK_SUMMARY
    }
}
