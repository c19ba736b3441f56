use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Streams a generation from `/api/generate` and concatenates the
    /// `response` fragments until the model reports `done` (or the stream
    /// ends). Malformed fragments are skipped rather than failing the call.
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct GenerateReq<'a> {
            model: &'a str,
            prompt: &'a str,
            stream: bool,
        }

        #[derive(Deserialize)]
        struct GenerateChunk {
            #[serde(default)]
            response: String,
            #[serde(default)]
            done: bool,
        }

        let url = format!("{}/api/generate", self.base_url);
        let mut response = self
            .client
            .post(url)
            .json(&GenerateReq {
                model,
                prompt,
                stream: true,
            })
            .send()
            .await
            .context("failed to call ollama generate endpoint")?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "ollama /api/generate returned {status}: {}",
                normalize_err_body(&body)
            );
        }

        let mut text = String::new();
        let mut pending = String::new();
        let mut done = false;

        while let Some(chunk) = response
            .chunk()
            .await
            .context("failed to read ollama generate stream")?
        {
            pending.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(newline) = pending.find('\n') {
                let line = pending[..newline].trim().to_string();
                pending.drain(..=newline);
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<GenerateChunk>(&line) {
                    Ok(fragment) => {
                        text.push_str(&fragment.response);
                        if fragment.done {
                            done = true;
                        }
                    }
                    Err(err) => {
                        tracing::warn!("skipping malformed ollama stream fragment: {err}");
                    }
                }
            }

            if done {
                break;
            }
        }

        // A final fragment without a trailing newline is still valid JSON.
        let tail = pending.trim();
        if !done && !tail.is_empty() {
            if let Ok(fragment) = serde_json::from_str::<GenerateChunk>(tail) {
                text.push_str(&fragment.response);
            }
        }

        if text.trim().is_empty() {
            return Ok("No response received from Ollama.".to_string());
        }

        Ok(text.trim().to_string())
    }
}

fn normalize_err_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(err) = json.get("error").and_then(|v| v.as_str()) {
            return err.to_string();
        }
    }

    trimmed.to_string()
}
