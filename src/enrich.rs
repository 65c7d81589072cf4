// Optional LLM title enrichment behind a narrow async boundary.
use crate::config::EnrichmentConfig;
use crate::model::{EnrichError, ExtractedAttributes};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::warn;

const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Title to optional structured attributes. The core never calls this; the
/// binary invokes it before matching and merges whatever comes back. Any
/// failure degrades to the heuristic token path.
#[async_trait]
pub trait TitleEnricher: Send + Sync {
    async fn extract(&self, title: &str) -> Result<Option<ExtractedAttributes>, EnrichError>;
}

pub struct ClaudeEnricher {
    client: Client,
    api_key: String,
    model: String,
}

impl ClaudeEnricher {
    pub fn new(cfg: &EnrichmentConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();
        Self {
            client,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        }
    }
}

#[async_trait]
impl TitleEnricher for ClaudeEnricher {
    async fn extract(&self, title: &str) -> Result<Option<ExtractedAttributes>, EnrichError> {
        let prompt = format!(
            "Analiza este título de producto y extrae sus características.\n\n\
             TÍTULO: {title}\n\n\
             Responde SOLO un objeto JSON con las claves:\n\
             - brand: marca\n\
             - model: código de modelo (ej. B13WFKG-687XES)\n\
             - attributes: lista de características (RAM, almacenamiento, GPU, pulgadas...)\n\n\
             Usa \"\" o [] si no encuentras el dato.\n\nJSON:"
        );
        let body = json!({
            "model": self.model,
            "max_tokens": 400,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post(ANTHROPIC_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let payload: Value = response.json().await?;

        let text = payload["content"][0]["text"]
            .as_str()
            .ok_or_else(|| EnrichError::MalformedResponse("no text block".into()))?;
        let text = text
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();
        let attrs: ExtractedAttributes = serde_json::from_str(text)
            .map_err(|e| EnrichError::MalformedResponse(e.to_string()))?;

        Ok(Some(attrs).filter(|a| !a.is_empty()))
    }
}

/// Fans extraction out per title, `chunk_size` requests in flight at a
/// time. A failed title degrades to None and the batch carries on, so one
/// slow or broken call never costs the run.
pub async fn extract_all(
    enricher: &dyn TitleEnricher,
    titles: &[String],
    chunk_size: usize,
) -> Vec<Option<ExtractedAttributes>> {
    let chunk_size = chunk_size.max(1);
    let mut results = Vec::with_capacity(titles.len());
    for batch in titles.chunks(chunk_size) {
        let tasks: Vec<_> = batch
            .iter()
            .map(|title| async move {
                match enricher.extract(title).await {
                    Ok(attrs) => attrs,
                    Err(e) => {
                        warn!("enrichment failed for {title:?}: {e}");
                        None
                    }
                }
            })
            .collect();
        results.extend(join_all(tasks).await);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedEnricher;

    #[async_trait]
    impl TitleEnricher for ScriptedEnricher {
        async fn extract(&self, title: &str) -> Result<Option<ExtractedAttributes>, EnrichError> {
            match title {
                t if t.contains("falla") => {
                    Err(EnrichError::MalformedResponse("not json".into()))
                }
                t if t.contains("vacio") => Ok(None),
                _ => Ok(Some(ExtractedAttributes {
                    brand: Some("msi".into()),
                    model_code: Some("B13VFK".into()),
                    attributes: vec!["16gb".into()],
                })),
            }
        }
    }

    #[tokio::test]
    async fn failures_degrade_to_none_without_breaking_the_batch() {
        let titles: Vec<String> = ["bueno uno", "falla", "vacio", "bueno dos"]
            .iter()
            .map(|t| t.to_string())
            .collect();
        let results = extract_all(&ScriptedEnricher, &titles, 2).await;

        assert_eq!(results.len(), 4);
        assert!(results[0].is_some());
        assert!(results[1].is_none());
        assert!(results[2].is_none());
        assert_eq!(results[3].as_ref().unwrap().model_code.as_deref(), Some("B13VFK"));
    }

    #[tokio::test]
    async fn chunk_size_zero_still_makes_progress() {
        let titles = vec!["bueno".to_string()];
        let results = extract_all(&ScriptedEnricher, &titles, 0).await;
        assert_eq!(results.len(), 1);
    }
}
