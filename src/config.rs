use serde::Deserialize;
use std::fs;

/// The merchant's own product, as entered by the user.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceProduct {
    pub title: String,
    pub domain: String,
    #[serde(default)]
    pub url: Option<String>,
    pub price: f64,
}

/// Analyzer tunables. Defaults mirror the observed behavior of the original
/// tool; all of them are advisory thresholds, not hard rules.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    /// Discount (% off the original price) above which a competitor offer
    /// counts as aggressive.
    #[serde(default = "default_aggressive_discount_pct")]
    pub aggressive_discount_pct: f64,
    /// Amounts at or below this bound are outliers, excluded from ranking.
    #[serde(default = "default_outlier_min")]
    pub outlier_min: f64,
    /// Amounts at or above this bound are outliers, excluded from ranking.
    #[serde(default = "default_outlier_max")]
    pub outlier_max: f64,
    /// A similar competitor must undercut the reference by more than this
    /// to trigger the cheaper-competitor flag.
    #[serde(default)]
    pub cheaper_margin: f64,
}

fn default_aggressive_discount_pct() -> f64 {
    15.0
}

fn default_outlier_min() -> f64 {
    10.0
}

fn default_outlier_max() -> f64 {
    10_000.0
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            aggressive_discount_pct: default_aggressive_discount_pct(),
            outlier_min: default_outlier_min(),
            outlier_max: default_outlier_max(),
            cheaper_margin: 0.0,
        }
    }
}

/// Optional LLM title enrichment. Absent or without a key, the pipeline
/// sticks to the heuristic token path.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    pub api_key: String,
    #[serde(default = "default_enrichment_model")]
    pub model: String,
    #[serde(default = "default_enrichment_chunk")]
    pub chunk_size: usize,
}

fn default_enrichment_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_enrichment_chunk() -> usize {
    15
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub reference: ReferenceProduct,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub enrichment: Option<EnrichmentConfig>,
}

pub fn load_config(path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
