// Core structs: RawResult, ParsedPrice, TokenSet, MatchResult, Listing, AnalysisSummary
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result types emitted by the rank-tracker export. Closed set: anything else
/// in the Type column is not a product listing and is skipped on import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResultType {
    ShoppingAd,
    Organic,
    Ad,
    AdSub,
}

impl ResultType {
    pub fn from_export(label: &str) -> Option<Self> {
        match label.trim() {
            "Shopping Ads" => Some(Self::ShoppingAd),
            "Organic" => Some(Self::Organic),
            "Ads" => Some(Self::Ad),
            "Ads Sub" => Some(Self::AdSub),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ShoppingAd => "Shopping Ads",
            Self::Organic => "Organic",
            Self::Ad => "Ads",
            Self::AdSub => "Ads Sub",
        }
    }
}

/// One row of the search-results export, immutable once imported.
#[derive(Debug, Clone, Serialize)]
pub struct RawResult {
    pub title: String,
    pub price_text: Option<String>,
    pub url: String,
    pub domain: String,
    pub result_type: ResultType,
    pub serp_rank: u32,
}

/// A normalized monetary amount. Currency is fixed to EUR for the whole
/// pipeline; the export carries no other currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedPrice {
    pub amount: f64,
    pub currency: &'static str,
    pub original_amount: Option<f64>,
    pub is_offer: bool,
}

impl ParsedPrice {
    pub const CURRENCY: &'static str = "EUR";

    pub fn single(amount: f64) -> Self {
        Self { amount, currency: Self::CURRENCY, original_amount: None, is_offer: false }
    }

    /// A single amount carrying an offer marker but no struck-through price.
    pub fn single_offer(amount: f64) -> Self {
        Self { amount, currency: Self::CURRENCY, original_amount: None, is_offer: true }
    }

    /// A current/original pair. The original must be strictly greater.
    pub fn offer(amount: f64, original: f64) -> Result<Self, PriceError> {
        if amount >= original {
            return Err(PriceError::MalformedOffer { current: amount, original });
        }
        Ok(Self {
            amount,
            currency: Self::CURRENCY,
            original_amount: Some(original),
            is_offer: true,
        })
    }

    pub fn discount_pct(&self) -> Option<f64> {
        self.original_amount
            .filter(|orig| *orig > self.amount)
            .map(|orig| (orig - self.amount) / orig * 100.0)
    }
}

/// Normalized identity of a title: at most one canonical brand, at most one
/// model code, and the remaining descriptive tokens. Token order is kept from
/// the title but comparisons treat them as a set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TokenSet {
    pub brand: Option<String>,
    pub model_code: Option<String>,
    pub tokens: Vec<String>,
}

impl TokenSet {
    pub fn is_empty(&self) -> bool {
        self.brand.is_none() && self.model_code.is_none() && self.tokens.is_empty()
    }
}

/// Structured attributes returned by the optional title-enrichment
/// collaborator. Fields that are present override the regex-derived
/// equivalents when merged into a TokenSet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedAttributes {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default, alias = "model")]
    pub model_code: Option<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl ExtractedAttributes {
    /// True when the collaborator found nothing usable.
    pub fn is_empty(&self) -> bool {
        self.brand.as_deref().map_or(true, |b| b.trim().is_empty())
            && self.model_code.as_deref().map_or(true, |m| m.trim().is_empty())
            && self.attributes.is_empty()
    }
}

/// Human-readable bucket for a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchTier {
    Exact,
    VerySimilar,
    Similar,
    Related,
    Different,
}

impl MatchTier {
    /// Inclusive lower bounds: 90 itself is VerySimilar, not Exact.
    pub fn from_score(score: f64) -> Self {
        if score > 90.0 {
            Self::Exact
        } else if score >= 75.0 {
            Self::VerySimilar
        } else if score >= 50.0 {
            Self::Similar
        } else if score >= 30.0 {
            Self::Related
        } else {
            Self::Different
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::VerySimilar => "very similar",
            Self::Similar => "similar",
            Self::Related => "related",
            Self::Different => "different",
        }
    }
}

/// Similarity of a candidate listing to the reference product. Always
/// recomputed from the two token sets, never stored across runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchResult {
    pub score: f64,
    pub tier: MatchTier,
}

/// One competitor (or own) listing with everything derived for this run.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub raw: RawResult,
    pub price: Option<ParsedPrice>,
    pub matched: MatchResult,
}

impl Listing {
    pub fn amount(&self) -> Option<f64> {
        self.price.as_ref().map(|p| p.amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecommendationKind {
    PriceReduction,
    PriceIncrease,
    AggressiveOffer,
    SimilarCheaper,
    Visibility,
    CatalogOverlap,
}

/// Declared High to Low so the derived order sorts urgent advice first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub title: String,
    pub detail: String,
    pub action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub median: f64,
}

/// Output of one analysis run, recomputed wholesale per uploaded export.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub generated_at: DateTime<Utc>,
    pub total_listings: usize,
    pub priced_listings: usize,
    pub outlier_listings: usize,
    pub distinct_stores: usize,
    pub stats: Option<PriceStats>,
    /// Priced, in-band listings sorted by amount ascending.
    pub ranking: Vec<Listing>,
    /// 1-based rank of the own listing inside `ranking`, when identified.
    pub own_position: Option<usize>,
    pub own_serp_position: Option<usize>,
    /// Listings sorted by match score descending, price proximity on ties.
    pub top_matches: Vec<Listing>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Error)]
pub enum PriceError {
    #[error("no recognizable amount in {0:?}")]
    Unparsable(String),
    #[error("offer encodes current {current:.2} >= original {original:.2}")]
    MalformedOffer { current: f64, original: f64 },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),
}

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed enrichment response: {0}")]
    MalformedResponse(String),
}
