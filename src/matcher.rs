use crate::model::{Listing, MatchResult, MatchTier, TokenSet};
use std::cmp::Ordering;
use std::collections::HashSet;

const BRAND_WEIGHT: f64 = 40.0;
const MODEL_WEIGHT: f64 = 35.0;
const OVERLAP_WEIGHT: f64 = 25.0;
/// Two different detected brands are a strong negative signal: whatever the
/// rest of the title shares, the listing cannot rank above Related.
const BRAND_MISMATCH_CAP: f64 = 35.0;

/// Weighted token scorer. Brand and model-code agreement dominate generic
/// word overlap; a plain Jaccard treats "MSI" and "mochila" alike.
pub struct ProductMatcher;

impl ProductMatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, reference: &TokenSet, candidate: &TokenSet) -> MatchResult {
        if same_identity(reference, candidate) {
            return MatchResult { score: 100.0, tier: MatchTier::Exact };
        }

        let mut score = 0.0;
        let mut brand_conflict = false;

        match (&reference.brand, &candidate.brand) {
            (Some(a), Some(b)) if a == b => score += BRAND_WEIGHT,
            (Some(_), Some(_)) => brand_conflict = true,
            // A missing brand on either side is neutral, not negative.
            _ => {}
        }

        if let (Some(a), Some(b)) = (&reference.model_code, &candidate.model_code) {
            score += MODEL_WEIGHT * model_code_affinity(a, b);
        }

        score += OVERLAP_WEIGHT * descriptive_overlap(&reference.tokens, &candidate.tokens);

        if brand_conflict {
            score = score.min(BRAND_MISMATCH_CAP);
        }
        let score = score.clamp(0.0, 100.0);

        MatchResult { score, tier: MatchTier::from_score(score) }
    }
}

/// Ordering for score-ranked views: higher score first, ties broken by
/// absolute price distance to the reference (closer first), unpriced rows
/// last, so output order is deterministic.
pub fn compare_by_score(a: &Listing, b: &Listing, reference_price: f64) -> Ordering {
    b.matched
        .score
        .partial_cmp(&a.matched.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            let dist = |l: &Listing| {
                l.amount()
                    .map(|amount| (amount - reference_price).abs())
                    .unwrap_or(f64::INFINITY)
            };
            dist(a).partial_cmp(&dist(b)).unwrap_or(Ordering::Equal)
        })
}

fn same_identity(a: &TokenSet, b: &TokenSet) -> bool {
    let set = |tokens: &[String]| tokens.iter().cloned().collect::<HashSet<_>>();
    a.brand == b.brand && a.model_code == b.model_code && set(&a.tokens) == set(&b.tokens)
}

/// Affinity of two SKU codes, separator- and case-insensitive. An identical
/// code is full credit, a prefix relation (274 vs 274F) is near-full, a
/// shared family stem of 3+ characters (B13WFKG vs B13VFK) is half.
fn model_code_affinity(a: &str, b: &str) -> f64 {
    let canon = |code: &str| {
        code.chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_uppercase()
    };
    let a = canon(a);
    let b = canon(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    let prefix_len = a
        .chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .count();
    if prefix_len == a.len().min(b.len()) && prefix_len >= 3 {
        0.8
    } else if prefix_len >= 3 {
        0.5
    } else {
        0.0
    }
}

fn descriptive_overlap(a: &[String], b: &[String]) -> f64 {
    let a: HashSet<&String> = a.iter().collect();
    let b: HashSet<&String> = b.iter().collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brands::BrandRegistry;
    use crate::normalizer::TokenNormalizer;

    fn token_set(brand: Option<&str>, model: Option<&str>, tokens: &[&str]) -> TokenSet {
        TokenSet {
            brand: brand.map(str::to_string),
            model_code: model.map(str::to_string),
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn identical_token_sets_score_exactly_100() {
        let matcher = ProductMatcher::new();
        let plain = token_set(None, None, &["funda", "silicona", "negra"]);
        let result = matcher.score(&plain, &plain);
        assert_eq!(result.score, 100.0);
        assert_eq!(result.tier, MatchTier::Exact);

        // Order does not matter: tokens compare as a set.
        let shuffled = token_set(None, None, &["negra", "funda", "silicona"]);
        assert_eq!(matcher.score(&plain, &shuffled).score, 100.0);
    }

    #[test]
    fn msi_cyborg_family_lands_in_very_similar() {
        let registry = BrandRegistry::spanish_market();
        let normalizer = TokenNormalizer::new(&registry);
        let matcher = ProductMatcher::new();

        let reference = normalizer.normalize("MSI Cyborg 15 B13WFKG-687XES");
        let candidate = normalizer.normalize("MSI Cyborg 15 B13VFK");
        let result = matcher.score(&reference, &candidate);

        assert_eq!(result.tier, MatchTier::VerySimilar, "score was {}", result.score);
    }

    #[test]
    fn brand_conflict_caps_the_score() {
        let matcher = ProductMatcher::new();
        let a = token_set(Some("playstation"), None, &["consola", "digital", "blanca"]);
        let b = token_set(Some("xbox"), None, &["consola", "digital", "blanca"]);
        let result = matcher.score(&a, &b);
        assert!(result.score <= 35.0);
        assert_ne!(result.tier, MatchTier::Exact);
    }

    #[test]
    fn missing_brand_is_neutral_not_negative() {
        let matcher = ProductMatcher::new();
        let branded = token_set(Some("msi"), None, &["portatil", "gaming"]);
        let unbranded = token_set(None, None, &["portatil", "gaming"]);
        // Full descriptive overlap, no cap applied.
        assert_eq!(matcher.score(&branded, &unbranded).score, 25.0);
    }

    #[test]
    fn adding_a_matching_model_code_never_lowers_the_score() {
        let matcher = ProductMatcher::new();
        let reference = token_set(Some("msi"), Some("B13WFKG"), &["cyborg", "15"]);
        let without_code = token_set(Some("msi"), None, &["cyborg", "15"]);
        let with_code = token_set(Some("msi"), Some("B13WFKG"), &["cyborg", "15"]);

        let base = matcher.score(&reference, &without_code).score;
        let improved = matcher.score(&reference, &with_code).score;
        assert!(improved >= base, "{improved} < {base}");
    }

    #[test]
    fn model_code_affinity_grades_prefix_and_family() {
        assert_eq!(model_code_affinity("274F", "274F"), 1.0);
        assert_eq!(model_code_affinity("274", "274F"), 0.8);
        assert_eq!(model_code_affinity("B13WFKG-687XES", "B13VFK"), 0.5);
        assert_eq!(model_code_affinity("B13WFKG", "ANV15"), 0.0);
        // Separator and case differences are ignored.
        assert_eq!(model_code_affinity("b13wfkg687xes", "B13WFKG-687XES"), 1.0);
    }

    #[test]
    fn score_ranked_ties_prefer_the_closer_price() {
        use crate::model::{ParsedPrice, RawResult, ResultType};

        let listing = |amount: f64| Listing {
            raw: RawResult {
                title: "x".into(),
                price_text: None,
                url: format!("https://a.es/{amount}"),
                domain: "a.es".into(),
                result_type: ResultType::ShoppingAd,
                serp_rank: 1,
            },
            price: Some(ParsedPrice::single(amount)),
            matched: MatchResult { score: 80.0, tier: MatchTier::VerySimilar },
        };

        let far = listing(900.0);
        let near = listing(610.0);
        assert_eq!(compare_by_score(&near, &far, 600.0), Ordering::Less);
    }
}
