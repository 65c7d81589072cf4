use crate::brands::BrandRegistry;
use crate::model::{ExtractedAttributes, TokenSet};
use crate::utils::fold_diacritics;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Closed stopword list: Spanish and English function words plus the
/// marketing filler that SERP titles repeat on every row.
static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "de", "del", "la", "el", "los", "las", "un", "una", "unos", "unas", "y", "o", "en",
        "con", "para", "por", "sin", "sobre", "the", "an", "and", "or", "of", "for", "with",
        "to", "in", "on", "es", "eu", "com", "www", "http", "https", "nuevo", "nueva", "new",
        "oficial", "original", "version", "edicion", "edition", "pack", "kit", "set",
        "bundle", "combo", "lote", "oferta",
    ]
    .into_iter()
    .collect()
});

/// SKU shapes, probed in order against the raw uppercased title so codes like
/// B13WFKG-687XES survive tokenization intact. First match wins.
static MODEL_CODE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b[A-Z]\d{2}[A-Z]{2,}[-_]?\d{3,}[A-Z]*\b",
        r"\b[A-Z]{2,}\d{2,}[-_][A-Z0-9]+\b",
        r"\b[A-Z]\d{2}[A-Z]{2,}\b",
        r"\b[A-Z]{2,}\d{3,}[A-Z]*\b",
        r"\b\d{3,}[A-Z]+\b",
        r"\b\d{2}[A-Z]{2,}\d+[A-Z]*\b",
        r"\b[A-Z]\d{2,4}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("model code pattern"))
    .collect()
});

/// A digit run with a unit suffix is a capacity/spec token, never a SKU.
static CAPACITY_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(GB|TB|MB|KG|G|L|ML|W|V|HZ|MAH|MM|CM)$").expect("capacity pattern")
});

/// Units that glue onto the preceding number ("256 gb" and "256gb" must
/// compare equal).
const MERGE_UNITS: &[&str] = &[
    "gb", "tb", "mb", "kg", "g", "l", "ml", "w", "v", "hz", "mah", "mm", "cm", "pulgadas",
];

/// Turns free-text titles into comparable token sets against one brand
/// registry. Stateless apart from the registry, safe to reuse across rows.
pub struct TokenNormalizer<'a> {
    registry: &'a BrandRegistry,
}

impl<'a> TokenNormalizer<'a> {
    pub fn new(registry: &'a BrandRegistry) -> Self {
        Self { registry }
    }

    /// Normalization order is fixed: case fold, diacritic fold, model-code
    /// scan on the raw title, tokenize, stopwords, unit merge, brand
    /// resolution. Running it twice yields the same TokenSet.
    pub fn normalize(&self, title: &str) -> TokenSet {
        let model_code = detect_model_code(title);

        let folded = fold_diacritics(&title.to_lowercase());
        let mut tokens: Vec<String> = folded
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() >= 2 && !STOP_WORDS.contains(t))
            .map(str::to_string)
            .collect();

        tokens = merge_capacity_units(tokens);

        let brand = self.registry.resolve(&tokens).map(|hit| {
            let consumed: HashSet<usize> = hit.consumed.iter().copied().collect();
            tokens = tokens
                .iter()
                .enumerate()
                .filter(|(i, _)| !consumed.contains(i))
                .map(|(_, t)| t.clone())
                .collect();
            hit.canonical
        });

        // Fragments of the detected code stay out of the descriptive set so
        // the matcher scores model identity exactly once.
        if let Some(code) = &model_code {
            let fragments: HashSet<String> = code
                .split(|c: char| !c.is_alphanumeric())
                .filter(|f| !f.is_empty())
                .map(str::to_lowercase)
                .collect();
            tokens.retain(|t| !fragments.contains(t));
        }

        TokenSet { brand, model_code, tokens }
    }

    /// Merges collaborator-extracted attributes over a heuristic TokenSet.
    /// Present fields override, extra attributes extend the descriptive set.
    pub fn merge_attributes(&self, base: &TokenSet, attrs: &ExtractedAttributes) -> TokenSet {
        let mut merged = base.clone();

        if let Some(brand) = attrs.brand.as_deref().filter(|b| !b.trim().is_empty()) {
            let brand_tokens: Vec<String> = fold_diacritics(&brand.to_lowercase())
                .split(|c: char| !c.is_alphanumeric())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            merged.brand = match brand_tokens.as_slice() {
                [single] => Some(
                    self.registry
                        .canonical_for(single)
                        .map_or_else(|| single.clone(), str::to_string),
                ),
                _ => self
                    .registry
                    .resolve(&brand_tokens)
                    .map(|hit| hit.canonical)
                    .or_else(|| Some(brand_tokens.join(" "))),
            };
        }

        if let Some(code) = attrs.model_code.as_deref().filter(|c| !c.trim().is_empty()) {
            merged.model_code = Some(code.trim().to_uppercase());
        }

        for attr in &attrs.attributes {
            for token in fold_diacritics(&attr.to_lowercase())
                .split(|c: char| !c.is_alphanumeric())
                .filter(|t| t.len() >= 2 && !STOP_WORDS.contains(t))
            {
                if !merged.tokens.iter().any(|t| t == token) {
                    merged.tokens.push(token.to_string());
                }
            }
        }

        merged
    }
}

fn detect_model_code(title: &str) -> Option<String> {
    let upper = title.to_uppercase();
    MODEL_CODE_PATTERNS.iter().find_map(|pattern| {
        pattern
            .find_iter(&upper)
            .map(|m| m.as_str())
            .find(|code| !CAPACITY_SHAPE.is_match(code))
            .map(str::to_string)
    })
}

fn merge_capacity_units(tokens: Vec<String>) -> Vec<String> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let is_number = tokens[i].chars().all(|c| c.is_ascii_digit());
        if is_number && i + 1 < tokens.len() && MERGE_UNITS.contains(&tokens[i + 1].as_str()) {
            merged.push(format!("{}{}", tokens[i], tokens[i + 1]));
            i += 2;
        } else {
            merged.push(tokens[i].clone());
            i += 1;
        }
    }
    merged
}
