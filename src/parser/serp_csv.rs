// Importer for the rank-tracker browser extension CSV export.
use crate::model::{ImportError, RawResult, ResultType};
use crate::utils::normalize_domain;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{info, warn};

/// Price comparators and CSS partners. Their rows relay other stores'
/// products and are never competitor listings themselves.
const SKIP_DOMAINS: &[&str] = &[
    "kelkoo",
    "idealo",
    "shopping.com",
    "shoparize",
    "producthero",
    "delupe",
    "adference",
    "klarna",
    "redbrain",
    "surferseo",
    "google.com",
    "pricerunner",
    "twenga",
    "shopmania",
    "ciao",
];

static LEADING_OFFER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^oferta\s*").expect("offer prefix pattern"));

/// First digit run that leads into a € sign. Everything from there on is
/// price and store chrome, not title.
static PRICE_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d.,]*\s*€").expect("price tail pattern"));

/// Shipping and store noise glued to the end of the anchor text. The last
/// one drops a trailing Capitalized store name, case-sensitive so model
/// codes and lowercase descriptors survive.
static TRAILING_NOISE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)sin coste.*$",
        r"(?i)env[ií]o.*$",
        r"(?i)gratis.*$",
        r"(?i)\d+\s*d[ií]as.*$",
        r"[A-Z][a-z]+\s*(ES|España)?\s*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("trailing noise pattern"))
    .collect()
});

pub trait Importer {
    fn import(&self, content: &str) -> Result<Vec<RawResult>, ImportError>;
}

/// Reads the extension export (`Sr.,Rank,Type,Domain,Link,Anchor,...`)
/// into RawResult rows. A malformed row is skipped with a warning, never
/// fatal; only a missing header column fails the whole file.
pub struct SerpCsvImporter;

impl SerpCsvImporter {
    pub fn new() -> Self {
        Self
    }
}

impl Importer for SerpCsvImporter {
    fn import(&self, content: &str) -> Result<Vec<RawResult>, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(ImportError::MissingColumn(name))
        };
        let type_col = column("Type")?;
        let rank_col = column("Rank")?;
        let domain_col = column("Domain")?;
        let link_col = column("Link")?;
        let anchor_col = column("Anchor")?;

        let mut rows = Vec::new();
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut unreadable = 0usize;

        for (index, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!("skipping row {}: {}", index + 2, e);
                    unreadable += 1;
                    continue;
                }
            };
            let field = |col: usize| record.get(col).unwrap_or("").trim();

            let Some(result_type) = ResultType::from_export(field(type_col)) else {
                continue;
            };

            let domain = normalize_domain(field(domain_col));
            if SKIP_DOMAINS.iter().any(|skip| domain.contains(skip)) {
                continue;
            }

            let url = field(link_col).to_string();
            if url.is_empty() || !seen_urls.insert(url.clone()) {
                continue;
            }

            let anchor = record.get(anchor_col).unwrap_or("").trim();
            let title = clean_title(anchor);
            if title.chars().count() < 5 {
                continue;
            }

            rows.push(RawResult {
                title,
                price_text: Some(anchor.to_string()).filter(|t| !t.is_empty()),
                url,
                domain,
                result_type,
                serp_rank: field(rank_col).parse().unwrap_or(0),
            });
        }

        if unreadable > 0 {
            info!("import finished with {unreadable} unreadable rows");
        }
        Ok(rows)
    }
}

/// Extracts the product title from the anchor blob: drops the leading
/// "Oferta" badge, collapses a doubled lead word, cuts at the first price
/// and strips trailing shipping/store noise.
fn clean_title(anchor: &str) -> String {
    let mut title = LEADING_OFFER.replace(anchor, "").to_string();

    let words: Vec<&str> = title.split_whitespace().collect();
    if words.len() >= 2 && words[0].to_lowercase() == words[1].to_lowercase() {
        title = words[1..].join(" ");
    }

    if let Some(price) = PRICE_TAIL.find(&title) {
        title.truncate(price.start());
    }
    for pattern in TRAILING_NOISE.iter() {
        if let Some(noise) = pattern.find(&title) {
            title.truncate(noise.start());
        }
    }

    title.trim().to_string()
}
