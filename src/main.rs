mod config;
mod model;
mod utils;
mod brands;
mod parser;
mod normalizer;
mod matcher;
mod analyzer;
mod enrich;
mod report;

use analyzer::{Analyzer, IdentityResolver};
use brands::BrandRegistry;
use config::load_config;
use enrich::ClaudeEnricher;
use matcher::ProductMatcher;
use model::Listing;
use normalizer::TokenNormalizer;
use parser::serp_csv::Importer;
use parser::{PriceParser, SerpCsvImporter};
use std::fs;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json_output = args.iter().any(|a| a == "--json");
    let Some(csv_path) = args.iter().find(|a| !a.starts_with("--")).cloned() else {
        error!("usage: serp-sniper <export.csv> [--json]");
        return;
    };

    // Load configuration from file
    let config = match load_config("config.json") {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    let content = match fs::read_to_string(&csv_path) {
        Ok(content) => content,
        Err(e) => {
            error!("Cannot read {}: {}", csv_path, e);
            return;
        }
    };

    info!("Importing {}...", csv_path);
    let rows = match SerpCsvImporter::new().import(&content) {
        Ok(rows) => rows,
        Err(e) => {
            error!("Import error: {}", e);
            return;
        }
    };
    info!("Imported {} listings", rows.len());

    // Optional LLM enrichment; any failure falls back to the heuristic path.
    let attributes = match &config.enrichment {
        Some(enrich_cfg) => {
            info!("Enriching {} titles...", rows.len());
            let titles: Vec<String> = rows.iter().map(|r| r.title.clone()).collect();
            let enricher = ClaudeEnricher::new(enrich_cfg);
            enrich::extract_all(&enricher, &titles, enrich_cfg.chunk_size).await
        }
        None => vec![None; rows.len()],
    };

    let registry = BrandRegistry::spanish_market();
    let normalizer = TokenNormalizer::new(&registry);
    let price_parser = PriceParser::new();
    let matcher = ProductMatcher::new();

    let reference_tokens = normalizer.normalize(&config.reference.title);
    let mut unpriced = 0usize;
    let listings: Vec<Listing> = rows
        .into_iter()
        .zip(attributes)
        .map(|(raw, attrs)| {
            let price = raw
                .price_text
                .as_deref()
                .and_then(|text| price_parser.parse(text).ok());
            if price.is_none() {
                unpriced += 1;
            }
            let mut tokens = normalizer.normalize(&raw.title);
            if let Some(attrs) = &attrs {
                tokens = normalizer.merge_attributes(&tokens, attrs);
            }
            let matched = matcher.score(&reference_tokens, &tokens);
            Listing { raw, price, matched }
        })
        .collect();
    if unpriced > 0 {
        info!("{} listings carry no recognizable price", unpriced);
    }

    let own_index = IdentityResolver::new().identify(&listings, &config.reference);
    match own_index {
        Some(index) => info!("Own listing identified: {}", listings[index].raw.url),
        None => warn!("Own listing not found, reporting the market only"),
    }

    let analyzer = Analyzer::new(config.analyzer.clone());
    let summary = analyzer.analyze(&listings, own_index, &config.reference);

    if json_output {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => error!("JSON export error: {}", e),
        }
    } else {
        println!("{}", report::render(&summary, &config.reference));
    }
}
