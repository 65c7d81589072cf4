use crate::analyzer::recommendations;
use crate::config::{AnalyzerConfig, ReferenceProduct};
use crate::matcher::compare_by_score;
use crate::model::{AnalysisSummary, Listing, PriceStats};
use crate::utils::normalize_domain;
use chrono::Utc;
use std::collections::HashSet;
use tracing::info;

/// Turns scored listings into the run summary: outlier filter, price
/// ranking, own position, stats and the recommendation set. Pure over its
/// inputs; a run can be repeated or re-ordered freely.
pub struct Analyzer {
    cfg: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(cfg: AnalyzerConfig) -> Self {
        Self { cfg }
    }

    fn in_band(&self, amount: f64) -> bool {
        amount > self.cfg.outlier_min && amount < self.cfg.outlier_max
    }

    pub fn analyze(
        &self,
        listings: &[Listing],
        own_index: Option<usize>,
        reference: &ReferenceProduct,
    ) -> AnalysisSummary {
        let priced_listings = listings.iter().filter(|l| l.amount().is_some()).count();
        let outlier_listings = listings
            .iter()
            .filter(|l| l.amount().is_some_and(|a| !self.in_band(a)))
            .count();

        let amount_of = |index: usize| listings[index].amount().unwrap_or(f64::MAX);
        let mut ranked: Vec<usize> = (0..listings.len())
            .filter(|&i| listings[i].amount().is_some_and(|a| self.in_band(a)))
            .collect();
        // Stable, so equal amounts keep their source order.
        ranked.sort_by(|&a, &b| amount_of(a).total_cmp(&amount_of(b)));

        let own_position = own_index
            .and_then(|own| ranked.iter().position(|&i| i == own))
            .map(|p| p + 1);
        let own_serp_position = own_index
            .map(|i| listings[i].raw.serp_rank as usize)
            .filter(|&rank| rank > 0);

        let amounts: Vec<f64> = ranked.iter().map(|&i| amount_of(i)).collect();
        let stats = price_stats(&amounts);

        let distinct_stores = listings
            .iter()
            .filter(|l| l.amount().is_some())
            .map(|l| normalize_domain(&l.raw.domain))
            .collect::<HashSet<_>>()
            .len();

        let ranking: Vec<Listing> = ranked.iter().map(|&i| listings[i].clone()).collect();

        let mut top_matches = listings.to_vec();
        top_matches.sort_by(|a, b| compare_by_score(a, b, reference.price));

        let recommendations =
            recommendations::recommend(listings, &ranking, own_index, reference, &self.cfg);

        info!(
            "analyzed {} listings: {} ranked, {} outliers, {} recommendations",
            listings.len(),
            ranking.len(),
            outlier_listings,
            recommendations.len()
        );

        AnalysisSummary {
            generated_at: Utc::now(),
            total_listings: listings.len(),
            priced_listings,
            outlier_listings,
            distinct_stores,
            stats,
            ranking,
            own_position,
            own_serp_position,
            top_matches,
            recommendations,
        }
    }
}

/// Stats over the already-sorted in-band amounts.
fn price_stats(sorted_amounts: &[f64]) -> Option<PriceStats> {
    let (Some(min), Some(max)) = (sorted_amounts.first(), sorted_amounts.last()) else {
        return None;
    };
    let count = sorted_amounts.len();
    let avg = sorted_amounts.iter().sum::<f64>() / count as f64;
    let mid = count / 2;
    let median = if count % 2 == 0 {
        (sorted_amounts[mid - 1] + sorted_amounts[mid]) / 2.0
    } else {
        sorted_amounts[mid]
    };
    Some(PriceStats { min: *min, max: *max, avg, median })
}
