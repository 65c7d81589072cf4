use crate::config::ReferenceProduct;
use crate::model::Listing;
use crate::utils::{normalize_domain, normalize_url};

/// Locates the merchant's own row among the imported listings.
pub struct IdentityResolver;

impl IdentityResolver {
    pub fn new() -> Self {
        Self
    }

    /// An exact normalized-URL match is authoritative. Otherwise, among the
    /// rows on the reference domain, the one whose parsed price sits closest
    /// to the reference price wins, ties going to the earliest row. No row
    /// on the domain means no identity; the resolver never guesses.
    pub fn identify(&self, listings: &[Listing], reference: &ReferenceProduct) -> Option<usize> {
        if let Some(url) = reference.url.as_deref().filter(|u| !u.trim().is_empty()) {
            let wanted = normalize_url(url);
            if let Some(index) = listings
                .iter()
                .position(|l| normalize_url(&l.raw.url) == wanted)
            {
                return Some(index);
            }
        }

        let domain = normalize_domain(&reference.domain);
        let mut best: Option<(usize, f64)> = None;
        for (index, listing) in listings.iter().enumerate() {
            if normalize_domain(&listing.raw.domain) != domain {
                continue;
            }
            let distance = listing
                .amount()
                .map(|amount| (amount - reference.price).abs())
                .unwrap_or(f64::INFINITY);
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MatchResult, MatchTier, ParsedPrice, RawResult, ResultType};

    fn listing(domain: &str, url: &str, amount: Option<f64>) -> Listing {
        Listing {
            raw: RawResult {
                title: "MSI Cyborg 15".into(),
                price_text: None,
                url: url.into(),
                domain: domain.into(),
                result_type: ResultType::ShoppingAd,
                serp_rank: 1,
            },
            price: amount.map(ParsedPrice::single),
            matched: MatchResult { score: 80.0, tier: MatchTier::VerySimilar },
        }
    }

    fn reference(domain: &str, url: Option<&str>, price: f64) -> ReferenceProduct {
        ReferenceProduct {
            title: "MSI Cyborg 15".into(),
            domain: domain.into(),
            url: url.map(str::to_string),
            price,
        }
    }

    #[test]
    fn exact_url_match_beats_every_other_signal() {
        let listings = vec![
            listing("mitienda.es", "https://mitienda.es/p/otro", Some(599.99)),
            listing("competidor.es", "https://competidor.es/p/1", Some(599.99)),
            listing("mitienda.es", "https://www.mitienda.es/p/123/", Some(1500.0)),
        ];
        let reference = reference("otrodominio.es", Some("http://mitienda.es/p/123"), 599.99);
        assert_eq!(
            IdentityResolver::new().identify(&listings, &reference),
            Some(2)
        );
    }

    #[test]
    fn domain_rows_resolve_by_price_proximity() {
        let listings = vec![
            listing("competidor.es", "https://competidor.es/p/1", Some(599.99)),
            listing("mitienda.es", "https://mitienda.es/p/1", Some(599.99)),
            listing("mitienda.es", "https://mitienda.es/p/2", Some(649.0)),
        ];
        let reference = reference("mitienda.es", None, 599.99);
        assert_eq!(
            IdentityResolver::new().identify(&listings, &reference),
            Some(1)
        );
    }

    #[test]
    fn proximity_ties_go_to_the_first_row() {
        let listings = vec![
            listing("mitienda.es", "https://mitienda.es/p/1", Some(610.0)),
            listing("mitienda.es", "https://mitienda.es/p/2", Some(590.0)),
        ];
        let reference = reference("www.MiTienda.es", None, 600.0);
        assert_eq!(
            IdentityResolver::new().identify(&listings, &reference),
            Some(0)
        );
    }

    #[test]
    fn unpriced_domain_rows_rank_after_priced_ones() {
        let listings = vec![
            listing("mitienda.es", "https://mitienda.es/p/1", None),
            listing("mitienda.es", "https://mitienda.es/p/2", Some(820.0)),
        ];
        let reference = reference("mitienda.es", None, 600.0);
        assert_eq!(
            IdentityResolver::new().identify(&listings, &reference),
            Some(1)
        );
    }

    #[test]
    fn no_domain_match_resolves_to_none() {
        let listings = vec![listing("competidor.es", "https://competidor.es/p/1", Some(600.0))];
        let reference = reference("mitienda.es", None, 600.0);
        assert_eq!(IdentityResolver::new().identify(&listings, &reference), None);
    }
}
