// Advisory pricing rules evaluated over the filtered ranking.
use crate::config::{AnalyzerConfig, ReferenceProduct};
use crate::model::{Listing, MatchTier, Priority, Recommendation, RecommendationKind};
use crate::utils::{normalize_domain, round2};

fn is_equivalent(listing: &Listing) -> bool {
    matches!(listing.matched.tier, MatchTier::Exact | MatchTier::VerySimilar)
}

/// Evaluates every rule independently and emits all that apply, sorted
/// High to Low. `ranking` is the in-band price-sorted set; `listings` is
/// the full import, needed for the visibility rules that also look at
/// unpriced and outlier rows.
pub(super) fn recommend(
    listings: &[Listing],
    ranking: &[Listing],
    own_index: Option<usize>,
    reference: &ReferenceProduct,
    cfg: &AnalyzerConfig,
) -> Vec<Recommendation> {
    let own_url = own_index.map(|i| listings[i].raw.url.as_str());
    let competitors: Vec<&Listing> = ranking
        .iter()
        .filter(|l| Some(l.raw.url.as_str()) != own_url)
        .collect();

    let mut recommendations = Vec::new();

    // Undercut the third-ranked competitor (or the last one when fewer).
    if !competitors.is_empty() {
        let slot = competitors.len().min(3) - 1;
        if let Some(target) = competitors[slot].amount() {
            if reference.price > target {
                let new_price = round2(target - 0.01);
                let cut = round2(reference.price - new_price);
                recommendations.push(Recommendation {
                    kind: RecommendationKind::PriceReduction,
                    priority: Priority::High,
                    title: "Reducir precio para competir".into(),
                    detail: format!(
                        "Estás en {:.2} € y el puesto {} del ranking cuesta {:.2} € ({}).",
                        reference.price,
                        slot + 1,
                        target,
                        competitors[slot].raw.domain
                    ),
                    action: format!("Baja {cut:.2} € hasta {new_price:.2} € para entrar en el top 3"),
                });
            }
        }
    }

    let equivalents: Vec<&Listing> = competitors
        .iter()
        .copied()
        .filter(|l| is_equivalent(l))
        .collect();

    // Room to raise, bounded by the cheapest equivalent competitor.
    let min_equivalent = equivalents
        .iter()
        .filter_map(|l| l.amount())
        .min_by(f64::total_cmp);
    if let Some(floor) = min_equivalent {
        if reference.price < floor {
            let ceiling = round2(floor - 0.01);
            recommendations.push(Recommendation {
                kind: RecommendationKind::PriceIncrease,
                priority: Priority::Medium,
                title: "Margen de subida".into(),
                detail: format!(
                    "El producto equivalente más barato de la competencia cuesta {floor:.2} €."
                ),
                action: format!(
                    "Podrías subir hasta {ceiling:.2} € sin dejar de ser el más barato entre los equivalentes"
                ),
            });
        }
    }

    // Equivalent competitors running deep markdowns below the reference.
    let aggressive: Vec<&Listing> = equivalents
        .iter()
        .copied()
        .filter(|l| {
            l.price.as_ref().is_some_and(|p| {
                p.is_offer
                    && p.amount < reference.price
                    && p.discount_pct()
                        .is_some_and(|d| d >= cfg.aggressive_discount_pct)
            })
        })
        .collect();
    if !aggressive.is_empty() {
        let mut stores: Vec<&str> = aggressive.iter().map(|l| l.raw.domain.as_str()).collect();
        stores.dedup();
        stores.truncate(3);
        recommendations.push(Recommendation {
            kind: RecommendationKind::AggressiveOffer,
            priority: Priority::High,
            title: format!("{} competidores con ofertas agresivas", aggressive.len()),
            detail: format!(
                "Descuentos de más del {:.0}% por debajo de tu precio en {}.",
                cfg.aggressive_discount_pct,
                stores.join(", ")
            ),
            action: "Monitoriza estas ofertas y considera responder".into(),
        });
    }

    // The cheapest equivalent undercutting the reference by more than the
    // configured margin.
    let cheapest_equivalent = equivalents
        .iter()
        .copied()
        .filter(|l| {
            l.amount()
                .is_some_and(|a| reference.price - a > cfg.cheaper_margin)
        })
        .min_by(|a, b| {
            a.amount()
                .unwrap_or(f64::INFINITY)
                .total_cmp(&b.amount().unwrap_or(f64::INFINITY))
        });
    if let Some(cheapest) = cheapest_equivalent {
        if let Some(amount) = cheapest.amount() {
            let gap = round2(reference.price - amount);
            recommendations.push(Recommendation {
                kind: RecommendationKind::SimilarCheaper,
                priority: Priority::High,
                title: "Producto muy similar más barato".into(),
                detail: format!(
                    "{} tiene un producto equivalente a {:.2} € ({:.2} € menos que tú).",
                    cheapest.raw.domain, amount, gap
                ),
                action: "Revisa si es el mismo producto y ajusta tu precio".into(),
            });
        }
    }

    // Visibility rules look at the raw import, unpriced rows included.
    let domain = normalize_domain(&reference.domain);
    let store_rows = listings
        .iter()
        .filter(|l| normalize_domain(&l.raw.domain) == domain)
        .count();
    if own_index.is_none() && store_rows == 0 {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Visibility,
            priority: Priority::High,
            title: "No apareces en los resultados".into(),
            detail: "Ningún resultado de la búsqueda pertenece a tu dominio.".into(),
            action: "Revisa tu feed de productos y las campañas de Shopping".into(),
        });
    }
    if store_rows > 1 {
        recommendations.push(Recommendation {
            kind: RecommendationKind::CatalogOverlap,
            priority: Priority::Low,
            title: format!("{store_rows} productos tuyos aparecen"),
            detail: "Tienes varios productos posicionados para esta búsqueda.".into(),
            action: "Revisa si todos son relevantes o hay canibalización".into(),
        });
    }

    recommendations.sort_by_key(|r| r.priority);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MatchResult, ParsedPrice, RawResult, ResultType};

    fn listing(domain: &str, amount: f64, tier: MatchTier) -> Listing {
        Listing {
            raw: RawResult {
                title: format!("producto {domain}"),
                price_text: None,
                url: format!("https://{domain}/p/{amount}"),
                domain: domain.into(),
                result_type: ResultType::ShoppingAd,
                serp_rank: 1,
            },
            price: Some(ParsedPrice::single(amount)),
            matched: MatchResult { score: 80.0, tier },
        }
    }

    fn offer_listing(domain: &str, amount: f64, original: f64) -> Listing {
        let mut l = listing(domain, amount, MatchTier::VerySimilar);
        l.price = Some(ParsedPrice::offer(amount, original).unwrap());
        l
    }

    fn reference(price: f64) -> ReferenceProduct {
        ReferenceProduct {
            title: "MSI Cyborg 15".into(),
            domain: "mitienda.es".into(),
            url: None,
            price,
        }
    }

    fn kinds(recs: &[Recommendation]) -> Vec<RecommendationKind> {
        recs.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn priced_above_third_rank_suggests_a_cut() {
        let ranking = vec![
            listing("a.es", 500.0, MatchTier::Similar),
            listing("b.es", 550.0, MatchTier::Similar),
            listing("c.es", 600.0, MatchTier::Similar),
            listing("d.es", 700.0, MatchTier::Similar),
        ];
        let recs = recommend(&ranking, &ranking, None, &reference(650.0), &AnalyzerConfig::default());

        let cut = recs
            .iter()
            .find(|r| r.kind == RecommendationKind::PriceReduction)
            .unwrap();
        assert!(cut.action.contains("599.99"), "{}", cut.action);
        assert!(cut.action.contains("50.01"), "{}", cut.action);
    }

    #[test]
    fn fewer_than_three_competitors_targets_the_last_one() {
        let ranking = vec![listing("a.es", 500.0, MatchTier::Similar)];
        let recs = recommend(&ranking, &ranking, None, &reference(650.0), &AnalyzerConfig::default());
        let cut = recs
            .iter()
            .find(|r| r.kind == RecommendationKind::PriceReduction)
            .unwrap();
        assert!(cut.action.contains("499.99"), "{}", cut.action);
    }

    #[test]
    fn cheapest_overall_gets_a_raise_ceiling_from_equivalents() {
        let ranking = vec![
            listing("a.es", 620.0, MatchTier::VerySimilar),
            listing("b.es", 700.0, MatchTier::Different),
        ];
        let recs = recommend(&ranking, &ranking, None, &reference(600.0), &AnalyzerConfig::default());

        let raise = recs
            .iter()
            .find(|r| r.kind == RecommendationKind::PriceIncrease)
            .unwrap();
        assert!(raise.action.contains("619.99"), "{}", raise.action);
        assert_eq!(raise.priority, Priority::Medium);
    }

    #[test]
    fn deep_markdown_below_reference_raises_an_alert() {
        let ranking = vec![offer_listing("agresivo.es", 480.0, 600.0)];
        let recs = recommend(&ranking, &ranking, None, &reference(650.0), &AnalyzerConfig::default());

        let alert = recs
            .iter()
            .find(|r| r.kind == RecommendationKind::AggressiveOffer)
            .unwrap();
        assert!(alert.detail.contains("agresivo.es"));
        assert_eq!(alert.priority, Priority::High);
    }

    #[test]
    fn shallow_markdowns_do_not_alert() {
        // 10% off, under the default 15% threshold.
        let ranking = vec![offer_listing("tibio.es", 540.0, 600.0)];
        let recs = recommend(&ranking, &ranking, None, &reference(650.0), &AnalyzerConfig::default());
        assert!(!kinds(&recs).contains(&RecommendationKind::AggressiveOffer));
    }

    #[test]
    fn cheaper_equivalent_is_flagged_and_named() {
        let ranking = vec![
            listing("caro.es", 700.0, MatchTier::VerySimilar),
            listing("barato.es", 560.0, MatchTier::Exact),
            listing("generico.es", 400.0, MatchTier::Different),
        ];
        let recs = recommend(&ranking, &ranking, None, &reference(650.0), &AnalyzerConfig::default());

        let flag = recs
            .iter()
            .find(|r| r.kind == RecommendationKind::SimilarCheaper)
            .unwrap();
        assert!(flag.detail.contains("barato.es"));
        assert!(flag.detail.contains("90.00"));
    }

    #[test]
    fn own_row_is_not_its_own_competitor() {
        let mut own = listing("mitienda.es", 500.0, MatchTier::Exact);
        own.raw.url = "https://mitienda.es/p/propio".into();
        let listings = vec![own, listing("b.es", 700.0, MatchTier::VerySimilar)];
        let recs = recommend(
            &listings,
            &listings,
            Some(0),
            &reference(500.0),
            &AnalyzerConfig::default(),
        );
        // The own 500 € row must not trigger the cheaper-equivalent flag.
        assert!(!kinds(&recs).contains(&RecommendationKind::SimilarCheaper));
    }

    #[test]
    fn absent_store_triggers_visibility_alert() {
        let ranking = vec![listing("otro.es", 600.0, MatchTier::Similar)];
        let recs = recommend(&ranking, &ranking, None, &reference(600.0), &AnalyzerConfig::default());
        assert!(kinds(&recs).contains(&RecommendationKind::Visibility));
    }

    #[test]
    fn several_own_rows_note_catalog_overlap() {
        let listings = vec![
            listing("mitienda.es", 600.0, MatchTier::Exact),
            listing("mitienda.es", 900.0, MatchTier::Related),
        ];
        let recs = recommend(
            &listings,
            &listings,
            Some(0),
            &reference(600.0),
            &AnalyzerConfig::default(),
        );
        let overlap = recs
            .iter()
            .find(|r| r.kind == RecommendationKind::CatalogOverlap)
            .unwrap();
        assert_eq!(overlap.priority, Priority::Low);
    }

    #[test]
    fn output_sorts_high_to_low() {
        let listings = vec![
            listing("mitienda.es", 600.0, MatchTier::Exact),
            listing("mitienda.es", 900.0, MatchTier::Related),
            listing("a.es", 620.0, MatchTier::VerySimilar),
        ];
        let recs = recommend(
            &listings,
            &listings,
            Some(0),
            &reference(600.0),
            &AnalyzerConfig::default(),
        );
        let priorities: Vec<Priority> = recs.iter().map(|r| r.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
        assert!(priorities.len() >= 2);
    }
}
