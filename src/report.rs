// Terminal rendering of an analysis run.
use crate::config::ReferenceProduct;
use crate::model::{AnalysisSummary, Priority};
use std::fmt::Write;

const RANKING_ROWS: usize = 10;
const MATCH_ROWS: usize = 5;

fn priority_marker(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "🔴",
        Priority::Medium => "🟡",
        Priority::Low => "🟢",
    }
}

/// Formats the summary for the terminal: headline counters, the price
/// ranking with the own row starred, the closest matches and the advice
/// list.
pub fn render(summary: &AnalysisSummary, reference: &ReferenceProduct) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "📊 Análisis de mercado — {}", reference.title);
    let _ = writeln!(
        out,
        "🔎 {} resultados, {} con precio, {} fuera de rango, {} tiendas",
        summary.total_listings,
        summary.priced_listings,
        summary.outlier_listings,
        summary.distinct_stores
    );

    if let Some(stats) = &summary.stats {
        let _ = writeln!(
            out,
            "💶 Precios: mín {:.2} € | mediana {:.2} € | media {:.2} € | máx {:.2} €",
            stats.min, stats.median, stats.avg, stats.max
        );
    }

    if !summary.ranking.is_empty() {
        let _ = writeln!(out, "\n🏆 Ranking de precio:");
        for (index, listing) in summary.ranking.iter().take(RANKING_ROWS).enumerate() {
            let position = index + 1;
            let own = summary.own_position == Some(position);
            let marker = if own { " ⭐" } else { "" };
            let offer = listing
                .price
                .as_ref()
                .filter(|p| p.is_offer)
                .map(|_| " 🔥 oferta")
                .unwrap_or("");
            let amount = listing.amount().unwrap_or(0.0);
            let _ = writeln!(
                out,
                "{position:>3}. {amount:>9.2} € — {} ({}){offer}{marker}",
                listing.raw.domain,
                listing.matched.tier.label()
            );
        }
        match summary.own_position {
            Some(position) => {
                let _ = writeln!(
                    out,
                    "🏁 Tu posición: #{position} de {}",
                    summary.ranking.len()
                );
            }
            None => {
                let _ = writeln!(out, "🏁 Tu producto no aparece en el ranking");
            }
        }
        if let Some(serp) = summary.own_serp_position {
            let _ = writeln!(out, "📍 Posición SERP: #{serp}");
        }
    }

    if !summary.top_matches.is_empty() {
        let _ = writeln!(out, "\n🎯 Más parecidos:");
        for listing in summary.top_matches.iter().take(MATCH_ROWS) {
            let price = listing
                .amount()
                .map(|a| format!("{a:.2} €"))
                .unwrap_or_else(|| "sin precio".into());
            let _ = writeln!(
                out,
                " [{:>3.0}] {} — {} — {price}",
                listing.matched.score, listing.raw.domain, listing.raw.title
            );
        }
    }

    if !summary.recommendations.is_empty() {
        let _ = writeln!(out, "\n💡 Recomendaciones:");
        for rec in &summary.recommendations {
            let _ = writeln!(out, " {} {}", priority_marker(rec.priority), rec.title);
            let _ = writeln!(out, "    {}", rec.detail);
            let _ = writeln!(out, "    ➜ {}", rec.action);
        }
    }

    out
}
