// Price text normalization for SERP anchor blobs.
use crate::model::{ParsedPrice, PriceError};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Amounts outside this band never win offer-pair selection; a stray
/// "Envío 3 €" shipping note must not become the current price.
const PLAUSIBLE_MIN: f64 = 10.0;
const PLAUSIBLE_MAX: f64 = 10_000.0;

type Convert = fn(&Captures) -> Option<f64>;

/// Euro-anchored amount shapes in priority order. Each match claims its
/// character span, so a later shape never re-reads digits an earlier,
/// more specific shape already consumed.
static AMOUNT_SHAPES: LazyLock<Vec<(Regex, Convert)>> = LazyLock::new(|| {
    let shapes: [(&str, Convert); 7] = [
        // Spanish with thousands: 1.299,00 €
        (r"(\d{1,3}(?:\.\d{3})+),(\d{2})\s*€", decimal_amount),
        // US with thousands: 1,299.00 €
        (r"(\d{1,3}(?:,\d{3})+)\.(\d{2})\s*€", decimal_amount),
        // Single comma decimal: 599,99 €
        (r"(\d{1,4}),(\d{2})\s*€", decimal_amount),
        // Single dot decimal: 599.99 €
        (r"(\d{1,4})\.(\d{2})\s*€", decimal_amount),
        // Grouped integer, no decimals: 1.299 € is 1299 whole euros
        (r"(\d{1,3}(?:[.,]\d{3})+)\s*€", grouped_integer),
        // 5-6 bare digits are cents: 94900 € is 949.00. No euro reading
        // of that magnitude survives the plausible band anyway.
        (r"(\d{5,6})\s*€", cents_amount),
        // 1-4 bare digits are whole euros: 599 €
        (r"(\d{1,4})\s*€", whole_euros),
    ];
    shapes
        .into_iter()
        .map(|(pattern, convert)| (Regex::new(pattern).expect("amount pattern"), convert))
        .collect()
});

static OFFER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)oferta").expect("offer pattern"));

/// A string that is nothing but an amount, for exports that strip the € sign.
static BARE_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d[\d.,\s]*$").expect("bare amount pattern"));

fn decimal_amount(caps: &Captures) -> Option<f64> {
    let euros: String = caps
        .get(1)?
        .as_str()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    format!("{euros}.{}", caps.get(2)?.as_str()).parse().ok()
}

fn grouped_integer(caps: &Captures) -> Option<f64> {
    let euros: String = caps
        .get(1)?
        .as_str()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    euros.parse().ok()
}

fn cents_amount(caps: &Captures) -> Option<f64> {
    caps.get(1)?.as_str().parse::<f64>().ok().map(|c| c / 100.0)
}

fn whole_euros(caps: &Captures) -> Option<f64> {
    caps.get(1)?.as_str().parse().ok()
}

/// Extracts every amount the text encodes, each shape tried in priority
/// order over the spans no earlier shape claimed. A candidate glued to a
/// digit or separator on its left is a fragment of a larger number, not
/// an amount.
fn scan_amounts(text: &str) -> Vec<f64> {
    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut amounts = Vec::new();
    for (regex, convert) in AMOUNT_SHAPES.iter() {
        for caps in regex.captures_iter(text) {
            let Some(span) = caps.get(0) else { continue };
            let (start, end) = (span.start(), span.end());
            if claimed.iter().any(|&(s, e)| start < e && end > s) {
                continue;
            }
            let glued = text[..start]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_digit() || c == '.' || c == ',');
            if glued {
                continue;
            }
            if let Some(amount) = convert(&caps) {
                claimed.push((start, end));
                amounts.push(amount);
            }
        }
    }
    amounts
}

/// Normalizes raw price text into a ParsedPrice. Stateless, one instance
/// serves every row.
pub struct PriceParser;

impl PriceParser {
    pub fn new() -> Self {
        Self
    }

    /// Multi-amount strings are struck-through offer pairs: the smallest
    /// in-band amount is the current price, the largest the original.
    /// A lone "oferta" marker flags the offer without a pair.
    pub fn parse(&self, raw: &str) -> Result<ParsedPrice, PriceError> {
        let text = raw.trim();
        if !text.chars().any(|c| c.is_ascii_digit()) {
            return Err(PriceError::Unparsable(raw.to_string()));
        }

        let mut amounts = scan_amounts(text);
        if amounts.is_empty() && BARE_AMOUNT.is_match(text) {
            amounts = scan_amounts(&format!("{text} €"));
        }

        let in_band: Vec<f64> = amounts
            .iter()
            .copied()
            .filter(|a| *a > PLAUSIBLE_MIN && *a < PLAUSIBLE_MAX)
            .collect();
        let mut values = if in_band.is_empty() { amounts } else { in_band };
        values.sort_by(f64::total_cmp);
        values.dedup();

        match values.as_slice() {
            [] => Err(PriceError::Unparsable(raw.to_string())),
            [amount] if OFFER_MARKER.is_match(text) => Ok(ParsedPrice::single_offer(*amount)),
            [amount] => Ok(ParsedPrice::single(*amount)),
            [current, .., original] => ParsedPrice::offer(*current, *original),
        }
    }
}
