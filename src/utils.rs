// Utility functions

/// Rounds an amount to whole cents.
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Folds Spanish/western diacritics to their ASCII base letter.
pub fn fold_diacritics(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Lowercases a store domain and drops the `www.` prefix.
pub fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim().to_lowercase();
    domain.strip_prefix("www.").unwrap_or(&domain).to_string()
}

/// Canonical form for URL equality: case-, scheme-, `www.`- and
/// trailing-slash-insensitive.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim().to_lowercase();
    let url = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(&url);
    let url = url.strip_prefix("www.").unwrap_or(url);
    url.trim_end_matches('/').to_string()
}
