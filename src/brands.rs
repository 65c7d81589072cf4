// Brand dictionary: canonical names plus the synonym spellings seen in SERP titles.
use std::collections::HashMap;

/// A resolved brand and the positions of the title tokens it absorbed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandHit {
    pub canonical: String,
    pub consumed: Vec<usize>,
}

/// Immutable token-to-brand mapping, built once per locale/category and passed
/// into the normalizer and matcher explicitly. Lookups cost one hash probe per
/// token (pairs first, then singles), independent of registry size.
pub struct BrandRegistry {
    singles: HashMap<String, usize>,
    pairs: HashMap<String, usize>,
    canonicals: Vec<String>,
}

impl BrandRegistry {
    /// Builds a registry from `(canonical, synonyms)` entries. The canonical
    /// name itself is always a recognized spelling. Entries and synonyms are
    /// expected lowercase and diacritic-free; one- and two-word spellings are
    /// supported, the first mapping for a spelling wins.
    pub fn from_entries(entries: &[(&str, &[&str])]) -> Self {
        let mut registry = Self {
            singles: HashMap::new(),
            pairs: HashMap::new(),
            canonicals: Vec::with_capacity(entries.len()),
        };
        for (canonical, synonyms) in entries {
            let idx = registry.canonicals.len();
            registry.canonicals.push((*canonical).to_string());
            registry.insert_spelling(canonical, idx);
            for synonym in *synonyms {
                registry.insert_spelling(synonym, idx);
            }
        }
        registry
    }

    /// The default registry for the Spanish consumer market.
    pub fn spanish_market() -> Self {
        Self::from_entries(SPANISH_MARKET)
    }

    pub fn canonical_count(&self) -> usize {
        self.canonicals.len()
    }

    /// Canonical brand for a single already-normalized token, if known.
    pub fn canonical_for(&self, token: &str) -> Option<&str> {
        self.singles
            .get(token)
            .map(|&idx| self.canonicals[idx].as_str())
    }

    /// Resolves at most one brand from a normalized token sequence. Adjacent
    /// pairs are probed before single tokens so two-word spellings win over
    /// their fragments, scanning left to right.
    pub fn resolve(&self, tokens: &[String]) -> Option<BrandHit> {
        for i in 0..tokens.len().saturating_sub(1) {
            let key = format!("{} {}", tokens[i], tokens[i + 1]);
            if let Some(&idx) = self.pairs.get(&key) {
                return Some(BrandHit {
                    canonical: self.canonicals[idx].clone(),
                    consumed: vec![i, i + 1],
                });
            }
        }
        for (i, token) in tokens.iter().enumerate() {
            if let Some(&idx) = self.singles.get(token) {
                return Some(BrandHit {
                    canonical: self.canonicals[idx].clone(),
                    consumed: vec![i],
                });
            }
        }
        None
    }

    fn insert_spelling(&mut self, spelling: &str, idx: usize) {
        let words: Vec<&str> = spelling
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        match words.as_slice() {
            [single] => {
                self.singles.entry((*single).to_string()).or_insert(idx);
            }
            [first, second] => {
                self.pairs.entry(format!("{first} {second}")).or_insert(idx);
            }
            _ => {}
        }
    }
}

/// Canonical brands of the Spanish consumer market with the alternate
/// spellings the SERP titles actually use. Product lines that identify the
/// maker (Galaxy, ROG, Conga) resolve to the maker's name.
static SPANISH_MARKET: &[(&str, &[&str])] = &[
    // Computing and phones
    ("apple", &["iphone", "ipad", "macbook", "imac", "airpods", "i-phone", "i-pad", "mac book", "air pods"]),
    ("samsung", &["galaxy"]),
    ("xiaomi", &["redmi", "poco"]),
    ("huawei", &["matebook"]),
    ("honor", &[]),
    ("google", &["pixel", "chromecast", "nest"]),
    ("motorola", &["moto"]),
    ("nokia", &[]),
    ("alcatel", &[]),
    ("zte", &[]),
    ("oppo", &[]),
    ("realme", &[]),
    ("oneplus", &["one plus"]),
    ("vivo", &[]),
    ("fairphone", &[]),
    ("wiko", &[]),
    ("bq", &[]),
    ("cubot", &[]),
    ("ulefone", &[]),
    ("doogee", &[]),
    ("blackview", &[]),
    ("asus", &["rog", "tuf", "zenbook", "vivobook", "zenfone", "zephyrus", "strix"]),
    ("acer", &["nitro", "predator", "aspire", "swift", "triton"]),
    ("lenovo", &["thinkpad", "ideapad", "legion", "yoga", "loq"]),
    ("hp", &["omen", "victus", "pavilion", "envy", "spectre", "hewlett packard"]),
    ("dell", &["alienware", "xps", "inspiron", "latitude"]),
    ("msi", &["cyborg", "katana", "raider", "stealth", "pulse", "vector", "crosshair"]),
    ("gigabyte", &["aorus", "aero"]),
    ("razer", &["blade"]),
    ("microsoft", &["surface"]),
    ("toshiba", &["dynabook"]),
    // Components and peripherals
    ("nvidia", &["geforce"]),
    ("amd", &["radeon", "ryzen"]),
    ("intel", &[]),
    ("logitech", &["logi"]),
    ("corsair", &[]),
    ("steelseries", &["steel series"]),
    ("hyperx", &["hyper x"]),
    ("trust", &[]),
    ("genius", &[]),
    ("keychron", &[]),
    ("ducky", &[]),
    ("roccat", &[]),
    ("cooler master", &["coolermaster"]),
    ("nzxt", &[]),
    ("be quiet", &["bequiet"]),
    ("thermaltake", &[]),
    ("asrock", &[]),
    ("evga", &[]),
    ("zotac", &[]),
    ("palit", &[]),
    ("gainward", &[]),
    ("sapphire", &[]),
    ("powercolor", &[]),
    ("xfx", &[]),
    ("pny", &[]),
    // Networking
    ("tp-link", &["tplink"]),
    ("netgear", &[]),
    ("d-link", &["dlink"]),
    ("ubiquiti", &["unifi"]),
    ("zyxel", &[]),
    ("linksys", &[]),
    // Storage
    ("seagate", &[]),
    ("western digital", &["wd"]),
    ("sandisk", &[]),
    ("kingston", &[]),
    ("crucial", &[]),
    ("lexar", &[]),
    ("adata", &[]),
    ("verbatim", &[]),
    // Consoles and gaming
    ("sony", &["xperia", "bravia", "walkman"]),
    ("playstation", &["ps4", "ps5", "psx", "psone", "play station", "playstation4", "playstation5"]),
    ("nintendo", &["switch", "nswitch"]),
    ("xbox", &["xboxone", "xbone", "xbox series"]),
    ("valve", &["steam deck"]),
    ("sega", &[]),
    ("8bitdo", &[]),
    ("thrustmaster", &[]),
    ("hori", &[]),
    ("nacon", &[]),
    ("turtle beach", &[]),
    ("astro", &[]),
    ("elgato", &["stream deck", "streamdeck"]),
    ("newskill", &[]),
    ("krom", &[]),
    ("mars gaming", &[]),
    ("nox", &[]),
    ("coolbox", &[]),
    ("ozone", &[]),
    ("tempest", &[]),
    // Photo and video
    ("canon", &["eos"]),
    ("nikon", &[]),
    ("fujifilm", &["fuji"]),
    ("olympus", &[]),
    ("pentax", &[]),
    ("leica", &[]),
    ("sigma", &[]),
    ("tamron", &[]),
    ("manfrotto", &[]),
    ("gopro", &["go pro"]),
    ("dji", &["osmo", "mavic"]),
    ("insta360", &[]),
    ("parrot", &[]),
    // Audio
    ("bose", &[]),
    ("jbl", &[]),
    ("harman kardon", &["harman"]),
    ("marshall", &[]),
    ("bang olufsen", &[]),
    ("sennheiser", &[]),
    ("audio technica", &[]),
    ("beats", &[]),
    ("sonos", &[]),
    ("denon", &[]),
    ("yamaha", &[]),
    ("pioneer", &[]),
    ("teufel", &[]),
    ("edifier", &[]),
    ("anker", &["soundcore", "eufy"]),
    ("beyerdynamic", &[]),
    ("shure", &[]),
    // Personal care
    ("braun", &[]),
    ("remington", &[]),
    ("babyliss", &[]),
    ("rowenta", &[]),
    ("tefal", &[]),
    // Large and small appliances
    ("bosch", &[]),
    ("siemens", &[]),
    ("balay", &[]),
    ("teka", &[]),
    ("zanussi", &[]),
    ("electrolux", &[]),
    ("whirlpool", &[]),
    ("aeg", &[]),
    ("miele", &[]),
    ("beko", &[]),
    ("candy", &[]),
    ("hoover", &[]),
    ("indesit", &[]),
    ("hotpoint", &[]),
    ("liebherr", &[]),
    ("fagor", &[]),
    ("edesa", &[]),
    ("taurus", &[]),
    ("jata", &[]),
    ("orbegozo", &[]),
    ("solac", &[]),
    ("ufesa", &[]),
    ("cecotec", &["conga", "mambo", "bamba"]),
    ("dyson", &[]),
    ("irobot", &["roomba"]),
    ("roborock", &[]),
    ("dreame", &[]),
    ("ecovacs", &[]),
    ("shark", &[]),
    ("bissell", &[]),
    ("karcher", &[]),
    ("vorwerk", &["kobold", "thermomix"]),
    ("delonghi", &["de longhi"]),
    ("nespresso", &[]),
    ("krups", &[]),
    ("moulinex", &[]),
    ("smeg", &[]),
    ("kitchenaid", &[]),
    ("cosori", &[]),
    ("ninja", &[]),
    ("russell hobbs", &[]),
    ("princess", &[]),
    ("cuisinart", &[]),
    ("melitta", &[]),
    ("saeco", &[]),
    ("jura", &[]),
    ("sage", &[]),
    // Climate and TV
    ("daikin", &[]),
    ("mitsubishi", &[]),
    ("hisense", &[]),
    ("haier", &[]),
    ("tcl", &[]),
    ("grundig", &[]),
    ("sharp", &[]),
    ("jvc", &[]),
    ("thomson", &[]),
    ("telefunken", &[]),
    ("vestel", &[]),
    ("loewe", &[]),
    ("metz", &[]),
    ("lg", &[]),
    ("philips", &[]),
    ("panasonic", &[]),
    // Wearables and mobility
    ("garmin", &[]),
    ("tomtom", &["tom tom"]),
    ("fitbit", &[]),
    ("polar", &[]),
    ("suunto", &[]),
    ("coros", &[]),
    ("amazfit", &[]),
    ("withings", &[]),
    ("segway", &["ninebot"]),
    ("youin", &[]),
    ("nilox", &[]),
    ("smartgyro", &[]),
    ("dualtron", &[]),
    ("kugoo", &[]),
    // Printers
    ("epson", &[]),
    ("brother", &[]),
    ("lexmark", &[]),
    ("xerox", &[]),
    ("ricoh", &[]),
    ("kyocera", &[]),
    // Tools and garden
    ("makita", &[]),
    ("dewalt", &[]),
    ("black decker", &[]),
    ("stanley", &[]),
    ("einhell", &[]),
    ("parkside", &[]),
    ("ryobi", &[]),
    ("worx", &[]),
    ("hilti", &[]),
    ("metabo", &[]),
    ("hikoki", &[]),
    ("skil", &[]),
    ("husqvarna", &[]),
    ("stihl", &[]),
    ("greenworks", &[]),
    ("gardena", &[]),
    // Health
    ("omron", &[]),
    ("beurer", &[]),
    // Retail own-brands and marketplaces
    ("pccomponentes", &["pccom", "pccm"]),
    ("amazon", &["kindle", "echo", "alexa"]),
    ("mediamarkt", &["media markt"]),
    ("carrefour", &[]),
    ("fnac", &[]),
    ("ikea", &[]),
    ("leroy merlin", &["leroy"]),
    ("worten", &[]),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn registry_carries_at_least_150_canonical_brands() {
        let registry = BrandRegistry::spanish_market();
        assert!(
            registry.canonical_count() >= 150,
            "only {} canonical brands",
            registry.canonical_count()
        );
    }

    #[test]
    fn single_token_probe_resolves_synonyms() {
        let registry = BrandRegistry::spanish_market();
        assert_eq!(registry.canonical_for("ps5"), Some("playstation"));
        assert_eq!(registry.canonical_for("msi"), Some("msi"));
        assert_eq!(registry.canonical_for("desconocida"), None);
    }

    #[test]
    fn synonyms_resolve_to_canonical() {
        let registry = BrandRegistry::spanish_market();
        let hit = registry.resolve(&tokens(&["iphone", "15", "pro"])).unwrap();
        assert_eq!(hit.canonical, "apple");
        assert_eq!(hit.consumed, vec![0]);

        let hit = registry.resolve(&tokens(&["consola", "ps5", "digital"])).unwrap();
        assert_eq!(hit.canonical, "playstation");
    }

    #[test]
    fn adjacent_pair_wins_over_single_token() {
        let registry = BrandRegistry::spanish_market();
        let hit = registry
            .resolve(&tokens(&["harman", "kardon", "onyx"]))
            .unwrap();
        assert_eq!(hit.canonical, "harman kardon");
        assert_eq!(hit.consumed, vec![0, 1]);
    }

    #[test]
    fn two_word_spellings_match_as_pairs() {
        let registry = BrandRegistry::spanish_market();
        let hit = registry
            .resolve(&tokens(&["disco", "western", "digital", "2tb"]))
            .unwrap();
        assert_eq!(hit.canonical, "western digital");
        assert_eq!(hit.consumed, vec![1, 2]);
    }

    #[test]
    fn unknown_tokens_resolve_to_none() {
        let registry = BrandRegistry::spanish_market();
        assert_eq!(registry.resolve(&tokens(&["funda", "silicona"])), None);
    }

    #[test]
    fn custom_registries_coexist() {
        let custom = BrandRegistry::from_entries(&[("acme", &["acme corp"])]);
        assert_eq!(custom.canonical_count(), 1);
        assert!(custom.resolve(&tokens(&["acme", "taladro"])).is_some());
        assert!(BrandRegistry::spanish_market()
            .resolve(&tokens(&["acme"]))
            .is_none());
    }
}
