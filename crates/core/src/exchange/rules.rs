/// A listing to try for a holding, with the suffix the screening service
/// expects on symbols from that market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub exch_code: String,
    pub symbol_suffix: String,
}

impl Listing {
    pub fn new(exch_code: &str, symbol_suffix: &str) -> Self {
        Self {
            exch_code: exch_code.to_string(),
            symbol_suffix: symbol_suffix.to_string(),
        }
    }

    pub fn symbol_for(&self, ticker: &str) -> String {
        format!("{ticker}{}", self.symbol_suffix)
    }
}

/// Country and continent overrides shared by the exchange locator and the
/// compliance fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRules {
    /// Countries that skip the reference-table search, tried in order.
    pub primary_by_country: Vec<(String, Vec<String>)>,
    /// Alternate listings tried when a holding comes back unrated.
    pub alternates_by_country: Vec<(String, Vec<Listing>)>,
    pub alternates_by_continent: Vec<(String, Vec<Listing>)>,
    /// Composite code covering every US venue; the last resort everywhere.
    pub cross_exchange_code: String,
}

impl Default for ExchangeRules {
    fn default() -> Self {
        Self {
            primary_by_country: vec![
                ("United States".to_string(), vec!["US".to_string()]),
                (
                    "United Kingdom".to_string(),
                    vec!["LO".to_string(), "LN".to_string()],
                ),
            ],
            alternates_by_country: vec![
                ("India".to_string(), vec![Listing::new("IN", ".NS")]),
                ("China".to_string(), vec![Listing::new("CH", ".SS")]),
            ],
            alternates_by_continent: vec![
                (
                    "Europe".to_string(),
                    vec![Listing::new("LO", ".L"), Listing::new("LN", ".L")],
                ),
                ("Oceania".to_string(), vec![Listing::new("AU", ".AX")]),
            ],
            cross_exchange_code: "US".to_string(),
        }
    }
}

impl ExchangeRules {
    pub fn primary_codes(&self, country: &str) -> Option<&[String]> {
        lookup(&self.primary_by_country, country)
    }

    /// Country-specific alternates win over continent-wide ones.
    pub fn alternates(&self, country: &str, continent: &str) -> &[Listing] {
        lookup(&self.alternates_by_country, country)
            .or_else(|| lookup(&self.alternates_by_continent, continent))
            .unwrap_or(&[])
    }

    pub fn cross_exchange(&self) -> Listing {
        Listing::new(&self.cross_exchange_code, "")
    }
}

fn lookup<'a, T>(table: &'a [(String, Vec<T>)], key: &str) -> Option<&'a [T]> {
    let key = key.trim();
    table
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.as_slice())
}
