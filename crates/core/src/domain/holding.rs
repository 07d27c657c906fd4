use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of a fund's holdings file. ISIN is the row key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    #[serde(rename = "ISIN")]
    pub isin: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "NumberOfShare", alias = "Shares")]
    pub shares: Decimal,
    #[serde(rename = "LocalCurrencyCode")]
    pub local_currency: String,
    #[serde(rename = "MarketValue")]
    pub market_value: Decimal,
    #[serde(rename = "Weighting")]
    pub weighting: Decimal,
}

impl Holding {
    /// ISO 3166 country prefix of the ISIN (first two characters).
    pub fn isin_prefix(&self) -> &str {
        self.isin.get(..2).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeCandidate {
    pub code: String,
    pub display_name: String,
}

/// Outcome of one mapping lookup for an ISIN on one exchange.
///
/// `ticker` and `name` are comma-joined when the service returns several
/// listings and empty when it found none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedIdentifier {
    pub ticker: String,
    pub name: String,
    pub exchange_code: String,
}

impl ResolvedIdentifier {
    pub fn is_empty(&self) -> bool {
        self.ticker.trim().is_empty()
    }

    /// First listed ticker, used when a single symbol is needed.
    pub fn primary_ticker(&self) -> Option<&str> {
        self.ticker
            .split(',')
            .map(str::trim)
            .find(|t| !t.is_empty())
    }
}

/// Holding plus everything the enrichment run derived for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    #[serde(rename = "ISIN")]
    pub isin: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "NumberOfShare")]
    pub shares: Decimal,
    #[serde(rename = "MarketValue")]
    pub market_value: Decimal,
    #[serde(rename = "LocalCurrencyCode")]
    pub local_currency: String,
    #[serde(rename = "Weighting")]
    pub weighting: Decimal,
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Name")]
    pub name: String,
    /// Ticker on the cross-exchange code, looked up for every holding.
    #[serde(rename = "UsTicker")]
    pub us_ticker: String,
    #[serde(rename = "ExchangeUsed")]
    pub exchange_used: String,
    #[serde(rename = "Continent")]
    pub continent: String,
    #[serde(rename = "BusinessScreen")]
    pub business_screen: String,
    #[serde(rename = "FinancialScreen")]
    pub financial_screen: String,
    #[serde(rename = "ScreenedSymbol")]
    pub screened_symbol: String,
    #[serde(rename = "ImpureMarketValue")]
    pub impure_market_value: Decimal,
    #[serde(rename = "ImpureWeighting")]
    pub impure_weighting: Decimal,
}
