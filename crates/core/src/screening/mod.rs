pub mod zoya;

use crate::domain::{ComplianceVerdict, ResolvedIdentifier, Screen};
use crate::error::is_transient;
use crate::exchange::ExchangeRules;
use crate::mapping::{IdentifierMapper, IdentifierResolver};
use crate::retry::{retry_transient, RetryPolicy};
use anyhow::Result;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Raw screening report as returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenReport {
    #[serde(default)]
    pub business_screen: Option<String>,
    #[serde(default)]
    pub financial_screen: Option<String>,
    /// Percentage of revenue from non-compliant activity (0-100).
    #[serde(default)]
    pub non_compliant_revenue: Option<f64>,
}

impl ScreenReport {
    pub fn into_verdict(self) -> ComplianceVerdict {
        let business_screen = Screen::parse(self.business_screen.as_deref().unwrap_or(""));
        let financial_screen = Screen::parse(self.financial_screen.as_deref().unwrap_or(""));

        let haram_fraction = if business_screen.is_unrated() {
            None
        } else {
            self.non_compliant_revenue
                .and_then(Decimal::from_f64)
                .map(|pct| (pct / Decimal::ONE_HUNDRED).clamp(Decimal::ZERO, Decimal::ONE))
        };

        ComplianceVerdict {
            business_screen,
            financial_screen,
            haram_fraction,
        }
    }
}

#[async_trait::async_trait]
pub trait ComplianceScreener: Send + Sync {
    fn service_name(&self) -> &'static str;

    /// Screening report for `symbol`; `None` when the provider has no report.
    async fn report(&self, symbol: &str) -> Result<Option<ScreenReport>>;

    /// Regions the provider covers.
    async fn regions(&self) -> Result<Vec<String>>;
}

/// Inputs needed to escalate an unrated holding to alternate listings.
#[derive(Debug, Clone, Copy)]
pub struct ScreeningSubject<'a> {
    pub isin: &'a str,
    pub country: &'a str,
    pub continent: &'a str,
    pub primary: &'a ResolvedIdentifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub verdict: ComplianceVerdict,
    /// Last symbol sent to the screening service; empty if none was.
    pub screened_symbol: String,
    /// Cross-exchange listing, when the fallback had to look it up.
    pub cross_listing: Option<ResolvedIdentifier>,
}

#[derive(Debug, Clone)]
pub struct ComplianceClassifier<S> {
    screener: S,
    retry: RetryPolicy,
    rules: ExchangeRules,
}

impl<S: ComplianceScreener> ComplianceClassifier<S> {
    pub fn new(screener: S, retry: RetryPolicy, rules: ExchangeRules) -> Self {
        Self {
            screener,
            retry,
            rules,
        }
    }

    pub fn screener(&self) -> &S {
        &self.screener
    }

    /// Screens one symbol. Transport failures that outlast the retry budget
    /// degrade to an unrated verdict; contract violations are returned.
    pub async fn classify(&self, symbol: &str) -> Result<ComplianceVerdict> {
        let res = retry_transient(&self.retry, self.screener.service_name(), || {
            self.screener.report(symbol)
        })
        .await;

        match res {
            Ok(Some(report)) => Ok(report.into_verdict()),
            Ok(None) => {
                tracing::debug!(symbol, "no screening report; unrated");
                Ok(ComplianceVerdict::unrated())
            }
            Err(err) if is_transient(&err) => {
                tracing::warn!(symbol, error = %err, "screening unavailable; recording as unrated");
                Ok(ComplianceVerdict::unrated())
            }
            Err(err) => Err(err),
        }
    }

    /// Screens the primary listing, then alternate listings for the holding's
    /// country or continent, then the cross-exchange listing, stopping at the
    /// first rated verdict. Unrated after all of them is a valid outcome.
    pub async fn classify_with_fallback<M: IdentifierMapper>(
        &self,
        resolver: &IdentifierResolver<M>,
        subject: ScreeningSubject<'_>,
    ) -> Result<Classification> {
        let mut screened: Vec<String> = Vec::new();
        let mut last = Classification {
            verdict: ComplianceVerdict::unrated(),
            screened_symbol: String::new(),
            cross_listing: None,
        };

        if let Some(ticker) = subject.primary.primary_ticker() {
            last = self.screen_new(ticker, &mut screened).await?;
            if !last.verdict.is_unrated() {
                return Ok(last);
            }
        }

        let cross = self.rules.cross_exchange();
        let mut cross_listing = None;
        let listings = self
            .rules
            .alternates(subject.country, subject.continent)
            .iter()
            .chain(std::iter::once(&cross));

        for listing in listings {
            let alternate = resolver.resolve(subject.isin, &listing.exch_code).await?;
            if listing.exch_code == cross.exch_code {
                cross_listing = Some(alternate.clone());
            }
            let Some(ticker) = alternate.primary_ticker() else {
                tracing::debug!(
                    isin = subject.isin,
                    exch_code = %listing.exch_code,
                    "no alternate listing"
                );
                continue;
            };

            let symbol = listing.symbol_for(ticker);
            if screened.contains(&symbol) {
                continue;
            }

            last = self.screen_new(&symbol, &mut screened).await?;
            if !last.verdict.is_unrated() {
                tracing::info!(
                    isin = subject.isin,
                    exch_code = %listing.exch_code,
                    symbol = %symbol,
                    "rated via alternate listing"
                );
                last.cross_listing = cross_listing;
                return Ok(last);
            }
        }

        last.cross_listing = cross_listing;
        Ok(last)
    }

    async fn screen_new(&self, symbol: &str, screened: &mut Vec<String>) -> Result<Classification> {
        screened.push(symbol.to_string());
        let verdict = self.classify(symbol).await?;
        Ok(Classification {
            verdict,
            screened_symbol: symbol.to_string(),
            cross_listing: None,
        })
    }
}
