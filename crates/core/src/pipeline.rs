use crate::domain::{ComplianceVerdict, EnrichedRecord, Holding};
use crate::exchange::{continent_for, ExchangeLocator};
use crate::impurity::impurity;
use crate::mapping::{IdentifierMapper, IdentifierResolver};
use crate::screening::{ComplianceClassifier, ComplianceScreener, ScreeningSubject};
use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedBatch {
    pub records: Vec<EnrichedRecord>,
    pub unrated: usize,
}

/// Runs holdings through locate, resolve, classify and impurity, one at a
/// time. Nothing is carried over from one holding to the next.
pub struct FundEnricher<M, S> {
    locator: ExchangeLocator,
    resolver: IdentifierResolver<M>,
    classifier: ComplianceClassifier<S>,
    progress_every: usize,
}

impl<M: IdentifierMapper, S: ComplianceScreener> FundEnricher<M, S> {
    pub fn new(
        locator: ExchangeLocator,
        resolver: IdentifierResolver<M>,
        classifier: ComplianceClassifier<S>,
        progress_every: usize,
    ) -> Self {
        Self {
            locator,
            resolver,
            classifier,
            progress_every: progress_every.max(1),
        }
    }

    pub async fn enrich_holding(&self, holding: &Holding) -> Result<EnrichedRecord> {
        Ok(self.enrich(holding).await?.0)
    }

    async fn enrich(&self, holding: &Holding) -> Result<(EnrichedRecord, ComplianceVerdict)> {
        let candidates = self
            .locator
            .candidates(&holding.country, holding.isin_prefix());
        let resolved = self.resolver.resolve_first(&holding.isin, &candidates).await?;
        let continent = continent_for(&holding.country);

        let classification = self
            .classifier
            .classify_with_fallback(
                &self.resolver,
                ScreeningSubject {
                    isin: &holding.isin,
                    country: &holding.country,
                    continent,
                    primary: &resolved,
                },
            )
            .await?;

        let cross = self.locator.rules().cross_exchange();
        let us_listing = if resolved.exchange_code == cross.exch_code {
            resolved.clone()
        } else if let Some(listing) = classification.cross_listing {
            listing
        } else {
            self.resolver.resolve(&holding.isin, &cross.exch_code).await?
        };

        let verdict = classification.verdict;
        let impure = impurity(
            holding.market_value,
            holding.weighting,
            Some(verdict.effective_fraction()),
        );

        tracing::info!(
            isin = %holding.isin,
            ticker = %resolved.ticker,
            exch_code = %resolved.exchange_code,
            business_screen = %verdict.business_screen,
            financial_screen = %verdict.financial_screen,
            "holding enriched"
        );

        let record = EnrichedRecord {
            isin: holding.isin.clone(),
            country: holding.country.clone(),
            shares: holding.shares,
            market_value: holding.market_value,
            local_currency: holding.local_currency.clone(),
            weighting: holding.weighting,
            ticker: resolved.ticker,
            name: resolved.name,
            us_ticker: us_listing.ticker,
            exchange_used: resolved.exchange_code,
            continent: continent.to_string(),
            business_screen: verdict.business_screen.as_str().to_string(),
            financial_screen: verdict.financial_screen.as_str().to_string(),
            screened_symbol: classification.screened_symbol,
            impure_market_value: impure.impure_market_value,
            impure_weighting: impure.impure_weighting,
        };
        Ok((record, verdict))
    }

    /// Enriches every holding in order. The first error aborts the batch.
    pub async fn enrich_all(&self, holdings: &[Holding]) -> Result<EnrichedBatch> {
        let total = holdings.len();
        let mut records = Vec::with_capacity(total);
        let mut unrated = 0usize;

        for (idx, holding) in holdings.iter().enumerate() {
            let (record, verdict) = self
                .enrich(holding)
                .await
                .with_context(|| format!("enrich holding {} failed", holding.isin))?;
            if verdict.is_unrated() {
                unrated += 1;
            }
            records.push(record);

            let processed = idx + 1;
            if processed == 1 || processed == total || processed % self.progress_every == 0 {
                tracing::info!(processed, total, unrated, "enrichment progress");
            }
        }

        Ok(EnrichedBatch { records, unrated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{ExchangeCodeRow, ExchangeRules};
    use crate::retry::RetryPolicy;
    use crate::storage::enriched::to_csv_bytes;
    use crate::testing::{figi, ScriptedMapper, ScriptedScreener};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn row(code: &str, composite: &str, iso: &str) -> ExchangeCodeRow {
        ExchangeCodeRow {
            exchange_code: code.to_string(),
            full_exchange_name: format!("{code} exchange"),
            composite_name: composite.to_string(),
            iso_country_code: iso.to_string(),
        }
    }

    fn enricher(
        mapper: ScriptedMapper,
        screener: ScriptedScreener,
    ) -> FundEnricher<ScriptedMapper, ScriptedScreener> {
        let rules = ExchangeRules::default();
        FundEnricher::new(
            ExchangeLocator::new(
                vec![row("GY", "Germany", "DE"), row("GR", "Germany", "DE")],
                rules.clone(),
            ),
            IdentifierResolver::new(mapper, RetryPolicy::unbounded(Duration::ZERO)),
            ComplianceClassifier::new(screener, RetryPolicy::bounded(3, Duration::ZERO), rules),
            10,
        )
    }

    fn holding(isin: &str, country: &str) -> Holding {
        Holding {
            isin: isin.to_string(),
            country: country.to_string(),
            shares: dec!(1200),
            local_currency: "GBP".to_string(),
            market_value: dec!(35812.50),
            weighting: dec!(0.0123),
        }
    }

    fn uk_mapper() -> ScriptedMapper {
        ScriptedMapper::default()
            .listing("GB00B03MLX29", "LN", vec![figi("SHEL", "SHELL PLC")])
            .listing("GB00B03MLX29", "US", vec![figi("RYDAF", "SHELL PLC")])
    }

    fn uk_screener() -> ScriptedScreener {
        ScriptedScreener::default().rated("SHEL", "COMPLIANT", "COMPLIANT", 0.0)
    }

    #[tokio::test]
    async fn uk_holding_resolves_on_secondary_code_and_is_pure() {
        let enricher = enricher(uk_mapper(), uk_screener());
        let record = enricher
            .enrich_holding(&holding("GB00B03MLX29", "United Kingdom"))
            .await
            .unwrap();

        // LO and LN come from the locator; US is the cross-exchange lookup.
        assert_eq!(enricher.resolver.mapper().requested_codes(), vec!["LO", "LN", "US"]);
        assert_eq!(record.exchange_used, "LN");
        assert_eq!(record.ticker, "SHEL");
        assert_eq!(record.name, "SHELL PLC");
        assert_eq!(record.us_ticker, "RYDAF");
        assert_eq!(record.shares, dec!(1200));
        assert_eq!(record.continent, "Europe");
        assert_eq!(record.business_screen, "Compliant");
        assert_eq!(record.screened_symbol, "SHEL");
        assert_eq!(record.impure_market_value, dec!(0));
        assert_eq!(record.impure_weighting, dec!(0));
    }

    #[tokio::test]
    async fn unrated_primary_escalates_to_alternate_listing() {
        let mapper = ScriptedMapper::default()
            .listing("DE000BASF111", "GY", vec![figi("BAS", "BASF SE")])
            .listing("DE000BASF111", "LN", vec![figi("0BFA", "BASF SE")]);
        let screener = ScriptedScreener::default().rated("0BFA.L", "compliant", "questionable", 4.0);
        let enricher = enricher(mapper, screener);

        let record = enricher
            .enrich_holding(&holding("DE000BASF111", "Germany"))
            .await
            .unwrap();

        assert_eq!(record.ticker, "BAS");
        assert_eq!(record.exchange_used, "GY");
        assert_eq!(record.screened_symbol, "0BFA.L");
        assert_eq!(record.financial_screen, "Questionable");
        assert_eq!(record.impure_market_value, dec!(1432.5));
        assert_eq!(record.impure_weighting, dec!(0.000492));
        assert_eq!(
            enricher.classifier.screener().calls(),
            vec!["BAS".to_string(), "0BFA.L".to_string()]
        );
    }

    #[tokio::test]
    async fn us_ticker_reuses_the_fallback_cross_lookup() {
        let mapper = ScriptedMapper::default()
            .listing("DE000BASF111", "GY", vec![figi("BAS", "BASF SE")])
            .listing("DE000BASF111", "US", vec![figi("BFFAF", "BASF SE")]);
        let enricher = enricher(mapper, ScriptedScreener::default());

        let record = enricher
            .enrich_holding(&holding("DE000BASF111", "Germany"))
            .await
            .unwrap();

        assert_eq!(record.us_ticker, "BFFAF");
        assert_eq!(record.screened_symbol, "BFFAF");
        assert_eq!(
            enricher.resolver.mapper().requested_codes(),
            vec!["GY", "LO", "LN", "US"]
        );
    }

    #[tokio::test]
    async fn batch_counts_unrated_holdings() {
        let mapper = uk_mapper().listing("US0000000001", "US", vec![figi("XYZ", "XYZ CORP")]);
        let screener = uk_screener().rated("XYZ", "UNRATED", "unrated", 3.0);
        let enricher = enricher(mapper, screener);
        let holdings = vec![
            holding("GB00B03MLX29", "United Kingdom"),
            holding("DE0007164600", "Germany"),
            holding("US0000000001", "United States"),
        ];

        let batch = enricher.enrich_all(&holdings).await.unwrap();
        assert_eq!(batch.records.len(), 3);
        assert_eq!(batch.unrated, 2);
        assert_eq!(batch.records[1].business_screen, "Unrated");
        assert_eq!(batch.records[1].ticker, "");
        assert_eq!(batch.records[1].us_ticker, "");
        assert_eq!(batch.records[1].impure_market_value, dec!(0));
        assert_eq!(batch.records[2].business_screen, "Unrated");
        assert_eq!(batch.records[2].us_ticker, "XYZ");
        assert_eq!(batch.records[2].impure_market_value, dec!(0));
    }

    #[tokio::test]
    async fn repeated_runs_produce_identical_output() {
        let holdings = vec![
            holding("GB00B03MLX29", "United Kingdom"),
            holding("DE0007164600", "Germany"),
        ];

        let first = enricher(uk_mapper(), uk_screener())
            .enrich_all(&holdings)
            .await
            .unwrap();
        let second = enricher(uk_mapper(), uk_screener())
            .enrich_all(&holdings)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(
            to_csv_bytes(&first.records).unwrap(),
            to_csv_bytes(&second.records).unwrap()
        );
    }

    #[tokio::test]
    async fn holdings_are_independent_of_processing_order() {
        let holdings = vec![
            holding("GB00B03MLX29", "United Kingdom"),
            holding("DE0007164600", "Germany"),
        ];
        let enricher = enricher(uk_mapper(), uk_screener());

        let batch = enricher.enrich_all(&holdings).await.unwrap();
        let reversed = enricher.enrich_holding(&holdings[1]).await.unwrap();
        let single = enricher.enrich_holding(&holdings[0]).await.unwrap();

        assert_eq!(batch.records[1], reversed);
        assert_eq!(batch.records[0], single);
    }

    #[tokio::test]
    async fn schema_violation_aborts_the_batch() {
        let enricher = enricher(uk_mapper(), ScriptedScreener::default().malformed());
        let err = enricher
            .enrich_all(&[holding("GB00B03MLX29", "United Kingdom")])
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("GB00B03MLX29"));
    }
}
