pub mod openfigi;
pub mod types;

use crate::domain::{ExchangeCandidate, ResolvedIdentifier};
use crate::error::{Service, ServiceError};
use crate::retry::{retry_transient, RetryPolicy};
use anyhow::Result;
use types::{MappingJob, MappingJobResult};

#[async_trait::async_trait]
pub trait IdentifierMapper: Send + Sync {
    fn service_name(&self) -> &'static str;

    /// Submits mapping jobs and returns one result per job, in request order.
    async fn map_jobs(&self, jobs: &[MappingJob]) -> Result<Vec<MappingJobResult>>;
}

/// Maps an ISIN to exchange tickers, retrying transport failures per policy.
#[derive(Debug, Clone)]
pub struct IdentifierResolver<M> {
    mapper: M,
    retry: RetryPolicy,
}

impl<M: IdentifierMapper> IdentifierResolver<M> {
    pub fn new(mapper: M, retry: RetryPolicy) -> Self {
        Self { mapper, retry }
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Resolves `isin` on one exchange. An empty ticker means "not listed
    /// there" and is not an error.
    pub async fn resolve(&self, isin: &str, exch_code: &str) -> Result<ResolvedIdentifier> {
        let jobs = vec![MappingJob::isin(isin, exch_code)];
        let results = retry_transient(&self.retry, self.mapper.service_name(), || {
            self.mapper.map_jobs(&jobs)
        })
        .await?;

        if results.len() != jobs.len() {
            return Err(ServiceError::permanent(
                Service::Mapping,
                "schema",
                format!(
                    "expected {} job result(s), got {}",
                    jobs.len(),
                    results.len()
                ),
            )
            .into());
        }

        let result = &results[0];
        if let Some(error) = &result.error {
            tracing::warn!(isin, exch_code, error = %error, "mapping job rejected; treating as no match");
        }

        let resolved = join_result(result, exch_code);
        tracing::debug!(
            isin,
            exch_code,
            ticker = %resolved.ticker,
            warning = result.warning.as_deref().unwrap_or(""),
            "mapping lookup"
        );
        Ok(resolved)
    }

    /// Probes `candidates` in order and stops at the first non-empty ticker.
    ///
    /// When every candidate comes back empty the last lookup's result stands.
    pub async fn resolve_first(
        &self,
        isin: &str,
        candidates: &[ExchangeCandidate],
    ) -> Result<ResolvedIdentifier> {
        let mut last = ResolvedIdentifier::default();
        for candidate in candidates {
            last = self.resolve(isin, &candidate.code).await?;
            if !last.is_empty() {
                tracing::debug!(
                    isin,
                    exch_code = %candidate.code,
                    exchange = %candidate.display_name,
                    "resolved on candidate exchange"
                );
                return Ok(last);
            }
        }
        Ok(last)
    }
}

/// Listings without a ticker are dropped together with their names, so a
/// response with no usable ticker resolves to exactly `""`.
fn join_result(result: &MappingJobResult, exch_code: &str) -> ResolvedIdentifier {
    let listed: Vec<_> = result
        .data
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .filter_map(|d| {
            let ticker = d.ticker.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
            Some((ticker, d.name.as_deref().map(str::trim).unwrap_or("")))
        })
        .collect();

    ResolvedIdentifier {
        ticker: listed.iter().map(|(t, _)| *t).collect::<Vec<_>>().join(","),
        name: listed.iter().map(|(_, n)| *n).collect::<Vec<_>>().join(","),
        exchange_code: exch_code.to_string(),
    }
}
