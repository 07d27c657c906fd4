use anyhow::Context;
use chrono::{DateTime, Utc};
use fundscreen_core::mapping::IdentifierMapper;
use fundscreen_core::pipeline::FundEnricher;
use fundscreen_core::screening::ComplianceScreener;
use fundscreen_core::storage::{enriched, holdings};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const SUMMARY_FILE: &str = "run_summary.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub status: BatchStatus,
    pub holdings: usize,
    pub unrated: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub batches: Vec<BatchSummary>,
}

impl RunSummary {
    pub fn new(batches: Vec<BatchSummary>) -> Self {
        Self {
            generated_at: Utc::now(),
            batches,
        }
    }

    pub fn failed(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| b.status == BatchStatus::Failed)
            .count()
    }

    pub fn write(&self, output_dir: &Path) -> anyhow::Result<PathBuf> {
        let path = output_dir.join(SUMMARY_FILE);
        let body = serde_json::to_vec_pretty(self).context("serialize run summary failed")?;
        std::fs::write(&path, body).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// Processes one holdings file. A failure is recorded in the summary and
/// reported, never propagated, so later batches still run.
pub async fn run_batch<M, S>(
    enricher: &FundEnricher<M, S>,
    input: &Path,
    output: &Path,
) -> BatchSummary
where
    M: IdentifierMapper,
    S: ComplianceScreener,
{
    match enrich_file(enricher, input, output).await {
        Ok((holdings, unrated)) => {
            tracing::info!(
                input = %input.display(),
                output = %output.display(),
                holdings,
                unrated,
                "batch complete"
            );
            BatchSummary {
                input: input.to_path_buf(),
                output: output.to_path_buf(),
                status: BatchStatus::Success,
                holdings,
                unrated,
                error: None,
            }
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(input = %input.display(), error = %format!("{err:#}"), "batch failed");
            BatchSummary {
                input: input.to_path_buf(),
                output: output.to_path_buf(),
                status: BatchStatus::Failed,
                holdings: 0,
                unrated: 0,
                error: Some(format!("{err:#}")),
            }
        }
    }
}

async fn enrich_file<M, S>(
    enricher: &FundEnricher<M, S>,
    input: &Path,
    output: &Path,
) -> anyhow::Result<(usize, usize)>
where
    M: IdentifierMapper,
    S: ComplianceScreener,
{
    let holdings = holdings::load_holdings(input)?;
    tracing::info!(input = %input.display(), holdings = holdings.len(), "batch started");

    let batch = enricher.enrich_all(&holdings).await?;
    enriched::write_enriched(output, &batch.records)?;
    Ok((batch.records.len(), batch.unrated))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(status: BatchStatus, error: Option<&str>) -> BatchSummary {
        BatchSummary {
            input: PathBuf::from("fund.csv"),
            output: PathBuf::from("out/fund_enriched.csv"),
            status,
            holdings: 3,
            unrated: 1,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn counts_failed_batches() {
        let run = RunSummary::new(vec![
            summary(BatchStatus::Success, None),
            summary(BatchStatus::Failed, Some("boom")),
        ]);
        assert_eq!(run.failed(), 1);
    }

    #[test]
    fn summary_json_shape() {
        let run = RunSummary::new(vec![summary(BatchStatus::Failed, Some("boom"))]);
        let v = serde_json::to_value(&run).unwrap();

        assert!(v["generated_at"].is_string());
        assert_eq!(v["batches"][0]["status"], "failed");
        assert_eq!(v["batches"][0]["input"], "fund.csv");
        assert_eq!(v["batches"][0]["error"], "boom");

        let ok = serde_json::to_value(summary(BatchStatus::Success, None)).unwrap();
        assert!(ok.get("error").is_none());
    }
}
