//! In-memory service doubles that record every call.

use crate::error::{Service, ServiceError};
use crate::mapping::types::{FigiInstrument, MappingJob, MappingJobResult};
use crate::mapping::IdentifierMapper;
use crate::screening::{ComplianceScreener, ScreenReport};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;

pub fn figi(ticker: &str, name: &str) -> FigiInstrument {
    FigiInstrument {
        ticker: Some(ticker.to_string()),
        name: Some(name.to_string()),
        ..Default::default()
    }
}

#[derive(Debug, Default)]
pub struct ScriptedMapper {
    results: HashMap<(String, String), MappingJobResult>,
    transient_failures: Mutex<u32>,
    wrong_job_count: bool,
    calls: Mutex<Vec<MappingJob>>,
}

impl ScriptedMapper {
    pub fn listing(mut self, isin: &str, exch_code: &str, data: Vec<FigiInstrument>) -> Self {
        self.results.insert(
            (isin.to_string(), exch_code.to_string()),
            MappingJobResult {
                data: Some(data),
                ..Default::default()
            },
        );
        self
    }

    pub fn job_error(mut self, isin: &str, exch_code: &str, error: &str) -> Self {
        self.results.insert(
            (isin.to_string(), exch_code.to_string()),
            MappingJobResult {
                error: Some(error.to_string()),
                ..Default::default()
            },
        );
        self
    }

    /// The next `n` calls fail as if the service were unreachable.
    pub fn fail_transiently(self, n: u32) -> Self {
        *self.transient_failures.lock().unwrap() = n;
        self
    }

    pub fn wrong_job_count(mut self) -> Self {
        self.wrong_job_count = true;
        self
    }

    pub fn calls(&self) -> Vec<MappingJob> {
        self.calls.lock().unwrap().clone()
    }

    pub fn requested_codes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|job| job.exch_code.unwrap_or_default())
            .collect()
    }
}

#[async_trait::async_trait]
impl IdentifierMapper for ScriptedMapper {
    fn service_name(&self) -> &'static str {
        "scripted_mapper"
    }

    async fn map_jobs(&self, jobs: &[MappingJob]) -> Result<Vec<MappingJobResult>> {
        self.calls.lock().unwrap().extend(jobs.iter().cloned());

        {
            let mut remaining = self.transient_failures.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(
                    ServiceError::transient(Service::Mapping, "send", "connection refused").into(),
                );
            }
        }

        if self.wrong_job_count {
            return Ok(Vec::new());
        }

        Ok(jobs
            .iter()
            .map(|job| {
                let key = (
                    job.id_value.clone(),
                    job.exch_code.clone().unwrap_or_default(),
                );
                self.results.get(&key).cloned().unwrap_or_else(|| MappingJobResult {
                    warning: Some("No identifier found.".to_string()),
                    ..Default::default()
                })
            })
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct ScriptedScreener {
    reports: HashMap<String, ScreenReport>,
    transient_failures: Mutex<u32>,
    malformed: bool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedScreener {
    pub fn rated(mut self, symbol: &str, business: &str, financial: &str, pct: f64) -> Self {
        self.reports.insert(
            symbol.to_string(),
            ScreenReport {
                business_screen: Some(business.to_string()),
                financial_screen: Some(financial.to_string()),
                non_compliant_revenue: Some(pct),
            },
        );
        self
    }

    pub fn fail_transiently(self, n: u32) -> Self {
        *self.transient_failures.lock().unwrap() = n;
        self
    }

    pub fn malformed(mut self) -> Self {
        self.malformed = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ComplianceScreener for ScriptedScreener {
    fn service_name(&self) -> &'static str {
        "scripted_screener"
    }

    async fn report(&self, symbol: &str) -> Result<Option<ScreenReport>> {
        self.calls.lock().unwrap().push(symbol.to_string());

        {
            let mut remaining = self.transient_failures.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ServiceError::transient(Service::Screening, "send", "timed out").into());
            }
        }

        if self.malformed {
            return Err(
                ServiceError::permanent(Service::Screening, "parse", "unexpected response").into(),
            );
        }

        Ok(self.reports.get(symbol).cloned())
    }

    async fn regions(&self) -> Result<Vec<String>> {
        Ok(vec!["US".to_string(), "UK".to_string()])
    }
}
