use crate::config::Settings;
use crate::error::{Service, ServiceError};
use crate::mapping::openfigi::status_error;
use crate::screening::{ComplianceScreener, ScreenReport};
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

const METHODOLOGY: &str = "AAOIFI";

const REPORT_QUERY: &str = "query GetAdvancedReport($input: AdvancedReportInput!) { \
     advancedCompliance { report(input: $input) { businessScreen financialScreen nonCompliantRevenue } } }";

const REGIONS_QUERY: &str = "query ListRegions { advancedCompliance { regions } }";

/// Zoya GraphQL client for AAOIFI screening reports.
#[derive(Debug, Clone)]
pub struct ZoyaClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl ZoyaClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_zoya_api_key()?.to_string();
        let http = reqwest::Client::builder()
            .timeout(settings.http_timeout)
            .build()
            .context("failed to build Zoya http client")?;

        Ok(Self {
            http,
            url: settings.zoya_url.clone(),
            api_key,
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&self.api_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn post(&self, body: &GraphQlRequest) -> Result<String> {
        let res = self
            .http
            .post(&self.url)
            .headers(self.headers()?)
            .json(body)
            .send()
            .await
            .map_err(|err| ServiceError::transient(Service::Screening, "send", err.to_string()))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|err| ServiceError::transient(Service::Screening, "read", err.to_string()))?;

        if !status.is_success() {
            return Err(status_error(Service::Screening, status, &text).into());
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl ComplianceScreener for ZoyaClient {
    fn service_name(&self) -> &'static str {
        "zoya"
    }

    async fn report(&self, symbol: &str) -> Result<Option<ScreenReport>> {
        let text = self.post(&GraphQlRequest::report(symbol)).await?;
        parse_report(&text)
    }

    async fn regions(&self) -> Result<Vec<String>> {
        let text = self.post(&GraphQlRequest::regions()).await?;
        let data: RegionsData = parse_envelope(&text)?.with_context(|| {
            format!("screening regions query returned no data: {text}")
        })?;
        Ok(data
            .advanced_compliance
            .map(|c| c.regions)
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Serialize)]
struct GraphQlRequest {
    query: &'static str,
    variables: serde_json::Value,
}

impl GraphQlRequest {
    fn report(symbol: &str) -> Self {
        Self {
            query: REPORT_QUERY,
            variables: json!({"input": {"symbol": symbol, "methodology": METHODOLOGY}}),
        }
    }

    fn regions() -> Self {
        Self {
            query: REGIONS_QUERY,
            variables: json!({}),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportData {
    #[serde(default)]
    advanced_compliance: Option<ReportContainer>,
}

#[derive(Debug, Deserialize)]
struct ReportContainer {
    #[serde(default)]
    report: Option<ScreenReport>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegionsData {
    #[serde(default)]
    advanced_compliance: Option<RegionsContainer>,
}

#[derive(Debug, Deserialize)]
struct RegionsContainer {
    #[serde(default)]
    regions: Vec<String>,
}

/// Decodes a GraphQL envelope. `Ok(None)` means the provider answered with
/// errors only; an envelope with neither data nor errors is a schema violation.
fn parse_envelope<T: DeserializeOwned>(text: &str) -> Result<Option<T>> {
    let envelope = serde_json::from_str::<GraphQlResponse<T>>(text).map_err(|err| {
        ServiceError::permanent(
            Service::Screening,
            "parse",
            format!("unexpected screening response ({err}): {text}"),
        )
    })?;

    match envelope.data {
        Some(data) => Ok(Some(data)),
        None if !envelope.errors.is_empty() => {
            let messages: Vec<&str> = envelope.errors.iter().map(|e| e.message.as_str()).collect();
            tracing::debug!(errors = ?messages, "screening query returned errors");
            Ok(None)
        }
        None => Err(ServiceError::permanent(
            Service::Screening,
            "schema",
            format!("response has neither data nor errors: {text}"),
        )
        .into()),
    }
}

fn parse_report(text: &str) -> Result<Option<ScreenReport>> {
    let data = parse_envelope::<ReportData>(text)?;
    Ok(data
        .and_then(|d| d.advanced_compliance)
        .and_then(|c| c.report))
}
