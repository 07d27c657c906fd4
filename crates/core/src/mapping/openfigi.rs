use crate::config::Settings;
use crate::error::{Service, ServiceError};
use crate::mapping::types::{MappingJob, MappingJobResult};
use crate::mapping::IdentifierMapper;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;

const MAPPING_PATH: &str = "/mapping";
const API_KEY_HEADER: &str = "x-openfigi-apikey";

#[derive(Debug, Clone)]
pub struct OpenFigiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenFigiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.http_timeout)
            .build()
            .context("failed to build OpenFIGI http client")?;

        Ok(Self {
            http,
            base_url: settings.openfigi_base_url.clone(),
            api_key: settings.openfigi_api_key.clone(),
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), MAPPING_PATH)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(api_key) = &self.api_key {
            headers.insert(API_KEY_HEADER, HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl IdentifierMapper for OpenFigiClient {
    fn service_name(&self) -> &'static str {
        "openfigi"
    }

    async fn map_jobs(&self, jobs: &[MappingJob]) -> Result<Vec<MappingJobResult>> {
        let res = self
            .http
            .post(self.url())
            .headers(self.headers()?)
            .json(jobs)
            .send()
            .await
            .map_err(|err| ServiceError::transient(Service::Mapping, "send", err.to_string()))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|err| ServiceError::transient(Service::Mapping, "read", err.to_string()))?;

        if !status.is_success() {
            return Err(status_error(Service::Mapping, status, &text).into());
        }

        parse_mapping_response(&text)
    }
}

pub(crate) fn status_error(service: Service, status: StatusCode, body: &str) -> ServiceError {
    let detail = format!("HTTP {status}: {body}");
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        ServiceError::transient(service, "http", detail)
    } else {
        ServiceError::permanent(service, "http", detail)
    }
}

fn parse_mapping_response(text: &str) -> Result<Vec<MappingJobResult>> {
    serde_json::from_str::<Vec<MappingJobResult>>(text).map_err(|err| {
        ServiceError::permanent(
            Service::Mapping,
            "parse",
            format!("unexpected mapping response ({err}): {text}"),
        )
        .into()
    })
}
