use serde::{Deserialize, Serialize};

pub const ID_TYPE_ISIN: &str = "ID_ISIN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingJob {
    pub id_type: String,
    pub id_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exch_code: Option<String>,
}

impl MappingJob {
    pub fn isin(isin: &str, exch_code: &str) -> Self {
        Self {
            id_type: ID_TYPE_ISIN.to_string(),
            id_value: isin.trim().to_string(),
            exch_code: Some(exch_code.trim().to_string()).filter(|c| !c.is_empty()),
        }
    }
}

/// Result for one job: either `data`, a "No identifier found." `warning`, or
/// a per-job `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MappingJobResult {
    #[serde(default)]
    pub data: Option<Vec<FigiInstrument>>,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FigiInstrument {
    #[serde(default)]
    pub figi: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub exch_code: Option<String>,
    #[serde(default)]
    pub security_type: Option<String>,
    #[serde(default)]
    pub market_sector: Option<String>,
}
