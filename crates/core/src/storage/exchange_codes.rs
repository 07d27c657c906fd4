use crate::exchange::ExchangeCodeRow;
use crate::storage::{parse_rows, read_text};
use std::path::Path;

pub fn load_exchange_codes(path: &Path) -> anyhow::Result<Vec<ExchangeCodeRow>> {
    let text = read_text(path)?;
    let rows = parse_exchange_codes(&text)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded exchange codes");
    Ok(rows)
}

pub fn parse_exchange_codes(text: &str) -> anyhow::Result<Vec<ExchangeCodeRow>> {
    let rows: Vec<ExchangeCodeRow> = parse_rows(text, "exchange code")?;
    anyhow::ensure!(!rows.is_empty(), "exchange code table is empty");
    Ok(rows)
}
