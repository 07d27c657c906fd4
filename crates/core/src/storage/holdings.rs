use crate::domain::Holding;
use crate::storage::{parse_rows, read_text};
use std::collections::HashSet;
use std::path::Path;

pub fn load_holdings(path: &Path) -> anyhow::Result<Vec<Holding>> {
    let text = read_text(path)?;
    parse_holdings(&text)
}

/// Parses a holdings document. ISIN is the row key, so blanks and duplicates
/// are rejected.
pub fn parse_holdings(text: &str) -> anyhow::Result<Vec<Holding>> {
    let holdings: Vec<Holding> = parse_rows(text, "holdings")?;

    let mut seen = HashSet::new();
    for h in &holdings {
        anyhow::ensure!(!h.isin.is_empty(), "holding ISIN must be non-empty");
        anyhow::ensure!(seen.insert(h.isin.as_str()), "duplicate holding ISIN: {}", h.isin);
    }

    Ok(holdings)
}
