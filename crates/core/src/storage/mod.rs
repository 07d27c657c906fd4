pub mod enriched;
pub mod exchange_codes;
pub mod holdings;

use anyhow::Context;
use encoding_rs::WINDOWS_1252;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Reads a text file, falling back to Windows-1252 when it is not UTF-8.
pub fn read_text(path: &Path) -> anyhow::Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(decode_text(bytes))
}

pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s.trim_start_matches('\u{feff}').to_string(),
        Err(err) => {
            let (cow, _, _) = WINDOWS_1252.decode(err.as_bytes());
            cow.into_owned()
        }
    }
}

/// Deserializes every row of a headed CSV document.
pub(crate) fn parse_rows<T: DeserializeOwned>(text: &str, what: &str) -> anyhow::Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut out = Vec::new();
    for (idx, row) in reader.deserialize::<T>().enumerate() {
        // Header is line 1.
        let row = row.with_context(|| format!("invalid {what} row at line {}", idx + 2))?;
        out.push(row);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_windows_1252_when_not_utf8() {
        // "Société" with é encoded as 0xE9.
        let bytes = b"Soci\xe9t\xe9".to_vec();
        assert_eq!(decode_text(bytes), "Société");
    }

    #[test]
    fn strips_utf8_bom() {
        let bytes = "\u{feff}ISIN,Country".as_bytes().to_vec();
        assert_eq!(decode_text(bytes), "ISIN,Country");
    }
}
