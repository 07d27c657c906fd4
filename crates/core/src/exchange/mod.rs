pub mod continent;
pub mod rules;

use crate::domain::ExchangeCandidate;
use serde::Deserialize;

pub use continent::continent_for;
pub use rules::{ExchangeRules, Listing};

/// Row of the exchange-code reference table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExchangeCodeRow {
    #[serde(rename = "Exchange Code", default)]
    pub exchange_code: String,
    #[serde(rename = "Composite Name", default)]
    pub composite_name: String,
    #[serde(rename = "ISO Country Code", default)]
    pub iso_country_code: String,
    #[serde(rename = "Full Exchange Name", default)]
    pub full_exchange_name: String,
}

impl ExchangeCodeRow {
    fn candidate(&self) -> ExchangeCandidate {
        let display_name = if self.composite_name.trim().is_empty() {
            self.full_exchange_name.trim().to_string()
        } else {
            format!(
                "{} ({})",
                self.full_exchange_name.trim(),
                self.composite_name.trim()
            )
        };
        ExchangeCandidate {
            code: self.exchange_code.trim().to_string(),
            display_name,
        }
    }
}

/// Proposes the exchanges to try for a holding, most specific first.
#[derive(Debug, Clone)]
pub struct ExchangeLocator {
    table: Vec<ExchangeCodeRow>,
    rules: ExchangeRules,
}

impl ExchangeLocator {
    pub fn new(table: Vec<ExchangeCodeRow>, rules: ExchangeRules) -> Self {
        Self { table, rules }
    }

    pub fn rules(&self) -> &ExchangeRules {
        &self.rules
    }

    /// Candidate exchanges for `country`, in lookup order.
    ///
    /// Fixed country lists are returned as configured. Otherwise rows whose
    /// composite name contains the country are used, then rows whose ISO code
    /// matches the ISIN prefix, and the cross-exchange code always closes the
    /// list.
    pub fn candidates(&self, country: &str, isin_prefix: &str) -> Vec<ExchangeCandidate> {
        if let Some(codes) = self.rules.primary_codes(country) {
            return codes
                .iter()
                .map(|code| ExchangeCandidate {
                    code: code.clone(),
                    display_name: self.display_name_for(code),
                })
                .collect();
        }

        let needle = country.trim().to_lowercase();
        let mut out = Vec::new();
        if !needle.is_empty() {
            let by_name = self
                .table
                .iter()
                .filter(|row| row.composite_name.to_lowercase().contains(&needle));
            push_unique(&mut out, by_name);
        }

        let prefix = isin_prefix.trim();
        if out.is_empty() && !prefix.is_empty() {
            let by_iso = self
                .table
                .iter()
                .filter(|row| row.iso_country_code.trim().eq_ignore_ascii_case(prefix));
            push_unique(&mut out, by_iso);
        }

        let fallback = &self.rules.cross_exchange_code;
        if !out.iter().any(|c| &c.code == fallback) {
            out.push(ExchangeCandidate {
                code: fallback.clone(),
                display_name: self.display_name_for(fallback),
            });
        }

        out
    }

    fn display_name_for(&self, code: &str) -> String {
        self.table
            .iter()
            .find(|row| row.exchange_code.trim() == code)
            .map(|row| row.candidate().display_name)
            .unwrap_or_else(|| code.to_string())
    }
}

fn push_unique<'a>(
    out: &mut Vec<ExchangeCandidate>,
    rows: impl Iterator<Item = &'a ExchangeCodeRow>,
) {
    for row in rows {
        let candidate = row.candidate();
        if candidate.code.is_empty() || out.iter().any(|c| c.code == candidate.code) {
            continue;
        }
        out.push(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, composite: &str, iso: &str, full: &str) -> ExchangeCodeRow {
        ExchangeCodeRow {
            exchange_code: code.to_string(),
            composite_name: composite.to_string(),
            iso_country_code: iso.to_string(),
            full_exchange_name: full.to_string(),
        }
    }

    fn locator() -> ExchangeLocator {
        ExchangeLocator::new(
            vec![
                row("GR", "Germany", "DE", "Germany Composite"),
                row("GY", "Germany", "DE", "Xetra"),
                row("GR", "Germany", "DE", "Duplicate composite"),
                row("", "Germany", "DE", "Unlisted"),
                row("JT", "Japan", "JP", "Tokyo"),
                row("KP", "Korea (South)", "KR", "Korea Composite"),
                row("US", "United States", "US", "US Composite"),
                row("LN", "United Kingdom", "GB", "London"),
            ],
            ExchangeRules::default(),
        )
    }

    fn codes(c: &[ExchangeCandidate]) -> Vec<&str> {
        c.iter().map(|c| c.code.as_str()).collect()
    }

    #[test]
    fn fixed_countries_use_configured_order() {
        let l = locator();
        assert_eq!(codes(&l.candidates("United Kingdom", "GB")), ["LO", "LN"]);
        assert_eq!(codes(&l.candidates("United States", "US")), ["US"]);
        assert_eq!(
            l.candidates("United Kingdom", "GB")[1].display_name,
            "London (United Kingdom)"
        );
    }

    #[test]
    fn substring_match_is_case_insensitive_and_deduplicated() {
        let l = locator();
        assert_eq!(codes(&l.candidates("germany", "DE")), ["GR", "GY", "US"]);
        assert_eq!(codes(&l.candidates("Korea", "KR")), ["KP", "US"]);
    }

    #[test]
    fn falls_back_to_isin_prefix_then_default() {
        let l = locator();
        // No composite name mentions "Nippon"; the ISIN prefix still finds Tokyo.
        assert_eq!(codes(&l.candidates("Nippon", "jp")), ["JT", "US"]);
        assert_eq!(codes(&l.candidates("Atlantis", "XX")), ["US"]);
        assert_eq!(l.candidates("Atlantis", "XX")[0].display_name, "US Composite (United States)");
    }

    #[test]
    fn candidate_order_is_reproducible() {
        let l = locator();
        let first = l.candidates("Germany", "DE");
        for _ in 0..10 {
            assert_eq!(l.candidates("Germany", "DE"), first);
        }
    }
}
