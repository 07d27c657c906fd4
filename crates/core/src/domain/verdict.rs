use rust_decimal::Decimal;
use std::fmt;

/// A business or financial screening outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Compliant,
    NonCompliant,
    Questionable,
    Unrated,
    /// Provider-defined value, already normalised for display.
    Other(String),
}

impl Screen {
    /// Parses a provider verdict regardless of its casing or separators.
    ///
    /// `"NON_COMPLIANT"`, `"non compliant"` and `"Non-Compliant"` all map to
    /// [`Screen::NonCompliant`]. Blank input is treated as unrated.
    pub fn parse(raw: &str) -> Self {
        let normalized = normalize(raw);
        match normalized.as_str() {
            "" | "Unrated" => Self::Unrated,
            "Compliant" => Self::Compliant,
            "Non-compliant" => Self::NonCompliant,
            "Questionable" => Self::Questionable,
            _ => Self::Other(normalized),
        }
    }

    pub fn is_unrated(&self) -> bool {
        matches!(self, Self::Unrated)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Compliant => "Compliant",
            Self::NonCompliant => "Non-compliant",
            Self::Questionable => "Questionable",
            Self::Unrated => "Unrated",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(raw: &str) -> String {
    let lower = raw
        .trim()
        .chars()
        .map(|c| if c == '_' || c.is_whitespace() { '-' } else { c })
        .collect::<String>()
        .to_lowercase();

    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceVerdict {
    pub business_screen: Screen,
    pub financial_screen: Screen,
    /// Share of revenue deemed non-compliant, in `[0, 1]`.
    pub haram_fraction: Option<Decimal>,
}

impl ComplianceVerdict {
    pub fn unrated() -> Self {
        Self {
            business_screen: Screen::Unrated,
            financial_screen: Screen::Unrated,
            haram_fraction: None,
        }
    }

    pub fn is_unrated(&self) -> bool {
        self.business_screen.is_unrated()
    }

    /// Fraction used for impurity arithmetic. Unrated or missing counts as zero.
    pub fn effective_fraction(&self) -> Decimal {
        if self.is_unrated() {
            return Decimal::ZERO;
        }
        self.haram_fraction.unwrap_or(Decimal::ZERO)
    }
}
