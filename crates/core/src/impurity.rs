use rust_decimal::{Decimal, RoundingStrategy};

const IMPURITY_DP: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Impurity {
    pub impure_market_value: Decimal,
    pub impure_weighting: Decimal,
}

/// Splits out the non-compliant share of a holding's value and weight.
///
/// Results are rounded half-to-even at six decimal places. A missing fraction
/// (unrated holding) yields zeros.
pub fn impurity(market_value: Decimal, weighting: Decimal, haram_fraction: Option<Decimal>) -> Impurity {
    let fraction = haram_fraction
        .unwrap_or(Decimal::ZERO)
        .clamp(Decimal::ZERO, Decimal::ONE);

    Impurity {
        impure_market_value: round(market_value * fraction),
        impure_weighting: round(weighting * fraction),
    }
}

fn round(v: Decimal) -> Decimal {
    v.round_dp_with_strategy(IMPURITY_DP, RoundingStrategy::MidpointNearestEven)
}
