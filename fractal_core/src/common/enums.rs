use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use super::price::Price;

/// Indicator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IndicatorState {
    NotFormed,
    Formed,
}

/// Which bar field is fed to the indicator
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Open,
    High,
    Low,
    #[default]
    Close,
    /// (high + low) / 2
    Median,
    /// (high + low + close) / 3
    Typical,
}

impl PriceSource {
    pub fn pick<P: Price>(&self, open: P, high: P, low: P, close: P) -> P {
        match self {
            PriceSource::Open => open,
            PriceSource::High => high,
            PriceSource::Low => low,
            PriceSource::Close => close,
            PriceSource::Median => mean(&[high, low]),
            PriceSource::Typical => mean(&[high, low, close]),
        }
    }
}

/// Exact when the sum fits in `P`, otherwise each term is divided first
fn mean<P: Price>(values: &[P]) -> P {
    let count = P::from_count(values.len());
    let exact = values
        .iter()
        .try_fold(P::zero(), |acc, &value| acc.checked_add(value));
    if let Some(sum) = exact {
        return sum / count;
    }

    values
        .iter()
        .try_fold(P::zero(), |acc, &value| acc.checked_add(value / count))
        .unwrap_or_else(|| {
            // Rounding pushed the scaled sum past the edge all values sit at.
            let upward = values.iter().any(|&value| value > P::zero());
            values
                .iter()
                .copied()
                .reduce(|acc, value| if (value > acc) == upward { value } else { acc })
                .unwrap_or_else(P::zero)
        })
}
