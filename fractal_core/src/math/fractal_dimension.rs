use std::f64::consts::LN_2;

use super::price_window::PriceWindow;
use crate::common::price::Price;

/// Fractal Dimension Index of the newest `period` samples in `window`.
///
/// The samples are normalised into `[0, 1]` by the window's own range and
/// laid out with a horizontal step of `1 / period`. The length of the
/// resulting path gives
///
/// ```text
/// fdi = 1 + (ln(length) + ln 2) / ln(2 * (period - 1))
/// ```
///
/// A zero-range window has zero length and yields `0.0`. The result is not
/// clamped to `[1, 2]`. Small periods can push it past 2.
///
/// Callers are expected to hold at least `period` samples. With fewer, or with
/// `period < 2` where the denominator degenerates, this returns `0.0`.
pub fn fractal_dimension<P: Price>(window: &PriceWindow<P>, period: usize) -> f64 {
    if period < 2 || window.len() < period {
        return 0.0;
    }

    let length = normalized_path_length(window, period);
    if length > 0.0 {
        1.0 + (length.ln() + LN_2) / (2.0 * (period - 1) as f64).ln()
    } else {
        0.0
    }
}

/// Path length of the newest `period` samples after normalisation.
fn normalized_path_length<P: Price>(window: &PriceWindow<P>, period: usize) -> f64 {
    let newest = || window.iter().rev().take(period);

    let mut price_max = window[window.len() - 1];
    let mut price_min = price_max;
    for &price in newest() {
        if price > price_max {
            price_max = price;
        }
        if price < price_min {
            price_min = price;
        }
    }
    if price_max == price_min {
        return 0.0;
    }

    let offset = |price: P| match price.checked_sub(price_min) {
        Some(delta) => delta.as_f64(),
        None => price.as_f64() - price_min.as_f64(),
    };
    let range = offset(price_max);
    let step = 1.0 / period as f64;
    let step_sq = step * step;

    // Walk backwards in time from the newest sample.
    let mut length = 0.0;
    let mut prev: Option<f64> = None;
    for &price in newest() {
        let point = offset(price) / range;
        if let Some(prev) = prev {
            length += ((point - prev).powi(2) + step_sq).sqrt();
        }
        prev = Some(point);
    }
    length
}
