use super::price_window::PriceWindow;
use crate::common::price::Price;

/// Gain and loss sums over the newest `speed` deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiSums<P> {
    pub sum_up: P,
    pub sum_down: P,
}

impl<P: Price> RsiSums<P> {
    /// Sum the newest `speed` deltas in `P`.
    ///
    /// `None` when a delta or a running sum leaves the range of `P`.
    pub fn collect(window: &PriceWindow<P>, speed: usize) -> Option<Self> {
        let zero = P::zero();
        let mut sums = Self {
            sum_up: zero,
            sum_down: zero,
        };

        let len = window.len();
        for i in first_delta(len, speed)..len {
            let diff = window[i].checked_sub(window[i - 1])?;
            if diff > zero {
                sums.sum_up = sums.sum_up.checked_add(diff)?;
            } else if diff < zero {
                sums.sum_down = sums.sum_down.checked_add(zero.checked_sub(diff)?)?;
            }
        }
        Some(sums)
    }

    /// Oscillator value in `[0, 100]`.
    ///
    /// `100 - 100 / (1 + pos/neg)` with `pos`, `neg` the sums averaged over the
    /// window. The averaging cancels, so the gain share of the raw sums is
    /// scaled to 100. A window without losses reads 100 if it gained and 50 if
    /// it was flat.
    pub fn rsi(&self) -> P {
        let zero = P::zero();
        if self.sum_down > zero {
            P::hundred() * self.gain_share()
        } else if self.sum_up > zero {
            P::hundred()
        } else {
            P::neutral()
        }
    }

    fn gain_share(&self) -> P {
        match self.sum_up.checked_add(self.sum_down) {
            Some(total) => self.sum_up / total,
            None => {
                let four = P::from_count(4);
                let up = self.sum_up / four;
                up / (up + self.sum_down / four)
            }
        }
    }
}

impl RsiSums<f64> {
    /// Sum the newest `speed` deltas after widening every price to `f64`
    pub fn collect_f64<P: Price>(window: &PriceWindow<P>, speed: usize) -> Self {
        let mut sums = Self {
            sum_up: 0.0,
            sum_down: 0.0,
        };

        let len = window.len();
        for i in first_delta(len, speed)..len {
            let diff = window[i].as_f64() - window[i - 1].as_f64();
            if diff > 0.0 {
                sums.sum_up += diff;
            } else if diff < 0.0 {
                sums.sum_down -= diff;
            }
        }
        sums
    }
}

fn first_delta(len: usize, speed: usize) -> usize {
    len.saturating_sub(speed).max(1)
}

/// RSI over the newest `speed` price deltas of `window`.
///
/// Needs `speed + 1` samples. With fewer the neutral value is returned.
/// Deltas too large for `P` are summed in `f64` instead.
pub fn adaptive_rsi<P: Price>(window: &PriceWindow<P>, speed: usize) -> P {
    if speed == 0 || window.len() <= speed {
        return P::neutral();
    }
    match RsiSums::collect(window, speed) {
        Some(sums) => sums.rsi(),
        None => {
            let value = RsiSums::<f64>::collect_f64(window, speed).rsi();
            P::from_f64(value).unwrap_or_else(P::neutral)
        }
    }
}
