use serde::Serialize;
use tracing::{debug, trace};

use crate::common::{enums::IndicatorState, error::Result, price::Price};
use crate::config::fractal_config::FractalRsiConfig;
use crate::math::{
    adaptive_period::FractalMetrics, adaptive_rsi::adaptive_rsi,
    fractal_dimension::fractal_dimension, price_window::PriceWindow,
};
use crate::traits::indicator_trait::StreamingIndicator;

/// One indicator reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorValue<P> {
    /// Oscillator value in `[0, 100]`, 50 while not formed
    pub value: P,
    pub is_formed: bool,
}

impl<P: Price> IndicatorValue<P> {
    pub fn formed(value: P) -> Self {
        Self {
            value,
            is_formed: true,
        }
    }

    pub fn not_formed() -> Self {
        Self {
            value: P::neutral(),
            is_formed: false,
        }
    }
}

/// Fractal-dimension adaptive RSI.
///
/// Every sample re-estimates the fractal dimension of the last `period`
/// prices, derives an RSI length (`speed`) from the implied Hurst exponent and
/// evaluates RSI over the last `speed` deltas.
///
/// The formed flag is re-evaluated on every call: once `period + 1` samples are
/// held, a sample whose `speed` is not below the history length reads as not
/// formed again.
#[derive(Debug, Clone)]
pub struct FractalRsi<P = f64> {
    config: FractalRsiConfig,
    window: PriceWindow<P>,
    state: IndicatorState,
    last_metrics: Option<FractalMetrics>,
}

impl<P: Price> FractalRsi<P> {
    pub fn new(period: usize, normal_speed: usize) -> Result<Self> {
        Self::with_config(FractalRsiConfig::new(period, normal_speed)?)
    }

    pub fn with_config(config: FractalRsiConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            period = config.period,
            normal_speed = config.normal_speed,
            max_history = config.history_cap(),
            "fractal rsi created"
        );

        Ok(Self {
            window: PriceWindow::new(config.history_cap()),
            config,
            state: IndicatorState::NotFormed,
            last_metrics: None,
        })
    }

    pub fn process(&mut self, price: P) -> IndicatorValue<P> {
        self.window.push(price);

        if self.window.len() < self.config.warmup_period() {
            return IndicatorValue::not_formed();
        }

        let fdi = fractal_dimension(&self.window, self.config.period);
        let metrics = FractalMetrics::from_fdi(fdi, self.config.normal_speed);
        self.last_metrics = Some(metrics);

        if self.window.len() <= metrics.speed {
            self.set_state(IndicatorState::NotFormed);
            trace!(fdi, speed = metrics.speed, "speed exceeds history");
            return IndicatorValue::not_formed();
        }

        let value = adaptive_rsi(&self.window, metrics.speed);
        self.set_state(IndicatorState::Formed);
        trace!(fdi, speed = metrics.speed, value = ?value, "sample processed");

        IndicatorValue::formed(value)
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.state = IndicatorState::NotFormed;
        self.last_metrics = None;
    }

    fn set_state(&mut self, state: IndicatorState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, len = self.window.len(), "state changed");
            self.state = state;
        }
    }

    pub fn config(&self) -> &FractalRsiConfig {
        &self.config
    }

    pub fn period(&self) -> usize {
        self.config.period
    }

    pub fn normal_speed(&self) -> usize {
        self.config.normal_speed
    }

    pub fn max_history(&self) -> usize {
        self.config.history_cap()
    }

    /// Number of retained samples
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn window(&self) -> &PriceWindow<P> {
        &self.window
    }

    pub fn state(&self) -> IndicatorState {
        self.state
    }

    pub fn is_formed(&self) -> bool {
        self.state == IndicatorState::Formed
    }

    /// Metrics of the last sample that ran the fractal estimate
    pub fn last_metrics(&self) -> Option<FractalMetrics> {
        self.last_metrics
    }
}

impl<P: Price> StreamingIndicator for FractalRsi<P> {
    type Input = P;
    type Output = IndicatorValue<P>;

    fn name(&self) -> &str {
        "FRACTAL_RSI"
    }

    fn process(&mut self, input: P) -> IndicatorValue<P> {
        FractalRsi::process(self, input)
    }

    fn reset(&mut self) {
        FractalRsi::reset(self)
    }

    fn is_formed(&self) -> bool {
        FractalRsi::is_formed(self)
    }

    fn warmup_period(&self) -> usize {
        self.config.warmup_period()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::ErrCode;
    use approx::assert_abs_diff_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_worked_trace() {
        let mut rsi = FractalRsi::<f64>::new(2, 2).unwrap();

        assert_eq!(rsi.process(10.0), IndicatorValue::not_formed());
        assert_eq!(rsi.process(11.0), IndicatorValue::not_formed());
        assert!(rsi.last_metrics().is_none());

        let out = rsi.process(9.0);
        assert_eq!(out, IndicatorValue::formed(0.0));
        assert_eq!(rsi.state(), IndicatorState::Formed);

        let metrics = rsi.last_metrics().unwrap();
        assert_abs_diff_eq!(metrics.fdi, 2.16096, epsilon = 1e-5);
        assert_abs_diff_eq!(metrics.hurst, -0.16096, epsilon = 1e-5);
        assert_abs_diff_eq!(metrics.trail_dim, -6.2127, epsilon = 1e-3);
        assert_eq!(metrics.speed, 1);
    }

    #[test]
    fn test_rejects_bad_config() {
        let err = FractalRsi::<f64>::new(1, 5).unwrap_err();
        assert_eq!(err.code(), ErrCode::PeriodOutOfRange);

        let err = FractalRsi::<f64>::new(5, 0).unwrap_err();
        assert_eq!(err.code(), ErrCode::SpeedOutOfRange);

        let config = FractalRsiConfig {
            period: 10,
            normal_speed: 10,
            max_history: Some(5),
        };
        let err = FractalRsi::<f64>::with_config(config).unwrap_err();
        assert_eq!(err.code(), ErrCode::HistoryTooShort);
    }

    #[test]
    fn test_long_period_without_explicit_cap() {
        let rsi = FractalRsi::<f64>::new(500, 14).unwrap();
        assert_eq!(rsi.period(), 500);
        assert_eq!(rsi.max_history(), 501);
        assert_eq!(rsi.window().capacity(), 501);
    }

    #[test]
    fn test_speed_beyond_history_reads_not_formed() {
        // Flat series: speed = round(40 * 0.5 / 2) = 10, period + 1 = 4.
        let mut rsi = FractalRsi::<f64>::new(3, 40).unwrap();
        for i in 0..10 {
            let out = rsi.process(1.0);
            assert!(!out.is_formed, "sample {} should not be formed", i);
            assert_eq!(out.value, 50.0);
        }
        assert_eq!(rsi.last_metrics().unwrap().speed, 10);

        let out = rsi.process(1.0);
        assert_eq!(out, IndicatorValue::formed(50.0));
        assert_eq!(rsi.len(), 11);
    }

    #[test]
    fn test_formed_flag_is_re_evaluated() {
        // period 3, normal_speed 10: a flat stretch needs speed 3 (len >= 4),
        // a two-bar whipsaw drives fdi towards 2 and speed well past the history.
        let mut rsi = FractalRsi::<f64>::new(3, 10).unwrap();
        for _ in 0..4 {
            rsi.process(1.0);
        }
        assert!(rsi.is_formed());

        let out = rsi.process(1.0);
        assert!(out.is_formed);

        let mut unformed = false;
        for price in [2.0, 1.0, 2.0, 1.0, 2.0] {
            let out = rsi.process(price);
            let speed = rsi.last_metrics().unwrap().speed;
            assert_eq!(out.is_formed, rsi.len() > speed);
            assert_eq!(rsi.is_formed(), out.is_formed);
            unformed |= !out.is_formed;
        }
        assert!(unformed);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut rsi = FractalRsi::<f64>::new(2, 2).unwrap();
        for price in [10.0, 11.0, 9.0] {
            rsi.process(price);
        }
        rsi.reset();
        assert!(rsi.is_empty());
        assert_eq!(rsi.state(), IndicatorState::NotFormed);
        assert!(rsi.last_metrics().is_none());
        assert_eq!(rsi.process(10.0), IndicatorValue::not_formed());
    }

    #[test]
    fn test_history_is_capped() {
        let config = FractalRsiConfig::new(4, 4).unwrap().with_max_history(6).unwrap();
        let mut rsi = FractalRsi::<f64>::with_config(config).unwrap();
        for i in 0..100 {
            rsi.process((i % 7) as f64);
            assert!(rsi.len() <= 6);
        }
        assert_eq!(rsi.window().capacity(), 6);
    }

    #[test]
    fn test_decimal_prices() {
        let mut rsi = FractalRsi::<Decimal>::new(2, 2).unwrap();
        rsi.process(Decimal::from(10));
        rsi.process(Decimal::from(11));
        let out = rsi.process(Decimal::from(9));
        assert_eq!(out, IndicatorValue::formed(Decimal::ZERO));
    }

    #[test]
    fn test_decimal_large_sawtooth_stays_in_range() {
        let unit = Decimal::from_str("100000000000000000000000000").unwrap();
        let mut rsi = FractalRsi::<Decimal>::new(10, 10).unwrap();
        let mut formed = 0;
        for _ in 0..5 {
            for step in (0..=8).chain([0]) {
                let out = rsi.process(unit * Decimal::from(step));
                assert!(out.value >= Decimal::ZERO && out.value <= Decimal::ONE_HUNDRED);
                formed += usize::from(out.is_formed);
            }
        }
        assert!(formed > 0);
    }

    #[test]
    fn test_value_serializes() {
        let value = serde_json::to_value(IndicatorValue::formed(62.5)).unwrap();
        assert_eq!(value["value"], 62.5);
        assert_eq!(value["is_formed"], true);

        let value = serde_json::to_value(IndicatorValue::<f64>::not_formed()).unwrap();
        assert_eq!(value["value"], 50.0);
        assert_eq!(value["is_formed"], false);
    }

    #[test]
    fn test_streaming_trait() {
        fn drive<I: StreamingIndicator<Input = f64>>(ind: &mut I, prices: &[f64]) -> Vec<I::Output> {
            prices.iter().map(|&p| ind.process(p)).collect()
        }

        let mut rsi = FractalRsi::<f64>::new(2, 2).unwrap();
        assert_eq!(StreamingIndicator::name(&rsi), "FRACTAL_RSI");
        assert_eq!(StreamingIndicator::warmup_period(&rsi), 3);

        let out = drive(&mut rsi, &[10.0, 11.0, 9.0]);
        assert_eq!(out[2], IndicatorValue::formed(0.0));
        assert!(StreamingIndicator::is_formed(&rsi));

        StreamingIndicator::reset(&mut rsi);
        assert!(!StreamingIndicator::is_formed(&rsi));
    }
}
