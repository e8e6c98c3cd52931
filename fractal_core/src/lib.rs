//! Fractal-dimension adaptive RSI.
//!
//! The indicator estimates the fractal dimension of the recent price path,
//! turns it into a Hurst exponent and uses that to size the RSI lookback on
//! every sample.

pub mod common;
pub mod config;
pub mod indicator;
pub mod math;
pub mod traits;

pub use common::enums::{IndicatorState, PriceSource};
pub use common::error::{ErrCode, FractalError, Result};
pub use common::price::Price;
pub use config::fractal_config::FractalRsiConfig;
pub use indicator::fractal_rsi::{FractalRsi, IndicatorValue};
pub use math::adaptive_period::FractalMetrics;
pub use math::price_window::PriceWindow;
pub use traits::indicator_trait::StreamingIndicator;
