pub mod adaptive_period;
pub mod adaptive_rsi;
pub mod fractal_dimension;
pub mod price_window;
