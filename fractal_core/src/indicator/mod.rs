pub mod fractal_rsi;
