use serde::Serialize;

/// Metrics derived from one fractal dimension estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FractalMetrics {
    /// Fractal Dimension Index, not clamped
    pub fdi: f64,
    /// `2 - fdi`
    pub hurst: f64,
    /// `1 / hurst`, or 0 when `hurst == 0`
    pub trail_dim: f64,
    /// Adaptive RSI length, always >= 1
    pub speed: usize,
}

impl FractalMetrics {
    /// Map an FDI estimate to the adaptive RSI length.
    ///
    /// `speed = max(1, round(normal_speed * trail_dim / 2))`, with ties rounded
    /// away from zero. A negative `trail_dim` is passed through unclamped and
    /// absorbed by the floor.
    pub fn from_fdi(fdi: f64, normal_speed: usize) -> Self {
        let hurst = 2.0 - fdi;
        let trail_dim = if hurst != 0.0 { 1.0 / hurst } else { 0.0 };
        let raw = (normal_speed as f64 * trail_dim / 2.0).round();
        // NaN falls through to the floor as well.
        let speed = if raw >= 1.0 { raw as usize } else { 1 };

        Self {
            fdi,
            hurst,
            trail_dim,
            speed,
        }
    }
}
