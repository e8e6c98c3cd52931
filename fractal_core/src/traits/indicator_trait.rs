/// Streaming indicator fed one sample at a time.
///
/// Implementors own their history and are driven by a single caller in time
/// order.
pub trait StreamingIndicator {
    type Input;
    type Output;

    /// Short identifier, e.g. "FRACTAL_RSI"
    fn name(&self) -> &str;

    /// Feed the next sample and return the value for it.
    fn process(&mut self, input: Self::Input) -> Self::Output;

    /// Drop all history, back to the just-constructed state.
    fn reset(&mut self);

    /// Whether the last processed sample produced a meaningful value.
    fn is_formed(&self) -> bool;

    /// Minimum number of samples before a formed value is possible.
    fn warmup_period(&self) -> usize;
}
