//! Environment-driven view knobs.

#![forbid(unsafe_code)]

/// Runtime knobs for a `TableView`, read from the environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewConfig {
    /// Reuse filter/sort results for states already seen since the last source change.
    pub memoize: bool,
    /// Recomputes slower than this log a warning.
    pub slow_recompute_ms: u64,
}

impl Default for ViewConfig {
    fn default() -> Self { Self { memoize: false, slow_recompute_ms: 16 } }
}

impl ViewConfig {
    /// `TABULA_MEMOIZE` (1/true) and `TABULA_SLOW_RECOMPUTE_MS`; unset or unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        let memoize = std::env::var("TABULA_MEMOIZE")
            .ok()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(d.memoize);
        let slow_recompute_ms = std::env::var("TABULA_SLOW_RECOMPUTE_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(d.slow_recompute_ms);
        Self { memoize, slow_recompute_ms }
    }

    pub fn memoized(mut self) -> Self { self.memoize = true; self }
}
