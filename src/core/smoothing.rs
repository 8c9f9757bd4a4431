//! Shared types for the 1-D phase smoothing filters

use ndarray::Array1;

/// How a smoother actually treated its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Forward-backward filtering, no phase delay
    ZeroPhase,
    /// Single forward pass, output is delayed
    Causal,
    /// Sliding local polynomial fit
    LocalPolynomial,
    /// Input too short for the requested parameters, returned unchanged
    Skipped,
}

/// A smoothed series together with the mode that produced it
#[derive(Debug, Clone)]
pub struct SmoothedSeries {
    pub data: Array1<f64>,
    pub mode: FilterMode,
}

impl SmoothedSeries {
    pub fn unchanged(data: &Array1<f64>) -> Self {
        Self {
            data: data.clone(),
            mode: FilterMode::Skipped,
        }
    }

    pub fn was_skipped(&self) -> bool {
        self.mode == FilterMode::Skipped
    }
}

/// A deterministic smoother for phase time series
///
/// Output always has the input's length and sample alignment.
pub trait PhaseSmoother {
    /// Short name used in logs and plot legends
    fn name(&self) -> &'static str;

    fn smooth(&self, series: &Array1<f64>) -> SmoothedSeries;
}
