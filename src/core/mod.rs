//! Core stack analysis modules

pub mod stability;
pub mod arc_phase;
pub mod smoothing;
pub mod butterworth;
pub mod savgol;
pub mod selection;
pub mod pipeline;

// Re-export main types
pub use stability::{
    compute_adi, mask_coords, select_points, select_reference_pixel, AdiResult, StabilityMasks,
    StabilityThresholds,
};
pub use arc_phase::{arc_phase_series, compute_arc_phase, pixel_phase_series, unwrap_phase};
pub use smoothing::{FilterMode, PhaseSmoother, SmoothedSeries};
pub use butterworth::{butter_lowpass_filter, ButterworthLowpass, ButterworthParams};
pub use savgol::{adjust_window, sav_golay_smooth, SavGolParams, SavitzkyGolay};
pub use selection::{ArcSelector, SelectionEvent, SelectionState};
pub use pipeline::{compare_smoothers, AnalysisConfig, AnalysisResult, ArcAnalysis, PixelComparison};
