//! arcphase: stability analysis and arc phase smoothing for SAR SLC stacks
//!
//! Loads a co-registered stack of single-look complex acquisitions, classifies
//! pixels by their amplitude dispersion index, forms reference-relative
//! unwrapped phase time series and smooths them with a zero-phase Butterworth
//! low-pass filter or a Savitzky-Golay filter.

pub mod types;
pub mod io;
pub mod core;
#[cfg(feature = "plot")]
pub mod plot;
#[cfg(feature = "python")]
mod python;

// Re-export main types and functions for easier access
pub use types::{
    PixelCoord, PixelMask, SarComplex, SarError, SarReal, SarRealImage, SarResult, SlcStack,
    StackData,
};

pub use io::{load_from_containers, DataContainer, MemoryContainer, StackFieldNames};
#[cfg(feature = "hdf5")]
pub use io::{load_slc_stack, load_slc_stack_with_fields, Hdf5Container};

pub use crate::core::{
    butter_lowpass_filter, compute_adi, compute_arc_phase, sav_golay_smooth, select_points,
    select_reference_pixel, AnalysisConfig, ArcAnalysis, ArcSelector, PhaseSmoother,
};
