use crate::core::arc_phase::{compute_arc_phase, pixel_phase_series};
use crate::core::butterworth::{ButterworthLowpass, ButterworthParams};
use crate::core::savgol::{SavGolParams, SavitzkyGolay};
use crate::core::smoothing::{PhaseSmoother, SmoothedSeries};
use crate::core::stability::{
    compute_adi, select_points, select_reference_pixel, AdiResult, StabilityMasks,
    StabilityThresholds,
};
use crate::types::{PixelCoord, SarResult, StackData};
use ndarray::{Array1, Array3};
use serde::{Deserialize, Serialize};

/// Parameters for one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub thresholds: StabilityThresholds,
    pub butterworth: ButterworthParams,
    pub savgol: SavGolParams,
    /// Number of first-order pixels whose smoothed series are compared
    pub comparison_points: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            thresholds: StabilityThresholds::default(),
            butterworth: ButterworthParams::default(),
            savgol: SavGolParams::default(),
            comparison_points: 5,
        }
    }
}

/// Original and smoothed phase series of one pixel relative to the reference
#[derive(Debug, Clone)]
pub struct PixelComparison {
    pub pixel: PixelCoord,
    pub original: Array1<f64>,
    pub butterworth: SmoothedSeries,
    pub savgol: SmoothedSeries,
}

/// Everything produced by [`ArcAnalysis::run`]
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub adi: AdiResult,
    pub masks: StabilityMasks,
    pub reference: PixelCoord,
    pub arc_phases: Array3<f64>,
    pub comparisons: Vec<PixelComparison>,
}

/// Stability classification, arc phases and smoothing for a loaded stack
pub struct ArcAnalysis {
    config: AnalysisConfig,
}

impl ArcAnalysis {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Analysis with default parameters
    pub fn standard() -> Self {
        Self::new(AnalysisConfig::default())
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn run(&self, data: &StackData) -> SarResult<AnalysisResult> {
        log::info!(
            "Starting arc analysis of {} acquisitions, {}x{} pixels",
            data.num_acquisitions(),
            data.image_dim().0,
            data.image_dim().1
        );
        log::debug!("Analysis parameters: {:?}", self.config);

        // Design the filter up front so bad parameters fail before the heavy work
        let butterworth = ButterworthLowpass::from_params(&self.config.butterworth)?;
        let savgol = SavitzkyGolay::with_params(self.config.savgol);

        let adi = compute_adi(&data.slc)?;
        let thresholds = self.config.thresholds;
        let masks = select_points(&adi.adi, thresholds.thr_ps, thresholds.thr_tcs);

        let reference = select_reference_pixel(&masks.first_order)?;
        log::info!("Reference pixel: {}", reference);

        let arc_phases = compute_arc_phase(&data.slc, reference.row, reference.col)?;

        let comparisons = masks
            .first_order_coords()
            .into_iter()
            .take(self.config.comparison_points)
            .map(|pixel| compare_smoothers(&arc_phases, pixel, &butterworth, &savgol))
            .collect::<SarResult<Vec<_>>>()?;

        log::info!("Arc analysis completed, {} pixel comparisons", comparisons.len());

        Ok(AnalysisResult {
            adi,
            masks,
            reference,
            arc_phases,
            comparisons,
        })
    }
}

/// Smooth one pixel's phase series with both filters
pub fn compare_smoothers(
    arc_phases: &Array3<f64>,
    pixel: PixelCoord,
    butterworth: &dyn PhaseSmoother,
    savgol: &dyn PhaseSmoother,
) -> SarResult<PixelComparison> {
    let original = pixel_phase_series(arc_phases, pixel)?;
    let butterworth = butterworth.smooth(&original);
    let savgol = savgol.smooth(&original);

    log::debug!(
        "Pixel {}: Butterworth {:?}, Savitzky-Golay {:?}",
        pixel,
        butterworth.mode,
        savgol.mode
    );

    Ok(PixelComparison {
        pixel,
        original,
        butterworth,
        savgol,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::smoothing::FilterMode;
    use crate::types::{SarComplex, SarError};
    use ndarray::{Array2, Array3};

    fn stack_data(num_acq: usize) -> StackData {
        let slc = Array3::from_shape_fn((num_acq, 3, 3), |(t, r, c)| {
            let amp = if r == 2 && c == 2 { 1.0 + (t % 2) as f32 } else { 2.0 };
            SarComplex::from_polar(amp, 0.3 * (t * c) as f32)
        });
        StackData {
            slc,
            tbase: Array1::linspace(0.0, 1.0, num_acq),
            pbase: Array1::zeros(num_acq),
            incidence_angle: Array2::zeros((3, 3)),
            slant_range: Array2::zeros((3, 3)),
        }
    }

    #[test]
    fn test_run_produces_comparisons() {
        let result = ArcAnalysis::standard().run(&stack_data(20)).unwrap();

        assert_eq!(result.reference, PixelCoord::new(0, 0));
        assert_eq!(result.arc_phases.dim(), (20, 3, 3));
        assert!(!result.masks.first_order[[2, 2]]);
        assert_eq!(result.comparisons.len(), 5);

        for comparison in &result.comparisons {
            assert_eq!(comparison.original.len(), 20);
            assert_eq!(comparison.butterworth.mode, FilterMode::ZeroPhase);
            assert_eq!(comparison.savgol.mode, FilterMode::LocalPolynomial);
            assert_eq!(comparison.butterworth.data.len(), 20);
        }
    }

    #[test]
    fn test_run_without_stable_pixels_fails() {
        let config = AnalysisConfig {
            thresholds: StabilityThresholds { thr_ps: 0.0, thr_tcs: 0.1 },
            ..AnalysisConfig::default()
        };
        let err = ArcAnalysis::new(config).run(&stack_data(6)).unwrap_err();
        assert!(matches!(err, SarError::EmptySelection(_)));
    }

    #[test]
    fn test_run_rejects_bad_cutoff() {
        let mut config = AnalysisConfig::default();
        config.butterworth.cutoff = 0.6;
        let err = ArcAnalysis::new(config).run(&stack_data(6)).unwrap_err();
        assert!(matches!(err, SarError::InvalidParameter(_)));
    }
}
