//! Pixel stability classification based on the Amplitude Dispersion Index
//!
//! ADI = std(|z|) / mean(|z|) over the acquisition axis. Low dispersion marks
//! persistent scatterers (first order); a second band above it marks
//! temporarily coherent scatterers (TCS).

use crate::types::{PixelCoord, PixelMask, SarError, SarRealImage, SarResult, SlcStack};
use ndarray::{Array2, Axis, Zip};
use serde::{Deserialize, Serialize};

/// ADI thresholds for the two stability classes
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StabilityThresholds {
    /// Upper ADI bound (exclusive) for first-order points
    pub thr_ps: f32,
    /// Upper ADI bound (exclusive) for TCS points
    pub thr_tcs: f32,
}

impl Default for StabilityThresholds {
    fn default() -> Self {
        Self {
            thr_ps: 0.25,
            thr_tcs: 0.4,
        }
    }
}

/// Output of [`compute_adi`]
#[derive(Debug, Clone)]
pub struct AdiResult {
    /// Amplitude dispersion index, NaN where `indeterminate`
    pub adi: SarRealImage,
    /// Mean amplitude scaled to [0, 1] by the brightest pixel
    pub mean_amplitude: SarRealImage,
    /// Pixels whose mean amplitude is zero, so the ADI is undefined
    pub indeterminate: PixelMask,
}

impl AdiResult {
    pub fn num_indeterminate(&self) -> usize {
        self.indeterminate.iter().filter(|&&flag| flag).count()
    }
}

/// The two disjoint stability classes
#[derive(Debug, Clone)]
pub struct StabilityMasks {
    pub first_order: PixelMask,
    pub tcs: PixelMask,
}

impl StabilityMasks {
    pub fn count_first_order(&self) -> usize {
        self.first_order.iter().filter(|&&flag| flag).count()
    }

    pub fn count_tcs(&self) -> usize {
        self.tcs.iter().filter(|&&flag| flag).count()
    }

    /// First-order pixels in row-major order
    pub fn first_order_coords(&self) -> Vec<PixelCoord> {
        mask_coords(&self.first_order)
    }

    /// TCS pixels in row-major order
    pub fn tcs_coords(&self) -> Vec<PixelCoord> {
        mask_coords(&self.tcs)
    }

    /// Whether the pixel belongs to either class
    pub fn contains(&self, pixel: PixelCoord) -> bool {
        pixel.within(self.first_order.dim())
            && (self.first_order[[pixel.row, pixel.col]] || self.tcs[[pixel.row, pixel.col]])
    }
}

/// Compute the amplitude dispersion index and normalized mean amplitude
pub fn compute_adi(stack: &SlcStack) -> SarResult<AdiResult> {
    let (num_acq, rows, cols) = stack.dim();
    if num_acq == 0 {
        return Err(SarError::InvalidParameter(
            "Cannot compute ADI of a stack with no acquisitions".to_string(),
        ));
    }

    log::info!("Computing ADI for {} acquisitions over {}x{} pixels", num_acq, rows, cols);

    let mut adi = Array2::<f32>::zeros((rows, cols));
    let mut mean_amp = Array2::<f32>::zeros((rows, cols));
    let mut indeterminate = Array2::from_elem((rows, cols), false);

    Zip::from(&mut adi)
        .and(&mut mean_amp)
        .and(&mut indeterminate)
        .and(stack.lanes(Axis(0)))
        .for_each(|adi, mean_out, undefined, series| {
            // accumulate in f64, amplitudes of a long stack add up
            let n = series.len() as f64;
            let mean = series.iter().map(|z| z.norm() as f64).sum::<f64>() / n;
            let variance = series
                .iter()
                .map(|z| (z.norm() as f64 - mean).powi(2))
                .sum::<f64>()
                / n;

            *mean_out = mean as f32;
            if mean > 0.0 {
                *adi = (variance.sqrt() / mean) as f32;
            } else {
                *adi = f32::NAN;
                *undefined = true;
            }
        });

    let max_mean = mean_amp.iter().cloned().fold(0.0f32, f32::max);
    let mean_amplitude = if max_mean > 0.0 {
        mean_amp.mapv(|m| m / max_mean)
    } else {
        log::warn!("Stack has zero amplitude everywhere, mean amplitude image is blank");
        Array2::zeros((rows, cols))
    };

    let result = AdiResult {
        adi,
        mean_amplitude,
        indeterminate,
    };

    if result.num_indeterminate() > 0 {
        log::warn!(
            "{} pixels have zero mean amplitude and no defined ADI",
            result.num_indeterminate()
        );
    }
    log::debug!("Maximum mean amplitude: {}", max_mean);

    Ok(result)
}

/// Split pixels into first-order (`adi < thr_ps`) and TCS (`thr_ps <= adi < thr_tcs`)
///
/// Non-finite ADI values belong to neither class.
pub fn select_points(adi: &SarRealImage, thr_ps: f32, thr_tcs: f32) -> StabilityMasks {
    if thr_ps >= thr_tcs {
        log::debug!(
            "PS threshold {} is not below TCS threshold {}, TCS class will be empty",
            thr_ps,
            thr_tcs
        );
    }

    let first_order = adi.mapv(|value| value.is_finite() && value < thr_ps);
    let tcs = adi.mapv(|value| value.is_finite() && value >= thr_ps && value < thr_tcs);

    let masks = StabilityMasks { first_order, tcs };
    log::info!(
        "Selected {} first-order points and {} TCS points (thr_ps={}, thr_tcs={})",
        masks.count_first_order(),
        masks.count_tcs(),
        thr_ps,
        thr_tcs
    );
    masks
}

/// First true pixel of the mask in row-major order
pub fn select_reference_pixel(mask: &PixelMask) -> SarResult<PixelCoord> {
    mask.indexed_iter()
        .find(|(_, flag)| **flag)
        .map(|((row, col), _)| PixelCoord::new(row, col))
        .ok_or_else(|| {
            SarError::EmptySelection(format!(
                "No pixel is set in the {}x{} selection mask",
                mask.nrows(),
                mask.ncols()
            ))
        })
}

/// All true pixels of the mask in row-major order
pub fn mask_coords(mask: &PixelMask) -> Vec<PixelCoord> {
    mask.indexed_iter()
        .filter(|(_, flag)| **flag)
        .map(|((row, col), _)| PixelCoord::new(row, col))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SarComplex;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array3};

    fn stack_from_amplitudes(series: &[[f32; 2]; 3]) -> SlcStack {
        // 3 acquisitions over a 1x2 image
        let mut stack = Array3::zeros((3, 1, 2));
        for (t, amps) in series.iter().enumerate() {
            for (c, &a) in amps.iter().enumerate() {
                stack[[t, 0, c]] = SarComplex::new(0.0, a);
            }
        }
        stack
    }

    #[test]
    fn test_adi_shape_matches_image() {
        let stack = Array3::from_elem((5, 3, 7), SarComplex::new(1.0, 1.0));
        let result = compute_adi(&stack).unwrap();
        assert_eq!(result.adi.dim(), (3, 7));
        assert_eq!(result.mean_amplitude.dim(), (3, 7));
        assert_eq!(result.indeterminate.dim(), (3, 7));
    }

    #[test]
    fn test_adi_values() {
        let stack = stack_from_amplitudes(&[[1.0, 2.0], [2.0, 2.0], [3.0, 2.0]]);
        let result = compute_adi(&stack).unwrap();

        // population std of [1, 2, 3] is sqrt(2/3)
        assert_abs_diff_eq!(result.adi[[0, 0]], (2.0f32 / 3.0).sqrt() / 2.0, epsilon = 1e-6);
        assert_eq!(result.adi[[0, 1]], 0.0);
        assert_eq!(result.mean_amplitude[[0, 0]], 1.0);
        assert_eq!(result.mean_amplitude[[0, 1]], 1.0);
    }

    #[test]
    fn test_zero_amplitude_pixel_is_indeterminate() {
        let stack = stack_from_amplitudes(&[[0.0, 4.0], [0.0, 4.0], [0.0, 4.0]]);
        let result = compute_adi(&stack).unwrap();

        assert!(result.adi[[0, 0]].is_nan());
        assert!(result.indeterminate[[0, 0]]);
        assert!(!result.indeterminate[[0, 1]]);
        assert_eq!(result.num_indeterminate(), 1);
        assert_eq!(result.mean_amplitude[[0, 0]], 0.0);

        let masks = select_points(&result.adi, 0.25, 0.4);
        assert!(!masks.first_order[[0, 0]]);
        assert!(!masks.tcs[[0, 0]]);
        assert!(masks.first_order[[0, 1]]);
    }

    #[test]
    fn test_all_zero_stack_has_blank_mean_amplitude() {
        let stack = Array3::<SarComplex>::zeros((4, 2, 2));
        let result = compute_adi(&stack).unwrap();
        assert!(result.mean_amplitude.iter().all(|&m| m == 0.0));
        assert_eq!(result.num_indeterminate(), 4);
    }

    #[test]
    fn test_empty_stack_rejected() {
        let stack = Array3::<SarComplex>::zeros((0, 2, 2));
        assert!(matches!(compute_adi(&stack), Err(SarError::InvalidParameter(_))));
    }

    #[test]
    fn test_select_points_masks_are_disjoint() {
        let adi = array![[0.05, 0.1, 0.2], [0.3, 0.29, f32::NAN], [0.5, 0.0, f32::INFINITY]];
        let masks = select_points(&adi, 0.1, 0.3);

        assert_eq!(masks.first_order, array![[true, false, false], [false, false, false], [false, true, false]]);
        assert_eq!(masks.tcs, array![[false, true, true], [false, true, false], [false, false, false]]);
        Zip::from(&masks.first_order).and(&masks.tcs).for_each(|&a, &b| assert!(!(a && b)));
        assert_eq!(masks.count_first_order(), 2);
        assert_eq!(masks.count_tcs(), 3);
        assert!(masks.contains(PixelCoord::new(0, 1)));
        assert!(!masks.contains(PixelCoord::new(2, 0)));
        assert!(!masks.contains(PixelCoord::new(5, 0)));
    }

    #[test]
    fn test_reference_pixel_selection() {
        let empty = Array2::from_elem((3, 3), false);
        assert!(matches!(select_reference_pixel(&empty), Err(SarError::EmptySelection(_))));

        let mut single = empty.clone();
        single[[2, 1]] = true;
        assert_eq!(select_reference_pixel(&single).unwrap(), PixelCoord::new(2, 1));

        let mut several = single.clone();
        several[[1, 2]] = true;
        several[[2, 0]] = true;
        assert_eq!(select_reference_pixel(&several).unwrap(), PixelCoord::new(1, 2));
        assert_eq!(
            mask_coords(&several),
            vec![PixelCoord::new(1, 2), PixelCoord::new(2, 0), PixelCoord::new(2, 1)]
        );
    }

    #[test]
    fn test_empty_mask_error_names_the_mask_not_a_class() {
        let empty = Array2::from_elem((2, 4), false);
        match select_reference_pixel(&empty) {
            Err(SarError::EmptySelection(message)) => {
                assert!(message.contains("2x4"));
                assert!(!message.contains("first-order"));
            }
            other => panic!("expected EmptySelection, got {:?}", other),
        }

        // any mask works, e.g. the TCS one
        let mut tcs = empty.clone();
        tcs[[1, 3]] = true;
        assert_eq!(select_reference_pixel(&tcs).unwrap(), PixelCoord::new(1, 3));
    }

    #[test]
    fn test_mask_coordinate_helpers() {
        let masks = StabilityMasks {
            first_order: array![[false, true], [true, false]],
            tcs: array![[false, false], [false, true]],
        };
        assert_eq!(
            masks.first_order_coords(),
            vec![PixelCoord::new(0, 1), PixelCoord::new(1, 0)]
        );
        assert_eq!(masks.tcs_coords(), vec![PixelCoord::new(1, 1)]);
        assert_eq!(masks.first_order_coords().len(), masks.count_first_order());
    }
}
