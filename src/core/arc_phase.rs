//! Arc phase computation relative to a reference pixel
//!
//! Every pixel's time series is divided by the reference pixel's series in the
//! complex domain, the phase of the quotient is taken, and the result is
//! unwrapped along the acquisition axis. Each pixel is unwrapped on its own, so
//! the difference of two unwrapped series (an arc) is not guaranteed to be free
//! of 2π steps.

use crate::types::{PixelCoord, SarError, SarResult, SlcStack};
use ndarray::{s, Array1, Array3, ArrayViewMut1, Axis, Zip};
use num_complex::Complex64;
use num_traits::{Float, FloatConst};

/// Unwrap a phase series in place
///
/// Steps larger than π are brought back into [-π, π] by adding multiples of 2π
/// to every following sample. A step of exactly π is left alone.
///
/// A NaN sample stays NaN and does not poison the rest of the series: the
/// steps into and out of it are never corrected, so later samples keep the
/// correction accumulated before the gap, and a wrap across the gap survives.
/// NaN only shows up where the reference pixel has zero-valued samples.
pub fn unwrap_in_place<F: Float + FloatConst>(mut series: ArrayViewMut1<F>) {
    let pi = F::PI();
    let two_pi = pi + pi;

    if series.is_empty() {
        return;
    }
    let mut correction = F::zero();
    let mut previous = series[0];

    for value in series.iter_mut().skip(1) {
        let raw = *value;
        let step = raw - previous;

        let mut wrapped = floor_mod(step + pi, two_pi) - pi;
        if wrapped == -pi && step > F::zero() {
            wrapped = pi;
        }
        if step.abs() >= pi {
            correction = correction + (wrapped - step);
        }

        previous = raw;
        *value = raw + correction;
    }
}

/// Unwrapped copy of a 1-D phase series
pub fn unwrap_phase(series: &Array1<f64>) -> Array1<f64> {
    let mut unwrapped = series.clone();
    unwrap_in_place(unwrapped.view_mut());
    unwrapped
}

/// Modulo with the sign of the divisor
fn floor_mod<F: Float>(x: F, m: F) -> F {
    let r = x % m;
    if r < F::zero() {
        r + m
    } else {
        r
    }
}

/// Compute unwrapped arc phases of every pixel relative to the reference pixel
///
/// # Returns
/// * Phase volume with the stack's (acquisition, row, column) shape
pub fn compute_arc_phase(stack: &SlcStack, ref_row: usize, ref_col: usize) -> SarResult<Array3<f64>> {
    let (num_acq, rows, cols) = stack.dim();
    let reference_pixel = PixelCoord::new(ref_row, ref_col);
    if !reference_pixel.within((rows, cols)) {
        return Err(SarError::InvalidParameter(format!(
            "Reference pixel {} is outside the {}x{} image",
            reference_pixel, rows, cols
        )));
    }

    log::info!(
        "Computing arc phases for {} acquisitions relative to reference pixel {}",
        num_acq,
        reference_pixel
    );

    let reference: Vec<Complex64> = stack
        .slice(s![.., ref_row, ref_col])
        .iter()
        .map(|z| Complex64::new(z.re as f64, z.im as f64))
        .collect();

    if reference.iter().any(|z| z.norm_sqr() == 0.0) {
        log::warn!(
            "Reference pixel {} has zero-valued samples, arc phases are undefined there",
            reference_pixel
        );
    }

    let mut phases = Array3::<f64>::zeros((num_acq, rows, cols));
    Zip::indexed(&mut phases)
        .and(stack)
        .for_each(|(t, _, _), phase, z| {
            let sample = Complex64::new(z.re as f64, z.im as f64);
            *phase = (sample / reference[t]).arg();
        });

    unwrap_lanes(&mut phases);

    log::debug!("Arc phase volume shape: {:?}", phases.dim());
    Ok(phases)
}

#[cfg(feature = "parallel")]
fn unwrap_lanes(phases: &mut Array3<f64>) {
    log::debug!("Unwrapping pixels on {} threads", rayon::current_num_threads());
    Zip::from(phases.lanes_mut(Axis(0))).par_for_each(|lane| unwrap_in_place(lane));
}

#[cfg(not(feature = "parallel"))]
fn unwrap_lanes(phases: &mut Array3<f64>) {
    Zip::from(phases.lanes_mut(Axis(0))).for_each(|lane| unwrap_in_place(lane));
}

/// Unwrapped phase series of a single pixel
pub fn pixel_phase_series(arc_phases: &Array3<f64>, pixel: PixelCoord) -> SarResult<Array1<f64>> {
    check_pixel(arc_phases, pixel)?;
    Ok(arc_phases.slice(s![.., pixel.row, pixel.col]).to_owned())
}

/// Phase of the arc between two pixels: `phase[:, a] - phase[:, b]`
///
/// The difference is not unwrapped again.
pub fn arc_phase_series(
    arc_phases: &Array3<f64>,
    a: PixelCoord,
    b: PixelCoord,
) -> SarResult<Array1<f64>> {
    check_pixel(arc_phases, a)?;
    check_pixel(arc_phases, b)?;

    Ok(&arc_phases.slice(s![.., a.row, a.col]) - &arc_phases.slice(s![.., b.row, b.col]))
}

fn check_pixel(arc_phases: &Array3<f64>, pixel: PixelCoord) -> SarResult<()> {
    let (_, rows, cols) = arc_phases.dim();
    if pixel.within((rows, cols)) {
        Ok(())
    } else {
        Err(SarError::InvalidParameter(format!(
            "Pixel {} is outside the {}x{} image",
            pixel, rows, cols
        )))
    }
}
