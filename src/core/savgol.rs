//! Savitzky-Golay smoothing of phase time series
//!
//! Fits a least-squares polynomial of degree `polyorder` to a sliding window
//! and evaluates it at the window center. The first and last half-windows are
//! evaluated on the polynomial fitted to the first and last full window, so a
//! polynomial of degree `polyorder` passes through unchanged everywhere.

use crate::core::smoothing::{FilterMode, PhaseSmoother, SmoothedSeries};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Savitzky-Golay parameters as requested by the caller
///
/// The effective window may differ, see [`adjust_window`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SavGolParams {
    pub window_length: usize,
    pub polyorder: usize,
}

impl Default for SavGolParams {
    fn default() -> Self {
        Self {
            window_length: 11,
            polyorder: 2,
        }
    }
}

/// Savitzky-Golay smoother
#[derive(Debug, Clone)]
pub struct SavitzkyGolay {
    params: SavGolParams,
}

impl SavitzkyGolay {
    pub fn new(window_length: usize, polyorder: usize) -> Self {
        Self::with_params(SavGolParams {
            window_length,
            polyorder,
        })
    }

    pub fn with_params(params: SavGolParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SavGolParams {
        &self.params
    }

    pub fn filter(&self, data: &Array1<f64>) -> SmoothedSeries {
        let n = data.len();
        let polyorder = self.params.polyorder;

        let window = match adjust_window(self.params.window_length, polyorder, n) {
            Some(window) => window,
            None => {
                log::debug!(
                    "No valid Savitzky-Golay window for {} samples (window {}, polyorder {}), returning input",
                    n,
                    self.params.window_length,
                    polyorder
                );
                return SmoothedSeries::unchanged(data);
            }
        };

        if window != self.params.window_length {
            log::debug!(
                "Savitzky-Golay window adjusted from {} to {} for {} samples",
                self.params.window_length,
                window,
                n
            );
        }

        let fit = WindowFit::new(window, polyorder);
        let half = window / 2;
        let center_weights = fit.weights_at(0.0);

        let mut smoothed = Array1::<f64>::zeros(n);
        for i in 0..n {
            let (start, weights) = if i < half {
                (0, fit.weights_at(i as f64 - half as f64))
            } else if i + half >= n {
                let start = n - window;
                (start, fit.weights_at((i - start) as f64 - half as f64))
            } else {
                (i - half, center_weights.clone())
            };

            smoothed[i] = weights
                .iter()
                .zip(data.iter().skip(start))
                .map(|(w, x)| w * x)
                .sum();
        }

        SmoothedSeries {
            data: smoothed,
            mode: FilterMode::LocalPolynomial,
        }
    }
}

impl PhaseSmoother for SavitzkyGolay {
    fn name(&self) -> &'static str {
        "Savitzky-Golay"
    }

    fn smooth(&self, series: &Array1<f64>) -> SmoothedSeries {
        self.filter(series)
    }
}

/// Smooth a phase series with a Savitzky-Golay filter
///
/// Returns the input unchanged when no valid window fits the series.
pub fn sav_golay_smooth(data: &Array1<f64>, window_length: usize, polyorder: usize) -> Array1<f64> {
    SavitzkyGolay::new(window_length, polyorder).filter(data).data
}

/// Effective window for a series of `n` samples, or `None` if smoothing is impossible
///
/// Adjustments are applied in a fixed order:
/// 1. clamp to `n`
/// 2. raise to 3
/// 3. make odd by decrementing
/// 4. if not above `polyorder`, set to `polyorder + 1`, then to `polyorder + 2` if that is even
///
/// The result is usable only if it is at least 3 and no longer than `n`.
pub fn adjust_window(window_length: usize, polyorder: usize, n: usize) -> Option<usize> {
    let mut window = window_length.min(n);
    if window < 3 {
        window = 3;
    }
    if window % 2 == 0 {
        window -= 1;
    }
    if window <= polyorder {
        window = polyorder + 1;
        if window % 2 == 0 {
            window += 1;
        }
    }

    if window >= 3 && n >= window {
        Some(window)
    } else {
        None
    }
}

/// Least-squares polynomial fit over a window of positions `-half..=half`
struct WindowFit {
    polyorder: usize,
    /// (J^T J)^-1 J^T, shape (polyorder + 1, window)
    projection: Array2<f64>,
}

impl WindowFit {
    fn new(window: usize, polyorder: usize) -> Self {
        let half = (window / 2) as f64;
        let terms = polyorder + 1;

        let design = Array2::from_shape_fn((window, terms), |(i, k)| (i as f64 - half).powi(k as i32));
        let normal = design.t().dot(&design);
        let inverse = invert(&normal);
        let projection = inverse.dot(&design.t());

        Self {
            polyorder,
            projection,
        }
    }

    /// Weights that evaluate the fitted polynomial at offset `t` from the window center
    fn weights_at(&self, t: f64) -> Array1<f64> {
        let powers: Array1<f64> = (0..=self.polyorder).map(|k| t.powi(k as i32)).collect();
        powers.dot(&self.projection)
    }
}

/// Gauss-Jordan inverse with partial pivoting of a small symmetric positive definite matrix
fn invert(matrix: &Array2<f64>) -> Array2<f64> {
    let size = matrix.nrows();
    let mut work = matrix.clone();
    let mut inverse = Array2::<f64>::eye(size);

    for col in 0..size {
        let pivot_row = (col..size)
            .max_by(|&a, &b| work[[a, col]].abs().total_cmp(&work[[b, col]].abs()))
            .unwrap_or(col);
        if pivot_row != col {
            for k in 0..size {
                work.swap([col, k], [pivot_row, k]);
                inverse.swap([col, k], [pivot_row, k]);
            }
        }

        let pivot = work[[col, col]];
        for k in 0..size {
            work[[col, k]] /= pivot;
            inverse[[col, k]] /= pivot;
        }

        for row in 0..size {
            if row != col {
                let factor = work[[row, col]];
                if factor != 0.0 {
                    for k in 0..size {
                        work[[row, k]] -= factor * work[[col, k]];
                        inverse[[row, k]] -= factor * inverse[[col, k]];
                    }
                }
            }
        }
    }

    inverse
}
