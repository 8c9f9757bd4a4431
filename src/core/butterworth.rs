//! Butterworth low-pass smoothing of phase time series
//!
//! The filter is designed as a single transfer function `(b, a)` from the
//! analog Butterworth prototype by prewarping and the bilinear transform.
//! Long series are filtered forward and backward (zero phase) with odd
//! reflection padding; shorter ones get a single causal pass; series no longer
//! than the filter order are returned unchanged.

use crate::core::smoothing::{FilterMode, PhaseSmoother, SmoothedSeries};
use crate::types::{SarError, SarResult};
use ndarray::Array1;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Minimum series length for zero-phase filtering, whatever the order
const MIN_ZERO_PHASE_LEN: usize = 15;

/// Butterworth smoothing parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ButterworthParams {
    /// Cutoff frequency, same unit as `fs`
    pub cutoff: f64,
    /// Sampling frequency of the series
    pub fs: f64,
    /// Filter order
    pub order: usize,
}

impl Default for ButterworthParams {
    fn default() -> Self {
        Self {
            cutoff: 0.1,
            fs: 1.0,
            order: 5,
        }
    }
}

/// Digital Butterworth low-pass filter in transfer function form
#[derive(Debug, Clone)]
pub struct ButterworthLowpass {
    order: usize,
    normal_cutoff: f64,
    /// Numerator coefficients, highest power first
    b: Vec<f64>,
    /// Denominator coefficients, `a[0] == 1`
    a: Vec<f64>,
}

impl ButterworthLowpass {
    /// Design a low-pass filter with `cutoff` given in the unit of `fs`
    pub fn new(cutoff: f64, fs: f64, order: usize) -> SarResult<Self> {
        let nyquist = 0.5 * fs;
        let normal_cutoff = cutoff / nyquist;

        if order == 0 {
            return Err(SarError::InvalidParameter(
                "Butterworth order must be at least 1".to_string(),
            ));
        }
        if !(normal_cutoff > 0.0 && normal_cutoff < 1.0) {
            return Err(SarError::InvalidParameter(format!(
                "Butterworth cutoff {} must lie strictly between 0 and the Nyquist frequency {}",
                cutoff, nyquist
            )));
        }

        let (b, a) = design_lowpass(order, normal_cutoff);
        log::debug!(
            "Designed order {} Butterworth low-pass, normalized cutoff {:.4}: b={:?} a={:?}",
            order,
            normal_cutoff,
            b,
            a
        );

        Ok(Self {
            order,
            normal_cutoff,
            b,
            a,
        })
    }

    pub fn from_params(params: &ButterworthParams) -> SarResult<Self> {
        Self::new(params.cutoff, params.fs, params.order)
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Cutoff as a fraction of the Nyquist frequency
    pub fn normal_cutoff(&self) -> f64 {
        self.normal_cutoff
    }

    pub fn numerator(&self) -> &[f64] {
        &self.b
    }

    pub fn denominator(&self) -> &[f64] {
        &self.a
    }

    /// Shortest series that is filtered forward and backward
    pub fn zero_phase_min_len(&self) -> usize {
        (3 * self.order).max(MIN_ZERO_PHASE_LEN)
    }

    /// Smooth a series, choosing zero-phase, causal or no filtering by its length
    pub fn filter(&self, data: &Array1<f64>) -> SmoothedSeries {
        let n = data.len();
        let samples: Vec<f64> = data.iter().copied().collect();

        if n >= self.zero_phase_min_len() {
            SmoothedSeries {
                data: Array1::from_vec(self.filtfilt(&samples)),
                mode: FilterMode::ZeroPhase,
            }
        } else if n > self.order {
            log::debug!(
                "Series of {} samples is too short for zero-phase filtering, using a causal pass",
                n
            );
            let zero_state = vec![0.0; self.a.len() - 1];
            SmoothedSeries {
                data: Array1::from_vec(self.lfilter(&samples, &zero_state)),
                mode: FilterMode::Causal,
            }
        } else {
            log::warn!(
                "Skipping Butterworth filter (data too short: {} samples for order {})",
                n,
                self.order
            );
            SmoothedSeries::unchanged(data)
        }
    }

    /// Direct form II transposed filtering with initial state `zi`
    fn lfilter(&self, x: &[f64], zi: &[f64]) -> Vec<f64> {
        let taps = self.a.len();
        let mut state = zi.to_vec();
        let mut y = Vec::with_capacity(x.len());

        for &sample in x {
            let out = self.b[0] * sample + state[0];
            for k in 1..taps {
                let carry = if k < taps - 1 { state[k] } else { 0.0 };
                state[k - 1] = self.b[k] * sample - self.a[k] * out + carry;
            }
            y.push(out);
        }

        y
    }

    /// Filter state matching the steady-state response to a unit step
    fn step_initial_state(&self) -> Vec<f64> {
        let dc_gain = self.b.iter().sum::<f64>() / self.a.iter().sum::<f64>();
        (0..self.a.len() - 1)
            .map(|i| {
                (i + 1..self.a.len())
                    .map(|j| self.b[j] - self.a[j] * dc_gain)
                    .sum()
            })
            .collect()
    }

    /// Zero-phase forward-backward filtering with odd extension at both ends
    fn filtfilt(&self, x: &[f64]) -> Vec<f64> {
        let n = x.len();
        let edge = (3 * self.a.len().max(self.b.len())).min(n.saturating_sub(1));
        let extended = odd_extension(x, edge);
        let zi = self.step_initial_state();

        let x0 = extended[0];
        let forward_state: Vec<f64> = zi.iter().map(|z| z * x0).collect();
        let mut y = self.lfilter(&extended, &forward_state);

        let y0 = y[y.len() - 1];
        y.reverse();
        let backward_state: Vec<f64> = zi.iter().map(|z| z * y0).collect();
        let mut y = self.lfilter(&y, &backward_state);
        y.reverse();

        y[edge..edge + n].to_vec()
    }
}

impl PhaseSmoother for ButterworthLowpass {
    fn name(&self) -> &'static str {
        "Butterworth"
    }

    fn smooth(&self, series: &Array1<f64>) -> SmoothedSeries {
        self.filter(series)
    }
}

/// Smooth a phase series with an order-`order` Butterworth low-pass filter
///
/// # Arguments
/// * `cutoff` - cutoff frequency, same unit as `fs`
/// * `fs` - sampling frequency of the series
/// * `order` - filter order (5 in the usual setup)
pub fn butter_lowpass_filter(
    data: &Array1<f64>,
    cutoff: f64,
    fs: f64,
    order: usize,
) -> SarResult<Array1<f64>> {
    let filter = ButterworthLowpass::new(cutoff, fs, order)?;
    Ok(filter.filter(data).data)
}

/// Reflect `edge` samples about each end point: `2*x[0] - x[edge..0]`, `2*x[n-1] - x[n-2..]`
fn odd_extension(x: &[f64], edge: usize) -> Vec<f64> {
    let n = x.len();
    if edge == 0 || n == 0 {
        return x.to_vec();
    }

    let first = x[0];
    let last = x[n - 1];
    let mut extended = Vec::with_capacity(n + 2 * edge);
    extended.extend((1..=edge).rev().map(|i| 2.0 * first - x[i]));
    extended.extend_from_slice(x);
    extended.extend((n - 1 - edge..n - 1).rev().map(|i| 2.0 * last - x[i]));
    extended
}

/// Transfer function of a digital Butterworth low-pass with cutoff `wn` (fraction of Nyquist)
fn design_lowpass(order: usize, wn: f64) -> (Vec<f64>, Vec<f64>) {
    // bilinear transform constant for a normalized sample rate of 2
    let fs2 = 4.0;
    let warped = fs2 * (PI * wn / 2.0).tan();

    let analog_poles = butterworth_poles(order)
        .into_iter()
        .map(|p| p * warped)
        .collect::<Vec<_>>();

    let digital_poles: Vec<Complex64> = analog_poles
        .iter()
        .map(|&p| (fs2 + p) / (fs2 - p))
        .collect();

    let denominator_at_fs2 = analog_poles
        .iter()
        .fold(Complex64::new(1.0, 0.0), |acc, &p| acc * (fs2 - p));
    let gain = warped.powi(order as i32) * (Complex64::new(1.0, 0.0) / denominator_at_fs2).re;

    // all zeros at z = -1
    let b = binomial_row(order).into_iter().map(|c| c * gain).collect();
    let a = poly_from_roots(&digital_poles)
        .into_iter()
        .map(|c| c.re)
        .collect();

    (b, a)
}

/// Left half-plane poles of the normalized analog Butterworth prototype
fn butterworth_poles(order: usize) -> Vec<Complex64> {
    (0..order)
        .map(|k| {
            let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
            Complex64::new(theta.cos(), theta.sin())
        })
        .collect()
}

/// Monic polynomial coefficients (highest power first) with the given roots
fn poly_from_roots(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for &root in roots {
        let mut next = vec![Complex64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * root;
        }
        coeffs = next;
    }
    coeffs
}

/// Coefficients of (z + 1)^n
fn binomial_row(n: usize) -> Vec<f64> {
    let mut row = vec![1.0];
    for _ in 0..n {
        let mut next = vec![1.0; row.len() + 1];
        for i in 1..row.len() {
            next[i] = row[i - 1] + row[i];
        }
        row = next;
    }
    row
}
