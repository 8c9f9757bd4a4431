//! Python bindings over numpy arrays

use crate::types::{PixelCoord, SarError};
use numpy::{
    Complex32, IntoPyArray, PyArray1, PyArray2, PyArray3, PyReadonlyArray1, PyReadonlyArray2,
    PyReadonlyArray3,
};
use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

impl From<SarError> for PyErr {
    fn from(err: SarError) -> PyErr {
        match err {
            SarError::MissingData { .. } => PyKeyError::new_err(err.to_string()),
            SarError::EmptySelection(_) | SarError::InvalidParameter(_) => {
                PyValueError::new_err(err.to_string())
            }
            other => PyRuntimeError::new_err(other.to_string()),
        }
    }
}

#[cfg(feature = "hdf5")]
type StackTuple<'py> = (
    &'py PyArray3<Complex32>,
    &'py PyArray1<f64>,
    &'py PyArray1<f64>,
    &'py PyArray2<f64>,
    &'py PyArray2<f64>,
);

/// Load (slc, tbase, pbase, incidence_angle, slant_range) from the two HDF5 files
#[cfg(feature = "hdf5")]
#[pyfunction]
fn load_slc_stack<'py>(py: Python<'py>, stack_path: &str, geometry_path: &str) -> PyResult<StackTuple<'py>> {
    let data = crate::io::load_slc_stack(stack_path, geometry_path)?;
    Ok((
        data.slc.into_pyarray(py),
        data.tbase.into_pyarray(py),
        data.pbase.into_pyarray(py),
        data.incidence_angle.into_pyarray(py),
        data.slant_range.into_pyarray(py),
    ))
}

/// Returns (adi, mean_amplitude)
#[pyfunction]
fn compute_adi<'py>(
    py: Python<'py>,
    slc_stack: PyReadonlyArray3<'py, Complex32>,
) -> PyResult<(&'py PyArray2<f32>, &'py PyArray2<f32>)> {
    let result = crate::core::compute_adi(&slc_stack.as_array().to_owned())?;
    Ok((result.adi.into_pyarray(py), result.mean_amplitude.into_pyarray(py)))
}

/// Returns (first_order_mask, tcs_mask)
#[pyfunction]
fn select_points<'py>(
    py: Python<'py>,
    adi: PyReadonlyArray2<'py, f32>,
    thr_ps: f32,
    thr_tcs: f32,
) -> (&'py PyArray2<bool>, &'py PyArray2<bool>) {
    let masks = crate::core::select_points(&adi.as_array().to_owned(), thr_ps, thr_tcs);
    (masks.first_order.into_pyarray(py), masks.tcs.into_pyarray(py))
}

/// Returns (row, col) of the first selected pixel
#[pyfunction]
fn select_reference_pixel(mask: PyReadonlyArray2<'_, bool>) -> PyResult<(usize, usize)> {
    let PixelCoord { row, col } = crate::core::select_reference_pixel(&mask.as_array().to_owned())?;
    Ok((row, col))
}

#[pyfunction]
fn compute_arc_phase<'py>(
    py: Python<'py>,
    slc_stack: PyReadonlyArray3<'py, Complex32>,
    ref_row: usize,
    ref_col: usize,
) -> PyResult<&'py PyArray3<f64>> {
    let phases = crate::core::compute_arc_phase(&slc_stack.as_array().to_owned(), ref_row, ref_col)?;
    Ok(phases.into_pyarray(py))
}

#[pyfunction]
#[pyo3(signature = (data, cutoff, fs, order = 5))]
fn butter_lowpass_filter<'py>(
    py: Python<'py>,
    data: PyReadonlyArray1<'py, f64>,
    cutoff: f64,
    fs: f64,
    order: usize,
) -> PyResult<&'py PyArray1<f64>> {
    let smoothed = crate::core::butter_lowpass_filter(&data.as_array().to_owned(), cutoff, fs, order)?;
    Ok(smoothed.into_pyarray(py))
}

#[pyfunction]
fn sav_golay_smooth<'py>(
    py: Python<'py>,
    arc_phase: PyReadonlyArray1<'py, f64>,
    window_length: usize,
    polyorder: usize,
) -> &'py PyArray1<f64> {
    crate::core::sav_golay_smooth(&arc_phase.as_array().to_owned(), window_length, polyorder).into_pyarray(py)
}

/// Python module definition
#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    #[cfg(feature = "hdf5")]
    m.add_function(wrap_pyfunction!(load_slc_stack, m)?)?;
    m.add_function(wrap_pyfunction!(compute_adi, m)?)?;
    m.add_function(wrap_pyfunction!(select_points, m)?)?;
    m.add_function(wrap_pyfunction!(select_reference_pixel, m)?)?;
    m.add_function(wrap_pyfunction!(compute_arc_phase, m)?)?;
    m.add_function(wrap_pyfunction!(butter_lowpass_filter, m)?)?;
    m.add_function(wrap_pyfunction!(sav_golay_smooth, m)?)?;
    Ok(())
}
