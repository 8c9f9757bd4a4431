use ndarray::{Array1, Array2, Array3};
use num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Complex-valued SAR sample (I + jQ)
pub type SarComplex = Complex<f32>;

/// Real-valued amplitude or index data
pub type SarReal = f32;

/// 2D real SAR data array (row x column)
pub type SarRealImage = Array2<SarReal>;

/// Co-registered SLC stack (acquisition x row x column)
pub type SlcStack = Array3<SarComplex>;

/// Boolean pixel mask aligned with the stack's spatial grid
pub type PixelMask = Array2<bool>;

/// A single pixel position in (row, column) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelCoord {
    pub row: usize,
    pub col: usize,
}

impl PixelCoord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Whether this coordinate falls inside an image of the given (rows, cols).
    pub fn within(&self, dim: (usize, usize)) -> bool {
        self.row < dim.0 && self.col < dim.1
    }
}

impl std::fmt::Display for PixelCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for PixelCoord {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// Everything read from the stack and geometry containers for one run
#[derive(Debug, Clone)]
pub struct StackData {
    /// Complex SLC samples
    pub slc: SlcStack,
    /// Elapsed time of each acquisition since the first one, in years
    pub tbase: Array1<f64>,
    /// Perpendicular baseline per acquisition, in meters
    pub pbase: Array1<f64>,
    /// Local incidence angle in radians
    pub incidence_angle: Array2<f64>,
    /// Slant range distance in meters
    pub slant_range: Array2<f64>,
}

impl StackData {
    pub fn num_acquisitions(&self) -> usize {
        self.slc.dim().0
    }

    /// Spatial (rows, cols) of the stack
    pub fn image_dim(&self) -> (usize, usize) {
        let (_, rows, cols) = self.slc.dim();
        (rows, cols)
    }
}

/// Error types for SAR stack processing
#[derive(Debug, thiserror::Error)]
pub enum SarError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Missing required datasets {missing:?} in {container}. Available datasets: {available:?}")]
    MissingData {
        container: String,
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("Empty selection: {0}")]
    EmptySelection(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
}

/// Result type for SAR operations
pub type SarResult<T> = Result<T, SarError>;
