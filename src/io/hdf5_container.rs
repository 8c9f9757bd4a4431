use crate::io::container::DataContainer;
use crate::types::{SarComplex, SarError, SarResult};
use hdf5::types::{FixedAscii, VarLenUnicode};
use ndarray::{Array1, Array2, Array3};
use std::path::{Path, PathBuf};

/// Compound layout h5py uses for numpy complex64
#[derive(hdf5::H5Type, Clone, Copy, Debug)]
#[repr(C)]
pub(crate) struct H5Complex {
    pub r: f32,
    pub i: f32,
}

impl From<H5Complex> for SarComplex {
    fn from(value: H5Complex) -> Self {
        SarComplex::new(value.r, value.i)
    }
}

impl From<SarComplex> for H5Complex {
    fn from(value: SarComplex) -> Self {
        H5Complex { r: value.re, i: value.im }
    }
}

/// Read-only HDF5 file container
pub struct Hdf5Container {
    path: PathBuf,
    file: hdf5::File,
}

impl Hdf5Container {
    /// Open an HDF5 file for reading
    pub fn open<P: AsRef<Path>>(path: P) -> SarResult<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(SarError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )));
        }

        log::info!("Opening HDF5 container: {}", path.display());
        let file = hdf5::File::open(&path)?;
        Ok(Self { path, file })
    }

    fn dataset_with_rank(&self, field: &str, rank: usize) -> SarResult<(hdf5::Dataset, Vec<usize>)> {
        let dataset = self.file.dataset(field)?;
        let shape = dataset.shape();
        if shape.len() != rank {
            return Err(SarError::InvalidFormat(format!(
                "Dataset '{}' in {} has shape {:?}, expected {} dimensions",
                field,
                self.path.display(),
                shape,
                rank
            )));
        }
        Ok((dataset, shape))
    }

    fn shape_error(&self, field: &str, e: ndarray::ShapeError) -> SarError {
        SarError::InvalidFormat(format!(
            "Dataset '{}' in {} could not be reshaped: {}",
            field,
            self.path.display(),
            e
        ))
    }
}

impl DataContainer for Hdf5Container {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn field_names(&self) -> SarResult<Vec<String>> {
        Ok(self.file.member_names()?)
    }

    fn read_complex_3d(&self, field: &str) -> SarResult<Array3<SarComplex>> {
        let (dataset, shape) = self.dataset_with_rank(field, 3)?;
        let raw: Vec<SarComplex> = dataset
            .read_raw::<H5Complex>()?
            .into_iter()
            .map(SarComplex::from)
            .collect();

        Array3::from_shape_vec((shape[0], shape[1], shape[2]), raw)
            .map_err(|e| self.shape_error(field, e))
    }

    fn read_strings(&self, field: &str) -> SarResult<Vec<String>> {
        let (dataset, _) = self.dataset_with_rank(field, 1)?;

        // upstream tools write fixed-width byte strings; fall back to variable length
        match dataset.read_raw::<FixedAscii<8>>() {
            Ok(values) => Ok(values.iter().map(|s| s.as_str().trim().to_string()).collect()),
            Err(fixed_err) => {
                log::debug!(
                    "Dataset '{}' is not fixed-width ASCII ({}), trying variable-length strings",
                    field,
                    fixed_err
                );
                let values = dataset.read_raw::<VarLenUnicode>()?;
                Ok(values.iter().map(|s| s.as_str().trim().to_string()).collect())
            }
        }
    }

    fn read_real_1d(&self, field: &str) -> SarResult<Array1<f64>> {
        let (dataset, _) = self.dataset_with_rank(field, 1)?;
        Ok(Array1::from_vec(dataset.read_raw::<f64>()?))
    }

    fn read_real_2d(&self, field: &str) -> SarResult<Array2<f64>> {
        let (dataset, shape) = self.dataset_with_rank(field, 2)?;
        let raw = dataset.read_raw::<f64>()?;
        Array2::from_shape_vec((shape[0], shape[1]), raw).map_err(|e| self.shape_error(field, e))
    }
}
