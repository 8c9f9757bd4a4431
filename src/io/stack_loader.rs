use crate::io::container::DataContainer;
use crate::types::{SarError, SarResult, StackData};
use chrono::NaiveDate;
use ndarray::Array1;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Days per year used to express temporal baselines in years
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Dataset names inside the stack and geometry containers
///
/// Defaults follow the layout written by the upstream stack preparation tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackFieldNames {
    pub slc: String,
    pub date: String,
    pub bperp: String,
    pub incidence_angle: String,
    pub slant_range: String,
}

impl Default for StackFieldNames {
    fn default() -> Self {
        Self {
            slc: "slc".to_string(),
            date: "date".to_string(),
            bperp: "bperp".to_string(),
            incidence_angle: "incidenceAngle".to_string(),
            slant_range: "slantRangeDistance".to_string(),
        }
    }
}

/// Load the SLC stack and geometry from two HDF5 files
///
/// # Arguments
/// * `stack_path` - file holding `slc`, `date` and `bperp`
/// * `geometry_path` - file holding `incidenceAngle` (degrees) and `slantRangeDistance`
#[cfg(feature = "hdf5")]
pub fn load_slc_stack<P, Q>(stack_path: P, geometry_path: Q) -> SarResult<StackData>
where
    P: AsRef<std::path::Path>,
    Q: AsRef<std::path::Path>,
{
    load_slc_stack_with_fields(stack_path, geometry_path, &StackFieldNames::default())
}

/// Load the SLC stack and geometry from two HDF5 files with custom dataset names
#[cfg(feature = "hdf5")]
pub fn load_slc_stack_with_fields<P, Q>(
    stack_path: P,
    geometry_path: Q,
    fields: &StackFieldNames,
) -> SarResult<StackData>
where
    P: AsRef<std::path::Path>,
    Q: AsRef<std::path::Path>,
{
    use crate::io::hdf5_container::Hdf5Container;

    let stack = Hdf5Container::open(stack_path)?;
    let geometry = Hdf5Container::open(geometry_path)?;
    load_from_containers(&stack, &geometry, fields)
}

/// Load from any pair of containers using the given dataset names
pub fn load_from_containers(
    stack: &dyn DataContainer,
    geometry: &dyn DataContainer,
    fields: &StackFieldNames,
) -> SarResult<StackData> {
    stack.require_fields(&[fields.slc.as_str(), fields.date.as_str(), fields.bperp.as_str()])?;

    let slc = stack.read_complex_3d(&fields.slc)?;
    let dates = stack.read_strings(&fields.date)?;
    let tbase = temporal_baselines(&dates)?;
    let pbase = stack.read_real_1d(&fields.bperp)?;

    geometry.require_fields(&[fields.incidence_angle.as_str(), fields.slant_range.as_str()])?;

    let incidence_angle = geometry
        .read_real_2d(&fields.incidence_angle)?
        .mapv(f64::to_radians);
    let slant_range = geometry.read_real_2d(&fields.slant_range)?;

    let (num_acq, rows, cols) = slc.dim();
    if tbase.len() != num_acq || pbase.len() != num_acq {
        return Err(SarError::InvalidFormat(format!(
            "Stack has {} acquisitions but {} dates and {} perpendicular baselines",
            num_acq,
            tbase.len(),
            pbase.len()
        )));
    }
    if incidence_angle.dim() != (rows, cols) || slant_range.dim() != (rows, cols) {
        return Err(SarError::InvalidFormat(format!(
            "Geometry grids {:?}/{:?} do not match stack image size {:?}",
            incidence_angle.dim(),
            slant_range.dim(),
            (rows, cols)
        )));
    }

    log::info!("SLC stack loaded successfully");
    log::info!(
        "SLC shape: {:?}, temporal baselines: {}, perpendicular baselines: {}",
        slc.dim(),
        tbase.len(),
        pbase.len()
    );

    Ok(StackData {
        slc,
        tbase,
        pbase,
        incidence_angle,
        slant_range,
    })
}

/// Parse `YYYYMMDD` acquisition dates
pub fn parse_acquisition_dates(dates: &[String]) -> SarResult<Vec<NaiveDate>> {
    let pattern = Regex::new(r"^\d{8}$")
        .map_err(|e| SarError::Processing(format!("Invalid date pattern: {}", e)))?;

    dates
        .iter()
        .map(|raw| {
            let token = raw.trim();
            if !pattern.is_match(token) {
                return Err(SarError::InvalidFormat(format!(
                    "Acquisition date '{}' is not an 8-digit YYYYMMDD value",
                    raw
                )));
            }
            NaiveDate::parse_from_str(token, "%Y%m%d").map_err(|e| {
                SarError::InvalidFormat(format!("Invalid acquisition date '{}': {}", raw, e))
            })
        })
        .collect()
}

/// Elapsed years of each acquisition relative to the first one
pub fn temporal_baselines(dates: &[String]) -> SarResult<Array1<f64>> {
    let parsed = parse_acquisition_dates(dates)?;
    let first = match parsed.first() {
        Some(first) => *first,
        None => return Ok(Array1::zeros(0)),
    };

    Ok(parsed
        .iter()
        .map(|date| (*date - first).num_days() as f64 / DAYS_PER_YEAR)
        .collect())
}
