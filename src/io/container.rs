use crate::types::{SarComplex, SarError, SarResult};
use ndarray::{Array1, Array2, Array3};
use std::collections::BTreeMap;

/// Keyed, self-describing data container (an HDF5 file or an in-memory equivalent)
///
/// The loader only needs named-field lookup, so this is the whole surface.
pub trait DataContainer {
    /// Human readable name used in error messages, usually the file path
    fn name(&self) -> String;

    /// Names of the top-level fields present in the container
    fn field_names(&self) -> SarResult<Vec<String>>;

    fn read_complex_3d(&self, field: &str) -> SarResult<Array3<SarComplex>>;

    fn read_strings(&self, field: &str) -> SarResult<Vec<String>>;

    fn read_real_1d(&self, field: &str) -> SarResult<Array1<f64>>;

    fn read_real_2d(&self, field: &str) -> SarResult<Array2<f64>>;

    /// Fail with [`SarError::MissingData`] unless every field in `required` is present
    fn require_fields(&self, required: &[&str]) -> SarResult<()> {
        let available = self.field_names()?;
        log::debug!("Available datasets in {}: {:?}", self.name(), available);

        let missing: Vec<String> = required
            .iter()
            .filter(|field| !available.iter().any(|name| name == *field))
            .map(|field| field.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SarError::MissingData {
                container: self.name(),
                missing,
                available,
            })
        }
    }
}

/// A single field held by a [`MemoryContainer`]
#[derive(Debug, Clone)]
pub enum FieldValue {
    Complex3(Array3<SarComplex>),
    Strings(Vec<String>),
    Real1(Array1<f64>),
    Real2(Array2<f64>),
}

impl FieldValue {
    fn kind(&self) -> &'static str {
        match self {
            FieldValue::Complex3(_) => "complex 3-D array",
            FieldValue::Strings(_) => "string list",
            FieldValue::Real1(_) => "real 1-D array",
            FieldValue::Real2(_) => "real 2-D array",
        }
    }
}

/// In-memory container, for callers that already hold the arrays
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    name: String,
    fields: BTreeMap<String, FieldValue>,
}

impl MemoryContainer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style insert
    pub fn with_field(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    fn get(&self, field: &str) -> SarResult<&FieldValue> {
        self.fields.get(field).ok_or_else(|| SarError::MissingData {
            container: self.name.clone(),
            missing: vec![field.to_string()],
            available: self.fields.keys().cloned().collect(),
        })
    }

    fn type_mismatch(&self, field: &str, expected: &str, found: &FieldValue) -> SarError {
        SarError::InvalidFormat(format!(
            "Dataset '{}' in {} is a {}, expected a {}",
            field,
            self.name,
            found.kind(),
            expected
        ))
    }
}

impl DataContainer for MemoryContainer {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn field_names(&self) -> SarResult<Vec<String>> {
        Ok(self.fields.keys().cloned().collect())
    }

    fn read_complex_3d(&self, field: &str) -> SarResult<Array3<SarComplex>> {
        match self.get(field)? {
            FieldValue::Complex3(data) => Ok(data.clone()),
            other => Err(self.type_mismatch(field, "complex 3-D array", other)),
        }
    }

    fn read_strings(&self, field: &str) -> SarResult<Vec<String>> {
        match self.get(field)? {
            FieldValue::Strings(data) => Ok(data.clone()),
            other => Err(self.type_mismatch(field, "string list", other)),
        }
    }

    fn read_real_1d(&self, field: &str) -> SarResult<Array1<f64>> {
        match self.get(field)? {
            FieldValue::Real1(data) => Ok(data.clone()),
            other => Err(self.type_mismatch(field, "real 1-D array", other)),
        }
    }

    fn read_real_2d(&self, field: &str) -> SarResult<Array2<f64>> {
        match self.get(field)? {
            FieldValue::Real2(data) => Ok(data.clone()),
            other => Err(self.type_mismatch(field, "real 2-D array", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_require_fields_reports_missing_and_available() {
        let container = MemoryContainer::new("geometry.h5")
            .with_field("incidenceAngle", FieldValue::Real2(Array2::zeros((2, 2))));

        let err = container
            .require_fields(&["incidenceAngle", "slantRangeDistance"])
            .unwrap_err();

        match err {
            SarError::MissingData { container, missing, available } => {
                assert_eq!(container, "geometry.h5");
                assert_eq!(missing, vec!["slantRangeDistance".to_string()]);
                assert_eq!(available, vec!["incidenceAngle".to_string()]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_type_mismatch_is_invalid_format() {
        let container = MemoryContainer::new("stack")
            .with_field("bperp", FieldValue::Real1(array![1.0, 2.0]));

        assert!(container.read_real_1d("bperp").is_ok());
        assert!(matches!(
            container.read_strings("bperp"),
            Err(SarError::InvalidFormat(_))
        ));
    }
}
