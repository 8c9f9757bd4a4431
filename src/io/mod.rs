//! Input containers and the SLC stack loader

pub mod container;
#[cfg(feature = "hdf5")]
pub mod hdf5_container;
pub mod stack_loader;

pub use container::{DataContainer, FieldValue, MemoryContainer};
#[cfg(feature = "hdf5")]
pub use hdf5_container::Hdf5Container;
#[cfg(feature = "hdf5")]
pub use stack_loader::{load_slc_stack, load_slc_stack_with_fields};
pub use stack_loader::{load_from_containers, temporal_baselines, StackFieldNames};
