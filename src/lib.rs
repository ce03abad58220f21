// Vocprep - vocalization dataset preparation
// Module declarations

pub mod annot;
pub mod audio;
pub mod dataset;
pub mod prep;

pub use prep::{prep, PrepConfig, PrepError};
