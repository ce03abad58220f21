// Dataset module
// Discovery, filtering, assembly, and manifest persistence

pub mod assemble;
pub mod builder;
pub mod discover;
pub mod filter;
pub mod manifest;
pub mod model;

pub use assemble::{assemble, AssembleRequest, DatasetError};
pub use discover::discover;
pub use filter::{retain_labelset, Candidate};
pub use manifest::ManifestError;
pub use model::{AudioFormat, DatasetMode, SpectFormat, Vocalization, VocalizationDataset};
