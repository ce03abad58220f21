// Annotation module
// Uniform annotation records, per-format parsers, and file-to-annotation binding

pub mod binder;
pub mod formats;
pub mod types;

pub use binder::bind;
pub use formats::{parse_batch, parse_per_file, scheme_for, AnnotError, AnnotScheme};
pub use types::{Annotation, Segment};
