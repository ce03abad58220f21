// Annotation types
// Ground-truth labeling of time segments within a recording

use serde::{Deserialize, Serialize};

/// One labeled time segment within a recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment start, seconds from the start of the recording
    pub onset_s: f64,

    /// Segment end, seconds from the start of the recording
    pub offset_s: f64,

    /// Label symbol assigned to this segment
    pub label: String,
}

/// Structured annotation for one recording: ordered segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub segments: Vec<Segment>,
}

impl Annotation {
    pub fn new(segments: Vec<Segment>) -> Self {
        Annotation { segments }
    }

    /// Iterate over the label symbols in segment order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| s.label.as_str())
    }
}
