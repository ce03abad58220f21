// Labelset filtering
// All-or-nothing retention of candidates against a set of permitted labels

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::annot::Annotation;

/// A discovered file paired with its bound annotation, before any record
/// is built from it.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub path: PathBuf,
    pub annotation: Option<Annotation>,
}

/// Keep only candidates whose annotations use permitted labels, preserving
/// order.
///
/// A candidate with any label outside `labelset` is dropped whole; there is
/// no partial-segment filtering. Candidates without an annotation are never
/// filtered. `labelset = None` keeps everything.
pub fn retain_labelset(
    candidates: Vec<Candidate>,
    labelset: Option<&BTreeSet<String>>,
) -> Vec<Candidate> {
    let labelset = match labelset {
        Some(labelset) => labelset,
        None => return candidates,
    };

    candidates
        .into_iter()
        .filter(|candidate| {
            let annotation = match &candidate.annotation {
                Some(annotation) => annotation,
                None => return true,
            };

            let unknown: Vec<&str> = annotation
                .labels()
                .filter(|label| !labelset.contains(*label))
                .collect();

            if unknown.is_empty() {
                true
            } else {
                log::warn!(
                    "dropping {}: labels not in labelset: {}",
                    candidate.path.display(),
                    unknown.join(", ")
                );
                false
            }
        })
        .collect()
}
