//! JSON boundary with the persistence collaborator.
//!
//! The Project shape in `model` is the interchange format; loading is
//! defensive: the z-index sequence is repaired from array position when
//! persisted values disagree, duplicate element IDs and non-finite
//! transforms are rejected before they can reach the engine.

use crate::error::{CoreError, CoreResult};
use crate::model::Project;
use std::collections::HashSet;

/// Parse and validate a serialized project.
pub fn load_project(json: &str) -> CoreResult<Project> {
    let mut project: Project = serde_json::from_str(json)?;

    let mut seen = HashSet::with_capacity(project.elements.len());
    for el in &project.elements {
        if !seen.insert(el.id) {
            return Err(CoreError::DuplicateId(el.id));
        }
        if !el.transform.is_finite() {
            return Err(CoreError::NonFiniteTransform(el.id));
        }
    }

    // Array position is authoritative for z-order; stored values are
    // repaired, not trusted.
    let desynced = project
        .elements
        .iter()
        .enumerate()
        .any(|(i, el)| el.z_index != i);
    if desynced {
        log::warn!("project {}: repairing z-index sequence on load", project.id);
        project.renumber_z();
    }

    Ok(project)
}

/// Serialize a project for the persistence collaborator.
pub fn save_project(project: &Project) -> CoreResult<String> {
    Ok(serde_json::to_string(project)?)
}
