use crate::id::ElementId;

pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised at the document model's entry boundaries.
///
/// Expected runtime conditions (missing IDs, unchanged values, stale asset
/// completions) are internal no-ops, not errors — only malformed input
/// crossing the persistence boundary surfaces here.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("malformed project data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate element id `{0}`")]
    DuplicateId(ElementId),

    #[error("non-finite transform on element `{0}`")]
    NonFiniteTransform(ElementId),
}
