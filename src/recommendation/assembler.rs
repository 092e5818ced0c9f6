use crate::recommendation::types::{ContextMetadata, Recommendation};
use crate::strategies::types::Pick;

/// Rank picks by confidence and attach the context they were scored against.
///
/// The sort is stable, so picks with equal confidence keep the order the
/// strategy emitted them in (lower-risk markets first).
pub fn assemble(context: ContextMetadata, mut picks: Vec<Pick>) -> Recommendation {
    picks.sort_by(|a, b| b.confidence().total_cmp(&a.confidence()));
    Recommendation::new(context, picks)
}
