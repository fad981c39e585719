use serde::{Deserialize, Serialize};

/// Citation metadata describing where retrieved content came from.
///
/// Surfaced to the caller out-of-band, never part of the model-visible
/// conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Course title, optionally suffixed with " - Lesson <n>".
    pub label: String,
    /// Deep link to the lesson, when one could be resolved.
    pub link: Option<String>,
}

/// Optional capability for tools that track sources.
///
/// A tool advertises it through [`crate::tool::Tool::source_tracking`];
/// callers query the capability explicitly instead of probing fields.
pub trait SourceTracking: Send + Sync {
    /// Sources produced by the most recent execution. Last write wins;
    /// records are not accumulated across calls.
    fn last_sources(&self) -> Vec<SourceRecord>;

    /// Clear the tracked sources. Called once per new query so stale
    /// citations never surface for queries that skip retrieval.
    fn reset_sources(&self);
}
