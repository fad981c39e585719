//! Boundary to the semantic-search collaborator.
//!
//! The trait lives here (not with the vector engine) because it's defined
//! by the consumer: the retrieval tool. Production implementations wrap the
//! external vector store; [`FixtureStore`] is the network-free stand-in used
//! by the simulation path and tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Metadata carried alongside each retrieved document, parallel to
/// [`SearchResults::documents`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub course_title: String,
    pub lesson_number: Option<u32>,
}

/// Outcome of one search call: parallel document/metadata lists, or an
/// error string the retrieval tool surfaces verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    pub documents: Vec<String>,
    pub metadata: Vec<ChunkMetadata>,
    pub error: Option<String>,
}

impl SearchResults {
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Semantic search over the course corpus.
#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Search for content, optionally filtered by course title (partial
    /// match) and lesson number.
    async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> SearchResults;

    /// Resolve a deep link for a lesson, if one is known.
    async fn get_lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String>;
}

// ── Fixture store ─────────────────────────────────────────────

#[derive(Debug, Clone)]
struct FixtureChunk {
    course_title: String,
    lesson_number: Option<u32>,
    lesson_link: Option<String>,
    text: String,
}

/// In-memory [`SearchStore`] with a small canned corpus.
///
/// Matching is case-insensitive keyword overlap, not semantic, which is
/// enough to keep the demo and tests deterministic.
pub struct FixtureStore {
    chunks: Vec<FixtureChunk>,
    max_results: usize,
}

const MCP_COURSE: &str = "MCP: Build Rich-Context AI Apps with Anthropic";
const RETRIEVAL_COURSE: &str = "Advanced Retrieval for AI with Chroma";

impl FixtureStore {
    /// Store pre-loaded with the demo course corpus.
    pub fn new() -> Self {
        let mut store = Self::empty();
        let mcp_lessons = [
            (1, "introduction", "Introduction to MCP: an overview of the Model Context Protocol, setting up the development environment, and the key concepts and terminology used throughout the course."),
            (2, "basic-implementation", "Basic MCP implementation: creating your first MCP server, understanding client-server architecture, and basic communication patterns."),
            (3, "advanced-features", "Advanced features: tool integration and custom functions, resource management and optimization, error handling and debugging."),
            (4, "real-applications", "Building real applications: practical implementation examples, integration with existing systems, best practices and patterns."),
            (5, "deployment", "Deployment and scaling: production deployment strategies, performance optimization, monitoring and maintenance of MCP applications."),
        ];
        for (number, slug, text) in mcp_lessons {
            store.add_chunk(
                MCP_COURSE,
                Some(number),
                Some(format!(
                    "https://learn.deeplearning.ai/courses/mcp/lesson/{number}/{slug}"
                )),
                text,
            );
        }
        store.add_chunk(
            RETRIEVAL_COURSE,
            Some(2),
            Some("https://learn.deeplearning.ai/courses/advanced-retrieval/lesson/2".to_string()),
            "RAG (Retrieval-Augmented Generation) combines information retrieval with \
             language generation: relevant chunks are fetched from a knowledge base and \
             used to ground the generated answer.",
        );
        store.add_chunk(
            RETRIEVAL_COURSE,
            None,
            None,
            "Course overview: embeddings, the Chroma vector database, query expansion \
             and re-ranking techniques for retrieval pipelines.",
        );
        store
    }

    /// Store with no corpus; populate with [`FixtureStore::add_chunk`].
    pub fn empty() -> Self {
        Self {
            chunks: Vec::new(),
            max_results: 5,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn add_chunk(
        &mut self,
        course_title: &str,
        lesson_number: Option<u32>,
        lesson_link: Option<String>,
        text: &str,
    ) {
        self.chunks.push(FixtureChunk {
            course_title: course_title.to_string(),
            lesson_number,
            lesson_link,
            text: text.to_string(),
        });
    }

    fn matches_query(chunk: &FixtureChunk, query: &str) -> bool {
        let haystack = format!("{} {}", chunk.course_title, chunk.text).to_lowercase();
        query
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| token.len() >= 3)
            .any(|token| haystack.contains(token))
    }
}

impl Default for FixtureStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchStore for FixtureStore {
    async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> SearchResults {
        let course_filter = course_name.map(str::to_lowercase);
        let mut results = SearchResults::default();

        for chunk in &self.chunks {
            if results.documents.len() >= self.max_results {
                break;
            }
            if let Some(filter) = &course_filter {
                if !chunk.course_title.to_lowercase().contains(filter) {
                    continue;
                }
            }
            if let Some(number) = lesson_number {
                if chunk.lesson_number != Some(number) {
                    continue;
                }
            }
            if !Self::matches_query(chunk, query) {
                continue;
            }
            results.documents.push(chunk.text.clone());
            results.metadata.push(ChunkMetadata {
                course_title: chunk.course_title.clone(),
                lesson_number: chunk.lesson_number,
            });
        }

        results
    }

    async fn get_lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String> {
        self.chunks
            .iter()
            .find(|c| c.course_title == course_title && c.lesson_number == Some(lesson_number))
            .and_then(|c| c.lesson_link.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keyword_match_with_course_filter() {
        let store = FixtureStore::new();
        let results = store.search("deployment strategies", Some("MCP"), None).await;

        assert!(!results.is_empty());
        assert!(results.metadata.iter().all(|m| m.course_title == MCP_COURSE));
        assert!(results.documents[0].contains("Deployment and scaling"));
    }

    #[tokio::test]
    async fn test_lesson_filter() {
        let store = FixtureStore::new();
        let results = store.search("mcp", None, Some(5)).await;

        assert_eq!(results.documents.len(), 1);
        assert_eq!(results.metadata[0].lesson_number, Some(5));
    }

    #[tokio::test]
    async fn test_no_match_is_empty_not_error() {
        let store = FixtureStore::new();
        let results = store.search("quantum chromodynamics", None, None).await;
        assert!(results.is_empty());
        assert!(results.error.is_none());
    }

    #[tokio::test]
    async fn test_max_results_cap() {
        let store = FixtureStore::new().with_max_results(2);
        let results = store.search("mcp course", None, None).await;
        assert!(results.documents.len() <= 2);
    }

    #[tokio::test]
    async fn test_lesson_link_lookup() {
        let store = FixtureStore::new();
        let link = store.get_lesson_link(MCP_COURSE, 1).await;
        assert_eq!(
            link.as_deref(),
            Some("https://learn.deeplearning.ai/courses/mcp/lesson/1/introduction")
        );
        assert!(store.get_lesson_link(MCP_COURSE, 99).await.is_none());
        assert!(store.get_lesson_link(RETRIEVAL_COURSE, 7).await.is_none());
    }
}
