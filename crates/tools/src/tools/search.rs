//! Course content search tool.
//!
//! Delegates to the [`SearchStore`] collaborator, formats hits for the model
//! and mirrors them into the citation side-channel.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::source::{SourceRecord, SourceTracking};
use crate::store::{SearchResults, SearchStore};
use crate::tool::{Tool, ToolDefinition, ToolError};

pub const SEARCH_TOOL_NAME: &str = "search_course_content";

/// Searches course materials with course name and lesson filtering.
///
/// One query in flight per instance: `last_sources` is single-writer by
/// design, the lock only guards against sharing across threads.
pub struct CourseSearchTool {
    store: Arc<dyn SearchStore>,
    last_sources: Mutex<Vec<SourceRecord>>,
}

impl CourseSearchTool {
    pub fn new(store: Arc<dyn SearchStore>) -> Self {
        Self {
            store,
            last_sources: Mutex::new(Vec::new()),
        }
    }

    /// Format hits as `[<course> - Lesson <n>]` header blocks and record a
    /// parallel source per hit. The source list overwrites the previous one.
    async fn format_results(&self, results: &SearchResults) -> String {
        let mut formatted = Vec::new();
        let mut sources = Vec::new();

        for (doc, meta) in results.documents.iter().zip(&results.metadata) {
            let mut label = meta.course_title.clone();
            if let Some(number) = meta.lesson_number {
                label.push_str(&format!(" - Lesson {number}"));
            }

            let link = match meta.lesson_number {
                Some(number) if !meta.course_title.is_empty() => {
                    self.store.get_lesson_link(&meta.course_title, number).await
                }
                _ => None,
            };

            sources.push(SourceRecord {
                label: label.clone(),
                link,
            });
            formatted.push(format!("[{label}]\n{doc}"));
        }

        if let Ok(mut guard) = self.last_sources.lock() {
            *guard = sources;
        }

        formatted.join("\n\n")
    }
}

#[async_trait]
impl Tool for CourseSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: SEARCH_TOOL_NAME.to_string(),
            description:
                "Search course materials with smart course name matching and lesson filtering"
                    .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search for in the course content"
                    },
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    },
                    "lesson_number": {
                        "type": "integer",
                        "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&self, input: Value) -> Result<String, ToolError> {
        let query = input
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidInput("missing 'query' field".to_string()))?;
        let course_name = input.get("course_name").and_then(|v| v.as_str());
        let lesson_number = input
            .get("lesson_number")
            .and_then(|v| v.as_u64())
            .map(|n| n as u32);

        debug!(query, course = course_name, lesson = lesson_number, "executing course search");

        let mut results = self.store.search(query, course_name, lesson_number).await;

        // Collaborator errors are recoverable: the model reads them as text.
        if let Some(error) = results.error.take() {
            return Ok(error);
        }

        if results.is_empty() {
            let mut filter_info = String::new();
            if let Some(course) = course_name {
                filter_info.push_str(&format!(" in course '{course}'"));
            }
            if let Some(number) = lesson_number {
                filter_info.push_str(&format!(" in lesson {number}"));
            }
            return Ok(format!("No relevant content found{filter_info}."));
        }

        Ok(self.format_results(&results).await)
    }

    fn source_tracking(&self) -> Option<&dyn SourceTracking> {
        Some(self)
    }
}

impl SourceTracking for CourseSearchTool {
    fn last_sources(&self) -> Vec<SourceRecord> {
        self.last_sources
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn reset_sources(&self) {
        if let Ok(mut guard) = self.last_sources.lock() {
            guard.clear();
        }
    }
}
