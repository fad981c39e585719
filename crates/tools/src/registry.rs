use crate::source::SourceRecord;
use crate::tool::{Tool, ToolDefinition, ToolError};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Dispatch seam the generation orchestrator executes model-requested
/// tools through. Implemented by [`ToolRegistry`]; tests substitute their own.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute_tool(&self, name: &str, input: Value) -> Result<String, ToolError>;
}

/// Manages available tools, their definitions, and dispatch by name.
///
/// Registration order is preserved: definition listing and
/// first-with-sources resolution both follow it.
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: IndexMap::new(),
        }
    }

    /// Register a tool. Fails fast on an unnamed definition or a name
    /// that is already taken, before any registry state changes.
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<(), RegistryError> {
        let def = tool.definition();
        if def.name.is_empty() {
            return Err(RegistryError::MissingName);
        }
        if self.tools.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        debug!(tool = %def.name, "registered tool");
        self.tools.insert(def.name, Arc::new(tool));
        Ok(())
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// All tool definitions in registration order, for attaching to a model call.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name.
    ///
    /// An unregistered name is reported in-band as result text so the model
    /// can recover conversationally; it is not a process-level failure.
    /// A registered tool's own failure propagates as `Err` for the caller
    /// to substitute.
    pub async fn execute(&self, name: &str, input: Value) -> Result<String, ToolError> {
        match self.tools.get(name) {
            Some(tool) => tool.execute(input).await,
            None => Ok(format!("Tool '{name}' not found")),
        }
    }

    /// Sources from the last retrieval: the first non-empty list found,
    /// scanning tools in registration order. Only one tool is expected to
    /// hold sources per turn.
    pub fn last_sources(&self) -> Vec<SourceRecord> {
        for tool in self.tools.values() {
            if let Some(tracking) = tool.source_tracking() {
                let sources = tracking.last_sources();
                if !sources.is_empty() {
                    return sources;
                }
            }
        }
        Vec::new()
    }

    /// Clear the source state of every tool exposing the capability.
    /// Callers invoke this once per new query, before generation.
    pub fn reset_sources(&self) {
        for tool in self.tools.values() {
            if let Some(tracking) = tool.source_tracking() {
                tracking.reset_sources();
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn execute_tool(&self, name: &str, input: Value) -> Result<String, ToolError> {
        self.execute(name, input).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Tool definition is missing a name")]
    MissingName,
    #[error("Tool with name '{0}' is already registered")]
    DuplicateName(String),
}
