pub mod registry;
pub mod source;
pub mod store;
pub mod tool;
pub mod tools;

pub use registry::{RegistryError, ToolExecutor, ToolRegistry};
pub use source::{SourceRecord, SourceTracking};
pub use store::{ChunkMetadata, FixtureStore, SearchResults, SearchStore};
pub use tool::{Tool, ToolCall, ToolDefinition, ToolError, ToolResult};
pub use tools::CourseSearchTool;
