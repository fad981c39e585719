pub mod search;

pub use search::{CourseSearchTool, SEARCH_TOOL_NAME};
