pub mod claude;

pub use claude::ClaudeProvider;
