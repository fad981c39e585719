pub mod generator;
pub mod provider;
pub mod providers;
pub mod simulation;

pub use generator::{GenerateError, Generator, ResponseGenerator, SYSTEM_PROMPT};
pub use provider::{ChatMessage, ContentBlock, LlmError, ModelProvider, ModelResponse, StopReason};
pub use providers::claude::ClaudeProvider;
pub use simulation::SimulatedGenerator;
