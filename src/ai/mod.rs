pub mod fallback;
pub mod generator;
pub mod prompt;
pub mod providers;

pub use fallback::fallback_review;
pub use generator::ReviewGenerator;
pub use providers::{CompletionProvider, CompletionRequest, OllamaProvider, OpenAIProvider};
