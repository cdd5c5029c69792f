//! AI provider adapters.

mod mock_provider;
mod openai_provider;

pub use mock_provider::{MockAiProvider, MockError};
pub use openai_provider::{OpenAiConfig, OpenAiProvider};
