pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod match_query;
pub mod model;
pub mod state;

// Re-export main types for convenience
pub use api::{ChatBackend, ChatClient, ChatRequest, ChatResponse, MatchPrediction};
pub use config::{ClientConfig, Config, Overrides};
pub use controller::{ChatController, SessionState, FALLBACK_MESSAGE, GENERIC_ERROR_MESSAGE};
pub use error::{ClientError, SubmitError};
pub use match_query::MatchQuery;
pub use model::{ModelId, Provider};
pub use state::{ChatMessage, ChatRole};
