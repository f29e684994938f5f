pub mod client;
pub mod wire;

use async_trait::async_trait;

pub use client::ChatClient;
pub use wire::{ChatRequest, ChatResponse, MatchPrediction};

use crate::error::ClientError;

/// Anything that can answer a chat request: the HTTP backend, or a stub in
/// tests.
#[async_trait]
pub trait ChatBackend: Send + Sync + 'static {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError>;
}
