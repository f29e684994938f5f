//! Chat submission controller.
//!
//! Owns the transcript and session state and runs one request at a time.
//! A submission moves the controller from [`SessionState::Idle`] to
//! [`SessionState::Submitting`]; it returns to `Idle` only after exactly one
//! assistant message has been appended, whatever the outcome.

use std::sync::Arc;

use futures_util::FutureExt;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

use crate::api::{ChatBackend, ChatRequest, ChatResponse, MatchPrediction};
use crate::config::ClientConfig;
use crate::error::{ClientError, SubmitError};
use crate::model::ModelId;
use crate::state::ChatMessage;

/// Shown instead of a model reply when the backend is known to be offline.
pub const FALLBACK_MESSAGE: &str = "The match analysis server is not available right now. \
To get real predictions, start the backend locally (it listens on http://localhost:8000 by default) \
and relaunch with PITCHSIDE_SERVER_AVAILABLE=true.";

/// Shown when a request fails for any reason.
pub const GENERIC_ERROR_MESSAGE: &str =
    "Sorry, I encountered an error while analyzing that match. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Submitting,
}

type Reply = Result<ChatResponse, ClientError>;

pub struct ChatController<B: ChatBackend> {
    backend: Arc<B>,
    config: ClientConfig,
    transcript: Vec<ChatMessage>,
    state: SessionState,
    selected_model: ModelId,
    server_unavailable_shown: bool,
    latest_prediction: Option<MatchPrediction>,
    in_flight: Option<JoinHandle<Reply>>,
}

impl<B: ChatBackend> ChatController<B> {
    pub fn new(config: ClientConfig, backend: B) -> Self {
        Self::with_shared_backend(config, Arc::new(backend))
    }

    pub fn with_shared_backend(config: ClientConfig, backend: Arc<B>) -> Self {
        let selected_model = config.default_model;
        Self {
            backend,
            config,
            transcript: Vec::new(),
            state: SessionState::Idle,
            selected_model,
            server_unavailable_shown: false,
            latest_prediction: None,
            in_flight: None,
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Submitting
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn server_available(&self) -> bool {
        self.config.server_available
    }

    /// Set once a submission has been answered with the offline fallback.
    pub fn server_unavailable_shown(&self) -> bool {
        self.server_unavailable_shown
    }

    pub fn latest_prediction(&self) -> Option<&MatchPrediction> {
        self.latest_prediction.as_ref()
    }

    pub fn selected_model(&self) -> ModelId {
        self.selected_model
    }

    /// Only affects submissions made after this call.
    pub fn select_model(&mut self, model: ModelId) {
        if model != self.selected_model {
            info!(from = %self.selected_model, to = %model, "model selected");
        }
        self.selected_model = model;
    }

    /// Append `content` as a user message and start answering it.
    ///
    /// Returns immediately; the reply is appended by [`poll`](Self::poll) or
    /// [`wait`](Self::wait). Must be called inside a tokio runtime when the
    /// server is available.
    pub fn submit(&mut self, content: &str) -> Result<(), SubmitError> {
        if content.trim().is_empty() {
            return Err(SubmitError::Empty);
        }
        if self.state == SessionState::Submitting {
            return Err(SubmitError::Busy);
        }

        self.transcript.push(ChatMessage::user(content));
        self.state = SessionState::Submitting;

        if !self.config.server_available {
            info!("server unavailable, answering with fallback");
            self.server_unavailable_shown = true;
            self.finish(ChatMessage::assistant(FALLBACK_MESSAGE));
            return Ok(());
        }

        let request = ChatRequest::new(content, self.selected_model.as_str());
        let backend = Arc::clone(&self.backend);
        let limit = self.config.request_timeout;
        info!(model = %request.model, chars = content.chars().count(), "submitting chat request");

        self.in_flight = Some(tokio::spawn(async move {
            match tokio::time::timeout(limit, backend.chat(&request)).await {
                Ok(reply) => reply,
                Err(_) => Err(ClientError::Timeout(limit)),
            }
        }));

        Ok(())
    }

    /// Check the in-flight request without blocking. Returns `true` if it
    /// completed and its reply was appended.
    pub fn poll(&mut self) -> bool {
        let outcome = match self.in_flight.as_mut() {
            Some(handle) => handle.now_or_never(),
            None => return false,
        };

        match outcome {
            Some(outcome) => {
                self.in_flight = None;
                self.complete(outcome);
                true
            }
            None => false,
        }
    }

    /// Wait for the in-flight request, if any, and append its reply.
    pub async fn wait(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            let outcome = handle.await;
            self.complete(outcome);
        }
    }

    /// Start a fresh conversation. Refused while a request is in flight.
    pub fn reset(&mut self) -> Result<(), SubmitError> {
        if self.state == SessionState::Submitting {
            return Err(SubmitError::Busy);
        }
        self.transcript.clear();
        self.latest_prediction = None;
        Ok(())
    }

    fn complete(&mut self, outcome: Result<Reply, JoinError>) {
        let message = match outcome {
            Ok(Ok(reply)) => {
                info!(chars = reply.response.chars().count(), "received analysis");
                if reply.predictions.is_some() {
                    self.latest_prediction = reply.predictions;
                }
                ChatMessage::assistant(reply.response)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "chat request failed");
                ChatMessage::assistant(GENERIC_ERROR_MESSAGE)
            }
            Err(e) => {
                error!(error = %e, "chat request task did not finish");
                ChatMessage::assistant(GENERIC_ERROR_MESSAGE)
            }
        };
        self.finish(message);
    }

    fn finish(&mut self, reply: ChatMessage) {
        self.transcript.push(reply);
        self.state = SessionState::Idle;
    }
}
