//! JSON bodies exchanged with the backend's `/api/chat` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictions: Option<MatchPrediction>,
}

/// Optional structured prediction some backend versions attach to a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPrediction {
    pub team: String,
    pub win_probability: f64,
    #[serde(default)]
    pub key_players: Vec<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Value,
}

#[derive(Deserialize)]
pub(crate) struct WelcomeBody {
    pub message: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            model: model.into(),
        }
    }
}

impl ChatResponse {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            predictions: None,
        }
    }

    /// Decode a success body. Only `response` is required; a malformed
    /// `predictions` object is dropped rather than failing the reply.
    pub fn from_body(body: &str) -> Result<Self, ClientError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| ClientError::Decode(e.to_string()))?;

        let response = value
            .get("response")
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::Decode("missing `response` field".to_string()))?
            .to_string();

        let predictions = value
            .get("predictions")
            .filter(|p| !p.is_null())
            .and_then(|p| serde_json::from_value(p.clone()).ok());

        Ok(Self {
            response,
            predictions,
        })
    }
}

/// Pull the human-readable `detail` out of an error body, if there is one.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(ChatRequest::new("RCB vs CSK at Chinnaswamy", "llama2")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"message": "RCB vs CSK at Chinnaswamy", "model": "llama2"})
        );
    }

    #[test]
    fn test_from_body_plain() {
        let resp = ChatResponse::from_body(r#"{"response": "Team A likely wins"}"#).unwrap();
        assert_eq!(resp, ChatResponse::new("Team A likely wins"));
    }

    #[test]
    fn test_from_body_with_prediction_and_extras() {
        let body = r#"{
            "response": "CSK edge it",
            "analysis": null,
            "predictions": {"team": "CSK", "win_probability": 0.62, "key_players": ["MS Dhoni"]},
            "confidence": 0.95
        }"#;
        let resp = ChatResponse::from_body(body).unwrap();
        let prediction = resp.predictions.unwrap();
        assert_eq!(prediction.team, "CSK");
        assert_eq!(prediction.key_players, vec!["MS Dhoni".to_string()]);
    }

    #[test]
    fn test_from_body_bad_prediction_is_dropped() {
        let resp = ChatResponse::from_body(r#"{"response": "ok", "predictions": {"team": 3}}"#).unwrap();
        assert_eq!(resp.predictions, None);
    }

    #[test]
    fn test_from_body_missing_field() {
        let err = ChatResponse::from_body(r#"{"answer": "nope"}"#).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));

        let err = ChatResponse::from_body(r#"{"response": 42}"#).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn test_from_body_not_json() {
        let err = ChatResponse::from_body("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(
            error_detail(r#"{"detail": "Internal server error"}"#),
            Some("Internal server error".to_string())
        );
        assert_eq!(error_detail("not json"), None);
        assert!(error_detail(r#"{"detail": [{"loc": ["body"]}]}"#).is_some());
    }
}
