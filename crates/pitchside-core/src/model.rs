use std::fmt;
use std::str::FromStr;

/// Where a model runs. Only used for labelling; dispatch happens server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Anthropic,
    Ollama,
}

impl Provider {
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Anthropic => "Anthropic",
            Provider::Ollama => "Ollama (Local)",
        }
    }
}

/// The closed set of model identifiers the backend recognizes.
///
/// The identifier is passed through to the backend as an opaque string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelId {
    Gpt4,
    #[default]
    Gpt35Turbo,
    Claude3Sonnet,
    Claude3Opus,
    Llama2,
}

impl ModelId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Gpt4 => "gpt-4",
            ModelId::Gpt35Turbo => "gpt-3.5-turbo",
            ModelId::Claude3Sonnet => "claude-3-sonnet",
            ModelId::Claude3Opus => "claude-3-opus",
            ModelId::Llama2 => "llama2",
        }
    }

    pub fn all() -> Vec<ModelId> {
        vec![
            ModelId::Gpt4,
            ModelId::Gpt35Turbo,
            ModelId::Claude3Sonnet,
            ModelId::Claude3Opus,
            ModelId::Llama2,
        ]
    }

    pub fn provider(&self) -> Provider {
        match self {
            ModelId::Gpt4 | ModelId::Gpt35Turbo => Provider::OpenAI,
            ModelId::Claude3Sonnet | ModelId::Claude3Opus => Provider::Anthropic,
            ModelId::Llama2 => Provider::Ollama,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelId::Gpt4 => "GPT-4",
            ModelId::Gpt35Turbo => "GPT-3.5 Turbo",
            ModelId::Claude3Sonnet => "Claude 3 Sonnet",
            ModelId::Claude3Opus => "Claude 3 Opus",
            ModelId::Llama2 => "Llama 2",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ModelId::all()
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| {
                let available: Vec<&str> = ModelId::all().iter().map(|m| m.as_str()).collect();
                format!(
                    "Model {} not supported. Available models: {}",
                    s,
                    available.join(", ")
                )
            })
    }
}
