//! Request and message types shared by every backend

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Fixed instructions
    System,
    /// Caller content
    User,
    /// Prior model output
    Assistant,
}

impl Role {
    /// Wire name used by chat-style APIs
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image payload attached to a user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    /// MIME type, e.g. `image/png`
    pub media_type: String,
    /// Base64-encoded bytes
    pub data_base64: String,
}

impl ImageAttachment {
    /// Wrap already-encoded data
    #[inline]
    #[must_use]
    pub fn new(media_type: impl Into<String>, data_base64: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            data_base64: data_base64.into(),
        }
    }

    /// Encode raw image bytes
    #[must_use]
    pub fn from_bytes(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(media_type, STANDARD.encode(bytes))
    }

    /// `data:` URL form used by OpenAI-compatible vision APIs
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data_base64)
    }
}

/// One message in the conversation sent to a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Speaker
    pub role: Role,
    /// Text content
    pub content: String,
    /// Images; only meaningful on the final user message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageAttachment>,
}

impl ChatMessage {
    /// User message without attachments
    #[inline]
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            images: Vec::new(),
        }
    }

    /// Assistant message
    #[inline]
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            images: Vec::new(),
        }
    }

    /// Attach images
    #[inline]
    #[must_use]
    pub fn with_images(mut self, images: Vec<ImageAttachment>) -> Self {
        self.images = images;
        self
    }
}

/// Sampling options for a single call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Sampling temperature
    pub temperature: f32,
    /// Model override; falls back to the provider's configured model
    pub model: Option<String>,
    /// Output token cap override
    pub max_tokens: Option<u32>,
}

impl CompletionOptions {
    /// Options with only a temperature set
    #[inline]
    #[must_use]
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature,
            model: None,
            max_tokens: None,
        }
    }

    /// Override model
    #[inline]
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self::with_temperature(0.7)
    }
}

/// Everything a provider needs for one completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System instruction
    pub system: String,
    /// Conversation, oldest first
    pub messages: Vec<ChatMessage>,
    /// Sampling options
    pub options: CompletionOptions,
}

impl CompletionRequest {
    /// Request with a single user turn
    #[must_use]
    pub fn new(system: impl Into<String>, user: impl Into<String>, options: CompletionOptions) -> Self {
        Self {
            system: system.into(),
            messages: vec![ChatMessage::user(user)],
            options,
        }
    }

    /// Attach images to the final user-role message
    ///
    /// Does nothing when there is no user message.
    #[must_use]
    pub fn with_images(mut self, images: Vec<ImageAttachment>) -> Self {
        if images.is_empty() {
            return self;
        }
        if let Some(last_user) = self
            .messages
            .iter_mut()
            .rev()
            .find(|m| m.role == Role::User)
        {
            last_user.images.extend(images);
        }
        self
    }

    /// Content of the final user message, if any
    #[must_use]
    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    /// Whether any message carries images
    #[must_use]
    pub fn has_images(&self) -> bool {
        self.messages.iter().any(|m| !m.images.is_empty())
    }
}

/// Static description of a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    /// Backend name
    pub name: String,
    /// Configured model
    pub model: String,
    /// Whether image attachments are accepted
    pub supports_vision: bool,
}
