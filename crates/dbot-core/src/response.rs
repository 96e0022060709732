//! Typed command responses.

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Text(TextResponse),
    Image(MediaResponse),
    File(MediaResponse),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResponse {
    pub success: bool,
    pub message: String,
    /// Persist this reply so later replies continue the thread.
    pub supports_conversation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResponse {
    pub success: bool,
    pub source_url: String,
    pub caption: Option<String>,
}

impl Response {
    /// Successful text.
    pub fn text(message: impl Into<String>) -> Self {
        Self::Text(TextResponse {
            success: true,
            message: message.into(),
            supports_conversation: false,
        })
    }

    /// Failure text shown to the user.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Text(TextResponse {
            success: false,
            message: message.into(),
            supports_conversation: false,
        })
    }

    pub fn image(source_url: impl Into<String>) -> Self {
        Self::Image(MediaResponse {
            success: true,
            source_url: source_url.into(),
            caption: None,
        })
    }

    pub fn file(source_url: impl Into<String>) -> Self {
        Self::File(MediaResponse {
            success: true,
            source_url: source_url.into(),
            caption: None,
        })
    }

    /// Attach a caption to a media response; text is returned unchanged.
    pub fn with_caption(self, caption: impl Into<String>) -> Self {
        match self {
            Self::Image(media) => Self::Image(MediaResponse {
                caption: Some(caption.into()),
                ..media
            }),
            Self::File(media) => Self::File(MediaResponse {
                caption: Some(caption.into()),
                ..media
            }),
            text => text,
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Self::Text(text) => text.success,
            Self::Image(media) | Self::File(media) => media.success,
        }
    }

    /// Whether this text reply continues a thread, failures included.
    pub fn supports_conversation(&self) -> bool {
        matches!(self, Self::Text(text) if text.supports_conversation)
    }

    /// Mark text as conversation-supporting. Media is never threaded.
    pub(crate) fn into_conversational(self) -> Self {
        match self {
            Self::Text(text) => Self::Text(TextResponse {
                supports_conversation: true,
                ..text
            }),
            other => other,
        }
    }
}
