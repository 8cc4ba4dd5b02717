pub type PicblendResult<T> = Result<T, PicblendError>;

#[derive(thiserror::Error, Debug)]
pub enum PicblendError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("export error: {0}")]
    Export(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PicblendError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// The message a session should surface to the user for this error.
    ///
    /// Validation and server errors carry user-facing text already; transport
    /// and codec failures collapse to fixed prompts so raw socket or decoder
    /// detail never reaches the UI.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Server(msg) => msg.clone(),
            Self::Decode(_) => "Selected file is not a valid image.".to_string(),
            Self::Network(_) | Self::Export(_) | Self::Other(_) => {
                crate::remote::GENERIC_PROCESS_ERROR.to_string()
            }
        }
    }
}
