/// Client-side session errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Camera/microphone could not be acquired. Surfaced to the caller
    /// as a distinct state; everything else stays best-effort.
    #[error("media acquisition failed: {0}")]
    MediaAcquisition(String),

    /// The media transport rejected a negotiation step.
    #[error("negotiation failed: {0}")]
    Negotiation(String),

    /// Remote-media subscription kept failing after the whole retry
    /// schedule was spent.
    #[error("remote subscription failed after {attempts} attempts")]
    SubscribeExhausted { attempts: u32 },

    /// An operation needed a media session but none is attached.
    #[error("no media session attached")]
    MediaUnavailable,
}

pub type Result<T> = std::result::Result<T, ClientError>;
