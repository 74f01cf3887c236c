use thiserror::Error;

pub type Result<T> = std::result::Result<T, BriefingError>;

#[derive(Debug, Error)]
pub enum BriefingError {
    #[error("Generation failed ({provider}): {reason}")]
    Generation {
        provider: &'static str,
        reason: String,
    },

    #[error("Delivery failed: {reason}")]
    Delivery { reason: String },

    #[error("Rotation list is empty")]
    EmptyRotation,

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl BriefingError {
    pub fn generation(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::Generation {
            provider,
            reason: reason.into(),
        }
    }

    pub fn delivery(reason: impl Into<String>) -> Self {
        Self::Delivery {
            reason: reason.into(),
        }
    }
}
