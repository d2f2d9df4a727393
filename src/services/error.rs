use std::time::Duration;

/// Failures of the AI layer. All of them are surfaced to the caller; none
/// are retried.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("relay unreachable: {0}")]
    Network(String),

    #[error("relay did not answer within {0:?}")]
    Timeout(Duration),

    #[error("relay failed ({status}): {body}")]
    Relay { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("model call failed: {0}")]
    Model(String),

    #[error("clothing analysis failed: {0}")]
    Analysis(String),

    #[error("outfit recommendation failed: {0}")]
    Recommendation(String),

    #[error("no matching item in closet for {slot} id '{id}'")]
    Reference { slot: &'static str, id: String },

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

pub type AiResult<T> = std::result::Result<T, AiError>;
