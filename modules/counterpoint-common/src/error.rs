use thiserror::Error;

#[derive(Error, Debug)]
pub enum CounterpointError {
    #[error("{0} not configured")]
    ConfigurationMissing(&'static str),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {detail}")]
    MalformedResponse { detail: String, raw: String },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl From<std::io::Error> for CounterpointError {
    fn from(e: std::io::Error) -> Self {
        CounterpointError::Persistence(e.to_string())
    }
}
