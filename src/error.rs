pub type StitchResult<T> = Result<T, StitchError>;

#[derive(thiserror::Error, Debug)]
pub enum StitchError {
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The user declined the overwrite prompt. A clean abort, not a failure:
    /// callers should exit with status 0 and leave the filesystem untouched.
    #[error("cancelled by user")]
    Cancelled,

    #[error("decode error: {0}")]
    Decode(String),

    #[error("post-process error: {0}")]
    PostProcess(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StitchError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn post_process(msg: impl Into<String>) -> Self {
        Self::PostProcess(msg.into())
    }
}
