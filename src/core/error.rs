use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyserError>;

/// Every failure an analysis run can surface to the caller.
#[derive(Debug, Error)]
pub enum AnalyserError {
    /// `GEMINI_API_KEY` was neither in the environment nor in a `.env` file.
    #[error("missing chat credential: set the {0} environment variable")]
    MissingApiKey(&'static str),

    #[error("failed to read CSV upload: {0}")]
    Csv(#[from] csv::Error),

    #[error("column '{0}' does not exist in the uploaded table")]
    UnknownColumn(String),

    /// Bulk analysis was requested before a file and column were chosen.
    #[error("upload a CSV file and select a column before analysing")]
    MissingUpload,

    /// Tokenization, model loading or inference failed.
    #[error("sentiment classifier failed: {0}")]
    Classifier(#[source] anyhow::Error),

    /// The classifier head does not produce one logit per sentiment label.
    #[error("sentiment model reports {0} labels, expected 3")]
    LabelCount(usize),

    #[error("chat request failed: {0}")]
    ChatTransport(#[from] reqwest::Error),

    #[error("chat service returned an error (status {status}): {message}")]
    ChatApi { status: u16, message: String },

    #[error("chat service returned no text")]
    EmptyReply,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnalyserError {
    pub(crate) fn classifier(err: impl Into<anyhow::Error>) -> Self {
        AnalyserError::Classifier(err.into())
    }
}
