use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("no extractable text in {0}")]
    EmptyDocument(String),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("embedding error ({provider}): {message}")]
    Embedding { provider: String, message: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    #[error("embedding dimension {found} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("embedding count {embeddings} doesn't match chunk count {chunks}")]
    CountMismatch { chunks: usize, embeddings: usize },

    #[error("cannot build an index from zero chunks")]
    Empty,
}

#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    #[error("answer service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("answer service response had no text")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub enum AskError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] IndexError),

    #[error("error generating response: {0}")]
    Answer(#[from] AnswerError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: String,
        max: String,
        value: String,
    },

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("no clipboard tool available (tried {0})")]
    Unavailable(String),

    #[error("clipboard io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("clipboard tool {tool} exited with {status}")]
    Failed { tool: String, status: String },
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
