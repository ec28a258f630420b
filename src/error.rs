use thiserror::Error;

/// Internal error taxonomy. Never surfaced on the UCI channel: callers log these at
/// `warn` and fall back to swallowing the failure or leaving state unchanged.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("malformed polyglot book: {0}")]
    BookFormat(String),

    #[error("could not read polyglot book {path}: {source}")]
    BookIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
