use thiserror::Error;

#[derive(Error, Debug)]
pub enum CtlError {
    // Message reported by the server, passed through verbatim so "not found"
    // reaches the terminal.
    #[error("{0}")]
    Server(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
