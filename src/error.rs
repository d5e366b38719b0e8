use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every way a statement can fail. A failing statement aborts on the spot,
/// is reported as a single `Error: <message>` line, and leaves the session
/// environment untouched.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Lex error: {message} at position {position}")]
    Lex { message: String, position: usize },

    #[error("Parse error: {message} at position {position}")]
    Parse { message: String, position: usize },

    #[error("Name error: {0}")]
    Name(String),

    #[error("Type error: {0}")]
    Type(String),

    #[error("Shape error: {0}")]
    Shape(String),

    #[error("Domain error: {0}")]
    Domain(String),

    #[error("{0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
