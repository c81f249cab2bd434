use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The input contained no recognisable CREATE TABLE statement.
    #[error("No tables found in the SQL input")]
    NoTables,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Layout config error: {0}")]
    Config(String),
}
