use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A node or connection the operation needs is not in the graph.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Negative weights are rejected at every write site.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn node_not_found<N: std::fmt::Debug>(node: &N) -> Self {
        Error::NotFound(format!("node {:?}", node))
    }

    pub(crate) fn negative_weight(weight: i64) -> Self {
        Error::InvalidArgument(format!("weight must be non-negative, got {}", weight))
    }
}
