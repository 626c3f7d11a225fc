#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid resource location '{0}': {1}")]
    InvalidResourceLocation(String, &'static str),
    #[error("Invalid block state '{0}': {1}")]
    InvalidBlockState(String, &'static str),
    #[error("Radius must not be negative, got {0}")]
    NegativeRadius(i64),
    #[error("Invalid query settings: {0}")]
    Settings(#[from] serde_json::Error),
}
