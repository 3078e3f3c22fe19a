/// Errors a resolution can fail with before or during the provider reads.
///
/// Rejections (outside availability, date conflict) are not errors — they are
/// `Verdict::Reject` outcomes. Errors here mean the caller's input was
/// malformed or the persistence layer could not be read.
#[derive(Debug)]
pub enum ResolveError {
    /// Start/end missing, unparseable, or start after end. Surfaced before
    /// any provider read; the HTTP layer maps this to a client error.
    InvalidRange(String),
    /// The provider read failed. Retryable at the persistence client; the
    /// resolver itself never retries.
    Provider(String),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::InvalidRange(msg) => write!(f, "invalid date range: {msg}"),
            ResolveError::Provider(msg) => write!(f, "calendar provider unavailable: {msg}"),
        }
    }
}

impl std::error::Error for ResolveError {}
