use thiserror::Error;

/// The two failure classes that stop a seeding run. Degraded conditions
/// (generation fallback, missing vector index) are absorbed and logged where
/// they occur and never surface here.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing configuration, unreachable store, or any failure before the
    /// first batch is written.
    #[error("startup failed: {0}")]
    Startup(String),

    /// Embedding or writing a batch failed; earlier batches remain in the
    /// collection and recovery is a full reseed.
    #[error("load failed at batch {batch}/{total}: {reason}")]
    Load {
        batch: usize,
        total: usize,
        reason: String,
    },
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Startup(_) => 1,
            Error::Load { .. } => 2,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
