use thiserror::Error;

/// Errors originating from the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] mandelscope_core::CoreError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("export failed: {reason}")]
    Export { reason: String },

    #[error("failed to spawn recompute worker: {0}")]
    WorkerSpawn(std::io::Error),

    #[error("recompute worker disconnected")]
    WorkerDisconnected,
}

/// Failure category of a save or load, one user-facing message each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceErrorKind {
    InvalidResolution,
    CorruptData,
    IoFailure,
}

/// Errors raised while reading or writing a session file.
///
/// A load that fails with any of these leaves the session untouched.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("session file resolution {found} does not match {expected}")]
    InvalidResolution { expected: u32, found: u32 },

    #[error("corrupt session file at line {line}: {reason}")]
    CorruptData { line: usize, reason: String },

    #[error("session file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl PersistenceError {
    pub fn kind(&self) -> PersistenceErrorKind {
        match self {
            Self::InvalidResolution { .. } => PersistenceErrorKind::InvalidResolution,
            Self::CorruptData { .. } => PersistenceErrorKind::CorruptData,
            Self::Io(_) => PersistenceErrorKind::IoFailure,
        }
    }

    /// Short notification text for the failure category.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            PersistenceErrorKind::InvalidResolution => {
                "The file was saved at a different resolution and cannot be loaded."
            }
            PersistenceErrorKind::CorruptData => {
                "The file is corrupted or is not a session file. Nothing was loaded."
            }
            PersistenceErrorKind::IoFailure => {
                "The file could not be read or written. The action was aborted."
            }
        }
    }

    pub(crate) fn corrupt(line: usize, reason: impl Into<String>) -> Self {
        Self::CorruptData {
            line,
            reason: reason.into(),
        }
    }
}
