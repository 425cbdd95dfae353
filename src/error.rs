use std::path::PathBuf;

/// Errors that can occur during a sync run.
///
/// A `Network` or `Decode` error on the initial listing aborts the whole
/// run; every per-file error is recorded as a failed outcome and processing
/// continues with the next file.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("network error: {0}")]
    Network(String),

    #[error("cannot decode listing response: {0}")]
    Decode(String),

    #[error("hash mismatch (expected: {expected}, actual: {actual})")]
    HashMismatch { expected: String, actual: String },

    #[error("filesystem error on {}: {}", .path.display(), .source)]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
