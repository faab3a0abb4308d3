use std::path::PathBuf;

use thiserror::Error;

/// Per-document failures. A failing document is skipped; the batch continues.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no product identifier in file name or body of {0:?}")]
    MissingIdentifier(PathBuf),
}
