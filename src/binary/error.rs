use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::common::io_error_msg;

/// Everything that can stop a run before the codec finishes.
///
/// A broken grouping invariant inside the decoder is not represented here;
/// it panics.
#[derive(Debug, Error)]
pub enum BinecError {
    /// Malformed command line. The usage text is printed alongside.
    #[error("{0}")]
    Usage(String),

    /// Reading the input was cut short by SIGINT.
    #[error("interrupted")]
    Interrupted,

    /// The input could not be opened or read.
    #[error("{}: {}", display_path(.path), io_error_msg(.source))]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "standard input".to_string(),
    }
}

impl BinecError {
    /// Wrap a read error, turning an interrupt into [`BinecError::Interrupted`].
    pub fn from_read(path: Option<PathBuf>, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::Interrupted {
            BinecError::Interrupted
        } else {
            BinecError::Io { path, source }
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            BinecError::Usage(_) | BinecError::Io { .. } => 1,
            BinecError::Interrupted => 2,
        }
    }
}
