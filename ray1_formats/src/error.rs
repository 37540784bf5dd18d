use std::io;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure modes of the decoders in this crate.
///
/// Decoders never recover locally: the input is a fixed file, so a malformed
/// structure stays malformed on retry. Callers decide whether a missing entry
/// means "skip this volume" or a hard stop.
#[derive(Debug, Error)]
pub enum Error {
    /// Structurally invalid or truncated binary input.
    #[error("{0}")]
    Format(String),

    /// A named entry is absent from an archive directory.
    #[error("entry {name:?} not found in archive {archive}")]
    NotFound { archive: String, name: String },

    /// The underlying byte source could not be read.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub fn not_found(archive: impl Into<String>, name: impl Into<String>) -> Self {
        Error::NotFound {
            archive: archive.into(),
            name: name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

macro_rules! format_err {
    ($($arg:tt)*) => {
        $crate::error::Error::Format(format!($($arg)*))
    };
}

macro_rules! ensure_format {
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::format_err!($($arg)*));
        }
    };
}

pub(crate) use ensure_format;
pub(crate) use format_err;
