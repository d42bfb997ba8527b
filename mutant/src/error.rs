//! Archive error types

use std::io;

/// Failure of a whole archive read or write.
///
/// Every primitive reports a plain `io::Error`; the writer and reader entry
/// points collapse the first failure into one of these two kinds. The stream
/// is left at an unspecified position and must be discarded.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The stream ended before the structure was complete, or its contents
    /// do not describe a valid archive.
    #[error("Unexpected end-of-file (file may be corrupted)")]
    CorruptOrTruncatedArchive,

    /// Any other I/O failure from the underlying stream
    #[error("Read/write error")]
    Io(#[source] io::Error),
}

impl ArchiveError {
    /// Classify a low-level stream failure.
    ///
    /// A short read, a full fixed-size sink and structurally invalid data
    /// all count as a corrupt or truncated archive.
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::WriteZero
            | io::ErrorKind::InvalidData => {
                tracing::debug!("archive stream failed: {}", err);
                ArchiveError::CorruptOrTruncatedArchive
            }
            _ => ArchiveError::Io(err),
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, ArchiveError::CorruptOrTruncatedArchive)
    }
}

/// Build an `InvalidData` error for structural corruption found while reading
pub(crate) fn corrupt(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}
