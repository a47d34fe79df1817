use thiserror::Error;

/// Errors that abort an import.
///
/// Only structural failures live here. Everything else the importer finds
/// wrong with a record — bad offsets, overlapping windows, out-of-range
/// values — is downgraded to a [`Diagnostic`](crate::diag::Diagnostic) plus
/// a substituted value, and the import carries on.
#[derive(Debug, Error)]
pub enum Error {
    /// The input is smaller than the minimum record size.
    #[error("file is too small ({size} bytes) -- resave with IT 2.12+")]
    TooShort {
        /// Actual input size in bytes.
        size: usize,
    },

    /// A read ran past the end of the buffer.
    ///
    /// Cannot happen once the size gate in
    /// [`RawRecord::parse`](crate::record::RawRecord::parse) has passed; if
    /// it does, the decoder itself is wrong.
    #[error("read of {wanted} bytes at offset {offset} overruns {len}-byte buffer")]
    Underrun {
        offset: usize,
        wanted: usize,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
