//! Contains the error kinds that can be encountered while decoding a JPEG image.
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Common decode errors
#[allow(clippy::module_name_repetitions)]
pub enum DecodeErrors {
    /// Could not open or read the underlying byte source
    IOFailure(String),
    /// Marker framing is broken: missing SOI/EOI, a malformed `0xFF XX`
    /// sequence, or a marker appearing where it cannot
    StructuralError(String),
    /// A segment's declared length does not match the data that follows it
    LengthMismatch(String),
    /// The file requires a feature this decoder does not implement
    UnsupportedFeature(String),
    /// A component, scan, or table reference points at something that was
    /// never defined (or an out of range table id)
    InvalidReference(String),
    /// The entropy-coded bitstream could not be decoded: ran past the end,
    /// an undecodable Huffman code, or a coefficient length outside spec
    BitstreamError(String),
}

impl Debug for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IOFailure(reason) => write!(f, "Could not read JPEG stream. Reason: {}", reason),
            Self::StructuralError(reason) => {
                write!(f, "Malformed JPEG marker structure. Reason: {}", reason)
            }
            Self::LengthMismatch(reason) => {
                write!(f, "Segment length does not match its contents. Reason: {}", reason)
            }
            Self::UnsupportedFeature(reason) => {
                write!(f, "Unsupported JPEG feature. Reason: {}", reason)
            }
            Self::InvalidReference(reason) => {
                write!(f, "Invalid table or component reference. Reason: {}", reason)
            }
            Self::BitstreamError(reason) => {
                write!(f, "Error decoding entropy-coded bitstream. Reason: {}", reason)
            }
        }
    }
}

impl Display for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Debug and Display carry the same message; there's no lower-level
        // cause to elide the way there would be with a wrapped error type.
        Debug::fmt(self, f)
    }
}

impl Error for DecodeErrors {}

impl From<std::io::Error> for DecodeErrors {
    fn from(e: std::io::Error) -> Self {
        DecodeErrors::IOFailure(e.to_string())
    }
}
