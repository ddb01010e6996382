//! Error types returned by [`crate::DeflateDecoder`].

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};

/// A struct returned when decompression fails.
pub struct InflateDecodeErrors
{
    /// Reason decompression failed.
    pub error:          DecodeErrorStatus,
    /// Whatever output had been decoded up to the point of the error.
    /// Kept for diagnostics only; a failed call never returns this as a
    /// successful result.
    pub partial_output: Vec<u8>
}

impl InflateDecodeErrors
{
    pub fn new(error: DecodeErrorStatus, partial_output: Vec<u8>) -> InflateDecodeErrors
    {
        InflateDecodeErrors { error, partial_output }
    }

    pub fn new_with_error(error: DecodeErrorStatus) -> InflateDecodeErrors
    {
        InflateDecodeErrors::new(error, Vec::new())
    }
}

impl Debug for InflateDecodeErrors
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result
    {
        write!(f, "{:?}", self.error)
    }
}

#[cfg(feature = "std")]
impl std::fmt::Display for InflateDecodeErrors
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        write!(f, "{:?}", self.error)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InflateDecodeErrors {}

/// Why a [`crate::DeflateDecoder`] call failed.
///
/// Splits, per spec, into structural violations of RFC 1950/1951
/// (everything except [`Unsupported`](DecodeErrorStatus::Unsupported)) and
/// well-formed-but-unimplemented input (`Unsupported`).
pub enum DecodeErrorStatus
{
    /// The buffer ended before a required field could be read.
    InsufficientData,
    /// A structural violation of RFC 1950/1951 whose reason needs no
    /// runtime context.
    Generic(&'static str),
    /// Like `Generic`, but the reason embeds a runtime value.
    GenericStr(String),
    /// Catch-all for malformed Huffman tables and LZ77 back-references.
    CorruptData,
    /// Well-formed input outside the implemented subset (unsupported CM,
    /// CINFO > 7, or FDICT = 1).
    Unsupported(&'static str),
    /// The decoded output exceeded the caller-supplied size limit.
    OutputLimitExceeded(usize, usize),
    /// The zlib trailer's Adler-32 didn't match the decoded output.
    MismatchedAdler(u32, u32)
}

impl Debug for DecodeErrorStatus
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result
    {
        match self
        {
            Self::InsufficientData => write!(f, "Insufficient data"),
            Self::Generic(reason) => write!(f, "{reason}"),
            Self::GenericStr(reason) => write!(f, "{reason}"),
            Self::CorruptData => write!(f, "Corrupt data"),
            Self::Unsupported(reason) => write!(f, "Unsupported: {reason}"),
            Self::OutputLimitExceeded(limit, current) => write!(
                f,
                "Output limit exceeded, limit was {limit} bytes and output reached {current} bytes"
            ),
            Self::MismatchedAdler(expected, found) =>
            {
                write!(f, "Mismatched Adler-32, expected {expected:#x} but found {found:#x}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::fmt::Display for DecodeErrorStatus
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        Debug::fmt(self, f)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeErrorStatus {}
