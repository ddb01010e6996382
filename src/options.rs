//! Decoder configuration, in the shape of the teacher's own
//! `DeflateEncodingOptions`/`DeflateEncoder` pairing.

/// Options controlling a [`crate::DeflateDecoder`] run.
///
/// Built with `Default` and tweaked via the `set_*` builder methods, the
/// same way the teacher's encoder-side options are constructed.
#[derive(Debug, Clone, Copy)]
pub struct DeflateOptions
{
    confirm_adler32: bool,
    size_hint:       Option<usize>,
    size_limit:      Option<usize>
}

impl Default for DeflateOptions
{
    fn default() -> Self
    {
        DeflateOptions { confirm_adler32: false, size_hint: None, size_limit: None }
    }
}

impl DeflateOptions
{
    /// Whether to compute the Adler-32 of the decoded output and compare it
    /// against the trailer. Defaults to `false`: the trailer is parsed but
    /// not enforced, matching the source this crate is specified against
    /// (RFC 1950 mandates the check; callers that want it can opt in with
    /// `set_confirm_adler32(true)`).
    pub fn set_confirm_adler32(mut self, confirm: bool) -> Self
    {
        self.confirm_adler32 = confirm;
        self
    }

    /// Pre-reserve this much capacity in the output buffer. Purely an
    /// allocation hint; an under- or over-estimate is harmless.
    pub fn set_size_hint(mut self, hint: usize) -> Self
    {
        self.size_hint = Some(hint);
        self
    }

    /// Fail with [`crate::errors::DecodeErrorStatus::OutputLimitExceeded`]
    /// once decoded output would exceed `limit` bytes, instead of growing
    /// the output buffer without bound.
    pub fn set_limit(mut self, limit: usize) -> Self
    {
        self.size_limit = Some(limit);
        self
    }

    pub(crate) fn confirm_adler32(&self) -> bool
    {
        self.confirm_adler32
    }

    pub(crate) fn size_hint(&self) -> Option<usize>
    {
        self.size_hint
    }

    pub(crate) fn size_limit(&self) -> Option<usize>
    {
        self.size_limit
    }
}
