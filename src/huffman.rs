//! Canonical Huffman table construction and symbol decoding.
//!
//! DEFLATE's alphabets are always the trivial sequence `0..N` (literal/
//! length symbols, distance symbols, and code-length symbols are never
//! reordered), so `HuffmanTable::from_lengths` takes just the bit-length
//! vector and treats the symbol at index `i` as having length
//! `lengths[i]`, per RFC 1951 §3.2.2.
//!
//! Decoding walks the canonical code length-by-length rather than via a
//! trie or a direct-lookup table — the length-indexed representation the
//! re-architecture guidance calls out as acceptable when simplicity is
//! valued over raw throughput. `counts[len]` is how many codes have that
//! length; `symbols` holds every used symbol sorted by `(length, code)`,
//! which for a canonical code is the same order as `(length, symbol)`.

use alloc::vec;
use alloc::vec::Vec;

use crate::bitstream::BitStream;
use crate::constants::DEFLATE_MAX_CODEWORD_LENGTH;
use crate::errors::DecodeErrorStatus;

pub struct HuffmanTable
{
    counts:  Vec<u16>,
    symbols: Vec<u16>,
    max_len: u8
}

impl HuffmanTable
{
    /// Build a canonical Huffman table from a vector of bit-lengths, one
    /// per symbol `0..lengths.len()`. A length of `0` means the symbol is
    /// absent. An all-zero `lengths` yields an empty table: valid to
    /// construct (a dynamic block's distance code may have no symbols in
    /// use at all when the block contains no back-references), but an
    /// error to `decode` from.
    pub fn from_lengths(lengths: &[u8]) -> Result<HuffmanTable, DecodeErrorStatus>
    {
        let max_len = lengths.iter().copied().max().unwrap_or(0);

        if max_len == 0
        {
            return Ok(HuffmanTable { counts: vec![0], symbols: Vec::new(), max_len: 0 });
        }

        if usize::from(max_len) > DEFLATE_MAX_CODEWORD_LENGTH
        {
            return Err(DecodeErrorStatus::Generic(
                "Huffman codeword length exceeds DEFLATE's 15-bit maximum"
            ));
        }

        let mut counts = vec![0u16; usize::from(max_len) + 1];

        for &len in lengths
        {
            counts[usize::from(len)] += 1;
        }

        // Reject an overfull code as early as possible: a codeword of
        // length L uses 1/2^L of the codespace, and the total used can
        // never exceed 1.
        let mut codespace_used: u32 = 0;

        for len in 1..=usize::from(max_len)
        {
            codespace_used = (codespace_used << 1) + u32::from(counts[len]);
        }

        if codespace_used > (1u32 << max_len)
        {
            return Err(DecodeErrorStatus::CorruptData);
        }

        // offsets[len] is where the run of length-`len` symbols starts in
        // the sorted `symbols` array.
        let mut offsets = vec![0u16; usize::from(max_len) + 2];

        for len in 1..=usize::from(max_len)
        {
            offsets[len + 1] = offsets[len] + counts[len];
        }

        let mut symbols = vec![0u16; usize::from(offsets[usize::from(max_len) + 1])];

        for (sym, &len) in lengths.iter().enumerate()
        {
            if len != 0
            {
                let pos = usize::from(offsets[usize::from(len)]);
                symbols[pos] = sym as u16;
                offsets[usize::from(len)] += 1;
            }
        }

        Ok(HuffmanTable { counts, symbols, max_len })
    }

    /// Decode one symbol, consuming exactly as many bits as its codeword's
    /// length. Codewords are read MSB-first even though each individual
    /// bit comes off the stream LSB-first within its byte — the DEFLATE
    /// convention, not a contradiction.
    pub fn decode(&self, stream: &mut BitStream) -> Result<u16, DecodeErrorStatus>
    {
        if self.max_len == 0
        {
            return Err(DecodeErrorStatus::CorruptData);
        }

        let mut code: i32 = 0;
        let mut first: i32 = 0;
        let mut index: i32 = 0;

        for len in 1..=usize::from(self.max_len)
        {
            code |= stream.read_bit()? as i32;

            let count = i32::from(self.counts[len]);

            if code - first < count
            {
                return Ok(self.symbols[(index + (code - first)) as usize]);
            }

            index += count;
            first += count;
            first <<= 1;
            code <<= 1;
        }

        Err(DecodeErrorStatus::CorruptData)
    }
}
