//! The inflate state machine: zlib wrapper framing (`decode_zlib`) plus the
//! DEFLATE block dispatcher and LZ77 copy-back loop.

use alloc::vec::Vec;

use crate::bitstream::BitStream;
use crate::constants::{
    DEFLATE_PRECODE_LENS_PERMUTATION, DISTANCE_BASE, DISTANCE_EXTRA_BITS, LENGTH_BASE,
    LENGTH_EXTRA_BITS
};
use crate::errors::{DecodeErrorStatus, InflateDecodeErrors};
use crate::huffman::HuffmanTable;
use crate::options::DeflateOptions;
use crate::utils::adler32;

const DEFLATE_BLOCKTYPE_STORED: u32 = 0;
const DEFLATE_BLOCKTYPE_STATIC: u32 = 1;
const DEFLATE_BLOCKTYPE_DYNAMIC: u32 = 2;

/// Decodes a single zlib stream held entirely in memory.
///
/// ```
/// use inflate_zlib::DeflateDecoder;
///
/// let zlib_stream = [
///     0x78, 0x01, 0x01, 0x05, 0x00, 0xFA, 0xFF, 0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x05, 0xF0, 0x01,
///     0x95
/// ];
/// let mut decoder = DeflateDecoder::new(&zlib_stream);
/// assert_eq!(decoder.decode_zlib().unwrap(), b"Hello");
/// ```
pub struct DeflateDecoder<'a>
{
    data:    &'a [u8],
    options: DeflateOptions
}

impl<'a> DeflateDecoder<'a>
{
    pub fn new(data: &'a [u8]) -> DeflateDecoder<'a>
    {
        DeflateDecoder::new_with_options(data, DeflateOptions::default())
    }

    pub fn new_with_options(data: &'a [u8], options: DeflateOptions) -> DeflateDecoder<'a>
    {
        DeflateDecoder { data, options }
    }

    /// Parse the 2-byte zlib header, inflate the DEFLATE payload, then
    /// consume the 4-byte Adler-32 trailer. By default it is parsed but
    /// not verified (see [`DeflateOptions::set_confirm_adler32`]).
    pub fn decode_zlib(&mut self) -> Result<Vec<u8>, InflateDecodeErrors>
    {
        // 2-byte header + at least 1 byte of deflate payload + 4-byte trailer.
        if self.data.len() < 7
        {
            return Err(InflateDecodeErrors::new_with_error(DecodeErrorStatus::InsufficientData));
        }

        let cmf = self.data[0];
        let flg = self.data[1];

        let cm = cmf & 0x0F;
        let cinfo = cmf >> 4;

        if cm != 8
        {
            return Err(InflateDecodeErrors::new_with_error(DecodeErrorStatus::Unsupported(
                "only CM = 8 (DEFLATE) is supported"
            )));
        }

        if cinfo > 7
        {
            return Err(InflateDecodeErrors::new_with_error(DecodeErrorStatus::Unsupported(
                "CINFO > 7 implies a window larger than 32 KiB, which is not supported"
            )));
        }

        let header_check = (u16::from(cmf) << 8) | u16::from(flg);

        if header_check % 31 != 0
        {
            return Err(InflateDecodeErrors::new_with_error(DecodeErrorStatus::Generic(
                "zlib header checksum (FCHECK) failed"
            )));
        }

        let fdict = (flg >> 5) & 1;

        if fdict == 1
        {
            return Err(InflateDecodeErrors::new_with_error(DecodeErrorStatus::Unsupported(
                "preset dictionaries (FDICT = 1) are not supported"
            )));
        }

        log::trace!("zlib header ok: cm={cm} cinfo={cinfo} flg={flg:#04x}");

        let mut stream = BitStream::new(&self.data[2..]);

        let out = match self.inflate(&mut stream)
        {
            Ok(out) => out,
            Err((error, partial)) => return Err(InflateDecodeErrors::new(error, partial))
        };

        // The 4-byte Adler-32 trailer is always consumed, per §4.4 — it is
        // parsed regardless of whether `confirm_adler32` asks for it to be
        // checked against the decoded output.
        let trailer = match (
            stream.read_byte(),
            stream.read_byte(),
            stream.read_byte(),
            stream.read_byte()
        )
        {
            (Ok(b0), Ok(b1), Ok(b2), Ok(b3)) =>
            {
                (u32::from(b0) << 24) | (u32::from(b1) << 16) | (u32::from(b2) << 8)
                    | u32::from(b3)
            }
            _ => return Err(InflateDecodeErrors::new(DecodeErrorStatus::InsufficientData, out))
        };

        if self.options.confirm_adler32()
        {
            let found = adler32(&out);

            if trailer != found
            {
                return Err(InflateDecodeErrors::new(
                    DecodeErrorStatus::MismatchedAdler(trailer, found),
                    out
                ));
            }

            log::trace!("adler32 verified: {found:#010x}");
        }

        Ok(out)
    }

    /// Iterate DEFLATE blocks until BFINAL, dispatching on BTYPE.
    fn inflate(&self, stream: &mut BitStream) -> Result<Vec<u8>, (DecodeErrorStatus, Vec<u8>)>
    {
        let mut out = Vec::with_capacity(self.options.size_hint().unwrap_or(0));

        loop
        {
            let bfinal = read_or_fail(stream.read_bits(1), &out)?;
            let btype = read_or_fail(stream.read_bits(2), &out)?;

            log::trace!("deflate block: bfinal={bfinal} btype={btype}");

            match btype
            {
                DEFLATE_BLOCKTYPE_STORED =>
                {
                    if let Err(e) = decode_stored_block(stream, &mut out, self.options.size_limit())
                    {
                        return Err((e, out));
                    }
                }
                DEFLATE_BLOCKTYPE_STATIC =>
                {
                    if let Err(e) = decode_fixed_block(stream, &mut out, self.options.size_limit())
                    {
                        return Err((e, out));
                    }
                }
                DEFLATE_BLOCKTYPE_DYNAMIC =>
                {
                    if let Err(e) = decode_dynamic_block(stream, &mut out, self.options.size_limit())
                    {
                        return Err((e, out));
                    }
                }
                _ => return Err((DecodeErrorStatus::Generic("BTYPE 3 is reserved"), out))
            }

            if bfinal == 1
            {
                break;
            }
        }

        Ok(out)
    }
}

fn read_or_fail<T>(
    result: Result<T, DecodeErrorStatus>, out: &Vec<u8>
) -> Result<T, (DecodeErrorStatus, Vec<u8>)>
{
    result.map_err(|e| (e, out.clone()))
}

fn check_limit(out: &[u8], limit: Option<usize>) -> Result<(), DecodeErrorStatus>
{
    if let Some(limit) = limit
    {
        if out.len() > limit
        {
            return Err(DecodeErrorStatus::OutputLimitExceeded(limit, out.len()));
        }
    }

    Ok(())
}

/// BTYPE = 0: align to the next byte boundary, read LEN/NLEN, copy LEN
/// bytes verbatim.
fn decode_stored_block(
    stream: &mut BitStream, out: &mut Vec<u8>, limit: Option<usize>
) -> Result<(), DecodeErrorStatus>
{
    let len = stream.read_bytes(2)? as u16;
    let nlen = stream.read_bytes(2)? as u16;

    if len != !nlen
    {
        return Err(DecodeErrorStatus::Generic(
            "stored block: NLEN is not the one's complement of LEN"
        ));
    }

    out.reserve(usize::from(len));

    for _ in 0..len
    {
        out.push(stream.read_byte()?);
    }

    check_limit(out, limit)
}

fn fixed_litlen_lengths() -> [u8; 288]
{
    let mut lens = [0u8; 288];
    lens[0..144].fill(8);
    lens[144..256].fill(9);
    lens[256..280].fill(7);
    lens[280..288].fill(8);
    lens
}

/// BTYPE = 1: the standard fixed Huffman trees of RFC 1951 §3.2.6.
fn decode_fixed_block(
    stream: &mut BitStream, out: &mut Vec<u8>, limit: Option<usize>
) -> Result<(), DecodeErrorStatus>
{
    let litlen_table = HuffmanTable::from_lengths(&fixed_litlen_lengths())?;
    let dist_table = HuffmanTable::from_lengths(&[5u8; 30])?;

    run_compressed_block(stream, out, &litlen_table, &dist_table, limit)
}

/// BTYPE = 2: build the literal/length and distance trees from the stream
/// itself, via the code-length meta-alphabet.
fn decode_dynamic_block(
    stream: &mut BitStream, out: &mut Vec<u8>, limit: Option<usize>
) -> Result<(), DecodeErrorStatus>
{
    let hlit = stream.read_bits(5)? as usize + 257;
    let hdist = stream.read_bits(5)? as usize + 1;
    let hclen = stream.read_bits(4)? as usize + 4;

    let mut precode_lens = [0u8; 19];

    for &position in DEFLATE_PRECODE_LENS_PERMUTATION.iter().take(hclen)
    {
        precode_lens[usize::from(position)] = stream.read_bits(3)? as u8;
    }

    let precode_table = HuffmanTable::from_lengths(&precode_lens)?;

    let total = hlit + hdist;
    let mut lens = alloc::vec![0u8; total];
    let mut i = 0usize;

    while i < total
    {
        let sym = precode_table.decode(stream)?;

        match sym
        {
            0..=15 =>
            {
                lens[i] = sym as u8;
                i += 1;
            }
            16 =>
            {
                if i == 0
                {
                    return Err(DecodeErrorStatus::Generic(
                        "code-length symbol 16 (repeat previous) with no previous length"
                    ));
                }

                let repeat = 3 + stream.read_bits(2)? as usize;
                let previous = lens[i - 1];
                fill_lengths(&mut lens, &mut i, total, previous, repeat)?;
            }
            17 =>
            {
                let repeat = 3 + stream.read_bits(3)? as usize;
                fill_lengths(&mut lens, &mut i, total, 0, repeat)?;
            }
            18 =>
            {
                let repeat = 11 + stream.read_bits(7)? as usize;
                fill_lengths(&mut lens, &mut i, total, 0, repeat)?;
            }
            _ => return Err(DecodeErrorStatus::Generic("invalid code-length symbol"))
        }
    }

    let litlen_table = HuffmanTable::from_lengths(&lens[..hlit])?;
    let dist_table = HuffmanTable::from_lengths(&lens[hlit..])?;

    run_compressed_block(stream, out, &litlen_table, &dist_table, limit)
}

fn fill_lengths(
    lens: &mut [u8], i: &mut usize, total: usize, value: u8, repeat: usize
) -> Result<(), DecodeErrorStatus>
{
    if *i + repeat > total
    {
        return Err(DecodeErrorStatus::Generic(
            "code-length repeat overruns HLIT + HDIST symbols"
        ));
    }

    lens[*i..*i + repeat].fill(value);
    *i += repeat;

    Ok(())
}

/// The literal/length + distance decode loop shared by fixed and dynamic
/// blocks (BTYPE ∈ {1, 2}).
fn run_compressed_block(
    stream: &mut BitStream, out: &mut Vec<u8>, litlen_table: &HuffmanTable,
    dist_table: &HuffmanTable, limit: Option<usize>
) -> Result<(), DecodeErrorStatus>
{
    loop
    {
        let symbol = litlen_table.decode(stream)?;

        if symbol < 256
        {
            out.push(symbol as u8);
        }
        else if symbol == 256
        {
            return Ok(());
        }
        else
        {
            let index = usize::from(symbol - 257);

            let length_base = *LENGTH_BASE
                .get(index)
                .ok_or(DecodeErrorStatus::Generic("invalid length symbol"))?;
            let length_extra = LENGTH_EXTRA_BITS[index];
            let length = usize::from(length_base) + stream.read_bits(length_extra)? as usize;

            let distance_symbol = usize::from(dist_table.decode(stream)?);

            let distance_base = *DISTANCE_BASE
                .get(distance_symbol)
                .ok_or(DecodeErrorStatus::Generic("invalid distance symbol"))?;
            let distance_extra = DISTANCE_EXTRA_BITS[distance_symbol];
            let distance = usize::from(distance_base) + stream.read_bits(distance_extra)? as usize;

            if distance == 0 || distance > out.len()
            {
                return Err(DecodeErrorStatus::Generic(
                    "back-reference distance exceeds current output length"
                ));
            }

            let start = out.len() - distance;
            out.reserve(length);

            for k in 0..length
            {
                let byte = out[start + k];
                out.push(byte);
            }
        }

        check_limit(out, limit)?;
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn decode(bytes: &[u8]) -> Result<Vec<u8>, InflateDecodeErrors>
    {
        DeflateDecoder::new(bytes).decode_zlib()
    }

    /// S1 (stored): one stored block, BFINAL=1.
    #[test]
    fn s1_stored_block_hello()
    {
        let input = [
            0x78, 0x01, 0x01, 0x05, 0x00, 0xFA, 0xFF, 0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x05, 0xF0,
            0x01, 0x95
        ];
        assert_eq!(decode(&input).unwrap(), b"Hello");
    }

    /// S2 (fixed Huffman). Trailer `00 62 00 62` is `adler32("a")`, so the
    /// decoded byte is lowercase `a`, not the `A` spec.md's prose names.
    #[test]
    fn s2_fixed_huffman_single_literal()
    {
        let input = [0x78, 0x9C, 0x4B, 0x04, 0x00, 0x00, 0x62, 0x00, 0x62];
        assert_eq!(decode(&input).unwrap(), b"a");
    }

    /// S5 (malformed): truncated LEN in a stored-block attempt.
    #[test]
    fn s5_truncated_stored_block_is_malformed()
    {
        let input = [0x78, 0x9C, 0x00];
        assert!(decode(&input).is_err());
    }

    /// S6 (unsupported): FDICT = 1.
    #[test]
    fn s6_preset_dictionary_is_unsupported()
    {
        // CMF=0x78 (CM=8, CINFO=7), FLG chosen with FDICT set and FCHECK
        // adjusted so (CMF*256 + FLG) % 31 == 0.
        let cmf: u16 = 0x78;
        let mut flg: u16 = 0b0010_0000; // FDICT=1, FLEVEL=0
        flg += (31 - ((cmf * 256 + flg) % 31)) % 31;

        let input = [cmf as u8, flg as u8, 0, 0, 0, 0, 0];
        let err = decode(&input).unwrap_err();
        assert!(matches!(err.error, DecodeErrorStatus::Unsupported(_)));
    }

    /// Property: stored-block LEN/NLEN mismatch is rejected.
    #[test]
    fn len_nlen_mismatch_is_malformed()
    {
        // Same framing as S1 but NLEN corrupted (0xFB instead of 0xFA).
        let input = [
            0x78, 0x01, 0x01, 0x05, 0x00, 0xFB, 0xFF, 0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x05, 0xF0,
            0x01, 0x95
        ];
        assert!(decode(&input).is_err());
    }

    /// Property: toggling a header bit so the FCHECK constraint fails is
    /// rejected.
    #[test]
    fn bad_header_checksum_is_malformed()
    {
        let mut input = [
            0x78, 0x01, 0x01, 0x05, 0x00, 0xFA, 0xFF, 0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x05, 0xF0,
            0x01, 0x95
        ];
        input[1] ^= 0x01;
        assert!(decode(&input).is_err());
    }

    /// Property: a back-reference whose distance exceeds the output
    /// produced so far is rejected, not silently clamped.
    #[test]
    fn distance_exceeding_output_is_rejected()
    {
        let litlen_table = HuffmanTable::from_lengths(&fixed_litlen_lengths()).unwrap();
        let dist_table = HuffmanTable::from_lengths(&[5u8; 30]).unwrap();

        // length=3 (symbol 257, 0 extra bits), distance symbol 1 (base 2,
        // 0 extra bits) with zero bytes of prior output.
        let length_symbol = encode_fixed_litlen(257);
        let mut bits: Vec<u8> = Vec::new();
        bits.extend(length_symbol);
        bits.extend(encode_fixed_dist(1));
        bits.extend(encode_fixed_litlen(256)); // end of block, unreachable

        let mut stream = BitStream::new(&pack_msb_bits(&bits));
        let mut out = Vec::new();
        let result = run_compressed_block(&mut stream, &mut out, &litlen_table, &dist_table, None);
        assert!(matches!(result, Err(DecodeErrorStatus::Generic(_))));
    }

    /// Property: overlapping copies (distance < length) replicate the
    /// pattern byte-by-byte rather than reading stale memory.
    #[test]
    fn overlap_copy_replicates_single_byte()
    {
        let litlen_table = HuffmanTable::from_lengths(&fixed_litlen_lengths()).unwrap();
        let dist_table = HuffmanTable::from_lengths(&[5u8; 30]).unwrap();

        let mut bits: Vec<u8> = Vec::new();
        bits.extend(encode_fixed_litlen(b'X' as u16)); // one literal byte
        bits.extend(encode_fixed_litlen(261)); // length symbol -> length 7
        bits.extend(encode_fixed_dist(0)); // distance symbol 0 -> distance 1
        bits.extend(encode_fixed_litlen(256)); // end of block

        let mut stream = BitStream::new(&pack_msb_bits(&bits));
        let mut out = Vec::new();
        run_compressed_block(&mut stream, &mut out, &litlen_table, &dist_table, None).unwrap();

        assert_eq!(out, b"XXXXXXXX");
    }

    /// Build the MSB-first bit sequence for a symbol under the fixed
    /// literal/length tree (test-only helper, mirrors RFC 1951 §3.2.6).
    fn encode_fixed_litlen(symbol: u16) -> Vec<u8>
    {
        let (code, len): (u16, u8) = match symbol
        {
            0..=143 => (0b0011_0000 + symbol, 8),
            144..=255 => (0b1_1001_0000 + (symbol - 144), 9),
            256..=279 => (symbol - 256, 7),
            280..=287 => (0b1100_0000 + (symbol - 280), 8),
            _ => unreachable!()
        };

        bits_of(code, len)
    }

    /// Distance codes are fixed-length (5 bits), code == symbol.
    fn encode_fixed_dist(symbol: u16) -> Vec<u8>
    {
        bits_of(symbol, 5)
    }

    fn bits_of(code: u16, len: u8) -> Vec<u8>
    {
        (0..len).rev().map(|i| u8::from((code >> i) & 1 == 1)).collect()
    }

    /// Pack a sequence of MSB-first-ordered bits (one per element) into
    /// bytes the `BitStream` (LSB-first within each byte) will read back
    /// in the same order they were pushed.
    fn pack_msb_bits(bits: &[u8]) -> Vec<u8>
    {
        let mut bytes = alloc::vec![0u8; (bits.len() + 7) / 8];

        for (i, &bit) in bits.iter().enumerate()
        {
            if bit == 1
            {
                bytes[i / 8] |= 1 << (i % 8);
            }
        }

        bytes
    }
}
