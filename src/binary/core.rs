use std::io::{self, Write};
use std::num::NonZeroUsize;

use super::bits;

/// Encoded bytes are flushed to the writer in batches of roughly this size.
const ENCODE_BATCH: usize = 4 * 1024 * 1024;

/// Every byte value rendered as eight ASCII digits, MSB first.
static OCTETS: [[u8; 8]; 256] = build_octet_table();

const fn build_octet_table() -> [[u8; 8]; 256] {
    let mut table = [[b'0'; 8]; 256];
    let mut value = 0;
    while value < 256 {
        let mut bit = 0;
        while bit < 8 {
            if (value >> (7 - bit)) & 1 == 1 {
                table[value][bit] = b'1';
            }
            bit += 1;
        }
        value += 1;
    }
    table
}

/// Options controlling the textual layout produced by the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Inserted between consecutive octets, never after the last one.
    pub delimiter: Vec<u8>,
    /// Number of octets per line.
    pub interval: NonZeroUsize,
    /// When false no newline is ever emitted; `interval` is ignored.
    pub newlines: bool,
}

impl EncodeOptions {
    pub const DEFAULT_INTERVAL: NonZeroUsize = NonZeroUsize::new(8).unwrap();
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            delimiter: b" ".to_vec(),
            interval: Self::DEFAULT_INTERVAL,
            newlines: true,
        }
    }
}

/// Exact length of the text `encode` produces for `len` input bytes.
pub fn encoded_len(len: usize, opts: &EncodeOptions) -> usize {
    if len == 0 {
        return 0;
    }
    let separators = (len - 1) * opts.delimiter.len();
    let newlines = if opts.newlines {
        (len - 1) / opts.interval.get()
    } else {
        0
    };
    len * 8 + separators + newlines
}

/// Append the encoding of `data[start..end]` to `buf`.
///
/// Positions are absolute within `data`, so the newline and delimiter
/// decisions come out the same whichever way the input is split up.
fn encode_range(data: &[u8], start: usize, end: usize, opts: &EncodeOptions, buf: &mut Vec<u8>) {
    let last = data.len() - 1;
    let interval = opts.interval.get();
    for (i, &byte) in (start..end).zip(&data[start..end]) {
        if opts.newlines && i != 0 && i % interval == 0 {
            buf.push(b'\n');
        }
        buf.extend_from_slice(&OCTETS[byte as usize]);
        if i != last {
            buf.extend_from_slice(&opts.delimiter);
        }
    }
}

/// Encode `data` as ASCII binary digits.
///
/// The result is text only when the delimiter is; it is returned as bytes so
/// an arbitrary delimiter passes through untouched. No trailing newline is
/// produced.
pub fn encode(data: &[u8], opts: &EncodeOptions) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(data.len(), opts));
    if !data.is_empty() {
        encode_range(data, 0, data.len(), opts, &mut out);
    }
    out
}

/// Encode data and write to output in large batches.
/// Produces exactly the bytes of [`encode`].
pub fn encode_to_writer(data: &[u8], opts: &EncodeOptions, out: &mut impl Write) -> io::Result<()> {
    if data.is_empty() {
        return Ok(());
    }

    // Bytes of output per input byte, used to size input batches.
    let per_byte = 8 + opts.delimiter.len() + usize::from(opts.newlines);
    let batch_input = (ENCODE_BATCH / per_byte).max(1);
    let mut buf = Vec::with_capacity(encoded_len(batch_input.min(data.len()), opts) + 1);

    let mut start = 0;
    while start < data.len() {
        let end = (start + batch_input).min(data.len());
        buf.clear();
        encode_range(data, start, end, opts, &mut buf);
        out.write_all(&buf)?;
        start = end;
    }
    log::trace!("encoded {} bytes", data.len());
    Ok(())
}

/// Convert one group of eight `'0'`/`'1'` characters into its byte value.
///
/// Any character other than `'1'` counts as a zero bit.
///
/// # Panics
///
/// Panics if `group` is not exactly eight characters long. The decoder only
/// ever hands over complete (or zero-padded) groups, so a panic here means the
/// grouping logic is broken.
pub fn octet_value(group: &[u8]) -> u8 {
    assert_eq!(
        group.len(),
        8,
        "octet group must be exactly 8 bits, got {}",
        group.len()
    );
    group
        .iter()
        .fold(0u8, |acc, &c| (acc << 1) | u8::from(c == b'1'))
}

/// Number of bytes [`decode`] produces for `data`.
pub fn decoded_len(data: &[u8]) -> usize {
    let ones = memchr::memchr_iter(b'1', data).count();
    let zeros = memchr::memchr_iter(b'0', data).count();
    (ones + zeros).div_ceil(8)
}

/// Decode ASCII binary digits back into bytes.
///
/// Every byte other than `'0'` and `'1'` is ignored. A trailing partial group
/// is padded on the right with zero bits.
pub fn decode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(decoded_len(data));
    out.extend(bits::octets(data));
    out
}

/// Decode data and write the resulting bytes to output in one write.
pub fn decode_to_writer(data: &[u8], out: &mut impl Write) -> io::Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    let decoded = decode(data);
    log::trace!("decoded {} bytes into {}", data.len(), decoded.len());
    out.write_all(&decoded)
}
