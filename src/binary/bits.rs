//! Two-stage decode pipeline: a filter that turns raw input into bits and a
//! batcher that packs those bits into bytes.

use std::iter::FusedIterator;

use super::core::octet_value;

/// Yields one `bool` per `'0'`/`'1'` byte of the input, skipping everything
/// else. Input bytes are compared as-is; no text decoding is applied.
#[derive(Debug, Clone)]
pub struct Bits<'a> {
    rest: &'a [u8],
}

impl<'a> Bits<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Bits { rest: data }
    }
}

impl Iterator for Bits<'_> {
    type Item = bool;

    #[inline]
    fn next(&mut self) -> Option<bool> {
        // Jump straight over runs of delimiters and whitespace.
        let pos = memchr::memchr2(b'0', b'1', self.rest)?;
        let bit = self.rest[pos] == b'1';
        self.rest = &self.rest[pos + 1..];
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.rest.len()))
    }
}

impl FusedIterator for Bits<'_> {}

/// Packs bits into bytes, most significant bit first.
///
/// A trailing group of 1-7 bits is right-padded with `'0'` and still yields
/// a byte; an empty remainder yields nothing.
#[derive(Debug, Clone)]
pub struct Octets<I> {
    bits: I,
}

impl<I: Iterator<Item = bool>> Octets<I> {
    pub fn new(bits: I) -> Self {
        Octets { bits }
    }
}

impl<I: Iterator<Item = bool>> Iterator for Octets<I> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let mut group = [b'0'; 8];
        let mut filled = 0;
        while filled < group.len() {
            match self.bits.next() {
                Some(bit) => {
                    group[filled] = if bit { b'1' } else { b'0' };
                    filled += 1;
                }
                None => break,
            }
        }
        if filled == 0 {
            return None;
        }
        Some(octet_value(&group))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lo, hi) = self.bits.size_hint();
        (lo.div_ceil(8), hi.map(|h| h.div_ceil(8)))
    }
}

impl<I: FusedIterator<Item = bool>> FusedIterator for Octets<I> {}

/// Builds the full pipeline over `data`.
#[inline]
pub fn octets(data: &[u8]) -> Octets<Bits<'_>> {
    Octets::new(Bits::new(data))
}
