// lzw.rs
//
// Copyright (c) 2020-2025  Douglas Lau
//
//! Lempel-Ziv-Welch compression for GIF
//!
//! Image data is stored as a minimum code size byte, followed by
//! length-prefixed sub-blocks of up to 255 bytes, ending with a
//! zero-length sub-block.
use crate::error::{Error, Result, Warning};
use std::cmp::Ordering;
use std::ops::AddAssign;

/// Maximum data bytes in one sub-block
const SUB_BLOCK_MAX: usize = 255;

/// Code Bits
#[derive(Clone, Copy, Debug, PartialEq)]
struct Bits(u8);

impl From<u8> for Bits {
    fn from(bits: u8) -> Self {
        Bits(bits.min(Self::MAX.0))
    }
}

impl From<Bits> for u8 {
    fn from(bits: Bits) -> Self {
        bits.0
    }
}

impl AddAssign<u8> for Bits {
    fn add_assign(&mut self, rhs: u8) {
        self.0 = (self.0 + rhs).min(Self::MAX.0)
    }
}

impl Bits {
    /// Maximum code bits allowed for GIF
    const MAX: Self = Bits(12);

    /// Get the number of entries
    fn entries(self) -> u16 {
        1 << (self.0 as u16)
    }

    /// Get the bit mask
    fn mask(self) -> u32 {
        (1 << (self.0 as u32)) - 1
    }
}

/// Code type
type Code = u16;

/// Node for code dictionary
trait Node {
    /// Create a new root node
    fn root(byte: u8) -> Self;
}

/// Node for Compressor
#[derive(Clone, Copy, Debug)]
struct CNode {
    /// First child node code
    next: Option<Code>,
    /// Left sibling node code
    left: Option<Code>,
    /// Right sibling node code
    right: Option<Code>,
    /// Byte value
    byte: u8,
}

/// Node for Decompressor
#[derive(Clone, Copy, Debug)]
struct DNode {
    /// Prefix node code
    prefix: Option<Code>,
    /// Byte value
    byte: u8,
}

/// Code dictionary trie
#[derive(Debug)]
struct Trie<N: Node> {
    /// Table of codes
    table: Vec<N>,
    /// Minimum code bits
    min_code_bits: u8,
}

/// Insertion point for a missing trie node
type Link = (Code, Ordering);

/// LZW Data Compressor
pub struct Compressor {
    /// Code dictionary
    trie: Trie<CNode>,
    /// Minimum code bits
    min_code_bits: u8,
    /// Current code bits
    code_bits: Bits,
    /// Current code
    code: u32,
    /// Number of bits in current code
    n_bits: u8,
    /// Number of dictionary resets
    n_resets: usize,
}

/// LZW Data Decompressor
#[derive(Debug)]
pub struct Decompressor {
    /// Code dictionary
    trie: Trie<DNode>,
    /// Minimum code bits
    min_code_bits: u8,
    /// Current code bits
    code_bits: Bits,
    /// Previous code
    prev: Option<Code>,
    /// Current code
    code: u32,
    /// Number of bits in current code
    n_bits: u8,
}

impl Node for CNode {
    fn root(byte: u8) -> Self {
        CNode {
            next: None,
            left: None,
            right: None,
            byte,
        }
    }
}

impl Node for DNode {
    fn root(byte: u8) -> Self {
        DNode { prefix: None, byte }
    }
}

impl CNode {
    /// Get a link code
    fn link(&self, ordering: Ordering) -> Option<Code> {
        match ordering {
            Ordering::Less => self.left,
            Ordering::Equal => self.next,
            Ordering::Greater => self.right,
        }
    }

    /// Set a link code
    fn set_link(&mut self, ordering: Ordering, code: Code) {
        match ordering {
            Ordering::Less => self.left = Some(code),
            Ordering::Equal => self.next = Some(code),
            Ordering::Greater => self.right = Some(code),
        }
    }
}

impl<N: Node> Trie<N> {
    /// Create a new code dictionary
    fn new(min_code_bits: u8) -> Self {
        let mut trie = Trie {
            table: Vec::with_capacity(Bits::MAX.entries().into()),
            min_code_bits,
        };
        trie.reset();
        trie
    }

    /// Get the clear code
    fn clear_code(&self) -> Code {
        1 << self.min_code_bits
    }

    /// Get the end code
    fn end_code(&self) -> Code {
        self.clear_code() + 1
    }

    /// Get the next available code
    fn next_code(&self) -> Code {
        self.table.len() as Code
    }

    /// Check if the dictionary is full
    fn is_full(&self) -> bool {
        self.next_code() >= Bits::MAX.entries()
    }

    /// Reset the dictionary
    fn reset(&mut self) {
        self.table.clear();
        for byte in 0..self.clear_code() {
            self.table.push(N::root(byte as u8));
        }
        self.table.push(N::root(0)); // clear code
        self.table.push(N::root(0)); // end code
    }
}

impl Trie<CNode> {
    /// Search for a child node
    fn search(&self, code: Code, byte: u8) -> std::result::Result<Code, Link> {
        let mut parent = code;
        let mut ordering = Ordering::Equal;
        while let Some(child) = self.table[parent as usize].link(ordering) {
            ordering = byte.cmp(&self.table[child as usize].byte);
            if ordering == Ordering::Equal {
                return Ok(child);
            }
            parent = child;
        }
        Err((parent, ordering))
    }

    /// Insert a node at a link
    fn insert(&mut self, (parent, ordering): Link, byte: u8) {
        let code = self.next_code();
        debug_assert!(code < Bits::MAX.entries());
        self.table[parent as usize].set_link(ordering, code);
        self.table.push(CNode::root(byte));
    }
}

impl Compressor {
    /// Create a new compressor.
    ///
    /// Minimum code bits must be between 2 and 8.
    pub fn new(min_code_bits: u8) -> Result<Self> {
        if !(2..=8).contains(&min_code_bits) {
            return Err(Error::InvalidCodeSize(min_code_bits));
        }
        Ok(Compressor {
            trie: Trie::new(min_code_bits),
            min_code_bits,
            code_bits: Bits::from(min_code_bits + 1),
            code: 0,
            n_bits: 0,
            n_resets: 0,
        })
    }

    /// Pack a code into a buffer (LSB first)
    fn pack(&mut self, code: Code, buffer: &mut Vec<u8>) {
        self.code |= (code as u32) << self.n_bits;
        self.n_bits += u8::from(self.code_bits);
        while self.n_bits >= 8 {
            buffer.push(self.code as u8);
            self.code >>= 8;
            self.n_bits -= 8;
        }
    }

    /// Reset the dictionary after a clear code
    fn reset(&mut self) {
        self.trie.reset();
        self.code_bits = Bits::from(self.min_code_bits + 1);
        self.n_resets += 1;
    }

    /// Compress palette indices into a code stream.
    ///
    /// Indices are masked to the minimum code bits.  The stream starts
    /// with a clear code and ends with an end code; any partial byte is
    /// flushed at the end.
    pub fn compress(&mut self, indices: &[u8], buffer: &mut Vec<u8>) {
        let mask = (self.trie.clear_code() - 1) as u8;
        self.trie.reset();
        self.code_bits = Bits::from(self.min_code_bits + 1);
        self.pack(self.trie.clear_code(), buffer);
        if let Some((first, rest)) = indices.split_first() {
            let mut code = Code::from(first & mask);
            for idx in rest {
                let byte = idx & mask;
                match self.trie.search(code, byte) {
                    Ok(c) => code = c,
                    Err(link) => {
                        self.pack(code, buffer);
                        if self.trie.is_full() {
                            self.pack(self.trie.clear_code(), buffer);
                            self.reset();
                        } else {
                            if self.trie.next_code() >= self.code_bits.entries()
                            {
                                self.code_bits += 1;
                            }
                            self.trie.insert(link, byte);
                        }
                        code = Code::from(byte);
                    }
                }
            }
            self.pack(code, buffer);
        }
        self.pack(self.trie.end_code(), buffer);
        if self.n_bits > 0 {
            buffer.push(self.code as u8);
            self.code = 0;
            self.n_bits = 0;
        }
        debug!(
            "compressed {} indices: {} bytes, {} resets",
            indices.len(),
            buffer.len(),
            self.n_resets
        );
    }
}

impl Trie<DNode> {
    /// Get the length and first byte of a code's sequence
    fn chase(&self, code: Code) -> (usize, u8) {
        let mut len = 1;
        let mut node = self.table[code as usize];
        while let Some(prefix) = node.prefix {
            node = self.table[prefix as usize];
            len += 1;
        }
        (len, node.byte)
    }

    /// Write a code's sequence into a buffer (walking backward)
    fn write(&self, code: Code, buffer: &mut [u8]) {
        let mut node = self.table[code as usize];
        for b in buffer.iter_mut().rev() {
            *b = node.byte;
            if let Some(prefix) = node.prefix {
                node = self.table[prefix as usize];
            }
        }
    }

    /// Push a node into the dictionary
    fn push_node(&mut self, prefix: Code, byte: u8) {
        self.table.push(DNode {
            prefix: Some(prefix),
            byte,
        })
    }
}

/// Reader for bytes in a sequence of sub-blocks
struct SubBlocks<'a> {
    /// Remaining data (starting at a sub-block size byte)
    data: &'a [u8],
    /// Bytes remaining in current sub-block
    remaining: usize,
}

impl<'a> SubBlocks<'a> {
    fn new(data: &'a [u8]) -> Self {
        SubBlocks { data, remaining: 0 }
    }
}

impl Iterator for SubBlocks<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.remaining == 0 {
            let (&len, rest) = self.data.split_first()?;
            self.data = if len > 0 { rest } else { &[] };
            self.remaining = len.into();
        }
        let (&byte, rest) = self.data.split_first()?;
        self.data = rest;
        self.remaining -= 1;
        Some(byte)
    }
}

impl Decompressor {
    /// Create a new decompressor.
    ///
    /// Minimum code bits must be between 1 and 11.
    pub fn new(min_code_bits: u8) -> Result<Self> {
        if !(1..=11).contains(&min_code_bits) {
            return Err(Error::InvalidCodeSize(min_code_bits));
        }
        Ok(Decompressor {
            trie: Trie::new(min_code_bits),
            min_code_bits,
            code_bits: Bits::from(min_code_bits + 1),
            prev: None,
            code: 0,
            n_bits: 0,
        })
    }

    /// Unpack one code from sub-block bytes
    fn unpack(&mut self, bytes: &mut SubBlocks) -> Option<Code> {
        let b = u8::from(self.code_bits);
        while self.n_bits < b {
            let byte = bytes.next()?;
            self.code |= (byte as u32) << self.n_bits;
            self.n_bits += 8;
        }
        let code = (self.code & self.code_bits.mask()) as Code;
        self.code >>= b;
        self.n_bits -= b;
        Some(code)
    }

    /// Reset the dictionary after a clear code
    fn reset(&mut self) {
        self.trie.reset();
        self.code_bits = Bits::from(self.min_code_bits + 1);
        self.prev = None;
    }

    /// Decompress sub-blocks into a buffer of palette indices.
    ///
    /// The data starts at the first sub-block size byte.  Decoding stops
    /// at an end code, at the end of data, or when the buffer would
    /// overflow.  Returns the number of indices written and whether the
    /// buffer was overrun.
    pub fn decompress(
        &mut self,
        data: &[u8],
        buffer: &mut [u8],
    ) -> Result<(usize, bool)> {
        let mut bytes = SubBlocks::new(data);
        let mut pos = 0;
        while let Some(code) = self.unpack(&mut bytes) {
            if code == self.trie.clear_code() {
                self.reset();
                continue;
            }
            if code == self.trie.end_code() {
                break;
            }
            let next_code = self.trie.next_code();
            let (chase, extra) = match (self.prev, code.cmp(&next_code)) {
                (_, Ordering::Less) => (code, false),
                // code defined by this step: prev + first byte of prev
                (Some(prev), Ordering::Equal) => (prev, true),
                _ => return Err(Error::InvalidLzwData),
            };
            let (len, first) = self.trie.chase(chase);
            let end = pos + len;
            if end + usize::from(extra) > buffer.len() {
                return Ok((pos, true));
            }
            self.trie.write(chase, &mut buffer[pos..end]);
            if extra {
                buffer[end] = first;
            }
            pos = end + usize::from(extra);
            if let Some(prev) = self.prev {
                if !self.trie.is_full() {
                    self.trie.push_node(prev, first);
                    if self.trie.next_code() >= self.code_bits.entries() {
                        self.code_bits += 1;
                    }
                }
            }
            self.prev = Some(code);
        }
        Ok((pos, false))
    }
}

/// Write data as a sequence of sub-blocks, with terminator
pub(crate) fn write_sub_blocks(data: &[u8], buffer: &mut Vec<u8>) {
    for chunk in data.chunks(SUB_BLOCK_MAX) {
        buffer.push(chunk.len() as u8); // block size
        buffer.extend_from_slice(chunk);
    }
    buffer.push(0); // block size
}

/// Compress palette indices into image data.
///
/// Appends the minimum code size byte, the code stream as sub-blocks,
/// and a zero-length terminator.
///
/// ```
/// let mut data = vec![];
/// giflet::lzw::compress(2, &[1, 0, 0, 1], &mut data)?;
/// assert_eq!(data, [0x02, 0x03, 0x0C, 0x10, 0x05, 0x00]);
/// # Ok::<(), giflet::Error>(())
/// ```
pub fn compress(
    min_code_size: u8,
    indices: &[u8],
    buffer: &mut Vec<u8>,
) -> Result<()> {
    let mut compressor = Compressor::new(min_code_size)?;
    let mut codes = Vec::with_capacity(indices.len() / 2 + 8);
    compressor.compress(indices, &mut codes);
    buffer.push(min_code_size);
    write_sub_blocks(&codes, buffer);
    Ok(())
}

/// Decompress image data into palette indices.
///
/// The data starts with the minimum code size byte.  The whole buffer
/// is expected to be filled; a shorter or longer stream produces a
/// [Warning](enum.Warning.html) rather than an error.
///
/// ```
/// let mut indices = [0; 4];
/// let warning = giflet::lzw::decompress(
///     &[0x02, 0x03, 0x0C, 0x10, 0x05, 0x00],
///     &mut indices,
/// )?;
/// assert_eq!(warning, None);
/// assert_eq!(indices, [1, 0, 0, 1]);
/// # Ok::<(), giflet::Error>(())
/// ```
pub fn decompress(data: &[u8], buffer: &mut [u8]) -> Result<Option<Warning>> {
    let (&min_code_size, data) =
        data.split_first().ok_or(Error::UnexpectedEndOfFile)?;
    let mut decompressor = Decompressor::new(min_code_size)?;
    let expected = buffer.len();
    let (decoded, overrun) = decompressor.decompress(data, buffer)?;
    let warning = if overrun {
        Some(Warning::ExtraImageData { decoded, expected })
    } else if decoded != expected {
        Some(Warning::ShortImageData { decoded, expected })
    } else {
        None
    };
    if let Some(w) = &warning {
        warn!("{}", w);
    }
    Ok(warning)
}

#[cfg(test)]
mod test {
    use super::*;

    /// Simple pseudo-random index generator
    fn indices(len: usize, colors: u32, mut seed: u32) -> Vec<u8> {
        (0..len)
            .map(|_| {
                seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                ((seed >> 16) % colors) as u8
            })
            .collect()
    }

    fn round_trip(min_code_size: u8, data: &[u8]) {
        let mut buf = vec![];
        compress(min_code_size, data, &mut buf).unwrap();
        let mut out = vec![0; data.len()];
        assert_eq!(decompress(&buf, &mut out).unwrap(), None);
        assert_eq!(out, data);
    }

    #[test]
    fn clear_and_end() {
        let mut c = Compressor::new(2).unwrap();
        let mut buf = vec![];
        c.compress(&[0], &mut buf);
        // clear (4), 0, end (5) as 3-bit codes
        assert_eq!(buf, [0x44, 0x01]);
    }

    #[test]
    fn empty() {
        let mut buf = vec![];
        compress(2, &[], &mut buf).unwrap();
        let mut out: [u8; 0] = [];
        assert_eq!(decompress(&buf, &mut out).unwrap(), None);
    }

    #[test]
    fn code_sizes() {
        assert_eq!(Compressor::new(1).err(), Some(Error::InvalidCodeSize(1)));
        assert_eq!(Compressor::new(9).err(), Some(Error::InvalidCodeSize(9)));
        assert!(Decompressor::new(0).is_err());
        assert!(Decompressor::new(12).is_err());
        let mut out = [0; 4];
        assert_eq!(
            decompress(&[12, 1, 0, 0], &mut out),
            Err(Error::InvalidCodeSize(12))
        );
        assert_eq!(decompress(&[], &mut out), Err(Error::UnexpectedEndOfFile));
    }

    #[test]
    fn masked_indices() {
        let mut buf = vec![];
        compress(2, &[0xFD, 0x02, 0x07], &mut buf).unwrap();
        let mut out = [0; 3];
        decompress(&buf, &mut out).unwrap();
        assert_eq!(out, [1, 2, 3]);
    }

    #[test]
    fn repeated() {
        for min_code_size in 2..=8 {
            round_trip(min_code_size, &[0; 1]);
            round_trip(min_code_size, &[1; 2]);
            round_trip(min_code_size, &[3; 1000]);
        }
    }

    #[test]
    fn random() {
        for min_code_size in 2..=8 {
            let colors = 1 << min_code_size;
            round_trip(min_code_size, &indices(5000, colors, 7));
        }
    }

    #[test]
    fn table_reset() {
        let data = indices(100_000, 256, 42);
        let mut c = Compressor::new(8).unwrap();
        let mut codes = vec![];
        c.compress(&data, &mut codes);
        assert!(c.n_resets > 0);
        round_trip(8, &data);
        let data = indices(60_000, 4, 3);
        round_trip(2, &data);
    }

    #[test]
    fn sub_blocks() {
        let mut buf = vec![];
        write_sub_blocks(&[7; 300], &mut buf);
        assert_eq!(buf.len(), 1 + 255 + 1 + 45 + 1);
        assert_eq!(buf[0], 255);
        assert_eq!(buf[256], 45);
        assert_eq!(buf[302], 0);
        let mut buf = vec![];
        write_sub_blocks(&[7; 255], &mut buf);
        assert_eq!(buf.len(), 257);
        assert_eq!(buf[256], 0);
        let bytes: Vec<u8> = SubBlocks::new(&[2, 1, 2, 1, 3, 0, 9]).collect();
        assert_eq!(bytes, [1, 2, 3]);
    }

    #[test]
    fn short_stream() {
        let mut buf = vec![];
        compress(2, &[1, 2, 3], &mut buf).unwrap();
        let mut out = [0; 5];
        assert_eq!(
            decompress(&buf, &mut out).unwrap(),
            Some(Warning::ShortImageData {
                decoded: 3,
                expected: 5,
            })
        );
        assert_eq!(out[..3], [1, 2, 3]);
    }

    #[test]
    fn long_stream() {
        let mut buf = vec![];
        compress(2, &[1, 1, 1, 1, 1, 1], &mut buf).unwrap();
        let mut out = [0; 2];
        let warning = decompress(&buf, &mut out).unwrap().unwrap();
        assert!(matches!(warning, Warning::ExtraImageData { expected: 2, .. }));
        assert!(warning.decoded() <= 2);
    }

    #[test]
    fn invalid_code() {
        // clear (4), then undefined code 7
        let mut out = [0; 4];
        assert_eq!(
            decompress(&[2, 1, 0b0011_1100, 0], &mut out),
            Err(Error::InvalidLzwData)
        );
    }

    #[test]
    fn missing_end_code() {
        // clear (4), 1 -- stream ends without end code
        let mut out = [0; 1];
        assert_eq!(decompress(&[2, 1, 0x0C, 0], &mut out).unwrap(), None);
        assert_eq!(out, [1]);
    }
}
