// error.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
use std::fmt;

/// Errors encountered while writing or reading GIF data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Canvas or frame width / height zero.
    InvalidDimensions,
    /// Indexed pixel buffer shorter than frame width * height.
    NotEnoughPixels {
        /// Number of pixels required by the frame
        needed: usize,
        /// Number of pixels supplied
        len: usize,
    },
    /// Color table length not a power of two between 2 and 256.
    InvalidColorTableLen(usize),
    /// Background color index zero or outside the global color table.
    InvalidBackground(u8),
    /// Disposal method in the reserved range (4-7).
    InvalidDisposalMethod(u8),
    /// Transparent color index outside the frame's color table.
    InvalidTransparentColor(u8),
    /// Missing color table for a frame.
    MissingColorTable,
    /// LZW minimum code size out of range.
    InvalidCodeSize(u8),
    /// Caller-supplied buffer too small for the operation.
    BufferTooSmall {
        /// Number of bytes required
        needed: usize,
        /// Number of bytes available
        len: usize,
    },
    /// Frame number out of range.
    FrameOutOfRange(usize),
    /// [Header](block/struct.Header.html) signature malformed.
    MalformedHeader,
    /// GIF version not supported (87a or 89a only).
    UnsupportedVersion([u8; 3]),
    /// Invalid top-level block code.
    InvalidBlockCode(u8),
    /// [GraphicControl](block/struct.GraphicControl.html) block has invalid
    /// length.
    MalformedGraphicControlExtension,
    /// Unknown extension label.
    UnknownExtension(u8),
    /// File ends with incomplete block.
    UnexpectedEndOfFile,
    /// Compressed LZW data invalid or corrupt.
    InvalidLzwData,
    /// Frame location / size larger than screen size.
    InvalidFrameDimensions,
    /// Invalid color index in a frame.
    InvalidColorIndex(u8),
    /// Image larger than specified by
    /// [with_max_image_sz](struct.GifReader.html#method.with_max_image_sz).
    TooLargeImage,
}

/// Giflet result type
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotEnoughPixels { needed, len } => {
                write!(fmt, "not enough pixels: {len} < {needed}")
            }
            Error::BufferTooSmall { needed, len } => {
                write!(fmt, "buffer too small: {len} < {needed}")
            }
            _ => fmt::Debug::fmt(self, fmt),
        }
    }
}

impl std::error::Error for Error {}

/// Non-fatal condition found while decompressing image data.
///
/// Some encoders write slightly more or less LZW data than a frame
/// needs, so these are reported instead of failing the decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    /// Image data ended before the frame was filled.
    ShortImageData {
        /// Number of pixels decoded
        decoded: usize,
        /// Number of pixels in the frame
        expected: usize,
    },
    /// Image data continued past the end of the frame.
    ExtraImageData {
        /// Number of pixels decoded before stopping
        decoded: usize,
        /// Number of pixels in the frame
        expected: usize,
    },
}

impl Warning {
    /// Get the number of pixels decoded
    pub fn decoded(&self) -> usize {
        match self {
            Warning::ShortImageData { decoded, .. } => *decoded,
            Warning::ExtraImageData { decoded, .. } => *decoded,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Warning::ShortImageData { decoded, expected } => write!(
                fmt,
                "image data shorter than expected ({decoded} of {expected})"
            ),
            Warning::ExtraImageData { decoded, expected } => write!(
                fmt,
                "image data longer than expected ({decoded} of {expected})"
            ),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Error::MalformedHeader.to_string(), "MalformedHeader");
        assert_eq!(
            Error::BufferTooSmall { needed: 8, len: 4 }.to_string(),
            "buffer too small: 4 < 8"
        );
        let w = Warning::ShortImageData {
            decoded: 3,
            expected: 4,
        };
        assert_eq!(w.decoded(), 3);
        assert_eq!(w.to_string(), "image data shorter than expected (3 of 4)");
    }
}
