// palette.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! Color tables for indexed pixels
use crate::block::CHANNELS;
use crate::error::{Error, Result};
use pix::rgb::Rgb;

/// Color table of RGB entries.
///
/// The number of entries is always a power of two from 2 to 256.
///
/// ```
/// use giflet::Palette;
///
/// let palette = Palette::from_rgb(&[0xFF0000, 0x00FF00])?;
/// assert_eq!(palette.len(), 2);
/// assert_eq!(palette.entry(1), Some([0x00, 0xFF, 0x00]));
/// assert!(Palette::from_rgb(&[0, 0, 0]).is_err());
/// # Ok::<(), giflet::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Color bytes, packed R, G, B
    colors: Vec<u8>,
}

/// Check a color table length
pub(crate) fn check_len(len: usize) -> Result<usize> {
    if (2..=256).contains(&len) && len.is_power_of_two() {
        Ok(len)
    } else {
        Err(Error::InvalidColorTableLen(len))
    }
}

impl Palette {
    /// Create a palette from packed `0xRRGGBB` values
    pub fn from_rgb(colors: &[u32]) -> Result<Self> {
        check_len(colors.len())?;
        let colors = colors
            .iter()
            .flat_map(|rgb| {
                [(rgb >> 16) as u8, (rgb >> 8) as u8, *rgb as u8]
            })
            .collect();
        Ok(Palette { colors })
    }

    /// Create a palette from RGB triples
    pub fn from_triples(colors: &[[u8; 3]]) -> Result<Self> {
        check_len(colors.len())?;
        let colors = colors.iter().flatten().copied().collect();
        Ok(Palette { colors })
    }

    /// Create a palette from packed R, G, B bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % CHANNELS != 0 {
            return Err(Error::InvalidColorTableLen(bytes.len() / CHANNELS));
        }
        check_len(bytes.len() / CHANNELS)?;
        Ok(Palette {
            colors: bytes.to_vec(),
        })
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.colors.len() / CHANNELS
    }

    /// Check if the palette is empty (never true)
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Get log2 of the number of entries
    pub fn len_bits(&self) -> u8 {
        self.len().trailing_zeros() as u8
    }

    /// Get one entry
    pub fn entry(&self, idx: usize) -> Option<[u8; 3]> {
        let i = idx * CHANNELS;
        self.colors
            .get(i..i + CHANNELS)
            .map(|c| [c[0], c[1], c[2]])
    }

    /// Get the packed color bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.colors
    }
}

impl TryFrom<&pix::Palette> for Palette {
    type Error = Error;

    /// Convert a `pix` palette, which must already hold a power-of-two
    /// number of entries
    fn try_from(palette: &pix::Palette) -> Result<Self> {
        check_len(palette.len())?;
        let mut colors = Vec::with_capacity(palette.len() * CHANNELS);
        for i in 0..palette.len() {
            if let Some(clr) = palette.entry(i) {
                colors.push(u8::from(Rgb::red(clr)));
                colors.push(u8::from(Rgb::green(clr)));
                colors.push(u8::from(Rgb::blue(clr)));
            }
        }
        Ok(Palette { colors })
    }
}
