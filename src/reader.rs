// reader.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! GIF reader for borrowed buffers
use crate::block::*;
use crate::error::{Error, Result, Warning};
use crate::lzw;
use pix::rgb::SRgba8;
use pix::Raster;

/// Frame descriptor, parsed from an image descriptor block
///
/// Palette and image data are referenced by offset into the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    desc: ImageDesc,
    /// Offset and number of entries of the effective palette
    palette: Option<(usize, usize)>,
    /// Offset of LZW data (starting at minimum code size byte)
    data_offset: usize,
    /// Length of LZW data, including sub-block terminator
    data_len: usize,
    /// Graphic control applying to this frame
    control: GraphicControl,
}

impl FrameInfo {
    /// Get the left edge on the canvas
    pub fn left(&self) -> u16 {
        self.desc.left()
    }

    /// Get the top edge on the canvas
    pub fn top(&self) -> u16 {
        self.desc.top()
    }

    /// Get the frame width
    pub fn width(&self) -> u16 {
        self.desc.width()
    }

    /// Get the frame height
    pub fn height(&self) -> u16 {
        self.desc.height()
    }

    /// Check if the frame has a local color table
    pub fn has_local_palette(&self) -> bool {
        !self.desc.color_table_config().is_empty()
    }

    /// Get the byte offset of the effective palette, if any
    pub fn palette_offset(&self) -> Option<usize> {
        self.palette.map(|(offset, _)| offset)
    }

    /// Get the number of entries in the effective palette
    pub fn palette_len(&self) -> usize {
        self.palette.map_or(0, |(_, len)| len)
    }

    /// Get the byte offset of the image data
    pub fn data_offset(&self) -> usize {
        self.data_offset
    }

    /// Get the byte length of the image data
    pub fn data_len(&self) -> usize {
        self.data_len
    }

    /// Get the transparent color index
    pub fn transparent_color(&self) -> Option<u8> {
        self.control.transparent_color()
    }

    /// Check if rows are stored interlaced
    pub fn interlaced(&self) -> bool {
        self.desc.interlaced()
    }

    /// Get the delay time in centiseconds
    pub fn delay_time_cs(&self) -> u16 {
        self.control.delay_time_cs()
    }

    /// Get the disposal method
    pub fn disposal_method(&self) -> DisposalMethod {
        self.control.disposal_method()
    }

    /// Get the image size in pixels
    fn image_sz(&self) -> usize {
        self.desc.image_sz()
    }
}

/// Pixel channel order for blitting
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ChannelOrder {
    Bgra,
    Rgba,
}

/// GIF reader
///
/// The whole buffer is parsed on creation; frames are decoded on request.
///
/// ## Example
/// ```
/// use giflet::GifReader;
///
/// let gif = [
///     0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x02, 0x00, 0x80,
///     0x01, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x2C, 0x00, 0x00,
///     0x00, 0x00, 0x02, 0x00, 0x02, 0x00, 0x00, 0x02, 0x03, 0x0C, 0x10,
///     0x05, 0x00, 0x3B,
/// ];
/// let reader = GifReader::new(&gif)?;
/// assert_eq!(reader.num_frames(), 1);
/// let mut pixels = [0; 2 * 2 * 4];
/// assert_eq!(reader.decode_and_blit_frame_rgba(0, &mut pixels)?, None);
/// assert_eq!(&pixels[..8], &[255, 255, 255, 255, 0, 0, 0, 255]);
/// # Ok::<(), giflet::Error>(())
/// ```
pub struct GifReader<'a> {
    buf: &'a [u8],
    header: Header,
    screen: LogicalScreenDesc,
    /// Offset and number of entries of global color table
    global_palette: Option<(usize, usize)>,
    loop_count: Option<u16>,
    frames: Vec<FrameInfo>,
    max_image_sz: Option<usize>,
}

/// Block parser, tracking a position in the buffer
struct Parser<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Take a number of bytes
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos + len;
        let bytes = self
            .buf
            .get(self.pos..end)
            .ok_or(Error::UnexpectedEndOfFile)?;
        self.pos = end;
        Ok(bytes)
    }

    /// Take one byte
    fn take_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Get remaining bytes
    fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos.min(self.buf.len())..]
    }

    /// Take a color table, returning its offset and number of entries
    fn color_table(
        &mut self,
        tbl: &ColorTableConfig,
    ) -> Result<Option<(usize, usize)>> {
        if tbl.is_empty() {
            return Ok(None);
        }
        let offset = self.pos;
        self.take(tbl.size_bytes())?;
        Ok(Some((offset, tbl.len())))
    }

    /// Skip sub-blocks up to and including the terminator
    fn skip_sub_blocks(&mut self) -> Result<()> {
        loop {
            let len = self.take_u8()?;
            if len == 0 {
                return Ok(());
            }
            self.take(len.into())?;
        }
    }
}

impl Header {
    /// Decode a Header block from a buffer
    fn from_buf(buf: &[u8]) -> Result<Self> {
        if &buf[..4] == b"GIF8" && buf[5] == b'a' {
            let version = [buf[3], buf[4], buf[5]];
            match &version {
                b"87a" | b"89a" => Ok(Header::with_version(version)),
                _ => Err(Error::UnsupportedVersion(version)),
            }
        } else {
            Err(Error::MalformedHeader)
        }
    }
}

impl LogicalScreenDesc {
    /// Decode a Logical Screen Descriptor block from a buffer
    fn from_buf(buf: &[u8]) -> Self {
        let width = u16::from_le_bytes([buf[0], buf[1]]);
        let height = u16::from_le_bytes([buf[2], buf[3]]);
        LogicalScreenDesc::default()
            .with_screen_width(width)
            .with_screen_height(height)
            .with_flags(buf[4])
            .with_background_color_idx(buf[5])
            .with_pixel_aspect_ratio(buf[6])
    }
}

impl ImageDesc {
    /// Decode an Image Descriptor block from a buffer (after separator)
    fn from_buf(buf: &[u8]) -> Self {
        let left = u16::from_le_bytes([buf[0], buf[1]]);
        let top = u16::from_le_bytes([buf[2], buf[3]]);
        let width = u16::from_le_bytes([buf[4], buf[5]]);
        let height = u16::from_le_bytes([buf[6], buf[7]]);
        Self::default()
            .with_left(left)
            .with_top(top)
            .with_width(width)
            .with_height(height)
            .with_flags(buf[8])
    }
}

impl GraphicControl {
    /// Decode a Graphic Control extension (after label)
    fn from_buf(buf: &[u8]) -> Result<Self> {
        // block size, 4 bytes, terminator
        if buf[0] != Self::SIZE || buf[5] != 0 {
            return Err(Error::MalformedGraphicControlExtension);
        }
        let mut control = GraphicControl::default();
        control.set_flags(buf[1]);
        control.set_delay_time_cs(u16::from_le_bytes([buf[2], buf[3]]));
        control.set_transparent_color_idx(buf[4]);
        Ok(control)
    }
}

impl<'a> GifReader<'a> {
    /// Parse a GIF from a buffer.
    ///
    /// All blocks are parsed up to the trailer; bytes after it are ignored.
    pub fn new(buf: &'a [u8]) -> Result<Self> {
        let mut parser = Parser { buf, pos: 0 };
        let header = Header::from_buf(parser.take(Header::SIZE)?)?;
        let screen =
            LogicalScreenDesc::from_buf(parser.take(LogicalScreenDesc::SIZE)?);
        let global_palette = parser.color_table(&screen.color_table_config())?;
        let mut loop_count = None;
        let mut control = None;
        let mut frames = vec![];
        loop {
            let code = match parser.take_u8() {
                Ok(code) => code,
                Err(_) => {
                    warn!("missing trailer after {} frames", frames.len());
                    break;
                }
            };
            match BlockCode::from_u8(code) {
                Some(BlockCode::Extension_) => {
                    Self::parse_extension(
                        &mut parser,
                        &mut control,
                        &mut loop_count,
                    )?;
                }
                Some(BlockCode::ImageDesc_) => {
                    let desc = ImageDesc::from_buf(parser.take(ImageDesc::SIZE)?);
                    let palette = parser
                        .color_table(&desc.color_table_config())?
                        .or(global_palette);
                    let data_offset = parser.pos;
                    parser.take_u8()?; // minimum code size
                    parser.skip_sub_blocks()?;
                    let frame = FrameInfo {
                        desc,
                        palette,
                        data_offset,
                        data_len: parser.pos - data_offset,
                        control: control.take().unwrap_or_default(),
                    };
                    debug!("frame {}: {:?}", frames.len(), frame);
                    frames.push(frame);
                }
                Some(BlockCode::Trailer_) => break,
                None => return Err(Error::InvalidBlockCode(code)),
            }
        }
        if parser.pos < buf.len() {
            debug!("{} bytes after trailer", buf.len() - parser.pos);
        }
        Ok(GifReader {
            buf,
            header,
            screen,
            global_palette,
            loop_count,
            frames,
            max_image_sz: Some(1 << 25),
        })
    }

    /// Parse one extension block (after introducer)
    fn parse_extension(
        parser: &mut Parser,
        control: &mut Option<GraphicControl>,
        loop_count: &mut Option<u16>,
    ) -> Result<()> {
        match ExtensionCode::from(parser.take_u8()?) {
            ExtensionCode::GraphicControl_ => {
                *control = Some(GraphicControl::from_buf(parser.take(6)?)?);
            }
            ExtensionCode::Application_ => {
                match LoopCountExt::from_sub_blocks(parser.remaining()) {
                    Some(ext) => {
                        debug!("loop count: {}", ext.loop_count());
                        *loop_count = Some(ext.loop_count());
                        parser.take(LoopCountExt::SIZE)?;
                    }
                    None => parser.skip_sub_blocks()?,
                }
            }
            ExtensionCode::Comment_ | ExtensionCode::PlainText_ => {
                parser.skip_sub_blocks()?;
            }
            ExtensionCode::Unknown_(label) => {
                return Err(Error::UnknownExtension(label));
            }
        }
        Ok(())
    }

    /// Set the maximum image size (in pixels) to allow when decoding.
    ///
    /// The default is `Some(1 << 25)`; `None` disables the check.
    pub fn with_max_image_sz(mut self, max_image_sz: Option<usize>) -> Self {
        self.max_image_sz = max_image_sz;
        self
    }

    /// Get the GIF version (`87a` or `89a`)
    pub fn version(&self) -> [u8; 3] {
        self.header.version()
    }

    /// Get the canvas width
    pub fn width(&self) -> u16 {
        self.screen.screen_width()
    }

    /// Get the canvas height
    pub fn height(&self) -> u16 {
        self.screen.screen_height()
    }

    /// Get the background color index
    pub fn background_color_idx(&self) -> u8 {
        self.screen.background_color_idx()
    }

    /// Get the animation loop count.
    ///
    /// `None` means no loop extension (play once); `Some(0)` loops forever.
    pub fn loop_count(&self) -> Option<u16> {
        self.loop_count
    }

    /// Get the number of frames
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Get info for one frame
    pub fn frame_info(&self, n: usize) -> Result<&FrameInfo> {
        self.frames.get(n).ok_or(Error::FrameOutOfRange(n))
    }

    /// Get an iterator of all frames
    pub fn frames(&self) -> impl Iterator<Item = &FrameInfo> {
        self.frames.iter()
    }

    /// Get the global color table bytes (packed R, G, B)
    pub fn global_palette(&self) -> Option<&'a [u8]> {
        self.global_palette.map(|tbl| self.table(tbl))
    }

    /// Get the effective color table bytes of a frame (packed R, G, B)
    pub fn frame_palette(&self, frame: &FrameInfo) -> Option<&'a [u8]> {
        frame.palette.map(|tbl| self.table(tbl))
    }

    /// Get color table bytes
    fn table(&self, (offset, len): (usize, usize)) -> &'a [u8] {
        &self.buf[offset..offset + len * CHANNELS]
    }

    /// Decode stored palette indices of a frame
    fn decode_stored(
        &self,
        frame: &FrameInfo,
    ) -> Result<(Vec<u8>, Option<Warning>)> {
        let image_sz = frame.image_sz();
        if let Some(sz) = self.max_image_sz {
            if image_sz > sz {
                return Err(Error::TooLargeImage);
            }
        }
        let mut indices = vec![0; image_sz];
        let data = &self.buf[frame.data_offset..][..frame.data_len];
        let warning = lzw::decompress(data, &mut indices)?;
        Ok((indices, warning))
    }

    /// Decode the palette indices of one frame.
    ///
    /// Indices are in row-major order, top to bottom, with interlaced
    /// rows already rearranged.  If the image data is short, remaining
    /// indices are zero.
    pub fn decode_frame_indices(
        &self,
        n: usize,
    ) -> Result<(Vec<u8>, Option<Warning>)> {
        let frame = self.frame_info(n)?;
        let (stored, warning) = self.decode_stored(frame)?;
        if !frame.interlaced() {
            return Ok((stored, warning));
        }
        let width = usize::from(frame.width());
        let mut indices = vec![0; stored.len()];
        if width > 0 {
            let rows = interlaced_rows(frame.height().into());
            for (row, src) in rows.zip(stored.chunks_exact(width)) {
                let start = row * width;
                indices[start..start + width].copy_from_slice(src);
            }
        }
        Ok((indices, warning))
    }

    /// Decode one frame and blit it onto a canvas of BGRA pixels.
    ///
    /// The pixel buffer must hold `width * height * 4` bytes for the full
    /// canvas.  Transparent pixels leave the destination unchanged.
    pub fn decode_and_blit_frame_bgra(
        &self,
        n: usize,
        pixels: &mut [u8],
    ) -> Result<Option<Warning>> {
        self.decode_and_blit(n, pixels, ChannelOrder::Bgra)
    }

    /// Decode one frame and blit it onto a canvas of RGBA pixels.
    ///
    /// The pixel buffer must hold `width * height * 4` bytes for the full
    /// canvas.  Transparent pixels leave the destination unchanged.
    pub fn decode_and_blit_frame_rgba(
        &self,
        n: usize,
        pixels: &mut [u8],
    ) -> Result<Option<Warning>> {
        self.decode_and_blit(n, pixels, ChannelOrder::Rgba)
    }

    /// Decode one frame onto a cleared canvas raster
    pub fn decode_raster(
        &self,
        n: usize,
    ) -> Result<(Raster<SRgba8>, Option<Warning>)> {
        let mut raster =
            Raster::with_clear(self.width().into(), self.height().into());
        let warning = self.decode_and_blit(
            n,
            raster.as_u8_slice_mut(),
            ChannelOrder::Rgba,
        )?;
        Ok((raster, warning))
    }

    /// Decode one frame and blit it onto a canvas
    fn decode_and_blit(
        &self,
        n: usize,
        pixels: &mut [u8],
        order: ChannelOrder,
    ) -> Result<Option<Warning>> {
        let frame = self.frame_info(n)?;
        let canvas_width = usize::from(self.width());
        let needed = canvas_width * usize::from(self.height()) * 4;
        if pixels.len() < needed {
            return Err(Error::BufferTooSmall {
                needed,
                len: pixels.len(),
            });
        }
        let left = usize::from(frame.left());
        let top = usize::from(frame.top());
        let width = usize::from(frame.width());
        let height = usize::from(frame.height());
        if left + width > canvas_width
            || top + height > usize::from(self.height())
        {
            return Err(Error::InvalidFrameDimensions);
        }
        let palette = self
            .frame_palette(frame)
            .ok_or(Error::MissingColorTable)?;
        let (stored, warning) = self.decode_stored(frame)?;
        if width == 0 {
            return Ok(warning);
        }
        let decoded = warning.map_or(stored.len(), |w| w.decoded());
        let stored = &stored[..decoded.min(stored.len())];
        let transparent = frame.transparent_color();
        let colors = palette.len() / CHANNELS;
        if let Some(&idx) = stored.iter().find(|&&idx| {
            Some(idx) != transparent && usize::from(idx) >= colors
        }) {
            return Err(Error::InvalidColorIndex(idx));
        }
        let rows: Box<dyn Iterator<Item = usize>> = if frame.interlaced() {
            Box::new(interlaced_rows(height))
        } else {
            Box::new(0..height)
        };
        for (row, src) in rows.zip(stored.chunks(width)) {
            let start = ((top + row) * canvas_width + left) * 4;
            let dst = &mut pixels[start..start + src.len() * 4];
            for (&idx, px) in src.iter().zip(dst.chunks_exact_mut(4)) {
                if Some(idx) == transparent {
                    continue;
                }
                let i = usize::from(idx) * CHANNELS;
                let (r, g, b) = (palette[i], palette[i + 1], palette[i + 2]);
                match order {
                    ChannelOrder::Bgra => px.copy_from_slice(&[b, g, r, 255]),
                    ChannelOrder::Rgba => px.copy_from_slice(&[r, g, b, 255]),
                }
            }
        }
        Ok(warning)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::palette::Palette;
    use crate::writer::{FrameOptions, GifWriter, WriterOptions};

    #[rustfmt::skip]
    const SIMPLE_1: &[u8] = &[
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x0A, 0x00,
        0x0A, 0x00, 0x91, 0x00, 0x00, 0xFF, 0xFF, 0xFF,
        0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00,
        0x00, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x2C, 0x00, 0x00, 0x00, 0x00, 0x0A, 0x00,
        0x0A, 0x00, 0x00, 0x02, 0x16, 0x8C, 0x2D, 0x99,
        0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02, 0x75,
        0xEC, 0x95, 0xFA, 0xA8, 0xDE, 0x60, 0x8C, 0x04,
        0x91, 0x4C, 0x01, 0x00, 0x3B,
    ];

    #[rustfmt::skip]
    const SIMPLE_1_IMAGE: &[u8] = &[
        1, 1, 1, 1, 1, 2, 2, 2, 2, 2,
        1, 1, 1, 1, 1, 2, 2, 2, 2, 2,
        1, 1, 1, 1, 1, 2, 2, 2, 2, 2,
        1, 1, 1, 0, 0, 0, 0, 2, 2, 2,
        1, 1, 1, 0, 0, 0, 0, 2, 2, 2,
        2, 2, 2, 0, 0, 0, 0, 1, 1, 1,
        2, 2, 2, 0, 0, 0, 0, 1, 1, 1,
        2, 2, 2, 2, 2, 1, 1, 1, 1, 1,
        2, 2, 2, 2, 2, 1, 1, 1, 1, 1,
        2, 2, 2, 2, 2, 1, 1, 1, 1, 1,
    ];

    /// Encode one frame on a canvas
    fn encode(
        width: u16,
        height: u16,
        options: WriterOptions,
        pixels: &[u8],
        frame: &FrameOptions,
    ) -> Vec<u8> {
        let mut writer =
            GifWriter::new(vec![0; 4096], width, height, options).unwrap();
        writer
            .add_frame(0, 0, width, height, pixels, frame)
            .unwrap();
        let len = writer.end().unwrap();
        let mut buf = writer.into_inner();
        buf.truncate(len);
        buf
    }

    fn two_colors() -> WriterOptions {
        let palette = Palette::from_rgb(&[0xFF0000, 0x00FF00]).unwrap();
        WriterOptions::default().with_palette(palette)
    }

    #[test]
    fn simple_1() -> Result<()> {
        let reader = GifReader::new(SIMPLE_1)?;
        assert_eq!(reader.version(), *b"89a");
        assert_eq!((reader.width(), reader.height()), (10, 10));
        assert_eq!(reader.num_frames(), 1);
        assert_eq!(reader.loop_count(), None);
        let frame = reader.frame_info(0)?;
        assert_eq!(frame.transparent_color(), None);
        assert_eq!(frame.palette_offset(), Some(13));
        assert_eq!(frame.palette_len(), 4);
        assert!(!frame.has_local_palette());
        assert_eq!(frame.data_offset(), 43);
        assert_eq!(frame.data_len(), 25);
        let (indices, warning) = reader.decode_frame_indices(0)?;
        assert_eq!(warning, None);
        assert_eq!(&indices[..], SIMPLE_1_IMAGE);
        Ok(())
    }

    #[test]
    fn one_pixel() -> Result<()> {
        let gif = encode(1, 1, two_colors(), &[0], &FrameOptions::default());
        let reader = GifReader::new(&gif)?;
        assert_eq!(reader.num_frames(), 1);
        assert_eq!(reader.frame_info(0)?.width(), 1);
        let mut pixels = [0; 4];
        assert_eq!(reader.decode_and_blit_frame_rgba(0, &mut pixels)?, None);
        assert_eq!(pixels, [255, 0, 0, 255]);
        reader.decode_and_blit_frame_bgra(0, &mut pixels)?;
        assert_eq!(pixels, [0, 0, 255, 255]);
        assert_eq!(
            reader.frame_info(1).err(),
            Some(Error::FrameOutOfRange(1))
        );
        Ok(())
    }

    #[test]
    fn loop_count() -> Result<()> {
        let options = two_colors().with_loop_count(Some(0));
        let gif = encode(1, 1, options, &[0], &FrameOptions::default());
        assert_eq!(GifReader::new(&gif)?.loop_count(), Some(0));
        let gif = encode(1, 1, two_colors(), &[0], &FrameOptions::default());
        assert_eq!(GifReader::new(&gif)?.loop_count(), None);
        Ok(())
    }

    #[test]
    fn round_trip() -> Result<()> {
        let palette = Palette::from_rgb(&[0x123456; 64])?;
        let pixels: Vec<u8> = (0..37 * 23).map(|i| (i * 7 % 64) as u8).collect();
        let frame = FrameOptions::default()
            .with_palette(palette.clone())
            .with_delay_time_cs(25)
            .with_disposal_method(DisposalMethod::Previous)
            .with_transparent_color(Some(63));
        let gif = encode(37, 23, WriterOptions::default(), &pixels, &frame);
        let reader = GifReader::new(&gif)?;
        assert_eq!(reader.global_palette(), None);
        let info = reader.frame_info(0)?;
        assert!(info.has_local_palette());
        assert_eq!(info.delay_time_cs(), 25);
        assert_eq!(info.disposal_method(), DisposalMethod::Previous);
        assert_eq!(info.transparent_color(), Some(63));
        assert_eq!(reader.frame_palette(info), Some(palette.as_bytes()));
        let (indices, warning) = reader.decode_frame_indices(0)?;
        assert_eq!(warning, None);
        assert_eq!(indices, pixels);
        Ok(())
    }

    #[test]
    fn interlaced() -> Result<()> {
        let palette = Palette::from_rgb(&[
            0x000000, 0x111111, 0x222222, 0x333333, 0x444444, 0x555555,
            0x666666, 0x777777,
        ])?;
        let pixels: Vec<u8> = (0..3 * 11).map(|i| (i / 3 % 8) as u8).collect();
        let options = WriterOptions::default().with_palette(palette);
        let plain = encode(3, 11, options.clone(), &pixels, &FrameOptions::default());
        let frame = FrameOptions::default().with_interlaced(true);
        let laced = encode(3, 11, options, &pixels, &frame);
        assert_ne!(plain, laced);
        let plain = GifReader::new(&plain)?;
        let laced = GifReader::new(&laced)?;
        assert!(laced.frame_info(0)?.interlaced());
        let mut a = vec![0; 3 * 11 * 4];
        let mut b = vec![0; 3 * 11 * 4];
        plain.decode_and_blit_frame_rgba(0, &mut a)?;
        laced.decode_and_blit_frame_rgba(0, &mut b)?;
        assert_eq!(a, b);
        assert_eq!(laced.decode_frame_indices(0)?.0, pixels);
        Ok(())
    }

    #[test]
    fn transparent() -> Result<()> {
        let frame = FrameOptions::default().with_transparent_color(Some(1));
        let gif = encode(2, 2, two_colors(), &[1; 4], &frame);
        let reader = GifReader::new(&gif)?;
        let mut pixels: Vec<u8> = (0..16).collect();
        reader.decode_and_blit_frame_bgra(0, &mut pixels)?;
        assert_eq!(pixels, (0..16).collect::<Vec<u8>>());
        Ok(())
    }

    #[test]
    fn sub_rectangle() -> Result<()> {
        let mut writer = GifWriter::new(vec![0; 256], 3, 2, two_colors())?;
        writer.add_frame(1, 1, 2, 1, &[1, 0], &FrameOptions::default())?;
        writer.add_frame(2, 1, 2, 1, &[1, 0], &FrameOptions::default())?;
        writer.end()?;
        let reader = GifReader::new(writer.written())?;
        assert_eq!(reader.num_frames(), 2);
        let mut pixels = [0; 3 * 2 * 4];
        reader.decode_and_blit_frame_rgba(0, &mut pixels)?;
        assert_eq!(&pixels[..16], &[0; 16]);
        assert_eq!(&pixels[16..], &[0, 255, 0, 255, 255, 0, 0, 255]);
        assert_eq!(
            reader.decode_and_blit_frame_rgba(1, &mut pixels),
            Err(Error::InvalidFrameDimensions)
        );
        assert_eq!(
            reader.decode_and_blit_frame_rgba(0, &mut pixels[..20]),
            Err(Error::BufferTooSmall { needed: 24, len: 20 })
        );
        let (raster, _) = reader.decode_raster(0)?;
        assert_eq!(raster.width(), 3);
        assert_eq!(raster.as_u8_slice(), &pixels[..]);
        Ok(())
    }

    #[test]
    fn invalid_color_index() -> Result<()> {
        let mut gif = b"GIF89a\x02\x00\x01\x00\x80\x00\x00".to_vec();
        gif.extend_from_slice(&[0, 0, 0, 255, 255, 255]);
        gif.extend_from_slice(&[0x2C, 0, 0, 0, 0, 2, 0, 1, 0, 0]);
        lzw::compress(2, &[0, 3], &mut gif)?;
        gif.push(0x3B);
        let reader = GifReader::new(&gif)?;
        let mut pixels = [9; 8];
        assert_eq!(
            reader.decode_and_blit_frame_rgba(0, &mut pixels),
            Err(Error::InvalidColorIndex(3))
        );
        assert_eq!(pixels, [9; 8]);
        Ok(())
    }

    #[test]
    fn skip_extensions() -> Result<()> {
        let mut gif = SIMPLE_1[..25].to_vec();
        // comment
        gif.extend_from_slice(&[0x21, 0xFE, 0x03, b'a', b'b', b'c', 0x00]);
        // unknown application
        gif.extend_from_slice(b"\x21\xFF\x0BXMP DataXMP\x02\x01\x02\x00");
        // plain text
        gif.extend_from_slice(&[0x21, 0x01, 0x02, 0x00, 0x00, 0x00]);
        // looping
        gif.extend_from_slice(b"\x21\xFF\x0BANIMEXTS1.0\x03\x01\x05\x00\x00");
        gif.extend_from_slice(&SIMPLE_1[25..]);
        let reader = GifReader::new(&gif)?;
        assert_eq!(reader.loop_count(), Some(5));
        assert_eq!(reader.decode_frame_indices(0)?.0, SIMPLE_1_IMAGE);
        Ok(())
    }

    #[test]
    fn control_applies_once() -> Result<()> {
        let mut writer = GifWriter::new(vec![0; 256], 1, 1, two_colors())?;
        let frame = FrameOptions::default().with_delay_time_cs(10);
        writer.add_frame(0, 0, 1, 1, &[0], &frame)?;
        writer.add_frame(0, 0, 1, 1, &[1], &FrameOptions::default())?;
        writer.end()?;
        let reader = GifReader::new(writer.written())?;
        let delays: Vec<u16> = reader.frames().map(|f| f.delay_time_cs()).collect();
        assert_eq!(delays, [10, 0]);
        Ok(())
    }

    #[test]
    fn malformed() {
        let mut gif = SIMPLE_1.to_vec();
        gif[0] = b'J';
        assert_eq!(GifReader::new(&gif).err(), Some(Error::MalformedHeader));
        let mut gif = SIMPLE_1.to_vec();
        gif[4] = b'8';
        assert_eq!(
            GifReader::new(&gif).err(),
            Some(Error::UnsupportedVersion(*b"88a"))
        );
        let mut gif = SIMPLE_1.to_vec();
        gif[25] = 0x22;
        assert_eq!(
            GifReader::new(&gif).err(),
            Some(Error::InvalidBlockCode(0x22))
        );
        let mut gif = SIMPLE_1.to_vec();
        gif[27] = 0x05;
        assert_eq!(
            GifReader::new(&gif).err(),
            Some(Error::MalformedGraphicControlExtension)
        );
        let mut gif = SIMPLE_1.to_vec();
        gif[26] = 0x77;
        assert_eq!(
            GifReader::new(&gif).err(),
            Some(Error::UnknownExtension(0x77))
        );
        assert_eq!(
            GifReader::new(&SIMPLE_1[..40]).err(),
            Some(Error::UnexpectedEndOfFile)
        );
        assert_eq!(
            GifReader::new(&SIMPLE_1[..10]).err(),
            Some(Error::UnexpectedEndOfFile)
        );
    }

    #[test]
    fn trailer() -> Result<()> {
        let mut gif = SIMPLE_1.to_vec();
        gif.extend_from_slice(&[0xDE, 0xAD]);
        assert_eq!(GifReader::new(&gif)?.num_frames(), 1);
        let gif = &SIMPLE_1[..SIMPLE_1.len() - 1];
        assert_eq!(GifReader::new(gif)?.num_frames(), 1);
        Ok(())
    }

    #[test]
    fn short_data() -> Result<()> {
        let mut gif = encode(1, 1, two_colors(), &[1], &FrameOptions::default());
        // claim a 2x1 frame with 1 pixel of data
        gif[19 + 5] = 2;
        gif[6] = 2;
        let reader = GifReader::new(&gif)?;
        let mut pixels = [7; 8];
        let warning = reader.decode_and_blit_frame_rgba(0, &mut pixels)?;
        assert_eq!(
            warning,
            Some(Warning::ShortImageData {
                decoded: 1,
                expected: 2,
            })
        );
        assert_eq!(pixels, [0, 255, 0, 255, 7, 7, 7, 7]);
        Ok(())
    }

    #[test]
    fn max_image_sz() -> Result<()> {
        let reader = GifReader::new(SIMPLE_1)?.with_max_image_sz(Some(99));
        assert_eq!(
            reader.decode_frame_indices(0).err(),
            Some(Error::TooLargeImage)
        );
        let reader = reader.with_max_image_sz(None);
        assert!(reader.decode_frame_indices(0).is_ok());
        Ok(())
    }
}
