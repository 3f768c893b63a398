// writer.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! GIF writer for caller-owned buffers
use crate::block::*;
use crate::error::{Error, Result};
use crate::lzw;
use crate::palette::Palette;

/// Graphic control extension length, in bytes
const GRAPHIC_CONTROL_LEN: usize = 8;

/// Image descriptor length (with separator), in bytes
const IMAGE_DESC_LEN: usize = 1 + ImageDesc::SIZE;

/// Largest color table, in bytes
const MAX_TABLE_LEN: usize = 256 * CHANNELS;

/// Minimum LZW inserts between dictionary resets
const MIN_RESET_INTERVAL: usize = 4096 - 258;

/// Get a conservative length for a header written by
/// [GifWriter::new](struct.GifWriter.html#method.new)
pub fn max_header_len() -> usize {
    Header::SIZE
        + LogicalScreenDesc::SIZE
        + MAX_TABLE_LEN
        + 2
        + LoopCountExt::SIZE
}

/// Get a conservative length for one frame written by
/// [GifWriter::add_frame](struct.GifWriter.html#method.add_frame)
pub fn max_frame_len(width: u16, height: u16) -> usize {
    let pixels = usize::from(width) * usize::from(height);
    // one code per pixel at most, plus clear / end codes
    let codes = pixels + pixels / MIN_RESET_INTERVAL + 3;
    let data = (codes * 12 + 7) / 8;
    let sub_blocks = (data + 254) / 255;
    GRAPHIC_CONTROL_LEN
        + IMAGE_DESC_LEN
        + MAX_TABLE_LEN
        + 1
        + sub_blocks
        + data
        + 1
}

/// Options for a [GifWriter](struct.GifWriter.html)
#[derive(Clone, Debug, Default)]
pub struct WriterOptions {
    /// Animation loop count (zero means loop forever)
    loop_count: Option<u16>,
    /// Global color table
    palette: Option<Palette>,
    /// Background color index
    background: Option<u8>,
}

impl WriterOptions {
    /// Set the animation loop count.
    ///
    /// `None` means play once (no loop extension); `Some(0)` loops forever.
    pub fn with_loop_count(mut self, loop_count: Option<u16>) -> Self {
        self.loop_count = loop_count;
        self
    }

    /// Set the global color table
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    /// Set the background color index.
    ///
    /// Requires a global color table; index 0 must not be passed
    /// explicitly.
    pub fn with_background(mut self, background: Option<u8>) -> Self {
        self.background = background;
        self
    }
}

/// Options for one frame
#[derive(Clone, Debug, Default)]
pub struct FrameOptions {
    /// Local color table
    palette: Option<Palette>,
    /// Delay time in centiseconds
    delay_time_cs: u16,
    /// Disposal method
    disposal_method: DisposalMethod,
    /// Transparent color index
    transparent_color: Option<u8>,
    /// Interlaced storage
    interlaced: bool,
}

impl FrameOptions {
    /// Set a local color table, overriding the global one
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    /// Adjust the delay time.
    pub fn with_delay_time_cs(mut self, delay: u16) -> Self {
        self.delay_time_cs = delay;
        self
    }

    /// Adjust the disposal method.
    pub fn with_disposal_method(mut self, method: DisposalMethod) -> Self {
        self.disposal_method = method;
        self
    }

    /// Adjust the transparent color.
    pub fn with_transparent_color(mut self, clr: Option<u8>) -> Self {
        self.transparent_color = clr;
        self
    }

    /// Store rows in interlaced order.
    pub fn with_interlaced(mut self, interlaced: bool) -> Self {
        self.interlaced = interlaced;
        self
    }

    /// Get graphic control extension, if needed
    fn graphic_control(&self) -> Option<GraphicControl> {
        let mut control = GraphicControl::default();
        control.set_disposal_method(self.disposal_method);
        control.set_transparent_color(self.transparent_color);
        control.set_delay_time_cs(self.delay_time_cs);
        if control != GraphicControl::default() {
            Some(control)
        } else {
            None
        }
    }
}

/// GIF writer
///
/// Bytes are written into a caller-owned buffer at a tracked position.
/// The buffer is never grown; a write which does not fit fails with
/// `BufferTooSmall` and leaves the position unchanged.
///
/// ## Example
/// ```
/// use giflet::{FrameOptions, GifWriter, Palette, WriterOptions};
///
/// let palette = Palette::from_rgb(&[0x000000, 0xFFFFFF])?;
/// let options = WriterOptions::default()
///     .with_palette(palette)
///     .with_loop_count(Some(0));
/// let mut writer = GifWriter::new(vec![0; 1024], 4, 4, options)?;
/// let pixels = [
///     1, 0, 0, 1,
///     0, 1, 1, 0,
///     0, 1, 1, 0,
///     1, 0, 0, 1,
/// ];
/// let frame = FrameOptions::default().with_delay_time_cs(50);
/// writer.add_frame(0, 0, 4, 4, &pixels, &frame)?;
/// let len = writer.end()?;
/// assert_eq!(writer.written().len(), len);
/// # Ok::<(), giflet::Error>(())
/// ```
pub struct GifWriter<B> {
    /// Output buffer
    buf: B,
    /// Write position
    pos: usize,
    /// Trailer written
    ended: bool,
    /// Global color table
    global_palette: Option<Palette>,
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> GifWriter<B> {
    /// Create a new GIF writer, writing the header blocks.
    ///
    /// Width and height must be non-zero.
    pub fn new(
        buf: B,
        width: u16,
        height: u16,
        options: WriterOptions,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions);
        }
        let WriterOptions {
            loop_count,
            palette,
            background,
        } = options;
        let tbl = match &palette {
            Some(p) => ColorTableConfig::new(ColorTableExistence::Present, p.len()),
            None => ColorTableConfig::default(),
        };
        let background = match background {
            Some(bg) if bg == 0 || usize::from(bg) >= tbl.len() => {
                return Err(Error::InvalidBackground(bg));
            }
            Some(bg) => bg,
            None => 0,
        };
        let mut header = Vec::with_capacity(max_header_len());
        Header::default().format(&mut header);
        LogicalScreenDesc::default()
            .with_screen_width(width)
            .with_screen_height(height)
            .with_color_table_config(&tbl)
            .with_background_color_idx(background)
            .format(&mut header);
        if let Some(p) = &palette {
            header.extend_from_slice(p.as_bytes());
        }
        if let Some(loop_count) = loop_count {
            LoopCountExt::with_loop_count(loop_count).format(&mut header);
        }
        let mut writer = GifWriter {
            buf,
            pos: 0,
            ended: false,
            global_palette: palette,
        };
        writer.put(&header)?;
        debug!("header: {}x{}, {} bytes", width, height, header.len());
        Ok(writer)
    }

    /// Put bytes into the buffer at the current position
    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        let buf = self.buf.as_mut();
        let end = self.pos + bytes.len();
        if end > buf.len() {
            return Err(Error::BufferTooSmall {
                needed: end,
                len: buf.len(),
            });
        }
        buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    /// Add one frame.
    ///
    /// The frame rectangle is at `x`, `y` with size `w` x `h`; the
    /// first `w * h` indexed pixels are used, in row-major order.  If
    /// the trailer was already written, it is removed first (see
    /// [reopen](#method.reopen)).
    ///
    /// Returns the write position after the frame.
    pub fn add_frame(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        pixels: &[u8],
        options: &FrameOptions,
    ) -> Result<usize> {
        let frame = self.format_frame(x, y, w, h, pixels, options)?;
        let start = self.pos.saturating_sub(usize::from(self.ended));
        let len = self.buf.as_ref().len();
        if start + frame.len() > len {
            return Err(Error::BufferTooSmall {
                needed: start + frame.len(),
                len,
            });
        }
        self.reopen();
        self.put(&frame)?;
        debug!("frame: {}x{} at {},{}, {} bytes", w, h, x, y, frame.len());
        Ok(self.pos)
    }

    /// Format one frame into a byte vector
    fn format_frame(
        &self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        pixels: &[u8],
        options: &FrameOptions,
    ) -> Result<Vec<u8>> {
        if w == 0 || h == 0 {
            return Err(Error::InvalidDimensions);
        }
        let needed = usize::from(w) * usize::from(h);
        if pixels.len() < needed {
            return Err(Error::NotEnoughPixels {
                needed,
                len: pixels.len(),
            });
        }
        let local = options.palette.as_ref();
        let palette = local
            .or(self.global_palette.as_ref())
            .ok_or(Error::MissingColorTable)?;
        if let DisposalMethod::Reserved(n) = options.disposal_method {
            return Err(Error::InvalidDisposalMethod(n));
        }
        if let Some(t) = options.transparent_color {
            if usize::from(t) >= palette.len() {
                return Err(Error::InvalidTransparentColor(t));
            }
        }
        let mut buf = Vec::with_capacity(max_frame_len(w, h));
        if let Some(control) = options.graphic_control() {
            control.format(&mut buf);
        }
        let tbl = match local {
            Some(p) => ColorTableConfig::new(ColorTableExistence::Present, p.len()),
            None => ColorTableConfig::default(),
        };
        ImageDesc::default()
            .with_left(x)
            .with_top(y)
            .with_width(w)
            .with_height(h)
            .with_interlaced(options.interlaced)
            .with_color_table_config(&tbl)
            .format(&mut buf);
        if let Some(p) = local {
            buf.extend_from_slice(p.as_bytes());
        }
        let pixels = &pixels[..needed];
        // code size must be >= 2, even for 2-color tables
        let min_code_size = palette.len_bits().max(2);
        if options.interlaced {
            let width = usize::from(w);
            let mut rows = Vec::with_capacity(needed);
            for row in interlaced_rows(h.into()) {
                let start = row * width;
                rows.extend_from_slice(&pixels[start..start + width]);
            }
            lzw::compress(min_code_size, &rows, &mut buf)?;
        } else {
            lzw::compress(min_code_size, pixels, &mut buf)?;
        }
        Ok(buf)
    }

    /// Write the trailer, if not already written.
    ///
    /// Returns the write position.
    pub fn end(&mut self) -> Result<usize> {
        if !self.ended {
            self.put(&[BlockCode::Trailer_.signature()])?;
            self.ended = true;
        }
        Ok(self.pos)
    }

    /// Remove the trailer, so more frames can be added.
    ///
    /// This is not standard GIF usage; it allows calling
    /// [add_frame](#method.add_frame) after [end](#method.end).
    /// Returns `true` if a trailer was removed.
    pub fn reopen(&mut self) -> bool {
        if self.ended {
            debug!("reopen: removing trailer at {}", self.pos - 1);
            self.pos -= 1;
            self.ended = false;
            true
        } else {
            false
        }
    }

    /// Check if the trailer has been written
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Get the write position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Set the write position.
    ///
    /// The writer is no longer considered ended, since the trailer (if
    /// any) is not assumed to precede the new position.
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
        self.ended = false;
    }

    /// Get the output buffer
    pub fn buffer(&self) -> &B {
        &self.buf
    }

    /// Get the output buffer (mutable)
    pub fn buffer_mut(&mut self) -> &mut B {
        &mut self.buf
    }

    /// Replace the output buffer, returning the previous one.
    ///
    /// The write position is not changed.
    pub fn replace_buffer(&mut self, buf: B) -> B {
        std::mem::replace(&mut self.buf, buf)
    }

    /// Get the bytes written so far
    pub fn written(&self) -> &[u8] {
        let buf = self.buf.as_ref();
        &buf[..self.pos.min(buf.len())]
    }

    /// Convert into the output buffer
    pub fn into_inner(self) -> B {
        self.buf
    }
}

impl Header {
    fn format(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(b"GIF");
        buf.extend_from_slice(&self.version());
    }
}

impl LogicalScreenDesc {
    fn format(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.screen_width().to_le_bytes());
        buf.extend_from_slice(&self.screen_height().to_le_bytes());
        buf.push(self.flags());
        buf.push(self.background_color_idx());
        buf.push(self.pixel_aspect_ratio());
    }
}

impl LoopCountExt {
    fn format(&self, buf: &mut Vec<u8>) {
        buf.push(BlockCode::Extension_.signature());
        buf.push(ExtensionCode::Application_.into());
        buf.push(0x0B); // block size
        buf.extend_from_slice(b"NETSCAPE2.0");
        buf.push(3); // block size
        buf.push(1); // sub-block ID
        buf.extend_from_slice(&self.loop_count().to_le_bytes());
        buf.push(0); // block size
    }
}

impl GraphicControl {
    fn format(&self, buf: &mut Vec<u8>) {
        buf.push(BlockCode::Extension_.signature());
        buf.push(ExtensionCode::GraphicControl_.into());
        buf.push(Self::SIZE); // block size
        buf.push(self.flags());
        buf.extend_from_slice(&self.delay_time_cs().to_le_bytes());
        buf.push(self.transparent_color_idx());
        buf.push(0); // block size
    }
}

impl ImageDesc {
    fn format(&self, buf: &mut Vec<u8>) {
        buf.push(BlockCode::ImageDesc_.signature());
        buf.extend_from_slice(&self.left().to_le_bytes());
        buf.extend_from_slice(&self.top().to_le_bytes());
        buf.extend_from_slice(&self.width().to_le_bytes());
        buf.extend_from_slice(&self.height().to_le_bytes());
        buf.push(self.flags());
    }
}
