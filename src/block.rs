// block.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! GIF block types and their packed fields

/// Number of channels in a color table entry (RGB)
pub(crate) const CHANNELS: usize = 3;

/// Color table existence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTableExistence {
    /// No color table
    Absent,
    /// Color table follows the descriptor
    Present,
}

/// Color table configuration from a descriptor's packed fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTableConfig {
    existence: ColorTableExistence,
    table_len: usize, // must be between 2...256
}

impl Default for ColorTableConfig {
    fn default() -> Self {
        let existence = ColorTableExistence::Absent;
        let table_len = 2;
        ColorTableConfig {
            existence,
            table_len,
        }
    }
}

impl ColorTableConfig {
    /// Create a new color table config.
    ///
    /// The length is rounded up to a power of two between 2 and 256.
    pub fn new(existence: ColorTableExistence, table_len: usize) -> Self {
        let table_len = table_len.max(2).next_power_of_two().min(256);
        ColorTableConfig {
            existence,
            table_len,
        }
    }

    /// Get the number of entries (0 if absent)
    pub fn len(&self) -> usize {
        match self.existence {
            ColorTableExistence::Absent => 0,
            ColorTableExistence::Present => self.table_len,
        }
    }

    /// Check if the table is absent
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the table size in packed-field form (log2 len - 1)
    pub(crate) fn len_bits(&self) -> u8 {
        let sz = self.table_len;
        for b in 0..7 {
            if (sz >> (b + 1)) == 1 {
                return b;
            }
        }
        7
    }

    /// Get the table size in bytes
    pub fn size_bytes(&self) -> usize {
        self.len() * CHANNELS
    }
}

/// Disposal method for a frame
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum DisposalMethod {
    /// No disposal specified
    #[default]
    NoAction,
    /// Leave frame in place
    Keep,
    /// Restore to background color
    Background,
    /// Restore to previous frame
    Previous,
    /// Reserved value (4-7)
    Reserved(u8),
}

impl From<u8> for DisposalMethod {
    fn from(n: u8) -> Self {
        use self::DisposalMethod::*;
        match n & 0b0111 {
            0 => NoAction,
            1 => Keep,
            2 => Background,
            3 => Previous,
            _ => Reserved(n & 0b0111),
        }
    }
}

impl From<DisposalMethod> for u8 {
    fn from(d: DisposalMethod) -> Self {
        use self::DisposalMethod::*;
        match d {
            NoAction => 0,
            Keep => 1,
            Background => 2,
            Previous => 3,
            Reserved(n) => n & 0b0111,
        }
    }
}

/// Top-level block codes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum BlockCode {
    Extension_,
    ImageDesc_,
    Trailer_,
}

impl BlockCode {
    pub fn from_u8(t: u8) -> Option<Self> {
        use self::BlockCode::*;
        match t {
            b',' => Some(ImageDesc_), // (0x2C) Image separator
            b'!' => Some(Extension_), // (0x21) Extension introducer
            b';' => Some(Trailer_),   // (0x3B) GIF trailer
            _ => None,
        }
    }

    pub fn signature(self) -> u8 {
        use self::BlockCode::*;
        match self {
            ImageDesc_ => b',',
            Extension_ => b'!',
            Trailer_ => b';',
        }
    }
}

/// Extension block labels
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ExtensionCode {
    PlainText_,
    GraphicControl_,
    Comment_,
    Application_,
    Unknown_(u8),
}

impl From<u8> for ExtensionCode {
    fn from(n: u8) -> Self {
        use self::ExtensionCode::*;
        match n {
            0x01 => PlainText_,
            0xF9 => GraphicControl_,
            0xFE => Comment_,
            0xFF => Application_,
            _ => Unknown_(n),
        }
    }
}

impl From<ExtensionCode> for u8 {
    fn from(t: ExtensionCode) -> Self {
        use self::ExtensionCode::*;
        match t {
            PlainText_ => 0x01,
            GraphicControl_ => 0xF9,
            Comment_ => 0xFE,
            Application_ => 0xFF,
            Unknown_(n) => n,
        }
    }
}

/// Header block (signature and version)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    version: [u8; 3],
}

impl Default for Header {
    fn default() -> Self {
        Header::with_version(*b"89a")
    }
}

impl Header {
    /// Block size in bytes
    pub(crate) const SIZE: usize = 6;

    /// Create a header with a version
    pub fn with_version(version: [u8; 3]) -> Self {
        Header { version }
    }

    /// Get the version (`87a` or `89a`)
    pub fn version(&self) -> [u8; 3] {
        self.version
    }
}

/// Logical screen descriptor block
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogicalScreenDesc {
    screen_width: u16,
    screen_height: u16,
    flags: u8,
    background_color_idx: u8, // index into global color table
    pixel_aspect_ratio: u8,
}

impl LogicalScreenDesc {
    /// Block size in bytes
    pub(crate) const SIZE: usize = 7;

    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const COLOR_RESOLUTION: u8 = 0b0111_0000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    pub fn with_screen_width(mut self, screen_width: u16) -> Self {
        self.screen_width = screen_width;
        self
    }

    pub fn screen_width(&self) -> u16 {
        self.screen_width
    }

    pub fn with_screen_height(mut self, screen_height: u16) -> Self {
        self.screen_height = screen_height;
        self
    }

    pub fn screen_height(&self) -> u16 {
        self.screen_height
    }

    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    fn color_table_existence(&self) -> ColorTableExistence {
        if self.flags & Self::COLOR_TABLE_PRESENT != 0 {
            ColorTableExistence::Present
        } else {
            ColorTableExistence::Absent
        }
    }

    fn color_table_len(&self) -> usize {
        2 << ((self.flags & Self::COLOR_TABLE_SIZE) as usize)
    }

    /// Get the global color table config
    pub fn color_table_config(&self) -> ColorTableConfig {
        let existence = self.color_table_existence();
        let table_len = self.color_table_len();
        ColorTableConfig {
            existence,
            table_len,
        }
    }

    /// Set the global color table config.
    ///
    /// Color resolution bits are set to match the table size.
    pub fn with_color_table_config(mut self, tbl: &ColorTableConfig) -> Self {
        let mut flags = 0;
        if tbl.existence == ColorTableExistence::Present {
            flags = tbl.len_bits() & Self::COLOR_TABLE_SIZE;
            flags |= (flags << 4) & Self::COLOR_RESOLUTION;
            flags |= Self::COLOR_TABLE_PRESENT;
        }
        self.flags = flags;
        self
    }

    pub fn with_background_color_idx(mut self, background_color_idx: u8) -> Self {
        self.background_color_idx = background_color_idx;
        self
    }

    pub fn background_color_idx(&self) -> u8 {
        self.background_color_idx
    }

    pub fn with_pixel_aspect_ratio(mut self, pixel_aspect_ratio: u8) -> Self {
        self.pixel_aspect_ratio = pixel_aspect_ratio;
        self
    }

    pub fn pixel_aspect_ratio(&self) -> u8 {
        self.pixel_aspect_ratio
    }
}

/// Graphic control extension block
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GraphicControl {
    flags: u8,
    delay_time_cs: u16, // delay in centiseconds (hundredths of a second)
    transparent_color_idx: u8,
}

impl GraphicControl {
    /// Sub-block size in bytes
    pub(crate) const SIZE: u8 = 4;

    const DISPOSAL_METHOD: u8 = 0b0001_1100;
    const USER_INPUT: u8 = 0b0000_0010;
    const TRANSPARENT_COLOR: u8 = 0b0000_0001;

    pub fn set_flags(&mut self, flags: u8) {
        self.flags = flags;
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    pub fn disposal_method(&self) -> DisposalMethod {
        ((self.flags & Self::DISPOSAL_METHOD) >> 2).into()
    }

    pub fn set_disposal_method(&mut self, disposal_method: DisposalMethod) {
        let d: u8 = disposal_method.into();
        self.flags = (self.flags & !Self::DISPOSAL_METHOD) | (d << 2);
    }

    pub fn user_input(&self) -> bool {
        (self.flags & Self::USER_INPUT) != 0
    }

    pub fn delay_time_cs(&self) -> u16 {
        self.delay_time_cs
    }

    pub fn set_delay_time_cs(&mut self, delay_time_cs: u16) {
        self.delay_time_cs = delay_time_cs;
    }

    pub fn transparent_color(&self) -> Option<u8> {
        if (self.flags & Self::TRANSPARENT_COLOR) != 0 {
            Some(self.transparent_color_idx)
        } else {
            None
        }
    }

    pub fn transparent_color_idx(&self) -> u8 {
        self.transparent_color_idx
    }

    pub fn set_transparent_color_idx(&mut self, transparent_color_idx: u8) {
        self.transparent_color_idx = transparent_color_idx;
    }

    pub fn set_transparent_color(&mut self, transparent_color: Option<u8>) {
        match transparent_color {
            Some(t) => {
                self.flags |= Self::TRANSPARENT_COLOR;
                self.transparent_color_idx = t;
            }
            None => {
                self.flags &= !Self::TRANSPARENT_COLOR;
                self.transparent_color_idx = 0;
            }
        }
    }
}

/// Application extension holding an animation loop count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopCountExt {
    loop_count: u16,
}

impl LoopCountExt {
    /// Size of app ID block + data sub-block + terminator
    pub(crate) const SIZE: usize = 17;

    /// Check for an application ID which holds a loop count
    fn is_looping(app_id: &[u8]) -> bool {
        app_id == b"NETSCAPE2.0" || app_id == b"ANIMEXTS1.0"
    }

    /// Create a loop count extension (zero means loop forever)
    pub fn with_loop_count(loop_count: u16) -> Self {
        LoopCountExt { loop_count }
    }

    /// Get the number of times to loop animation
    pub fn loop_count(&self) -> u16 {
        self.loop_count
    }

    /// Match sub-blocks following the application label.
    ///
    /// The buffer starts at the app ID block size byte.
    pub(crate) fn from_sub_blocks(buf: &[u8]) -> Option<Self> {
        // NOTE: matches only the exact 11-byte ID + 3-byte data layout
        let d = buf.get(..Self::SIZE)?;
        let exists = d[0] == 0x0B &&                // app ID block size
                     Self::is_looping(&d[1..12]) && // app ID / auth code
                     d[12] == 3 &&                  // data sub-block size
                     d[13] == 1 &&                  // sub-block ID
                     d[16] == 0; // terminator
        if exists {
            let loop_count = u16::from_le_bytes([d[14], d[15]]);
            Some(LoopCountExt { loop_count })
        } else {
            None
        }
    }
}

/// Image descriptor block
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImageDesc {
    left: u16,
    top: u16,
    width: u16,
    height: u16,
    flags: u8,
}

impl ImageDesc {
    /// Block size in bytes (excluding separator)
    pub(crate) const SIZE: usize = 9;

    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const INTERLACED: u8 = 0b0100_0000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    pub fn with_left(mut self, left: u16) -> Self {
        self.left = left;
        self
    }

    pub fn left(&self) -> u16 {
        self.left
    }

    pub fn with_top(mut self, top: u16) -> Self {
        self.top = top;
        self
    }

    pub fn top(&self) -> u16 {
        self.top
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn with_height(mut self, height: u16) -> Self {
        self.height = height;
        self
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    pub fn with_interlaced(mut self, interlaced: bool) -> Self {
        if interlaced {
            self.flags |= Self::INTERLACED;
        } else {
            self.flags &= !Self::INTERLACED;
        }
        self
    }

    pub fn interlaced(&self) -> bool {
        (self.flags & Self::INTERLACED) != 0
    }

    fn color_table_existence(&self) -> ColorTableExistence {
        if self.flags & Self::COLOR_TABLE_PRESENT != 0 {
            ColorTableExistence::Present
        } else {
            ColorTableExistence::Absent
        }
    }

    fn color_table_len(&self) -> usize {
        2 << ((self.flags & Self::COLOR_TABLE_SIZE) as usize)
    }

    /// Get the local color table config
    pub fn color_table_config(&self) -> ColorTableConfig {
        let existence = self.color_table_existence();
        let table_len = self.color_table_len();
        ColorTableConfig {
            existence,
            table_len,
        }
    }

    /// Set the local color table config
    pub fn with_color_table_config(mut self, tbl: &ColorTableConfig) -> Self {
        let mut flags = self.flags & Self::INTERLACED;
        if tbl.existence == ColorTableExistence::Present {
            flags |= tbl.len_bits() & Self::COLOR_TABLE_SIZE;
            flags |= Self::COLOR_TABLE_PRESENT;
        }
        self.flags = flags;
        self
    }

    /// Get the image size in pixels
    pub fn image_sz(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Get physical rows of an interlaced image, in storage order.
///
/// Passes: every 8th row from 0, every 8th from 4, every 4th from 2,
/// then every 2nd from 1.
pub(crate) fn interlaced_rows(height: usize) -> impl Iterator<Item = usize> {
    const PASSES: [(usize, usize); 4] = [(0, 8), (4, 8), (2, 4), (1, 2)];
    PASSES
        .iter()
        .flat_map(move |&(start, step)| (start..height).step_by(step))
}
