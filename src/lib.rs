// lib.rs      giflet crate.
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! GIF encoder / decoder working on caller-owned buffers.
//!
//! * [GifWriter](struct.GifWriter.html) writes indexed frames into a
//!   fixed-size byte buffer
//! * [GifReader](struct.GifReader.html) parses a byte buffer and blits
//!   frames onto BGRA or RGBA canvases
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub mod block;
mod error;
pub mod lzw;
mod palette;
mod reader;
mod writer;

pub use crate::block::DisposalMethod;
pub use crate::error::{Error, Result, Warning};
pub use crate::palette::Palette;
pub use crate::reader::{FrameInfo, GifReader};
pub use crate::writer::{
    max_frame_len, max_header_len, FrameOptions, GifWriter, WriterOptions,
};
