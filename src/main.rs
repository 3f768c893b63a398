// main.rs      giflet command
//
// Copyright (c) 2019-2025  Douglas Lau
//
#![forbid(unsafe_code)]

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use giflet::{DisposalMethod, FrameInfo, GifReader};
use std::error::Error;
use std::ffi::OsStr;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Crate version
const VERSION: &str = std::env!("CARGO_PKG_VERSION");

/// Main entry point
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder().format_timestamp(None).init();
    let mut out = StandardStream::stdout(ColorChoice::Always);
    match create_app().get_matches().subcommand() {
        ("show", Some(matches)) => show(&mut out, matches)?,
        ("check", Some(matches)) => check(&mut out, matches)?,
        _ => unreachable!(),
    }
    out.reset()?;
    Ok(())
}

/// Create clap App
fn create_app() -> App<'static, 'static> {
    App::new("giflet")
        .version(VERSION)
        .setting(AppSettings::GlobalVersion)
        .about("GIF file utility")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("show")
                .about("Show GIF frame table")
                .arg(
                    Arg::with_name("files")
                        .required(true)
                        .min_values(1)
                        .help("input file(s)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("check")
                .about("Decode all frames, reporting problems")
                .arg(
                    Arg::with_name("files")
                        .required(true)
                        .min_values(1)
                        .help("input file(s)"),
                ),
        )
}

/// Handle show subcommand
fn show(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    if let Some(values) = matches.values_of_os("files") {
        for path in values {
            show_file(out, path)?;
        }
    }
    Ok(())
}

/// Show one GIF file
fn show_file(
    out: &mut StandardStream,
    path: &OsStr,
) -> Result<(), Box<dyn Error>> {
    let mut magenta = ColorSpec::new();
    magenta.set_fg(Some(Color::Magenta));
    let mut yellow = ColorSpec::new();
    yellow.set_fg(Some(Color::Yellow)).set_intense(true);
    let mut bold = ColorSpec::new();
    bold.set_fg(Some(Color::White))
        .set_intense(true)
        .set_bold(true);
    let buf = std::fs::read(path)?;
    let reader = GifReader::new(&buf)?;
    let frame_digits = digits(reader.num_frames()).max(3);
    let width = reader.width();
    let height = reader.height();
    let size_digits = 4.max(1 + digits(width) + digits(height));
    let gif = String::from_utf8_lossy(&reader.version()).to_string();
    out.set_color(&magenta)?;
    writeln!(out, "{:?}", path)?;
    out.set_color(&bold)?;
    write!(out, "GIF{}, {}x{}, frames: {}", gif, width, height, reader.num_frames())?;
    if let Some(c) = reader.loop_count() {
        write!(out, ", repeat: ")?;
        if c == 0 {
            write!(out, "∞")?;
        } else {
            write!(out, "{}", c)?;
        }
    }
    writeln!(out)?;
    out.set_color(&yellow)?;
    write!(out, " {:>w$}", "Fr#", w = frame_digits)?;
    write!(out, "  Delay Disp")?;
    write!(out, " {:>w$}", "Size", w = size_digits)?;
    write!(out, " {:>w$}", "X,Y", w = size_digits)?;
    writeln!(out, " Clrs Trn")?;
    for (n, frame) in reader.frames().enumerate() {
        show_frame(frame, out, width, height, n, frame_digits, size_digits)?;
    }
    Ok(())
}

/// Show one frame of a GIF file
fn show_frame(
    frame: &FrameInfo,
    out: &mut StandardStream,
    width: u16,
    height: u16,
    number: usize,
    frame_digits: usize,
    size_digits: usize,
) -> Result<(), Box<dyn Error>> {
    let mut dflt = ColorSpec::new();
    dflt.set_fg(Some(Color::White));
    let mut bold = ColorSpec::new();
    bold.set_fg(Some(Color::White))
        .set_intense(true)
        .set_bold(true);
    let mut red = ColorSpec::new();
    red.set_fg(Some(Color::Red)).set_intense(true);
    out.set_color(&dflt)?;
    let interlaced = if frame.interlaced() { 'i' } else { ' ' };
    write!(out, "{}", interlaced)?;
    out.set_color(&bold)?;
    write!(out, "{:>w$}", number, w = frame_digits)?;
    let d = frame.delay_time_cs();
    if d == 0 {
        out.set_color(&dflt)?;
    }
    write!(out, " {:6.2}", f32::from(d) / 100.0)?;
    let d = match frame.disposal_method() {
        DisposalMethod::NoAction => "none",
        DisposalMethod::Keep => "keep",
        DisposalMethod::Background => "bg",
        DisposalMethod::Previous => "prev",
        DisposalMethod::Reserved(_) => "res",
    };
    out.set_color(match d {
        "none" => &dflt,
        "res" => &red,
        _ => &bold,
    })?;
    write!(out, " {:>4}", d)?;
    if width == frame.width() && height == frame.height() {
        out.set_color(&dflt)?;
    } else {
        out.set_color(&bold)?;
    }
    write!(
        out,
        " {:>w$}",
        &format!("{}x{}", frame.width(), frame.height()),
        w = size_digits
    )?;
    if frame.left() == 0 && frame.top() == 0 {
        out.set_color(&dflt)?;
    } else {
        out.set_color(&bold)?;
    }
    write!(
        out,
        " {:>w$}",
        &format!("{},{}", frame.left(), frame.top()),
        w = size_digits
    )?;
    let c = frame.palette_len();
    if frame.has_local_palette() {
        out.set_color(&bold)?;
        write!(out, "  {:3}", c)?;
    } else if c > 0 {
        out.set_color(&dflt)?;
        write!(out, " {:3}g", c)?;
    } else {
        out.set_color(&red)?;
        write!(out, "    -")?;
    }
    match frame.transparent_color() {
        Some(tc) => {
            out.set_color(&bold)?;
            writeln!(out, " {:>3}", tc)?;
        }
        None => {
            out.set_color(&dflt)?;
            writeln!(out, " {:>3}", "-")?;
        }
    }
    Ok(())
}

/// Handle check subcommand
fn check(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    if let Some(values) = matches.values_of_os("files") {
        for path in values {
            check_file(out, path)?;
        }
    }
    Ok(())
}

/// Decode every frame of one GIF file
fn check_file(
    out: &mut StandardStream,
    path: &OsStr,
) -> Result<(), Box<dyn Error>> {
    let mut magenta = ColorSpec::new();
    magenta.set_fg(Some(Color::Magenta));
    let mut red = ColorSpec::new();
    red.set_fg(Some(Color::Red)).set_intense(true);
    let mut yellow = ColorSpec::new();
    yellow.set_fg(Some(Color::Yellow)).set_intense(true);
    let mut green = ColorSpec::new();
    green.set_fg(Some(Color::Green)).set_intense(true);
    out.set_color(&magenta)?;
    write!(out, "{:?}", path)?;
    let buf = std::fs::read(path)?;
    let reader = match GifReader::new(&buf) {
        Ok(reader) => reader,
        Err(e) => {
            out.set_color(&red)?;
            writeln!(out, " {}", e)?;
            return Ok(());
        }
    };
    writeln!(out)?;
    let mut pixels =
        vec![0; usize::from(reader.width()) * usize::from(reader.height()) * 4];
    let mut problems = 0;
    for n in 0..reader.num_frames() {
        match reader.decode_and_blit_frame_rgba(n, &mut pixels) {
            Ok(None) => (),
            Ok(Some(warning)) => {
                problems += 1;
                out.set_color(&yellow)?;
                writeln!(out, "  frame {}: {}", n, warning)?;
            }
            Err(e) => {
                problems += 1;
                out.set_color(&red)?;
                writeln!(out, "  frame {}: {}", n, e)?;
            }
        }
    }
    if problems == 0 {
        out.set_color(&green)?;
        writeln!(out, "  ok: {} frames", reader.num_frames())?;
    }
    Ok(())
}

/// Calculate digits in a number
fn digits<T: Into<usize>>(v: T) -> usize {
    let v = v.into();
    match v {
        0..=9 => 1,
        10..=99 => 2,
        100..=999 => 3,
        1000..=9999 => 4,
        _ => 5,
    }
}
