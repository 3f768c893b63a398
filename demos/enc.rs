use giflet::{
    max_frame_len, max_header_len, DisposalMethod, FrameOptions, GifWriter,
    Palette, WriterOptions,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let palette = Palette::from_rgb(&[0x000000, 0xFFFFFF, 0xFF0000, 0x0000FF])?;
    let options = WriterOptions::default()
        .with_palette(palette)
        .with_background(Some(1))
        .with_loop_count(Some(0));
    let len = max_header_len() + 2 * max_frame_len(4, 4);
    let mut writer = GifWriter::new(vec![0; len], 4, 4, options)?;
    #[rustfmt::skip]
    let pixels = [
        1, 0, 0, 1,
        0, 2, 3, 0,
        0, 3, 2, 0,
        1, 0, 0, 1,
    ];
    let frame = FrameOptions::default().with_delay_time_cs(50);
    writer.add_frame(0, 0, 4, 4, &pixels, &frame)?;
    let frame = frame
        .with_transparent_color(Some(0))
        .with_disposal_method(DisposalMethod::Keep);
    writer.add_frame(1, 1, 2, 2, &[0, 2, 2, 0], &frame)?;
    writer.end()?;
    std::fs::write("test.gif", writer.written())?;
    Ok(())
}
