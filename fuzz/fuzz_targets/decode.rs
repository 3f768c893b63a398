// cargo fuzz run decode corpus/decode -- -timeout=30

#![no_main]

use libfuzzer_sys::fuzz_target;

use giflet::GifReader;

fuzz_target!(|data: &[u8]| {
    let reader = match GifReader::new(data) {
        Ok(reader) => reader.with_max_image_sz(Some(1 << 20)),
        Err(_) => return,
    };
    let len = usize::from(reader.width()) * usize::from(reader.height()) * 4;
    if len > 1 << 22 {
        return;
    }
    let mut pixels = vec![0; len];
    for n in 0..reader.num_frames() {
        let _ = reader.decode_frame_indices(n);
        let _ = reader.decode_and_blit_frame_bgra(n, &mut pixels);
    }
});
