use std::env;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    if let Some(path) = env::args().nth(1) {
        decode(&path)?;
    } else {
        eprintln!("usage: dec [filename]");
    }
    Ok(())
}

fn decode(path: &str) -> Result<(), Box<dyn Error>> {
    let buf = std::fs::read(path)?;
    let reader = giflet::GifReader::new(&buf)?;
    println!(
        "screen: {}x{}, loop: {:?}",
        reader.width(),
        reader.height(),
        reader.loop_count()
    );
    for (n, frame) in reader.frames().enumerate() {
        println!("frame: {:?}", frame);
        let (raster, warning) = reader.decode_raster(n)?;
        if let Some(warning) = warning {
            println!("  warning: {}", warning);
        }
        println!("  raster: {}x{}", raster.width(), raster.height());
    }
    Ok(())
}
