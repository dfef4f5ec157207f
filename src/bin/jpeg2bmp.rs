//! `jpeg2bmp <input.jpg> <output.bmp>`
//!
//! A thin command-line front end: decode the input JPEG and write the
//! result out as an uncompressed 24-bit BMP.

use std::fs::File;
use std::io::BufWriter;
use std::process::ExitCode;

use baseline_jpeg::bmp::write_bmp;
use baseline_jpeg::Decoder;

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (input, output) = match (args.next(), args.next()) {
        (Some(input), Some(output)) => (input, output),
        _ => {
            eprintln!("usage: jpeg2bmp <input.jpg> <output.bmp>");
            return ExitCode::FAILURE;
        }
    };

    let mut decoder = Decoder::new();
    let image = match decoder.decode_file(&input) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("failed to decode {}: {}", input, e);
            return ExitCode::FAILURE;
        }
    };

    let file = match File::create(&output) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("failed to create {}: {}", output, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = write_bmp(&mut BufWriter::new(file), &image) {
        eprintln!("failed to write {}: {}", output, e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
