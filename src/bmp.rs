//! Writes a decoded image out as an uncompressed 24-bit BMP using the
//! 12-byte `BITMAPCOREHEADER` (OS/2 1.x) DIB variant.

use std::io::Write;

use crate::decoder::DecodedImage;
use crate::errors::DecodeErrors;

const FILE_HEADER_SIZE: u32 = 14;
const DIB_HEADER_SIZE: u32 = 12;
const PIXEL_DATA_OFFSET: u32 = FILE_HEADER_SIZE + DIB_HEADER_SIZE;

/// Number of padding bytes appended to each BGR row so the row's total
/// length is a multiple of 4 bytes, as required by the BMP format.
fn row_padding(width: usize) -> usize {
    (4 - (3 * width) % 4) % 4
}

/// Write `image` to `writer` as a 24-bit BGR BMP, bottom row first.
pub fn write_bmp<W: Write>(writer: &mut W, image: &DecodedImage) -> Result<(), DecodeErrors> {
    let padding = row_padding(image.width);
    let row_size = image.width * 3 + padding;
    let pixel_data_size = row_size * image.height;
    let file_size = PIXEL_DATA_OFFSET + pixel_data_size as u32;

    // --- BITMAPFILEHEADER (14 bytes) ---
    writer.write_all(b"BM")?;
    writer.write_all(&file_size.to_le_bytes())?;
    writer.write_all(&0u16.to_le_bytes())?; // reserved
    writer.write_all(&0u16.to_le_bytes())?; // reserved
    writer.write_all(&PIXEL_DATA_OFFSET.to_le_bytes())?;

    // --- BITMAPCOREHEADER (12 bytes) ---
    writer.write_all(&DIB_HEADER_SIZE.to_le_bytes())?;
    writer.write_all(&(image.width as u16).to_le_bytes())?;
    writer.write_all(&(image.height as u16).to_le_bytes())?;
    writer.write_all(&1u16.to_le_bytes())?; // colour planes, always 1
    writer.write_all(&24u16.to_le_bytes())?; // bits per pixel

    // --- pixel data, bottom row first, BGR byte order ---
    let zero_padding = [0u8; 3];
    for row in (0..image.height).rev() {
        for col in 0..image.width {
            let pixel_index = (row * image.width + col) * 3;
            let r = image.pixels[pixel_index];
            let g = image.pixels[pixel_index + 1];
            let b = image.pixels[pixel_index + 2];
            writer.write_all(&[b, g, r])?;
        }
        writer.write_all(&zero_padding[..padding])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_matches_worked_example() {
        // width 10 -> 3*10 = 30, 30 % 4 = 2, padding = (4-2)%4 = 2.
        assert_eq!(row_padding(10), 2);
    }

    #[test]
    fn padding_is_zero_for_width_divisible_by_four_pixels() {
        // width 4 -> 3*4 = 12, already a multiple of 4.
        assert_eq!(row_padding(4), 0);
    }

    #[test]
    fn writes_expected_header_and_bottom_up_bgr_rows() {
        // 2x1 image: row 0 is red, row... only one row here, but this
        // exercises the byte order and the 12-byte DIB header.
        let image = DecodedImage {
            width: 2,
            height: 1,
            pixels: vec![255, 0, 0, 0, 255, 0], // (R,G,B)=(255,0,0), (0,255,0)
        };

        let mut out = Vec::new();
        write_bmp(&mut out, &image).unwrap();

        assert_eq!(&out[0..2], b"BM");
        assert_eq!(u32::from_le_bytes(out[10..14].try_into().unwrap()), PIXEL_DATA_OFFSET);
        assert_eq!(u32::from_le_bytes(out[14..18].try_into().unwrap()), DIB_HEADER_SIZE);
        assert_eq!(u16::from_le_bytes(out[18..20].try_into().unwrap()), 2);
        assert_eq!(u16::from_le_bytes(out[20..22].try_into().unwrap()), 1);
        assert_eq!(u16::from_le_bytes(out[24..26].try_into().unwrap()), 24);

        let pixel_data = &out[PIXEL_DATA_OFFSET as usize..];
        // width 2 -> 3*2=6, 6%4=2, padding=2; row size = 8 bytes, 1 row.
        assert_eq!(pixel_data.len(), 8);
        assert_eq!(&pixel_data[0..3], &[0, 0, 255]); // first pixel, BGR
        assert_eq!(&pixel_data[3..6], &[0, 255, 0]); // second pixel, BGR
        assert_eq!(&pixel_data[6..8], &[0, 0]); // padding
    }
}
