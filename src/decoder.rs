//! The top-level decoder: drives segment parsing, entropy decoding, and
//! the per-MCU dequantize/IDCT/colour-convert pipeline, and assembles the
//! result into a flat RGB pixel buffer.

use std::io::Cursor;
use std::path::Path;

use log::{debug, info, warn};

use crate::bitstream::BitReader;
use crate::color_convert::ycbcr_to_rgb;
use crate::components::ColorComponent;
use crate::errors::DecodeErrors;
use crate::headers::{expect_marker, extract_entropy_payload, next_marker, parse_dht, parse_dqt, parse_dri, parse_sof, parse_sos, skip_segment};
use crate::huffman::HuffmanTable;
use crate::idct::idct_block;
use crate::marker::Marker;
use crate::quant::QuantizationTable;

/// All of the state accumulated while walking a JPEG's marker segments:
/// table slots, frame geometry, and the components the current scan
/// covers. Reset fresh for every decode.
pub struct DecodeContext {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) components: Vec<ColorComponent>,
    pub(crate) quantization_tables: [Option<QuantizationTable>; 4],
    pub(crate) dc_huffman_tables: [Option<HuffmanTable>; 4],
    pub(crate) ac_huffman_tables: [Option<HuffmanTable>; 4],
    pub(crate) mcu_width: usize,
    pub(crate) mcu_height: usize,
    pub(crate) restart_interval: u16,
    /// Whether any SOF component declared id 0, putting the whole frame
    /// (and its matching SOS) in 0-based component id mode.
    pub(crate) zero_based: bool,
}

impl Default for DecodeContext {
    fn default() -> DecodeContext {
        DecodeContext {
            width: 0,
            height: 0,
            components: Vec::new(),
            quantization_tables: Default::default(),
            dc_huffman_tables: Default::default(),
            ac_huffman_tables: Default::default(),
            mcu_width: 0,
            mcu_height: 0,
            restart_interval: 0,
            zero_based: false,
        }
    }
}

/// A fully decoded image: dimensions plus a flat, row-major, 3-bytes-per-
/// pixel `(R, G, B)` buffer sized exactly `width * height * 3` (the decoder
/// crops away any padding the last row/column of MCUs overhangs).
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

/// Decodes a baseline sequential JPEG into an in-memory RGB image.
///
/// A fresh `Decoder` holds no state between calls; each `decode_*` call
/// parses, entropy-decodes, and reconstructs an entire image from scratch.
#[derive(Default)]
pub struct Decoder {}

impl Decoder {
    /// Construct a decoder.
    #[must_use]
    pub fn new() -> Decoder {
        Decoder {}
    }

    /// Decode a JPEG file from disk.
    pub fn decode_file<P: AsRef<Path>>(&mut self, path: P) -> Result<DecodedImage, DecodeErrors> {
        let bytes = std::fs::read(path)?;
        self.decode_buffer(&bytes)
    }

    /// Decode a JPEG already read into memory.
    pub fn decode_buffer(&mut self, buf: &[u8]) -> Result<DecodedImage, DecodeErrors> {
        let mut cursor = Cursor::new(buf);
        let mut ctx = DecodeContext::default();

        expect_marker(&mut cursor, Marker::SOI)?;
        info!("Found SOI, beginning segment parse");

        let mut sof_seen = false;
        let payload = loop {
            let marker = next_marker(&mut cursor)?;
            debug!("Encountered marker {:?}", marker);

            match marker {
                Marker::SOF(0) => {
                    parse_sof(&mut ctx, &mut cursor)?;
                    sof_seen = true;
                    info!(
                        "SOF0: {}x{} image, {} component(s)",
                        ctx.width,
                        ctx.height,
                        ctx.components.len()
                    );
                }
                Marker::SOF(variant) => {
                    return Err(DecodeErrors::UnsupportedFeature(format!(
                        "SOF variant {} is not baseline sequential (SOF0); only baseline is supported",
                        variant
                    )))
                }
                Marker::DAC => {
                    return Err(DecodeErrors::UnsupportedFeature(
                        "Arithmetic coding is not supported".to_string(),
                    ))
                }
                Marker::DHT => parse_dht(&mut ctx, &mut cursor)?,
                Marker::DQT => parse_dqt(&mut ctx, &mut cursor)?,
                Marker::DRI => parse_dri(&mut ctx, &mut cursor)?,
                Marker::APP(_) | Marker::COM => {
                    warn!("Ignoring {:?} segment", marker);
                    skip_segment(&mut cursor)?;
                }
                Marker::SOS => {
                    if !sof_seen {
                        return Err(DecodeErrors::StructuralError(
                            "SOS appeared before any SOF segment".to_string(),
                        ));
                    }
                    info!("Found SOS, transitioning to entropy-coded data");
                    parse_sos(&mut ctx, &mut cursor)?;
                    let payload = extract_entropy_payload(&mut cursor)?;
                    expect_marker(&mut cursor, Marker::EOI)?;
                    break payload;
                }
                Marker::EOI => {
                    return Err(DecodeErrors::StructuralError(
                        "Reached EOI before a start-of-scan segment".to_string(),
                    ))
                }
                Marker::RST(_) => {
                    // A restart marker can legally appear between header
                    // segments (e.g. a re-synchronised stream); it carries
                    // no header information, so skip it.
                }
                Marker::SOI => {
                    return Err(DecodeErrors::StructuralError(
                        "Duplicate SOI marker".to_string(),
                    ))
                }
            }
        };

        info!(
            "Parsed headers for a {}x{} image with {} component(s); decoding {} bytes of entropy data",
            ctx.width,
            ctx.height,
            ctx.components.len(),
            payload.len()
        );

        let mut reader = BitReader::new(payload);
        let mut mcus = ctx.decode_entropy(&mut reader)?;

        for mcu in mcus.iter_mut() {
            for component in ctx.components.iter() {
                let slot = component.id.slot();
                let table = ctx.quantization_tables[component.quantization_table_id as usize]
                    .as_ref()
                    .ok_or_else(|| {
                        DecodeErrors::InvalidReference(format!(
                            "Component {:?} references an unset quantization table",
                            component.id
                        ))
                    })?;
                table.dequantize(mcu.channel_mut(slot));
                idct_block(mcu.channel_mut(slot));
            }

            if ctx.components.len() == 3 {
                // ycbcr_to_rgb folds the level shift back to 0..=255 into
                // its own rounding step.
                ycbcr_to_rgb(mcu);
            } else {
                // Grayscale: channel 0 is luminance, still centred on 0
                // from the IDCT; undo the level shift directly.
                for sample in mcu.channel_mut(0).iter_mut() {
                    *sample = (*sample + 128).clamp(0, 255);
                }
            }
        }

        let pixels = assemble_pixels(&ctx, &mcus);

        Ok(DecodedImage {
            width: ctx.width,
            height: ctx.height,
            pixels,
        })
    }
}

/// Lay decoded MCUs out into a flat, row-major `(R, G, B)` buffer, cropping
/// away any pixels the last row/column of 8x8 blocks overhangs past the
/// image's actual width and height.
fn assemble_pixels(ctx: &DecodeContext, mcus: &[crate::mcu::Mcu]) -> Vec<u8> {
    let grayscale = ctx.components.len() == 1;
    let mut pixels = vec![0u8; ctx.width * ctx.height * 3];

    for mcu_row in 0..ctx.mcu_height {
        for mcu_col in 0..ctx.mcu_width {
            let mcu = &mcus[mcu_row * ctx.mcu_width + mcu_col];

            for by in 0..8 {
                let y = mcu_row * 8 + by;
                if y >= ctx.height {
                    continue;
                }
                for bx in 0..8 {
                    let x = mcu_col * 8 + bx;
                    if x >= ctx.width {
                        continue;
                    }

                    let block_index = by * 8 + bx;
                    let pixel_index = (y * ctx.width + x) * 3;

                    if grayscale {
                        let sample = clamp_to_u8(mcu.channel(0)[block_index]);
                        pixels[pixel_index] = sample;
                        pixels[pixel_index + 1] = sample;
                        pixels[pixel_index + 2] = sample;
                    } else {
                        pixels[pixel_index] = clamp_to_u8(mcu.channel(0)[block_index]);
                        pixels[pixel_index + 1] = clamp_to_u8(mcu.channel(1)[block_index]);
                        pixels[pixel_index + 2] = clamp_to_u8(mcu.channel(2)[block_index]);
                    }
                }
            }
        }
    }

    pixels
}

fn clamp_to_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_stream_without_soi() {
        let bytes = [0x00, 0x01, 0x02];
        let mut decoder = Decoder::new();
        let err = decoder.decode_buffer(&bytes).unwrap_err();
        assert!(matches!(err, DecodeErrors::StructuralError(_)) || matches!(err, DecodeErrors::IOFailure(_)));
    }

    #[test]
    fn rejects_progressive_sof2() {
        let bytes = [0xFF, 0xD8, 0xFF, 0xC2, 0x00, 0x02];
        let mut decoder = Decoder::new();
        let err = decoder.decode_buffer(&bytes).unwrap_err();
        assert!(matches!(err, DecodeErrors::UnsupportedFeature(_)));
    }
}
