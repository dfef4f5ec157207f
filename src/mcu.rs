//! The minimum coded unit: one 8x8 block per component, and the entropy
//! decoder that fills it from the Huffman-coded bitstream.

use crate::bitstream::{extend, BitReader};
use crate::decoder::DecodeContext;
use crate::errors::DecodeErrors;
use crate::huffman::HuffmanTable;
use crate::misc::ZIGZAG;

/// Symbol that marks end-of-block in an AC Huffman table.
const EOB: u8 = 0x00;
/// Symbol that means "16 zero coefficients, keep going" (zero-run length).
const ZRL: u8 = 0xF0;

/// One minimum coded unit: an 8x8 block for each of up to 3 components.
///
/// Holds quantized DCT coefficients on entry to the pipeline; dequant,
/// IDCT, and colour conversion each mutate it in place, until by the end
/// `blocks[0..3]` hold `(R, G, B)` samples.
#[derive(Clone)]
pub struct Mcu {
    blocks: [[i32; 64]; 3],
}

impl Mcu {
    pub(crate) fn new() -> Mcu {
        Mcu {
            blocks: [[0; 64]; 3],
        }
    }

    /// Borrow the 8x8 block for channel `index` (0 = Y/R, 1 = Cb/G, 2 = Cr/B).
    #[must_use]
    pub fn channel(&self, index: usize) -> &[i32; 64] {
        &self.blocks[index]
    }

    /// Mutably borrow the 8x8 block for channel `index`.
    pub fn channel_mut(&mut self, index: usize) -> &mut [i32; 64] {
        &mut self.blocks[index]
    }
}

impl DecodeContext {
    /// Entropy-decode every MCU in the image, in raster order, carrying DC
    /// predictors across MCUs per component.
    pub(crate) fn decode_entropy(&self, reader: &mut BitReader) -> Result<Vec<Mcu>, DecodeErrors> {
        let num_mcus = self.mcu_width * self.mcu_height;
        let mut mcus = Vec::with_capacity(num_mcus);
        let mut prev_dc = [0i32; 3];

        for _ in 0..num_mcus {
            let mut mcu = Mcu::new();

            // Components are decoded in scan order (the bitstream
            // interleaves each MCU's blocks that way), but each decoded
            // block is written into its fixed identity slot
            // (Y -> 0, Cb -> 1, Cr -> 2), not this loop's position, since
            // scan order need not match Y,Cb,Cr order.
            for component in self.components.iter() {
                let slot = component.id.slot();

                let dc_table = &self.dc_huffman_tables[component.dc_huffman_id as usize]
                    .as_ref()
                    .ok_or_else(|| {
                        DecodeErrors::InvalidReference(format!(
                            "Component {:?} references an unset DC Huffman table",
                            component.id
                        ))
                    })?;
                let ac_table = &self.ac_huffman_tables[component.ac_huffman_id as usize]
                    .as_ref()
                    .ok_or_else(|| {
                        DecodeErrors::InvalidReference(format!(
                            "Component {:?} references an unset AC Huffman table",
                            component.id
                        ))
                    })?;

                decode_block(
                    reader,
                    dc_table,
                    ac_table,
                    mcu.channel_mut(slot),
                    &mut prev_dc[slot],
                )?;
            }

            mcus.push(mcu);
        }

        Ok(mcus)
    }
}

/// Decode a single 8x8 block (one component of one MCU): the DC
/// coefficient followed by the AC run-length-coded tail.
fn decode_block(
    reader: &mut BitReader, dc_table: &HuffmanTable, ac_table: &HuffmanTable, block: &mut [i32; 64],
    prev_dc: &mut i32,
) -> Result<(), DecodeErrors> {
    // --- DC coefficient ---
    let dc_length = dc_table.decode_symbol(reader)?;
    if dc_length > 11 {
        return Err(DecodeErrors::BitstreamError(format!(
            "DC coefficient length {} exceeds the maximum of 11",
            dc_length
        )));
    }

    let dc_diff = if dc_length == 0 {
        0
    } else {
        extend(reader.read_bits(dc_length)?, dc_length)
    };

    *prev_dc += dc_diff;
    block[0] = *prev_dc;

    // --- AC coefficients, in zig-zag order ---
    let mut zigzag_index = 1usize;
    while zigzag_index < 64 {
        let symbol = ac_table.decode_symbol(reader)?;

        if symbol == EOB {
            for i in zigzag_index..64 {
                block[ZIGZAG[i]] = 0;
            }
            break;
        }

        if symbol == ZRL {
            for _ in 0..16 {
                if zigzag_index >= 64 {
                    break;
                }
                block[ZIGZAG[zigzag_index]] = 0;
                zigzag_index += 1;
            }
            continue;
        }

        let num_zeros = symbol >> 4;
        let coeff_length = symbol & 0x0F;

        if coeff_length > 10 {
            return Err(DecodeErrors::BitstreamError(format!(
                "AC coefficient length {} exceeds the maximum of 10",
                coeff_length
            )));
        }

        for _ in 0..num_zeros {
            if zigzag_index >= 64 {
                return Err(DecodeErrors::BitstreamError(
                    "AC zero run overran the 64-coefficient block".to_string(),
                ));
            }
            block[ZIGZAG[zigzag_index]] = 0;
            zigzag_index += 1;
        }

        if zigzag_index >= 64 {
            return Err(DecodeErrors::BitstreamError(
                "AC coefficient position overran the 64-coefficient block".to_string(),
            ));
        }

        let coeff = extend(reader.read_bits(coeff_length)?, coeff_length);
        block[ZIGZAG[zigzag_index]] = coeff;
        zigzag_index += 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack_bits(bits: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        let mut acc = 0u8;
        let mut filled = 0u8;
        for &bit in bits {
            acc = (acc << 1) | bit;
            filled += 1;
            if filled == 8 {
                bytes.push(acc);
                acc = 0;
                filled = 0;
            }
        }
        if filled > 0 {
            acc <<= 8 - filled;
            bytes.push(acc);
        }
        bytes
    }

    #[test]
    fn eob_zero_fills_block() {
        // DC table: a single symbol "0" (zero-length DC diff), code length 1.
        let mut counts = [0u8; 16];
        counts[0] = 1;
        let dc = HuffmanTable::build(&counts, vec![0]);

        let mut ac_counts = [0u8; 16];
        ac_counts[0] = 1; // EOB, code length 1
        let ac = HuffmanTable::build(&ac_counts, vec![EOB]);

        // DC symbol "0" -> code "0" (length 1, no extra bits). AC symbol EOB -> code "0".
        let bits = pack_bits(&[0, 0]);
        let mut reader = BitReader::new(bits);

        let mut block = [7i32; 64]; // pre-fill with garbage to prove EOB clears it
        let mut prev_dc = 0;
        decode_block(&mut reader, &dc, &ac, &mut block, &mut prev_dc).unwrap();

        assert_eq!(block, [0i32; 64]);
    }

    #[test]
    fn zrl_then_eob_fills_63_zeros() {
        let mut dc_counts = [0u8; 16];
        dc_counts[0] = 1;
        let dc = HuffmanTable::build(&dc_counts, vec![0]);

        // AC table with two symbols of length 1: ZRL and EOB.
        let mut ac_counts = [0u8; 16];
        ac_counts[0] = 2;
        let ac = HuffmanTable::build(&ac_counts, vec![ZRL, EOB]);
        // canonical codes: ZRL -> 0, EOB -> 1

        // DC "0" (code 0), then ZRL (0) four times, then EOB (1).
        let bits = pack_bits(&[0, 0, 0, 0, 0, 1]);
        let mut reader = BitReader::new(bits);

        let mut block = [0i32; 64];
        let mut prev_dc = 0;
        decode_block(&mut reader, &dc, &ac, &mut block, &mut prev_dc).unwrap();

        assert_eq!(block, [0i32; 64]);
    }

    #[test]
    fn dc_differential_prediction_accumulates() {
        // DC table with a single symbol of length 3 (category 3: values -7..-4,4..7).
        let mut dc_counts = [0u8; 16];
        dc_counts[2] = 1;
        let dc = HuffmanTable::build(&dc_counts, vec![3]);
        // code for the length-3 symbol is 0b000.

        let mut ac_counts = [0u8; 16];
        ac_counts[0] = 1;
        let ac = HuffmanTable::build(&ac_counts, vec![EOB]);

        // First block: DC symbol (000) + 3 raw bits for value 5 (101, category 3
        // high half -> value 5 directly) + EOB (0).
        let bits = pack_bits(&[0, 0, 0, /* raw */ 1, 0, 1, /* EOB */ 0]);
        let mut reader = BitReader::new(bits);
        let mut block = [0i32; 64];
        let mut prev_dc = 0;
        decode_block(&mut reader, &dc, &ac, &mut block, &mut prev_dc).unwrap();
        assert_eq!(block[0], 5);
        assert_eq!(prev_dc, 5);

        // Second block: DC diff of 0 is encoded with a length-0 category, which
        // this tiny table doesn't have, so instead encode the same category-3
        // value 5 again and confirm prev_dc keeps accumulating (5 + 5 = 10),
        // demonstrating the differential-prediction carry.
        let bits2 = pack_bits(&[0, 0, 0, 1, 0, 1, 0]);
        let mut reader2 = BitReader::new(bits2);
        let mut block2 = [0i32; 64];
        decode_block(&mut reader2, &dc, &ac, &mut block2, &mut prev_dc).unwrap();
        assert_eq!(block2[0], 10);
    }
}
