//! Canonical Huffman table construction and symbol lookup.
//!
//! A JPEG Huffman table is specified as, for each code length 1..=16, how
//! many symbols have a code of that length and what those symbols are (in
//! order of increasing code value). From that we can reconstruct the
//! canonical code assigned to every symbol: see [`HuffmanTable::build`].

use crate::bitstream::BitReader;
use crate::errors::DecodeErrors;

/// A DC or AC Huffman table, indexed by code length 1..=16.
///
/// `codes[len - 1]` and `symbols[len - 1]` are parallel vectors: the code at
/// `codes[len - 1][k]` decodes to the symbol at `symbols[len - 1][k]`.
#[derive(Clone, Default)]
pub struct HuffmanTable {
    symbols: [Vec<u8>; 16],
    codes: [Vec<u16>; 16],
}

impl HuffmanTable {
    /// Build a table from the 16 per-length symbol counts and the flat list
    /// of symbols (ordered by increasing length, then by increasing code
    /// within a length), exactly as they appear after a DHT marker.
    pub fn build(counts: &[u8; 16], symbols: Vec<u8>) -> HuffmanTable {
        let mut table = HuffmanTable {
            symbols: Default::default(),
            codes: Default::default(),
        };

        let mut cursor = 0usize;
        for (len_idx, &count) in counts.iter().enumerate() {
            let count = count as usize;
            table.symbols[len_idx] = symbols[cursor..cursor + count].to_vec();
            cursor += count;
        }

        // Canonical code assignment: B.2.4.2's Figure C.2, adapted.
        let mut code: u32 = 0;
        for len_idx in 0..16 {
            let n = table.symbols[len_idx].len();
            let mut codes_for_len = Vec::with_capacity(n);
            for _ in 0..n {
                codes_for_len.push(code as u16);
                code += 1;
            }
            table.codes[len_idx] = codes_for_len;
            code <<= 1;
        }

        table
    }

    /// Read one Huffman-coded symbol from `reader`, one bit at a time,
    /// matching the accumulated code against this table's codes of the
    /// same length.
    pub fn decode_symbol(&self, reader: &mut BitReader) -> Result<u8, DecodeErrors> {
        let mut code: u16 = 0;

        for len in 1..=16usize {
            let bit = reader.read_bit()?;
            code = (code << 1) | u16::from(bit);

            for (slot, &candidate) in self.codes[len - 1].iter().enumerate() {
                if candidate == code {
                    return Ok(self.symbols[len - 1][slot]);
                }
            }
        }

        Err(DecodeErrors::BitstreamError(
            "No Huffman code matched after reading 16 bits".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_codes_round_trip() {
        // 3 symbols of length 2, 1 symbol of length 3 (a small, valid table).
        let mut counts = [0u8; 16];
        counts[1] = 3; // length 2
        counts[2] = 1; // length 3
        let symbols = vec![0xAA, 0xBB, 0xCC, 0xDD];

        let table = HuffmanTable::build(&counts, symbols);

        // Expected canonical codes: length-2 codes 00,01,10 ; length-3 code 110
        assert_eq!(table.codes[1], vec![0b00, 0b01, 0b10]);
        assert_eq!(table.codes[2], vec![0b110]);
    }

    #[test]
    fn decode_symbol_matches_encoded_bits() {
        let mut counts = [0u8; 16];
        counts[1] = 3;
        counts[2] = 1;
        let symbols = vec![0xAA, 0xBB, 0xCC, 0xDD];
        let table = HuffmanTable::build(&counts, symbols);

        // Encode symbol 0xDD (code 110, length 3), MSB first, padded to a byte.
        let byte = 0b1100_0000u8;
        let mut reader = BitReader::new(vec![byte]);
        let symbol = table.decode_symbol(&mut reader).unwrap();
        assert_eq!(symbol, 0xDD);
    }

    #[test]
    fn every_symbol_is_uniquely_decodable() {
        let mut counts = [0u8; 16];
        counts[0] = 2; // length 1
        counts[1] = 1; // length 2
        let symbols = vec![1, 2, 3];
        let table = HuffmanTable::build(&counts, symbols.clone());

        // Re-derive each symbol's code bits and feed them back through decode_symbol.
        for len_idx in 0..16 {
            for (slot, &code) in table.codes[len_idx].iter().enumerate() {
                let len = len_idx + 1;
                let mut bits = Vec::new();
                for b in (0..len).rev() {
                    bits.push(((code >> b) & 1) as u8);
                }
                // Pack bits MSB-first into bytes, padding with zero bits.
                let mut bytes = Vec::new();
                let mut acc = 0u8;
                let mut filled = 0u8;
                for bit in bits {
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
                bytes.push(0); // padding so decode_symbol never runs dry mid-scan

                let mut reader = BitReader::new(bytes);
                let decoded = table.decode_symbol(&mut reader).unwrap();
                assert_eq!(decoded, table.symbols[len_idx][slot]);
            }
        }
        let _ = symbols;
    }
}
