//! Quantization tables and dequantization.

use crate::misc::ZIGZAG;

/// One 8x8 quantization table, stored in natural (row-major) order.
///
/// DQT segments list their 64 entries in zig-zag order; [`QuantizationTable::from_zigzag_entries`]
/// un-zig-zags them once at parse time so dequantization is a plain
/// elementwise multiply against an already natural-order MCU block.
#[derive(Clone)]
pub struct QuantizationTable {
    values: [u16; 64],
}

impl QuantizationTable {
    /// Build a table from its 64 entries as they appear in a DQT segment,
    /// i.e. in zig-zag scan order.
    #[must_use]
    pub fn from_zigzag_entries(entries: &[u16; 64]) -> QuantizationTable {
        let mut values = [0u16; 64];
        for (zigzag_index, &entry) in entries.iter().enumerate() {
            values[ZIGZAG[zigzag_index]] = entry;
        }
        QuantizationTable { values }
    }

    /// Multiply every natural-order coefficient in `block` by its matching
    /// quantizer step, in place.
    pub fn dequantize(&self, block: &mut [i32; 64]) {
        for (coeff, &step) in block.iter_mut().zip(self.values.iter()) {
            *coeff *= i32::from(step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dc_step_applies_to_dc_position() {
        let mut entries = [1u16; 64];
        entries[0] = 16; // DC entry, zig-zag position 0 is also natural position 0
        let table = QuantizationTable::from_zigzag_entries(&entries);

        let mut block = [0i32; 64];
        block[0] = 5;
        table.dequantize(&mut block);
        assert_eq!(block[0], 80);
    }

    #[test]
    fn unzigzag_places_steps_at_natural_positions() {
        let mut entries = [0u16; 64];
        // The second zig-zag entry (index 1) lands at natural position 1.
        entries[1] = 7;
        let table = QuantizationTable::from_zigzag_entries(&entries);

        let mut block = [0i32; 64];
        block[1] = 2;
        table.dequantize(&mut block);
        assert_eq!(block[1], 14);
        // Everything else should remain zero since those steps are zero.
        assert_eq!(block[0], 0);
    }
}
