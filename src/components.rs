//! Per-component metadata extracted from the start of frame header.

use crate::errors::DecodeErrors;

/// Identifies one of the (at most three) colour components of an image.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ComponentId {
    /// Luminance
    Y,
    /// Blue chrominance
    Cb,
    /// Red chrominance
    Cr,
}

impl ComponentId {
    /// Build a `ComponentId` from a 1-based id as it appears (post
    /// zero-based normalisation) in the file.
    fn from_id(id: u8) -> Result<ComponentId, DecodeErrors> {
        match id {
            1 => Ok(ComponentId::Y),
            2 => Ok(ComponentId::Cb),
            3 => Ok(ComponentId::Cr),
            4 | 5 => Err(DecodeErrors::UnsupportedFeature(
                "YIQ component ids (4,5) are not supported".to_string(),
            )),
            other => Err(DecodeErrors::StructuralError(format!(
                "Component id {} is out of range, expected 1..=3",
                other
            ))),
        }
    }

    /// The fixed MCU channel slot this component always occupies
    /// (Y -> 0, Cb -> 1, Cr -> 2), independent of the order SOF/SOS
    /// happened to list components in.
    pub fn slot(self) -> usize {
        match self {
            ComponentId::Y => 0,
            ComponentId::Cb => 1,
            ComponentId::Cr => 2,
        }
    }
}

/// A single colour component, as declared by SOF and refined by SOS.
#[derive(Clone, Debug)]
pub struct ColorComponent {
    /// Which channel (Y, Cb or Cr) this is
    pub id: ComponentId,
    /// Horizontal sampling factor; this decoder requires this to be 1
    pub horizontal_sample: u8,
    /// Vertical sampling factor; this decoder requires this to be 1
    pub vertical_sample: u8,
    /// Which of the 4 quantization table slots this component dequantizes with
    pub quantization_table_id: u8,
    /// Which of the 4 DC Huffman table slots this component uses
    pub dc_huffman_id: u8,
    /// Which of the 4 AC Huffman table slots this component uses
    pub ac_huffman_id: u8,
    /// Set while parsing SOF/SOS, to detect a component id repeated in the
    /// same segment
    pub used: bool,
}

impl ColorComponent {
    /// Build a component from the 3 bytes of its SOF entry.
    ///
    /// `raw_id` is the *already zero-based-normalised* id (1..=3).
    pub fn from_sof_bytes(raw_id: u8, sampling: u8, quantization_table_id: u8) -> Result<ColorComponent, DecodeErrors> {
        let id = ComponentId::from_id(raw_id)?;

        let horizontal_sample = sampling >> 4;
        let vertical_sample = sampling & 0x0F;

        if quantization_table_id > 3 {
            return Err(DecodeErrors::InvalidReference(format!(
                "Quantization table id {} is out of range, expected 0..=3",
                quantization_table_id
            )));
        }

        if horizontal_sample != 1 || vertical_sample != 1 {
            return Err(DecodeErrors::UnsupportedFeature(format!(
                "Component {:?} has sampling factors ({},{}), only (1,1) is supported",
                id, horizontal_sample, vertical_sample
            )));
        }

        Ok(ColorComponent {
            id,
            horizontal_sample,
            vertical_sample,
            quantization_table_id,
            dc_huffman_id: 0,
            ac_huffman_id: 0,
            used: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_is_fixed_by_identity_not_declaration_order() {
        assert_eq!(ComponentId::Y.slot(), 0);
        assert_eq!(ComponentId::Cb.slot(), 1);
        assert_eq!(ComponentId::Cr.slot(), 2);
    }
}
