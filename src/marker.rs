//! JPEG marker identifiers.
//!
//! Markers are the `0xFF XX` bytes that delimit segments in a JPEG stream.
//! See ITU T.81 Annex B for the full table; we only name the ones this
//! decoder has to recognise (even if only to reject them with a clear
//! error).

/// A single marker, decoded from the byte following `0xFF`.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
#[allow(clippy::upper_case_acronyms)]
pub enum Marker {
    /// Start of image, `0xFFD8`
    SOI,
    /// End of image, `0xFFD9`
    EOI,
    /// Start of frame, carries the variant number (0 = baseline, 2 =
    /// progressive, etc.) so callers can report precisely which
    /// unsupported flavour they hit.
    SOF(u8),
    /// Define Huffman table(s), `0xFFC4`
    DHT,
    /// Define arithmetic coding conditioning, `0xFFCC` (unsupported)
    DAC,
    /// Define quantization table(s), `0xFFDB`
    DQT,
    /// Define restart interval, `0xFFDD`
    DRI,
    /// Restart marker, `0xFFD0..=0xFFD7`
    RST(u8),
    /// Start of scan, `0xFFDA`
    SOS,
    /// Application segment, `0xFFE0..=0xFFEF`
    APP(u8),
    /// Comment, `0xFFFE`
    COM,
}

impl Marker {
    /// Map the byte following a `0xFF` into a [`Marker`], if it names one we
    /// recognise.
    #[must_use]
    pub fn from_u8(byte: u8) -> Option<Marker> {
        match byte {
            0xD8 => Some(Marker::SOI),
            0xD9 => Some(Marker::EOI),
            0xC0..=0xCF if byte != 0xC4 && byte != 0xC8 && byte != 0xCC => {
                Some(Marker::SOF(byte - 0xC0))
            }
            0xC4 => Some(Marker::DHT),
            0xCC => Some(Marker::DAC),
            0xDB => Some(Marker::DQT),
            0xDD => Some(Marker::DRI),
            0xD0..=0xD7 => Some(Marker::RST(byte - 0xD0)),
            0xDA => Some(Marker::SOS),
            0xE0..=0xEF => Some(Marker::APP(byte - 0xE0)),
            0xFE => Some(Marker::COM),
            _ => None,
        }
    }
}
