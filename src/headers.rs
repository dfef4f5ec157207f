//! Marker segment parsers: DQT, DHT, SOF0, SOS, DRI, and the APPn/COM
//! segments this decoder skips over without interpreting.
//!
//! Every parser here receives a cursor already positioned just past the
//! 2-byte marker code, at the segment's own 2-byte (big-endian, inclusive
//! of itself) length field.

use std::io::{Cursor, Seek, SeekFrom};

use log::{debug, warn};

use crate::components::ColorComponent;
use crate::decoder::DecodeContext;
use crate::errors::DecodeErrors;
use crate::huffman::HuffmanTable;
use crate::marker::Marker;
use crate::misc::{read_u16_be, read_u8, skip_bytes};
use crate::quant::QuantizationTable;

/// Read the next marker, skipping any `0xFF` fill bytes that precede it.
///
/// Markers are introduced by `0xFF` followed by a non-zero, non-`0xFF`
/// byte; encoders are permitted to pad with extra `0xFF` fill bytes before
/// the marker code, which we discard here.
pub(crate) fn next_marker(cursor: &mut Cursor<&[u8]>) -> Result<Marker, DecodeErrors> {
    let mut byte = read_u8(cursor)?;
    while byte != 0xFF {
        byte = read_u8(cursor)?;
    }
    let mut code = read_u8(cursor)?;
    while code == 0xFF {
        warn!("Ignoring 0xFF fill byte before marker code");
        code = read_u8(cursor)?;
    }

    Marker::from_u8(code).ok_or_else(|| {
        DecodeErrors::StructuralError(format!("Unrecognised marker code 0xFF{:02X}", code))
    })
}

/// Confirm the very next two bytes are the given marker, without the
/// fill-byte tolerance of [`next_marker`] (used only for the SOI check).
pub(crate) fn expect_marker(cursor: &mut Cursor<&[u8]>, expected: Marker) -> Result<(), DecodeErrors> {
    let marker = next_marker(cursor)?;
    if marker != expected {
        return Err(DecodeErrors::StructuralError(format!(
            "Expected {:?}, found {:?}",
            expected, marker
        )));
    }
    Ok(())
}

/// Skip over an APPn or COM segment: read its length and discard the rest.
pub(crate) fn skip_segment(cursor: &mut Cursor<&[u8]>) -> Result<(), DecodeErrors> {
    let length = read_u16_be(cursor)?;
    if length < 2 {
        return Err(DecodeErrors::LengthMismatch(format!(
            "Segment length {} is smaller than the length field itself",
            length
        )));
    }
    skip_bytes(cursor, usize::from(length) - 2)
}

/// Parse a DQT segment: one or more quantization tables, packed back to
/// back until the segment's declared length is consumed. Each table is an
/// id byte followed by 64 entries, either one byte each (8-bit precision)
/// or two big-endian bytes each (16-bit precision).
pub(crate) fn parse_dqt(ctx: &mut DecodeContext, cursor: &mut Cursor<&[u8]>) -> Result<(), DecodeErrors> {
    let length = read_u16_be(cursor)?;
    if length < 2 {
        return Err(DecodeErrors::LengthMismatch(
            "DQT segment length smaller than the length field itself".to_string(),
        ));
    }
    let mut remaining = i64::from(length) - 2;

    while remaining > 0 {
        let precision_and_id = read_u8(cursor)?;
        let sixteen_bit = precision_and_id >> 4 != 0;
        let id = precision_and_id & 0x0F;

        if id > 3 {
            return Err(DecodeErrors::InvalidReference(format!(
                "Quantization table id {} is out of range, expected 0..=3",
                id
            )));
        }

        let mut entries = [0u16; 64];
        for entry in entries.iter_mut() {
            *entry = if sixteen_bit { read_u16_be(cursor)? } else { u16::from(read_u8(cursor)?) };
        }

        ctx.quantization_tables[id as usize] = Some(QuantizationTable::from_zigzag_entries(&entries));
        debug!(
            "Built quantization table {} ({}-bit precision)",
            id,
            if sixteen_bit { 16 } else { 8 }
        );
        remaining -= 1 + if sixteen_bit { 128 } else { 64 };
    }

    if remaining != 0 {
        return Err(DecodeErrors::LengthMismatch(
            "DQT segment length did not divide evenly into 65-byte tables".to_string(),
        ));
    }

    Ok(())
}

/// Parse a DHT segment: one or more Huffman tables, each a class/id byte,
/// 16 length counts, and a flat symbol list, packed back to back.
pub(crate) fn parse_dht(ctx: &mut DecodeContext, cursor: &mut Cursor<&[u8]>) -> Result<(), DecodeErrors> {
    let length = read_u16_be(cursor)?;
    if length < 2 {
        return Err(DecodeErrors::LengthMismatch(
            "DHT segment length smaller than the length field itself".to_string(),
        ));
    }
    let mut remaining = i64::from(length) - 2;

    while remaining > 0 {
        let class_and_id = read_u8(cursor)?;
        let class = class_and_id >> 4;
        let id = class_and_id & 0x0F;

        if id > 3 {
            return Err(DecodeErrors::InvalidReference(format!(
                "Huffman table id {} is out of range, expected 0..=3",
                id
            )));
        }

        let mut counts = [0u8; 16];
        for count in counts.iter_mut() {
            *count = read_u8(cursor)?;
        }
        let total_symbols: usize = counts.iter().map(|&c| usize::from(c)).sum();

        let mut symbols = Vec::with_capacity(total_symbols);
        for _ in 0..total_symbols {
            symbols.push(read_u8(cursor)?);
        }

        let table = HuffmanTable::build(&counts, symbols);
        debug!(
            "Built {} Huffman table {} ({} symbols)",
            if class == 0 { "DC" } else { "AC" },
            id,
            total_symbols
        );
        match class {
            0 => ctx.dc_huffman_tables[id as usize] = Some(table),
            1 => ctx.ac_huffman_tables[id as usize] = Some(table),
            other => {
                return Err(DecodeErrors::StructuralError(format!(
                    "Huffman table class {} is neither DC (0) nor AC (1)",
                    other
                )))
            }
        }

        remaining -= 1 + 16 + total_symbols as i64;
    }

    if remaining != 0 {
        return Err(DecodeErrors::LengthMismatch(
            "DHT segment length did not divide evenly into its tables".to_string(),
        ));
    }

    Ok(())
}

/// Parse a start-of-frame segment. Only SOF0 (baseline sequential) is
/// accepted; the caller is expected to have already checked the marker
/// variant and rejected anything else as [`DecodeErrors::UnsupportedFeature`].
pub(crate) fn parse_sof(ctx: &mut DecodeContext, cursor: &mut Cursor<&[u8]>) -> Result<(), DecodeErrors> {
    let _length = read_u16_be(cursor)?;
    let precision = read_u8(cursor)?;
    if precision != 8 {
        return Err(DecodeErrors::UnsupportedFeature(format!(
            "Sample precision {} bits is not supported, only 8-bit is",
            precision
        )));
    }

    let height = read_u16_be(cursor)?;
    let width = read_u16_be(cursor)?;
    if height == 0 || width == 0 {
        return Err(DecodeErrors::StructuralError(
            "Image dimensions must be non-zero".to_string(),
        ));
    }

    let num_components = read_u8(cursor)?;
    if num_components != 1 && num_components != 3 {
        return Err(DecodeErrors::UnsupportedFeature(format!(
            "{} components is not supported, only 1 (grayscale) or 3 (YCbCr) are",
            num_components
        )));
    }

    let mut raw_components = Vec::with_capacity(usize::from(num_components));
    for _ in 0..num_components {
        let raw_id = read_u8(cursor)?;
        let sampling = read_u8(cursor)?;
        let quantization_table_id = read_u8(cursor)?;
        raw_components.push((raw_id, sampling, quantization_table_id));
    }

    // Some encoders emit 0-based component ids (0,1,2 instead of 1,2,3).
    // If any component's id is 0, the whole frame is in that mode: every
    // id (here and in the matching SOS) gets +1 added before it's
    // interpreted as Y/Cb/Cr.
    let zero_based = raw_components.iter().any(|&(id, _, _)| id == 0);
    ctx.zero_based = zero_based;

    let mut components = Vec::with_capacity(raw_components.len());
    for (raw_id, sampling, quantization_table_id) in raw_components {
        let normalized_id = if zero_based { raw_id + 1 } else { raw_id };
        let component = ColorComponent::from_sof_bytes(normalized_id, sampling, quantization_table_id)?;
        if components.iter().any(|c: &ColorComponent| c.id == component.id) {
            return Err(DecodeErrors::StructuralError(format!(
                "Component id {:?} is declared more than once in SOF",
                component.id
            )));
        }
        components.push(component);
    }

    ctx.width = usize::from(width);
    ctx.height = usize::from(height);
    ctx.mcu_width = (ctx.width + 7) / 8;
    ctx.mcu_height = (ctx.height + 7) / 8;
    ctx.components = components;

    Ok(())
}

/// Parse a start-of-scan segment: which of the previously declared
/// components participate (in what order) and which Huffman tables each
/// one uses. This decoder supports exactly one scan covering every
/// component, so SOS must name all of them.
pub(crate) fn parse_sos(ctx: &mut DecodeContext, cursor: &mut Cursor<&[u8]>) -> Result<(), DecodeErrors> {
    if ctx.components.is_empty() {
        return Err(DecodeErrors::StructuralError(
            "SOS appeared before any SOF segment".to_string(),
        ));
    }

    let _length = read_u16_be(cursor)?;
    let num_components = read_u8(cursor)?;
    if usize::from(num_components) != ctx.components.len() {
        return Err(DecodeErrors::UnsupportedFeature(format!(
            "Scan names {} components but the frame declared {}; multi-scan images are not supported",
            num_components,
            ctx.components.len()
        )));
    }

    // Re-order components to match the scan's component order (the entropy
    // bitstream interleaves each MCU's blocks in this order, so it must be
    // preserved), and assign each its Huffman table ids. `claimed` tracks
    // which SOF-declared slots this scan has already consumed, so a
    // repeated component id is caught even though the original
    // `ColorComponent`s are never mutated. Note that scan order need not
    // match Y,Cb,Cr — callers must place decoded blocks by
    // `component.id.slot()`, not by this position, when it matters which
    // MCU channel a block belongs to.
    let mut claimed = vec![false; ctx.components.len()];
    let mut ordered = Vec::with_capacity(ctx.components.len());
    for _ in 0..num_components {
        let raw_id = read_u8(cursor)?;
        let normalized_id = if ctx.zero_based { raw_id + 1 } else { raw_id };
        let table_ids = read_u8(cursor)?;
        let dc_id = table_ids >> 4;
        let ac_id = table_ids & 0x0F;

        if dc_id > 3 || ac_id > 3 {
            return Err(DecodeErrors::InvalidReference(format!(
                "SOS references out-of-range Huffman table ids ({}, {})",
                dc_id, ac_id
            )));
        }

        let component_index = ctx
            .components
            .iter()
            .enumerate()
            .position(|(i, c)| !claimed[i] && matches_raw_id(c, normalized_id))
            .ok_or_else(|| {
                DecodeErrors::InvalidReference(format!(
                    "SOS references component id {} not declared in SOF (or it was already used)",
                    raw_id
                ))
            })?;

        claimed[component_index] = true;
        let mut component = ctx.components[component_index].clone();
        component.used = true;
        component.dc_huffman_id = dc_id;
        component.ac_huffman_id = ac_id;
        ordered.push(component);
    }

    let spectral_start = read_u8(cursor)?;
    let spectral_end = read_u8(cursor)?;
    let approximation = read_u8(cursor)?;
    if spectral_start != 0 || spectral_end != 63 || approximation != 0 {
        return Err(DecodeErrors::UnsupportedFeature(
            "Progressive scan parameters (spectral selection / successive approximation) are not supported"
                .to_string(),
        ));
    }

    ctx.components = ordered;
    Ok(())
}

fn matches_raw_id(component: &ColorComponent, raw_id: u8) -> bool {
    use crate::components::ComponentId;
    match (component.id, raw_id) {
        (ComponentId::Y, 1) | (ComponentId::Cb, 2) | (ComponentId::Cr, 3) => true,
        _ => false,
    }
}

/// Parse a DRI segment. This decoder only supports a restart interval of
/// zero (no restart markers in the entropy stream).
pub(crate) fn parse_dri(ctx: &mut DecodeContext, cursor: &mut Cursor<&[u8]>) -> Result<(), DecodeErrors> {
    let length = read_u16_be(cursor)?;
    if length != 4 {
        return Err(DecodeErrors::LengthMismatch(format!(
            "DRI segment length {} must be 4",
            length
        )));
    }
    let interval = read_u16_be(cursor)?;
    if interval != 0 {
        return Err(DecodeErrors::UnsupportedFeature(
            "Non-zero restart intervals are not supported".to_string(),
        ));
    }
    ctx.restart_interval = interval;
    Ok(())
}

/// Read the entropy-coded segment following SOS, up to (but not
/// including) the terminating EOI marker, undoing `0xFF 0x00` byte
/// stuffing.
///
/// Since this decoder rejects any non-zero restart interval during DRI
/// parsing, a restart marker appearing here means the stream lied about
/// its own restart interval, which we treat as structurally invalid.
/// EOI is the only marker allowed to end the payload: anything else
/// (including simply running out of bytes) is a structural error.
pub(crate) fn extract_entropy_payload(cursor: &mut Cursor<&[u8]>) -> Result<Vec<u8>, DecodeErrors> {
    let mut payload = Vec::new();

    loop {
        let byte = read_u8(cursor).map_err(|_| {
            DecodeErrors::StructuralError(
                "Entropy-coded segment ran out of data before reaching EOI".to_string(),
            )
        })?;

        if byte != 0xFF {
            payload.push(byte);
            continue;
        }

        let next = read_u8(cursor)?;
        match next {
            0x00 => payload.push(0xFF),
            0xFF => {
                // Fill byte before the real marker code; put it back by
                // rewinding one byte and retrying.
                cursor.seek(SeekFrom::Current(-1)).ok();
            }
            0xD0..=0xD7 => {
                return Err(DecodeErrors::StructuralError(
                    "Encountered a restart marker but the restart interval was zero".to_string(),
                ))
            }
            0xD9 => {
                // EOI: rewind the two marker bytes so the caller can read
                // it normally and confirm it itself.
                cursor.seek(SeekFrom::Current(-2)).ok();
                break;
            }
            other => {
                return Err(DecodeErrors::StructuralError(format!(
                    "Expected EOI to terminate the entropy-coded segment, found marker 0xFF{:02X}",
                    other
                )))
            }
        }
    }

    Ok(payload)
}
