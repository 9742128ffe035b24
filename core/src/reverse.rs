//! Reverse conversion facade: surface form to reading.

use tracing::warn;

use crate::decoder::LatticeDecoder;
use crate::request::{ConversionRequest, RequestType};
use crate::segments::{Candidate, Segments};

/// Normalize a math expression: full-width numbers and math symbols become
/// their half-width equivalents. Returns None if the input contains anything
/// that is not a math character.
pub fn try_normalizing_key_as_math_expression(s: &str) -> Option<String> {
    let mut key = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '0'..='9' => key.push(ch),
            // Full-width arabic numbers ("０" -- "９")
            '\u{FF10}'..='\u{FF19}' => {
                key.push(char::from_u32(ch as u32 - 0xFF10 + '0' as u32).unwrap_or(ch))
            }
            '+' | '\u{FF0B}' => key.push('+'),
            '-' | '\u{30FC}' => key.push('-'),
            '*' | '\u{FF0A}' | '\u{00D7}' => key.push('*'),
            '/' | '\u{FF0F}' | '\u{30FB}' | '\u{00F7}' => key.push('/'),
            '(' | '\u{FF08}' => key.push('('),
            ')' | '\u{FF09}' => key.push(')'),
            '=' | '\u{FF1D}' => key.push('='),
            _ => return None,
        }
    }
    Some(key)
}

/// Thin facade over the decoder for surface-to-reading conversion.
pub struct ReverseConverter<'d> {
    decoder: &'d dyn LatticeDecoder,
}

impl<'d> ReverseConverter<'d> {
    pub fn new(decoder: &'d dyn LatticeDecoder) -> Self {
        Self { decoder }
    }

    /// Fill `segments` with the reading of `key`. The buffer must already
    /// hold the segment carrying `key`.
    pub fn reverse_convert(&self, key: &str, segments: &mut Segments) -> bool {
        // A math expression has no chance of getting a correct reading from
        // the decoder; return the normalized value directly.
        if let Some(value) = try_normalizing_key_as_math_expression(key) {
            if segments.segments_size() == 0 {
                segments.add_segment().set_key(key);
            }
            let segment = segments.segment_mut(0);
            segment.push_candidate(Candidate::new(key, value));
            return true;
        }

        let request = ConversionRequest::with_type_and_key(RequestType::ReverseConversion, key);
        if !self.decoder.convert_for_request(&request, segments) {
            return false;
        }
        if segments.segments_size() == 0 {
            warn!("no segments from reverse conversion");
            return false;
        }
        for segment in segments.iter() {
            if segment.candidates_size() == 0 || segment.candidate(0).value.is_empty() {
                segments.clear();
                warn!("got an empty segment from reverse conversion");
                return false;
            }
        }
        true
    }
}
