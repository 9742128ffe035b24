//! Decoder seam.

use crate::request::ConversionRequest;
use crate::segments::Segments;

/// The deterministic decoder that fills candidates on the conversion suffix.
///
/// Implementations must honor pinned boundaries: a `FixedBoundary` segment
/// keeps its key length across re-decodes. Returning false means "no
/// candidates found" and is not fatal; rewriters may still contribute
/// candidates for keys like "12".
pub trait LatticeDecoder: Send + Sync {
    fn convert_for_request(&self, request: &ConversionRequest, segments: &mut Segments) -> bool;
}
