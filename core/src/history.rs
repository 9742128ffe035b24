//! Rebuild a history segment from text preceding the composition.
//!
//! When a conversion starts in the middle of existing text, the trailing run
//! of same-script characters can serve as context for the decoder. Only
//! number and alphabet runs are connective enough to be worth reconstructing.

use crate::pos::PosMatcher;
use crate::segments::{Candidate, SegmentType, Segments};
use crate::utils::{self, ScriptType};

/// Extracts the last substring of one script type.
///
/// One trailing space is tolerated; two are not:
/// - "" -> None
/// - "x " -> ("x", Alphabet)
/// - "x  " -> None
/// - "C60" -> ("60", Number)
/// - "200x" -> ("x", Alphabet)
fn extract_last_token_with_script_type(text: &str) -> Option<(String, ScriptType)> {
    let mut iter = text.chars().rev().peekable();

    let first = *iter.peek()?;
    if first == ' ' {
        iter.next();
        match iter.peek() {
            None => return None,
            Some(' ') => return None,
            Some(_) => {}
        }
    }

    let script = utils::script_type(*iter.peek()?);
    let mut reversed: Vec<char> = Vec::new();
    for ch in iter {
        if ch == ' ' || utils::script_type(ch) != script {
            break;
        }
        reversed.push(ch);
    }
    reversed.reverse();
    Some((reversed.into_iter().collect(), script))
}

/// Thin facade that materializes the trailing connective part of preceding
/// text as one history segment.
#[derive(Debug, Clone)]
pub struct HistoryReconstructor {
    pos_matcher: PosMatcher,
}

impl HistoryReconstructor {
    pub fn new(pos_matcher: PosMatcher) -> Self {
        Self { pos_matcher }
    }

    /// Append one `History` segment built from `preceding_text`. The caller
    /// decides whether to clear the buffer first.
    pub fn reconstruct_history(&self, preceding_text: &str, segments: &mut Segments) -> bool {
        let Some((key, value, id)) = self.last_connective_part(preceding_text) else {
            return false;
        };

        let segment = segments.add_segment();
        segment.set_key(key.clone());
        segment.set_segment_type(SegmentType::History);
        let mut candidate = Candidate::new(key, value);
        candidate.lid = id;
        candidate.rid = id;
        candidate.attributes |= Candidate::NO_LEARNING;
        segment.push_candidate(candidate);
        true
    }

    /// The trailing same-script substring usable as preceding context, with
    /// its half-width key and POS id. Only NUMBER and ALPHABET qualify.
    pub fn last_connective_part(&self, preceding_text: &str) -> Option<(String, String, u16)> {
        let (token, script) = extract_last_token_with_script_type(preceding_text)?;
        match script {
            ScriptType::Number => Some((
                utils::to_halfwidth(&token),
                token,
                self.pos_matcher.number_id(),
            )),
            ScriptType::Alphabet => Some((
                utils::to_halfwidth(&token),
                token,
                self.pos_matcher.unique_noun_id(),
            )),
            _ => None,
        }
    }
}
