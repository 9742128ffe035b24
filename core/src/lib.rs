//! libjapanese-core
//!
//! Conversion orchestrator for a Japanese input method engine: the segmented
//! conversion buffer, candidate lifecycle, prediction/rewriting pipeline and
//! conversation history shared by front-end crates.
//!
//! This crate provides the orchestrator plus small production-ready default
//! collaborators using FST for the lexicon, bincode for serialization, and
//! redb for the user history store only.
//!
//! Public API:
//! - `Segments` / `Segment` / `Candidate` - Segmented conversion buffer
//! - `ConversionRequest` - Immutable request bundle derived from the composer
//! - `Converter` - Orchestrator over decoder, predictor and rewriter
//! - `Lexicon` / `LexiconDecoder` - Reading lookup and per-segment decoding
//! - `UserDict` - Persistent user learning for prediction
//! - `Config` - Configuration and feature flags

use serde::{Deserialize, Serialize};

// Core modules
pub mod segments;
pub use segments::{Candidate, RevertEntry, Segment, SegmentType, Segments};

pub mod request;
pub use request::{
    ClientRequest, ComposerData, ComposerKeySelection, ConversionRequest, RequestOptions,
    RequestType,
};

pub mod converter;
pub use converter::Converter;

pub mod decoder;
pub use decoder::LatticeDecoder;

pub mod predictor;
pub use predictor::{DictionaryPredictor, Predictor};

pub mod rewriter;
pub use rewriter::{ResizeSegmentsRequest, Rewriter, TransliterationRewriter};

pub mod lexicon;
pub use lexicon::{LexEntry, Lexicon, LexiconDecoder, LexiconError};

pub mod userdict;
pub use userdict::UserDict;

pub mod suppression;
pub use suppression::SuppressionDictionary;

pub mod pos;
pub use pos::PosMatcher;

pub mod stats;
pub use stats::{NullUsageStats, RecordingUsageStats, UsageStats};

pub mod history;
pub use history::HistoryReconstructor;

pub mod reverse;
pub use reverse::ReverseConverter;

pub mod modules;
pub use modules::{Modules, UserDictionaryControl};

pub mod t13n;
pub use t13n::{TransliterationKind, NUM_T13N_TYPES};

/// A (reading, surface) pair blocked from candidate lists.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SuppressedEntry {
    pub key: String,
    pub value: String,
}

/// Orchestrator configuration.
///
/// This config contains only engine-agnostic orchestration fields. Decoder
/// internals (connection costs, dictionary paths, etc.) belong to the decoder
/// implementation that is plugged into the `Converter`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// How many committed segments are retained as conversation history.
    /// Clamped to the buffer-level maximum (32) when applied.
    pub max_history_segments_size: usize,

    // Candidate budget defaults, copied into requests built from this config.
    /// Upper bound for candidates produced by the decoder per segment.
    pub max_conversion_candidates_size: usize,
    /// Upper bound for user-history prediction candidates.
    pub max_user_history_prediction_candidates_size: usize,
    /// Upper bound for user-history prediction candidates on an empty key.
    pub max_user_history_prediction_candidates_size_for_zero_query: usize,
    /// Upper bound for dictionary prediction candidates.
    pub max_dictionary_prediction_candidates_size: usize,

    /// Treat kana voicing marks as insensitive during conversion.
    pub kana_modifier_insensitive_conversion: bool,

    /// Blocked (reading, surface) pairs, loaded into the suppression
    /// dictionary at startup.
    pub suppressed: Vec<SuppressedEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Matches the buffer default installed on every new conversion.
            max_history_segments_size: 4,
            max_conversion_candidates_size: 200,
            max_user_history_prediction_candidates_size: 3,
            max_user_history_prediction_candidates_size_for_zero_query: 4,
            max_dictionary_prediction_candidates_size: 20,
            kana_modifier_insensitive_conversion: true,
            suppressed: vec![],
        }
    }
}

impl Config {
    /// Read configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::from_toml_str(&std::fs::read_to_string(path)?)?)
    }

    /// Write configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        Ok(std::fs::write(path, self.to_toml_string()?)?)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Render configuration as a TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Utility helpers.
pub mod utils {
    /// Canonical form of a reading before it is used as a lookup key:
    /// surrounding whitespace dropped, then NFC so precomposed and combining
    /// kana spellings collide.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.trim().nfc().collect()
    }

    /// Number of Unicode codepoints in `s`.
    pub fn char_len(s: &str) -> usize {
        s.chars().count()
    }

    /// Substring of `s` by codepoint offsets: `len` codepoints starting at
    /// codepoint `start`. Truncated at the end of the string.
    pub fn utf8_substring(s: &str, start: usize, len: usize) -> String {
        s.chars().skip(start).take(len).collect()
    }

    // The full-width block mirrors printable ASCII codepoint for codepoint
    // (U+FF01 is "！" for U+0021 "!"), so both directions are a single offset.
    const FULLWIDTH_ASCII_OFFSET: u32 = 0xFF01 - 0x21;
    const IDEOGRAPHIC_SPACE: char = '\u{3000}';

    fn widen_char(ch: char) -> char {
        if ch == ' ' {
            IDEOGRAPHIC_SPACE
        } else if ch.is_ascii_graphic() {
            char::from_u32(ch as u32 + FULLWIDTH_ASCII_OFFSET).unwrap_or(ch)
        } else {
            ch
        }
    }

    fn narrow_char(ch: char) -> char {
        if ch == IDEOGRAPHIC_SPACE {
            return ' ';
        }
        match (ch as u32).checked_sub(FULLWIDTH_ASCII_OFFSET) {
            Some(narrowed @ 0x21..=0x7E) => char::from_u32(narrowed).unwrap_or(ch),
            _ => ch,
        }
    }

    /// Widen printable ASCII to its full-width clone; everything else passes
    /// through.
    pub fn to_fullwidth(s: &str) -> String {
        s.chars().map(widen_char).collect()
    }

    /// Narrow full-width ASCII clones back to plain ASCII; everything else
    /// passes through.
    pub fn to_halfwidth(s: &str) -> String {
        s.chars().map(narrow_char).collect()
    }

    /// Convert hiragana codepoints to katakana. Other characters pass through.
    pub fn hiragana_to_katakana(s: &str) -> String {
        s.chars()
            .map(|ch| match ch {
                '\u{3041}'..='\u{3096}' => char::from_u32(ch as u32 + 0x60).unwrap_or(ch),
                _ => ch,
            })
            .collect()
    }

    /// Convert katakana codepoints to hiragana. Other characters pass through.
    pub fn katakana_to_hiragana(s: &str) -> String {
        s.chars()
            .map(|ch| match ch {
                '\u{30A1}'..='\u{30F6}' => char::from_u32(ch as u32 - 0x60).unwrap_or(ch),
                _ => ch,
            })
            .collect()
    }

    /// Coarse script classification of a single codepoint.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ScriptType {
        Number,
        Alphabet,
        Hiragana,
        Katakana,
        Kanji,
        Other,
    }

    /// Classify a codepoint. Full-width digits and letters fold into their
    /// half-width classes so that "Ｃ６０" and "C60" classify identically.
    pub fn script_type(ch: char) -> ScriptType {
        match ch {
            '0'..='9' | '\u{FF10}'..='\u{FF19}' => ScriptType::Number,
            'a'..='z' | 'A'..='Z' | '\u{FF21}'..='\u{FF3A}' | '\u{FF41}'..='\u{FF5A}' => {
                ScriptType::Alphabet
            }
            '\u{3041}'..='\u{309F}' => ScriptType::Hiragana,
            '\u{30A0}'..='\u{30FF}' | '\u{FF66}'..='\u{FF9D}' => ScriptType::Katakana,
            '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' => ScriptType::Kanji,
            _ => ScriptType::Other,
        }
    }

}
