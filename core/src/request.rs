//! Immutable request bundle for one conversion, suggestion or prediction.
//!
//! A `ConversionRequest` carries the composer-derived key, per-client protocol
//! flags and candidate budgets. It is built once per operation and never
//! mutated by the orchestrator.

use crate::utils;
use crate::Config;

/// What the session asks the orchestrator to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestType {
    /// Normal conversion.
    #[default]
    Conversion,
    /// Reverse conversion (surface to reading).
    ReverseConversion,
    /// Prediction requested explicitly (tab key).
    Prediction,
    /// Prediction shown automatically while typing.
    Suggestion,
    /// Prediction over the text before the cursor.
    PartialPrediction,
    /// Suggestion over the text before the cursor.
    PartialSuggestion,
}

/// Which composer query becomes the conversion key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ComposerKeySelection {
    /// The exact composition the user sees, e.g. "とうk".
    #[default]
    ConversionKey,
    /// The composition with the trailing unresolved romaji trimmed,
    /// e.g. "とう" for the composition "とうk".
    PredictionKey,
}

/// Read-only view of the composer state at request time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposerData {
    /// Fully resolved reading (kana).
    resolved: String,
    /// Trailing romaji not yet resolved to kana.
    pending: String,
    /// Cursor position in codepoints over the full composition.
    cursor: usize,
}

impl ComposerData {
    /// Composer with the cursor at the end of the composition.
    pub fn new<R: Into<String>, P: Into<String>>(resolved: R, pending: P) -> Self {
        let resolved = resolved.into();
        let pending = pending.into();
        let cursor = utils::char_len(&resolved) + utils::char_len(&pending);
        Self {
            resolved,
            pending,
            cursor,
        }
    }

    pub fn with_cursor<R: Into<String>, P: Into<String>>(
        resolved: R,
        pending: P,
        cursor: usize,
    ) -> Self {
        Self {
            resolved: resolved.into(),
            pending: pending.into(),
            cursor,
        }
    }

    /// The exact composition, trailing romaji included.
    pub fn query_for_conversion(&self) -> String {
        format!("{}{}", self.resolved, self.pending)
    }

    /// The composition with the trailing unresolved romaji trimmed.
    pub fn query_for_prediction(&self) -> &str {
        &self.resolved
    }

    /// Cursor position in codepoints.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Composition length in codepoints.
    pub fn len(&self) -> usize {
        utils::char_len(&self.resolved) + utils::char_len(&self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty() && self.pending.is_empty()
    }
}

/// Per-client protocol surface: capabilities and limits the front end set up
/// once per session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientRequest {
    /// Per-request cap on each segment's primary candidate list.
    pub candidates_size_limit: Option<usize>,
    /// Client shows suggestions on an empty key.
    pub zero_query_suggestion: bool,
    /// Client mixes conversion and prediction in one list.
    pub mixed_conversion: bool,
    /// Client asks for kana-modifier-insensitive matching.
    pub kana_modifier_insensitive_conversion: bool,
}

impl ClientRequest {
    /// Mobile clients identify themselves with both flags at once; they accept
    /// meta-candidate-only segments.
    pub fn is_mobile(&self) -> bool {
        self.zero_query_suggestion && self.mixed_conversion
    }
}

/// Tunables of a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub request_type: RequestType,

    /// Which composer query to use when deriving the key; see
    /// `ComposerKeySelection`.
    pub composer_key_selection: ComposerKeySelection,

    /// Key used for conversion, typically hiragana. Derived from the composer
    /// when left empty.
    pub key: String,

    pub max_conversion_candidates_size: usize,
    pub max_user_history_prediction_candidates_size: usize,
    pub max_user_history_prediction_candidates_size_for_zero_query: usize,
    pub max_dictionary_prediction_candidates_size: usize,

    /// Insert a top candidate from the full converter into realtime
    /// conversion results. Costly; off by default.
    pub use_actual_converter_for_realtime_conversion: bool,

    /// Skip rewriters that are too slow for realtime conversion.
    pub skip_slow_rewriters: bool,

    /// Create candidates that consume only a prefix of the key.
    pub create_partial_candidates: bool,

    /// Allow user history to bias conversion ranking.
    pub enable_user_history_for_conversion: bool,

    pub kana_modifier_insensitive_conversion: bool,

    /// Use the first conversion segment's key as-is instead of the composer
    /// query (the key already went through typing correction).
    pub use_already_typing_corrected_key: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            request_type: RequestType::Conversion,
            composer_key_selection: ComposerKeySelection::ConversionKey,
            key: String::new(),
            max_conversion_candidates_size: 200,
            max_user_history_prediction_candidates_size: 3,
            max_user_history_prediction_candidates_size_for_zero_query: 4,
            max_dictionary_prediction_candidates_size: 20,
            use_actual_converter_for_realtime_conversion: false,
            skip_slow_rewriters: false,
            create_partial_candidates: false,
            enable_user_history_for_conversion: true,
            kana_modifier_insensitive_conversion: true,
            use_already_typing_corrected_key: false,
        }
    }
}

impl RequestOptions {
    /// Copy the candidate budgets and matching flags from a `Config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_conversion_candidates_size: config.max_conversion_candidates_size,
            max_user_history_prediction_candidates_size: config
                .max_user_history_prediction_candidates_size,
            max_user_history_prediction_candidates_size_for_zero_query: config
                .max_user_history_prediction_candidates_size_for_zero_query,
            max_dictionary_prediction_candidates_size: config
                .max_dictionary_prediction_candidates_size,
            kana_modifier_insensitive_conversion: config.kana_modifier_insensitive_conversion,
            ..Default::default()
        }
    }
}

/// Immutable bundle of everything one orchestrator operation needs to know
/// about the session input.
#[derive(Debug, Clone, Default)]
pub struct ConversionRequest {
    composer: ComposerData,
    client: ClientRequest,
    options: RequestOptions,
}

impl ConversionRequest {
    /// Build a request. When `options.key` is empty the key is derived from
    /// the composer according to the request type and key selection.
    pub fn new(composer: ComposerData, client: ClientRequest, mut options: RequestOptions) -> Self {
        if options.key.is_empty() {
            options.key =
                Self::derive_key(&composer, options.request_type, options.composer_key_selection);
        }
        Self {
            composer,
            client,
            options,
        }
    }

    /// Shorthand for tests and internal re-decodes: an explicit key with
    /// default composer and client.
    pub fn with_type_and_key<K: Into<String>>(request_type: RequestType, key: K) -> Self {
        Self::new(
            ComposerData::default(),
            ClientRequest::default(),
            RequestOptions {
                request_type,
                key: key.into(),
                ..Default::default()
            },
        )
    }

    fn derive_key(
        composer: &ComposerData,
        request_type: RequestType,
        selection: ComposerKeySelection,
    ) -> String {
        match request_type {
            RequestType::Conversion if selection == ComposerKeySelection::ConversionKey => {
                composer.query_for_conversion()
            }
            RequestType::Conversion | RequestType::Prediction | RequestType::Suggestion => {
                composer.query_for_prediction().to_string()
            }
            RequestType::PartialPrediction | RequestType::PartialSuggestion => {
                let full = composer.query_for_conversion();
                utils::utf8_substring(&full, 0, composer.cursor())
            }
            RequestType::ReverseConversion => String::new(),
        }
    }

    pub fn request_type(&self) -> RequestType {
        self.options.request_type
    }

    pub fn key(&self) -> &str {
        &self.options.key
    }

    pub fn composer(&self) -> &ComposerData {
        &self.composer
    }

    pub fn client(&self) -> &ClientRequest {
        &self.client
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    pub fn max_conversion_candidates_size(&self) -> usize {
        self.options.max_conversion_candidates_size
    }

    pub fn max_user_history_prediction_candidates_size(&self) -> usize {
        self.options.max_user_history_prediction_candidates_size
    }

    pub fn max_user_history_prediction_candidates_size_for_zero_query(&self) -> usize {
        self.options
            .max_user_history_prediction_candidates_size_for_zero_query
    }

    pub fn max_dictionary_prediction_candidates_size(&self) -> usize {
        self.options.max_dictionary_prediction_candidates_size
    }

    pub fn skip_slow_rewriters(&self) -> bool {
        self.options.skip_slow_rewriters
    }

    pub fn create_partial_candidates(&self) -> bool {
        self.options.create_partial_candidates
    }

    pub fn enable_user_history_for_conversion(&self) -> bool {
        self.options.enable_user_history_for_conversion
    }

    /// Kana modifier insensitivity holds only when both the client and the
    /// request options ask for it.
    pub fn is_kana_modifier_insensitive_conversion(&self) -> bool {
        self.client.kana_modifier_insensitive_conversion
            && self.options.kana_modifier_insensitive_conversion
    }
}
