//! Shared harness for the orchestrator integration tests: a toy lexicon, a
//! recording stats sink and a converter wired from the default collaborators.
#![allow(dead_code)]

use std::sync::Arc;

use libjapanese_core::lexicon::{LexEntry, Lexicon, LexiconDecoder};
use libjapanese_core::{
    Converter, DictionaryPredictor, Modules, RecordingUsageStats, TransliterationRewriter,
    UserDict,
};

pub fn toy_lexicon() -> Arc<Lexicon> {
    let mut lexicon = Lexicon::new();
    lexicon.insert("あ", LexEntry::with_pos("亜", 3000, 100, 101));
    lexicon.insert("い", LexEntry::with_pos("胃", 3200, 102, 103));
    lexicon.insert("あい", LexEntry::with_pos("愛", 2500, 104, 105));
    lexicon.insert("あいて", LexEntry::with_pos("相手", 2600, 104, 105));
    lexicon.insert("わたし", LexEntry::with_pos("私", 2400, 106, 107));
    Arc::new(lexicon)
}

pub fn temp_userdict(name: &str) -> UserDict {
    let path = std::env::temp_dir().join(format!(
        "libjapanese_it_{}_{}_{}.redb",
        name,
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    UserDict::open(path).expect("open userdict")
}

pub struct TestConverter {
    pub converter: Converter,
    pub stats: Arc<RecordingUsageStats>,
    pub userdict: UserDict,
}

/// Converter over the toy lexicon with the default collaborators and a
/// recording stats sink.
pub fn test_converter(name: &str) -> TestConverter {
    test_converter_with_modules(name, Modules::new())
}

pub fn test_converter_with_modules(name: &str, modules: Modules) -> TestConverter {
    let lexicon = toy_lexicon();
    let userdict = temp_userdict(name);
    let stats = Arc::new(RecordingUsageStats::new());

    let decoder_lexicon = lexicon.clone();
    let predictor_lexicon = lexicon;
    let predictor_userdict = userdict.clone();
    let converter = Converter::with_factories(
        modules,
        move |_modules| Box::new(LexiconDecoder::new(decoder_lexicon)),
        move |_modules, _decoder| {
            Box::new(DictionaryPredictor::new(predictor_lexicon, predictor_userdict))
        },
        |_modules| Box::new(TransliterationRewriter::new()),
    )
    .with_usage_stats(stats.clone());

    TestConverter {
        converter,
        stats,
        userdict,
    }
}
