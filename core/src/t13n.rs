//! Transliteration variants for a reading.
//!
//! Every conversion segment carries a small fixed-length list of
//! transliterations of its key (the meta candidates). Public candidate
//! indices address them with negative numbers: `-1` is the first kind below.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::utils;

/// The transliteration kinds, in meta-candidate order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransliterationKind {
    Hiragana = 0,
    FullKatakana,
    HalfKatakana,
    HalfAscii,
    FullAscii,
}

/// Number of transliteration kinds; the candidate-index lower bound is the
/// negation of this.
pub const NUM_T13N_TYPES: usize = 5;

impl TransliterationKind {
    pub const ALL: [TransliterationKind; NUM_T13N_TYPES] = [
        TransliterationKind::Hiragana,
        TransliterationKind::FullKatakana,
        TransliterationKind::HalfKatakana,
        TransliterationKind::HalfAscii,
        TransliterationKind::FullAscii,
    ];

    /// The meta-candidate index addressing this kind (negative).
    pub fn index(self) -> i32 {
        -(self as i32) - 1
    }
}

// Unvoiced katakana and their half-width forms, zipped by position.
const FULLWIDTH_KATAKANA: &str = "ァアィイゥウェエォオカキクケコサシスセソタチッツテトナニヌネノハヒフヘホマミムメモャヤュユョヨラリルレロワヲンー。、「」・";
const HALFWIDTH_KATAKANA: &str = "ｧｱｨｲｩｳｪｴｫｵｶｷｸｹｺｻｼｽｾｿﾀﾁｯﾂﾃﾄﾅﾆﾇﾈﾉﾊﾋﾌﾍﾎﾏﾐﾑﾒﾓｬﾔｭﾕｮﾖﾗﾘﾙﾚﾛﾜｦﾝｰ｡､｢｣･";

static HALFWIDTH_TABLE: Lazy<HashMap<char, char>> = Lazy::new(|| {
    FULLWIDTH_KATAKANA
        .chars()
        .zip(HALFWIDTH_KATAKANA.chars())
        .collect()
});

const HALFWIDTH_VOICED_MARK: char = '\u{FF9E}';
const HALFWIDTH_SEMI_VOICED_MARK: char = '\u{FF9F}';

// Split a voiced katakana codepoint into its unvoiced base plus the
// half-width voicing mark.
fn decompose_voiced(ch: char) -> (char, Option<char>) {
    match ch {
        'ガ' | 'ギ' | 'グ' | 'ゲ' | 'ゴ' | 'ザ' | 'ジ' | 'ズ' | 'ゼ' | 'ゾ' | 'ダ' | 'ヂ'
        | 'ヅ' | 'デ' | 'ド' | 'バ' | 'ビ' | 'ブ' | 'ベ' | 'ボ' => (
            char::from_u32(ch as u32 - 1).unwrap_or(ch),
            Some(HALFWIDTH_VOICED_MARK),
        ),
        'パ' | 'ピ' | 'プ' | 'ペ' | 'ポ' => (
            char::from_u32(ch as u32 - 2).unwrap_or(ch),
            Some(HALFWIDTH_SEMI_VOICED_MARK),
        ),
        'ヴ' => ('ウ', Some(HALFWIDTH_VOICED_MARK)),
        _ => (ch, None),
    }
}

/// Convert full-width katakana to half-width katakana. Voiced sounds become
/// base + combining mark ("ガ" -> "ｶﾞ"). Unmapped characters pass through.
pub fn to_halfwidth_katakana(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        let (base, mark) = decompose_voiced(ch);
        match HALFWIDTH_TABLE.get(&base) {
            Some(half) => {
                out.push(*half);
                if let Some(mark) = mark {
                    out.push(mark);
                }
            }
            None => out.push(ch),
        }
    }
    out
}

/// Expand a reading into its transliteration variants, in kind order.
pub fn expand(key: &str) -> Vec<String> {
    let katakana = utils::hiragana_to_katakana(key);
    vec![
        utils::katakana_to_hiragana(key),
        katakana.clone(),
        to_halfwidth_katakana(&katakana),
        utils::to_halfwidth(key),
        utils::to_fullwidth(key),
    ]
}
