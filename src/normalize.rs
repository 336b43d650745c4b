// Name normalization used as the matching key for fuzzy lookups.

use unicode_normalization::UnicodeNormalization;

/// Bracket and punctuation characters dropped before comparison.
const STRIPPED: &[char] = &[
    '「', '」', '[', ']', '（', '）', '(', ')', '·', ',', '，', '。', '、', '《', '》', ':', '：',
];

/// Normalize a ninja name for matching.
///
/// NFKC-folds the input so full-width and half-width forms compare equal, drops
/// whitespace and the characters in [`STRIPPED`], then lower-cases.
pub fn normalize_name(s: &str) -> String {
    s.nfkc()
        .filter(|c| !c.is_whitespace() && !STRIPPED.contains(c))
        .flat_map(char::to_lowercase)
        .collect()
}
