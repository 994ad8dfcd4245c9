//! Text cleanup applied to the caption before it is sent for synthesis.

use unicode_general_category::{get_general_category, GeneralCategory};
use unicode_normalization::UnicodeNormalization;

/// True for every character in general category C (Cc, Cf, Cs, Co, Cn).
pub fn is_other_category(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::Surrogate
            | GeneralCategory::PrivateUse
            | GeneralCategory::Unassigned
    )
}

/// NFKC-normalize and drop category-C characters (newlines included).
///
/// Category-C characters are removed once before normalizing as well: a
/// format character such as ZWJ can sit between a base letter and a
/// combining mark, and dropping it only afterwards would leave text that a
/// second pass composes differently.
pub fn sanitize_for_speech(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| !is_other_category(*c)).collect();
    stripped.nfkc().filter(|c| !is_other_category(*c)).collect()
}
