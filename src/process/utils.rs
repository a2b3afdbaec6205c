use unicode_normalization::UnicodeNormalization;

/// Compatibility-decompose (NFKD) and trim. Turns non-breaking spaces
/// into plain ones before the trim so they are stripped too.
pub fn normalize_text(raw: &str) -> String {
    let decomposed: String = raw.nfkd().collect();
    decomposed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_non_breaking_space() {
        assert_eq!(normalize_text("\u{a0}Rank\u{a0}"), "Rank");
        assert_eq!(normalize_text("Tony\u{a0}Smith"), "Tony Smith");
    }

    #[test]
    fn decomposes_compatibility_forms() {
        // "ﬁ" ligature and fullwidth digits
        assert_eq!(normalize_text("\u{fb01}rm \u{ff11}"), "firm 1");
    }

    #[test]
    fn whitespace_only_becomes_empty() {
        assert_eq!(normalize_text(" \n\t "), "");
    }
}
