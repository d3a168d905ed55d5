use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Hyphen, en dash and em dash all separate words in role labels.
const DASHES: [char; 3] = ['-', '\u{2013}', '\u{2014}'];

/// Fold a free-text label into a comparable form.
///
/// Lower-cases, turns dashes into spaces, strips diacritics (NFD, then drops
/// combining marks), collapses whitespace runs and trims. `None` folds to the
/// empty string. Applying it twice gives the same result as applying it once.
pub fn normalize(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    let folded: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if DASHES.contains(&c) { ' ' } else { c })
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when `token` appears in `haystack` as a whole word.
///
/// Words are maximal runs of ASCII alphanumerics and underscores, which is
/// what a `\b` boundary sees in an already-normalized label.
pub fn has_token(haystack: &str, token: &str) -> bool {
    haystack
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|word| word == token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_case_dashes_and_accents() {
        let expected = "droit de visite";
        assert_eq!(normalize(Some("Droit-De-Visite")), expected);
        assert_eq!(normalize(Some("droit de visite")), expected);
        assert_eq!(normalize(Some("DROIT DE VISITÉ")), "droit de visite");
        assert_eq!(normalize(Some("droit\u{2013}de\u{2014}visite")), expected);
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize(Some("  Enfant \t  garde   alternée \n")), "enfant garde alternee");
        assert_eq!(normalize(Some("enfant - dv")), "enfant dv");
    }

    #[test]
    fn test_normalize_empty_and_missing() {
        assert_eq!(normalize(None), "");
        assert_eq!(normalize(Some("")), "");
        assert_eq!(normalize(Some("   ")), "");
        assert_eq!(normalize(Some("---")), "");
    }

    #[test]
    fn test_normalize_precomposed_and_decomposed_agree() {
        // "é" as a single code point and as "e" + combining acute
        assert_eq!(normalize(Some("alternée")), normalize(Some("alterne\u{301}e")));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "Conjointe",
            "Enfant – garde alternée",
            "ENFANT (DV)",
            "  Ça   c'est-à-dire  ",
            "İstanbul",
            "Œuvre ÆØÅ ß",
            "\u{1F600} emoji—dash",
            "ǅemal",
            "",
        ];
        for sample in samples {
            let once = normalize(Some(sample));
            assert_eq!(normalize(Some(&once)), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_has_token() {
        assert!(has_token("enfant (dv)", "dv"));
        assert!(has_token("dv", "dv"));
        assert!(has_token("enfant/dv/2019", "dv"));
        assert!(!has_token("enfant dvd", "dv"));
        assert!(!has_token("enfant advantage", "dv"));
        assert!(!has_token("enfant_dv", "dv"));
    }
}
