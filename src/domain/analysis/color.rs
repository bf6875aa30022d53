//! Color token normalization
//!
//! Maps free-text color names and loosely formatted hex values into
//! canonical uppercase `#RRGGBB` strings. Normalization is pure and
//! idempotent: feeding an already-normalized value back in returns it
//! unchanged.

use once_cell::sync::Lazy;
use regex::Regex;

/// Neutral fallback for tokens that match nothing in the table.
pub const FALLBACK_GRAY: &str = "#808080";

static HEX_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid hex pattern"));

/// Name table, ordered most-specific first so that the substring pass
/// resolves "dark brown sofa" before plain "brown" gets a chance.
static NAMED_COLORS: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("dark brown", "#3B2005"),
        ("light brown", "#A67B5B"),
        ("dark gray", "#404040"),
        ("dark grey", "#404040"),
        ("light gray", "#D3D3D3"),
        ("light grey", "#D3D3D3"),
        ("light blue", "#ADD8E6"),
        ("navy blue", "#000080"),
        ("off white", "#FAF9F6"),
        ("charcoal", "#36454F"),
        ("walnut", "#5C4033"),
        ("mahogany", "#4A0404"),
        ("espresso", "#3C2218"),
        ("natural", "#E8DCC8"),
        ("beige", "#F5F5DC"),
        ("cream", "#FFFDD0"),
        ("ivory", "#FFFFF0"),
        ("tan", "#D2B48C"),
        ("brown", "#8B4513"),
        ("white", "#FFFFFF"),
        ("black", "#000000"),
        ("gray", "#808080"),
        ("grey", "#808080"),
        ("silver", "#C0C0C0"),
        ("gold", "#FFD700"),
        ("navy", "#000080"),
        ("teal", "#008080"),
        ("turquoise", "#40E0D0"),
        ("blue", "#1E5AA8"),
        ("olive", "#808000"),
        ("sage", "#9CAF88"),
        ("emerald", "#046307"),
        ("green", "#2E7D32"),
        ("mustard", "#E1AD01"),
        ("yellow", "#FFD000"),
        ("rust", "#B7410E"),
        ("terracotta", "#E2725B"),
        ("orange", "#ED7117"),
        ("burgundy", "#800020"),
        ("maroon", "#800000"),
        ("red", "#C62828"),
        ("blush", "#F4C2C2"),
        ("pink", "#E91E63"),
        ("lavender", "#B57EDC"),
        ("purple", "#6A0DAD"),
    ]
});

/// Normalizes a free-form color token into `#RRGGBB`.
pub fn normalize(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return FALLBACK_GRAY.to_string();
    }

    if let Some(captures) = HEX_PATTERN.captures(trimmed) {
        return expand_hex(&captures[1]);
    }

    let lowered = trimmed.to_lowercase();

    // Exact name lookup before any fuzzy matching.
    for (name, hex) in NAMED_COLORS.iter() {
        if *name == lowered {
            return (*hex).to_string();
        }
    }

    // Substring pass in both directions, first table entry wins.
    for (name, hex) in NAMED_COLORS.iter() {
        if lowered.contains(name) || name.contains(lowered.as_str()) {
            return (*hex).to_string();
        }
    }

    FALLBACK_GRAY.to_string()
}

/// Finds the first table color name mentioned in free text, if any.
/// Table order applies, so "dark brown" wins over "brown".
pub fn detect_in_text(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(name, _)| lowered.contains(name))
        .map(|(name, _)| *name)
}

fn expand_hex(digits: &str) -> String {
    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };

    format!("#{}", expanded.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_color() {
        assert_eq!(normalize("Dark Brown"), "#3B2005");
        assert_eq!(normalize("white"), "#FFFFFF");
    }

    #[test]
    fn test_short_hex_expansion() {
        assert_eq!(normalize("#fff"), "#FFFFFF");
        assert_eq!(normalize("abc"), "#AABBCC");
    }

    #[test]
    fn test_full_hex_passthrough() {
        assert_eq!(normalize("#3b2005"), "#3B2005");
        assert_eq!(normalize("1E5AA8"), "#1E5AA8");
    }

    #[test]
    fn test_substring_match() {
        assert_eq!(normalize("dark brown leather"), "#3B2005");
        assert_eq!(normalize("navy fabric"), "#000080");
    }

    #[test]
    fn test_unknown_falls_back_to_gray() {
        assert_eq!(normalize("mystery-color"), "#808080");
        assert_eq!(normalize(""), "#808080");
    }

    #[test]
    fn test_idempotence() {
        for token in ["Dark Brown", "#fff", "mystery-color", "teal", "#AABBCC"] {
            let once = normalize(token);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_detect_in_text() {
        assert_eq!(detect_in_text("Dark Brown leather sofa"), Some("dark brown"));
        assert_eq!(detect_in_text("plain futon"), None);
    }

    #[test]
    fn test_output_shape() {
        let pattern = Regex::new(r"^#[0-9A-F]{6}$").unwrap();
        for token in ["red", "#0f0", "velvet", "", "Dark Brown", "charcoal gray"] {
            assert!(pattern.is_match(&normalize(token)), "bad output for {token:?}");
        }
    }
}
