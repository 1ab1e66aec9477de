//! Filename normalization for icon files.
//!
//! Icon exports usually carry a platform prefix (`ic_`, `btn_`, ...) and mix
//! spaces, hyphens and upper case. Normalization turns those names into a
//! single canonical form so that classification and collision detection
//! work on comparable strings.
//!
//! # Examples
//!
//! ```
//! use iconsort::normalizer::NameNormalizer;
//!
//! let normalizer = NameNormalizer::default();
//! assert_eq!(normalizer.normalize("ic_Battery-Full.svg"), "battery_full.svg");
//! assert_eq!(normalizer.normalize("Wifi Off.svg"), "wifi_off.svg");
//! ```

use regex::{Regex, RegexBuilder};

/// Prefixes stripped when no configuration overrides them.
pub const DEFAULT_PREFIXES: &[&str] = &["ic_", "abc_", "btn_", "icn_"];

/// Strips known prefixes and canonicalizes separators and case.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    prefix_pattern: Option<Regex>,
}

impl NameNormalizer {
    /// Builds a normalizer for the given prefix set.
    ///
    /// Prefixes are canonicalized the same way names are, escaped, and
    /// compiled into one anchored case-insensitive alternation. Empty
    /// prefixes are ignored.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the combined pattern cannot be compiled
    /// (only possible for pathologically large prefix sets).
    pub fn new<S: AsRef<str>>(prefixes: &[S]) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = prefixes
            .iter()
            .map(|prefix| canonicalize(prefix.as_ref()))
            .filter(|prefix| !prefix.is_empty())
            .map(|prefix| regex::escape(&prefix))
            .collect();

        if alternatives.is_empty() {
            return Ok(Self {
                prefix_pattern: None,
            });
        }

        let pattern = format!("^(?:{})", alternatives.join("|"));
        let prefix_pattern = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()?;

        Ok(Self {
            prefix_pattern: Some(prefix_pattern),
        })
    }

    /// Normalizes a raw filename.
    ///
    /// Spaces and hyphens become underscores, the name is lowercased, and
    /// leading prefixes are removed until none matches. A name with a single
    /// prefix loses exactly that prefix; repeated application is a no-op.
    ///
    /// ```
    /// use iconsort::normalizer::NameNormalizer;
    ///
    /// let normalizer = NameNormalizer::default();
    /// let once = normalizer.normalize("IC_Signal Cellular-4.svg");
    /// assert_eq!(once, "signal_cellular_4.svg");
    /// assert_eq!(normalizer.normalize(&once), once);
    /// ```
    pub fn normalize(&self, raw: &str) -> String {
        let mut name = canonicalize(raw);

        if let Some(pattern) = &self.prefix_pattern {
            while let Some(end) = pattern.find(&name).map(|found| found.end()) {
                if end == 0 {
                    break;
                }
                name.replace_range(..end, "");
            }
        }

        name
    }
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIXES).expect("default prefixes form a valid pattern")
    }
}

/// Spaces and hyphens to underscores, then lowercase. Names and keywords
/// both go through this so they compare on equal terms.
pub fn canonicalize(raw: &str) -> String {
    raw.replace([' ', '-'], "_").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_each_default_prefix() {
        let normalizer = NameNormalizer::default();
        assert_eq!(normalizer.normalize("ic_wifi.svg"), "wifi.svg");
        assert_eq!(normalizer.normalize("abc_wifi.svg"), "wifi.svg");
        assert_eq!(normalizer.normalize("btn_wifi.svg"), "wifi.svg");
        assert_eq!(normalizer.normalize("icn_wifi.svg"), "wifi.svg");
    }

    #[test]
    fn test_prefix_match_is_case_insensitive() {
        let normalizer = NameNormalizer::default();
        assert_eq!(normalizer.normalize("IC_Wifi.svg"), "wifi.svg");
        assert_eq!(normalizer.normalize("Btn_Play.svg"), "play.svg");
    }

    #[test]
    fn test_prefix_only_matched_at_start() {
        let normalizer = NameNormalizer::default();
        assert_eq!(normalizer.normalize("music_ic_play.svg"), "music_ic_play.svg");
        assert_eq!(normalizer.normalize("topic_list.svg"), "topic_list.svg");
    }

    #[test]
    fn test_separators_and_case_unified() {
        let normalizer = NameNormalizer::default();
        assert_eq!(
            normalizer.normalize("ic_Battery-Full.svg"),
            "battery_full.svg"
        );
        assert_eq!(normalizer.normalize("Dark Mode-On.SVG"), "dark_mode_on.svg");
    }

    #[test]
    fn test_hyphenated_prefix_is_stripped() {
        let normalizer = NameNormalizer::default();
        assert_eq!(normalizer.normalize("ic-alarm.svg"), "alarm.svg");
    }

    #[test]
    fn test_idempotent() {
        let normalizer = NameNormalizer::default();
        let samples = [
            "ic_Battery-Full.svg",
            "ic_ic_nested.svg",
            "ic-abc_Mixed Up.svg",
            "",
            "README",
            "ic_",
            "plain.svg",
            "ÄBC-Ümlaut.svg",
        ];
        for sample in samples {
            let once = normalizer.normalize(sample);
            assert_eq!(normalizer.normalize(&once), once, "input: {sample:?}");
        }
    }

    #[test]
    fn test_empty_and_extensionless_input() {
        let normalizer = NameNormalizer::default();
        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize("Some Name"), "some_name");
        assert_eq!(normalizer.normalize("ic_"), "");
    }

    #[test]
    fn test_custom_prefixes() {
        let normalizer = NameNormalizer::new(&["mat_", "", "sym-"]).unwrap();
        assert_eq!(normalizer.normalize("mat_home.svg"), "home.svg");
        assert_eq!(normalizer.normalize("SYM-home.svg"), "home.svg");
        assert_eq!(normalizer.normalize("ic_home.svg"), "ic_home.svg");
    }

    #[test]
    fn test_prefix_metacharacters_are_literal() {
        let normalizer = NameNormalizer::new(&["a.b_"]).unwrap();
        assert_eq!(normalizer.normalize("a.b_icon.svg"), "icon.svg");
        assert_eq!(normalizer.normalize("axb_icon.svg"), "axb_icon.svg");
    }

    #[test]
    fn test_no_prefixes() {
        let empty: [&str; 0] = [];
        let normalizer = NameNormalizer::new(&empty).unwrap();
        assert_eq!(normalizer.normalize("ic_Home.svg"), "ic_home.svg");
    }
}
