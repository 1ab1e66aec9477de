//! Keyword classification of normalized icon names.
//!
//! A name is mapped to one category and one color tag. Both lookups are
//! first-match-wins over declaration order: the first category whose keyword
//! occurs as a substring of the name wins, even when a later category would
//! also match.
//!
//! # Examples
//!
//! ```
//! use iconsort::classifier::Classifier;
//!
//! let classifier = Classifier::default();
//! assert_eq!(classifier.classify_category("battery_toggle.svg"), "status_bar");
//! assert_eq!(classifier.classify_color("wifi_black.svg"), "black");
//! assert_eq!(classifier.classify_category("unknown_icon.svg"), "misc");
//! assert_eq!(classifier.classify_color("unknown_icon.svg"), "default");
//! ```

use crate::normalizer::canonicalize;

/// Name of the bucket for names no keyword matches.
pub const DEFAULT_CATCH_ALL: &str = "misc";

/// Color tag for names without a color keyword.
pub const DEFAULT_COLOR_TAG: &str = "default";

/// Color keywords checked when no configuration overrides them.
pub const DEFAULT_COLORS: &[&str] = &["black", "white", "gray", "red", "blue", "green", "yellow"];

/// A named category with its keywords, in match order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Ordered category vocabulary with a trailing catch-all.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    rules: Vec<CategoryRule>,
    catch_all: String,
}

impl CategoryTable {
    /// Creates a table with no categories; everything resolves to `catch_all`.
    pub fn new(catch_all: &str) -> Self {
        Self {
            rules: Vec::new(),
            catch_all: catch_all.to_string(),
        }
    }

    /// Creates the standard icon vocabulary.
    pub fn standard() -> Self {
        let mut table = Self::new(DEFAULT_CATCH_ALL);
        table.populate_standard_categories();
        table
    }

    fn populate_standard_categories(&mut self) {
        self.add_category(
            "status_bar",
            &[
                "battery", "wifi", "signal", "airplane", "clock", "alarm", "hotspot", "volume",
                "dnd", "silent",
            ],
        );
        self.add_category(
            "quick_settings",
            &[
                "toggle",
                "brightness",
                "rotation",
                "bluetooth",
                "airplane",
                "mobile_data",
                "hotspot",
                "dark_mode",
            ],
        );
        self.add_category(
            "notifications",
            &[
                "warning",
                "error",
                "alert",
                "dnd",
                "notification",
                "chat",
                "message",
                "mail",
                "calendar",
                "alarm",
            ],
        );
        self.add_category(
            "actions",
            &[
                "send", "forward", "back", "play", "pause", "stop", "menu", "reply", "undo",
                "redo", "attach", "delete",
            ],
        );
        self.add_category(
            "system",
            &[
                "settings",
                "power",
                "reboot",
                "screenshot",
                "systemui",
                "volume",
                "keyguard",
                "lock",
                "unlock",
            ],
        );
        self.add_category(
            "media",
            &[
                "camera",
                "video",
                "microphone",
                "gallery",
                "image",
                "photo",
                "record",
                "edit",
            ],
        );
        self.add_category(
            "navigation",
            &[
                "arrow", "chevron", "up", "down", "left", "right", "more", "home", "back",
            ],
        );
    }

    /// Appends a category after all existing ones. Keywords are
    /// canonicalized like names so `Dark-Mode` matches `dark_mode.svg`.
    pub fn add_category<S: AsRef<str>>(&mut self, name: &str, keywords: &[S]) {
        self.rules.push(CategoryRule {
            name: name.to_string(),
            keywords: keywords
                .iter()
                .map(|keyword| canonicalize(keyword.as_ref()))
                .collect(),
        });
    }

    /// Returns the category of the first keyword found in `name`, or the
    /// catch-all.
    pub fn classify(&self, name: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|keyword| name.contains(keyword.as_str())))
            .map(|rule| rule.name.as_str())
            .unwrap_or(&self.catch_all)
    }

    /// Declared categories in match order, without the catch-all.
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn catch_all(&self) -> &str {
        &self.catch_all
    }

    /// Every name `classify` can return, catch-all last.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .map(|rule| rule.name.as_str())
            .chain(std::iter::once(self.catch_all.as_str()))
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Ordered color keywords with a default tag.
#[derive(Debug, Clone)]
pub struct ColorTable {
    colors: Vec<String>,
    default_tag: String,
}

impl ColorTable {
    pub fn new<S: AsRef<str>>(colors: &[S], default_tag: &str) -> Self {
        Self {
            colors: colors
                .iter()
                .map(|color| canonicalize(color.as_ref()))
                .collect(),
            default_tag: default_tag.to_string(),
        }
    }

    /// Returns the first color keyword found in `name`, or the default tag.
    pub fn classify(&self, name: &str) -> &str {
        self.colors
            .iter()
            .find(|color| name.contains(color.as_str()))
            .map(String::as_str)
            .unwrap_or(&self.default_tag)
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn default_tag(&self) -> &str {
        &self.default_tag
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::new(DEFAULT_COLORS, DEFAULT_COLOR_TAG)
    }
}

/// Category and color resolved for one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: String,
    pub color: String,
}

/// Pairs the category and color vocabularies.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    categories: CategoryTable,
    colors: ColorTable,
}

impl Classifier {
    pub fn new(categories: CategoryTable, colors: ColorTable) -> Self {
        Self { categories, colors }
    }

    pub fn classify_category(&self, name: &str) -> &str {
        self.categories.classify(name)
    }

    pub fn classify_color(&self, name: &str) -> &str {
        self.colors.classify(name)
    }

    /// Runs both lookups on a normalized name.
    pub fn classify(&self, name: &str) -> Classification {
        Classification {
            category: self.classify_category(name).to_string(),
            color: self.classify_color(name).to_string(),
        }
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    pub fn colors(&self) -> &ColorTable {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_category_order() {
        let table = CategoryTable::standard();
        let names: Vec<&str> = table.names().collect();
        assert_eq!(
            names,
            vec![
                "status_bar",
                "quick_settings",
                "notifications",
                "actions",
                "system",
                "media",
                "navigation",
                "misc",
            ]
        );
    }

    #[test]
    fn test_classify_category_by_keyword() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify_category("wifi_off.svg"), "status_bar");
        assert_eq!(classifier.classify_category("brightness_low.svg"), "quick_settings");
        assert_eq!(classifier.classify_category("mail_outline.svg"), "notifications");
        assert_eq!(classifier.classify_category("pause_circle.svg"), "actions");
        assert_eq!(classifier.classify_category("reboot.svg"), "system");
        assert_eq!(classifier.classify_category("camera_front.svg"), "media");
        assert_eq!(classifier.classify_category("chevron_left.svg"), "navigation");
    }

    #[test]
    fn test_earlier_category_wins() {
        let classifier = Classifier::default();
        // battery (status_bar) and toggle (quick_settings)
        assert_eq!(classifier.classify_category("toggle_battery.svg"), "status_bar");
        // airplane is declared in both; status_bar comes first
        assert_eq!(classifier.classify_category("airplane_mode.svg"), "status_bar");
        // back is in actions and navigation
        assert_eq!(classifier.classify_category("arrow_back.svg"), "actions");
    }

    #[test]
    fn test_substring_matches_inside_tokens() {
        let classifier = Classifier::default();
        // "up" hides inside "popup"
        assert_eq!(classifier.classify_category("popup_frame.svg"), "navigation");
    }

    #[test]
    fn test_classify_is_total() {
        let classifier = Classifier::default();
        let categories: Vec<&str> = classifier.categories().names().collect();
        for name in ["", "x", "unknown_icon.svg", "🙂.svg", "wifi_red"] {
            assert!(categories.contains(&classifier.classify_category(name)));
            let color = classifier.classify_color(name);
            assert!(
                classifier.colors().colors().iter().any(|c| c == color)
                    || color == classifier.colors().default_tag()
            );
        }
        assert_eq!(classifier.classify_category(""), "misc");
        assert_eq!(classifier.classify_color(""), "default");
    }

    #[test]
    fn test_color_first_match_wins() {
        let colors = ColorTable::default();
        assert_eq!(colors.classify("wifi_white_black.svg"), "black");
        assert_eq!(colors.classify("dot_green.svg"), "green");
        assert_eq!(colors.classify("dot.svg"), "default");
    }

    #[test]
    fn test_custom_vocabulary() {
        let mut categories = CategoryTable::new("other");
        categories.add_category("weather", &["Sun", "cloud"]);
        categories.add_category("food", &["apple"]);
        let colors = ColorTable::new(&["Teal"], "plain");
        let classifier = Classifier::new(categories, colors);

        assert_eq!(
            classifier.classify("sun_teal.svg"),
            Classification {
                category: "weather".to_string(),
                color: "teal".to_string(),
            }
        );
        assert_eq!(classifier.classify_category("apple.svg"), "food");
        assert_eq!(classifier.classify_category("wifi.svg"), "other");
        assert_eq!(classifier.classify_color("wifi.svg"), "plain");
    }

    #[test]
    fn test_keywords_with_separators_match_normalized_names() {
        let mut categories = CategoryTable::new("misc");
        categories.add_category("theme", &["Dark-Mode", "night mode"]);
        let colors = ColorTable::new(&["Sky Blue"], "default");
        let classifier = Classifier::new(categories, colors);

        assert_eq!(classifier.classify_category("dark_mode.svg"), "theme");
        assert_eq!(classifier.classify_category("night_mode.svg"), "theme");
        assert_eq!(classifier.classify_color("cloud_sky_blue.svg"), "sky_blue");
    }

    #[test]
    fn test_empty_table_resolves_to_catch_all() {
        let table = CategoryTable::new("misc");
        assert_eq!(table.classify("battery.svg"), "misc");
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["misc"]);
    }
}
