//! Country detection from alias tables.

use lazy_static::lazy_static;
use regex::Regex;

use super::{ExtractionMatch, FieldExtractor};

/// A canonical country name and the aliases that identify it.
#[derive(Debug)]
pub struct CountryPattern {
    /// Canonical name stored in the `country` field.
    pub name: &'static str,
    /// Names, abbreviations and local spellings, tried in order.
    pub aliases: &'static [&'static str],
}

/// Country alias table.
///
/// Order matters: detection walks countries top to bottom and each alias
/// list left to right, and the first alias found anywhere in the text wins.
pub static COUNTRY_PATTERNS: &[CountryPattern] = &[
    CountryPattern { name: "United States", aliases: &["USA", "US", "United States", "America"] },
    CountryPattern { name: "United Kingdom", aliases: &["UK", "GB", "United Kingdom", "England"] },
    CountryPattern { name: "Germany", aliases: &["Germany", "Deutschland", "DE"] },
    CountryPattern { name: "France", aliases: &["France", "FR"] },
    CountryPattern { name: "Italy", aliases: &["Italy", "Italia", "IT"] },
    CountryPattern { name: "Spain", aliases: &["Spain", "España", "ES"] },
    CountryPattern { name: "Canada", aliases: &["Canada", "CA"] },
    CountryPattern { name: "Australia", aliases: &["Australia", "AU"] },
    CountryPattern { name: "Japan", aliases: &["Japan", "JP", "日本"] },
    CountryPattern { name: "South Korea", aliases: &["South Korea", "Korea", "KR", "韩国"] },
    CountryPattern { name: "China", aliases: &["China", "CN", "中国"] },
    CountryPattern { name: "India", aliases: &["India", "IN"] },
    CountryPattern { name: "Singapore", aliases: &["Singapore", "SG"] },
    CountryPattern { name: "Netherlands", aliases: &["Netherlands", "NL", "Holland"] },
];

/// ISO 3166 alpha-2 codes by country name or common alias.
static COUNTRY_CODES: &[(&str, &str)] = &[
    ("United States", "US"),
    ("USA", "US"),
    ("United Kingdom", "GB"),
    ("UK", "GB"),
    ("Canada", "CA"),
    ("Australia", "AU"),
    ("Germany", "DE"),
    ("France", "FR"),
    ("Italy", "IT"),
    ("Spain", "ES"),
    ("Netherlands", "NL"),
    ("Belgium", "BE"),
    ("Japan", "JP"),
    ("South Korea", "KR"),
    ("China", "CN"),
    ("India", "IN"),
    ("Brazil", "BR"),
    ("Mexico", "MX"),
    ("Singapore", "SG"),
    ("Malaysia", "MY"),
    ("Thailand", "TH"),
    ("Vietnam", "VN"),
];

lazy_static! {
    // (country index, alias, case-insensitive literal), in table order
    static ref ALIAS_PATTERNS: Vec<(usize, &'static str, Regex)> = COUNTRY_PATTERNS
        .iter()
        .enumerate()
        .flat_map(|(idx, country)| {
            country.aliases.iter().map(move |alias| {
                let pattern = Regex::new(&format!("(?i){}", regex::escape(alias))).unwrap();
                (idx, *alias, pattern)
            })
        })
        .collect();
}

/// Look up the ISO code for a country name (case-insensitive).
pub fn country_code(name: &str) -> Option<&'static str> {
    let name = name.trim();
    COUNTRY_CODES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}

/// A detected country.
#[derive(Debug, Clone)]
pub struct CountryMatch {
    /// Table entry that matched.
    pub country: &'static CountryPattern,
    /// The alias that was found.
    pub alias: &'static str,
    /// Byte span of the first occurrence of the alias.
    pub position: (usize, usize),
    pattern: &'static Regex,
}

impl CountryMatch {
    /// Canonical country name.
    pub fn name(&self) -> &'static str {
        self.country.name
    }

    /// Confidence of the match, lower for short aliases.
    pub fn confidence(&self) -> f32 {
        alias_confidence(self.alias)
    }

    /// The detection as a field match over `text`, the text it was found in.
    pub fn to_extraction(&self, text: &str) -> ExtractionMatch<String> {
        let (start, end) = self.position;
        ExtractionMatch::new(self.name().to_string(), self.confidence(), &text[start..end])
            .with_position(start, end)
    }

    /// Remove every case-insensitive occurrence of the matched alias.
    ///
    /// Other aliases of the same country are left untouched.
    pub fn strip_from(&self, text: &str) -> String {
        self.pattern.replace_all(text, "").into_owned()
    }
}

/// Find the first table alias present in `text`.
pub fn detect_country(text: &str) -> Option<CountryMatch> {
    ALIAS_PATTERNS.iter().find_map(|(idx, alias, pattern)| {
        pattern.find(text).map(|m| CountryMatch {
            country: &COUNTRY_PATTERNS[*idx],
            alias: *alias,
            position: (m.start(), m.end()),
            pattern,
        })
    })
}

/// Country field extractor over [`COUNTRY_PATTERNS`].
pub struct CountryExtractor;

impl CountryExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Detect the country, keeping the alias so it can be stripped.
    pub fn detect(&self, text: &str) -> Option<CountryMatch> {
        detect_country(text)
    }
}

impl Default for CountryExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn alias_confidence(alias: &str) -> f32 {
    // Two-letter codes also occur inside ordinary words
    if alias.chars().count() <= 3 { 0.5 } else { 0.85 }
}

impl FieldExtractor for CountryExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.detect(text).map(|m| m.to_extraction(text))
    }

    /// Every country with at least one alias present, in table order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();
        for (idx, alias, pattern) in ALIAS_PATTERNS.iter() {
            let name = COUNTRY_PATTERNS[*idx].name;
            if results.iter().any(|r| r.value == name) {
                continue;
            }
            if let Some(m) = pattern.find(text) {
                results.push(
                    ExtractionMatch::new(name.to_string(), alias_confidence(alias), m.as_str())
                        .with_position(m.start(), m.end()),
                );
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_alias_maps_to_canonical_name() {
        assert_eq!(detect_country("London, UK").unwrap().name(), "United Kingdom");
        assert_eq!(detect_country("Berlin, Deutschland").unwrap().name(), "Germany");
        assert_eq!(detect_country("東京都 日本").unwrap().name(), "Japan");
        assert_eq!(detect_country("Madrid, ESPAÑA").unwrap().name(), "Spain");
    }

    #[test]
    fn test_table_order_beats_text_order() {
        // Germany appears first in the text, but United Kingdom is earlier in the table
        let m = detect_country("Deutschland office, shipping via England").unwrap();
        assert_eq!(m.name(), "United Kingdom");
        assert_eq!(m.alias, "England");
    }

    #[test]
    fn test_strip_removes_only_matched_alias() {
        let m = detect_country("uk branch, UK, United Kingdom").unwrap();
        assert_eq!(m.alias, "UK");
        assert_eq!(m.strip_from("uk branch, UK, United Kingdom"), " branch, , United Kingdom");
    }

    #[test]
    fn test_no_country() {
        assert!(detect_country("hello world").is_none());
        assert!(CountryExtractor::new().extract("hello world").is_none());
    }

    #[test]
    fn test_extract_all_lists_each_country_once() {
        let found = CountryExtractor::new().extract_all("France, Paris FR; Japan");
        let names: Vec<&str> = found.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(names, vec!["France", "Japan"]);
    }

    #[test]
    fn test_country_code_lookup() {
        assert_eq!(country_code("united kingdom"), Some("GB"));
        assert_eq!(country_code(" Vietnam "), Some("VN"));
        assert_eq!(country_code("Atlantis"), None);
    }

    #[test]
    fn test_every_table_country_has_code() {
        for country in COUNTRY_PATTERNS {
            assert!(country_code(country.name).is_some(), "{}", country.name);
        }
    }
}
