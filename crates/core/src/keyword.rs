use regex::{Regex, RegexBuilder};

pub const MIN_TOKEN_CHARS: usize = 2;
pub const MAX_TOKENS: usize = 8;

/// Fields a keyword query must match in, any one of them being enough.
pub const KEYWORD_FIELDS: [&str; 4] = ["name", "description", "category", "tags"];

/// Case-insensitive OR-query over the product text fields.
///
/// The query text is split on whitespace; tokens shorter than two characters
/// are dropped and at most eight are kept. Stores receive the tokens and the
/// escaped alternation pattern and decide how to execute them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordQuery {
    tokens: Vec<String>,
}

impl KeywordQuery {
    pub fn parse(text: &str) -> Self {
        let tokens = text
            .split_whitespace()
            .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
            .take(MAX_TOKENS)
            .map(str::to_string)
            .collect();
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens escaped for literal matching and joined as a regex alternation.
    pub fn pattern(&self) -> String {
        self.tokens
            .iter()
            .map(|token| regex::escape(token))
            .collect::<Vec<_>>()
            .join("|")
    }

    /// `None` when there is nothing to match.
    pub fn compile(&self) -> Result<Option<Regex>, regex::Error> {
        if self.is_empty() {
            return Ok(None);
        }
        RegexBuilder::new(&self.pattern())
            .case_insensitive(true)
            .build()
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_short_tokens_and_caps_count() {
        let query = KeywordQuery::parse("a red mug b one two three four five six seven eight");
        assert_eq!(query.tokens().len(), MAX_TOKENS);
        assert_eq!(query.tokens()[0], "red");
        assert!(!query.tokens().iter().any(|token| token == "a" || token == "b"));
    }

    #[test]
    fn pattern_escapes_regex_metacharacters() {
        let query = KeywordQuery::parse("usb-c (2m) c++");
        assert_eq!(query.pattern(), r"usb\-c|\(2m\)|c\+\+");

        let regex = query.compile().expect("pattern compiles").expect("non-empty query");
        assert!(regex.is_match("Braided USB-C cable"));
        assert!(regex.is_match("Modern C++ handbook"));
        assert!(!regex.is_match("usb a cable"));
    }

    #[test]
    fn blank_query_has_no_pattern() {
        let query = KeywordQuery::parse("   x  ");
        assert!(query.is_empty());
        assert!(query.compile().expect("empty compile is ok").is_none());
    }
}
