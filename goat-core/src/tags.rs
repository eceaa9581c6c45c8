//! Struct-tag parsing, mirroring the host language's permissive
//! `key:"value"` convention (Go's `reflect.StructTag`): a malformed
//! tag is not a parse error, it is simply dropped and a warning is
//! recorded.

use regex::Regex;

use once_cell::sync::Lazy;

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<key>[A-Za-z0-9_]+):"(?P<value>(?:[^"\\]|\\.)*)""#).expect("valid regex")
});

/// Parses a raw struct tag string into its key/value pairs. Pairs
/// that don't match the `key:"value"` shape are simply absent from
/// the result; callers decide whether a missing key they need
/// constitutes a warning.
pub fn parse_tag(raw: &str) -> Vec<(String, String)> {
    TAG_RE
        .captures_iter(raw)
        .map(|c| (c["key"].to_string(), c["value"].to_string()))
        .collect()
}

/// Looks up a single tag key, e.g. `env` or `required`.
pub fn tag_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_keys() {
        let pairs = parse_tag(r#"env:"LOG_LEVEL" required:"false""#);
        assert_eq!(tag_value(&pairs, "env"), Some("LOG_LEVEL"));
        assert_eq!(tag_value(&pairs, "required"), Some("false"));
    }

    #[test]
    fn ignores_malformed_tag() {
        let pairs = parse_tag(r#"env:LOG_LEVEL"#);
        assert!(tag_value(&pairs, "env").is_none());
    }

    #[test]
    fn empty_tag_yields_no_pairs() {
        assert!(parse_tag("").is_empty());
    }
}
