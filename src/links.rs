//! `Link` header parsing.
//!
//! Entries are split with the pattern `, *<`, not a full RFC 8288 grammar. An
//! unquoted comma inside a parameter value that is immediately followed by `<`
//! will split the entry in two. Callers depending on the existing behavior rely
//! on this quirk, so it is kept.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Attributes of one link: `url` plus every `key=value` parameter.
pub type LinkRecord = HashMap<String, String>;

const ENTRY_SEPARATOR_PATTERN: &str = ", *<";
const REPLACE_CHARS: &[char] = &[' ', '\'', '"'];
const URL_STRIP_CHARS: &[char] = &['<', '>', ' ', '\'', '"'];

static ENTRY_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(ENTRY_SEPARATOR_PATTERN)
        .expect("Failed to compile link entry separator - this is a bug")
});

/// Parses a raw `Link` header into one record per entry.
///
/// A parameter without `=` ends parameter parsing for its entry; the entry and
/// everything parsed before it are kept.
///
/// ```
/// use tlsbatch::links::parse_header_links;
///
/// let links = parse_header_links(r#"<http://a/front.jpeg>; rel=front; type="image/jpeg""#);
/// assert_eq!(links[0]["url"], "http://a/front.jpeg");
/// assert_eq!(links[0]["type"], "image/jpeg");
/// ```
pub fn parse_header_links(value: &str) -> Vec<LinkRecord> {
    let value = value.trim_matches(REPLACE_CHARS);
    if value.is_empty() {
        return Vec::new();
    }
    ENTRY_SEPARATOR.split(value).map(parse_link_entry).collect()
}

fn parse_link_entry(entry: &str) -> LinkRecord {
    let (url, params) = entry.split_once(';').unwrap_or((entry, ""));

    let mut link = LinkRecord::new();
    link.insert("url".to_string(), url.trim_matches(URL_STRIP_CHARS).to_string());

    for param in params.split(';') {
        let Some((key, value)) = param.split_once('=') else {
            break;
        };
        link.insert(
            key.trim_matches(REPLACE_CHARS).to_string(),
            value.trim_matches(REPLACE_CHARS).to_string(),
        );
    }
    link
}

/// Folds parsed links into a map keyed by `rel`, or by `url` when `rel` is
/// missing or empty. Later entries win on key collision.
pub fn resolve_links(header: Option<&str>) -> HashMap<String, LinkRecord> {
    let mut resolved = HashMap::new();
    let Some(header) = header else {
        return resolved;
    };

    for link in parse_header_links(header) {
        let key = link
            .get("rel")
            .filter(|rel| !rel.is_empty())
            .or_else(|| link.get("url"))
            .cloned()
            .unwrap_or_default();
        resolved.insert(key, link);
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_entries_keyed_by_rel() {
        let links = resolve_links(Some("<http://a>; rel=front, <http://b>; rel=back"));
        assert_eq!(links.len(), 2);
        assert_eq!(links["front"]["url"], "http://a");
        assert_eq!(links["back"]["url"], "http://b");
    }

    #[test]
    fn test_absent_or_empty_header() {
        assert!(resolve_links(None).is_empty());
        assert!(resolve_links(Some("")).is_empty());
        assert!(resolve_links(Some("  \"' ")).is_empty());
        assert!(parse_header_links("").is_empty());
    }

    #[test]
    fn test_missing_rel_falls_back_to_url() {
        let links = resolve_links(Some(r#"<http://example.com/style.css>; type="text/css""#));
        assert_eq!(links.len(), 1);
        let link = &links["http://example.com/style.css"];
        assert_eq!(link["type"], "text/css");
        assert!(!link.contains_key("rel"));
    }

    #[test]
    fn test_empty_rel_falls_back_to_url() {
        let links = resolve_links(Some("<http://x>; rel=\"\""));
        assert!(links.contains_key("http://x"));
    }

    #[test]
    fn test_quoted_params_and_no_space_separator() {
        let links = parse_header_links(
            r#"<http:/.../front.jpeg>; rel=front; type="image/jpeg",<http://.../back.jpeg>; rel=back;type='image/jpeg'"#,
        );
        assert_eq!(links.len(), 2);
        assert_eq!(links[0]["url"], "http:/.../front.jpeg");
        assert_eq!(links[0]["type"], "image/jpeg");
        assert_eq!(links[1]["rel"], "back");
        assert_eq!(links[1]["type"], "image/jpeg");
    }

    #[test]
    fn test_param_without_equals_stops_entry() {
        let links = parse_header_links("<http://a>; rel=next; crossorigin; type=foo, <http://b>; rel=prev");
        assert_eq!(links.len(), 2);
        assert_eq!(links[0]["rel"], "next");
        assert!(!links[0].contains_key("type"));
        assert!(!links[0].contains_key("crossorigin"));
        assert_eq!(links[1]["rel"], "prev");
    }

    #[test]
    fn test_entry_without_params() {
        let links = parse_header_links("<http://only>");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].len(), 1);
        assert_eq!(links[0]["url"], "http://only");
    }

    #[test]
    fn test_value_split_on_first_equals() {
        let links = parse_header_links("<http://a>; title=a=b");
        assert_eq!(links[0]["title"], "a=b");
    }

    #[test]
    fn test_comma_before_angle_bracket_splits_entry() {
        // Known limitation of the separator pattern.
        let links = parse_header_links(r#"<http://a>; title="one, <two>"; rel=next"#);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0]["url"], "http://a");
        assert_eq!(links[0]["title"], "one");
        assert_eq!(links[1]["url"], "two");
        assert_eq!(links[1]["rel"], "next");
    }

    #[test]
    fn test_last_one_wins_on_collision() {
        let links = resolve_links(Some("<http://a>; rel=next, <http://b>; rel=next"));
        assert_eq!(links.len(), 1);
        assert_eq!(links["next"]["url"], "http://b");
    }
}
