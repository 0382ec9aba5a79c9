//! The addressable fragment carries the selected tags, comma-joined.

/// Splits a fragment into tags. A leading `#` is ignored; blank and repeated
/// entries are dropped and the first occurrence keeps its position.
pub fn parse(fragment: &str) -> Vec<String> {
    let raw = fragment.strip_prefix('#').unwrap_or(fragment);
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(str::trim) {
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_owned());
        }
    }
    tags
}

pub fn format(tags: &[String]) -> String {
    tags.join(",")
}
