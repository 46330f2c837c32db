//! Active keyboard layout.
//!
//! Listener tools report either the layout name (`us`, `ru(phonetic)`)
//! or the active group index, which is resolved against the configured
//! layout list.

pub const PLACEHOLDER: &str = "??";

/// Group index carried by a numeric payload.
pub fn group_index(payload: &str) -> Option<usize> {
    payload.trim().parse().ok()
}

/// Upper-cased layout name without its `(variant)` suffix.
pub fn format_name(name: &str) -> String {
    let name = name.trim();
    let base = name.split_once('(').map_or(name, |(base, _)| base).trim();
    if base.is_empty() {
        return PLACEHOLDER.to_string();
    }
    base.to_uppercase()
}

/// Resolves a group index against the layout list.
pub fn format_group(group: usize, layouts: &[String]) -> String {
    layouts
        .get(group)
        .map_or_else(|| PLACEHOLDER.to_string(), |name| format_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_name() {
        assert_eq!(format_name("us\n"), "US");
        assert_eq!(format_name("ru(phonetic)"), "RU");
        assert_eq!(format_name(""), "??");
        assert_eq!(format_name("(intl)"), "??");
    }

    #[test]
    fn test_group_index() {
        assert_eq!(group_index("1\n"), Some(1));
        assert_eq!(group_index("us"), None);
    }

    #[test]
    fn test_format_group() {
        let layouts = vec!["us".to_string(), "de(nodeadkeys)".to_string()];
        assert_eq!(format_group(0, &layouts), "US");
        assert_eq!(format_group(1, &layouts), "DE");
        assert_eq!(format_group(2, &layouts), "??");
    }
}
