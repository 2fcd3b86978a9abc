//! Frozen alias and tag tables (§4.8 "Aliases and tags").
//!
//! These power both the config normalizer and the migrator: a legacy
//! markdownlint name like `no-trailing-spaces` or a tag like `whitespace`
//! must resolve to the same canonical ids in both places.

/// `(legacy name/alias, canonical id)`. Lookups are case-sensitive on the
/// canonical id but callers normalize the alias side to lowercase first.
pub const RULE_ALIASES: &[(&str, &str)] = &[
    ("heading-increment", "MD001"),
    ("heading-style", "MD003"),
    ("ul-style", "MD004"),
    ("list-indent", "MD005"),
    ("ul-indent", "MD007"),
    ("no-trailing-spaces", "MD009"),
    ("no-hard-tabs", "MD010"),
    ("no-reversed-links", "MD011"),
    ("no-multiple-blanks", "MD012"),
    ("line-length", "MD013"),
    ("commands-show-output", "MD014"),
    ("no-missing-space-atx", "MD018"),
    ("no-multiple-space-atx", "MD019"),
    ("no-missing-space-closed-atx", "MD020"),
    ("no-multiple-space-closed-atx", "MD021"),
    ("blanks-around-headings", "MD022"),
    ("heading-start-left", "MD023"),
    ("no-duplicate-heading", "MD024"),
    ("single-title", "MD025"),
    ("single-h1", "MD025"),
    ("no-trailing-punctuation", "MD026"),
    ("no-multiple-space-blockquote", "MD027"),
    ("no-blanks-blockquote", "MD028"),
    ("ol-prefix", "MD029"),
    ("list-marker-space", "MD030"),
    ("blanks-around-fences", "MD031"),
    ("blanks-around-lists", "MD032"),
    ("no-inline-html", "MD033"),
    ("no-bare-urls", "MD034"),
    ("hr-style", "MD035"),
    ("no-emphasis-as-heading", "MD036"),
    ("no-space-in-emphasis", "MD037"),
    ("no-space-in-code", "MD038"),
    ("no-space-in-links", "MD039"),
    ("fenced-code-language", "MD040"),
    ("first-line-heading", "MD041"),
    ("first-line-h1", "MD041"),
    ("no-empty-links", "MD042"),
    ("required-headings", "MD043"),
    ("proper-names", "MD044"),
    ("no-alt-text", "MD045"),
    ("code-block-style", "MD046"),
    ("single-trailing-newline", "MD047"),
    ("code-fence-style", "MD048"),
    ("emphasis-style", "MD049"),
    ("strong-style", "MD050"),
    ("link-fragments", "MD051"),
    ("reference-links-images", "MD052"),
    ("link-image-reference-definitions", "MD053"),
    ("link-image-style", "MD054"),
    ("table-pipe-style", "MD055"),
    ("table-column-count", "MD056"),
    ("existing-relative-links", "MD057"),
    ("blanks-around-tables", "MD058"),
];

/// `(tag, member ids)`. Used by the migrator to mass-enable/disable and by
/// the CLI's `rules --category`-adjacent grouping.
pub const RULE_TAGS: &[(&str, &[&str])] = &[
    ("whitespace", &["MD009", "MD010", "MD012", "MD027", "MD030", "MD037", "MD038", "MD039"]),
    ("headings", &["MD001", "MD003", "MD018", "MD019", "MD020", "MD021", "MD022", "MD023", "MD024", "MD025", "MD026", "MD036", "MD041", "MD043"]),
    ("headers", &["MD001", "MD003", "MD018", "MD019", "MD020", "MD021", "MD022", "MD023", "MD024", "MD025", "MD026", "MD036", "MD041", "MD043"]),
    ("bullet", &["MD004", "MD005", "MD007", "MD029", "MD030", "MD032"]),
    ("ul", &["MD004", "MD005", "MD007", "MD030", "MD032"]),
    ("ol", &["MD005", "MD029", "MD030", "MD032"]),
    ("blank_lines", &["MD012", "MD022", "MD028", "MD031", "MD032", "MD058"]),
    ("html", &["MD033"]),
    ("code", &["MD014", "MD031", "MD038", "MD040", "MD046", "MD048"]),
    ("emphasis", &["MD036", "MD037", "MD049", "MD050"]),
    ("links", &["MD011", "MD034", "MD039", "MD042", "MD051", "MD052", "MD053", "MD054", "MD057"]),
    ("images", &["MD045", "MD052", "MD054"]),
    ("accessibility", &["MD045"]),
    ("hr", &["MD035"]),
    ("table", &["MD055", "MD056", "MD058"]),
    ("tables", &["MD055", "MD056", "MD058"]),
    ("blockquote", &["MD027", "MD028"]),
    ("language", &["MD044"]),
    ("spelling", &["MD044"]),
];

/// Resolves a raw alias string (case-insensitive) to a canonical id, or
/// `None` if it is not a known alias.
pub fn resolve_alias(key: &str) -> Option<&'static str> {
    let lower = key.to_ascii_lowercase();
    RULE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, id)| *id)
}

/// Resolves a tag name (case-insensitive) to its member id list.
pub fn resolve_tag(tag: &str) -> Option<&'static [&'static str]> {
    let lower = tag.to_ascii_lowercase();
    RULE_TAGS.iter().find(|(name, _)| *name == lower).map(|(_, ids)| *ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_aliases() {
        assert_eq!(resolve_alias("no-trailing-spaces"), Some("MD009"));
        assert_eq!(resolve_alias("single-h1"), Some("MD025"));
        assert_eq!(resolve_alias("SINGLE-H1"), Some("MD025"));
        assert_eq!(resolve_alias("not-a-real-alias"), None);
    }

    #[test]
    fn resolves_known_tags() {
        let whitespace = resolve_tag("whitespace").unwrap();
        assert!(whitespace.contains(&"MD009"));
        assert!(whitespace.contains(&"MD010"));
        assert!(resolve_tag("not-a-tag").is_none());
    }
}
