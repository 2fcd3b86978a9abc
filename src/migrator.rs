//! Markdownlint-to-rumdl configuration migration (§4.8 "Migration").
//!
//! Grounded on `markdownlint_config.rs` in the teacher: a generic key/value
//! map is loaded from the foreign file, each key is resolved against the
//! same alias table the native config normalizer uses, and each value is
//! translated into the shape a `RuleConfigEntry` expects.

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::aliases;
use crate::config::value::Value;
use crate::config::RuleConfigEntry;

#[derive(Debug, Clone, thiserror::Error)]
pub enum MigrationError {
    #[error("read {path}: {message}")]
    Read { path: String, message: String },
    #[error("refusing to migrate a JavaScript config file: {path} (rumdl cannot evaluate .cjs/.mjs)")]
    JavaScriptConfig { path: String },
    #[error("parse {path}: {message}")]
    Parse { path: String, message: String },
}

/// One migrated rule's worth of configuration, plus the warnings produced
/// while translating it.
pub struct MigrationResult {
    pub rules: BTreeMap<String, RuleConfigEntry>,
    pub warnings: Vec<String>,
}

/// Migrates a markdownlint config file (JSON, JSONC, or YAML) into the
/// native rule-config shape. Never touches the filesystem beyond reading
/// `path`; callers decide how to persist the result.
pub fn migrate_file(path: &Path) -> Result<MigrationResult, MigrationError> {
    let path_str = path.display().to_string();

    if has_extension(path, &["cjs", "mjs"]) {
        return Err(MigrationError::JavaScriptConfig { path: path_str });
    }

    let text = std::fs::read_to_string(path).map_err(|e| MigrationError::Read {
        path: path_str.clone(),
        message: e.to_string(),
    })?;

    let raw: BTreeMap<String, Value> = if has_extension(path, &["yaml", "yml"]) {
        let yaml_value: serde_yml::Value = serde_yml::from_str(&text).map_err(|e| MigrationError::Parse {
            path: path_str.clone(),
            message: e.to_string(),
        })?;
        yaml_mapping_to_table(yaml_value)
    } else {
        let stripped = strip_jsonc_comments(&text);
        let json_value: serde_json::Value = serde_json::from_str(&stripped).map_err(|e| MigrationError::Parse {
            path: path_str.clone(),
            message: e.to_string(),
        })?;
        json_object_to_table(json_value)
    };

    Ok(migrate_table(raw))
}

fn has_extension(path: &Path, exts: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| exts.iter().any(|want| e.eq_ignore_ascii_case(want)))
        .unwrap_or(false)
}

fn yaml_mapping_to_table(value: serde_yml::Value) -> BTreeMap<String, Value> {
    let converted: Value = value.into();
    match converted {
        Value::Table(map) => map,
        _ => BTreeMap::new(),
    }
}

fn json_object_to_table(value: serde_json::Value) -> BTreeMap<String, Value> {
    let converted: Value = value.into();
    match converted {
        Value::Table(map) => map,
        _ => BTreeMap::new(),
    }
}

/// Strips `//` and `/* */` comments from a JSON document, leaving string
/// literal contents untouched (§4.8's JSONC handling).
pub fn strip_jsonc_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some((_, c)) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek().map(|(_, n)| *n) == Some('/') => {
                chars.next();
                for (_, next) in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek().map(|(_, n)| *n) == Some('*') => {
                chars.next();
                let mut prev = '\0';
                for (_, next) in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    prev = next;
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Translates a raw key/value table into native rule config entries,
/// handling the special top-level keys (`$schema`, `default`, `extends`)
/// and known tags before falling through to per-rule translation.
fn migrate_table(raw: BTreeMap<String, Value>) -> MigrationResult {
    let mut warnings = Vec::new();
    let mut rules: BTreeMap<String, RuleConfigEntry> = BTreeMap::new();

    let default_enabled = match raw.get("default") {
        Some(Value::Bool(b)) => {
            if !*b {
                warnings.push(
                    "default: false sets every rule's baseline to disabled; only rules explicitly re-enabled \
                     in this file will run"
                        .to_string(),
                );
            }
            *b
        }
        _ => true,
    };

    if raw.contains_key("$schema") {
        // Dropped silently: rumdl has no equivalent schema-pointer concept.
    }

    if let Some(extends) = raw.get("extends") {
        let target = extends.as_str().unwrap_or("<non-string>");
        warnings.push(format!(
            "extends: {target} is not followed; migrate the referenced file separately and merge by hand"
        ));
    }

    for (key, value) in &raw {
        if key == "default" || key == "$schema" || key == "extends" {
            continue;
        }

        if let Some(members) = aliases::resolve_tag(key) {
            let enabled = value.is_truthy_scalar();
            for id in members {
                rules
                    .entry((*id).to_string())
                    .or_default()
                    .enabled = Some(enabled);
            }
            continue;
        }

        match aliases::resolve_alias(key).or_else(|| is_canonical(key).then_some(key.as_str())) {
            Some(id) => {
                let entry = translate_value(value, default_enabled);
                merge_entry(rules.entry(id.to_string()).or_default(), entry);
            }
            None => {
                warnings.push(format!("unknown key {key:?}; skipping"));
            }
        }
    }

    MigrationResult { rules, warnings }
}

fn is_canonical(key: &str) -> bool {
    key.len() == 5 && key.starts_with("MD") && key[2..].bytes().all(|b| b.is_ascii_digit())
}

fn merge_entry(base: &mut RuleConfigEntry, over: RuleConfigEntry) {
    if over.enabled.is_some() {
        base.enabled = over.enabled;
    }
    if over.severity.is_some() {
        base.severity = over.severity;
    }
    if over.auto_fix.is_some() {
        base.auto_fix = over.auto_fix;
    }
    for (k, v) in over.options {
        base.options.insert(k, v);
    }
}

/// The value-translation table (§4.9): `true`/`false` set `enabled`
/// directly; `null` disables the rule; a mapping becomes the rule's
/// `options` with `enabled: true`; any other bare scalar is stored under
/// the implicit `"value"` option key with `enabled: true`, mirroring the
/// teacher's single-value fallback.
fn translate_value(value: &Value, _default_enabled: bool) -> RuleConfigEntry {
    match value {
        Value::Bool(b) => RuleConfigEntry {
            enabled: Some(*b),
            ..Default::default()
        },
        Value::Null => RuleConfigEntry {
            enabled: Some(false),
            ..Default::default()
        },
        Value::Table(map) => {
            let mut options = map.clone();
            // `style`/`stern` style markdownlint-specific key renames are
            // left to individual rules' option accessors rather than
            // rewritten here, keeping this table rule-agnostic.
            options.remove("default");
            RuleConfigEntry {
                enabled: Some(true),
                severity: None,
                auto_fix: None,
                options,
            }
        }
        other => {
            let mut options = BTreeMap::new();
            options.insert("value".to_string(), other.clone());
            RuleConfigEntry {
                enabled: Some(true),
                severity: None,
                auto_fix: None,
                options,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_and_block_comments_outside_strings() {
        let input = "{\n  // comment\n  \"a\": 1, /* block */ \"b\": \"text // not a comment\"\n}";
        let stripped = strip_jsonc_comments(input);
        let value: serde_json::Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(value["a"], 1);
        assert_eq!(value["b"], "text // not a comment");
    }

    #[test]
    fn translates_bool_true_to_enabled() {
        let mut raw = BTreeMap::new();
        raw.insert("no-trailing-spaces".to_string(), Value::Bool(false));
        let result = migrate_table(raw);
        assert_eq!(result.rules["MD009"].enabled, Some(false));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn translates_mapping_to_options() {
        let mut raw = BTreeMap::new();
        let mut opts = BTreeMap::new();
        opts.insert("line_length".to_string(), Value::Int(120));
        raw.insert("line-length".to_string(), Value::Table(opts));
        let result = migrate_table(raw);
        assert_eq!(result.rules["MD013"].options.get("line_length"), Some(&Value::Int(120)));
        assert_eq!(result.rules["MD013"].enabled, Some(true));
    }

    #[test]
    fn translates_null_to_disabled() {
        let mut raw = BTreeMap::new();
        raw.insert("line-length".to_string(), Value::Null);
        let result = migrate_table(raw);
        assert_eq!(result.rules["MD013"].enabled, Some(false));
    }

    #[test]
    fn expands_known_tag_to_members() {
        let mut raw = BTreeMap::new();
        raw.insert("whitespace".to_string(), Value::Bool(false));
        let result = migrate_table(raw);
        assert_eq!(result.rules["MD009"].enabled, Some(false));
        assert_eq!(result.rules["MD010"].enabled, Some(false));
    }

    #[test]
    fn unknown_key_produces_warning() {
        let mut raw = BTreeMap::new();
        raw.insert("totally-made-up-rule".to_string(), Value::Bool(true));
        let result = migrate_table(raw);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("totally-made-up-rule"));
    }

    #[test]
    fn extends_key_warns_and_is_not_followed() {
        let mut raw = BTreeMap::new();
        raw.insert("extends".to_string(), Value::String("../base.json".to_string()));
        let result = migrate_table(raw);
        assert!(result.warnings.iter().any(|w| w.contains("extends")));
        assert!(result.rules.is_empty());
    }

    #[test]
    fn schema_key_dropped_silently() {
        let mut raw = BTreeMap::new();
        raw.insert("$schema".to_string(), Value::String("https://example.com/schema.json".to_string()));
        let result = migrate_table(raw);
        assert!(result.warnings.is_empty());
        assert!(result.rules.is_empty());
    }

    #[test]
    fn default_false_flips_explicit_true_semantics() {
        let mut raw = BTreeMap::new();
        raw.insert("default".to_string(), Value::Bool(false));
        raw.insert("no-hard-tabs".to_string(), Value::Bool(true));
        let result = migrate_table(raw);
        assert_eq!(result.rules["MD010"].enabled, Some(true));
        assert!(result.warnings.iter().any(|w| w.contains("default: false")));
    }

    #[test]
    fn js_config_file_is_refused() {
        let path = Path::new("/tmp/does-not-matter.cjs");
        let err = migrate_file(path).unwrap_err();
        assert!(matches!(err, MigrationError::JavaScriptConfig { .. }));
    }
}
