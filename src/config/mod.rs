//! Configuration discovery, parsing, merging, validation and normalization
//! (§4.8). The persisted shape is the YAML document described in §6.3;
//! in-memory, `Config` additionally carries the CLI-only transient fields
//! (`fix`, `dry_run`, `jobs`, ...) so the whole merge pipeline can treat the
//! CLI as just another, highest-priority layer.

pub mod aliases;
pub mod value;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::Flavor;
use crate::registry::RuleRegistry;
use crate::rule::Severity;
use value::Value;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid flavor: {0}")]
    InvalidFlavor(String),
    #[error("invalid severity: {0}")]
    InvalidSeverity(String),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("invalid backup mode: {0}")]
    InvalidBackupMode(String),
    #[error("negative jobs value: {0}")]
    NegativeJobs(i64),
    #[error("malformed ignore glob {glob:?}: {message}")]
    MalformedIgnoreGlob { glob: String, message: String },
    #[error("environment variable {var}: {message}")]
    Env { var: &'static str, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupMode {
    #[default]
    Sidecar,
    None,
}

impl std::str::FromStr for BackupMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sidecar" => Ok(BackupMode::Sidecar),
            "none" => Ok(BackupMode::None),
            other => Err(format!("invalid backup mode: {other}")),
        }
    }
}

/// `mode` is `None` when a layer simply never mentioned backups at all,
/// so that merging doesn't mistake silence for an explicit choice of
/// `sidecar` (§4.8's scalar rule: override iff set). Callers that need a
/// concrete mode resolve it with `.unwrap_or_default()`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Backups {
    pub enabled: bool,
    pub mode: Option<BackupMode>,
}

impl Default for Backups {
    fn default() -> Self {
        Backups {
            enabled: false,
            mode: None,
        }
    }
}

/// A single rule's overrides within the `rules:` map (§6.3). All fields are
/// optional: absence means "inherit the rule's own default" at resolution
/// time (§4.5), not "set to a falsy value".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfigEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_fix: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, Value>,
}

impl RuleConfigEntry {
    /// Deep-merges `override_entry` onto `self`: later layer wins per key,
    /// including within `options` (§4.8 "Maps ... deep merge").
    fn merged_with(&self, over: &RuleConfigEntry) -> RuleConfigEntry {
        let mut options = self.options.clone();
        for (k, v) in &over.options {
            merge_value_into(options.entry(k.clone()).or_insert(Value::Null), v);
        }
        RuleConfigEntry {
            enabled: over.enabled.or(self.enabled),
            severity: over.severity.or(self.severity),
            auto_fix: over.auto_fix.or(self.auto_fix),
            options,
        }
    }
}

fn merge_value_into(base: &mut Value, over: &Value) {
    match (base, over) {
        (Value::Table(base_map), Value::Table(over_map)) => {
            for (k, v) in over_map {
                merge_value_into(base_map.entry(k.clone()).or_insert(Value::Null), v);
            }
        }
        (slot, other) => {
            *slot = other.clone();
        }
    }
}

/// The fully merged, in-memory configuration. Mirrors §6.3's persisted
/// shape plus the CLI-only transient fields from §3's data model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub flavor: Option<Flavor>,
    pub severity_default: Option<Severity>,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfigEntry>,
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub backups: Backups,

    // CLI-only transient fields; never read from a persisted file, only
    // ever set by the CLI / environment layers.
    #[serde(skip)]
    pub fix: bool,
    #[serde(skip)]
    pub dry_run: bool,
    #[serde(skip)]
    pub jobs: usize,
    #[serde(skip)]
    pub format: Option<String>,
    #[serde(skip)]
    pub rule_format: Option<String>,
    #[serde(skip)]
    pub enable_rules: Vec<String>,
    #[serde(skip)]
    pub disable_rules: Vec<String>,
    #[serde(skip)]
    pub fix_rules: Vec<String>,
    #[serde(skip)]
    pub no_backups: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            flavor: Some(Flavor::CommonMark),
            severity_default: Some(Severity::Warning),
            rules: BTreeMap::new(),
            ignore: Vec::new(),
            backups: Backups {
                enabled: true,
                mode: Some(BackupMode::Sidecar),
            },
            fix: false,
            dry_run: false,
            jobs: 0,
            format: Some("text".to_string()),
            rule_format: None,
            enable_rules: Vec::new(),
            disable_rules: Vec::new(),
            fix_rules: Vec::new(),
            no_backups: false,
        }
    }
}

impl Config {
    /// Layer 1: built-in defaults.
    pub fn defaults() -> Self {
        Config::default()
    }

    /// Merges `over` onto `self` per §4.8's three rule families: plain
    /// scalars take the override iff it is set to a non-empty value;
    /// top-level booleans take the override iff it is `true` (documented:
    /// a boolean cannot be un-set by a later layer); maps deep-merge.
    pub fn merged_with(&self, over: &Config) -> Config {
        let mut rules = self.rules.clone();
        for (id, entry) in &over.rules {
            rules
                .entry(id.clone())
                .and_modify(|base| *base = base.merged_with(entry))
                .or_insert_with(|| entry.clone());
        }

        Config {
            flavor: over.flavor.or(self.flavor),
            severity_default: over.severity_default.or(self.severity_default),
            rules,
            ignore: if over.ignore.is_empty() { self.ignore.clone() } else { over.ignore.clone() },
            backups: Backups {
                enabled: self.backups.enabled || over.backups.enabled,
                mode: over.backups.mode.or(self.backups.mode),
            },
            fix: self.fix || over.fix,
            dry_run: self.dry_run || over.dry_run,
            jobs: if over.jobs != 0 { over.jobs } else { self.jobs },
            format: over.format.clone().or_else(|| self.format.clone()),
            rule_format: over.rule_format.clone().or_else(|| self.rule_format.clone()),
            enable_rules: if over.enable_rules.is_empty() {
                self.enable_rules.clone()
            } else {
                over.enable_rules.clone()
            },
            disable_rules: if over.disable_rules.is_empty() {
                self.disable_rules.clone()
            } else {
                over.disable_rules.clone()
            },
            fix_rules: if over.fix_rules.is_empty() { self.fix_rules.clone() } else { over.fix_rules.clone() },
            no_backups: self.no_backups || over.no_backups,
        }
    }

    pub fn get_rule_severity(&self, rule_key: &str) -> Option<Severity> {
        self.rules.get(rule_key).and_then(|e| e.severity)
    }
}

/// Parsed result of a full resolve: the merged config plus any warnings
/// accumulated along the way (duplicate rule keys, unknown rule ids/options,
/// migrator notes).
#[derive(Debug, Clone, Default)]
pub struct LoadResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------
// Discovery (§4.8 "Discovery")
// ---------------------------------------------------------------------

const PROJECT_CONFIG_NAMES: &[&str] = &[".rumdl.yml", ".rumdl.yaml", "rumdl.yml", "rumdl.yaml"];
const VCS_MARKERS: &[&str] = &[".git", ".hg", ".svn"];

/// The platform-appropriate system config path. Missing files are simply
/// absent candidates, never errors.
pub fn system_config_path() -> PathBuf {
    #[cfg(windows)]
    {
        let base = std::env::var_os("ProgramData").unwrap_or_else(|| "C:\\ProgramData".into());
        PathBuf::from(base).join("rumdl").join("config.yaml")
    }
    #[cfg(not(windows))]
    {
        PathBuf::from("/etc/rumdl/config.yaml")
    }
}

/// `$XDG_CONFIG_HOME/rumdl/config.yaml`, falling back to `~/.config/rumdl`.
pub fn user_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("rumdl").join("config.yaml"))
}

/// Walks upward from `start`, looking for one of `PROJECT_CONFIG_NAMES` in
/// each ancestor. Stops at (and includes) the first ancestor containing a
/// VCS root marker, at the user's home directory, or at the filesystem root.
pub fn discover_project_config(start: &Path) -> Option<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let mut dir = start.to_path_buf();
    loop {
        for name in PROJECT_CONFIG_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        let is_vcs_root = VCS_MARKERS.iter().any(|marker| dir.join(marker).exists());
        let is_home = home.as_deref() == Some(dir.as_path());
        if is_vcs_root || is_home {
            return None;
        }
        match dir.parent() {
            Some(parent) => dir = parent.to_path_buf(),
            None => return None,
        }
    }
}

const FOREIGN_CONFIG_NAMES: &[&str] = &[
    ".markdownlint.json",
    ".markdownlint.jsonc",
    ".markdownlint.yaml",
    ".markdownlint.yml",
    ".markdownlint.cjs",
    ".markdownlint.mjs",
];

pub fn discover_foreign_config(dir: &Path) -> Option<PathBuf> {
    FOREIGN_CONFIG_NAMES.iter().map(|n| dir.join(n)).find(|p| p.is_file())
}

// ---------------------------------------------------------------------
// Loading persisted YAML (§6.3)
// ---------------------------------------------------------------------

/// Loads and parses a persisted YAML config file into a `Config` layer
/// (fields the file did not mention are left at `None`/empty so merging
/// behaves correctly). Returns `Ok(None)` for a missing file — missing
/// files are never errors (§4.8).
pub fn load_layer(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }
    log::debug!("loading configuration layer from {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let persisted: PersistedConfig = serde_yml::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(Some(persisted.into_config()))
}

/// The shape actually on disk (§6.3): a strict subset of `Config`'s fields,
/// all optional, so "the file didn't mention this key" is distinguishable
/// from "the file set it to a zero value".
#[derive(Debug, Default, Deserialize)]
struct PersistedConfig {
    flavor: Option<String>,
    severity_default: Option<String>,
    #[serde(default)]
    rules: BTreeMap<String, RuleConfigEntry>,
    ignore: Option<Vec<String>>,
    backups: Option<PersistedBackups>,
}

#[derive(Debug, Default, Deserialize)]
struct PersistedBackups {
    enabled: Option<bool>,
    mode: Option<String>,
}

impl PersistedConfig {
    fn into_config(self) -> Config {
        Config {
            flavor: self.flavor.and_then(|f| f.parse().ok()),
            severity_default: self.severity_default.and_then(|s| s.parse().ok()),
            rules: self.rules,
            ignore: self.ignore.unwrap_or_default(),
            backups: Backups {
                enabled: self.backups.as_ref().and_then(|b| b.enabled).unwrap_or(false),
                mode: self.backups.as_ref().and_then(|b| b.mode.as_deref()).and_then(|m| m.parse().ok()),
            },
            fix: false,
            dry_run: false,
            jobs: 0,
            format: None,
            rule_format: None,
            enable_rules: Vec::new(),
            disable_rules: Vec::new(),
            fix_rules: Vec::new(),
            no_backups: false,
        }
    }
}

// ---------------------------------------------------------------------
// Environment variables (§6.4)
// ---------------------------------------------------------------------

fn parse_env_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(ConfigError::Env {
            var,
            message: format!("expected true|false|1|0, got {other:?}"),
        }),
    }
}

fn parse_env_comma_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// Applies the fixed `RUMDL_*` environment variable set (§6.4) on top of
/// `base`, returning the new layer. Unrecognized type / unparseable value
/// fails loading with a precise error naming the variable.
pub fn env_layer(base: &Config, get: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
    let mut cfg = base.clone();
    if let Some(v) = get("RUMDL_FLAVOR") {
        cfg.flavor = Some(v.parse().map_err(|_| ConfigError::InvalidFlavor(v.clone()))?);
    }
    if let Some(v) = get("RUMDL_SEVERITY_DEFAULT") {
        cfg.severity_default = Some(v.parse().map_err(|_| ConfigError::InvalidSeverity(v.clone()))?);
    }
    if let Some(v) = get("RUMDL_FIX") {
        cfg.fix = parse_env_bool("RUMDL_FIX", &v)?;
    }
    if let Some(v) = get("RUMDL_DRY_RUN") {
        cfg.dry_run = parse_env_bool("RUMDL_DRY_RUN", &v)?;
    }
    if let Some(v) = get("RUMDL_JOBS") {
        let jobs: i64 = v.parse().map_err(|_| ConfigError::Env {
            var: "RUMDL_JOBS",
            message: format!("not an integer: {v:?}"),
        })?;
        if jobs < 0 {
            return Err(ConfigError::NegativeJobs(jobs));
        }
        cfg.jobs = jobs as usize;
    }
    if let Some(v) = get("RUMDL_FORMAT") {
        cfg.format = Some(v);
    }
    if let Some(v) = get("RUMDL_BACKUPS_ENABLED") {
        cfg.backups.enabled = parse_env_bool("RUMDL_BACKUPS_ENABLED", &v)?;
    }
    if let Some(v) = get("RUMDL_BACKUPS_MODE") {
        cfg.backups.mode = Some(v.parse().map_err(|_| ConfigError::InvalidBackupMode(v.clone()))?);
    }
    if let Some(v) = get("RUMDL_IGNORE") {
        cfg.ignore = parse_env_comma_list(&v);
    }
    if let Some(v) = get("RUMDL_NO_BACKUPS") {
        cfg.no_backups = parse_env_bool("RUMDL_NO_BACKUPS", &v)?;
    }
    Ok(cfg)
}

// ---------------------------------------------------------------------
// Normalization (§4.8 "Rule-key normalization")
// ---------------------------------------------------------------------

/// Rewrites `config.rules` so every key is a canonical `MDNNN` id,
/// resolving via (a) already-canonical, (b) registry rule name, (c) the
/// legacy alias table. Keys that collide on the same canonical id are
/// resolved deterministically: keys are sorted lexicographically first,
/// and the *last* one in that sorted order wins, with one
/// `duplicate rule configuration` warning per colliding id (Open Question 1
/// in DESIGN.md). Unknown keys are left untouched (they surface as
/// validation warnings, not here).
pub fn normalize_rule_keys(config: &mut Config, registry: &RuleRegistry) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut keys: Vec<String> = config.rules.keys().cloned().collect();
    keys.sort();

    let mut canonical: BTreeMap<String, RuleConfigEntry> = BTreeMap::new();
    let mut seen_ids: std::collections::HashSet<String> = std::collections::HashSet::new();

    for key in keys {
        let entry = config.rules.get(&key).cloned().unwrap_or_default();
        let resolved_id = canonical_id(&key, registry);
        match resolved_id {
            Some(id) => {
                if seen_ids.contains(&id) {
                    warnings.push(format!("duplicate rule configuration: {key} maps to {id}, which is already configured; using the last value encountered"));
                }
                seen_ids.insert(id.clone());
                // Last in sorted order wins: later iterations overwrite.
                canonical.insert(id, entry);
            }
            None => {
                // Unknown key: left untouched under its original spelling.
                canonical.insert(key, entry);
            }
        }
    }

    config.rules = canonical;
    warnings
}

fn is_canonical_id(key: &str) -> bool {
    key.len() == 5
        && key.starts_with("MD")
        && key[2..].bytes().all(|b| b.is_ascii_digit())
}

fn canonical_id(key: &str, registry: &RuleRegistry) -> Option<String> {
    if is_canonical_id(key) {
        return Some(key.to_string());
    }
    if let Some(id) = registry.resolve_id(key) {
        return Some(id.to_string());
    }
    aliases::resolve_alias(key).map(str::to_string)
}

// ---------------------------------------------------------------------
// Validation (§4.8 "Validation")
// ---------------------------------------------------------------------

/// Validates a fully merged, normalized config. Returns the first error
/// encountered (validation errors abort loading); unknown rule ids and
/// unknown option keys are warnings, appended to `warnings` and never
/// fatal, per §7.
pub fn validate(config: &Config, registry: &RuleRegistry, warnings: &mut Vec<String>) -> Result<(), ConfigError> {
    if config.flavor.is_none() {
        return Err(ConfigError::InvalidFlavor(String::new()));
    }
    if config.severity_default.is_none() {
        return Err(ConfigError::InvalidSeverity(String::new()));
    }
    if let Some(format) = &config.format
        && !matches!(format.as_str(), "text" | "json" | "sarif" | "diff")
    {
        return Err(ConfigError::InvalidFormat(format.clone()));
    }
    for glob in &config.ignore {
        if let Err(e) = globset::Glob::new(glob) {
            return Err(ConfigError::MalformedIgnoreGlob {
                glob: glob.clone(),
                message: e.to_string(),
            });
        }
    }
    for (id, entry) in &config.rules {
        if registry.get_by_id(id).is_none() {
            warnings.push(format!("unknown rule id in configuration: {id}"));
        }
        // `severity` on a `RuleConfigEntry` is already a parsed `Severity`
        // (serde rejects anything outside {error, warning, info} at parse
        // time), so no further check is needed here beyond its presence.
        let _ = entry.severity;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn merge_with_empty_override_is_identity() {
        let base = Config::defaults();
        let over = Config {
            flavor: None,
            severity_default: None,
            rules: BTreeMap::new(),
            ignore: Vec::new(),
            backups: Backups { enabled: false, mode: None },
            fix: false,
            dry_run: false,
            jobs: 0,
            format: None,
            rule_format: None,
            enable_rules: Vec::new(),
            disable_rules: Vec::new(),
            fix_rules: Vec::new(),
            no_backups: false,
        };
        let merged = base.merged_with(&over);
        assert_eq!(merged.flavor, base.flavor);
        assert_eq!(merged.severity_default, base.severity_default);
        assert_eq!(merged.ignore, base.ignore);
        assert_eq!(merged.backups.mode, base.backups.mode, "a layer silent on backups must not reset the mode");
    }

    #[test]
    fn boolean_cannot_be_unset_by_later_layer() {
        let base = Config { fix: true, ..Config::defaults() };
        let over = Config { fix: false, ..Config::defaults() };
        let merged = base.merged_with(&over);
        assert!(merged.fix, "a later layer setting fix=false must not unset an earlier true");
    }

    #[test]
    fn rules_map_deep_merges_options() {
        let mut base_rules = BTreeMap::new();
        let mut base_opts = BTreeMap::new();
        base_opts.insert("line_length".to_string(), Value::Int(80));
        base_rules.insert(
            "MD013".to_string(),
            RuleConfigEntry { enabled: Some(true), severity: None, auto_fix: None, options: base_opts },
        );
        let base = Config { rules: base_rules, ..Config::defaults() };

        let mut over_rules = BTreeMap::new();
        let mut over_opts = BTreeMap::new();
        over_opts.insert("code_blocks".to_string(), Value::Bool(false));
        over_rules.insert(
            "MD013".to_string(),
            RuleConfigEntry { enabled: None, severity: Some(Severity::Error), auto_fix: None, options: over_opts },
        );
        let over = Config { rules: over_rules, ..Config::defaults() };

        let merged = base.merged_with(&over);
        let entry = &merged.rules["MD013"];
        assert_eq!(entry.enabled, Some(true));
        assert_eq!(entry.severity, Some(Severity::Error));
        assert_eq!(entry.options.get("line_length"), Some(&Value::Int(80)));
        assert_eq!(entry.options.get("code_blocks"), Some(&Value::Bool(false)));
    }

    #[test]
    fn normalize_resolves_aliases_and_names() {
        let mut registry = RuleRegistry::new();
        crate::rules::register_builtin_rules(&mut registry);

        let mut rules = BTreeMap::new();
        rules.insert("no-trailing-spaces".to_string(), RuleConfigEntry { enabled: Some(false), ..Default::default() });
        rules.insert("heading-increment".to_string(), RuleConfigEntry { enabled: Some(true), ..Default::default() });
        let mut config = Config { rules, ..Config::defaults() };

        let warnings = normalize_rule_keys(&mut config, &registry);
        assert!(warnings.is_empty());
        assert!(config.rules.contains_key("MD009"));
        assert!(config.rules.contains_key("MD001"));
    }

    #[test]
    fn normalize_warns_on_duplicate_canonical_id() {
        let mut registry = RuleRegistry::new();
        crate::rules::register_builtin_rules(&mut registry);

        let mut rules = BTreeMap::new();
        rules.insert("MD001".to_string(), RuleConfigEntry { enabled: Some(true), ..Default::default() });
        rules.insert("heading-increment".to_string(), RuleConfigEntry { enabled: Some(false), ..Default::default() });
        let mut config = Config { rules, ..Config::defaults() };

        let warnings = normalize_rule_keys(&mut config, &registry);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("duplicate rule configuration"));
        // Sorted order: "MD001" < "heading-increment", so the alias
        // (sorted last) wins: enabled=false.
        assert_eq!(config.rules["MD001"].enabled, Some(false));
    }

    #[test]
    fn env_layer_parses_recognized_variables() {
        let base = Config::defaults();
        let vars = [("RUMDL_FIX", "true"), ("RUMDL_JOBS", "4"), ("RUMDL_IGNORE", "a.md, b.md")];
        let cfg = env_layer(&base, |k| vars.iter().find(|(n, _)| *n == k).map(|(_, v)| v.to_string())).unwrap();
        assert!(cfg.fix);
        assert_eq!(cfg.jobs, 4);
        assert_eq!(cfg.ignore, vec!["a.md".to_string(), "b.md".to_string()]);
    }

    #[test]
    fn env_layer_rejects_unparseable_bool() {
        let base = Config::defaults();
        let err = env_layer(&base, |k| (k == "RUMDL_FIX").then(|| "maybe".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "RUMDL_FIX", .. }));
    }

    #[test]
    fn validate_rejects_malformed_ignore_glob() {
        let registry = RuleRegistry::new();
        let config = Config { ignore: vec!["[".to_string()], ..Config::defaults() };
        let mut warnings = Vec::new();
        assert!(validate(&config, &registry, &mut warnings).is_err());
    }

    #[test]
    fn validate_warns_on_unknown_rule_id() {
        let registry = RuleRegistry::new();
        let mut rules = BTreeMap::new();
        rules.insert("MD999".to_string(), RuleConfigEntry::default());
        let config = Config { rules, ..Config::defaults() };
        let mut warnings = Vec::new();
        validate(&config, &registry, &mut warnings).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("MD999"));
    }

    #[test]
    fn backup_mode_from_str() {
        assert_eq!(BackupMode::from_str("sidecar").unwrap(), BackupMode::Sidecar);
        assert_eq!(BackupMode::from_str("none").unwrap(), BackupMode::None);
        assert!(BackupMode::from_str("bogus").is_err());
    }
}
