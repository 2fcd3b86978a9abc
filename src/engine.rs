//! Single-file engine run (§4.5, §4.6): rule resolution plus `lint_file`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::value::Value;
use crate::config::Config;
use crate::context::{RuleContext, RuleOptions};
use crate::edit::{self, Edit};
use crate::model::snapshot::Snapshot;
use crate::parser::Parser;
use crate::registry::RuleRegistry;
use crate::rule::{Diagnostic, RuleError, Severity};

/// The resolved configuration for one rule within one run (§4.5 step 1-5's
/// final output).
#[derive(Debug, Clone)]
pub struct ResolvedRule {
    pub enabled: bool,
    pub severity: Severity,
    pub auto_fix: bool,
    pub options: RuleOptions,
}

/// Runs the five-step resolution algorithm for every registered rule.
/// Order of application matters: CLI enable, then CLI disable (disable
/// wins when both name the same rule), then the rule's own config entry
/// (which is authoritative over the CLI enable/disable pair when
/// present), then the `fix_rules` filter, then the top-level `fix` gate.
pub fn resolve_rules(registry: &RuleRegistry, config: &Config) -> HashMap<&'static str, ResolvedRule> {
    let mut resolved = HashMap::new();

    for rule in registry.rules() {
        let id = rule.id();
        let mut enabled = rule.default_enabled();
        let mut severity = rule.default_severity();
        let mut auto_fix = rule.can_fix();

        if config.enable_rules.iter().any(|e| e == id) {
            enabled = true;
        }
        if config.disable_rules.iter().any(|d| d == id) {
            enabled = false;
        }

        let mut options = RuleOptions::default();
        if let Some(entry) = config.rules.get(id) {
            if let Some(e) = entry.enabled {
                enabled = e;
            }
            if let Some(s) = entry.severity {
                severity = s;
            }
            if let Some(a) = entry.auto_fix {
                auto_fix = a;
            }
            options = RuleOptions(entry.options.clone());
        }

        if !config.fix_rules.is_empty() {
            auto_fix = config.fix_rules.iter().any(|f| f == id) && rule.can_fix();
        }

        if !config.fix {
            auto_fix = false;
        }

        resolved.insert(id, ResolvedRule { enabled, severity, auto_fix, options });
    }

    resolved
}

/// The per-(rule, options-value) shortcut used when a caller already has a
/// plain `BTreeMap<String, Value>` (e.g. tests) rather than a full `Config`.
pub fn options_from(values: impl IntoIterator<Item = (String, Value)>) -> RuleOptions {
    RuleOptions(values.into_iter().collect())
}

#[derive(Debug, Clone)]
pub struct FileResult {
    pub path: std::path::PathBuf,
    pub diagnostics: Vec<Diagnostic>,
    pub accepted_edits: Vec<Edit>,
    pub skipped_edits: Vec<Edit>,
    pub conflict: bool,
    pub rule_errors: HashMap<&'static str, RuleError>,
    pub cancelled: bool,
}

impl FileResult {
    pub fn has_issues(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Parses `content`, resolves rules, runs each in id-sorted order, and
/// assembles a lenient edit pool (§4.6).
pub fn lint_file(
    parser: &dyn Parser,
    registry: &RuleRegistry,
    config: &Config,
    cancellation: &Arc<AtomicBool>,
    path: &Path,
    content: &[u8],
) -> Result<(Snapshot, FileResult), crate::error::RumdlError> {
    let snapshot = parser
        .parse(cancellation, path, content)
        .map_err(|e| crate::error::RumdlError::Parse {
            path: path.to_path_buf(),
            message: e.0,
        })?;

    let resolved = resolve_rules(registry, config);
    let mut diagnostics = Vec::new();
    let mut rule_errors = HashMap::new();
    let mut pending_edits = Vec::new();
    let mut cancelled = false;

    for rule in registry.rules() {
        let id = rule.id();
        let Some(res) = resolved.get(id) else { continue };
        if !res.enabled {
            continue;
        }
        if cancellation.load(Ordering::Relaxed) {
            cancelled = true;
            break;
        }

        let ctx = RuleContext::new(&snapshot, res.options.clone(), cancellation.clone());
        match rule.apply(&ctx) {
            Ok(mut rule_diagnostics) => {
                for diag in &mut rule_diagnostics {
                    diag.severity = res.severity;
                    if diag.file_path.is_empty() {
                        diag.file_path = path.display().to_string();
                    }
                    if diag.rule_name.is_empty() {
                        diag.rule_name = rule.name().to_string();
                    }
                    if res.auto_fix && !diag.edits.is_empty() {
                        pending_edits.extend(diag.edits.clone());
                    }
                }
                diagnostics.extend(rule_diagnostics);
            }
            Err(err) => {
                log::warn!("{}: rule {id} failed: {err}", path.display());
                rule_errors.insert(id, err);
            }
        }
    }

    let prepared = edit::prepare_lenient(pending_edits, content.len())
        .map_err(|e| crate::error::RumdlError::Parse {
            path: path.to_path_buf(),
            message: format!("invalid fix edit: {e}"),
        })?;

    let conflict = !prepared.skipped.is_empty();
    let result = FileResult {
        path: path.to_path_buf(),
        diagnostics,
        accepted_edits: prepared.accepted,
        skipped_edits: prepared.skipped,
        conflict,
        rule_errors,
        cancelled,
    };
    Ok((snapshot, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfigEntry;
    use crate::context::RuleContext as Ctx;
    use crate::parser::CommonMarkParser;
    use crate::rule::{Rule, RuleCategory};
    use std::path::PathBuf;

    struct AlwaysWarns;
    impl Rule for AlwaysWarns {
        fn id(&self) -> &'static str {
            "MD900"
        }
        fn name(&self) -> &'static str {
            "always-warns"
        }
        fn description(&self) -> &'static str {
            "test rule that always emits one diagnostic"
        }
        fn tags(&self) -> &'static [&'static str] {
            &["test"]
        }
        fn category(&self) -> RuleCategory {
            RuleCategory::Structure
        }
        fn can_fix(&self) -> bool {
            true
        }
        fn apply(&self, ctx: &Ctx) -> Result<Vec<Diagnostic>, RuleError> {
            Ok(vec![Diagnostic {
                rule_id: self.id(),
                rule_name: String::new(),
                message: "always fires".to_string(),
                severity: Severity::Warning,
                file_path: String::new(),
                start_line: 1,
                start_column: 1,
                end_line: 1,
                end_column: 1,
                suggestion: None,
                edits: vec![Edit::insert(0, "")],
            }])
        }
    }

    fn registry_with_always_warns() -> RuleRegistry {
        let mut reg = RuleRegistry::new();
        reg.register(Arc::new(AlwaysWarns));
        reg
    }

    #[test]
    fn cli_disable_wins_over_cli_enable() {
        let registry = registry_with_always_warns();
        let mut config = Config::defaults();
        config.enable_rules = vec!["MD900".to_string()];
        config.disable_rules = vec!["MD900".to_string()];
        let resolved = resolve_rules(&registry, &config);
        assert!(!resolved["MD900"].enabled);
    }

    #[test]
    fn per_rule_config_overrides_cli_disable() {
        let registry = registry_with_always_warns();
        let mut config = Config::defaults();
        config.disable_rules = vec!["MD900".to_string()];
        config.rules.insert(
            "MD900".to_string(),
            RuleConfigEntry { enabled: Some(true), ..Default::default() },
        );
        let resolved = resolve_rules(&registry, &config);
        assert!(resolved["MD900"].enabled);
    }

    #[test]
    fn fix_rules_filter_requires_membership_and_fixability() {
        let registry = registry_with_always_warns();
        let mut config = Config { fix: true, ..Config::defaults() };
        config.fix_rules = vec!["MD001".to_string()];
        let resolved = resolve_rules(&registry, &config);
        assert!(!resolved["MD900"].auto_fix);
    }

    #[test]
    fn top_level_fix_false_forces_auto_fix_false() {
        let registry = registry_with_always_warns();
        let config = Config { fix: false, ..Config::defaults() };
        let resolved = resolve_rules(&registry, &config);
        assert!(!resolved["MD900"].auto_fix);
    }

    #[test]
    fn lint_file_fills_resolved_severity_and_collects_edits() {
        let registry = registry_with_always_warns();
        let config = Config { fix: true, ..Config::defaults() };
        let parser = CommonMarkParser;
        let cancel = Arc::new(AtomicBool::new(false));
        let (_, result) =
            lint_file(&parser, &registry, &config, &cancel, &PathBuf::from("t.md"), b"# hi\n").unwrap();
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].severity, Severity::Warning);
        assert_eq!(result.diagnostics[0].file_path, "t.md");
        assert!(!result.accepted_edits.is_empty());
    }
}
