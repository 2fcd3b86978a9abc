//! Drives the seven-layer merge precedence from spec §4.8 over the
//! library's `config` module: built-in defaults, system, user, project,
//! explicit `--config`, environment, then CLI overrides.

use std::path::Path;

use anyhow::{Context, Result};

use rumdl_lib::RumdlError;
use rumdl_lib::config::{self, Config};

use crate::CheckArgs;

fn load_optional_layer(path: &Path, warnings: &mut Vec<String>) -> Result<Option<Config>> {
    match config::load_layer(path) {
        Ok(layer) => Ok(layer),
        Err(err) => {
            warnings.push(format!("{}: {err}", path.display()));
            Err(RumdlError::from(err).into())
        }
    }
}

pub fn resolve(args: &CheckArgs, cwd: &Path, warnings: &mut Vec<String>) -> Result<Config> {
    let mut resolved = Config::defaults();

    if !args.no_config {
        if let Some(layer) = config::load_layer(&config::system_config_path())? {
            resolved = resolved.merged_with(&layer);
        }
        if let Some(user_path) = config::user_config_path()
            && let Some(layer) = config::load_layer(&user_path)?
        {
            resolved = resolved.merged_with(&layer);
        }
        if let Some(project_path) = config::discover_project_config(cwd)
            && let Some(layer) = config::load_layer(&project_path)?
        {
            resolved = resolved.merged_with(&layer);
        }
    }

    if let Some(explicit) = &args.config {
        let layer = load_optional_layer(explicit, warnings)?
            .with_context(|| format!("{}: configuration file not found", explicit.display()))?;
        resolved = resolved.merged_with(&layer);
    }

    resolved = config::env_layer(&resolved, |key| std::env::var(key).ok()).map_err(RumdlError::from)?;

    let cli_layer = cli_layer_from(args);
    resolved = resolved.merged_with(&cli_layer);

    Ok(resolved)
}

/// Builds the highest-priority layer directly from parsed CLI flags. Only
/// the CLI-only transient fields and the handful of scalars the CLI can
/// set are populated; everything else stays at its zero value so merging
/// leaves lower layers untouched (§4.8's "override iff set" rule).
fn cli_layer_from(args: &CheckArgs) -> Config {
    Config {
        flavor: None,
        severity_default: None,
        rules: Default::default(),
        ignore: Vec::new(),
        backups: Default::default(),
        fix: args.fix,
        dry_run: args.dry_run,
        jobs: args.jobs,
        format: args.format.clone(),
        rule_format: None,
        enable_rules: split_comma_list(&args.enable),
        disable_rules: split_comma_list(&args.disable),
        fix_rules: split_comma_list(&args.fix_rules),
        no_backups: args.no_backups,
    }
}

fn split_comma_list(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .map(|s| s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_flags_args() -> CheckArgs {
        CheckArgs {
            paths: Vec::new(),
            fix: false,
            dry_run: false,
            config: None,
            no_config: false,
            jobs: 0,
            enable: None,
            disable: None,
            fix_rules: None,
            no_backups: false,
            format: None,
        }
    }

    #[test]
    fn cli_layer_leaves_format_unset_when_flag_not_passed() {
        let layer = cli_layer_from(&no_flags_args());
        assert_eq!(layer.format, None);
    }

    #[test]
    fn cli_layer_carries_explicit_format() {
        let mut args = no_flags_args();
        args.format = Some("json".to_string());
        let layer = cli_layer_from(&args);
        assert_eq!(layer.format, Some("json".to_string()));
    }

    #[test]
    fn env_format_wins_when_cli_flag_not_passed() {
        let base = Config::defaults();
        let with_env =
            config::env_layer(&base, |k| (k == "RUMDL_FORMAT").then(|| "json".to_string())).unwrap();
        let merged = with_env.merged_with(&cli_layer_from(&no_flags_args()));
        assert_eq!(merged.format, Some("json".to_string()));
    }
}
