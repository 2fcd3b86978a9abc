//! The safe multi-pass fix pipeline (§4.7): read, fix to a point, validate,
//! write atomically while guarding against a concurrently modified file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use crate::config::{BackupMode, Config};
use crate::diff::{self, UnifiedDiff};
use crate::edit;
use crate::engine::{self, FileResult};
use crate::error::RumdlError;
use crate::parser::Parser;
use crate::registry::RuleRegistry;

/// Concrete, fully-resolved backup policy (as opposed to `config::Backups`,
/// whose `mode` may still be "not mentioned by any layer").
#[derive(Debug, Clone, Copy)]
pub struct BackupPolicy {
    pub enabled: bool,
    pub mode: BackupMode,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub fix: bool,
    pub dry_run: bool,
    pub backup: BackupPolicy,
    pub strict_race_detection: bool,
    pub re_parse_after_fix: bool,
    pub max_fix_passes: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            fix: false,
            dry_run: false,
            backup: BackupPolicy {
                enabled: true,
                mode: BackupMode::Sidecar,
            },
            strict_race_detection: true,
            re_parse_after_fix: false,
            max_fix_passes: 10,
        }
    }
}

impl PipelineOptions {
    /// Builds pipeline options from a fully resolved config (§4.8's
    /// output feeding §4.7's input), honoring `no_backups` as a hard
    /// override of the persisted backup settings.
    pub fn from_config(config: &Config) -> Self {
        let mut backup = BackupPolicy {
            enabled: config.backups.enabled,
            mode: config.backups.mode.unwrap_or_default(),
        };
        if config.no_backups {
            backup.enabled = false;
        }
        PipelineOptions {
            fix: config.fix,
            dry_run: config.dry_run,
            backup,
            strict_race_detection: true,
            re_parse_after_fix: false,
            max_fix_passes: 10,
        }
    }
}

/// Snapshot of the filesystem state captured at read time, re-checked
/// just before the write to detect a concurrent external modification.
#[derive(Debug, Clone)]
struct FileInfo {
    modified: Option<SystemTime>,
    size: u64,
    content_hash: Option<blake3::Hash>,
    #[cfg(unix)]
    permissions: u32,
}

fn stat_file(path: &Path, strict: bool, content: Option<&[u8]>) -> std::io::Result<FileInfo> {
    let meta = fs::metadata(path)?;
    let content_hash = if strict {
        match content {
            Some(bytes) => Some(blake3::hash(bytes)),
            None => Some(blake3::hash(&fs::read(path)?)),
        }
    } else {
        None
    };
    Ok(FileInfo {
        modified: meta.modified().ok(),
        size: meta.len(),
        content_hash,
        #[cfg(unix)]
        permissions: {
            use std::os::unix::fs::PermissionsExt;
            meta.permissions().mode()
        },
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ReparseFailed,
    ModifiedDuringProcessing,
}

impl SkipReason {
    fn as_str(self) -> &'static str {
        match self {
            SkipReason::ReparseFailed => "re-parse failed",
            SkipReason::ModifiedDuringProcessing => "file modified during processing",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub path: PathBuf,
    pub modified: bool,
    pub final_bytes: Option<Vec<u8>>,
    pub diff: Option<UnifiedDiff>,
    pub written: bool,
    pub backup_created: bool,
    pub skipped: Option<SkipReason>,
    pub fix_passes: u32,
    pub total_edits_applied: usize,
    pub file_result: FileResult,
}

impl PipelineResult {
    /// One-line categorization per §4.7's result summary.
    pub fn summary(&self) -> String {
        if let Some(reason) = self.skipped {
            return format!("skipped: {reason}");
        }
        if self.final_bytes.is_some() && self.diff.is_some() && !self.written {
            return "changes pending".to_string();
        }
        if self.written && self.backup_created {
            return "fixed (backup created)".to_string();
        }
        if self.written {
            return "fixed".to_string();
        }
        if self.file_result.has_issues() {
            return "issues found".to_string();
        }
        "ok".to_string()
    }
}

/// Runs the full read → multi-pass fix → validate → write orchestration
/// for a single path.
pub fn run(
    parser: &dyn Parser,
    registry: &RuleRegistry,
    config: &Config,
    options: &PipelineOptions,
    cancellation: &Arc<AtomicBool>,
    path: &Path,
) -> Result<PipelineResult, RumdlError> {
    let original = fs::read(path).map_err(|e| RumdlError::io("read", e))?;
    let original_info = stat_file(path, options.strict_race_detection, Some(&original))
        .map_err(|e| RumdlError::io("stat", e))?;

    let mut current = original.clone();
    let mut modified = false;
    let mut fix_passes = 0u32;
    let mut total_edits_applied = 0usize;
    let (mut _snapshot, mut file_result) =
        engine::lint_file(parser, registry, config, cancellation, path, &current)?;

    for _ in 0..options.max_fix_passes {
        if cancellation.load(Ordering::Relaxed) {
            return Err(RumdlError::Cancelled);
        }
        if !options.fix || file_result.accepted_edits.is_empty() {
            break;
        }

        current = edit::apply(&current, &file_result.accepted_edits);
        fix_passes += 1;
        total_edits_applied += file_result.accepted_edits.len();
        modified = true;

        let (next_snapshot, next_result) =
            engine::lint_file(parser, registry, config, cancellation, path, &current)?;
        _snapshot = next_snapshot;
        file_result = next_result;
    }

    if options.re_parse_after_fix && modified {
        if let Err(e) = parser.parse(cancellation, path, &current) {
            log::warn!("{}: fixed output failed to re-parse: {}", path.display(), e.0);
            return Ok(PipelineResult {
                path: path.to_path_buf(),
                modified: false,
                final_bytes: None,
                diff: None,
                written: false,
                backup_created: false,
                skipped: Some(SkipReason::ReparseFailed),
                fix_passes: 0,
                total_edits_applied: 0,
                file_result,
            });
        }
    }

    let final_bytes = modified.then(|| current.clone());

    if options.dry_run {
        let original_text = String::from_utf8_lossy(&original).into_owned();
        let modified_text = String::from_utf8_lossy(&current).into_owned();
        let rendered_diff = diff::unified_diff(&path.display().to_string(), &original_text, &modified_text);
        return Ok(PipelineResult {
            path: path.to_path_buf(),
            modified,
            final_bytes,
            diff: rendered_diff,
            written: false,
            backup_created: false,
            skipped: None,
            fix_passes,
            total_edits_applied,
            file_result,
        });
    }

    if !modified {
        return Ok(PipelineResult {
            path: path.to_path_buf(),
            modified,
            final_bytes,
            diff: None,
            written: false,
            backup_created: false,
            skipped: None,
            fix_passes,
            total_edits_applied,
            file_result,
        });
    }

    let race_info =
        stat_file(path, options.strict_race_detection, None).map_err(|e| RumdlError::io("stat", e))?;
    let raced = race_info.size != original_info.size
        || race_info.modified != original_info.modified
        || (options.strict_race_detection && race_info.content_hash != original_info.content_hash);
    if raced {
        log::warn!("{}: modified on disk since it was read, skipping write", path.display());
        return Ok(PipelineResult {
            path: path.to_path_buf(),
            modified,
            final_bytes,
            diff: None,
            written: false,
            backup_created: false,
            skipped: Some(SkipReason::ModifiedDuringProcessing),
            fix_passes,
            total_edits_applied,
            file_result,
        });
    }

    let mut backup_created = false;
    if options.backup.enabled && options.backup.mode == BackupMode::Sidecar {
        let backup_path = backup_path_for(path);
        log::debug!("{}: writing backup to {}", path.display(), backup_path.display());
        fs::write(&backup_path, &original).map_err(|e| RumdlError::io("write backup", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(original_info.permissions);
            let _ = fs::set_permissions(&backup_path, perms);
        }
        backup_created = true;
    }

    write_atomic(path, &current, &original_info)?;

    Ok(PipelineResult {
        path: path.to_path_buf(),
        modified,
        final_bytes,
        diff: None,
        written: true,
        backup_created,
        skipped: None,
        fix_passes,
        total_edits_applied,
        file_result,
    })
}

fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

#[cfg(unix)]
fn write_atomic(path: &Path, bytes: &[u8], original_info: &FileInfo) -> Result<(), RumdlError> {
    use std::os::unix::fs::PermissionsExt;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let temp_path = dir.join(format!(
        ".{}.rumdl.tmp",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("out")
    ));

    let mut file = fs::File::create(&temp_path).map_err(|e| RumdlError::io("write", e))?;
    file.write_all(bytes).map_err(|e| RumdlError::io("write", e))?;
    file.sync_all().map_err(|e| RumdlError::io("write", e))?;
    let perms = fs::Permissions::from_mode(original_info.permissions);
    fs::set_permissions(&temp_path, perms).map_err(|e| RumdlError::io("write", e))?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        RumdlError::io("write", e)
    })?;
    Ok(())
}

#[cfg(not(unix))]
fn write_atomic(path: &Path, bytes: &[u8], _original_info: &FileInfo) -> Result<(), RumdlError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let temp_path = dir.join(format!(
        ".{}.rumdl.tmp",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("out")
    ));

    let mut file = fs::File::create(&temp_path).map_err(|e| RumdlError::io("write", e))?;
    file.write_all(bytes).map_err(|e| RumdlError::io("write", e))?;
    file.sync_all().map_err(|e| RumdlError::io("write", e))?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        RumdlError::io("write", e)
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CommonMarkParser;
    use std::io::Write as _;
    use std::sync::atomic::AtomicBool;

    fn registry() -> RuleRegistry {
        let mut reg = RuleRegistry::new();
        crate::rules::register_builtin_rules(&mut reg);
        reg
    }

    #[test]
    fn unmodified_file_reports_ok_summary() {
        let mut file = tempfile_with(b"# Title\n\nbody\n");
        let path = file.path().to_path_buf();
        file.flush().unwrap();
        let registry = registry();
        let config = Config::defaults();
        let parser = CommonMarkParser;
        let cancel = Arc::new(AtomicBool::new(false));
        let options = PipelineOptions::default();
        let result = run(&parser, &registry, &config, &options, &cancel, &path).unwrap();
        assert!(!result.modified);
        assert!(!result.written);
        assert_eq!(result.summary(), "ok");
    }

    #[test]
    fn fix_mode_writes_backup_and_corrected_bytes() {
        let mut file = tempfile_with(b"line with trailing space   \n");
        let path = file.path().to_path_buf();
        file.flush().unwrap();
        let registry = registry();
        let mut config = Config::defaults();
        config.fix = true;
        let parser = CommonMarkParser;
        let cancel = Arc::new(AtomicBool::new(false));
        let options = PipelineOptions::default();
        let result = run(&parser, &registry, &config, &options, &cancel, &path).unwrap();
        assert!(result.written);
        assert!(result.backup_created);
        assert_eq!(result.summary(), "fixed (backup created)");
        let on_disk = fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, "line with trailing space\n");
        let backup = fs::read_to_string(backup_path_for(&path)).unwrap();
        assert_eq!(backup, "line with trailing space   \n");
    }

    #[test]
    fn dry_run_never_writes() {
        let mut file = tempfile_with(b"line with trailing space   \n");
        let path = file.path().to_path_buf();
        file.flush().unwrap();
        let registry = registry();
        let mut config = Config::defaults();
        config.fix = true;
        let parser = CommonMarkParser;
        let cancel = Arc::new(AtomicBool::new(false));
        let mut options = PipelineOptions::default();
        options.dry_run = true;
        let result = run(&parser, &registry, &config, &options, &cancel, &path).unwrap();
        assert!(!result.written);
        assert!(result.diff.is_some());
        assert_eq!(result.summary(), "changes pending");
        let on_disk = fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, "line with trailing space   \n");
    }

    #[test]
    fn cancellation_aborts_before_writing() {
        let mut file = tempfile_with(b"line with trailing space   \n");
        let path = file.path().to_path_buf();
        file.flush().unwrap();
        let registry = registry();
        let mut config = Config::defaults();
        config.fix = true;
        let parser = CommonMarkParser;
        let cancel = Arc::new(AtomicBool::new(true));
        let options = PipelineOptions::default();
        let err = run(&parser, &registry, &config, &options, &cancel, &path).unwrap_err();
        assert!(matches!(err, RumdlError::Cancelled));
        let on_disk = fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, "line with trailing space   \n");
    }

    fn tempfile_with(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file
    }
}
