//! Delegates to the diff module's unified-diff rendering for every file
//! the pipeline actually changed.

use crate::diff;
use crate::pipeline::PipelineResult;

pub fn render(results: &[PipelineResult]) -> String {
    let mut out = String::new();
    for result in results {
        if let Some(unified) = &result.diff {
            out.push_str(&diff::render(unified));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FileResult;
    use std::path::PathBuf;

    #[test]
    fn skips_files_with_no_diff() {
        let result = PipelineResult {
            path: PathBuf::from("doc.md"),
            modified: false,
            final_bytes: None,
            diff: None,
            written: false,
            backup_created: false,
            skipped: None,
            fix_passes: 0,
            total_edits_applied: 0,
            file_result: FileResult {
                path: PathBuf::from("doc.md"),
                diagnostics: Vec::new(),
                accepted_edits: Vec::new(),
                skipped_edits: Vec::new(),
                conflict: false,
                rule_errors: Default::default(),
                cancelled: false,
            },
        };
        assert_eq!(render(&[result]), "");
    }

    #[test]
    fn renders_diff_when_present() {
        let unified = diff::unified_diff("doc.md", "a\n", "b\n").unwrap();
        let result = PipelineResult {
            path: PathBuf::from("doc.md"),
            modified: true,
            final_bytes: Some(b"b\n".to_vec()),
            diff: Some(unified),
            written: false,
            backup_created: false,
            skipped: None,
            fix_passes: 1,
            total_edits_applied: 1,
            file_result: FileResult {
                path: PathBuf::from("doc.md"),
                diagnostics: Vec::new(),
                accepted_edits: Vec::new(),
                skipped_edits: Vec::new(),
                conflict: false,
                rule_errors: Default::default(),
                cancelled: false,
            },
        };
        let rendered = render(&[result]);
        assert!(rendered.starts_with("diff --git a/doc.md b/doc.md\n"));
    }
}
