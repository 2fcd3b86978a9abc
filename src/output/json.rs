//! A `serde_json`-serialized array of `FileResult`-shaped records.

use serde::Serialize;

use crate::pipeline::PipelineResult;
use crate::rule::Diagnostic;

#[derive(Serialize)]
struct FileRecord<'a> {
    path: String,
    diagnostics: &'a [Diagnostic],
    written: bool,
    backup_created: bool,
    fix_passes: u32,
    total_edits_applied: usize,
    skipped: Option<String>,
    summary: String,
}

pub fn render(results: &[PipelineResult]) -> Result<String, serde_json::Error> {
    let records: Vec<FileRecord> = results
        .iter()
        .map(|r| FileRecord {
            path: r.path.display().to_string(),
            diagnostics: &r.file_result.diagnostics,
            written: r.written,
            backup_created: r.backup_created,
            fix_passes: r.fix_passes,
            total_edits_applied: r.total_edits_applied,
            skipped: r.skipped.map(|s| s.to_string()),
            summary: r.summary(),
        })
        .collect();
    serde_json::to_string_pretty(&records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FileResult;
    use std::path::PathBuf;

    #[test]
    fn renders_an_empty_array_for_no_results() {
        let rendered = render(&[]).unwrap();
        assert_eq!(rendered, "[]");
    }

    #[test]
    fn includes_summary_field_per_file() {
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
        let rendered = render(std::slice::from_ref(&result)).unwrap();
        assert!(rendered.contains("\"summary\": \"ok\""));
    }
}
