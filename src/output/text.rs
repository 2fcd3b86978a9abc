//! `path:line:col: severity rule_id message`, one line per diagnostic,
//! grouped by file in the order the caller supplies (sorted by path per
//! §5's ordering guarantee before reaching this sink).

use crate::pipeline::PipelineResult;

pub fn render(results: &[PipelineResult]) -> String {
    let mut out = String::new();
    for result in results {
        let path = result.path.display();
        for diag in &result.file_result.diagnostics {
            out.push_str(&format!(
                "{path}:{}:{}: {} {} {}\n",
                diag.start_line, diag.start_column, diag.severity, diag.rule_id, diag.message
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FileResult;
    use crate::pipeline::SkipReason;
    use crate::rule::{Diagnostic, Severity};
    use std::path::PathBuf;

    fn result_with(diagnostics: Vec<Diagnostic>) -> PipelineResult {
        PipelineResult {
            path: PathBuf::from("doc.md"),
            modified: false,
            final_bytes: None,
            diff: None,
            written: false,
            backup_created: false,
            skipped: None::<SkipReason>,
            fix_passes: 0,
            total_edits_applied: 0,
            file_result: FileResult {
                path: PathBuf::from("doc.md"),
                diagnostics,
                accepted_edits: Vec::new(),
                skipped_edits: Vec::new(),
                conflict: false,
                rule_errors: Default::default(),
                cancelled: false,
            },
        }
    }

    #[test]
    fn formats_one_line_per_diagnostic() {
        let diag = Diagnostic {
            rule_id: "MD009",
            rule_name: "no-trailing-spaces".to_string(),
            message: "trailing whitespace".to_string(),
            severity: Severity::Warning,
            file_path: "doc.md".to_string(),
            start_line: 3,
            start_column: 5,
            end_line: 3,
            end_column: 8,
            suggestion: None,
            edits: Vec::new(),
        };
        let rendered = render(&[result_with(vec![diag])]);
        assert_eq!(rendered, "doc.md:3:5: warning MD009 trailing whitespace\n");
    }

    #[test]
    fn clean_file_renders_nothing() {
        assert_eq!(render(&[result_with(Vec::new())]), "");
    }
}
