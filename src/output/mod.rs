//! Output sinks (§6.2): text, JSON, and unified-diff renderers behind one
//! `Sink` trait, plus a SARIF stub.

pub mod diff;
pub mod json;
pub mod text;

use crate::pipeline::PipelineResult;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("SARIF output is not yet implemented")]
    SarifNotImplemented,
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One run's worth of per-path results, in the order the caller wants
/// them rendered (callers sort by path themselves per §5's ordering
/// guarantee before handing the list to a sink).
pub trait Sink {
    fn render(&self, results: &[PipelineResult]) -> Result<String, OutputError>;
}

pub struct TextSink;
impl Sink for TextSink {
    fn render(&self, results: &[PipelineResult]) -> Result<String, OutputError> {
        Ok(text::render(results))
    }
}

pub struct JsonSink;
impl Sink for JsonSink {
    fn render(&self, results: &[PipelineResult]) -> Result<String, OutputError> {
        Ok(json::render(results)?)
    }
}

pub struct DiffSink;
impl Sink for DiffSink {
    fn render(&self, results: &[PipelineResult]) -> Result<String, OutputError> {
        Ok(diff::render(results))
    }
}

pub struct SarifSink;
impl Sink for SarifSink {
    fn render(&self, _results: &[PipelineResult]) -> Result<String, OutputError> {
        Err(OutputError::SarifNotImplemented)
    }
}

/// Selects a sink implementation by the CLI's `--format` value.
pub fn sink_for(format: &str) -> Option<Box<dyn Sink>> {
    match format {
        "text" => Some(Box::new(TextSink)),
        "json" => Some(Box::new(JsonSink)),
        "diff" => Some(Box::new(DiffSink)),
        "sarif" => Some(Box::new(SarifSink)),
        _ => None,
    }
}

/// Rule-by-rule and file-by-file diagnostic counts used by the summary
/// views both the text and JSON sinks append at the end of a run.
pub fn summarize_by_rule(results: &[PipelineResult]) -> Vec<(&'static str, usize)> {
    let mut counts: std::collections::BTreeMap<&'static str, usize> = std::collections::BTreeMap::new();
    for result in results {
        for diag in &result.file_result.diagnostics {
            *counts.entry(diag.rule_id).or_insert(0) += 1;
        }
    }
    counts.into_iter().collect()
}

pub fn summarize_by_file(results: &[PipelineResult]) -> Vec<(String, usize)> {
    results
        .iter()
        .map(|r| (r.path.display().to_string(), r.file_result.diagnostics.len()))
        .filter(|(_, count)| *count > 0)
        .collect()
}
