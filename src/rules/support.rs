//! Shared helpers for rule implementations: line access and diagnostic
//! construction. Kept deliberately thin — each rule owns its own matching
//! logic, this module only removes the boilerplate that would otherwise be
//! copy-pasted across all ~50 of them.

use crate::context::RuleContext;
use crate::edit::Edit;
use crate::model::node::NodeId;
use crate::model::token::UNSET_TOKEN;
use crate::rule::{Diagnostic, Severity};

/// The raw byte range a node's tokens cover, or `None` if the node carries
/// no position (per the data model's "unset token" convention).
pub fn node_byte_range(ctx: &RuleContext, id: NodeId) -> Option<(usize, usize)> {
    let node = ctx.snapshot.node(id);
    if node.first_token == UNSET_TOKEN || node.last_token == UNSET_TOKEN {
        return None;
    }
    let start = ctx.snapshot.tokens.get(node.first_token)?.start;
    let end = ctx.snapshot.tokens.get(node.last_token)?.end;
    Some((start, end))
}

/// GitHub-flavored heading slug: lowercase, spaces to hyphens, punctuation
/// stripped (ASCII approximation, sufficient for link-fragment checking).
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if c == ' ' || c == '-' || c == '_' {
            slug.push('-');
        }
    }
    slug
}

/// The text of line `idx` (0-based), excluding the trailing newline.
pub fn line_text<'a>(ctx: &'a RuleContext, idx: usize) -> &'a str {
    let span = ctx.snapshot.lines.lines()[idx];
    &ctx.content()[span.start_offset..span.newline_start]
}

/// The byte range of line `idx` (0-based), excluding the trailing newline.
pub fn line_range(ctx: &RuleContext, idx: usize) -> (usize, usize) {
    let span = ctx.snapshot.lines.lines()[idx];
    (span.start_offset, span.newline_start)
}

pub fn line_count(ctx: &RuleContext) -> usize {
    ctx.snapshot.lines.line_count()
}

/// Builds a diagnostic anchored to a single line, 1-based column range.
pub fn diag_line(
    rule_id: &'static str,
    message: impl Into<String>,
    line_1based: u32,
    start_column: u32,
    end_column: u32,
) -> Diagnostic {
    Diagnostic {
        rule_id,
        rule_name: String::new(),
        message: message.into(),
        severity: Severity::Warning,
        file_path: String::new(),
        start_line: line_1based,
        start_column,
        end_line: line_1based,
        end_column,
        suggestion: None,
        edits: Vec::new(),
    }
}

/// Builds a diagnostic spanning multiple lines.
pub fn diag_span(
    rule_id: &'static str,
    message: impl Into<String>,
    start_line: u32,
    start_column: u32,
    end_line: u32,
    end_column: u32,
) -> Diagnostic {
    Diagnostic {
        rule_id,
        rule_name: String::new(),
        message: message.into(),
        severity: Severity::Warning,
        file_path: String::new(),
        start_line,
        start_column,
        end_line,
        end_column,
        suggestion: None,
        edits: Vec::new(),
    }
}

pub fn with_edit(mut diag: Diagnostic, edit: Edit) -> Diagnostic {
    diag.edits.push(edit);
    diag
}

pub fn with_suggestion(mut diag: Diagnostic, suggestion: impl Into<String>) -> Diagnostic {
    diag.suggestion = Some(suggestion.into());
    diag
}

/// True when the trimmed line is empty — the recurring "is this a blank
/// line" check used by the blank-line family of rules.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Leading-whitespace byte count of a line.
pub fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}
