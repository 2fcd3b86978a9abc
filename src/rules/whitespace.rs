//! Whitespace hygiene: trailing spaces, hard tabs, blank-line runs, and the
//! space-inside-delimiter family (emphasis/code/links/blockquotes).

use std::sync::LazyLock;

use regex::Regex;

use crate::context::RuleContext;
use crate::edit::Edit;
use crate::rule::{Diagnostic, Rule, RuleCategory, RuleError};
use crate::rules::support::*;

static MULTI_SPACE_BLOCKQUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*>)\s{2,}\S").unwrap());
static SPACE_IN_EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[^*_\\])([*_]{1,2})(\s+)(\S[^*_]*?\S|\S)(\s*)\2([^*_]|$)").unwrap());
static SPACE_IN_CODE_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`(\s+)([^`]*?\S)(\s+)`").unwrap());
static SPACE_IN_LINK_TEXT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(\s+)([^\]]*?\S)(\s*)\]\(").unwrap());

pub struct Md009TrailingSpaces;
impl Rule for Md009TrailingSpaces {
    fn id(&self) -> &'static str {
        "MD009"
    }
    fn name(&self) -> &'static str {
        "no-trailing-spaces"
    }
    fn description(&self) -> &'static str {
        "lines must not end in whitespace, except a two-space hard line break"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["whitespace"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Whitespace
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let br_spaces = ctx.int("br_spaces", 2).max(0) as usize;
        let strict = ctx.bool_opt("strict", false);
        let mut out = Vec::new();
        let last = line_count(ctx).saturating_sub(1);
        for idx in 0..line_count(ctx) {
            let (start, end) = line_range(ctx, idx);
            let text = line_text(ctx, idx);
            let trimmed = text.trim_end_matches([' ', '\t']);
            let trailing = text.len() - trimmed.len();
            if trailing == 0 {
                continue;
            }
            let is_hard_break = !strict && trailing == br_spaces && idx != last && !text[..trimmed.len()].is_empty();
            if is_hard_break && !text[trimmed.len()..].contains('\t') {
                continue;
            }
            let line_no = (idx + 1) as u32;
            let diag = diag_line(
                self.id(),
                "trailing whitespace",
                line_no,
                (trimmed.len() + 1) as u32,
                (text.len() + 1) as u32,
            );
            out.push(with_edit(diag, Edit::delete(start + trimmed.len(), end)));
        }
        Ok(out)
    }
}

pub struct Md010HardTabs;
impl Rule for Md010HardTabs {
    fn id(&self) -> &'static str {
        "MD010"
    }
    fn name(&self) -> &'static str {
        "no-hard-tabs"
    }
    fn description(&self) -> &'static str {
        "hard tab characters must not appear in the document"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["whitespace", "hard_tab"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Whitespace
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let spaces_per_tab = ctx.int("spaces_per_tab", 4).max(1) as usize;
        let mut out = Vec::new();
        for idx in 0..line_count(ctx) {
            let (start, _) = line_range(ctx, idx);
            let text = line_text(ctx, idx);
            for (col, ch) in text.char_indices() {
                if ch == '\t' {
                    let line_no = (idx + 1) as u32;
                    let diag = diag_line(self.id(), "hard tab character", line_no, (col + 1) as u32, (col + 2) as u32);
                    out.push(with_edit(diag, Edit::replace(start + col, start + col + 1, " ".repeat(spaces_per_tab))));
                }
            }
        }
        Ok(out)
    }
}

pub struct Md012NoMultipleBlanks;
impl Rule for Md012NoMultipleBlanks {
    fn id(&self) -> &'static str {
        "MD012"
    }
    fn name(&self) -> &'static str {
        "no-multiple-blanks"
    }
    fn description(&self) -> &'static str {
        "consecutive blank lines must not exceed the configured maximum"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["whitespace", "blank_lines"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Whitespace
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let maximum = ctx.int("maximum", 1).max(0) as usize;
        let mut out = Vec::new();
        let mut run_start: Option<usize> = None;
        let total = line_count(ctx);
        for idx in 0..total {
            let blank = is_blank(line_text(ctx, idx));
            if blank {
                if run_start.is_none() {
                    run_start = Some(idx);
                }
            } else if let Some(start) = run_start.take() {
                let run_len = idx - start;
                if run_len > maximum {
                    out.push(flag_blank_run(self, ctx, start, idx, maximum));
                }
            }
        }
        if let Some(start) = run_start {
            let run_len = total - start;
            if run_len > maximum {
                out.push(flag_blank_run(self, ctx, start, total, maximum));
            }
        }
        Ok(out)
    }
}

fn flag_blank_run(rule: &Md012NoMultipleBlanks, ctx: &RuleContext, start: usize, end_exclusive: usize, maximum: usize) -> Diagnostic {
    let (delete_from, _) = line_range(ctx, start + maximum);
    let (_, delete_to) = line_range(ctx, end_exclusive - 1);
    let delete_to = (delete_to + 1).min(ctx.content().len());
    let diag = diag_span(
        rule.id(),
        format!("expected at most {maximum} consecutive blank line(s), found {}", end_exclusive - start),
        (start + 1) as u32,
        1,
        end_exclusive as u32,
        1,
    );
    with_edit(diag, Edit::delete(delete_from, delete_to))
}

pub struct Md027MultipleSpaceBlockquote;
impl Rule for Md027MultipleSpaceBlockquote {
    fn id(&self) -> &'static str {
        "MD027"
    }
    fn name(&self) -> &'static str {
        "no-multiple-space-blockquote"
    }
    fn description(&self) -> &'static str {
        "blockquote markers must be followed by exactly one space"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["blockquote", "whitespace", "indentation"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Whitespace
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let mut out = Vec::new();
        for idx in 0..line_count(ctx) {
            let (start, _) = line_range(ctx, idx);
            let text = line_text(ctx, idx);
            if let Some(caps) = MULTI_SPACE_BLOCKQUOTE.captures(text) {
                let marker_len = caps.get(1).unwrap().end();
                let after = &text[marker_len..];
                let spaces = after.len() - after.trim_start_matches(' ').len();
                let line_no = (idx + 1) as u32;
                let diag = diag_line(self.id(), "expected a single space after blockquote marker", line_no, (marker_len + 1) as u32, (marker_len + spaces + 1) as u32);
                out.push(with_edit(diag, Edit::replace(start + marker_len, start + marker_len + spaces, " ")));
            }
        }
        Ok(out)
    }
}

pub struct Md028BlanksBlockquote;
impl Rule for Md028BlanksBlockquote {
    fn id(&self) -> &'static str {
        "MD028"
    }
    fn name(&self) -> &'static str {
        "no-blanks-blockquote"
    }
    fn description(&self) -> &'static str {
        "a blank line must not separate two blockquote lines"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["blockquote", "whitespace"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Whitespace
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let mut out = Vec::new();
        let total = line_count(ctx);
        for idx in 0..total {
            if !is_blank(line_text(ctx, idx)) {
                continue;
            }
            let prev_is_quote = idx > 0 && line_text(ctx, idx - 1).trim_start().starts_with('>');
            let next_is_quote = idx + 1 < total && line_text(ctx, idx + 1).trim_start().starts_with('>');
            if prev_is_quote && next_is_quote {
                let line_no = (idx + 1) as u32;
                out.push(diag_line(self.id(), "blank line inside blockquote", line_no, 1, 1));
            }
        }
        Ok(out)
    }
}

pub struct Md030ListMarkerSpace;
impl Rule for Md030ListMarkerSpace {
    fn id(&self) -> &'static str {
        "MD030"
    }
    fn name(&self) -> &'static str {
        "list-marker-space"
    }
    fn description(&self) -> &'static str {
        "list markers must be followed by the configured number of spaces"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["whitespace", "list"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Whitespace
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let ul_single = ctx.int("ul_single", 1).max(1) as usize;
        let ol_single = ctx.int("ol_single", 1).max(1) as usize;
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        for &item_id in &cache.list_items {
            let Some(pos) = ctx.snapshot.position_of(item_id) else { continue };
            let idx = (pos.start_line - 1) as usize;
            let text = line_text(ctx, idx);
            let (start, _) = line_range(ctx, idx);
            let Some((marker_end, ordered)) = list_marker_end(text) else { continue };
            let after = &text[marker_end..];
            let spaces = after.len() - after.trim_start_matches(' ').len();
            let expected = if ordered { ol_single } else { ul_single };
            if spaces != expected && !after.trim_start().is_empty() {
                let diag = diag_line(
                    self.id(),
                    format!("expected {expected} space(s) after list marker, found {spaces}"),
                    pos.start_line,
                    (marker_end + 1) as u32,
                    (marker_end + spaces + 1) as u32,
                );
                out.push(with_edit(diag, Edit::replace(start + marker_end, start + marker_end + spaces, " ".repeat(expected))));
            }
        }
        Ok(out)
    }
}

/// Returns `(byte offset just past the marker, is_ordered)` for a line that
/// starts (after optional indentation) with a list marker, else `None`.
fn list_marker_end(line: &str) -> Option<(usize, bool)> {
    let trimmed = line.trim_start_matches(' ');
    let indent = line.len() - trimmed.len();
    let bytes = trimmed.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    if matches!(bytes[0], b'-' | b'*' | b'+') && trimmed.len() > 1 && bytes[1] == b' ' {
        return Some((indent + 1, false));
    }
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 && digits < trimmed.len() {
        let after_digits = trimmed.as_bytes()[digits];
        if after_digits == b'.' || after_digits == b')' {
            return Some((indent + digits + 1, true));
        }
    }
    None
}

pub struct Md037SpaceInEmphasis;
impl Rule for Md037SpaceInEmphasis {
    fn id(&self) -> &'static str {
        "MD037"
    }
    fn name(&self) -> &'static str {
        "no-space-in-emphasis"
    }
    fn description(&self) -> &'static str {
        "emphasis markers must not have space between the marker and the text"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["whitespace", "emphasis"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Whitespace
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let mut out = Vec::new();
        for idx in 0..line_count(ctx) {
            let text = line_text(ctx, idx);
            if SPACE_IN_EMPHASIS.is_match(text) {
                let line_no = (idx + 1) as u32;
                out.push(diag_line(self.id(), "space inside emphasis markers", line_no, 1, (text.len() + 1) as u32));
            }
        }
        Ok(out)
    }
}

pub struct Md038SpaceInCode;
impl Rule for Md038SpaceInCode {
    fn id(&self) -> &'static str {
        "MD038"
    }
    fn name(&self) -> &'static str {
        "no-space-in-code"
    }
    fn description(&self) -> &'static str {
        "inline code spans must not have space just inside the backticks"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["whitespace", "code"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Whitespace
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let mut out = Vec::new();
        for idx in 0..line_count(ctx) {
            let text = line_text(ctx, idx);
            if SPACE_IN_CODE_SPAN.is_match(text) {
                let line_no = (idx + 1) as u32;
                out.push(diag_line(self.id(), "space inside code span backticks", line_no, 1, (text.len() + 1) as u32));
            }
        }
        Ok(out)
    }
}

pub struct Md039SpaceInLinks;
impl Rule for Md039SpaceInLinks {
    fn id(&self) -> &'static str {
        "MD039"
    }
    fn name(&self) -> &'static str {
        "no-space-in-links"
    }
    fn description(&self) -> &'static str {
        "link text must not have leading or trailing space inside the brackets"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["whitespace", "links"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Whitespace
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let mut out = Vec::new();
        for idx in 0..line_count(ctx) {
            let (start, _) = line_range(ctx, idx);
            let text = line_text(ctx, idx);
            if let Some(caps) = SPACE_IN_LINK_TEXT.captures(text) {
                let whole = caps.get(0).unwrap();
                let line_no = (idx + 1) as u32;
                let diag = diag_line(self.id(), "space inside link text brackets", line_no, (whole.start() + 1) as u32, (whole.end() + 1) as u32);
                let trimmed = caps.get(2).unwrap().as_str();
                out.push(with_edit(diag, Edit::replace(start + whole.start(), start + whole.end(), format!("[{trimmed}](") )));
            }
        }
        Ok(out)
    }
}

pub fn register(registry: &mut crate::registry::RuleRegistry) {
    use std::sync::Arc;
    registry.register(Arc::new(Md009TrailingSpaces));
    registry.register(Arc::new(Md010HardTabs));
    registry.register(Arc::new(Md012NoMultipleBlanks));
    registry.register(Arc::new(Md027MultipleSpaceBlockquote));
    registry.register(Arc::new(Md028BlanksBlockquote));
    registry.register(Arc::new(Md030ListMarkerSpace));
    registry.register(Arc::new(Md037SpaceInEmphasis));
    registry.register(Arc::new(Md038SpaceInCode));
    registry.register(Arc::new(Md039SpaceInLinks));
}
