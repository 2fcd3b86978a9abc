//! Checks that don't fit a narrower family: line length, thematic-break
//! style, proper-name capitalization, and the trailing-newline convention.

use crate::context::RuleContext;
use crate::edit::Edit;
use crate::rule::{Diagnostic, Rule, RuleCategory, RuleError};
use crate::rules::support::*;

pub struct Md013LineLength;
impl Rule for Md013LineLength {
    fn id(&self) -> &'static str {
        "MD013"
    }
    fn name(&self) -> &'static str {
        "line-length"
    }
    fn description(&self) -> &'static str {
        "lines must not exceed the configured maximum length"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["line_length"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let limit = ctx.int("line_length", 80).max(1) as usize;
        let check_code_blocks = ctx.bool_opt("code_blocks", true);
        let check_headings = ctx.bool_opt("headings", true);

        let cache = ctx.node_kind_cache();
        let mut code_lines = std::collections::HashSet::new();
        if !check_code_blocks {
            for &id in &cache.code_blocks {
                if let Some(pos) = ctx.snapshot.position_of(id) {
                    for line in pos.start_line..=pos.end_line {
                        code_lines.insert(line);
                    }
                }
            }
        }
        let mut heading_lines = std::collections::HashSet::new();
        if !check_headings {
            for &id in &cache.headings {
                if let Some(pos) = ctx.snapshot.position_of(id) {
                    heading_lines.insert(pos.start_line);
                }
            }
        }

        let mut out = Vec::new();
        for idx in 0..line_count(ctx) {
            let line_no = (idx + 1) as u32;
            if code_lines.contains(&line_no) || heading_lines.contains(&line_no) {
                continue;
            }
            let text = line_text(ctx, idx);
            let len = text.chars().count();
            if len > limit {
                out.push(diag_line(self.id(), format!("line length {len} exceeds the maximum of {limit}"), line_no, (limit + 1) as u32, (len + 1) as u32));
            }
        }
        Ok(out)
    }
}

pub struct Md035HrStyle;
impl Rule for Md035HrStyle {
    fn id(&self) -> &'static str {
        "MD035"
    }
    fn name(&self) -> &'static str {
        "hr-style"
    }
    fn description(&self) -> &'static str {
        "thematic breaks must use a single consistent style"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["hr"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let configured = ctx.string("style", "consistent");
        let cache = ctx.node_kind_cache();
        let mut baseline = (configured != "consistent").then(|| configured.clone());
        let mut out = Vec::new();
        for &id in &cache.thematic_breaks {
            let Some((start, end)) = node_byte_range(ctx, id) else { continue };
            let raw = ctx.content()[start..end].trim().to_string();
            match &baseline {
                None => baseline = Some(raw.clone()),
                Some(want) if want != &raw => {
                    let pos = ctx.snapshot.position_of_range(start, end);
                    let diag = diag_line(self.id(), "thematic break style differs from the document's established style", pos.start_line, pos.start_column, pos.end_column);
                    out.push(with_edit(diag, Edit::replace(start, end, want.clone())));
                }
                _ => {}
            }
        }
        Ok(out)
    }
}

pub struct Md044ProperNames;
impl Rule for Md044ProperNames {
    fn id(&self) -> &'static str {
        "MD044"
    }
    fn name(&self) -> &'static str {
        "proper-names"
    }
    fn description(&self) -> &'static str {
        "configured proper names must use their specified capitalization"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["spelling"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let names = ctx.string_list("names", &[]);
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let code_blocks_excluded = ctx.bool_opt("code_blocks_excluded", true);
        let cache = ctx.node_kind_cache();
        let mut code_lines = std::collections::HashSet::new();
        if code_blocks_excluded {
            for &id in cache.code_blocks.iter().chain(cache.code_spans.iter()) {
                if let Some(pos) = ctx.snapshot.position_of(id) {
                    for line in pos.start_line..=pos.end_line {
                        code_lines.insert(line);
                    }
                }
            }
        }

        let mut out = Vec::new();
        for idx in 0..line_count(ctx) {
            let line_no = (idx + 1) as u32;
            if code_lines.contains(&line_no) {
                continue;
            }
            let (line_start, _) = line_range(ctx, idx);
            let text = line_text(ctx, idx);
            let lower_text = text.to_ascii_lowercase();
            for name in &names {
                let lower_name = name.to_ascii_lowercase();
                let mut search_from = 0;
                while let Some(rel) = lower_text[search_from..].find(&lower_name) {
                    let at = search_from + rel;
                    let found = &text[at..at + name.len()];
                    if found != name.as_str() {
                        let diag = diag_line(self.id(), format!("expected {name:?}, found {found:?}"), line_no, (at + 1) as u32, (at + name.len() + 1) as u32);
                        out.push(with_edit(diag, Edit::replace(line_start + at, line_start + at + name.len(), name.clone())));
                    }
                    search_from = at + name.len();
                }
            }
        }
        Ok(out)
    }
}

pub struct Md047SingleTrailingNewline;
impl Rule for Md047SingleTrailingNewline {
    fn id(&self) -> &'static str {
        "MD047"
    }
    fn name(&self) -> &'static str {
        "single-trailing-newline"
    }
    fn description(&self) -> &'static str {
        "files must end with exactly one newline character"
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
        let content = ctx.content();
        if content.is_empty() {
            return Ok(Vec::new());
        }
        let trimmed = content.trim_end_matches('\n');
        let trailing = content.len() - trimmed.len();
        let total_lines = line_count(ctx) as u32;
        if trailing != 1 {
            let diag = diag_line(self.id(), "file must end with exactly one newline", total_lines, 1, 1);
            let edit = if trailing == 0 {
                Edit::insert(content.len(), "\n")
            } else {
                Edit::replace(trimmed.len(), content.len(), "\n")
            };
            return Ok(vec![with_edit(diag, edit)]);
        }
        Ok(Vec::new())
    }
}

pub fn register(registry: &mut crate::registry::RuleRegistry) {
    use std::sync::Arc;
    registry.register(Arc::new(Md013LineLength));
    registry.register(Arc::new(Md035HrStyle));
    registry.register(Arc::new(Md044ProperNames));
    registry.register(Arc::new(Md047SingleTrailingNewline));
}
