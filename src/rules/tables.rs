//! Table formatting: leading/trailing pipe style, column-count consistency
//! across rows, and blank-line separation from surrounding content.

use crate::context::RuleContext;
use crate::edit::Edit;
use crate::rule::{Diagnostic, Rule, RuleCategory, RuleError};
use crate::rules::support::*;

fn cell_count(line: &str) -> usize {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').count()
}

pub struct Md055TablePipeStyle;
impl Rule for Md055TablePipeStyle {
    fn id(&self) -> &'static str {
        "MD055"
    }
    fn name(&self) -> &'static str {
        "table-pipe-style"
    }
    fn description(&self) -> &'static str {
        "table rows must use a single consistent leading/trailing pipe style"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["table"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Table
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let configured = ctx.string("style", "consistent");
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        for &table_id in &cache.tables {
            let Some(pos) = ctx.snapshot.position_of(table_id) else { continue };
            let mut baseline: Option<(bool, bool)> = match configured.as_str() {
                "leading_and_trailing" => Some((true, true)),
                "no_leading_or_trailing" => Some((false, false)),
                _ => None,
            };
            for idx in (pos.start_line - 1) as usize..pos.end_line as usize {
                let text = line_text(ctx, idx).trim();
                if text.is_empty() {
                    continue;
                }
                let style = (text.starts_with('|'), text.ends_with('|'));
                match baseline {
                    None => baseline = Some(style),
                    Some(want) if want != style => {
                        out.push(diag_line(self.id(), "table pipe style differs from the table's established style", (idx + 1) as u32, 1, 1));
                    }
                    _ => {}
                }
            }
        }
        Ok(out)
    }
}

pub struct Md056TableColumnCount;
impl Rule for Md056TableColumnCount {
    fn id(&self) -> &'static str {
        "MD056"
    }
    fn name(&self) -> &'static str {
        "table-column-count"
    }
    fn description(&self) -> &'static str {
        "every row in a table must have the same number of columns"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["table"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Table
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        for &table_id in &cache.tables {
            let Some(pos) = ctx.snapshot.position_of(table_id) else { continue };
            let header_count = cell_count(line_text(ctx, (pos.start_line - 1) as usize));
            for idx in pos.start_line as usize..pos.end_line as usize {
                let text = line_text(ctx, idx);
                if text.trim().is_empty() {
                    continue;
                }
                let count = cell_count(text);
                if count != header_count {
                    out.push(diag_line(self.id(), format!("expected {header_count} column(s), found {count}"), (idx + 1) as u32, 1, 1));
                }
            }
        }
        Ok(out)
    }
}

pub struct Md058BlanksAroundTables;
impl Rule for Md058BlanksAroundTables {
    fn id(&self) -> &'static str {
        "MD058"
    }
    fn name(&self) -> &'static str {
        "blanks-around-tables"
    }
    fn description(&self) -> &'static str {
        "tables must be surrounded by blank lines"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["table", "blank_lines"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Table
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let cache = ctx.node_kind_cache();
        let total = line_count(ctx);
        let mut out = Vec::new();
        for &table_id in &cache.tables {
            let Some(pos) = ctx.snapshot.position_of(table_id) else { continue };
            let start_idx = (pos.start_line - 1) as usize;
            let end_idx = (pos.end_line - 1) as usize;
            if start_idx > 0 && !is_blank(line_text(ctx, start_idx - 1)) {
                let (offset, _) = line_range(ctx, start_idx);
                let diag = diag_line(self.id(), "expected a blank line before this table", pos.start_line, 1, 1);
                out.push(with_edit(diag, Edit::insert(offset, "\n")));
            }
            if end_idx + 1 < total && !is_blank(line_text(ctx, end_idx + 1)) {
                let (_, offset) = line_range(ctx, end_idx);
                let diag = diag_line(self.id(), "expected a blank line after this table", pos.end_line, 1, 1);
                out.push(with_edit(diag, Edit::insert(offset, "\n")));
            }
        }
        Ok(out)
    }
}

pub fn register(registry: &mut crate::registry::RuleRegistry) {
    use std::sync::Arc;
    registry.register(Arc::new(Md055TablePipeStyle));
    registry.register(Arc::new(Md056TableColumnCount));
    registry.register(Arc::new(Md058BlanksAroundTables));
}
