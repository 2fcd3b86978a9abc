//! List structure: consistent bullet/ordered style, indentation, ordered
//! numbering, and blank-line separation from surrounding content.

use crate::context::RuleContext;
use crate::model::node::{children, NodeId};
use crate::rule::{Diagnostic, Rule, RuleCategory, RuleError};
use crate::rules::support::*;

fn marker_char(line: &str) -> Option<char> {
    let trimmed = line.trim_start_matches(' ');
    let c = trimmed.chars().next()?;
    if matches!(c, '-' | '*' | '+') && trimmed.len() > 1 && trimmed.as_bytes()[1] == b' ' {
        Some(c)
    } else {
        None
    }
}

fn ordered_number(line: &str) -> Option<u64> {
    let trimmed = line.trim_start_matches(' ');
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let rest = &trimmed[digits.len()..];
    if rest.starts_with('.') || rest.starts_with(')') {
        digits.parse().ok()
    } else {
        None
    }
}

fn first_line_of(ctx: &RuleContext, id: NodeId) -> Option<(u32, String)> {
    let pos = ctx.snapshot.position_of(id)?;
    Some((pos.start_line, line_text(ctx, (pos.start_line - 1) as usize).to_string()))
}

pub struct Md004UlStyle;
impl Rule for Md004UlStyle {
    fn id(&self) -> &'static str {
        "MD004"
    }
    fn name(&self) -> &'static str {
        "ul-style"
    }
    fn description(&self) -> &'static str {
        "unordered list items must use a single consistent bullet marker"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["bullet", "ul"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::List
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let configured = ctx.string("style", "consistent");
        let mut baseline: Option<char> = match configured.as_str() {
            "dash" => Some('-'),
            "asterisk" => Some('*'),
            "plus" => Some('+'),
            _ => None,
        };
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        for &id in &cache.list_items {
            let Some((line_no, text)) = first_line_of(ctx, id) else { continue };
            let Some(marker) = marker_char(&text) else { continue };
            match baseline {
                None => baseline = Some(marker),
                Some(want) if want != marker => {
                    out.push(diag_line(self.id(), "inconsistent unordered list marker", line_no, 1, 2));
                }
                _ => {}
            }
        }
        Ok(out)
    }
}

pub struct Md005ListIndent;
impl Rule for Md005ListIndent {
    fn id(&self) -> &'static str {
        "MD005"
    }
    fn name(&self) -> &'static str {
        "list-indent"
    }
    fn description(&self) -> &'static str {
        "sibling list items must share the same indentation"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["bullet", "ol", "ul", "indentation"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::List
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        for &list_id in &cache.lists {
            let mut baseline: Option<usize> = None;
            for item_id in children(&ctx.snapshot.arena, list_id) {
                let Some((line_no, text)) = first_line_of(ctx, item_id) else { continue };
                let indent = indent_width(&text);
                match baseline {
                    None => baseline = Some(indent),
                    Some(want) if want != indent => {
                        out.push(diag_line(self.id(), format!("expected indent {want}, found {indent}"), line_no, 1, (indent + 1) as u32));
                    }
                    _ => {}
                }
            }
        }
        Ok(out)
    }
}

pub struct Md007UlIndent;
impl Rule for Md007UlIndent {
    fn id(&self) -> &'static str {
        "MD007"
    }
    fn name(&self) -> &'static str {
        "ul-indent"
    }
    fn description(&self) -> &'static str {
        "nested unordered lists must be indented by the configured width"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["bullet", "ul", "indentation"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::List
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let indent_size = ctx.int("indent", 2).max(1) as usize;
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        for &list_id in &cache.lists {
            let Some(parent) = ctx.snapshot.node(list_id).parent else { continue };
            if ctx.snapshot.node(parent).kind != crate::model::node::NodeKind::ListItem {
                continue;
            }
            let Some(grandparent_item_line) = first_line_of(ctx, parent) else { continue };
            let parent_indent = indent_width(&grandparent_item_line.1);
            for item_id in children(&ctx.snapshot.arena, list_id) {
                let Some((line_no, text)) = first_line_of(ctx, item_id) else { continue };
                let indent = indent_width(&text);
                let expected = parent_indent + indent_size;
                if indent != expected {
                    out.push(diag_line(self.id(), format!("expected nested list indent {expected}, found {indent}"), line_no, 1, (indent + 1) as u32));
                }
            }
        }
        Ok(out)
    }
}

pub struct Md029OlPrefix;
impl Rule for Md029OlPrefix {
    fn id(&self) -> &'static str {
        "MD029"
    }
    fn name(&self) -> &'static str {
        "ol-prefix"
    }
    fn description(&self) -> &'static str {
        "ordered list numbering must follow the configured style"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["ol"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::List
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let style = ctx.string("style", "one_or_ordered");
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        for &list_id in &cache.lists {
            if ctx.snapshot.node(list_id).attrs.list_ordered != Some(true) {
                continue;
            }
            let numbers: Vec<(u32, u64)> = children(&ctx.snapshot.arena, list_id)
                .filter_map(|item_id| {
                    let (line_no, text) = first_line_of(ctx, item_id)?;
                    ordered_number(&text).map(|n| (line_no, n))
                })
                .collect();
            if numbers.is_empty() {
                continue;
            }
            let observed_style = if numbers.iter().all(|(_, n)| *n == numbers[0].1) {
                if numbers[0].1 == 1 { "one" } else { "zero" }
            } else {
                "ordered"
            };
            let expected = if style == "one_or_ordered" {
                observed_style
            } else {
                style.as_str()
            };
            for (i, (line_no, n)) in numbers.iter().enumerate() {
                let want = match expected {
                    "one" => 1,
                    "zero" => 0,
                    _ => numbers[0].1 + i as u64,
                };
                if *n != want {
                    out.push(diag_line(self.id(), format!("expected ordered list marker {want}, found {n}"), *line_no, 1, 1));
                }
            }
        }
        Ok(out)
    }
}

pub struct Md032BlanksAroundLists;
impl Rule for Md032BlanksAroundLists {
    fn id(&self) -> &'static str {
        "MD032"
    }
    fn name(&self) -> &'static str {
        "blanks-around-lists"
    }
    fn description(&self) -> &'static str {
        "lists must be surrounded by blank lines"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["bullet", "ul", "ol", "blank_lines"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::List
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let cache = ctx.node_kind_cache();
        let total = line_count(ctx);
        let mut out = Vec::new();
        for &list_id in &cache.lists {
            // Only top-level lists (direct child of a block container other
            // than a list item) need their own blank-line separation.
            if let Some(parent) = ctx.snapshot.node(list_id).parent {
                if ctx.snapshot.node(parent).kind == crate::model::node::NodeKind::ListItem {
                    continue;
                }
            }
            let Some(pos) = ctx.snapshot.position_of(list_id) else { continue };
            let start_idx = (pos.start_line - 1) as usize;
            let end_idx = (pos.end_line - 1) as usize;
            if start_idx > 0 && !is_blank(line_text(ctx, start_idx - 1)) {
                let (offset, _) = line_range(ctx, start_idx);
                let diag = diag_line(self.id(), "expected a blank line before this list", pos.start_line, 1, 1);
                out.push(with_edit(diag, crate::edit::Edit::insert(offset, "\n")));
            }
            if end_idx + 1 < total && !is_blank(line_text(ctx, end_idx + 1)) {
                let (_, offset) = line_range(ctx, end_idx);
                let diag = diag_line(self.id(), "expected a blank line after this list", pos.end_line, 1, 1);
                out.push(with_edit(diag, crate::edit::Edit::insert(offset, "\n")));
            }
        }
        Ok(out)
    }
}

pub fn register(registry: &mut crate::registry::RuleRegistry) {
    use std::sync::Arc;
    registry.register(Arc::new(Md004UlStyle));
    registry.register(Arc::new(Md005ListIndent));
    registry.register(Arc::new(Md007UlIndent));
    registry.register(Arc::new(Md029OlPrefix));
    registry.register(Arc::new(Md032BlanksAroundLists));
}
